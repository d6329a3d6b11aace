//! Repository for job postings.

use std::collections::HashMap;

use tracing::info;

use able_models::{Job, JobStatus};

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::types::{from_document, to_fields, StructuredQuery, ToFirestoreValue, Value};

pub const JOBS: &str = "jobs";

pub struct JobRepository {
    client: FirestoreClient,
}

impl JobRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, job: &Job) -> FirestoreResult<()> {
        self.client
            .create_document(JOBS, &job.id, to_fields(job)?)
            .await?;
        info!(job_id = %job.id, posted_by = %job.posted_by, "created job");
        Ok(())
    }

    pub async fn get(&self, job_id: &str) -> FirestoreResult<Option<Job>> {
        match self.client.get_document(JOBS, job_id).await? {
            Some(doc) => Ok(Some(from_document(&doc)?)),
            None => Ok(None),
        }
    }

    /// Full-document replace.
    pub async fn update(&self, job: &Job) -> FirestoreResult<()> {
        self.client
            .update_document(JOBS, &job.id, to_fields(job)?, None)
            .await?;
        Ok(())
    }

    pub async fn update_status(&self, job_id: &str, status: JobStatus) -> FirestoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("status".to_string(), status.as_str().to_firestore_value());

        self.client
            .update_document(JOBS, job_id, fields, Some(vec!["status".to_string()]))
            .await?;
        Ok(())
    }

    pub async fn delete(&self, job_id: &str) -> FirestoreResult<()> {
        self.client.delete_document(JOBS, job_id).await?;
        info!(job_id = %job_id, "deleted job");
        Ok(())
    }

    /// Every posting. Search/location/type filters are substring and
    /// case-insensitive, which Firestore queries cannot express, so listing
    /// filters in application code.
    pub async fn list_all(&self) -> FirestoreResult<Vec<Job>> {
        let docs = self.client.list_all_documents(JOBS).await?;
        let mut jobs = Vec::with_capacity(docs.len());
        for doc in &docs {
            jobs.push(from_document(doc)?);
        }
        Ok(jobs)
    }

    pub async fn list_by_employer(&self, employer_id: &str) -> FirestoreResult<Vec<Job>> {
        let docs = self
            .client
            .run_query(
                StructuredQuery::collection(JOBS)
                    .where_eq("posted_by", Value::StringValue(employer_id.to_string())),
            )
            .await?;

        let mut jobs = Vec::with_capacity(docs.len());
        for doc in &docs {
            jobs.push(from_document(doc)?);
        }
        Ok(jobs)
    }

    /// Fetch a batch of jobs by id, e.g. a user's saved list. Ids that no
    /// longer resolve are skipped.
    pub async fn get_many(&self, job_ids: &[String]) -> FirestoreResult<Vec<Job>> {
        let mut jobs = Vec::with_capacity(job_ids.len());
        for chunk in job_ids.chunks(100) {
            let names = chunk
                .iter()
                .map(|id| self.client.full_document_name(JOBS, id))
                .collect();
            for doc in self.client.batch_get_documents(names).await? {
                jobs.push(from_document(&doc)?);
            }
        }
        Ok(jobs)
    }
}
