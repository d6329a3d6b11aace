//! Repository for job applications.
//!
//! The document id is `{job_id}_{applicant_id}`, so a duplicate submission
//! for the same pair collides at create time and no side effects (files,
//! emails, applied_jobs) have happened yet when the conflict surfaces.

use std::collections::HashMap;

use tracing::info;

use able_models::{Application, ApplicationStatus};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{from_document, to_fields, StructuredQuery, ToFirestoreValue, Value};

pub const APPLICATIONS: &str = "applications";

pub struct ApplicationRepository {
    client: FirestoreClient,
}

impl ApplicationRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Create an application. A second submission for the same (job,
    /// applicant) pair fails with AlreadyExists.
    pub async fn create(&self, application: &Application) -> FirestoreResult<()> {
        self.client
            .create_document(APPLICATIONS, &application.id, to_fields(application)?)
            .await
            .map_err(|e| {
                if matches!(e, FirestoreError::AlreadyExists(_)) {
                    FirestoreError::AlreadyExists(application.id.clone())
                } else {
                    e
                }
            })?;
        info!(
            application_id = %application.id,
            job_id = %application.job_id,
            "created application"
        );
        Ok(())
    }

    pub async fn get(&self, application_id: &str) -> FirestoreResult<Option<Application>> {
        match self.client.get_document(APPLICATIONS, application_id).await? {
            Some(doc) => Ok(Some(from_document(&doc)?)),
            None => Ok(None),
        }
    }

    pub async fn list_by_applicant(&self, applicant_id: &str) -> FirestoreResult<Vec<Application>> {
        self.query_eq("applicant_id", applicant_id).await
    }

    pub async fn list_by_job(&self, job_id: &str) -> FirestoreResult<Vec<Application>> {
        self.query_eq("job_id", job_id).await
    }

    /// Applications across a set of jobs, newest first.
    pub async fn list_by_jobs(&self, job_ids: &[String]) -> FirestoreResult<Vec<Application>> {
        let mut applications = Vec::new();
        for job_id in job_ids {
            applications.extend(self.list_by_job(job_id).await?);
        }
        applications.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(applications)
    }

    pub async fn list_all(&self) -> FirestoreResult<Vec<Application>> {
        let docs = self.client.list_all_documents(APPLICATIONS).await?;
        let mut applications = Vec::with_capacity(docs.len());
        for doc in &docs {
            applications.push(from_document(doc)?);
        }
        Ok(applications)
    }

    /// Move an application to a new status, optionally overwriting its
    /// feedback in the same masked update so the two never diverge.
    pub async fn update_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
        feedback: Option<&str>,
    ) -> FirestoreResult<()> {
        let (fields, mask) = Self::status_fields(status, feedback);

        self.client
            .update_document(APPLICATIONS, application_id, fields, Some(mask))
            .await?;
        info!(application_id = %application_id, status = %status, "application status updated");
        Ok(())
    }

    fn status_fields(
        status: ApplicationStatus,
        feedback: Option<&str>,
    ) -> (HashMap<String, Value>, Vec<String>) {
        let mut fields = HashMap::new();
        let mut mask = vec!["status".to_string()];
        fields.insert("status".to_string(), status.as_str().to_firestore_value());
        if let Some(feedback) = feedback {
            fields.insert("feedback".to_string(), feedback.to_firestore_value());
            mask.push("feedback".to_string());
        }
        (fields, mask)
    }

    pub async fn set_feedback(&self, application_id: &str, feedback: &str) -> FirestoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("feedback".to_string(), feedback.to_firestore_value());

        self.client
            .update_document(
                APPLICATIONS,
                application_id,
                fields,
                Some(vec!["feedback".to_string()]),
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, application_id: &str) -> FirestoreResult<()> {
        self.client.delete_document(APPLICATIONS, application_id).await?;
        info!(application_id = %application_id, "deleted application");
        Ok(())
    }

    async fn query_eq(&self, field: &str, value: &str) -> FirestoreResult<Vec<Application>> {
        let docs = self
            .client
            .run_query(
                StructuredQuery::collection(APPLICATIONS)
                    .where_eq(field, Value::StringValue(value.to_string())),
            )
            .await?;

        let mut applications = Vec::with_capacity(docs.len());
        for doc in &docs {
            applications.push(from_document(doc)?);
        }
        Ok(applications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_update_masks_status_only_without_feedback() {
        let (fields, mask) =
            ApplicationRepository::status_fields(ApplicationStatus::Accepted, None);
        assert_eq!(mask, vec!["status"]);
        assert!(matches!(
            fields.get("status"),
            Some(Value::StringValue(s)) if s == "Accepted"
        ));
        assert!(!fields.contains_key("feedback"));
    }

    #[test]
    fn status_update_writes_feedback_in_the_same_mask() {
        let (fields, mask) = ApplicationRepository::status_fields(
            ApplicationStatus::Rejected,
            Some("Thanks, but the role needs on-site work"),
        );
        assert_eq!(mask, vec!["status", "feedback"]);
        assert!(matches!(
            fields.get("feedback"),
            Some(Value::StringValue(s)) if s.starts_with("Thanks")
        ));
    }
}
