//! Repository for admin-authored site content.

use tracing::info;

use able_models::{Content, ContentCategory};

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::types::{from_document, to_fields, StructuredQuery, Value};

pub const CONTENT: &str = "content";

pub struct ContentRepository {
    client: FirestoreClient,
}

impl ContentRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, content: &Content) -> FirestoreResult<()> {
        self.client
            .create_document(CONTENT, &content.id, to_fields(content)?)
            .await?;
        info!(content_id = %content.id, category = %content.category, "created content");
        Ok(())
    }

    pub async fn get(&self, content_id: &str) -> FirestoreResult<Option<Content>> {
        match self.client.get_document(CONTENT, content_id).await? {
            Some(doc) => Ok(Some(from_document(&doc)?)),
            None => Ok(None),
        }
    }

    /// Full-document replace; callers bump `updated_at` via `Content::touch`.
    pub async fn update(&self, content: &Content) -> FirestoreResult<()> {
        self.client
            .update_document(CONTENT, &content.id, to_fields(content)?, None)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, content_id: &str) -> FirestoreResult<()> {
        self.client.delete_document(CONTENT, content_id).await?;
        Ok(())
    }

    /// Published items only, optionally narrowed to a category. Public path.
    pub async fn list_published(
        &self,
        category: Option<ContentCategory>,
    ) -> FirestoreResult<Vec<Content>> {
        let mut query =
            StructuredQuery::collection(CONTENT).where_eq("published", Value::BooleanValue(true));
        if let Some(category) = category {
            query = query.where_eq(
                "category",
                Value::StringValue(category.as_str().to_string()),
            );
        }

        let docs = self.client.run_query(query).await?;
        let mut items = Vec::with_capacity(docs.len());
        for doc in &docs {
            items.push(from_document(doc)?);
        }
        Ok(items)
    }

    /// Everything, drafts included. Admin path.
    pub async fn list_all(&self) -> FirestoreResult<Vec<Content>> {
        let docs = self.client.list_all_documents(CONTENT).await?;
        let mut items = Vec::with_capacity(docs.len());
        for doc in &docs {
            items.push(from_document(doc)?);
        }
        Ok(items)
    }
}
