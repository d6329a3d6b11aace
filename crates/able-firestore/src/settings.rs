//! Repository for per-user settings.
//!
//! One document per user, keyed by the user id. Reads fall back to defaults
//! without writing; the document appears on first save.

use able_models::UserSettings;

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::types::{from_document, to_fields};

pub const USER_SETTINGS: &str = "user_settings";

pub struct SettingsRepository {
    client: FirestoreClient,
}

impl SettingsRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    pub async fn get_or_default(&self, user_id: &str) -> FirestoreResult<UserSettings> {
        match self.client.get_document(USER_SETTINGS, user_id).await? {
            Some(doc) => Ok(from_document(&doc)?),
            None => Ok(UserSettings::defaults_for(user_id)),
        }
    }

    /// Patch-as-upsert: Firestore creates the document when it is missing.
    pub async fn upsert(&self, settings: &UserSettings) -> FirestoreResult<()> {
        self.client
            .update_document(
                USER_SETTINGS,
                &settings.user_id,
                to_fields(settings)?,
                None,
            )
            .await?;
        Ok(())
    }
}
