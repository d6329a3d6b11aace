//! Application state.

use std::sync::Arc;

use able_firestore::{
    ApplicationRepository, ContentRepository, FirestoreClient, JobRepository, SettingsRepository,
    UserRepository,
};
use able_mailer::Mailer;
use able_storage::UploadStore;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub firestore: Arc<FirestoreClient>,
    pub users: Arc<UserRepository>,
    pub jobs: Arc<JobRepository>,
    pub applications: Arc<ApplicationRepository>,
    pub content: Arc<ContentRepository>,
    pub settings: Arc<SettingsRepository>,
    pub uploads: Arc<UploadStore>,
    pub mailer: Arc<Mailer>,
}

impl AppState {
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        if config.jwt_secret.is_empty() {
            return Err("JWT_SECRET must be set".into());
        }

        crate::error::set_production(config.is_production());

        let firestore = Arc::new(FirestoreClient::from_env().await?);

        let uploads = UploadStore::from_env();
        uploads.init().await?;

        let mailer = Mailer::from_env()?;

        Ok(Self {
            config,
            users: Arc::new(UserRepository::new((*firestore).clone())),
            jobs: Arc::new(JobRepository::new((*firestore).clone())),
            applications: Arc::new(ApplicationRepository::new((*firestore).clone())),
            content: Arc::new(ContentRepository::new((*firestore).clone())),
            settings: Arc::new(SettingsRepository::new((*firestore).clone())),
            firestore,
            uploads: Arc::new(uploads),
            mailer: Arc::new(mailer),
        })
    }
}
