use std::sync::Arc;

use devcamper_config::AppConfig;
use devcamper_core::file_storage::{FileStorage, LocalFileStorage};
use devcamper_db::{PgPool, init_db_pool};

use crate::utils::email::{EmailService, Mailer};
use crate::utils::geocoder::{Geocoder, MapQuestGeocoder};

/// Shared, cheaply cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn Mailer>,
    pub geocoder: Arc<dyn Geocoder>,
    pub storage: Arc<dyn FileStorage>,
}

impl AppState {
    /// Wires the production collaborators from `config`.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = init_db_pool(&config.database).await?;

        let storage = LocalFileStorage::new(config.upload.dir.clone(), config.upload.max_file_size);

        Ok(Self {
            db,
            mailer: Arc::new(EmailService::new(config.email.clone())),
            geocoder: Arc::new(MapQuestGeocoder::new(config.geocoder.clone())?),
            storage: Arc::new(storage),
            config: Arc::new(config),
        })
    }
}
