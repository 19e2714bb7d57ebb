use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::config::ServicesConfig;
use crate::error::AppServicesError;
use crate::lessons::LessonLoopService;
use crate::progress_service::ProgressService;
use crate::transfer::TransferService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    progress: Arc<ProgressService>,
    lessons: Arc<LessonLoopService>,
    transfer: Arc<TransferService>,
}

impl AppServices {
    /// Build services backed by `SQLite` at `config.db_url()`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(config: &ServicesConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(config.db_url()).await?;
        Ok(Self::from_storage(&storage, clock, config))
    }

    /// Build services backed by the in-memory store.
    #[must_use]
    pub fn in_memory(clock: Clock, config: &ServicesConfig) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, config)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, config: &ServicesConfig) -> Self {
        let catalog = CatalogService::new(Arc::clone(&storage.foods));
        let progress = ProgressService::new(clock, Arc::clone(&storage.progress))
            .with_review_capacity(config.review_capacity());

        let mut lessons = LessonLoopService::new(clock, catalog.clone(), progress.clone())
            .with_feedback_delay(config.feedback_delay());
        if let Some(seed) = config.seed() {
            lessons = lessons.with_seed(seed);
        }
        let transfer = TransferService::new(catalog.clone(), progress.clone());

        Self {
            catalog: Arc::new(catalog),
            progress: Arc::new(progress),
            lessons: Arc::new(lessons),
            transfer: Arc::new(transfer),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn lessons(&self) -> Arc<LessonLoopService> {
        Arc::clone(&self.lessons)
    }

    #[must_use]
    pub fn transfer(&self) -> Arc<TransferService> {
        Arc::clone(&self.transfer)
    }
}
