use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use nutri_core::time::fixed_now;
use services::{AppServices, CatalogError, Clock, LessonError, LessonMode, ServicesConfig, Skill};
use storage::repository::{InMemoryRepository, KeyValueStore, Storage, StorageError};

/// Store whose backend is always unreachable.
#[derive(Clone)]
struct OfflineStore;

#[async_trait]
impl KeyValueStore for OfflineStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn put(&self, _key: &str, _value: String) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

fn app() -> AppServices {
    AppServices::from_storage(
        &Storage::from_store(OfflineStore),
        Clock::fixed(fixed_now()),
        &ServicesConfig::default(),
    )
}

#[tokio::test]
async fn backend_outage_is_not_masked_as_corruption() {
    let app = app();

    assert!(matches!(
        app.catalog().load().await,
        Err(CatalogError::Storage(StorageError::Connection(_)))
    ));
    assert!(app.progress().snapshot().await.is_err());
    assert!(app.transfer().export_json().await.is_err());
}

#[tokio::test]
async fn lesson_cannot_begin_without_storage() {
    let err = app()
        .lessons()
        .begin(LessonMode::Daily, Skill::Mixed)
        .await
        .unwrap_err();
    assert!(matches!(err, LessonError::Progress(_)));
}

/// In-memory store whose writes can be switched off.
#[derive(Clone, Default)]
struct FlakyStore {
    inner: InMemoryRepository,
    writes_down: Arc<AtomicBool>,
}

impl FlakyStore {
    fn set_writes_down(&self, down: bool) {
        self.writes_down.store(down, Ordering::SeqCst);
    }

    fn check_writes(&self) -> Result<(), StorageError> {
        if self.writes_down.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("down".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.check_writes()?;
        self.inner.put(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writes()?;
        self.inner.remove(key).await
    }
}

#[tokio::test]
async fn failed_save_leaves_question_open_for_retry() {
    let store = FlakyStore::default();
    let config = ServicesConfig::default()
        .with_feedback_delay(Duration::ZERO)
        .with_seed(8);
    let app = AppServices::from_storage(
        &Storage::from_store(store.clone()),
        Clock::fixed(fixed_now()),
        &config,
    );
    let lessons = app.lessons();
    let mut session = lessons
        .begin(LessonMode::Daily, Skill::Calories)
        .await
        .unwrap();

    store.set_writes_down(true);
    let err = lessons.submit(&mut session, "99999").await.unwrap_err();
    assert!(matches!(err, LessonError::Progress(_)));
    assert_eq!(session.hearts(), 3);
    assert_eq!(session.wrong_count(), 0);
    assert!(session.pending_feedback().is_none());

    store.set_writes_down(false);
    let feedback = lessons.submit(&mut session, "99999").await.unwrap();
    assert!(!feedback.correct);
    assert_eq!(session.hearts(), 2);
    assert_eq!(session.wrong_count(), 1);
    let review = app.progress().review_preview(10).await.unwrap();
    assert_eq!(review.len(), 1);
    assert_eq!(review[0].submitted, "99999");
}
