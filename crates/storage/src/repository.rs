use async_trait::async_trait;
use chrono::NaiveDate;
use nutri_core::model::{FoodRecord, Preferences, ReviewEntry, ReviewLog};
use nutri_core::time::parse_iso_date;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── KEYS ──────────────────────────────────────────────────────────────────────
//

/// Every key the application writes to the key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Foods,
    Xp,
    TotalXp,
    Streak,
    BestStreak,
    LastPlayed,
    Preferences,
    ReviewLog,
}

impl StorageKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::Foods => "nd_foods",
            StorageKey::Xp => "nd_xp",
            StorageKey::TotalXp => "nd_total_xp",
            StorageKey::Streak => "nd_streak",
            StorageKey::BestStreak => "nd_best_streak",
            StorageKey::LastPlayed => "nd_last_played",
            StorageKey::Preferences => "nd_prefs",
            StorageKey::ReviewLog => "nd_review",
        }
    }
}

/// Integer counters; a missing counter reads as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKey {
    Xp,
    TotalXp,
    Streak,
    BestStreak,
}

impl CounterKey {
    #[must_use]
    pub fn storage_key(self) -> StorageKey {
        match self {
            CounterKey::Xp => StorageKey::Xp,
            CounterKey::TotalXp => StorageKey::TotalXp,
            CounterKey::Streak => StorageKey::Streak,
            CounterKey::BestStreak => StorageKey::BestStreak,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateKey {
    LastPlayed,
}

impl DateKey {
    #[must_use]
    pub fn storage_key(self) -> StorageKey {
        match self {
            DateKey::LastPlayed => StorageKey::LastPlayed,
        }
    }
}

/// Keys cleared by a progress reset. Foods and preferences survive.
pub const PROGRESS_KEYS: [StorageKey; 6] = [
    StorageKey::Xp,
    StorageKey::TotalXp,
    StorageKey::Streak,
    StorageKey::BestStreak,
    StorageKey::LastPlayed,
    StorageKey::ReviewLog,
];

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Raw string storage, one value per key, last writer wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend is unavailable.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend is unavailable.
    async fn put(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Remove `key` if present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend is unavailable.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Repository contract for the food catalog.
#[async_trait]
pub trait FoodRepository: Send + Sync {
    /// Load the stored catalog, `None` if nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored catalog is corrupt.
    async fn load_foods(&self) -> Result<Option<Vec<FoodRecord>>, StorageError>;

    /// Overwrite the stored catalog.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be stored.
    async fn save_foods(&self, foods: &[FoodRecord]) -> Result<(), StorageError>;
}

/// Repository contract for learner progress.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Read a counter; missing counters are zero.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is not an integer.
    async fn read_counter(&self, key: CounterKey) -> Result<u64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn write_counter(&self, key: CounterKey, value: u64) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is not a date.
    async fn read_date(&self, key: DateKey) -> Result<Option<NaiveDate>, StorageError>;

    /// Store a date as `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn write_date(&self, key: DateKey, date: NaiveDate) -> Result<(), StorageError>;

    /// Read the review log, most recent first, truncated to `capacity`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored log is corrupt.
    async fn read_review_log(&self, capacity: usize) -> Result<ReviewLog, StorageError>;

    /// Prepend `entry`, keeping at most `capacity` entries.
    ///
    /// A corrupt stored log is replaced rather than failing the append.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be stored.
    async fn append_review_entry(
        &self,
        entry: &ReviewEntry,
        capacity: usize,
    ) -> Result<(), StorageError>;

    /// Overwrite the whole review log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the log cannot be stored.
    async fn write_review_log(&self, log: &ReviewLog) -> Result<(), StorageError>;

    /// Read stored preferences, `None` if never saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored preferences are corrupt.
    async fn read_preferences(&self) -> Result<Option<Preferences>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the preferences cannot be stored.
    async fn write_preferences(&self, prefs: &Preferences) -> Result<(), StorageError>;

    /// Remove XP, streak, last-played and review log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any key cannot be removed.
    async fn clear_progress(&self) -> Result<(), StorageError>;
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

//
// ─── KEY-VALUE BACKED REPOSITORIES ─────────────────────────────────────────────
//

#[async_trait]
impl<T> FoodRepository for T
where
    T: KeyValueStore,
{
    async fn load_foods(&self) -> Result<Option<Vec<FoodRecord>>, StorageError> {
        let Some(raw) = self.get(StorageKey::Foods.as_str()).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(ser)
    }

    async fn save_foods(&self, foods: &[FoodRecord]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(foods).map_err(ser)?;
        self.put(StorageKey::Foods.as_str(), raw).await
    }
}

#[async_trait]
impl<T> ProgressRepository for T
where
    T: KeyValueStore,
{
    async fn read_counter(&self, key: CounterKey) -> Result<u64, StorageError> {
        let storage_key = key.storage_key().as_str();
        match self.get(storage_key).await? {
            None => Ok(0),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| StorageError::Serialization(format!("{storage_key}: {raw}"))),
        }
    }

    async fn write_counter(&self, key: CounterKey, value: u64) -> Result<(), StorageError> {
        self.put(key.storage_key().as_str(), value.to_string())
            .await
    }

    async fn read_date(&self, key: DateKey) -> Result<Option<NaiveDate>, StorageError> {
        let storage_key = key.storage_key().as_str();
        match self.get(storage_key).await? {
            None => Ok(None),
            Some(raw) => parse_iso_date(&raw)
                .map(Some)
                .ok_or_else(|| StorageError::Serialization(format!("{storage_key}: {raw}"))),
        }
    }

    async fn write_date(&self, key: DateKey, date: NaiveDate) -> Result<(), StorageError> {
        self.put(
            key.storage_key().as_str(),
            date.format("%Y-%m-%d").to_string(),
        )
        .await
    }

    async fn read_review_log(&self, capacity: usize) -> Result<ReviewLog, StorageError> {
        let Some(raw) = self.get(StorageKey::ReviewLog.as_str()).await? else {
            return Ok(ReviewLog::default());
        };
        let entries: Vec<ReviewEntry> = serde_json::from_str(&raw).map_err(ser)?;
        Ok(ReviewLog::from_entries(entries, capacity))
    }

    async fn append_review_entry(
        &self,
        entry: &ReviewEntry,
        capacity: usize,
    ) -> Result<(), StorageError> {
        let mut log = match self.read_review_log(capacity).await {
            Ok(log) => log,
            Err(StorageError::Serialization(err)) => {
                tracing::warn!("discarding corrupt review log: {err}");
                ReviewLog::default()
            }
            Err(err) => return Err(err),
        };
        log.push(entry.clone(), capacity);
        self.write_review_log(&log).await
    }

    async fn write_review_log(&self, log: &ReviewLog) -> Result<(), StorageError> {
        let raw = serde_json::to_string(log).map_err(ser)?;
        self.put(StorageKey::ReviewLog.as_str(), raw).await
    }

    async fn read_preferences(&self) -> Result<Option<Preferences>, StorageError> {
        let Some(raw) = self.get(StorageKey::Preferences.as_str()).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(ser)
    }

    async fn write_preferences(&self, prefs: &Preferences) -> Result<(), StorageError> {
        let raw = serde_json::to_string(prefs).map_err(ser)?;
        self.put(StorageKey::Preferences.as_str(), raw).await
    }

    async fn clear_progress(&self) -> Result<(), StorageError> {
        for key in PROGRESS_KEYS {
            self.remove(key.as_str()).await?;
        }
        Ok(())
    }
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub foods: Arc<dyn FoodRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryRepository::new())
    }

    /// Build a `Storage` whose repositories share one key-value store.
    #[must_use]
    pub fn from_store<S>(store: S) -> Self
    where
        S: KeyValueStore + Clone + 'static,
    {
        let foods: Arc<dyn FoodRepository> = Arc::new(store.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(store);
        Self { foods, progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutri_core::model::{FoodDraft, PreferencesDraft};
    use nutri_core::time::fixed_now;

    fn food(name: &str) -> FoodRecord {
        FoodDraft {
            name: name.into(),
            serving: "1 cup".into(),
            calories: 100.0,
            ..FoodDraft::default()
        }
        .validate()
        .unwrap()
    }

    fn entry(question: &str) -> ReviewEntry {
        ReviewEntry::new(fixed_now(), question, "1", "2")
    }

    #[tokio::test]
    async fn missing_keys_read_as_defaults() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.read_counter(CounterKey::Xp).await.unwrap(), 0);
        assert_eq!(repo.read_date(DateKey::LastPlayed).await.unwrap(), None);
        assert!(repo.read_review_log(100).await.unwrap().is_empty());
        assert!(repo.read_preferences().await.unwrap().is_none());
        assert!(repo.load_foods().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn round_trips_foods_and_counters() {
        let repo = InMemoryRepository::new();
        repo.save_foods(&[food("Apple"), food("Pear")]).await.unwrap();
        repo.write_counter(CounterKey::TotalXp, 250).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        repo.write_date(DateKey::LastPlayed, day).await.unwrap();

        let foods = repo.load_foods().await.unwrap().unwrap();
        assert_eq!(foods.len(), 2);
        assert_eq!(foods[1].name(), "Pear");
        assert_eq!(repo.read_counter(CounterKey::TotalXp).await.unwrap(), 250);
        assert_eq!(
            repo.get(StorageKey::LastPlayed.as_str()).await.unwrap().as_deref(),
            Some("2024-03-01")
        );
        assert_eq!(repo.read_date(DateKey::LastPlayed).await.unwrap(), Some(day));
    }

    #[tokio::test]
    async fn corrupt_values_surface_serialization_errors() {
        let repo = InMemoryRepository::new();
        repo.put(StorageKey::Xp.as_str(), "ten".into()).await.unwrap();
        repo.put(StorageKey::Preferences.as_str(), "{not json".into())
            .await
            .unwrap();

        assert!(matches!(
            repo.read_counter(CounterKey::Xp).await,
            Err(StorageError::Serialization(_))
        ));
        assert!(matches!(
            repo.read_preferences().await,
            Err(StorageError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn review_log_append_caps_and_recovers_from_corruption() {
        let repo = InMemoryRepository::new();
        repo.put(StorageKey::ReviewLog.as_str(), "[oops".into())
            .await
            .unwrap();

        for i in 0..4 {
            repo.append_review_entry(&entry(&format!("q{i}")), 3)
                .await
                .unwrap();
        }

        let log = repo.read_review_log(100).await.unwrap();
        let questions: Vec<_> = log.entries().iter().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, vec!["q3", "q2", "q1"]);
    }

    #[tokio::test]
    async fn clear_progress_keeps_foods_and_preferences() {
        let repo = InMemoryRepository::new();
        repo.save_foods(&[food("Apple")]).await.unwrap();
        let prefs = PreferencesDraft::new(5, 20).validate().unwrap();
        repo.write_preferences(&prefs).await.unwrap();
        repo.write_counter(CounterKey::Streak, 4).await.unwrap();
        repo.append_review_entry(&entry("q"), 100).await.unwrap();

        repo.clear_progress().await.unwrap();

        assert_eq!(repo.read_counter(CounterKey::Streak).await.unwrap(), 0);
        assert!(repo.read_review_log(100).await.unwrap().is_empty());
        assert_eq!(repo.read_preferences().await.unwrap(), Some(prefs));
        assert!(repo.load_foods().await.unwrap().is_some());
    }
}
