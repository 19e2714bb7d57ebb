use std::sync::Arc;

use chrono::NaiveDate;
use nutri_core::model::{
    Preferences, PreferencesDraft, ProgressState, REVIEW_LOG_CAPACITY, ReviewEntry, ReviewLog,
    StreakUpdate,
};
use storage::repository::{CounterKey, DateKey, ProgressRepository, StorageError};

use crate::Clock;
use crate::error::ProgressServiceError;

/// Counters shown in the top bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub xp: u64,
    pub total_xp: u64,
    pub streak: u64,
    pub best_streak: u64,
}

/// Reads and updates persisted learner progress.
///
/// Corrupt stored values are logged and read as their defaults; only backend
/// failures are returned as errors.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    review_capacity: usize,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            clock,
            progress,
            review_capacity: REVIEW_LOG_CAPACITY,
        }
    }

    #[must_use]
    pub fn with_review_capacity(mut self, capacity: usize) -> Self {
        self.review_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn review_capacity(&self) -> usize {
        self.review_capacity
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the backend is unavailable.
    pub async fn snapshot(&self) -> Result<ProgressSnapshot, ProgressServiceError> {
        Ok(ProgressSnapshot {
            xp: self.counter(CounterKey::Xp).await?,
            total_xp: self.counter(CounterKey::TotalXp).await?,
            streak: self.counter(CounterKey::Streak).await?,
            best_streak: self.counter(CounterKey::BestStreak).await?,
        })
    }

    /// Everything persisted about the learner, as exported.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the backend is unavailable.
    pub async fn state(&self) -> Result<ProgressState, ProgressServiceError> {
        let snapshot = self.snapshot().await?;
        Ok(ProgressState {
            xp: snapshot.xp,
            total_xp: snapshot.total_xp,
            streak: snapshot.streak,
            best_streak: snapshot.best_streak,
            last_played: self.last_played().await?,
            review: self.review_log().await?,
            prefs: self.preferences().await?,
        })
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the backend is unavailable.
    pub async fn last_played(&self) -> Result<Option<NaiveDate>, ProgressServiceError> {
        match self.progress.read_date(DateKey::LastPlayed).await {
            Ok(date) => Ok(date),
            Err(StorageError::Serialization(err)) => {
                tracing::warn!("ignoring corrupt last played date: {err}");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Stored preferences merged over the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the backend is unavailable.
    pub async fn preferences(&self) -> Result<Preferences, ProgressServiceError> {
        match self.progress.read_preferences().await {
            Ok(prefs) => Ok(prefs.unwrap_or_default()),
            Err(StorageError::Serialization(err)) => {
                tracing::warn!("stored preferences are corrupt, using defaults: {err}");
                Ok(Preferences::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Validate and store new preferences.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Preferences` if the daily goal is zero.
    /// Returns `ProgressServiceError::Storage` if persistence fails.
    pub async fn save_preferences(
        &self,
        draft: PreferencesDraft,
    ) -> Result<Preferences, ProgressServiceError> {
        let prefs = draft.validate()?;
        self.progress.write_preferences(&prefs).await?;
        Ok(prefs)
    }

    /// Add `amount` to both the current and lifetime XP counters.
    ///
    /// The two writes are independent; a failure between them leaves only
    /// the first one applied.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if persistence fails.
    pub async fn award_xp(&self, amount: u64) -> Result<ProgressSnapshot, ProgressServiceError> {
        let xp = self.counter(CounterKey::Xp).await?.saturating_add(amount);
        let total_xp = self
            .counter(CounterKey::TotalXp)
            .await?
            .saturating_add(amount);
        self.progress.write_counter(CounterKey::Xp, xp).await?;
        self.progress
            .write_counter(CounterKey::TotalXp, total_xp)
            .await?;
        self.snapshot().await
    }

    /// Prepend a missed question to the review log.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if persistence fails.
    pub async fn record_miss(&self, entry: &ReviewEntry) -> Result<(), ProgressServiceError> {
        self.progress
            .append_review_entry(entry, self.review_capacity)
            .await?;
        Ok(())
    }

    /// Apply the streak rule for a daily lesson finished today and stamp
    /// the last-played date.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if persistence fails.
    pub async fn record_daily_play(&self) -> Result<StreakUpdate, ProgressServiceError> {
        let today = self.clock.today();
        let update = StreakUpdate::compute(
            self.last_played().await?,
            today,
            self.counter(CounterKey::Streak).await?,
            self.counter(CounterKey::BestStreak).await?,
        );

        self.progress
            .write_counter(CounterKey::Streak, update.streak)
            .await?;
        self.progress
            .write_date(DateKey::LastPlayed, today)
            .await?;
        self.progress
            .write_counter(CounterKey::BestStreak, update.best_streak)
            .await?;
        tracing::info!(
            streak = update.streak,
            best_streak = update.best_streak,
            "daily lesson recorded"
        );
        Ok(update)
    }

    /// Full review log, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the backend is unavailable.
    pub async fn review_log(&self) -> Result<ReviewLog, ProgressServiceError> {
        match self.progress.read_review_log(self.review_capacity).await {
            Ok(log) => Ok(log),
            Err(StorageError::Serialization(err)) => {
                tracing::warn!("stored review log is corrupt, treating as empty: {err}");
                Ok(ReviewLog::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Up to `limit` of the most recent review entries.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the backend is unavailable.
    pub async fn review_preview(
        &self,
        limit: usize,
    ) -> Result<Vec<ReviewEntry>, ProgressServiceError> {
        let log = self.review_log().await?;
        Ok(log.recent(limit).to_vec())
    }

    /// Clear XP, streaks, last played and the review log.
    ///
    /// Foods and preferences are kept.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if persistence fails.
    pub async fn reset(&self) -> Result<(), ProgressServiceError> {
        self.progress.clear_progress().await?;
        tracing::info!("progress reset");
        Ok(())
    }

    pub(crate) fn repository(&self) -> &dyn ProgressRepository {
        self.progress.as_ref()
    }

    async fn counter(&self, key: CounterKey) -> Result<u64, ProgressServiceError> {
        match self.progress.read_counter(key).await {
            Ok(value) => Ok(value),
            Err(StorageError::Serialization(err)) => {
                tracing::warn!("ignoring corrupt counter: {err}");
                Ok(0)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use nutri_core::time::fixed_now;
    use storage::repository::{InMemoryRepository, KeyValueStore, StorageKey};

    fn service(repo: &InMemoryRepository, clock: Clock) -> ProgressService {
        ProgressService::new(clock, Arc::new(repo.clone()))
    }

    fn entry(question: &str) -> ReviewEntry {
        ReviewEntry::new(fixed_now(), question, "3", "5 g")
    }

    #[tokio::test]
    async fn award_xp_updates_both_counters() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo, Clock::fixed(fixed_now()));

        svc.award_xp(10).await.unwrap();
        let snapshot = svc.award_xp(10).await.unwrap();

        assert_eq!(snapshot.xp, 20);
        assert_eq!(snapshot.total_xp, 20);
    }

    #[tokio::test]
    async fn streak_follows_calendar_days() {
        let repo = InMemoryRepository::new();
        let mut clock = Clock::fixed(fixed_now());

        let first = service(&repo, clock).record_daily_play().await.unwrap();
        assert_eq!(first.streak, 1);

        let same_day = service(&repo, clock).record_daily_play().await.unwrap();
        assert_eq!(same_day.streak, 1);

        clock.advance(Duration::days(1));
        let next_day = service(&repo, clock).record_daily_play().await.unwrap();
        assert_eq!(next_day.streak, 2);

        clock.advance(Duration::days(3));
        let after_gap = service(&repo, clock).record_daily_play().await.unwrap();
        assert_eq!(after_gap, StreakUpdate { streak: 1, best_streak: 2 });

        let last = service(&repo, clock).last_played().await.unwrap();
        assert_eq!(last, Some(clock.today()));
    }

    #[tokio::test]
    async fn corrupt_values_fall_back_to_defaults() {
        let repo = InMemoryRepository::new();
        repo.put(StorageKey::Preferences.as_str(), "nope".into())
            .await
            .unwrap();
        repo.put(StorageKey::Streak.as_str(), "NaN".into())
            .await
            .unwrap();
        repo.put(StorageKey::ReviewLog.as_str(), "{".into())
            .await
            .unwrap();
        let svc = service(&repo, Clock::fixed(fixed_now()));

        assert_eq!(svc.preferences().await.unwrap(), Preferences::default());
        assert_eq!(svc.snapshot().await.unwrap().streak, 0);
        assert!(svc.review_preview(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn partial_preferences_merge_over_defaults() {
        let repo = InMemoryRepository::new();
        repo.put(StorageKey::Preferences.as_str(), r#"{"leniency":25}"#.into())
            .await
            .unwrap();
        let svc = service(&repo, Clock::fixed(fixed_now()));

        let prefs = svc.preferences().await.unwrap();
        assert_eq!(prefs.daily_goal(), 10);
        assert_eq!(prefs.leniency(), 25);

        let err = svc
            .save_preferences(PreferencesDraft::new(0, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressServiceError::Preferences(_)));
    }

    #[tokio::test]
    async fn review_preview_and_reset() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo, Clock::fixed(fixed_now())).with_review_capacity(3);
        for i in 0..5 {
            svc.record_miss(&entry(&format!("q{i}"))).await.unwrap();
        }
        svc.award_xp(30).await.unwrap();
        svc.save_preferences(PreferencesDraft::new(4, 0))
            .await
            .unwrap();

        let preview = svc.review_preview(2).await.unwrap();
        assert_eq!(preview.len(), 2);
        assert_eq!(preview[0].question, "q4");
        assert_eq!(svc.review_log().await.unwrap().len(), 3);

        svc.reset().await.unwrap();
        let state = svc.state().await.unwrap();
        assert_eq!(state.xp, 0);
        assert_eq!(state.total_xp, 0);
        assert!(state.review.is_empty());
        assert_eq!(state.prefs.daily_goal(), 4);
    }
}
