//! JSON export and import of the whole application state.
//!
//! Import parses and validates the complete blob before writing anything, so
//! a malformed file leaves storage untouched. Fields that are absent or
//! `null` keep their stored values.

use serde::{Deserialize, Serialize};

use nutri_core::model::{FoodRecord, PreferencesDraft, ProgressState, ReviewEntry, ReviewLog};
use nutri_core::time::parse_iso_date;
use storage::repository::{CounterKey, DateKey, ProgressRepository};

use crate::catalog_service::CatalogService;
use crate::error::TransferError;
use crate::progress_service::ProgressService;

/// Exported application state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportBlob {
    pub foods: Vec<FoodRecord>,
    pub progress: ProgressState,
}

#[derive(Debug, Default, Deserialize)]
struct ImportBlob {
    #[serde(default)]
    foods: Option<Vec<FoodRecord>>,
    #[serde(default)]
    progress: Option<ImportProgress>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportProgress {
    #[serde(default)]
    xp: Option<u64>,
    #[serde(default)]
    total_xp: Option<u64>,
    #[serde(default)]
    streak: Option<u64>,
    #[serde(default)]
    best_streak: Option<u64>,
    #[serde(default)]
    last_played: Option<String>,
    #[serde(default)]
    review: Option<Vec<ReviewEntry>>,
    #[serde(default)]
    prefs: Option<PreferencesDraft>,
}

/// What an import changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Size of the new catalog, if the blob replaced it.
    pub foods: Option<usize>,
    /// Number of progress fields written.
    pub progress_fields: usize,
}

/// Exports and imports catalog plus progress as one JSON document.
#[derive(Clone)]
pub struct TransferService {
    catalog: CatalogService,
    progress: ProgressService,
}

impl TransferService {
    #[must_use]
    pub fn new(catalog: CatalogService, progress: ProgressService) -> Self {
        Self { catalog, progress }
    }

    /// # Errors
    ///
    /// Returns `TransferError` if the catalog or progress cannot be read.
    pub async fn export(&self) -> Result<ExportBlob, TransferError> {
        Ok(ExportBlob {
            foods: self.catalog.load().await?,
            progress: self.progress.state().await?,
        })
    }

    /// Export as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `TransferError` if the state cannot be read or encoded.
    pub async fn export_json(&self) -> Result<String, TransferError> {
        let blob = self.export().await?;
        Ok(serde_json::to_string_pretty(&blob)?)
    }

    /// Import a previously exported document.
    ///
    /// # Errors
    ///
    /// Returns `TransferError::Parse`, `TransferError::InvalidDate` or
    /// `TransferError::Preferences` for a malformed document, in which case
    /// nothing is written. Storage failures while writing are returned as-is.
    pub async fn import_json(&self, raw: &str) -> Result<ImportReport, TransferError> {
        let blob: ImportBlob = serde_json::from_str(raw)?;
        let progress = blob.progress.unwrap_or_default();

        let last_played = progress
            .last_played
            .as_deref()
            .map(|value| {
                parse_iso_date(value).ok_or_else(|| TransferError::InvalidDate(value.into()))
            })
            .transpose()?;
        let prefs = progress.prefs.map(PreferencesDraft::validate).transpose()?;

        let mut report = ImportReport::default();
        if let Some(foods) = blob.foods {
            report.foods = Some(foods.len());
            self.catalog.replace(foods).await?;
        }

        let repo = self.progress.repository();
        let counters = [
            (CounterKey::Xp, progress.xp),
            (CounterKey::TotalXp, progress.total_xp),
            (CounterKey::Streak, progress.streak),
            (CounterKey::BestStreak, progress.best_streak),
        ];
        for (key, value) in counters {
            if let Some(value) = value {
                repo.write_counter(key, value).await?;
                report.progress_fields += 1;
            }
        }
        if let Some(date) = last_played {
            repo.write_date(DateKey::LastPlayed, date).await?;
            report.progress_fields += 1;
        }
        if let Some(entries) = progress.review {
            let log = ReviewLog::from_entries(entries, self.progress.review_capacity());
            repo.write_review_log(&log).await?;
            report.progress_fields += 1;
        }
        if let Some(prefs) = prefs {
            repo.write_preferences(&prefs).await?;
            report.progress_fields += 1;
        }

        tracing::info!(
            foods = ?report.foods,
            progress_fields = report.progress_fields,
            "import complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::Clock;
    use nutri_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn service() -> TransferService {
        let repo = Arc::new(InMemoryRepository::new());
        TransferService::new(
            CatalogService::new(repo.clone()),
            ProgressService::new(Clock::fixed(fixed_now()), repo),
        )
    }

    #[tokio::test]
    async fn export_json_has_documented_shape() {
        let svc = service();
        let json: serde_json::Value =
            serde_json::from_str(&svc.export_json().await.unwrap()).unwrap();

        assert!(json["foods"].as_array().unwrap().len() > 1);
        let progress = &json["progress"];
        for key in ["xp", "totalXp", "streak", "bestStreak", "lastPlayed", "review", "prefs"] {
            assert!(progress.get(key).is_some(), "missing {key}");
        }
        assert!(progress["lastPlayed"].is_null());
        assert_eq!(progress["prefs"]["leniency"], 10);
    }

    #[tokio::test]
    async fn null_fields_are_left_alone() {
        let svc = service();
        svc.progress.award_xp(40).await.unwrap();

        let report = svc
            .import_json(r#"{"progress":{"xp":null,"streak":2}}"#)
            .await
            .unwrap();

        assert_eq!(report.foods, None);
        assert_eq!(report.progress_fields, 1);
        let snapshot = svc.progress.snapshot().await.unwrap();
        assert_eq!(snapshot.xp, 40);
        assert_eq!(snapshot.streak, 2);
    }

    #[tokio::test]
    async fn invalid_documents_write_nothing() {
        let svc = service();
        svc.progress.award_xp(10).await.unwrap();

        for raw in [
            "{not json",
            r#"{"progress":{"xp":99,"lastPlayed":"yesterday"}}"#,
            r#"{"progress":{"xp":99,"prefs":{"dailyGoal":0}}}"#,
            r#"{"foods":[{"name":"","serving":"1"}],"progress":{"xp":99}}"#,
        ] {
            assert!(svc.import_json(raw).await.is_err(), "{raw}");
        }

        assert_eq!(svc.progress.snapshot().await.unwrap().xp, 10);
    }
}
