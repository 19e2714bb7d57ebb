use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::model::preferences::Preferences;

/// Maximum number of missed questions retained.
pub const REVIEW_LOG_CAPACITY: usize = 100;

/// XP granted for each correct answer.
pub const XP_PER_CORRECT: u64 = 10;

//
// ─── REVIEW LOG ────────────────────────────────────────────────────────────────
//

/// A missed question kept for later study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    #[serde(rename = "when")]
    pub answered_at: DateTime<Utc>,
    pub question: String,
    #[serde(rename = "yourAnswer", deserialize_with = "string_or_number")]
    pub submitted: String,
    pub correct: String,
}

impl ReviewEntry {
    #[must_use]
    pub fn new(
        answered_at: DateTime<Utc>,
        question: impl Into<String>,
        submitted: impl Into<String>,
        correct: impl Into<String>,
    ) -> Self {
        Self {
            answered_at,
            question: question.into(),
            submitted: submitted.into(),
            correct: correct.into(),
        }
    }
}

/// Older exports store numeric answers as JSON numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

/// Most-recent-first list of review entries with a fixed capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewLog {
    entries: Vec<ReviewEntry>,
}

impl ReviewLog {
    /// Build a log from stored entries, dropping anything past `capacity`.
    #[must_use]
    pub fn from_entries(mut entries: Vec<ReviewEntry>, capacity: usize) -> Self {
        entries.truncate(capacity);
        Self { entries }
    }

    /// Insert at the front, evicting the oldest entries beyond `capacity`.
    pub fn push(&mut self, entry: ReviewEntry, capacity: usize) {
        self.entries.insert(0, entry);
        self.entries.truncate(capacity);
    }

    #[must_use]
    pub fn entries(&self) -> &[ReviewEntry] {
        &self.entries
    }

    /// Up to `n` of the most recent entries.
    #[must_use]
    pub fn recent(&self, n: usize) -> &[ReviewEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<ReviewEntry> {
        self.entries
    }
}

//
// ─── STREAK ────────────────────────────────────────────────────────────────────
//

/// Streak counters after completing a daily lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub streak: u64,
    pub best_streak: u64,
}

impl StreakUpdate {
    /// Apply the calendar-day streak rule for a daily lesson finished `today`.
    ///
    /// - never played: 1
    /// - last played yesterday: +1
    /// - last played today (or a future date): unchanged
    /// - gap of two or more days: reset to 1
    #[must_use]
    pub fn compute(
        last_played: Option<NaiveDate>,
        today: NaiveDate,
        streak: u64,
        best_streak: u64,
    ) -> Self {
        let streak = match last_played {
            None => 1,
            Some(last) => match (today - last).num_days() {
                1 => streak + 1,
                gap if gap > 1 => 1,
                _ => streak,
            },
        };

        Self {
            streak,
            best_streak: best_streak.max(streak),
        }
    }
}

//
// ─── PROGRESS STATE ────────────────────────────────────────────────────────────
//

/// Everything persisted about the learner, in export order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub xp: u64,
    pub total_xp: u64,
    pub streak: u64,
    pub best_streak: u64,
    pub last_played: Option<NaiveDate>,
    pub review: ReviewLog,
    pub prefs: Preferences,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
