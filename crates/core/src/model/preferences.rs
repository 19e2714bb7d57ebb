use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DAILY_GOAL: u32 = 10;
pub const DEFAULT_LENIENCY_PCT: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PreferencesError {
    #[error("daily goal must be at least 1")]
    InvalidDailyGoal,
}

/// Partially specified preferences; missing fields take the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesDraft {
    #[serde(default)]
    pub daily_goal: Option<u32>,
    #[serde(default)]
    pub leniency: Option<u32>,
}

impl PreferencesDraft {
    #[must_use]
    pub fn new(daily_goal: u32, leniency: u32) -> Self {
        Self {
            daily_goal: Some(daily_goal),
            leniency: Some(leniency),
        }
    }

    /// Merge over the defaults and validate.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError::InvalidDailyGoal` if the goal is zero.
    pub fn validate(self) -> Result<Preferences, PreferencesError> {
        let daily_goal = self.daily_goal.unwrap_or(DEFAULT_DAILY_GOAL);
        if daily_goal == 0 {
            return Err(PreferencesError::InvalidDailyGoal);
        }

        Ok(Preferences {
            daily_goal,
            leniency: self.leniency.unwrap_or(DEFAULT_LENIENCY_PCT),
        })
    }
}

/// Lesson length and numeric tolerance chosen by the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PreferencesDraft", rename_all = "camelCase")]
pub struct Preferences {
    daily_goal: u32,
    leniency: u32,
}

impl TryFrom<PreferencesDraft> for Preferences {
    type Error = PreferencesError;

    fn try_from(draft: PreferencesDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl Preferences {
    /// Questions per lesson; always at least 1.
    #[must_use]
    pub fn daily_goal(&self) -> u32 {
        self.daily_goal
    }

    /// Tolerance percentage for numeric answers.
    #[must_use]
    pub fn leniency(&self) -> u32 {
        self.leniency
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            daily_goal: DEFAULT_DAILY_GOAL,
            leniency: DEFAULT_LENIENCY_PCT,
        }
    }
}
