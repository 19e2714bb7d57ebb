mod food;
mod preferences;
mod progress;
mod question;

pub use food::{FoodDraft, FoodError, FoodRecord, Nutrient};
pub use preferences::{
    DEFAULT_DAILY_GOAL, DEFAULT_LENIENCY_PCT, Preferences, PreferencesDraft, PreferencesError,
};
pub use progress::{
    ProgressState, REVIEW_LOG_CAPACITY, ReviewEntry, ReviewLog, StreakUpdate, XP_PER_CORRECT,
};
pub use question::{
    Answer, AnswerError, ComparisonQuestion, EQUAL_OPTION, FALSE_OPTION, NumericQuestion,
    Question, TRUE_OPTION, TrueFalseQuestion,
};
