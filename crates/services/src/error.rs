//! Shared error types for the services crate.

use thiserror::Error;

use nutri_core::model::{AnswerError, FoodError, PreferencesError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::lessons::Skill;

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Food(#[from] FoodError),
    #[error(transparent)]
    Dataset(#[from] nutri_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Preferences(#[from] PreferencesError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by lesson generation and the lesson state machine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonError {
    #[error("no foods available for a lesson")]
    EmptyCatalog,
    #[error("{skill} questions need at least {required} foods, catalog has {available}")]
    NotEnoughFoods {
        skill: Skill,
        required: usize,
        available: usize,
    },
    #[error("a lesson needs at least one question")]
    NoQuestions,
    #[error("lesson already finished")]
    Completed,
    #[error("waiting for the lesson to advance past the last answer")]
    AwaitingAdvance,
    #[error("no answered question to advance past")]
    NothingToAdvance,
    #[error(transparent)]
    Answer(#[from] AnswerError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
}

/// Errors emitted by import and export.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransferError {
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid lastPlayed date: {0}")]
    InvalidDate(String),
    #[error(transparent)]
    Preferences(#[from] PreferencesError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while reading `ServicesConfig`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid {name}: {raw}")]
    InvalidValue { name: &'static str, raw: String },
    #[error("{name} must be at least 1")]
    ZeroCapacity { name: &'static str },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
