use thiserror::Error;

use crate::model::{AnswerError, FoodError, PreferencesError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Food(#[from] FoodError),
    #[error(transparent)]
    Preferences(#[from] PreferencesError),
    #[error(transparent)]
    Answer(#[from] AnswerError),
    #[error("bundled dataset is invalid: {0}")]
    Dataset(#[from] serde_json::Error),
}
