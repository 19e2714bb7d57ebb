use std::fmt;

use thiserror::Error;

use crate::model::food::{FoodRecord, Nutrient};

/// Option label shown for a comparison tie.
pub const EQUAL_OPTION: &str = "equal";
pub const TRUE_OPTION: &str = "True";
pub const FALSE_OPTION: &str = "False";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("choose or enter an answer")]
    Missing,

    #[error("not a number: {0}")]
    NotANumber(String),
}

//
// ─── QUESTION KINDS ────────────────────────────────────────────────────────────
//

/// "About how many X are in Y?"
#[derive(Debug, Clone, PartialEq)]
pub struct NumericQuestion {
    food: FoodRecord,
    nutrient: Nutrient,
}

impl NumericQuestion {
    #[must_use]
    pub fn new(food: FoodRecord, nutrient: Nutrient) -> Self {
        Self { food, nutrient }
    }

    #[must_use]
    pub fn food(&self) -> &FoodRecord {
        &self.food
    }

    #[must_use]
    pub fn nutrient(&self) -> Nutrient {
        self.nutrient
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.nutrient.amount_label()
    }

    #[must_use]
    pub fn correct_value(&self) -> f64 {
        self.food.value(self.nutrient)
    }

    #[must_use]
    pub fn text(&self) -> String {
        format!(
            "About how many {} are in {} ({})?",
            self.label(),
            self.food.name(),
            self.food.serving()
        )
    }
}

/// "Which has more X per serving?" with three options.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonQuestion {
    first: FoodRecord,
    second: FoodRecord,
    nutrient: Nutrient,
    options: Vec<String>,
    correct: String,
}

impl ComparisonQuestion {
    /// Build a comparison with options in `[first, second, equal]` order.
    #[must_use]
    pub fn new(first: FoodRecord, second: FoodRecord, nutrient: Nutrient) -> Self {
        let a = first.value(nutrient);
        let b = second.value(nutrient);
        let correct = if a == b {
            EQUAL_OPTION.to_owned()
        } else if a > b {
            first.name().to_owned()
        } else {
            second.name().to_owned()
        };
        let options = vec![
            first.name().to_owned(),
            second.name().to_owned(),
            EQUAL_OPTION.to_owned(),
        ];

        Self {
            first,
            second,
            nutrient,
            options,
            correct,
        }
    }

    /// Reorder the presented options, e.g. with a shuffle.
    #[must_use]
    pub fn reorder_options(mut self, reorder: impl FnOnce(&mut [String])) -> Self {
        reorder(&mut self.options);
        self
    }

    #[must_use]
    pub fn first(&self) -> &FoodRecord {
        &self.first
    }

    #[must_use]
    pub fn second(&self) -> &FoodRecord {
        &self.second
    }

    #[must_use]
    pub fn nutrient(&self) -> Nutrient {
        self.nutrient
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct(&self) -> &str {
        &self.correct
    }

    #[must_use]
    pub fn text(&self) -> String {
        format!(
            "Which has more {} per serving?",
            self.nutrient.comparison_label()
        )
    }

    #[must_use]
    pub fn details(&self) -> String {
        format!(
            "{} ({}) vs {} ({})",
            self.first.name(),
            self.first.serving(),
            self.second.name(),
            self.second.serving()
        )
    }
}

/// A directional statement about two foods to be marked true or false.
#[derive(Debug, Clone, PartialEq)]
pub struct TrueFalseQuestion {
    first: FoodRecord,
    second: FoodRecord,
    nutrient: Nutrient,
    asserts_first_greater: bool,
}

impl TrueFalseQuestion {
    #[must_use]
    pub fn new(
        first: FoodRecord,
        second: FoodRecord,
        nutrient: Nutrient,
        asserts_first_greater: bool,
    ) -> Self {
        Self {
            first,
            second,
            nutrient,
            asserts_first_greater,
        }
    }

    #[must_use]
    pub fn first(&self) -> &FoodRecord {
        &self.first
    }

    #[must_use]
    pub fn second(&self) -> &FoodRecord {
        &self.second
    }

    #[must_use]
    pub fn nutrient(&self) -> Nutrient {
        self.nutrient
    }

    #[must_use]
    pub fn asserts_first_greater(&self) -> bool {
        self.asserts_first_greater
    }

    /// Truth of the asserted statement against the actual data.
    #[must_use]
    pub fn truth(&self) -> bool {
        let a = self.first.value(self.nutrient);
        let b = self.second.value(self.nutrient);
        if self.asserts_first_greater { a > b } else { b > a }
    }

    #[must_use]
    pub fn correct(&self) -> &'static str {
        if self.truth() { TRUE_OPTION } else { FALSE_OPTION }
    }

    #[must_use]
    pub fn text(&self) -> String {
        let (more, less) = if self.asserts_first_greater {
            (&self.first, &self.second)
        } else {
            (&self.second, &self.first)
        };
        format!(
            "{} has more {} per serving than {}.",
            more.name(),
            self.nutrient.key(),
            less.name()
        )
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq)]
pub enum Question {
    Numeric(NumericQuestion),
    Comparison(ComparisonQuestion),
    TrueFalse(TrueFalseQuestion),
}

impl Question {
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Question::Numeric(q) => q.text(),
            Question::Comparison(q) => q.text(),
            Question::TrueFalse(q) => q.text(),
        }
    }

    /// Secondary line shown under the prompt, if any.
    #[must_use]
    pub fn details(&self) -> Option<String> {
        match self {
            Question::Comparison(q) => Some(q.details()),
            _ => None,
        }
    }

    /// Prompt and details joined, as recorded in the review log.
    #[must_use]
    pub fn full_text(&self) -> String {
        match self.details() {
            Some(details) => format!("{} {details}", self.text()),
            None => self.text(),
        }
    }

    #[must_use]
    pub fn nutrient(&self) -> Nutrient {
        match self {
            Question::Numeric(q) => q.nutrient(),
            Question::Comparison(q) => q.nutrient(),
            Question::TrueFalse(q) => q.nutrient(),
        }
    }

    /// Selectable options, or `None` for free numeric entry.
    #[must_use]
    pub fn choices(&self) -> Option<Vec<&str>> {
        match self {
            Question::Numeric(_) => None,
            Question::Comparison(q) => Some(q.options().iter().map(String::as_str).collect()),
            Question::TrueFalse(_) => Some(vec![TRUE_OPTION, FALSE_OPTION]),
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Question::Numeric(_))
    }
}

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// A submitted answer, already parsed for the question it targets.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Number(f64),
    Choice(String),
}

impl Answer {
    /// Parse raw user input for the given question.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::Missing` for blank input and
    /// `AnswerError::NotANumber` when a numeric question gets non-numeric text.
    pub fn parse(question: &Question, raw: &str) -> Result<Self, AnswerError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AnswerError::Missing);
        }

        if question.is_numeric() {
            match raw.parse::<f64>() {
                Ok(value) if !value.is_nan() => Ok(Answer::Number(value)),
                _ => Err(AnswerError::NotANumber(raw.to_owned())),
            }
        } else {
            Ok(Answer::Choice(raw.to_owned()))
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Number(value) => write!(f, "{value}"),
            Answer::Choice(choice) => f.write_str(choice),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
