//! Answer judging.
//!
//! Numeric answers use a two-tier rule: an integer-rounding match is always
//! accepted, and only quantities of at least [`RELATIVE_TOLERANCE_FLOOR`] get
//! the percentage band on top of that. Choice answers must match exactly.

use crate::model::{Answer, Question};

/// Below this correct value only a rounding match is accepted.
pub const RELATIVE_TOLERANCE_FLOOR: f64 = 20.0;

/// Outcome of judging one answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgement {
    pub correct: bool,
    /// The expected answer, formatted for feedback ("105 kcal", "True", ...).
    pub correct_display: String,
}

/// Returns true if `input` is close enough to `correct` under `pct` percent.
///
/// # Examples
///
/// ```
/// # use nutri_core::scoring::within_tolerance;
/// assert!(within_tolerance(100.0, 105.0, 10));
/// assert!(!within_tolerance(80.0, 105.0, 10));
/// assert!(!within_tolerance(9.0, 10.0, 50));
/// ```
#[must_use]
pub fn within_tolerance(input: f64, correct: f64, pct: u32) -> bool {
    if input.is_nan() {
        return false;
    }

    if input.round() == correct.round() {
        return true;
    }

    if correct < RELATIVE_TOLERANCE_FLOOR {
        return false;
    }

    let allowed = f64::from(pct) / 100.0 * correct.max(1.0);
    (input - correct).abs() <= allowed
}

/// Judge `answer` against `question`.
///
/// A choice answer given to a numeric question is parsed as a number first;
/// a number given to a choice question never matches.
#[must_use]
pub fn judge(question: &Question, answer: &Answer, tolerance_pct: u32) -> Judgement {
    match question {
        Question::Numeric(q) => {
            let expected = q.correct_value();
            let input = match answer {
                Answer::Number(value) => *value,
                Answer::Choice(raw) => raw.trim().parse::<f64>().unwrap_or(f64::NAN),
            };
            Judgement {
                correct: within_tolerance(input, expected, tolerance_pct),
                correct_display: format!("{expected} {}", q.nutrient().unit()),
            }
        }
        Question::Comparison(q) => judge_choice(answer, q.correct()),
        Question::TrueFalse(q) => judge_choice(answer, q.correct()),
    }
}

fn judge_choice(answer: &Answer, expected: &str) -> Judgement {
    let correct = match answer {
        Answer::Choice(choice) => choice == expected,
        Answer::Number(_) => false,
    };
    Judgement {
        correct,
        correct_display: expected.to_owned(),
    }
}
