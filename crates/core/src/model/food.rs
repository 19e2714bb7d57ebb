use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum FoodError {
    #[error("food name cannot be empty")]
    EmptyName,

    #[error("serving description cannot be empty")]
    EmptyServing,

    #[error("{nutrient} must be a non-negative number, got {value}")]
    InvalidNutrient { nutrient: Nutrient, value: f64 },
}

//
// ─── NUTRIENT ──────────────────────────────────────────────────────────────────
//

/// The five per-serving quantities tracked for every food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nutrient {
    Calories,
    Protein,
    Carbs,
    Fat,
    Fiber,
}

impl Nutrient {
    pub const ALL: [Nutrient; 5] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Fiber,
        Nutrient::Carbs,
        Nutrient::Fat,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Carbs => "carbs",
            Nutrient::Fat => "fat",
            Nutrient::Fiber => "fiber",
        }
    }

    /// Label used in "About how many ... are in" prompts.
    #[must_use]
    pub fn amount_label(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "grams of protein",
            Nutrient::Carbs => "grams of carbs",
            Nutrient::Fat => "grams of fat",
            Nutrient::Fiber => "grams of fiber",
        }
    }

    /// Label used in "Which has more ..." prompts.
    #[must_use]
    pub fn comparison_label(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein (g)",
            Nutrient::Carbs => "carbs (g)",
            Nutrient::Fat => "fat (g)",
            Nutrient::Fiber => "fiber (g)",
        }
    }

    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Nutrient::Calories => "kcal",
            _ => "g",
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

//
// ─── FOOD RECORD ───────────────────────────────────────────────────────────────
//

/// Unvalidated food input, as typed into the editor or read from JSON.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FoodDraft {
    pub name: String,
    pub serving: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl FoodDraft {
    /// Validate the draft into an immutable record.
    ///
    /// Name and serving are trimmed; a blank category falls back to `misc`.
    ///
    /// # Errors
    ///
    /// Returns `FoodError` if name/serving are blank or a nutrient is NaN,
    /// infinite or negative.
    pub fn validate(self) -> Result<FoodRecord, FoodError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(FoodError::EmptyName);
        }
        let serving = self.serving.trim().to_owned();
        if serving.is_empty() {
            return Err(FoodError::EmptyServing);
        }

        let values = [
            (Nutrient::Calories, self.calories),
            (Nutrient::Protein, self.protein),
            (Nutrient::Carbs, self.carbs),
            (Nutrient::Fat, self.fat),
            (Nutrient::Fiber, self.fiber),
        ];
        for (nutrient, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(FoodError::InvalidNutrient { nutrient, value });
            }
        }

        let category = self
            .category
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "misc".to_owned());
        let notes = self.notes.map(|n| n.trim().to_owned()).unwrap_or_default();

        Ok(FoodRecord {
            name,
            serving,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: self.fiber,
            category,
            notes,
        })
    }
}

/// A single catalog entry. Values are per serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FoodDraft")]
pub struct FoodRecord {
    name: String,
    serving: String,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    fiber: f64,
    category: String,
    notes: String,
}

impl TryFrom<FoodDraft> for FoodRecord {
    type Error = FoodError;

    fn try_from(draft: FoodDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl FoodRecord {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn serving(&self) -> &str {
        &self.serving
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    #[must_use]
    pub fn value(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fat => self.fat,
            Nutrient::Fiber => self.fiber,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
