//! Random question generation over a food catalog.
//!
//! Every function takes the random source explicitly so callers can pass a
//! seeded `StdRng` for deterministic lessons.

use std::fmt;

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom, index};

use nutri_core::model::{
    ComparisonQuestion, FoodRecord, Nutrient, NumericQuestion, Question, TrueFalseQuestion,
};

use crate::error::LessonError;

/// Question category selecting the generation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Skill {
    Calories,
    Protein,
    Carbs,
    Fat,
    Fiber,
    Compare,
    TrueFalse,
    Mixed,
}

/// Skills a mixed lesson draws from, uniformly.
pub const MIXED_SKILLS: [Skill; 5] = [
    Skill::Calories,
    Skill::Protein,
    Skill::Fiber,
    Skill::Compare,
    Skill::TrueFalse,
];

impl Skill {
    /// Parse a skill key; anything unrecognised is `Mixed`.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "calories" => Skill::Calories,
            "protein" => Skill::Protein,
            "carbs" => Skill::Carbs,
            "fat" => Skill::Fat,
            "fiber" => Skill::Fiber,
            "compare" => Skill::Compare,
            "truefalse" => Skill::TrueFalse,
            _ => Skill::Mixed,
        }
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Skill::Calories => "calories",
            Skill::Protein => "protein",
            Skill::Carbs => "carbs",
            Skill::Fat => "fat",
            Skill::Fiber => "fiber",
            Skill::Compare => "compare",
            Skill::TrueFalse => "truefalse",
            Skill::Mixed => "mixed",
        }
    }

    /// The nutrient asked about by a single-food skill.
    #[must_use]
    pub fn nutrient(self) -> Option<Nutrient> {
        match self {
            Skill::Calories => Some(Nutrient::Calories),
            Skill::Protein => Some(Nutrient::Protein),
            Skill::Carbs => Some(Nutrient::Carbs),
            Skill::Fat => Some(Nutrient::Fat),
            Skill::Fiber => Some(Nutrient::Fiber),
            Skill::Compare | Skill::TrueFalse | Skill::Mixed => None,
        }
    }

    /// Smallest catalog this skill can draw questions from.
    #[must_use]
    pub fn min_foods(self) -> usize {
        match self {
            Skill::Compare | Skill::TrueFalse | Skill::Mixed => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn check_catalog(skill: Skill, foods: &[FoodRecord]) -> Result<(), LessonError> {
    if foods.is_empty() {
        return Err(LessonError::EmptyCatalog);
    }
    let required = skill.min_foods();
    if foods.len() < required {
        return Err(LessonError::NotEnoughFoods {
            skill,
            required,
            available: foods.len(),
        });
    }
    Ok(())
}

fn pick_nutrient<R: Rng + ?Sized>(rng: &mut R) -> Nutrient {
    Nutrient::ALL[rng.random_range(0..Nutrient::ALL.len())]
}

/// Two distinct records, in random order.
fn pick_pair<'a, R: Rng + ?Sized>(
    foods: &'a [FoodRecord],
    rng: &mut R,
) -> (&'a FoodRecord, &'a FoodRecord) {
    let picked = index::sample(rng, foods.len(), 2);
    (&foods[picked.index(0)], &foods[picked.index(1)])
}

/// Generate one question for `skill`.
///
/// # Errors
///
/// Returns `LessonError::EmptyCatalog` or `LessonError::NotEnoughFoods` if
/// the catalog is too small for the skill.
pub fn generate<R: Rng + ?Sized>(
    skill: Skill,
    foods: &[FoodRecord],
    rng: &mut R,
) -> Result<Question, LessonError> {
    check_catalog(skill, foods)?;

    let question = match skill {
        Skill::Compare => {
            let (first, second) = pick_pair(foods, rng);
            let nutrient = pick_nutrient(rng);
            Question::Comparison(
                ComparisonQuestion::new(first.clone(), second.clone(), nutrient)
                    .reorder_options(|options| options.shuffle(rng)),
            )
        }
        Skill::TrueFalse => {
            let (first, second) = pick_pair(foods, rng);
            let nutrient = pick_nutrient(rng);
            let asserts_first_greater = rng.random_bool(0.5);
            Question::TrueFalse(TrueFalseQuestion::new(
                first.clone(),
                second.clone(),
                nutrient,
                asserts_first_greater,
            ))
        }
        Skill::Mixed => {
            let resolved = MIXED_SKILLS
                .choose(rng)
                .copied()
                .unwrap_or(Skill::Calories);
            return generate(resolved, foods, rng);
        }
        single => {
            let nutrient = single.nutrient().unwrap_or(Nutrient::Calories);
            let food = foods.choose(rng).ok_or(LessonError::EmptyCatalog)?;
            Question::Numeric(NumericQuestion::new(food.clone(), nutrient))
        }
    };

    Ok(question)
}

/// Generate `count` questions for `skill`.
///
/// A mixed lesson re-draws the skill for every question.
///
/// # Errors
///
/// Returns `LessonError::EmptyCatalog` or `LessonError::NotEnoughFoods` if
/// the catalog is too small for the skill.
pub fn build_lesson<R: Rng + ?Sized>(
    skill: Skill,
    foods: &[FoodRecord],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Question>, LessonError> {
    check_catalog(skill, foods)?;
    (0..count).map(|_| generate(skill, foods, rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutri_core::dataset::default_foods;
    use nutri_core::model::{EQUAL_OPTION, FoodDraft, TRUE_OPTION};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn food(name: &str, calories: f64) -> FoodRecord {
        FoodDraft {
            name: name.into(),
            serving: "1 cup".into(),
            calories,
            protein: calories / 10.0,
            ..FoodDraft::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn unknown_skill_keys_fall_back_to_mixed() {
        assert_eq!(Skill::from_key("compare"), Skill::Compare);
        assert_eq!(Skill::from_key("TrueFalse"), Skill::TrueFalse);
        assert_eq!(Skill::from_key("sodium"), Skill::Mixed);
        assert_eq!(Skill::from_key(""), Skill::Mixed);
    }

    #[test]
    fn numeric_skill_asks_for_that_nutrient() {
        let foods = default_foods().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let question = generate(Skill::Fiber, &foods, &mut rng).unwrap();
            let Question::Numeric(q) = question else {
                panic!("expected numeric question");
            };
            assert_eq!(q.nutrient(), Nutrient::Fiber);
            assert_eq!(q.correct_value(), q.food().value(Nutrient::Fiber));
        }
    }

    #[test]
    fn pair_questions_use_distinct_records() {
        let foods = vec![food("Oats", 150.0), food("Oats", 150.0)];
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let Question::Comparison(q) = generate(Skill::Compare, &foods, &mut rng).unwrap()
            else {
                panic!("expected comparison");
            };
            assert_eq!(q.correct(), EQUAL_OPTION);
            let mut options = q.options().to_vec();
            options.sort();
            assert_eq!(options, vec!["Oats", "Oats", "equal"]);
        }
    }

    #[test]
    fn comparison_options_are_shuffled() {
        let foods = vec![food("Rice", 200.0), food("Kale", 30.0)];
        let mut rng = StdRng::seed_from_u64(21);
        let mut orders = HashSet::new();
        for _ in 0..40 {
            let Question::Comparison(q) = generate(Skill::Compare, &foods, &mut rng).unwrap()
            else {
                panic!("expected comparison");
            };
            orders.insert(q.options().to_vec());
        }
        assert!(orders.len() >= 2, "options never changed order: {orders:?}");
        assert!(orders.iter().all(|order| order.len() == 3));
    }

    #[test]
    fn true_false_truth_matches_data() {
        let foods = vec![food("Rice", 200.0), food("Kale", 30.0)];
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let Question::TrueFalse(q) = generate(Skill::TrueFalse, &foods, &mut rng).unwrap()
            else {
                panic!("expected true/false");
            };
            let a = q.first().value(q.nutrient());
            let b = q.second().value(q.nutrient());
            let expected = if q.asserts_first_greater() { a > b } else { b > a };
            assert_eq!(q.correct() == TRUE_OPTION, expected);
        }
    }

    #[test]
    fn mixed_lesson_draws_only_mixed_skills() {
        let foods = default_foods().unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        let lesson = build_lesson(Skill::Mixed, &foods, 60, &mut rng).unwrap();
        assert_eq!(lesson.len(), 60);
        for question in &lesson {
            if let Question::Numeric(q) = question {
                assert!(matches!(
                    q.nutrient(),
                    Nutrient::Calories | Nutrient::Protein | Nutrient::Fiber
                ));
            }
        }
    }

    #[test]
    fn same_seed_builds_same_lesson() {
        let foods = default_foods().unwrap();
        let a = build_lesson(Skill::Mixed, &foods, 10, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = build_lesson(Skill::Mixed, &foods, 10, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn small_catalogs_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            build_lesson(Skill::Calories, &[], 3, &mut rng),
            Err(LessonError::EmptyCatalog)
        ));

        let one = vec![food("Egg", 72.0)];
        assert_eq!(build_lesson(Skill::Fat, &one, 3, &mut rng).unwrap().len(), 3);
        assert!(matches!(
            build_lesson(Skill::Compare, &one, 3, &mut rng),
            Err(LessonError::NotEnoughFoods {
                required: 2,
                available: 1,
                ..
            })
        ));
    }
}
