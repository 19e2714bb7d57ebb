use chrono::{DateTime, Utc};
use nutri_core::model::{Answer, Question, XP_PER_CORRECT};
use nutri_core::scoring::judge;

use super::generator::Skill;
use super::progress::LessonProgress;
use crate::error::LessonError;

/// Hearts at the start of every lesson.
pub const STARTING_HEARTS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LessonMode {
    /// Counts towards the daily streak.
    Daily,
    Practice,
}

//
// ─── FEEDBACK ──────────────────────────────────────────────────────────────────
//

/// Judged outcome of one submitted answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub correct: bool,
    pub correct_display: String,
    pub submitted: String,
    pub xp_awarded: u64,
}

impl Feedback {
    #[must_use]
    pub fn message(&self) -> String {
        if self.correct {
            format!("Correct! +{} XP", self.xp_awarded)
        } else {
            format!("Not quite. Correct: {}", self.correct_display)
        }
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory lesson state machine.
///
/// A submitted answer is held as pending feedback until `advance` moves to
/// the next question; submissions in between are rejected. The lesson
/// finishes on the advance (or skip) that leaves no hearts or reaches the goal.
#[derive(Debug, Clone)]
pub struct LessonSession {
    mode: LessonMode,
    skill: Skill,
    questions: Vec<Question>,
    current: usize,
    hearts: u8,
    correct: usize,
    wrong: usize,
    xp_earned: u64,
    tolerance_pct: u32,
    pending: Option<Feedback>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl LessonSession {
    /// Create a lesson over pre-generated questions.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::NoQuestions` if `questions` is empty.
    pub fn new(
        mode: LessonMode,
        skill: Skill,
        questions: Vec<Question>,
        tolerance_pct: u32,
        started_at: DateTime<Utc>,
    ) -> Result<Self, LessonError> {
        if questions.is_empty() {
            return Err(LessonError::NoQuestions);
        }

        Ok(Self {
            mode,
            skill,
            questions,
            current: 0,
            hearts: STARTING_HEARTS,
            correct: 0,
            wrong: 0,
            xp_earned: 0,
            tolerance_pct,
            pending: None,
            started_at,
            finished_at: None,
        })
    }

    #[must_use]
    pub fn mode(&self) -> LessonMode {
        self.mode
    }

    #[must_use]
    pub fn skill(&self) -> Skill {
        self.skill
    }

    #[must_use]
    pub fn goal(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn hearts(&self) -> u8 {
        self.hearts
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn wrong_count(&self) -> usize {
        self.wrong
    }

    #[must_use]
    pub fn xp_earned(&self) -> u64 {
        self.xp_earned
    }

    #[must_use]
    pub fn tolerance_pct(&self) -> u32 {
        self.tolerance_pct
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Feedback for the answered question not yet advanced past.
    #[must_use]
    pub fn pending_feedback(&self) -> Option<&Feedback> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_finished() {
            return None;
        }
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn progress(&self) -> LessonProgress {
        LessonProgress {
            answered: self.current.min(self.goal()),
            goal: self.goal(),
            hearts: self.hearts,
            hearts_lost: STARTING_HEARTS - self.hearts,
            is_finished: self.is_finished(),
        }
    }

    /// One-line result shown when the lesson ends.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "You got {}/{} right and earned {} XP.",
            self.correct,
            self.goal(),
            self.xp_earned
        )
    }

    fn ensure_answerable(&self) -> Result<&Question, LessonError> {
        if self.pending.is_some() {
            return Err(LessonError::AwaitingAdvance);
        }
        self.current_question().ok_or(LessonError::Completed)
    }

    /// Judge raw input against the current question without changing state.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Completed` once finished,
    /// `LessonError::AwaitingAdvance` while feedback is pending and
    /// `LessonError::Answer` for blank or non-numeric input.
    pub fn evaluate(&self, raw: &str) -> Result<Feedback, LessonError> {
        let question = self.ensure_answerable()?;
        let answer = Answer::parse(question, raw)?;
        let judgement = judge(question, &answer, self.tolerance_pct);

        Ok(Feedback {
            correct: judgement.correct,
            correct_display: judgement.correct_display,
            submitted: answer.to_string(),
            xp_awarded: if judgement.correct { XP_PER_CORRECT } else { 0 },
        })
    }

    /// Apply feedback from [`Self::evaluate`] to the current question.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Completed` once finished and
    /// `LessonError::AwaitingAdvance` while feedback is pending.
    pub fn record(&mut self, feedback: Feedback) -> Result<(), LessonError> {
        self.ensure_answerable()?;
        if feedback.correct {
            self.correct += 1;
            self.xp_earned += feedback.xp_awarded;
        } else {
            self.wrong += 1;
            self.hearts = self.hearts.saturating_sub(1);
        }
        self.pending = Some(feedback);
        Ok(())
    }

    /// Judge raw input and apply the result.
    ///
    /// Invalid input leaves the session untouched.
    ///
    /// # Errors
    ///
    /// See [`Self::evaluate`].
    pub fn submit(&mut self, raw: &str) -> Result<Feedback, LessonError> {
        let feedback = self.evaluate(raw)?;
        self.record(feedback.clone())?;
        Ok(feedback)
    }

    /// Move past the answered question.
    ///
    /// Returns `true` if the lesson is now finished.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Completed` once finished and
    /// `LessonError::NothingToAdvance` if no answer is pending.
    pub fn advance(&mut self, at: DateTime<Utc>) -> Result<bool, LessonError> {
        if self.is_finished() {
            return Err(LessonError::Completed);
        }
        if self.pending.take().is_none() {
            return Err(LessonError::NothingToAdvance);
        }
        Ok(self.step(at))
    }

    /// Move past the current question without judging it.
    ///
    /// Returns `true` if the lesson is now finished.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Completed` once finished and
    /// `LessonError::AwaitingAdvance` while feedback is pending.
    pub fn skip(&mut self, at: DateTime<Utc>) -> Result<bool, LessonError> {
        self.ensure_answerable()?;
        Ok(self.step(at))
    }

    fn step(&mut self, at: DateTime<Utc>) -> bool {
        self.current += 1;
        if self.hearts == 0 || self.current >= self.goal() {
            self.finished_at = Some(at);
        }
        self.is_finished()
    }
}
