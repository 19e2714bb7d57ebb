use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use nutri_core::model::{Question, ReviewEntry, StreakUpdate};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::generator::{Skill, build_lesson};
use super::session::{Feedback, LessonMode, LessonSession};
use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::config::DEFAULT_FEEDBACK_DELAY;
use crate::error::LessonError;
use crate::progress_service::ProgressService;

/// Review entries shown on the result screen.
pub const REVIEW_PREVIEW_LEN: usize = 10;

/// What the learner sees once a lesson ends.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonResult {
    pub summary: String,
    pub correct: usize,
    pub goal: usize,
    pub xp_earned: u64,
    pub hearts: u8,
    /// Streak after this lesson; `None` for practice lessons.
    pub streak: Option<StreakUpdate>,
    pub review: Vec<ReviewEntry>,
}

/// Orchestrates lesson start, persisted answering and completion.
#[derive(Clone)]
pub struct LessonLoopService {
    clock: Clock,
    catalog: CatalogService,
    progress: ProgressService,
    feedback_delay: Duration,
    rng: Arc<Mutex<StdRng>>,
}

impl LessonLoopService {
    #[must_use]
    pub fn new(clock: Clock, catalog: CatalogService, progress: ProgressService) -> Self {
        Self {
            clock,
            catalog,
            progress,
            feedback_delay: DEFAULT_FEEDBACK_DELAY,
            rng: Arc::new(Mutex::new(StdRng::from_os_rng())),
        }
    }

    #[must_use]
    pub fn with_feedback_delay(mut self, delay: Duration) -> Self {
        self.feedback_delay = delay;
        self
    }

    /// Make question generation deterministic.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    #[must_use]
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    /// Start a lesson of `daily goal` questions for `skill`.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` if the catalog cannot be loaded or is too small
    /// for the skill.
    pub async fn begin(&self, mode: LessonMode, skill: Skill) -> Result<LessonSession, LessonError> {
        let prefs = self.progress.preferences().await?;
        let foods = self.catalog.load().await?;
        let goal = usize::try_from(prefs.daily_goal()).unwrap_or(usize::MAX);

        let questions = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            build_lesson(skill, &foods, goal, &mut *rng)?
        };
        let session = LessonSession::new(
            mode,
            skill,
            questions,
            prefs.leniency(),
            self.clock.now(),
        )?;

        tracing::info!(?mode, %skill, goal, "lesson started");
        Ok(session)
    }

    /// Judge and persist an answer to the current question.
    ///
    /// A correct answer adds XP to the stored counters; a miss is prepended
    /// to the review log. The session is only updated once that write
    /// succeeds, so a storage failure leaves the question open for a retry.
    /// The session then waits for `advance`.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` for invalid input, a finished lesson, a pending
    /// answer, or persistence failures.
    pub async fn submit(
        &self,
        session: &mut LessonSession,
        raw: &str,
    ) -> Result<Feedback, LessonError> {
        let feedback = session.evaluate(raw)?;
        tracing::debug!(correct = feedback.correct, answer = %feedback.submitted, "answer judged");

        if feedback.correct {
            self.progress.award_xp(feedback.xp_awarded).await?;
        } else {
            let question_text = session
                .current_question()
                .map(Question::full_text)
                .unwrap_or_default();
            let entry = ReviewEntry::new(
                self.clock.now(),
                question_text,
                feedback.submitted.clone(),
                feedback.correct_display.clone(),
            );
            self.progress.record_miss(&entry).await?;
        }

        session.record(feedback.clone())?;
        Ok(feedback)
    }

    /// Wait out the feedback delay, then move to the next question.
    ///
    /// Returns the lesson result if this advance finished the lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::NothingToAdvance` if no answer is pending.
    pub async fn advance(
        &self,
        session: &mut LessonSession,
    ) -> Result<Option<LessonResult>, LessonError> {
        if session.pending_feedback().is_none() {
            return Err(if session.is_finished() {
                LessonError::Completed
            } else {
                LessonError::NothingToAdvance
            });
        }
        tokio::time::sleep(self.feedback_delay).await;

        if session.advance(self.clock.now())? {
            return self.finish(session).await.map(Some);
        }
        Ok(None)
    }

    /// Submit then advance; the usual path for a single answer.
    ///
    /// # Errors
    ///
    /// See [`Self::submit`] and [`Self::advance`].
    pub async fn answer(
        &self,
        session: &mut LessonSession,
        raw: &str,
    ) -> Result<(Feedback, Option<LessonResult>), LessonError> {
        let feedback = self.submit(session, raw).await?;
        let result = self.advance(session).await?;
        Ok((feedback, result))
    }

    /// Skip the current question.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` if the lesson is finished, an answer is pending,
    /// or completion cannot be persisted.
    pub async fn skip(
        &self,
        session: &mut LessonSession,
    ) -> Result<Option<LessonResult>, LessonError> {
        if session.skip(self.clock.now())? {
            return self.finish(session).await.map(Some);
        }
        Ok(None)
    }

    /// Discard `session` and start a practice lesson with the same skill.
    ///
    /// # Errors
    ///
    /// See [`Self::begin`].
    pub async fn restart(&self, session: LessonSession) -> Result<LessonSession, LessonError> {
        self.begin(LessonMode::Practice, session.skill()).await
    }

    async fn finish(&self, session: &LessonSession) -> Result<LessonResult, LessonError> {
        let streak = match session.mode() {
            LessonMode::Daily => Some(self.progress.record_daily_play().await?),
            LessonMode::Practice => None,
        };
        let review = self.progress.review_preview(REVIEW_PREVIEW_LEN).await?;

        tracing::info!(
            correct = session.correct_count(),
            goal = session.goal(),
            xp = session.xp_earned(),
            "lesson finished"
        );

        Ok(LessonResult {
            summary: session.summary_line(),
            correct: session.correct_count(),
            goal: session.goal(),
            xp_earned: session.xp_earned(),
            hearts: session.hearts(),
            streak,
            review,
        })
    }
}
