/// Aggregated view of lesson progress, useful for the progress bar and hearts row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonProgress {
    pub answered: usize,
    pub goal: usize,
    pub hearts: u8,
    pub hearts_lost: u8,
    pub is_finished: bool,
}

impl LessonProgress {
    /// Completed fraction in `0.0..=1.0`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.goal == 0 {
            return 1.0;
        }
        let answered = u32::try_from(self.answered).unwrap_or(u32::MAX);
        let goal = u32::try_from(self.goal).unwrap_or(u32::MAX);
        (f64::from(answered) / f64::from(goal)).min(1.0)
    }
}
