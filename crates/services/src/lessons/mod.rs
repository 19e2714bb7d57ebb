mod generator;
mod progress;
mod session;
mod workflow;

// Public API of the lesson subsystem.
pub use crate::error::LessonError;
pub use generator::{MIXED_SKILLS, Skill, build_lesson, generate};
pub use progress::LessonProgress;
pub use session::{Feedback, LessonMode, LessonSession, STARTING_HEARTS};
pub use workflow::{LessonLoopService, LessonResult, REVIEW_PREVIEW_LEN};
