#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod config;
pub mod error;
pub mod lessons;
pub mod progress_service;
pub mod transfer;

pub use nutri_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::CatalogService;
pub use config::ServicesConfig;
pub use error::{
    AppServicesError, CatalogError, ConfigError, LessonError, ProgressServiceError, TransferError,
};
pub use lessons::{
    Feedback, LessonLoopService, LessonMode, LessonProgress, LessonResult, LessonSession, Skill,
};
pub use progress_service::{ProgressService, ProgressSnapshot};
pub use transfer::{ExportBlob, ImportReport, TransferService};
