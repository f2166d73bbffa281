pub mod form_controller;
pub mod loading_progress;
pub mod report_actions;
pub mod response_normalizer;

pub use form_controller::FormController;
pub use loading_progress::{LoadingProgress, LOADING_STEP_INTERVAL};
pub use report_actions::{DownloadTarget, ReportSaver, ReportView, SharePayload};
pub use response_normalizer::normalize;
