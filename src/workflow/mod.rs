pub mod intake_session;
pub mod submission_flow;

pub use intake_session::IntakeSession;
pub use submission_flow::SubmissionOrchestrator;
