pub mod form;
pub mod intake;
pub mod loaders;
pub mod submission;

pub use form::{DocumentFile, DocumentSlot, FloodStatus, FormField, FormState, Step};
pub use intake::IntakeFile;
pub use loaders::{load_all_intake_files, load_intake_file};
pub use submission::{ImageRef, ReportPayload, SubmissionResult};
