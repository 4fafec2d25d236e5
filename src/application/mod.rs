pub mod use_cases;

pub use use_cases::review_session::{ReviewSessionUseCase, SubmitOutcome};
pub use use_cases::submission::{SubmissionHandler, SubmissionReceipt};
pub use use_cases::table_preparer::TablePreparer;
