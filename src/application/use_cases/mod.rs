pub mod review_session;
pub mod submission;
pub mod table_preparer;
