pub mod error;
pub mod opinion;
pub mod review_session;
pub mod submission;

// Review grid types
pub mod table;
