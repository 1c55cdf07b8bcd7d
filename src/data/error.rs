use thiserror::Error;

/// Inputs the aggregator refuses before reading any file.
/// The messages are shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("Please upload at least one Excel or CSV file.")]
    NoFiles,

    #[error("Please enter a Job ID.")]
    EmptyJobId,
}
