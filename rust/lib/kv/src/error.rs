use thiserror::Error;

#[derive(Error, Debug)]
pub enum KVError {
    #[error("storage error: {0}")]
    Storage(String),

    /// The write would take the store past its byte budget.
    #[error("storage quota exceeded: {used} of {quota} bytes")]
    QuotaExceeded { used: usize, quota: usize },
}
