pub type StoreResult<T> = core::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to connect to the store: {0}")]
    Connect(String),
    #[error("failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },
    #[error("failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },
}
