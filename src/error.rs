use crate::store;

pub type Result<T> = core::result::Result<T, Error>;

/// Startup failures. Config problems panic in `get_or_init_config` and request-time
/// errors end at the response mapper, so neither shows up here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
