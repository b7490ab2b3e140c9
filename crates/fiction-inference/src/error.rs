use thiserror::Error;

/// Errors raised while loading or validating the pre-trained genre model.
///
/// Both variants are fatal to the caller's request: a missing or corrupt
/// model must never be silently replaced with a default.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The artifact could not be read from its backing store.
    #[error("model artifact unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    /// The artifact bytes did not decode into a usable model.
    #[error("model artifact malformed: {0}")]
    Malformed(String),
}
