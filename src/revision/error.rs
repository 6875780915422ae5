use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Invalid revision list: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Revision store lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Format(#[from] FormatError),
}
