#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("dragon not found: {0}")]
    DragonNotFound(String),
    #[error("hunter not found: {0}")]
    HunterNotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    #[error("dragon is already closed")]
    AlreadyClosed,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] sled::Error),
    #[error("codec failure: {0}")]
    Codec(String),
}
