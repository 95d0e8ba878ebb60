use thiserror::Error;

pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    // config
    #[error("invalid block size: {value}\nmessage: {msg}")]
    InvalidBlockSize { msg: String, value: String },
    #[error("invalid file name: {0}")]
    InvalidFilePath(String),
    #[error("can't load environment: {0}")]
    Env(#[from] dotenvy::Error),

    // internal
    #[error(transparent)]
    Storage(#[from] crate::storage::Error),
}
