use thiserror::Error;

pub mod buffer;
pub mod bytes;
pub mod debug_table;
pub mod io;
pub mod preconditions;

/// Utilities `Result` type.
pub type Result<T> = std::result::Result<T, Error>;

/// Utilities `Error`.
#[derive(Debug, Error)]
pub enum Error {
    // preconditions
    #[error("illegal argument: {0}")]
    IllegalArgument(String),
    #[error("illegal state: {0}")]
    IllegalState(String),

    // bytes
    #[error("attempted to access outside buffer. needed {needed} bytes, {remaining} remaining")]
    OutOfSpace { needed: usize, remaining: usize },
}
