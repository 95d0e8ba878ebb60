//! Block storage primitives.
//!
//! - [`BlockId`] names one fixed-size block of one file.
//! - [`Page`] is an in-memory block image with typed field accessors.
//! - [`FileManager`] moves whole blocks between pages and files in the data directory.

use std::{io, path::PathBuf};

use thiserror::Error;

pub mod block_id;
pub mod file_manager;
pub mod page;

pub use block_id::BlockId;
pub use file_manager::{AccessStatistics, FileManager, FileManagerConfig};
pub use page::{Page, PageError};

pub type BlockNumber = u32;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // page
    #[error(transparent)]
    Page(#[from] PageError),

    // block io
    #[error("can't read block {block}")]
    Read {
        block: BlockId,
        #[source]
        source: io::Error,
    },
    #[error("can't write block {block}")]
    Write {
        block: BlockId,
        #[source]
        source: io::Error,
    },
    #[error(
        "page was partially written to block {block}, expected bytes to be written {expected} but actually was written {written}"
    )]
    PartialWrite {
        block: BlockId,
        expected: usize,
        written: usize,
    },
    #[error("can't append to file '{file}'")]
    Append {
        file: String,
        #[source]
        source: io::Error,
    },

    // files and directories
    #[error("can't open file '{}'", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("can't prepare database directory '{}'", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("database folder should be a directory path, but found '{}'", .0.display())]
    NotADirectory(PathBuf),

    // configuration
    #[error("file manager already initialized with {existing:?}, refusing {requested:?}")]
    ConfigMismatch {
        existing: Box<FileManagerConfig>,
        requested: Box<FileManagerConfig>,
    },

    // utils
    #[error(transparent)]
    Utils(#[from] crate::utils::Error),
}
