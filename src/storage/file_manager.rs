use std::{
    collections::{HashMap, hash_map::Entry},
    fs::{self, File},
    io,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use parking_lot::{Mutex, const_mutex};

use crate::{
    os::{Open, OpenOptions},
    utils::{
        self,
        io::{BlockIO, FileOps},
        preconditions::check_argument,
    },
};

use super::{BlockId, BlockNumber, Error, Page, Result};

/// Files in the data directory starting with this prefix are scratch files
/// and get removed when a file manager starts.
pub const TEMP_FILE_PREFIX: &str = "temp";

/// Process wide file manager, see [`FileManager::global`].
static GLOBAL: Mutex<Option<Arc<FileManager>>> = const_mutex(None);

/// Accepts only names that resolve to a file directly inside the data
/// directory: one normal path component, no separators, no `.` or `..`.
pub fn check_file_name(file_name: &str) -> utils::Result<()> {
    let mut components = Path::new(file_name).components();

    let plain = match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => name.to_str() == Some(file_name),
        _ => false,
    };

    check_argument(
        plain,
        format!("'{file_name}' is not a plain file name inside data directory"),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileManagerConfig {
    /// Root directory of all database files.
    pub directory: PathBuf,
    /// Size of every block of every file, in bytes.
    pub block_size: usize,
    /// Open files with `O_DSYNC`, so each block write reaches the disk before returning.
    pub sync_on_write: bool,
    /// Take exclusive advisory lock on every opened file.
    pub lock_files: bool,
}

impl FileManagerConfig {
    pub fn new(directory: impl Into<PathBuf>, block_size: usize) -> Self {
        Self {
            directory: directory.into(),
            block_size,
            sync_on_write: true,
            lock_files: true,
        }
    }

    pub fn sync_on_write(mut self, sync_on_write: bool) -> Self {
        self.sync_on_write = sync_on_write;
        self
    }

    pub fn lock_files(mut self, lock_files: bool) -> Self {
        self.lock_files = lock_files;
        self
    }
}

/// Snapshot of block access counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessStatistics {
    pub blocks_read: u64,
    pub blocks_written: u64,
}

impl AccessStatistics {
    pub fn new(blocks_read: u64, blocks_written: u64) -> Self {
        Self {
            blocks_read,
            blocks_written,
        }
    }
}

struct FileManagerState {
    /// Keyed by absolute path. Handles stay open until the manager is dropped.
    open_files: HashMap<PathBuf, BlockIO<File>>,
    stats: AccessStatistics,
}

/// Moves whole blocks between [`Page`]s and files of the data directory.
///
/// All operations go through one mutex, so block I/O of a single manager is
/// fully serialized: a read always observes preceding writes and two writes
/// to the same block never interleave. There is no parallelism across files.
pub struct FileManager {
    config: FileManagerConfig,
    directory: PathBuf,
    is_new: bool,
    state: Mutex<FileManagerState>,
}

impl FileManager {
    /// Opens data directory described by `config`, creating it if missing, and
    /// removes leftover temp files.
    pub fn new(config: FileManagerConfig) -> Result<Self> {
        check_argument(
            config.block_size > 0,
            format!(
                "Block size should be greater than 0, blockSize: {}",
                config.block_size
            ),
        )?;

        let dir = &config.directory;
        let directory_error = |source: io::Error| Error::Directory {
            path: dir.clone(),
            source,
        };

        let is_new = !dir.exists();

        if is_new {
            log::info!("Database directory not detected. Creating {:?}", dir);
            fs::create_dir_all(dir).map_err(directory_error)?;
        } else if !dir.is_dir() {
            return Err(Error::NotADirectory(dir.clone()));
        }

        let directory = fs::canonicalize(dir).map_err(directory_error)?;

        Self::remove_temp_files(&directory)?;

        log::info!(
            "File manager initialized at {:?} with block size {}",
            directory,
            config.block_size
        );

        Ok(Self {
            config,
            directory,
            is_new,
            state: Mutex::new(FileManagerState {
                open_files: HashMap::new(),
                stats: AccessStatistics::default(),
            }),
        })
    }

    /// Returns process wide manager, creating it on first call.
    ///
    /// Later calls must pass the same configuration, otherwise
    /// [`Error::ConfigMismatch`] is returned.
    pub fn global(config: FileManagerConfig) -> Result<Arc<Self>> {
        let mut global = GLOBAL.lock();

        if let Some(existing) = global.as_ref() {
            if existing.config == config {
                return Ok(Arc::clone(existing));
            }

            return Err(Error::ConfigMismatch {
                existing: Box::new(existing.config.clone()),
                requested: Box::new(config),
            });
        }

        let file_manager = Arc::new(Self::new(config)?);
        *global = Some(Arc::clone(&file_manager));

        Ok(file_manager)
    }

    fn remove_temp_files(directory: &Path) -> Result<()> {
        let directory_error = |source: io::Error| Error::Directory {
            path: directory.to_path_buf(),
            source,
        };

        for entry in fs::read_dir(directory).map_err(directory_error)? {
            let entry = entry.map_err(directory_error)?;

            let is_temp = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(TEMP_FILE_PREFIX));

            if is_temp && entry.file_type().map_err(directory_error)?.is_file() {
                log::info!("Removing temp file {:?}", entry.path());
                File::remove(entry.path()).map_err(directory_error)?;
            }
        }

        Ok(())
    }

    pub fn block_size(&self) -> usize {
        self.config.block_size
    }

    /// Absolute path of the data directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// True if the data directory did not exist before this manager was created.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn config(&self) -> &FileManagerConfig {
        &self.config
    }

    pub fn stats(&self) -> AccessStatistics {
        self.state.lock().stats
    }

    /// Reads block content from disk into `page`.
    ///
    /// Part of the page that lies past end of file is zero-filled.
    pub fn read(&self, block: &BlockId, page: &mut Page) -> Result<()> {
        self.check_page(page)?;

        let mut state = self.state.lock();
        let FileManagerState { open_files, stats } = &mut *state;

        let file = self.open_block(open_files, block, |block, source| Error::Read {
            block,
            source,
        })?;
        let contents = page.contents_mut();

        let read = file
            .read(block.number(), contents)
            .map_err(|source| Error::Read {
                block: block.clone(),
                source,
            })?;
        contents[read..].fill(0);

        stats.blocks_read += 1;
        log::trace!("Read block {block} ({read} bytes)");

        Ok(())
    }

    /// Writes whole `page` into block. Partial writes are errors.
    pub fn write(&self, block: &BlockId, page: &Page) -> Result<()> {
        self.check_page(page)?;

        let mut state = self.state.lock();
        let FileManagerState { open_files, stats } = &mut *state;

        let file = self.open_block(open_files, block, |block, source| Error::Write {
            block,
            source,
        })?;

        let written = file
            .write(block.number(), page.contents())
            .map_err(|source| Error::Write {
                block: block.clone(),
                source,
            })?;

        if written != self.block_size() {
            return Err(Error::PartialWrite {
                block: block.clone(),
                expected: self.block_size(),
                written,
            });
        }

        stats.blocks_written += 1;
        log::trace!("Wrote block {block}");

        Ok(())
    }

    /// Appends one zero-filled block at the end of file and returns its id.
    ///
    /// New block number is `file length / block size`, so a trailing partial
    /// block gets overwritten.
    pub fn append(&self, file_name: &str) -> Result<BlockId> {
        let mut state = self.state.lock();
        let FileManagerState { open_files, stats } = &mut *state;

        let file = self.open_file(open_files, file_name)?;
        let append_error = |source: io::Error| Error::Append {
            file: file_name.to_string(),
            source,
        };

        let num_blocks = file.num_blocks().map_err(append_error)?;
        let number = BlockNumber::try_from(num_blocks).map_err(|_| {
            utils::Error::IllegalState(format!(
                "file '{file_name}' already holds maximum number of blocks"
            ))
        })?;

        let block = BlockId::new(file_name, number);

        let written = file
            .write(number, &vec![0; self.block_size()])
            .map_err(append_error)?;

        if written != self.block_size() {
            return Err(Error::PartialWrite {
                block,
                expected: self.block_size(),
                written,
            });
        }

        stats.blocks_written += 1;
        log::debug!("Appended block {block}");

        Ok(block)
    }

    /// Number of whole blocks currently stored in file. Creates the file if
    /// it does not exist yet.
    pub fn length(&self, file_name: &str) -> Result<BlockNumber> {
        let mut state = self.state.lock();
        let file = self.open_file(&mut state.open_files, file_name)?;

        let num_blocks = file.num_blocks().map_err(|source| Error::Open {
            path: self.directory.join(file_name),
            source,
        })?;

        Ok(BlockNumber::try_from(num_blocks).map_err(|_| {
            utils::Error::IllegalState(format!("file '{file_name}' has too many blocks"))
        })?)
    }

    fn check_page(&self, page: &Page) -> Result<()> {
        Ok(check_argument(
            page.size() == self.block_size(),
            format!(
                "page of size {} can't be transferred to block of size {}",
                page.size(),
                self.block_size()
            ),
        )?)
    }

    /// Same as [`Self::open_file`], but failure to open is reported against
    /// `block` through `on_error`.
    fn open_block<'a>(
        &self,
        open_files: &'a mut HashMap<PathBuf, BlockIO<File>>,
        block: &BlockId,
        on_error: fn(BlockId, io::Error) -> Error,
    ) -> Result<&'a BlockIO<File>> {
        self.open_file(open_files, block.file_name())
            .map_err(|e| match e {
                Error::Open { source, .. } => on_error(block.clone(), source),
                e => e,
            })
    }

    /// Returns cached handle of `file_name`, opening (and creating) the file
    /// on first access.
    fn open_file<'a>(
        &self,
        open_files: &'a mut HashMap<PathBuf, BlockIO<File>>,
        file_name: &str,
    ) -> Result<&'a BlockIO<File>> {
        check_file_name(file_name)?;

        let path = self.directory.join(file_name);

        match open_files.entry(path) {
            Entry::Occupied(entry) => Ok(&*entry.into_mut()),
            Entry::Vacant(entry) => {
                let file = OpenOptions::default()
                    .create(true)
                    .read(true)
                    .write(true)
                    .truncate(false)
                    .sync_on_write(self.config.sync_on_write)
                    .lock(self.config.lock_files)
                    .open(entry.key())
                    .map_err(|source| Error::Open {
                        path: entry.key().clone(),
                        source,
                    })?;

                log::debug!("Opened file {:?}", entry.key());

                Ok(&*entry.insert(BlockIO::new(file, self.block_size())))
            }
        }
    }
}
