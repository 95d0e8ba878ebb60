//! Platform specific file opening used for data files.

use std::{
    fs::{self, File},
    io,
    path::Path,
};

/// Opens a [`File`] with the extra guarantees requested on the builder.
pub trait Open {
    fn open(self, path: impl AsRef<Path>) -> io::Result<File>;
}

/// [`fs::OpenOptions`] extended with durability and locking flags of data files.
pub struct OpenOptions {
    inner: fs::OpenOptions,
    sync_on_write: bool,
    lock: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            inner: File::options(),
            sync_on_write: false,
            lock: false,
        }
    }
}

impl OpenOptions {
    /// Block writes return only after data hit the device (`O_DSYNC`).
    pub fn sync_on_write(mut self, sync_on_write: bool) -> Self {
        self.sync_on_write = sync_on_write;
        self
    }

    pub fn create(mut self, create: bool) -> Self {
        self.inner.create(create);
        self
    }

    pub fn read(mut self, read: bool) -> Self {
        self.inner.read(read);
        self
    }

    pub fn write(mut self, write: bool) -> Self {
        self.inner.write(write);
        self
    }

    /// Take exclusive advisory lock right after opening. Fails instead of
    /// waiting when any other open handle already holds it.
    pub fn lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    pub fn truncate(mut self, truncate: bool) -> Self {
        self.inner.truncate(truncate);
        self
    }
}

#[cfg(unix)]
mod unix {
    use std::{
        fs::File,
        io,
        os::{fd::AsRawFd, unix::fs::OpenOptionsExt},
        path::Path,
    };

    use super::{Open, OpenOptions};

    fn lock_exclusive(file: &File, path: &Path) -> io::Result<()> {
        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };

        if rc == 0 {
            return Ok(());
        }

        Err(io::Error::new(
            io::ErrorKind::WouldBlock,
            format!("{} is locked by another handle", path.display()),
        ))
    }

    impl Open for OpenOptions {
        fn open(mut self, path: impl AsRef<Path>) -> io::Result<File> {
            let path = path.as_ref();

            if self.sync_on_write {
                self.inner.custom_flags(libc::O_DSYNC);
            }

            let file = self.inner.open(path)?;

            if self.lock {
                lock_exclusive(&file, path)?;
            }

            Ok(file)
        }
    }
}
