use std::{
    fs::{self, File},
    io,
    os::fd::AsRawFd,
    path::Path,
};

use libc::{c_void, off_t, pread, pwrite};

use crate::storage::BlockNumber;

pub trait FileOps {
    /// Removes file at given path
    fn remove(path: impl AsRef<Path>) -> io::Result<()>;

    /// Current length of file in bytes
    fn len(&self) -> io::Result<u64>;
}

impl FileOps for File {
    fn remove(path: impl AsRef<Path>) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

/// Positional I/O. Does not move any shared file cursor.
pub trait IO {
    fn pread(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;
    fn pwrite(&self, offset: u64, buf: &[u8]) -> io::Result<usize>;
}

fn to_off_t(offset: u64) -> io::Result<off_t> {
    off_t::try_from(offset).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("offset {offset} does not fit into off_t"),
        )
    })
}

impl IO for File {
    fn pread(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let offset = to_off_t(offset)?;
        let read = unsafe {
            pread(
                self.as_raw_fd(),
                buf.as_mut_ptr() as *mut c_void,
                buf.len(),
                offset,
            )
        };
        if read == -1 {
            Err(io::Error::last_os_error())
        } else {
            Ok(read as usize)
        }
    }

    fn pwrite(&self, offset: u64, buf: &[u8]) -> io::Result<usize> {
        let offset = to_off_t(offset)?;
        let written = unsafe {
            pwrite(
                self.as_raw_fd(),
                buf.as_ptr() as *const c_void,
                buf.len(),
                offset,
            )
        };
        if written == -1 {
            Err(io::Error::last_os_error())
        } else {
            Ok(written as usize)
        }
    }
}

/// Wrapper to simplify working with fixed-size blocks on disk.
///
/// Block `n` occupies bytes `[n * block_size, (n + 1) * block_size)`. There is
/// no file header.
#[derive(Debug)]
pub struct BlockIO<I> {
    io: I,
    pub block_size: usize,
}

impl<I> BlockIO<I> {
    pub fn new(io: I, block_size: usize) -> Self {
        Self { io, block_size }
    }

    fn block_offset(&self, block_number: BlockNumber) -> u64 {
        block_number as u64 * self.block_size as u64
    }
}

impl<I: IO> BlockIO<I> {
    fn raw_read(&self, offset: u64, buffer: &mut [u8]) -> io::Result<usize> {
        self.io.pread(offset, buffer)
    }

    /// Reads block with given number into `buffer`.
    ///
    /// Keeps reading until `buffer` is full or end of file is reached and
    /// returns number of bytes actually read.
    pub fn read(&self, block_number: BlockNumber, buffer: &mut [u8]) -> io::Result<usize> {
        let offset = self.block_offset(block_number);
        let mut total = 0;

        while total < buffer.len() {
            match self.raw_read(offset + total as u64, &mut buffer[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(total)
    }
}

impl<I: IO> BlockIO<I> {
    fn raw_write(&self, offset: u64, buffer: &[u8]) -> io::Result<usize> {
        self.io.pwrite(offset, buffer)
    }

    /// Writes `buffer` at the beginning of given block. Single write call, so
    /// the returned count may be smaller than `buffer.len()`.
    pub fn write(&self, block_number: BlockNumber, buffer: &[u8]) -> io::Result<usize> {
        self.raw_write(self.block_offset(block_number), buffer)
    }
}

impl<I: FileOps> BlockIO<I> {
    /// Number of whole blocks stored in file.
    pub fn num_blocks(&self) -> io::Result<u64> {
        Ok(self.io.len()? / self.block_size as u64)
    }
}
