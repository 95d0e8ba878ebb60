use std::{
    fmt::Debug,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use thiserror::Error;

use crate::utils::{
    self,
    buffer::Buffer,
    bytes::{
        get_bool, get_i32, get_i64, get_u16, get_vec, put_bool, put_i32, put_i64, put_slice,
        put_u16,
    },
    preconditions::check_argument,
};

pub const INT_SIZE: usize = std::mem::size_of::<i32>();
pub const LONG_SIZE: usize = std::mem::size_of::<i64>();
pub const CHAR_SIZE: usize = std::mem::size_of::<u16>();
pub const BOOL_SIZE: usize = std::mem::size_of::<u8>();
pub const TIMESTAMP_SIZE: usize = LONG_SIZE;

/// Length prefix of byte sequences and strings.
pub const LEN_PREFIX_SIZE: usize = INT_SIZE;

/// Text is ASCII, one byte per character.
pub const MAX_BYTES_PER_CHAR: usize = 1;

/// Terminator of C-like strings.
pub const STRING_TERMINATOR: u8 = 0;

pub type PageResult<T> = Result<T, PageError>;

#[derive(Debug, Error)]
pub enum PageError {
    #[error(
        "attempted to access bytes [{offset}; {offset} + {width}) outside page of capacity {capacity}"
    )]
    OutOfBounds {
        offset: usize,
        width: usize,
        capacity: usize,
    },
    #[error("can't convert value at offset {offset}: {reason}")]
    Encoding { offset: usize, reason: String },

    #[error(transparent)]
    Utils(#[from] utils::Error),
}

/// In-memory image of one block.
///
/// Fields live at caller chosen offsets, there is no record directory. Every
/// accessor validates `[offset, offset + width)` against the page size before
/// touching the buffer, so a failed call never leaves partial writes behind.
///
/// # Layout of field types
///
/// ```text
/// int        | 4 bytes, big-endian
/// long       | 8 bytes, big-endian
/// char       | 2 bytes, one UTF-16 code unit
/// bool       | 1 byte, 0x00 = true, 0x01 = false
/// bytes      | 4 byte length | payload
/// string     | 4 byte length | ASCII bytes
/// string_c   | ASCII bytes | 0x00
/// timestamp  | 8 bytes, milliseconds since unix epoch
/// ```
pub struct Page {
    buffer: Buffer,
}

impl Page {
    /// Allocates zero-filled page of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            buffer: Buffer::alloc(size),
        }
    }

    /// Wraps existing bytes, page size is `bytes.len()`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            buffer: Buffer::from_vec(bytes),
        }
    }

    pub fn size(&self) -> usize {
        self.buffer.size()
    }

    /// Bytes needed to store length-prefixed string of `str_len` characters.
    pub fn max_length(str_len: usize) -> usize {
        LEN_PREFIX_SIZE + str_len * MAX_BYTES_PER_CHAR
    }

    /// Bytes needed to store terminated string of `str_len` characters.
    pub fn max_length_c(str_len: usize) -> usize {
        (str_len + 1) * MAX_BYTES_PER_CHAR
    }

    /// Whole block image, used for block transfer by the file manager.
    pub(crate) fn contents_mut(&mut self) -> &mut [u8] {
        self.buffer.as_mut_slice()
    }

    pub(crate) fn contents(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    fn check_bounds(&self, offset: usize, width: usize) -> PageResult<()> {
        match offset.checked_add(width) {
            Some(end) if end <= self.size() => Ok(()),
            _ => Err(PageError::OutOfBounds {
                offset,
                width,
                capacity: self.size(),
            }),
        }
    }

    fn field(&self, offset: usize, width: usize) -> PageResult<&[u8]> {
        self.check_bounds(offset, width)?;
        Ok(&self.buffer[offset..offset + width])
    }

    fn field_mut(&mut self, offset: usize, width: usize) -> PageResult<&mut [u8]> {
        self.check_bounds(offset, width)?;
        Ok(&mut self.buffer[offset..offset + width])
    }

    pub fn get_int(&self, offset: usize) -> PageResult<i32> {
        let mut src = self.field(offset, INT_SIZE)?;
        Ok(get_i32(&mut src)?)
    }

    pub fn put_int(&mut self, offset: usize, value: i32) -> PageResult<()> {
        let mut dst = self.field_mut(offset, INT_SIZE)?;
        Ok(put_i32(&mut dst, value)?)
    }

    pub fn get_long(&self, offset: usize) -> PageResult<i64> {
        let mut src = self.field(offset, LONG_SIZE)?;
        Ok(get_i64(&mut src)?)
    }

    pub fn put_long(&mut self, offset: usize, value: i64) -> PageResult<()> {
        let mut dst = self.field_mut(offset, LONG_SIZE)?;
        Ok(put_i64(&mut dst, value)?)
    }

    pub fn get_char(&self, offset: usize) -> PageResult<char> {
        let mut src = self.field(offset, CHAR_SIZE)?;
        let unit = get_u16(&mut src)?;

        char::from_u32(unit as u32).ok_or_else(|| PageError::Encoding {
            offset,
            reason: format!("code unit {unit:#06x} is not a character"),
        })
    }

    /// Stores one UTF-16 code unit. Characters outside the Basic Multilingual
    /// Plane do not fit.
    pub fn put_char(&mut self, offset: usize, value: char) -> PageResult<()> {
        let unit = u16::try_from(value as u32).map_err(|_| PageError::Encoding {
            offset,
            reason: format!("character {value:?} does not fit into {CHAR_SIZE} bytes"),
        })?;

        let mut dst = self.field_mut(offset, CHAR_SIZE)?;
        Ok(put_u16(&mut dst, unit)?)
    }

    pub fn get_bool(&self, offset: usize) -> PageResult<bool> {
        let mut src = self.field(offset, BOOL_SIZE)?;
        Ok(get_bool(&mut src)?)
    }

    /// Note that `true` is stored as `0x00` and `false` as `0x01`.
    pub fn put_bool(&mut self, offset: usize, value: bool) -> PageResult<()> {
        let mut dst = self.field_mut(offset, BOOL_SIZE)?;
        Ok(put_bool(&mut dst, value)?)
    }

    pub fn get_bytes(&self, offset: usize) -> PageResult<Vec<u8>> {
        let len = self.get_int(offset)?;
        let len = usize::try_from(len).map_err(|_| PageError::Encoding {
            offset,
            reason: format!("negative length prefix {len}"),
        })?;

        let mut src = self.field(offset, LEN_PREFIX_SIZE + len)?;
        src = &src[LEN_PREFIX_SIZE..];

        Ok(get_vec(&mut src, len)?)
    }

    pub fn put_bytes(&mut self, offset: usize, src: &[u8]) -> PageResult<()> {
        check_argument(
            i32::try_from(src.len()).is_ok(),
            format!("byte sequence of length {} is too long", src.len()),
        )?;

        let mut dst = self.field_mut(offset, LEN_PREFIX_SIZE + src.len())?;
        put_i32(&mut dst, src.len() as i32)?;
        Ok(put_slice(&mut dst, src)?)
    }

    pub fn get_string(&self, offset: usize) -> PageResult<String> {
        let raw = self.get_bytes(offset)?;
        decode_ascii(offset, raw)
    }

    pub fn put_string(&mut self, offset: usize, value: &str) -> PageResult<()> {
        ensure_ascii(offset, value)?;
        self.put_bytes(offset, value.as_bytes())
    }

    /// Reads terminated string starting at `offset`.
    ///
    /// Bounds are checked at the current cursor for every character, so a
    /// string without terminator fails once the cursor reaches the end of page.
    pub fn get_string_c(&self, offset: usize) -> PageResult<String> {
        let mut value = String::new();
        let mut cursor = offset;

        loop {
            let byte = self.field(cursor, MAX_BYTES_PER_CHAR)?[0];
            cursor += MAX_BYTES_PER_CHAR;

            if byte == STRING_TERMINATOR {
                return Ok(value);
            }

            if !byte.is_ascii() {
                return Err(PageError::Encoding {
                    offset: cursor - MAX_BYTES_PER_CHAR,
                    reason: format!("byte {byte:#04x} is not ASCII"),
                });
            }

            value.push(byte as char);
        }
    }

    /// Writes `value` followed by terminator, without length prefix.
    pub fn put_string_c(&mut self, offset: usize, value: &str) -> PageResult<()> {
        ensure_ascii(offset, value)?;
        check_argument(
            !value.as_bytes().contains(&STRING_TERMINATOR),
            "terminated string can't contain NUL character",
        )?;

        let mut dst = self.field_mut(offset, Self::max_length_c(value.len()))?;
        put_slice(&mut dst, value.as_bytes())?;
        Ok(put_slice(&mut dst, &[STRING_TERMINATOR])?)
    }

    pub fn get_timestamp(&self, offset: usize) -> PageResult<SystemTime> {
        let millis = self.get_long(offset)?;
        let since_epoch = Duration::from_millis(millis.unsigned_abs());

        let time = if millis >= 0 {
            UNIX_EPOCH.checked_add(since_epoch)
        } else {
            UNIX_EPOCH.checked_sub(since_epoch)
        };

        time.ok_or_else(|| PageError::Encoding {
            offset,
            reason: format!("timestamp {millis}ms is not representable"),
        })
    }

    /// Stores `value` with millisecond precision.
    pub fn put_timestamp(&mut self, offset: usize, value: SystemTime) -> PageResult<()> {
        let millis = match value.duration_since(UNIX_EPOCH) {
            Ok(after) => i64::try_from(after.as_millis()),
            Err(before) => i64::try_from(before.duration().as_millis()).map(|m| -m),
        }
        .map_err(|_| PageError::Encoding {
            offset,
            reason: format!("timestamp {value:?} does not fit into {TIMESTAMP_SIZE} bytes"),
        })?;

        self.put_long(offset, millis)
    }
}

fn ensure_ascii(offset: usize, value: &str) -> PageResult<()> {
    if !value.is_ascii() {
        return Err(PageError::Encoding {
            offset,
            reason: format!("{value:?} contains non ASCII characters"),
        });
    }
    Ok(())
}

fn decode_ascii(offset: usize, raw: Vec<u8>) -> PageResult<String> {
    if !raw.is_ascii() {
        return Err(PageError::Encoding {
            offset,
            reason: "stored string contains non ASCII bytes".to_string(),
        });
    }

    String::from_utf8(raw).map_err(|e| PageError::Encoding {
        offset,
        reason: e.to_string(),
    })
}

impl AsRef<[u8]> for Page {
    fn as_ref(&self) -> &[u8] {
        self.contents()
    }
}

impl Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("size", &self.size())
            .field("buffer", &self.buffer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_out_of_bounds<T: Debug>(result: PageResult<T>) {
        assert!(
            matches!(result, Err(PageError::OutOfBounds { .. })),
            "expected out of bounds, got {result:?}"
        );
    }

    #[test]
    fn test_new_page_is_zeroed() -> anyhow::Result<()> {
        let page = Page::new(64);

        assert_eq!(page.size(), 64);
        assert!(page.as_ref().iter().all(|&b| b == 0));

        let empty = Page::new(0);
        assert_eq!(empty.size(), 0);
        assert_out_of_bounds(empty.get_bool(0));

        Ok(())
    }

    #[test]
    fn test_primitive_round_trip() -> anyhow::Result<()> {
        let mut page = Page::new(128);

        page.put_int(0, -123_456)?;
        page.put_long(4, i64::MIN + 7)?;
        page.put_char(12, 'A')?;
        page.put_char(14, 'ż')?;
        page.put_bool(16, true)?;
        page.put_bool(17, false)?;

        assert_eq!(page.get_int(0)?, -123_456);
        assert_eq!(page.get_long(4)?, i64::MIN + 7);
        assert_eq!(page.get_char(12)?, 'A');
        assert_eq!(page.get_char(14)?, 'ż');
        assert!(page.get_bool(16)?);
        assert!(!page.get_bool(17)?);

        Ok(())
    }

    #[test]
    fn test_bool_stored_inverted() -> anyhow::Result<()> {
        let mut page = Page::from_bytes(vec![0xaa; 4]);

        page.put_bool(1, true)?;
        page.put_bool(2, false)?;

        assert_eq!(page.as_ref(), &[0xaa, 0x00, 0x01, 0xaa]);
        // anything other than zero reads as false
        assert!(!page.get_bool(0)?);

        Ok(())
    }

    #[test]
    fn test_int_layout() -> anyhow::Result<()> {
        let mut page = Page::new(8);
        page.put_int(2, 0x0a0b_0c0d)?;

        assert_eq!(page.as_ref(), &[0, 0, 0x0a, 0x0b, 0x0c, 0x0d, 0, 0]);

        Ok(())
    }

    #[test]
    fn test_bytes_and_strings() -> anyhow::Result<()> {
        let mut page = Page::new(256);

        page.put_bytes(100, &[10, 20, 30, 40, 50])?;
        page.put_string(120, "Hello, world!!!")?;
        page.put_string(200, "")?;

        assert_eq!(page.get_bytes(100)?, vec![10, 20, 30, 40, 50]);
        assert_eq!(page.get_int(100)?, 5);
        assert_eq!(page.get_string(120)?, "Hello, world!!!");
        assert_eq!(page.get_string(200)?, "");

        Ok(())
    }

    #[test]
    fn test_string_c() -> anyhow::Result<()> {
        let mut page = Page::new(32);

        page.put_string_c(0, "abc")?;

        assert_eq!(page.get_string_c(0)?, "abc");
        assert_eq!(&page.as_ref()[..4], b"abc\0");

        Ok(())
    }

    #[test]
    fn test_string_c_without_terminator() -> anyhow::Result<()> {
        let page = Page::from_bytes(b"abcd".to_vec());

        let err = page.get_string_c(1).unwrap_err();
        assert!(matches!(
            err,
            PageError::OutOfBounds {
                offset: 4,
                width: 1,
                capacity: 4
            }
        ));

        Ok(())
    }

    #[test]
    fn test_string_c_fits_exactly() -> anyhow::Result<()> {
        let mut page = Page::new(4);

        page.put_string_c(0, "abc")?;
        assert_eq!(page.get_string_c(0)?, "abc");

        assert_out_of_bounds(page.put_string_c(1, "abc"));

        Ok(())
    }

    #[test]
    fn test_string_c_rejects_nul() -> anyhow::Result<()> {
        let mut page = Page::new(16);

        let err = page.put_string_c(0, "a\0b").unwrap_err();
        assert!(matches!(
            err,
            PageError::Utils(utils::Error::IllegalArgument(_))
        ));
        assert!(page.as_ref().iter().all(|&b| b == 0));

        Ok(())
    }

    #[test]
    fn test_non_ascii_rejected() -> anyhow::Result<()> {
        let mut page = Page::new(64);

        assert!(matches!(
            page.put_string(0, "zażółć"),
            Err(PageError::Encoding { offset: 0, .. })
        ));
        assert!(matches!(
            page.put_string_c(0, "ü"),
            Err(PageError::Encoding { .. })
        ));

        page.put_bytes(10, &[b'o', 0xc3, 0xbc])?;
        assert!(matches!(
            page.get_string(10),
            Err(PageError::Encoding { offset: 10, .. })
        ));

        Ok(())
    }

    #[test]
    fn test_char_outside_bmp() -> anyhow::Result<()> {
        let mut page = Page::new(8);

        assert!(matches!(
            page.put_char(0, '🦀'),
            Err(PageError::Encoding { .. })
        ));

        // lone surrogate
        page.put_int(0, 0xd800_0000_u32 as i32)?;
        assert!(matches!(page.get_char(0), Err(PageError::Encoding { .. })));

        Ok(())
    }

    #[test]
    fn test_negative_length_prefix() -> anyhow::Result<()> {
        let mut page = Page::new(16);
        page.put_int(0, -1)?;

        assert!(matches!(
            page.get_bytes(0),
            Err(PageError::Encoding { offset: 0, .. })
        ));

        page.put_int(0, 100)?;
        assert_out_of_bounds(page.get_bytes(0));

        Ok(())
    }

    #[test]
    fn test_timestamp() -> anyhow::Result<()> {
        let mut page = Page::new(32);

        let now = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        let before_epoch = UNIX_EPOCH - Duration::from_millis(86_400_000);

        page.put_timestamp(0, now)?;
        page.put_timestamp(8, before_epoch)?;

        assert_eq!(page.get_timestamp(0)?, now);
        assert_eq!(page.get_long(0)?, 1_700_000_000_123);
        assert_eq!(page.get_timestamp(8)?, before_epoch);
        assert_eq!(page.get_long(8)?, -86_400_000);

        Ok(())
    }

    #[test]
    fn test_timestamp_drops_sub_millis() -> anyhow::Result<()> {
        let mut page = Page::new(8);

        let precise = UNIX_EPOCH + Duration::from_nanos(5_000_123_456);
        page.put_timestamp(0, precise)?;

        assert_eq!(
            page.get_timestamp(0)?,
            UNIX_EPOCH + Duration::from_millis(5_000)
        );

        Ok(())
    }

    #[test]
    fn test_out_of_bounds_leaves_page_untouched() -> anyhow::Result<()> {
        let mut page = Page::new(10);
        page.put_bytes(0, &[1, 2])?;
        let before = page.as_ref().to_vec();

        assert_out_of_bounds(page.put_int(7, 1));
        assert_out_of_bounds(page.put_long(3, 1));
        assert_out_of_bounds(page.put_char(9, 'x'));
        assert_out_of_bounds(page.put_bool(10, true));
        assert_out_of_bounds(page.put_bytes(4, &[1, 2, 3]));
        assert_out_of_bounds(page.put_string(5, "hello"));
        assert_out_of_bounds(page.put_string_c(6, "abcd"));
        assert_out_of_bounds(page.put_timestamp(4, SystemTime::now()));
        assert_out_of_bounds(page.put_int(usize::MAX, 1));

        assert_eq!(page.as_ref(), before.as_slice());

        assert_out_of_bounds(page.get_int(7));
        assert_out_of_bounds(page.get_long(3));
        assert_out_of_bounds(page.get_char(9));
        assert_out_of_bounds(page.get_bool(10));
        assert_out_of_bounds(page.get_timestamp(usize::MAX - 2));

        Ok(())
    }

    #[test]
    fn test_out_of_bounds_reports_position() -> anyhow::Result<()> {
        let page = Page::new(100);

        let err = page.get_long(96).unwrap_err();
        assert!(matches!(
            err,
            PageError::OutOfBounds {
                offset: 96,
                width: 8,
                capacity: 100
            }
        ));
        assert_eq!(
            err.to_string(),
            "attempted to access bytes [96; 96 + 8) outside page of capacity 100"
        );

        Ok(())
    }

    #[test]
    fn test_max_length() -> anyhow::Result<()> {
        assert_eq!(Page::max_length(0), 4);
        assert_eq!(Page::max_length(15), 19);
        assert_eq!(Page::max_length_c(3), 4);

        let mut page = Page::new(Page::max_length(5));
        page.put_string(0, "abcde")?;
        assert_eq!(page.get_string(0)?, "abcde");

        Ok(())
    }
}
