//! Big-endian field helpers on top of [`bytes::Buf`] / [`bytes::BufMut`].
//!
//! Every helper checks the remaining capacity first, so a short source or
//! destination yields [`Error::OutOfSpace`] instead of a panic.

use bytes::{Buf, BufMut};

use super::{Error, Result};

/// Byte stored for boolean `true`. `false` is stored as [`BOOL_FALSE`].
pub const BOOL_TRUE: u8 = 0;
pub const BOOL_FALSE: u8 = 1;

fn ensure(needed: usize, remaining: usize) -> Result<()> {
    if remaining < needed {
        return Err(Error::OutOfSpace { needed, remaining });
    }
    Ok(())
}

pub fn get_u8(src: &mut impl Buf) -> Result<u8> {
    ensure(1, src.remaining())?;
    Ok(src.get_u8())
}

pub fn get_bool(src: &mut impl Buf) -> Result<bool> {
    Ok(get_u8(src)? == BOOL_TRUE)
}

pub fn get_u16(src: &mut impl Buf) -> Result<u16> {
    ensure(2, src.remaining())?;
    Ok(src.get_u16())
}

pub fn get_i32(src: &mut impl Buf) -> Result<i32> {
    ensure(4, src.remaining())?;
    Ok(src.get_i32())
}

pub fn get_i64(src: &mut impl Buf) -> Result<i64> {
    ensure(8, src.remaining())?;
    Ok(src.get_i64())
}

pub fn get_vec(src: &mut impl Buf, len: usize) -> Result<Vec<u8>> {
    ensure(len, src.remaining())?;
    let mut dst = vec![0; len];
    src.copy_to_slice(&mut dst);
    Ok(dst)
}

pub fn put_u8(dst: &mut impl BufMut, value: u8) -> Result<()> {
    ensure(1, dst.remaining_mut())?;
    dst.put_u8(value);
    Ok(())
}

pub fn put_bool(dst: &mut impl BufMut, value: bool) -> Result<()> {
    put_u8(dst, if value { BOOL_TRUE } else { BOOL_FALSE })
}

pub fn put_u16(dst: &mut impl BufMut, value: u16) -> Result<()> {
    ensure(2, dst.remaining_mut())?;
    dst.put_u16(value);
    Ok(())
}

pub fn put_i32(dst: &mut impl BufMut, value: i32) -> Result<()> {
    ensure(4, dst.remaining_mut())?;
    dst.put_i32(value);
    Ok(())
}

pub fn put_i64(dst: &mut impl BufMut, value: i64) -> Result<()> {
    ensure(8, dst.remaining_mut())?;
    dst.put_i64(value);
    Ok(())
}

pub fn put_slice(dst: &mut impl BufMut, src: &[u8]) -> Result<()> {
    ensure(src.len(), dst.remaining_mut())?;
    dst.put_slice(src);
    Ok(())
}
