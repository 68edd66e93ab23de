use byteorder::{BigEndian, ByteOrder};

use crate::{Error, Result};

fn window(buf: &[u8], offset: usize, needed: usize) -> Result<&[u8]> {
    let end = offset.checked_add(needed).unwrap_or(usize::MAX);
    if end > buf.len() {
        return Err(Error::InsufficientBytes {
            offset,
            needed,
            len: buf.len(),
        });
    }
    Ok(&buf[offset..end])
}

fn window_mut(buf: &mut [u8], offset: usize, needed: usize) -> Result<&mut [u8]> {
    let end = offset.checked_add(needed).unwrap_or(usize::MAX);
    if end > buf.len() {
        return Err(Error::InsufficientBytes {
            offset,
            needed,
            len: buf.len(),
        });
    }
    Ok(&mut buf[offset..end])
}

pub fn read_u8(buf: &[u8], offset: usize) -> Result<u8> {
    Ok(window(buf, offset, 1)?[0])
}

pub fn read_u16(buf: &[u8], offset: usize) -> Result<u16> {
    Ok(BigEndian::read_u16(window(buf, offset, 2)?))
}

pub fn read_u24(buf: &[u8], offset: usize) -> Result<u32> {
    Ok(BigEndian::read_u24(window(buf, offset, 3)?))
}

pub fn read_u32(buf: &[u8], offset: usize) -> Result<u32> {
    Ok(BigEndian::read_u32(window(buf, offset, 4)?))
}

pub fn read_u64(buf: &[u8], offset: usize) -> Result<u64> {
    Ok(BigEndian::read_u64(window(buf, offset, 8)?))
}

pub fn read_bytes(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    window(buf, offset, len)
}

pub fn write_u8(buf: &mut [u8], offset: usize, value: u8) -> Result<()> {
    window_mut(buf, offset, 1)?[0] = value;
    Ok(())
}

pub fn write_u16(buf: &mut [u8], offset: usize, value: u16) -> Result<()> {
    BigEndian::write_u16(window_mut(buf, offset, 2)?, value);
    Ok(())
}

pub fn write_u24(buf: &mut [u8], offset: usize, value: u32) -> Result<()> {
    if value >= 1 << 24 {
        return Err(Error::ValueOutOfRange {
            value: value as u64,
            width: 3,
        });
    }
    BigEndian::write_u24(window_mut(buf, offset, 3)?, value);
    Ok(())
}

pub fn write_u32(buf: &mut [u8], offset: usize, value: u32) -> Result<()> {
    BigEndian::write_u32(window_mut(buf, offset, 4)?, value);
    Ok(())
}

pub fn write_u64(buf: &mut [u8], offset: usize, value: u64) -> Result<()> {
    BigEndian::write_u64(window_mut(buf, offset, 8)?, value);
    Ok(())
}

pub fn write_bytes(buf: &mut [u8], offset: usize, bytes: &[u8]) -> Result<()> {
    window_mut(buf, offset, bytes.len())?.copy_from_slice(bytes);
    Ok(())
}

pub fn zero(buf: &mut [u8], offset: usize, len: usize) -> Result<()> {
    window_mut(buf, offset, len)?.fill(0);
    Ok(())
}

/// Interprets each byte as its code point, without UTF-8 validation.
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| byte as char).collect()
}
