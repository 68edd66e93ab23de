use std::fmt::{self, Debug, Display, Formatter};

use thiserror::Error;

pub mod boxes;
pub mod codec;
pub mod element;
pub mod fragment;
pub mod schema;
pub mod track;

pub use boxes::{Container, Mp4Box};
pub use element::{Element, Value};
pub use fragment::{AudioParameters, InitSegment, MediaSegment, VideoParameters};
pub use track::{MediaTrack, TrackKind};

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown box type {0:?}")]
    UnknownBoxType(FourCC),

    #[error("unknown field {0}")]
    UnknownField(String),

    #[error("duplicate field {0}")]
    DuplicateField(String),

    #[error("read of {needed} bytes at offset {offset} is past the end of a {len} byte buffer")]
    InsufficientBytes {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("value {value} does not fit in {width} bytes")]
    ValueOutOfRange { value: u64, width: u32 },

    #[error("box size {size} is smaller than the {minimum} byte header")]
    MalformedSize { size: u32, minimum: usize },

    #[error("operation is not supported by this element")]
    NotSupported,

    #[error("field {field} cannot hold a {given}")]
    IncompatibleValue { field: String, given: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Four ASCII characters identifying a box type, e.g. `ftyp` or `url `.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<&[u8; 4]> for FourCC {
    fn from(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }
}

impl From<[u8; 4]> for FourCC {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl Display for FourCC {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            fmt::Write::write_char(f, byte as char)?;
        }
        Ok(())
    }
}

impl Debug for FourCC {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Ok(chars) = std::str::from_utf8(&self.0) {
            f.debug_tuple("FourCC").field(&chars).finish()
        } else {
            f.debug_tuple("FourCC").field(&self.0).finish()
        }
    }
}
