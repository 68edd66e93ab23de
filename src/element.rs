use derivative::Derivative;

use crate::{boxes::Mp4Box, codec, Error, Result};

/// A literal assignable to a box field, either through construction
/// config or through [`Mp4Box::set`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(u64),
    Ints(Vec<u64>),
    Bytes(Vec<u8>),
    Str(String),
    Sets(Vec<Vec<u8>>),
}

impl Value {
    pub fn as_int(&self) -> Option<u64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[u64]> {
        match self {
            Value::Ints(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(chars) => Some(chars),
            _ => None,
        }
    }

    pub fn as_sets(&self) -> Option<&[Vec<u8>]> {
        match self {
            Value::Sets(sets) => Some(sets),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Ints(_) => "integer sequence",
            Value::Bytes(_) => "byte sequence",
            Value::Str(_) => "string",
            Value::Sets(_) => "parameter set sequence",
        }
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Int(value as u64)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Int(value as u64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as u64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(chars: &str) -> Self {
        Value::Str(chars.to_owned())
    }
}

impl From<String> for Value {
    fn from(chars: String) -> Self {
        Value::Str(chars)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<Vec<u64>> for Value {
    fn from(values: Vec<u64>) -> Self {
        Value::Ints(values)
    }
}

impl From<Vec<Vec<u8>>> for Value {
    fn from(sets: Vec<Vec<u8>>) -> Self {
        Value::Sets(sets)
    }
}

/// One wire-level value holder inside a box. Every variant knows its
/// byte length and how to write itself big-endian at a buffer offset;
/// the readable variants can also refresh themselves from a buffer.
#[derive(Derivative, Clone, PartialEq)]
#[derivative(Debug)]
pub enum Element {
    /// Zero-filled padding of a fixed width.
    Empty(usize),
    CharArray(String),
    UInt8(u8),
    UInt16(u16),
    UInt24(u32),
    UInt32(u32),
    UInt64(u64),
    UInt8Array(Vec<u8>),
    UInt16Array(Vec<u16>),
    UInt32Array(Vec<u32>),
    /// Opaque payload, write-only.
    ByteArray(#[derivative(Debug = "ignore")] Vec<u8>),
    /// The SPS/PPS framing inside `avcC`: one byte `mask | count`, then
    /// a u16 length prefix before each parameter set.
    ParameterSetArray { mask: u8, sets: Vec<Vec<u8>> },
    /// A nested box, contributing its whole serialized form.
    Child(Mp4Box),
}

impl Element {
    pub fn byte_length(&self) -> usize {
        match self {
            Element::Empty(length) => *length,
            Element::CharArray(chars) => chars.chars().count(),
            Element::UInt8(_) => 1,
            Element::UInt16(_) => 2,
            Element::UInt24(_) => 3,
            Element::UInt32(_) => 4,
            Element::UInt64(_) => 8,
            Element::UInt8Array(values) => values.len(),
            Element::UInt16Array(values) => 2 * values.len(),
            Element::UInt32Array(values) => 4 * values.len(),
            Element::ByteArray(bytes) => bytes.len(),
            Element::ParameterSetArray { sets, .. } => {
                1 + sets.iter().map(|set| 2 + set.len()).sum::<usize>()
            }
            Element::Child(child) => child.byte_length(),
        }
    }

    pub fn write(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        match self {
            Element::Empty(length) => codec::zero(buf, offset, *length),
            Element::CharArray(chars) => {
                let bytes: Vec<u8> = chars.chars().map(|c| c as u8).collect();
                codec::write_bytes(buf, offset, &bytes)
            }
            Element::UInt8(value) => codec::write_u8(buf, offset, *value),
            Element::UInt16(value) => codec::write_u16(buf, offset, *value),
            Element::UInt24(value) => codec::write_u24(buf, offset, *value),
            Element::UInt32(value) => codec::write_u32(buf, offset, *value),
            Element::UInt64(value) => codec::write_u64(buf, offset, *value),
            Element::UInt8Array(values) => codec::write_bytes(buf, offset, values),
            Element::UInt16Array(values) => {
                for (index, &value) in values.iter().enumerate() {
                    codec::write_u16(buf, offset + 2 * index, value)?;
                }
                Ok(())
            }
            Element::UInt32Array(values) => {
                for (index, &value) in values.iter().enumerate() {
                    codec::write_u32(buf, offset + 4 * index, value)?;
                }
                Ok(())
            }
            Element::ByteArray(bytes) => codec::write_bytes(buf, offset, bytes),
            Element::ParameterSetArray { mask, sets } => {
                codec::write_u8(buf, offset, mask | sets.len() as u8)?;
                let mut at = offset + 1;
                for set in sets {
                    let length =
                        u16::try_from(set.len()).map_err(|_| Error::ValueOutOfRange {
                            value: set.len() as u64,
                            width: 2,
                        })?;
                    codec::write_u16(buf, at, length)?;
                    codec::write_bytes(buf, at + 2, set)?;
                    at += 2 + set.len();
                }
                Ok(())
            }
            // Children are serialized by the enclosing box so that their
            // size field is patched first.
            Element::Child(_) => Err(Error::NotSupported),
        }
    }

    pub fn read(&mut self, buf: &[u8], offset: usize) -> Result<()> {
        match self {
            Element::Empty(_) => Ok(()),
            Element::CharArray(chars) => {
                let length = chars.chars().count();
                *chars = codec::decode(codec::read_bytes(buf, offset, length)?);
                Ok(())
            }
            Element::UInt8(value) => {
                *value = codec::read_u8(buf, offset)?;
                Ok(())
            }
            Element::UInt16(value) => {
                *value = codec::read_u16(buf, offset)?;
                Ok(())
            }
            Element::UInt24(value) => {
                *value = codec::read_u24(buf, offset)?;
                Ok(())
            }
            Element::UInt32(value) => {
                *value = codec::read_u32(buf, offset)?;
                Ok(())
            }
            Element::UInt64(value) => {
                *value = codec::read_u64(buf, offset)?;
                Ok(())
            }
            Element::UInt8Array(values) => {
                let length = values.len();
                values.copy_from_slice(codec::read_bytes(buf, offset, length)?);
                Ok(())
            }
            Element::UInt16Array(values) => {
                for (index, value) in values.iter_mut().enumerate() {
                    *value = codec::read_u16(buf, offset + 2 * index)?;
                }
                Ok(())
            }
            Element::UInt32Array(values) => {
                for (index, value) in values.iter_mut().enumerate() {
                    *value = codec::read_u32(buf, offset + 4 * index)?;
                }
                Ok(())
            }
            // Parameter sets are produced by the stream, never
            // reconstructed from a parsed box.
            Element::ParameterSetArray { .. } => Ok(()),
            Element::ByteArray(_) => Err(Error::NotSupported),
            Element::Child(child) => child.load(buf, offset),
        }
    }

    pub fn value(&self) -> Result<Value> {
        match self {
            Element::Empty(length) => Ok(Value::Bytes(vec![0; *length])),
            Element::CharArray(chars) => Ok(Value::Str(chars.clone())),
            Element::UInt8(value) => Ok(Value::Int(*value as u64)),
            Element::UInt16(value) => Ok(Value::Int(*value as u64)),
            Element::UInt24(value) => Ok(Value::Int(*value as u64)),
            Element::UInt32(value) => Ok(Value::Int(*value as u64)),
            Element::UInt64(value) => Ok(Value::Int(*value)),
            Element::UInt8Array(values) => {
                Ok(Value::Ints(values.iter().map(|&v| v as u64).collect()))
            }
            Element::UInt16Array(values) => {
                Ok(Value::Ints(values.iter().map(|&v| v as u64).collect()))
            }
            Element::UInt32Array(values) => {
                Ok(Value::Ints(values.iter().map(|&v| v as u64).collect()))
            }
            Element::ByteArray(bytes) => Ok(Value::Bytes(bytes.clone())),
            Element::ParameterSetArray { sets, .. } => Ok(Value::Sets(sets.clone())),
            Element::Child(_) => Err(Error::NotSupported),
        }
    }

    pub fn set_value(&mut self, field: &str, value: Value) -> Result<()> {
        fn scalar(field: &str, value: &Value, width: u32) -> Result<u64> {
            let value = value.as_int().ok_or_else(|| Error::IncompatibleValue {
                field: field.to_owned(),
                given: value.kind(),
            })?;
            if width < 8 && value >> (8 * width) != 0 {
                return Err(Error::ValueOutOfRange { value, width });
            }
            Ok(value)
        }

        match self {
            Element::UInt8(slot) => *slot = scalar(field, &value, 1)? as u8,
            Element::UInt16(slot) => *slot = scalar(field, &value, 2)? as u16,
            Element::UInt24(slot) => *slot = scalar(field, &value, 3)? as u32,
            Element::UInt32(slot) => *slot = scalar(field, &value, 4)? as u32,
            Element::UInt64(slot) => *slot = scalar(field, &value, 8)?,
            Element::CharArray(slot) => match value {
                Value::Str(chars) => *slot = chars,
                other => {
                    return Err(Error::IncompatibleValue {
                        field: field.to_owned(),
                        given: other.kind(),
                    })
                }
            },
            Element::UInt8Array(slot) => match &value {
                Value::Bytes(bytes) => *slot = bytes.clone(),
                Value::Ints(values) => {
                    let mut bytes = Vec::with_capacity(values.len());
                    for &v in values {
                        if v > u8::MAX as u64 {
                            return Err(Error::ValueOutOfRange { value: v, width: 1 });
                        }
                        bytes.push(v as u8);
                    }
                    *slot = bytes;
                }
                other => {
                    return Err(Error::IncompatibleValue {
                        field: field.to_owned(),
                        given: other.kind(),
                    })
                }
            },
            Element::UInt16Array(slot) => {
                let values = value.as_ints().ok_or_else(|| Error::IncompatibleValue {
                    field: field.to_owned(),
                    given: value.kind(),
                })?;
                let mut shorts = Vec::with_capacity(values.len());
                for &v in values {
                    if v > u16::MAX as u64 {
                        return Err(Error::ValueOutOfRange { value: v, width: 2 });
                    }
                    shorts.push(v as u16);
                }
                *slot = shorts;
            }
            Element::UInt32Array(slot) => {
                let values = value.as_ints().ok_or_else(|| Error::IncompatibleValue {
                    field: field.to_owned(),
                    given: value.kind(),
                })?;
                let mut words = Vec::with_capacity(values.len());
                for &v in values {
                    if v > u32::MAX as u64 {
                        return Err(Error::ValueOutOfRange { value: v, width: 4 });
                    }
                    words.push(v as u32);
                }
                *slot = words;
            }
            Element::ByteArray(slot) => match value {
                Value::Bytes(bytes) => *slot = bytes,
                other => {
                    return Err(Error::IncompatibleValue {
                        field: field.to_owned(),
                        given: other.kind(),
                    })
                }
            },
            Element::ParameterSetArray { sets, .. } => match value {
                Value::Sets(new_sets) => *sets = new_sets,
                other => {
                    return Err(Error::IncompatibleValue {
                        field: field.to_owned(),
                        given: other.kind(),
                    })
                }
            },
            Element::Empty(_) | Element::Child(_) => {
                return Err(Error::IncompatibleValue {
                    field: field.to_owned(),
                    given: value.kind(),
                })
            }
        }
        Ok(())
    }
}
