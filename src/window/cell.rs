//! Cell encoding - field types, field slots and cell values.
//!
//! A [`FieldSlot`] is the fixed-size directory entry for one cell. Scalar
//! values live inline in the slot; strings and blobs live in the payload
//! arena and the slot records where.

use std::fmt;

use crate::common::config::FIELD_SLOT_SIZE;
use crate::common::{Error, Result};

/// Type tag of a stored cell.
///
/// Uses `#[repr(u32)]` to match the 4-byte type field of a field slot.
#[repr(u32)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// SQL NULL. A zero-filled slot decodes as this.
    #[default]
    Null = 0,
    /// 64-bit signed integer.
    Integer = 1,
    /// 64-bit float.
    Float = 2,
    /// UTF-8 text.
    String = 3,
    /// Raw bytes.
    Blob = 4,
}

impl FieldType {
    /// Convert from the on-buffer tag, or `None` for unknown values.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(FieldType::Null),
            1 => Some(FieldType::Integer),
            2 => Some(FieldType::Float),
            3 => Some(FieldType::String),
            4 => Some(FieldType::Blob),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Null => "NULL",
            FieldType::Integer => "INTEGER",
            FieldType::Float => "FLOAT",
            FieldType::String => "STRING",
            FieldType::Blob => "BLOB",
        };
        f.write_str(name)
    }
}

/// Decoded contents of a field slot.
///
/// # Layout (16 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     type (FieldType as u32, little-endian)
/// 4       4     reserved (zero)
/// 8       8     data: i64 | f64 | (offset u32, size u32)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldSlot {
    Null,
    Integer(i64),
    Float(f64),
    /// UTF-8 payload at `offset`, `size` bytes long.
    String { offset: u32, size: u32 },
    /// Blob payload at `offset`, `size` bytes long.
    Blob { offset: u32, size: u32 },
}

impl FieldSlot {
    /// Size of an encoded slot in bytes.
    pub const SIZE: usize = FIELD_SLOT_SIZE;

    const OFFSET_TYPE: usize = 0;
    const OFFSET_DATA: usize = 8;

    /// The type tag of this slot.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldSlot::Null => FieldType::Null,
            FieldSlot::Integer(_) => FieldType::Integer,
            FieldSlot::Float(_) => FieldType::Float,
            FieldSlot::String { .. } => FieldType::String,
            FieldSlot::Blob { .. } => FieldType::Blob,
        }
    }

    /// Encode into the fixed 16-byte layout.
    pub fn encode(&self) -> [u8; FIELD_SLOT_SIZE] {
        let mut bytes = [0u8; FIELD_SLOT_SIZE];
        let tag = self.field_type() as u32;
        bytes[Self::OFFSET_TYPE..Self::OFFSET_TYPE + 4].copy_from_slice(&tag.to_le_bytes());

        let data = &mut bytes[Self::OFFSET_DATA..];
        match *self {
            FieldSlot::Null => {}
            FieldSlot::Integer(v) => data.copy_from_slice(&v.to_le_bytes()),
            FieldSlot::Float(v) => data.copy_from_slice(&v.to_le_bytes()),
            FieldSlot::String { offset, size } | FieldSlot::Blob { offset, size } => {
                data[..4].copy_from_slice(&offset.to_le_bytes());
                data[4..].copy_from_slice(&size.to_le_bytes());
            }
        }
        bytes
    }

    /// Decode from the fixed 16-byte layout.
    ///
    /// # Errors
    /// `Error::Corrupted` if the slice is short or the tag is unknown.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FIELD_SLOT_SIZE {
            return Err(Error::Corrupted(format!(
                "field slot needs {} bytes, got {}",
                FIELD_SLOT_SIZE,
                bytes.len()
            )));
        }

        let tag = read_u32(bytes, Self::OFFSET_TYPE);
        let field_type = FieldType::from_u32(tag)
            .ok_or_else(|| Error::Corrupted(format!("unknown field type tag {}", tag)))?;

        let mut data = [0u8; 8];
        data.copy_from_slice(&bytes[Self::OFFSET_DATA..Self::OFFSET_DATA + 8]);

        Ok(match field_type {
            FieldType::Null => FieldSlot::Null,
            FieldType::Integer => FieldSlot::Integer(i64::from_le_bytes(data)),
            FieldType::Float => FieldSlot::Float(f64::from_le_bytes(data)),
            FieldType::String => FieldSlot::String {
                offset: read_u32(&data, 0),
                size: read_u32(&data, 4),
            },
            FieldType::Blob => FieldSlot::Blob {
                offset: read_u32(&data, 0),
                size: read_u32(&data, 4),
            },
        })
    }
}

/// Read a little-endian `u32` at `offset`.
#[inline]
pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Write a little-endian `u32` at `offset`.
#[inline]
pub(crate) fn write_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// An owned cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// The field type this value is stored as.
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Null => FieldType::Null,
            Value::Integer(_) => FieldType::Integer,
            Value::Float(_) => FieldType::Float,
            Value::Text(_) => FieldType::String,
            Value::Blob(_) => FieldType::Blob,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A cell value borrowed from a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellRef<'a> {
    Null,
    Integer(i64),
    Float(f64),
    Text(&'a str),
    Blob(&'a [u8]),
}

impl CellRef<'_> {
    /// The stored field type.
    pub fn field_type(&self) -> FieldType {
        match self {
            CellRef::Null => FieldType::Null,
            CellRef::Integer(_) => FieldType::Integer,
            CellRef::Float(_) => FieldType::Float,
            CellRef::Text(_) => FieldType::String,
            CellRef::Blob(_) => FieldType::Blob,
        }
    }

    /// Copy out of the window.
    pub fn to_value(&self) -> Value {
        match *self {
            CellRef::Null => Value::Null,
            CellRef::Integer(v) => Value::Integer(v),
            CellRef::Float(v) => Value::Float(v),
            CellRef::Text(s) => Value::Text(s.to_string()),
            CellRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_from_u32() {
        assert_eq!(FieldType::from_u32(0), Some(FieldType::Null));
        assert_eq!(FieldType::from_u32(1), Some(FieldType::Integer));
        assert_eq!(FieldType::from_u32(2), Some(FieldType::Float));
        assert_eq!(FieldType::from_u32(3), Some(FieldType::String));
        assert_eq!(FieldType::from_u32(4), Some(FieldType::Blob));
        assert_eq!(FieldType::from_u32(5), None);
    }

    #[test]
    fn test_zeroed_slot_is_null() {
        let bytes = [0u8; FIELD_SLOT_SIZE];
        assert_eq!(FieldSlot::decode(&bytes).unwrap(), FieldSlot::Null);
    }

    #[test]
    fn test_slot_byte_layout() {
        let slot = FieldSlot::Blob {
            offset: 0x04030201,
            size: 0x08070605,
        };
        let bytes = slot.encode();

        assert_eq!(bytes[0], 4); // FieldType::Blob
        assert_eq!(&bytes[1..8], &[0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes[8], 0x01); // offset LSB
        assert_eq!(bytes[11], 0x04); // offset MSB
        assert_eq!(bytes[12], 0x05); // size LSB
        assert_eq!(bytes[15], 0x08); // size MSB
    }

    #[test]
    fn test_slot_scalars_inline() {
        let slot = FieldSlot::Integer(-2);
        let bytes = slot.encode();
        assert_eq!(&bytes[8..], &(-2i64).to_le_bytes());
        assert_eq!(FieldSlot::decode(&bytes).unwrap(), slot);

        let slot = FieldSlot::Float(1.5);
        assert_eq!(FieldSlot::decode(&slot.encode()).unwrap(), slot);
    }

    #[test]
    fn test_decode_unknown_tag() {
        let mut bytes = [0u8; FIELD_SLOT_SIZE];
        bytes[0] = 9;
        assert!(matches!(FieldSlot::decode(&bytes), Err(Error::Corrupted(_))));
    }

    #[test]
    fn test_decode_short_slice() {
        assert!(FieldSlot::decode(&[0u8; 8]).is_err());
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(7i64), Value::Integer(7));
        assert_eq!(Value::from("a"), Value::Text("a".into()));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(vec![1u8]).field_type(), FieldType::Blob);
    }

    #[test]
    fn test_cell_ref_to_value() {
        assert_eq!(CellRef::Text("x").to_value(), Value::Text("x".into()));
        assert_eq!(CellRef::Blob(&[1, 2]).to_value(), Value::Blob(vec![1, 2]));
        assert_eq!(CellRef::Null.field_type(), FieldType::Null);
    }
}
