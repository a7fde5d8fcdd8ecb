//! Typed put/get operations addressed by (row, column).
//!
//! Scalars are written inline into the field slot. Strings and blobs are
//! appended at the free offset and the slot records `(offset, size)`.

use crate::common::{Error, Result};

use super::cell::{CellRef, FieldSlot, FieldType, Value};
use super::window::Window;

impl Window {
    // ========================================================================
    // Put
    // ========================================================================

    /// Store NULL at (`row`, `column`).
    pub fn put_null(&mut self, row: usize, column: usize) -> Result<()> {
        self.put_slot(row, column, FieldSlot::Null)
    }

    /// Store a 64-bit integer at (`row`, `column`).
    pub fn put_long(&mut self, row: usize, column: usize, value: i64) -> Result<()> {
        self.put_slot(row, column, FieldSlot::Integer(value))
    }

    /// Store a 64-bit float at (`row`, `column`).
    pub fn put_double(&mut self, row: usize, column: usize, value: f64) -> Result<()> {
        self.put_slot(row, column, FieldSlot::Float(value))
    }

    /// Store UTF-8 text at (`row`, `column`).
    ///
    /// The text is stored with an explicit byte length, so embedded NUL
    /// characters survive.
    ///
    /// # Errors
    /// - `Error::OutOfMemory` if the payload does not fit; nothing is written
    pub fn put_string(&mut self, row: usize, column: usize, value: &str) -> Result<()> {
        self.put_payload(row, column, value.as_bytes(), FieldType::String)
    }

    /// Store raw bytes at (`row`, `column`).
    ///
    /// # Errors
    /// - `Error::OutOfMemory` if the payload does not fit; nothing is written
    pub fn put_blob(&mut self, row: usize, column: usize, value: &[u8]) -> Result<()> {
        self.put_payload(row, column, value, FieldType::Blob)
    }

    /// Store any [`Value`] at (`row`, `column`).
    pub fn put_value(&mut self, row: usize, column: usize, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.put_null(row, column),
            Value::Integer(v) => self.put_long(row, column, *v),
            Value::Float(v) => self.put_double(row, column, *v),
            Value::Text(s) => self.put_string(row, column, s),
            Value::Blob(b) => self.put_blob(row, column, b),
        }
    }

    fn put_slot(&mut self, row: usize, column: usize, slot: FieldSlot) -> Result<()> {
        self.ensure_writable()?;
        let offset = self.get_field_slot(row, column)?;
        self.bytes_mut()[offset..offset + FieldSlot::SIZE].copy_from_slice(&slot.encode());
        Ok(())
    }

    fn put_payload(
        &mut self,
        row: usize,
        column: usize,
        value: &[u8],
        field_type: FieldType,
    ) -> Result<()> {
        self.ensure_writable()?;
        let slot_offset = self.get_field_slot(row, column)?;

        let available = self.free_space();
        if value.len() > available {
            return Err(Error::OutOfMemory {
                needed: value.len(),
                available,
            });
        }

        let offset = self.used_bytes();
        self.bytes_mut()[offset..offset + value.len()].copy_from_slice(value);
        self.advance_free_offset(value.len());
        self.seal_last_alloc(row);

        // Capacity is bounded by u32, so both fit.
        let (offset, size) = (offset as u32, value.len() as u32);
        let slot = match field_type {
            FieldType::String => FieldSlot::String { offset, size },
            _ => FieldSlot::Blob { offset, size },
        };
        self.bytes_mut()[slot_offset..slot_offset + FieldSlot::SIZE].copy_from_slice(&slot.encode());
        Ok(())
    }

    // ========================================================================
    // Get
    // ========================================================================

    fn read_slot(&self, row: usize, column: usize) -> Result<FieldSlot> {
        let offset = self.get_field_slot(row, column)?;
        FieldSlot::decode(&self.bytes()[offset..offset + FieldSlot::SIZE])
    }

    fn payload(&self, offset: u32, size: u32) -> Result<&[u8]> {
        let (offset, size) = (offset as usize, size as usize);
        self.check_range(offset, size)?;
        Ok(&self.bytes()[offset..offset + size])
    }

    /// Type of the value stored at (`row`, `column`).
    pub fn get_type(&self, row: usize, column: usize) -> Result<FieldType> {
        Ok(self.read_slot(row, column)?.field_type())
    }

    /// Whether (`row`, `column`) holds NULL.
    pub fn is_null(&self, row: usize, column: usize) -> Result<bool> {
        Ok(self.get_type(row, column)? == FieldType::Null)
    }

    /// Read an integer. Floats are not coerced.
    ///
    /// # Errors
    /// - `Error::TypeMismatch` unless the cell is INTEGER
    pub fn get_long(&self, row: usize, column: usize) -> Result<i64> {
        match self.read_slot(row, column)? {
            FieldSlot::Integer(v) => Ok(v),
            other => Err(mismatch(row, column, FieldType::Integer, other)),
        }
    }

    /// Read a float. Integers are not coerced.
    ///
    /// # Errors
    /// - `Error::TypeMismatch` unless the cell is FLOAT
    pub fn get_double(&self, row: usize, column: usize) -> Result<f64> {
        match self.read_slot(row, column)? {
            FieldSlot::Float(v) => Ok(v),
            other => Err(mismatch(row, column, FieldType::Float, other)),
        }
    }

    /// Borrow text stored at (`row`, `column`).
    ///
    /// # Errors
    /// - `Error::TypeMismatch` unless the cell is STRING
    pub fn get_string(&self, row: usize, column: usize) -> Result<&str> {
        match self.read_slot(row, column)? {
            FieldSlot::String { offset, size } => {
                let bytes = self.payload(offset, size)?;
                std::str::from_utf8(bytes).map_err(|e| {
                    Error::Corrupted(format!("cell ({}, {}) is not UTF-8: {}", row, column, e))
                })
            }
            other => Err(mismatch(row, column, FieldType::String, other)),
        }
    }

    /// Borrow bytes stored at (`row`, `column`).
    ///
    /// STRING cells are accepted too and yield their UTF-8 bytes.
    ///
    /// # Errors
    /// - `Error::TypeMismatch` unless the cell is BLOB or STRING
    pub fn get_blob(&self, row: usize, column: usize) -> Result<&[u8]> {
        match self.read_slot(row, column)? {
            FieldSlot::Blob { offset, size } | FieldSlot::String { offset, size } => {
                self.payload(offset, size)
            }
            other => Err(mismatch(row, column, FieldType::Blob, other)),
        }
    }

    /// Borrow whatever is stored at (`row`, `column`).
    pub fn get_value(&self, row: usize, column: usize) -> Result<CellRef<'_>> {
        Ok(match self.read_slot(row, column)? {
            FieldSlot::Null => CellRef::Null,
            FieldSlot::Integer(v) => CellRef::Integer(v),
            FieldSlot::Float(v) => CellRef::Float(v),
            FieldSlot::String { .. } => CellRef::Text(self.get_string(row, column)?),
            FieldSlot::Blob { offset, size } => CellRef::Blob(self.payload(offset, size)?),
        })
    }
}

fn mismatch(row: usize, column: usize, requested: FieldType, actual: FieldSlot) -> Error {
    Error::TypeMismatch {
        row,
        column,
        requested,
        actual: actual.field_type(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::MIN_WINDOW_SIZE;

    fn window_with_row(capacity: usize, columns: usize) -> Window {
        let mut w = Window::create("test", capacity).unwrap();
        w.set_num_columns(columns).unwrap();
        w.alloc_row().unwrap();
        w
    }

    #[test]
    fn test_put_get_each_type() {
        let mut w = window_with_row(4096, 5);

        w.put_null(0, 0).unwrap();
        w.put_long(0, 1, i64::MIN).unwrap();
        w.put_double(0, 2, -0.25).unwrap();
        w.put_string(0, 3, "héllo").unwrap();
        w.put_blob(0, 4, &[0xDE, 0xAD]).unwrap();

        assert!(w.is_null(0, 0).unwrap());
        assert_eq!(w.get_long(0, 1).unwrap(), i64::MIN);
        assert_eq!(w.get_double(0, 2).unwrap(), -0.25);
        assert_eq!(w.get_string(0, 3).unwrap(), "héllo");
        assert_eq!(w.get_blob(0, 4).unwrap(), &[0xDE, 0xAD]);

        assert_eq!(w.get_type(0, 0).unwrap(), FieldType::Null);
        assert_eq!(w.get_type(0, 3).unwrap(), FieldType::String);
    }

    #[test]
    fn test_string_with_embedded_nul() {
        let mut w = window_with_row(4096, 1);
        w.put_string(0, 0, "a\0b").unwrap();
        assert_eq!(w.get_string(0, 0).unwrap(), "a\0b");
        assert_eq!(w.get_string(0, 0).unwrap().len(), 3);
    }

    #[test]
    fn test_empty_payloads() {
        let mut w = window_with_row(4096, 2);
        w.put_string(0, 0, "").unwrap();
        w.put_blob(0, 1, &[]).unwrap();
        assert_eq!(w.get_string(0, 0).unwrap(), "");
        assert!(w.get_blob(0, 1).unwrap().is_empty());
    }

    #[test]
    fn test_no_numeric_coercion() {
        let mut w = window_with_row(4096, 2);
        w.put_long(0, 0, 3).unwrap();
        w.put_double(0, 1, 3.0).unwrap();

        assert!(matches!(
            w.get_double(0, 0),
            Err(Error::TypeMismatch {
                requested: FieldType::Float,
                actual: FieldType::Integer,
                ..
            })
        ));
        assert!(matches!(w.get_long(0, 1), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_get_blob_accepts_string() {
        let mut w = window_with_row(4096, 2);
        w.put_string(0, 0, "abc").unwrap();
        w.put_blob(0, 1, b"abc").unwrap();

        assert_eq!(w.get_blob(0, 0).unwrap(), b"abc");
        assert!(matches!(w.get_string(0, 1), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_null_is_a_type_mismatch_for_scalars() {
        let w = window_with_row(4096, 1);
        assert!(matches!(
            w.get_long(0, 0),
            Err(Error::TypeMismatch {
                actual: FieldType::Null,
                ..
            })
        ));
    }

    #[test]
    fn test_payload_out_of_memory_is_not_committed() {
        let mut w = window_with_row(MIN_WINDOW_SIZE + 16 + 8, 1);
        let used = w.used_bytes();

        let err = w.put_blob(0, 0, &[1u8; 9]).unwrap_err();
        assert!(err.is_out_of_memory());
        assert_eq!(w.used_bytes(), used);
        assert!(w.is_null(0, 0).unwrap());

        // Exactly the remaining space still fits.
        w.put_blob(0, 0, &[1u8; 8]).unwrap();
        assert_eq!(w.free_space(), 0);
    }

    #[test]
    fn test_overwrite_appends_new_payload() {
        let mut w = window_with_row(4096, 1);
        w.put_string(0, 0, "first").unwrap();
        let used = w.used_bytes();

        w.put_string(0, 0, "second").unwrap();
        assert_eq!(w.used_bytes(), used + 6);
        assert_eq!(w.get_string(0, 0).unwrap(), "second");

        w.put_long(0, 0, 1).unwrap();
        assert_eq!(w.get_long(0, 0).unwrap(), 1);
    }

    #[test]
    fn test_free_last_row_reclaims_payloads() {
        let mut w = Window::create("test", 4096).unwrap();
        w.set_num_columns(1).unwrap();
        w.alloc_row().unwrap();
        w.put_string(0, 0, "keep").unwrap();
        let used = w.used_bytes();

        let row = w.alloc_row().unwrap();
        w.put_string(row, 0, "discard").unwrap();
        w.free_last_row().unwrap();

        assert_eq!(w.used_bytes(), used);
        assert_eq!(w.get_string(0, 0).unwrap(), "keep");
    }

    #[test]
    fn test_payload_for_older_row_blocks_free_last_row() {
        let mut w = Window::create("test", 4096).unwrap();
        w.set_num_columns(1).unwrap();
        w.alloc_row().unwrap();
        w.alloc_row().unwrap();

        w.put_string(0, 0, "older").unwrap();
        assert!(matches!(w.free_last_row(), Err(Error::NoRowToFree)));
        assert_eq!(w.get_string(0, 0).unwrap(), "older");
    }

    #[test]
    fn test_get_value() {
        let mut w = window_with_row(4096, 3);
        w.put_long(0, 0, 9).unwrap();
        w.put_string(0, 1, "x").unwrap();

        assert_eq!(w.get_value(0, 0).unwrap(), CellRef::Integer(9));
        assert_eq!(w.get_value(0, 1).unwrap(), CellRef::Text("x"));
        assert_eq!(w.get_value(0, 2).unwrap(), CellRef::Null);
    }

    #[test]
    fn test_put_value() {
        let mut w = window_with_row(4096, 2);
        w.put_value(0, 0, &Value::Float(2.5)).unwrap();
        w.put_value(0, 1, &Value::Blob(vec![7])).unwrap();

        assert_eq!(w.get_value(0, 0).unwrap().to_value(), Value::Float(2.5));
        assert_eq!(w.get_value(0, 1).unwrap().to_value(), Value::Blob(vec![7]));
    }

    #[test]
    fn test_out_of_range_access() {
        let mut w = window_with_row(4096, 1);
        assert!(matches!(w.put_long(1, 0, 1), Err(Error::IndexOutOfRange { .. })));
        assert!(matches!(w.get_long(0, 1), Err(Error::IndexOutOfRange { .. })));
    }
}
