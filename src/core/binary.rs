//! # Binary Codec
//!
//! Primitive encode/decode for tagged wire values.
//!
//! Every field on the wire is described by a [`Bin`] type tag. Fixed-width
//! numeric tags encode as exactly `width(tag)` little-endian bytes. Strings
//! encode as a `u32` byte length followed by UTF-8 bytes (no terminator,
//! zero length for empty). Lists encode as a `u32` item count followed by
//! each item encoded per the element tag.
//!
//! Decoding runs over a shared [`BinaryReader`] cursor: one immutable buffer,
//! one monotonically increasing offset. Bounds are checked before every read
//! so a buffer holding several consecutive fields can never be over-read; a
//! short buffer fails with [`ProtocolError::TruncatedInput`] instead of
//! returning a wrong value.
//!
//! ## Limits
//! - Decoded strings are capped at [`MAX_STRING_BYTES`]
//! - Decoded lists are capped at [`MAX_LIST_ITEMS`]
//!
//! Both ceilings are enforced before any payload byte is consumed.

use crate::config::{MAX_LIST_ITEMS, MAX_STRING_BYTES};
use crate::error::{ProtocolError, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// Wire type tag for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bin {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
    String,
    List,
}

impl Bin {
    /// Encoded width in bytes for fixed-width tags, `None` for variable-length.
    pub fn width(self) -> Option<usize> {
        match self {
            Bin::UInt8 | Bin::Int8 => Some(1),
            Bin::UInt16 | Bin::Int16 => Some(2),
            Bin::UInt32 | Bin::Int32 | Bin::Float32 => Some(4),
            Bin::UInt64 | Bin::Int64 | Bin::Float64 => Some(8),
            Bin::String | Bin::List => None,
        }
    }
}

/// A decoded wire value, one variant per type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// The type tag this value encodes as.
    pub fn tag(&self) -> Bin {
        match self {
            Value::U8(_) => Bin::UInt8,
            Value::I8(_) => Bin::Int8,
            Value::U16(_) => Bin::UInt16,
            Value::I16(_) => Bin::Int16,
            Value::U32(_) => Bin::UInt32,
            Value::I32(_) => Bin::Int32,
            Value::U64(_) => Bin::UInt64,
            Value::I64(_) => Bin::Int64,
            Value::F32(_) => Bin::Float32,
            Value::F64(_) => Bin::Float64,
            Value::Str(_) => Bin::String,
            Value::List(_) => Bin::List,
        }
    }

    /// Zero/empty value for a tag, used to initialise field slots.
    pub fn default_for(tag: Bin) -> Value {
        match tag {
            Bin::UInt8 => Value::U8(0),
            Bin::Int8 => Value::I8(0),
            Bin::UInt16 => Value::U16(0),
            Bin::Int16 => Value::I16(0),
            Bin::UInt32 => Value::U32(0),
            Bin::Int32 => Value::I32(0),
            Bin::UInt64 => Value::U64(0),
            Bin::Int64 => Value::I64(0),
            Bin::Float32 => Value::F32(0.0),
            Bin::Float64 => Value::F64(0.0),
            Bin::String => Value::Str(String::new()),
            Bin::List => Value::List(Vec::new()),
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match *self {
            Value::U8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::I32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Value::U32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Append-only encoder for tagged values.
///
/// Backed by a `BytesMut`; several fields (or whole packets) share one writer
/// so their encodings concatenate in declaration order.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: BytesMut,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode one value. `item` carries the element tag for lists and is
    /// ignored for every other value.
    pub fn write_value(&mut self, value: &Value, item: Option<Bin>) -> Result<()> {
        match value {
            Value::U8(v) => self.buf.put_u8(*v),
            Value::I8(v) => self.buf.put_i8(*v),
            Value::U16(v) => self.buf.put_u16_le(*v),
            Value::I16(v) => self.buf.put_i16_le(*v),
            Value::U32(v) => self.buf.put_u32_le(*v),
            Value::I32(v) => self.buf.put_i32_le(*v),
            Value::U64(v) => self.buf.put_u64_le(*v),
            Value::I64(v) => self.buf.put_i64_le(*v),
            Value::F32(v) => self.buf.put_f32_le(*v),
            Value::F64(v) => self.buf.put_f64_le(*v),
            Value::Str(s) => self.write_string(s),
            Value::List(items) => self.write_list(items, item)?,
        }
        Ok(())
    }

    fn write_string(&mut self, s: &str) {
        // Empty encodes as a lone zero length, no payload.
        self.buf.put_u32_le(s.len() as u32);
        if !s.is_empty() {
            self.buf.put_slice(s.as_bytes());
        }
    }

    fn write_list(&mut self, items: &[Value], item: Option<Bin>) -> Result<()> {
        let item_tag = item.ok_or(ProtocolError::NestedList)?;
        if item_tag == Bin::List {
            return Err(ProtocolError::NestedList);
        }
        self.buf.put_u32_le(items.len() as u32);
        for entry in items {
            if entry.tag() != item_tag {
                return Err(ProtocolError::NestedList);
            }
            self.write_value(entry, None)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Cursor-based decoder over one immutable buffer.
///
/// The offset only moves forward, and only after the bytes it is about to
/// consume are known to be present.
#[derive(Debug)]
pub struct BinaryReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Bytes left to decode.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// Current cursor position.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Take exactly `n` bytes, failing before the read if fewer remain.
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if remaining < n {
            return Err(ProtocolError::TruncatedInput {
                needed: n,
                remaining,
            });
        }
        let slice = &self.buf[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        if len > MAX_STRING_BYTES {
            return Err(ProtocolError::OversizedString(len));
        }
        let bytes = self.take(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    fn read_list(&mut self, item_tag: Bin) -> Result<Vec<Value>> {
        if item_tag == Bin::List {
            return Err(ProtocolError::NestedList);
        }
        let count = self.read_u32()? as usize;
        if count > MAX_LIST_ITEMS {
            return Err(ProtocolError::OversizedList(count));
        }
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.read_value(item_tag, None)?);
        }
        Ok(items)
    }

    /// Decode one value of the given tag. `item` carries the element tag for
    /// lists and is ignored otherwise.
    pub fn read_value(&mut self, tag: Bin, item: Option<Bin>) -> Result<Value> {
        let value = match tag {
            Bin::UInt8 => Value::U8(self.take(1)?[0]),
            Bin::Int8 => Value::I8(self.take(1)?[0] as i8),
            Bin::UInt16 => {
                let b = self.take(2)?;
                Value::U16(u16::from_le_bytes([b[0], b[1]]))
            }
            Bin::Int16 => {
                let b = self.take(2)?;
                Value::I16(i16::from_le_bytes([b[0], b[1]]))
            }
            Bin::UInt32 => Value::U32(self.read_u32()?),
            Bin::Int32 => {
                let b = self.take(4)?;
                Value::I32(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            }
            Bin::UInt64 => {
                let b = self.take(8)?;
                Value::U64(u64::from_le_bytes([
                    b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
                ]))
            }
            Bin::Int64 => {
                let b = self.take(8)?;
                Value::I64(i64::from_le_bytes([
                    b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
                ]))
            }
            Bin::Float32 => {
                let b = self.take(4)?;
                Value::F32(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            }
            Bin::Float64 => {
                let b = self.take(8)?;
                Value::F64(f64::from_le_bytes([
                    b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
                ]))
            }
            Bin::String => Value::Str(self.read_string()?),
            Bin::List => {
                let item_tag = item.ok_or(ProtocolError::NestedList)?;
                Value::List(self.read_list(item_tag)?)
            }
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn roundtrip(value: Value, item: Option<Bin>) -> Value {
        let tag = value.tag();
        let mut w = BinaryWriter::new();
        w.write_value(&value, item).unwrap();
        let bytes = w.into_bytes();
        let mut r = BinaryReader::new(&bytes);
        let decoded = r.read_value(tag, item).unwrap();
        assert_eq!(r.remaining(), 0, "decode must consume the whole encoding");
        decoded
    }

    #[test]
    fn test_scalar_roundtrips() {
        assert_eq!(roundtrip(Value::U8(255), None), Value::U8(255));
        assert_eq!(roundtrip(Value::I8(-128), None), Value::I8(-128));
        assert_eq!(roundtrip(Value::U16(65535), None), Value::U16(65535));
        assert_eq!(roundtrip(Value::I16(-32768), None), Value::I16(-32768));
        assert_eq!(roundtrip(Value::U32(u32::MAX), None), Value::U32(u32::MAX));
        assert_eq!(roundtrip(Value::I32(i32::MIN), None), Value::I32(i32::MIN));
        assert_eq!(roundtrip(Value::U64(u64::MAX), None), Value::U64(u64::MAX));
        assert_eq!(roundtrip(Value::I64(i64::MIN), None), Value::I64(i64::MIN));
        assert_eq!(roundtrip(Value::F32(1.5), None), Value::F32(1.5));
        assert_eq!(roundtrip(Value::F64(-2.25), None), Value::F64(-2.25));
    }

    #[test]
    fn test_negative_zero_preserves_sign_bit() {
        let decoded = roundtrip(Value::F64(-0.0), None);
        match decoded {
            Value::F64(v) => assert_eq!(v.to_bits(), (-0.0f64).to_bits()),
            other => panic!("expected F64, got {other:?}"),
        }
    }

    #[test]
    fn test_fixed_widths() {
        for (value, width) in [
            (Value::U8(1), 1),
            (Value::I16(1), 2),
            (Value::F32(1.0), 4),
            (Value::U64(1), 8),
        ] {
            let mut w = BinaryWriter::new();
            w.write_value(&value, None).unwrap();
            assert_eq!(w.len(), width);
            assert_eq!(value.tag().width(), Some(width));
        }
    }

    #[test]
    fn test_empty_string_is_lone_zero_length() {
        let mut w = BinaryWriter::new();
        w.write_value(&Value::Str(String::new()), None).unwrap();
        assert_eq!(&w.into_bytes()[..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_string_roundtrip() {
        let decoded = roundtrip(Value::Str("héllo wörld".to_string()), None);
        assert_eq!(decoded, Value::Str("héllo wörld".to_string()));
    }

    #[test]
    fn test_max_length_string_roundtrip() {
        let s = "x".repeat(MAX_STRING_BYTES);
        let decoded = roundtrip(Value::Str(s.clone()), None);
        assert_eq!(decoded, Value::Str(s));
    }

    #[test]
    fn test_oversized_string_rejected_before_payload() {
        // Length claims 65537 bytes; only the 4-byte length is present.
        let mut buf = Vec::new();
        buf.extend_from_slice(&(MAX_STRING_BYTES as u32 + 1).to_le_bytes());
        let mut r = BinaryReader::new(&buf);
        let err = r.read_value(Bin::String, None).unwrap_err();
        assert!(matches!(err, ProtocolError::OversizedString(65537)));
        // Nothing past the length was consumed.
        assert_eq!(r.offset(), 4);
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&[0xFF, 0xFE]);
        let mut r = BinaryReader::new(&buf);
        assert!(matches!(
            r.read_value(Bin::String, None),
            Err(ProtocolError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_list_roundtrip() {
        let items = vec![
            Value::Str("7".to_string()),
            Value::Str("+".to_string()),
            Value::Str("3".to_string()),
        ];
        let decoded = roundtrip(Value::List(items.clone()), Some(Bin::String));
        assert_eq!(decoded, Value::List(items));
    }

    #[test]
    fn test_empty_list_roundtrip() {
        let decoded = roundtrip(Value::List(Vec::new()), Some(Bin::Int32));
        assert_eq!(decoded, Value::List(Vec::new()));
    }

    #[test]
    fn test_oversized_list_rejected_before_items() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(MAX_LIST_ITEMS as u32 + 1).to_le_bytes());
        let mut r = BinaryReader::new(&buf);
        let err = r.read_value(Bin::List, Some(Bin::UInt8)).unwrap_err();
        assert!(matches!(err, ProtocolError::OversizedList(4097)));
        assert_eq!(r.offset(), 4);
    }

    #[test]
    fn test_nested_list_rejected() {
        let mut w = BinaryWriter::new();
        assert!(matches!(
            w.write_value(&Value::List(Vec::new()), Some(Bin::List)),
            Err(ProtocolError::NestedList)
        ));

        let buf = 0u32.to_le_bytes();
        let mut r = BinaryReader::new(&buf);
        assert!(matches!(
            r.read_value(Bin::List, Some(Bin::List)),
            Err(ProtocolError::NestedList)
        ));
    }

    #[test]
    fn test_final_single_byte_decodes() {
        // A one-byte buffer must decode as a UInt8; the check is on bytes
        // remaining, not on cursor position relative to length minus one.
        let buf = [0x7F];
        let mut r = BinaryReader::new(&buf);
        assert_eq!(r.read_value(Bin::UInt8, None).unwrap(), Value::U8(0x7F));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_consecutive_fields_share_cursor() {
        let mut w = BinaryWriter::new();
        w.write_value(&Value::I32(-42), None).unwrap();
        w.write_value(&Value::Str("ok".to_string()), None).unwrap();
        w.write_value(&Value::U8(9), None).unwrap();
        let bytes = w.into_bytes();

        let mut r = BinaryReader::new(&bytes);
        assert_eq!(r.read_value(Bin::Int32, None).unwrap(), Value::I32(-42));
        assert_eq!(
            r.read_value(Bin::String, None).unwrap(),
            Value::Str("ok".to_string())
        );
        assert_eq!(r.read_value(Bin::UInt8, None).unwrap(), Value::U8(9));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_truncated_primitive_fails_without_consuming() {
        let buf = [0x01, 0x02]; // two bytes, need four
        let mut r = BinaryReader::new(&buf);
        let err = r.read_value(Bin::UInt32, None).unwrap_err();
        match err {
            ProtocolError::TruncatedInput { needed, remaining } => {
                assert_eq!(needed, 4);
                assert_eq!(remaining, 2);
            }
            other => panic!("expected TruncatedInput, got {other:?}"),
        }
        assert_eq!(r.offset(), 0);
    }

    #[test]
    fn test_truncation_at_every_offset_fails_cleanly() {
        let mut w = BinaryWriter::new();
        w.write_value(&Value::U64(0x0102030405060708), None).unwrap();
        w.write_value(&Value::Str("abc".to_string()), None).unwrap();
        let bytes = w.into_bytes();

        for cut in 0..bytes.len() {
            let mut r = BinaryReader::new(&bytes[..cut]);
            let first = r.read_value(Bin::UInt64, None);
            let result = first.and_then(|_| r.read_value(Bin::String, None));
            assert!(result.is_err(), "cut at {cut} should fail");
        }
    }
}
