//! # Packet Framework
//!
//! Generic (de)serialization over an ordered, named field set.
//!
//! A packet variant declares its fields once, in wire order; [`Packet::pack`]
//! and [`Packet::unpack`] walk that declaration and drive the binary codec,
//! so no variant hand-writes byte-level parsing. Field order is the wire
//! contract: encodings concatenate in declaration order and decode in the
//! same order.
//!
//! Variants expose their fields through typed accessor methods backed by the
//! field table, keeping the "declared fields only" invariant static. A
//! variant may override [`Packet::parse`], the post-decode hook the service
//! loop invokes exactly once after a successful unpack.

use crate::core::binary::{Bin, BinaryReader, BinaryWriter, Value};
use crate::error::{ProtocolError, Result};
use bytes::Bytes;

/// A named, typed value slot inside a packet.
///
/// The name and type tag are fixed at declaration time; only the value
/// mutates over the field's lifetime.
#[derive(Debug, Clone)]
pub struct Field {
    name: &'static str,
    tag: Bin,
    item: Option<Bin>,
    value: Value,
}

impl Field {
    /// Declare a scalar or string field, initialised to zero/empty.
    pub fn new(name: &'static str, tag: Bin) -> Self {
        Self {
            name,
            tag,
            item: None,
            value: Value::default_for(tag),
        }
    }

    /// Declare a list field with the given element tag.
    pub fn list(name: &'static str, item: Bin) -> Self {
        Self {
            name,
            tag: Bin::List,
            item: Some(item),
            value: Value::List(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tag(&self) -> Bin {
        self.tag
    }

    /// Element tag for list fields, `None` otherwise.
    pub fn item(&self) -> Option<Bin> {
        self.item
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// In-place access for typed accessors inside the crate. External code
    /// goes through `set_value` so the declared tag cannot drift.
    pub(crate) fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    /// Replace the value, rejecting a value whose tag differs from the
    /// declared one.
    pub fn set_value(&mut self, value: Value) -> Result<()> {
        if value.tag() != self.tag {
            return Err(ProtocolError::FieldTypeMismatch { field: self.name });
        }
        self.value = value;
        Ok(())
    }
}

/// A wire packet variant: a fixed opcode plus an ordered field set.
///
/// `pack`/`unpack` are provided; implementors supply the opcode, the field
/// table, and optionally a `parse` hook.
pub trait Packet: Send {
    /// Single-byte wire identifier for this variant. Every implementor
    /// carries one by construction, so a packet can never be sent without an
    /// opcode.
    fn opcode(&self) -> u8;

    /// Fields in declaration (wire) order.
    fn fields(&self) -> &[Field];

    fn fields_mut(&mut self) -> &mut [Field];

    /// Post-decode hook, invoked exactly once after a successful unpack.
    /// Never invoked for a failed unpack.
    fn parse(&mut self) {}

    /// Encode every field in declaration order into one payload.
    fn pack(&self) -> Result<Bytes> {
        let mut writer = BinaryWriter::new();
        for field in self.fields() {
            if field.value().tag() != field.tag() {
                return Err(ProtocolError::FieldTypeMismatch { field: field.name() });
            }
            writer.write_value(field.value(), field.item())?;
        }
        Ok(writer.into_bytes())
    }

    /// Decode the payload into the field slots, in declaration order.
    ///
    /// Any decode failure aborts the whole unpack; callers must not dispatch
    /// a partially populated instance.
    fn unpack(&mut self, payload: &[u8]) -> Result<()> {
        let mut reader = BinaryReader::new(payload);
        for field in self.fields_mut() {
            let value = reader.read_value(field.tag(), field.item())?;
            field.set_value(value)?;
        }
        Ok(())
    }
}
