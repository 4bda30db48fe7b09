//! Edge-case tests for the wire limits and decode failure paths.
//!
//! Every ceiling is exercised one past its limit, and every failure is
//! checked to happen before the offending payload is consumed.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use bytes::BytesMut;
use packetwire::config::{MAX_FRAME_SIZE, MAX_LIST_ITEMS, MAX_STRING_BYTES};
use packetwire::core::binary::{Bin, BinaryReader};
use packetwire::core::codec::FrameCodec;
use packetwire::core::packet::{Field, Packet};
use packetwire::error::ProtocolError;
use packetwire::protocol::registry::Registry;
use tokio_util::codec::Decoder;

struct StringPacket {
    fields: [Field; 1],
}

impl Default for StringPacket {
    fn default() -> Self {
        Self {
            fields: [Field::new("text", Bin::String)],
        }
    }
}

impl Packet for StringPacket {
    fn opcode(&self) -> u8 {
        0x10
    }

    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }
}

#[test]
fn string_one_past_ceiling_rejected_before_payload() {
    // A length of 65537 followed by a single byte: the ceiling must fire on
    // the length alone, before any payload is read.
    let mut payload = Vec::new();
    payload.extend_from_slice(&(MAX_STRING_BYTES as u32 + 1).to_le_bytes());
    payload.push(b'x');

    let mut packet = StringPacket::default();
    let err = packet.unpack(&payload).unwrap_err();
    assert!(matches!(err, ProtocolError::OversizedString(n) if n == MAX_STRING_BYTES + 1));
}

#[test]
fn string_at_ceiling_accepted() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&(MAX_STRING_BYTES as u32).to_le_bytes());
    payload.extend_from_slice(&vec![b'a'; MAX_STRING_BYTES]);

    let mut packet = StringPacket::default();
    packet.unpack(&payload).unwrap();
    assert_eq!(
        packet.fields()[0].value().as_str().unwrap().len(),
        MAX_STRING_BYTES
    );
}

#[test]
fn list_one_past_ceiling_rejected_before_items() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&(MAX_LIST_ITEMS as u32 + 1).to_le_bytes());

    let mut reader = BinaryReader::new(&payload);
    let err = reader.read_value(Bin::List, Some(Bin::UInt8)).unwrap_err();
    assert!(matches!(err, ProtocolError::OversizedList(n) if n == MAX_LIST_ITEMS + 1));
    // Only the count was consumed.
    assert_eq!(reader.offset(), 4);
}

#[test]
fn list_at_ceiling_accepted() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&(MAX_LIST_ITEMS as u32).to_le_bytes());
    payload.extend_from_slice(&vec![7u8; MAX_LIST_ITEMS]);

    let mut reader = BinaryReader::new(&payload);
    let value = reader.read_value(Bin::List, Some(Bin::UInt8)).unwrap();
    assert_eq!(value.as_list().unwrap().len(), MAX_LIST_ITEMS);
}

#[test]
fn frame_one_past_ceiling_rejected_before_payload() {
    // Header only: magic plus an implausible length. The reject must not
    // wait for 64MB of payload to arrive.
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&packetwire::config::FRAME_MAGIC.to_le_bytes());
    buf.extend_from_slice(&(MAX_FRAME_SIZE as u32 + 1).to_le_bytes());

    let err = FrameCodec.decode(&mut buf).unwrap_err();
    assert!(matches!(err, ProtocolError::OversizedFrame(n) if n == MAX_FRAME_SIZE + 1));
}

#[test]
fn failed_unpack_never_reaches_dispatch() {
    let registry = Registry::new();
    registry.register::<StringPacket>().unwrap();

    let mut packet = registry.create(0x10).unwrap().unwrap();
    // Claims four bytes of string, provides one.
    let bad_payload = [4u8, 0, 0, 0, b'x'];
    let result = packet.unpack(&bad_payload);
    assert!(matches!(result, Err(ProtocolError::TruncatedInput { .. })));
    // The caller's contract: drop the instance, never call parse(). The
    // field slot still holds its pre-unpack value.
    assert_eq!(packet.fields()[0].value().as_str(), Some(""));
}

#[test]
fn trailing_bytes_after_fields_are_tolerated() {
    // The packet only consumes its declared fields; extra payload from a
    // newer peer is ignored rather than being an error.
    let mut payload = Vec::new();
    payload.extend_from_slice(&2u32.to_le_bytes());
    payload.extend_from_slice(b"ok");
    payload.extend_from_slice(b"future-extension");

    let mut packet = StringPacket::default();
    packet.unpack(&payload).unwrap();
    assert_eq!(packet.fields()[0].value().as_str(), Some("ok"));
}

#[test]
fn garbage_length_with_valid_magic_is_oversized_not_io() {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&packetwire::config::FRAME_MAGIC.to_le_bytes());
    buf.extend_from_slice(&u32::MAX.to_le_bytes());
    assert!(matches!(
        FrameCodec.decode(&mut buf),
        Err(ProtocolError::OversizedFrame(_))
    ));
}
