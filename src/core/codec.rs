//! # Frame Codec
//!
//! Tokio codec for framing packets over byte streams.
//!
//! ## Wire Format
//! ```text
//! [Magic(2)] [Length(4)] [Opcode(1)] [Payload(N)]
//! ```
//! All integers little-endian. `Length` counts the opcode byte plus the
//! payload, so a frame is never shorter than one byte past the header.
//!
//! ## Security
//! - Maximum frame length: 64MB (prevents memory exhaustion)
//! - Magic bytes prevent accidental misinterpretation
//! - Length validation before the payload is buffered
//!
//! A header failure (bad magic, zero or implausible length) is unrecoverable
//! for the stream: framing is lost, so the error propagates and the owning
//! connection is torn down.

use crate::config::{FRAME_MAGIC, MAX_FRAME_SIZE};
use crate::error::ProtocolError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Frame header size: magic (2) + length (4).
pub const HEADER_SIZE: usize = 6;

/// One complete wire message: an opcode and its field payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Single-byte variant identifier.
    pub opcode: u8,
    /// Encoded field payload (everything after the opcode byte).
    pub payload: Bytes,
}

impl Frame {
    pub fn new(opcode: u8, payload: Bytes) -> Self {
        Self { opcode, payload }
    }

    /// Wire length field for this frame: opcode byte plus payload.
    pub fn wire_length(&self) -> usize {
        1 + self.payload.len()
    }
}

/// Length-prefixed frame codec over a raw byte stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameCodec;

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, ProtocolError> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        // Header is validated before any payload byte is awaited.
        let magic = u16::from_le_bytes([src[0], src[1]]);
        if magic != FRAME_MAGIC {
            return Err(ProtocolError::BadMagic(magic));
        }

        let length = u32::from_le_bytes([src[2], src[3], src[4], src[5]]) as usize;
        if length == 0 {
            return Err(ProtocolError::EmptyFrame);
        }
        if length > MAX_FRAME_SIZE {
            return Err(ProtocolError::OversizedFrame(length));
        }

        if src.len() < HEADER_SIZE + length {
            // Reserve up front so the stream fills one allocation.
            src.reserve(HEADER_SIZE + length - src.len());
            return Ok(None);
        }

        src.advance(HEADER_SIZE);
        let opcode = src.get_u8();
        let payload = src.split_to(length - 1).freeze();

        Ok(Some(Frame { opcode, payload }))
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let length = frame.wire_length();
        if length > MAX_FRAME_SIZE {
            return Err(ProtocolError::OversizedFrame(length));
        }

        dst.reserve(HEADER_SIZE + length);
        dst.put_u16_le(FRAME_MAGIC);
        dst.put_u32_le(length as u32);
        dst.put_u8(frame.opcode);
        dst.extend_from_slice(&frame.payload);
        Ok(())
    }
}
