//! Byte-exact encode/decode of every OSP message variant.
//!
//! All multi-byte integers are big-endian on the wire; conversion to and
//! from native endianness happens exactly at this boundary. The transport
//! framer above this module is responsible for SOF/EOF/length/checksum and
//! hands this module only the already-delimited payload bytes (mid + body).

pub mod inbound;
pub mod outbound;

pub use inbound::InboundFrame;
pub use outbound::OutboundFrame;

use crate::error::CodecError;

/// Largest payload this crate ever sends or receives (the 32-row almanac
/// upload), used by embedders sizing a contiguous inbound/outbound buffer.
pub const MAX_FRAME_LEN: usize = 1 + crate::constants::ALMANAC_LEN;

pub(crate) fn require_len(mid: u8, payload: &[u8], expected: usize) -> Result<(), CodecError> {
    if payload.len() != expected {
        return Err(CodecError::InvalidLength {
            mid,
            expected,
            got: payload.len(),
        });
    }
    Ok(())
}

pub(crate) fn require_min_len(mid: u8, payload: &[u8], min: usize) -> Result<(), CodecError> {
    if payload.len() < min {
        return Err(CodecError::InvalidLength {
            mid,
            expected: min,
            got: payload.len(),
        });
    }
    Ok(())
}

/// Decode an inbound frame given its message id and payload (payload does
/// not include the mid byte).
pub fn decode_inbound(mid: u8, payload: &[u8]) -> Result<InboundFrame, CodecError> {
    inbound::decode(mid, payload)
}
