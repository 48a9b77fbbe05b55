//! OSP wire framing: start sequence, length, payload, checksum, end
//! sequence. This is the layer the core library deliberately stays
//! ignorant of; it lives here because only the binary talks to an actual
//! byte stream.

const START: [u8; 2] = [0xA0, 0xA2];
const END: [u8; 2] = [0xB0, 0xB3];
const CHECKSUM_MASK: u16 = 0x7FFF;

fn checksum(payload: &[u8]) -> u16 {
    payload
        .iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(b as u16))
        & CHECKSUM_MASK
}

/// Wraps an already mid-prefixed payload in start/length/checksum/end.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 8);
    out.extend_from_slice(&START);
    out.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&checksum(payload).to_be_bytes());
    out.extend_from_slice(&END);
    out
}

/// Accumulates raw bytes off the wire and yields complete, checksum-valid
/// payloads (mid + body, with framing stripped).
#[derive(Default)]
pub struct Framer {
    buf: Vec<u8>,
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pulls the next complete frame out of the buffer, if one is present.
    /// Drops and resets past a byte that can't start a valid frame so a
    /// single corrupted frame cannot wedge the reader forever.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        loop {
            let start = self.buf.windows(2).position(|w| w == START)?;
            if start > 0 {
                self.buf.drain(..start);
            }
            if self.buf.len() < 4 {
                return None;
            }
            let len = u16::from_be_bytes([self.buf[2], self.buf[3]]) as usize;
            let total = 4 + len + 4;
            if self.buf.len() < total {
                return None;
            }
            let payload = self.buf[4..4 + len].to_vec();
            let checksum_bytes = [self.buf[4 + len], self.buf[4 + len + 1]];
            let end_bytes = [self.buf[total - 2], self.buf[total - 1]];
            self.buf.drain(..total);
            if end_bytes != END || u16::from_be_bytes(checksum_bytes) != checksum(&payload) {
                log::warn!("dropping malformed osp frame");
                continue;
            }
            return Some(payload);
        }
    }
}
