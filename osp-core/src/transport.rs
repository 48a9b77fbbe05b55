//! The byte-level sink the engine sends encoded frames through. Kept as a
//! trait object so the engine never depends on a concrete serial port type;
//! the CLI binary supplies the real implementation, tests supply an
//! in-memory one.

use std::io;

/// Sends already-framed bytes to the receiver and toggles NMEA/OSP framing
/// if the underlying link needs it. Implementations must be safe to call
/// from the engine's command thread while a reader thread is concurrently
/// feeding inbound bytes to the dispatcher.
pub trait Transport: Send + Sync {
    /// Writes one complete, checksum-terminated frame.
    fn send(&self, frame: &[u8]) -> io::Result<()>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingTransport {
        pub sent: Mutex<Vec<Vec<u8>>>,
    }

    impl Transport for RecordingTransport {
        fn send(&self, frame: &[u8]) -> io::Result<()> {
            self.sent.lock().unwrap().push(frame.to_vec());
            Ok(())
        }
    }
}
