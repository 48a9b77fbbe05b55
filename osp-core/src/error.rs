use core::fmt;

/// Error returned by a host-initiated command.
///
/// Aiding and telemetry handlers never surface this type to the embedder: a
/// failed aiding send is logged and dropped instead (see the dispatcher).
#[derive(Debug)]
pub enum OspError {
    /// Another command is already in flight.
    Busy,
    /// The command's deadline expired before its scanner reached `Finished`.
    Timeout,
    /// The receiver NACKed the command. Carries `nacid | 0x80`.
    Retry(u8),
    /// A reply violated a protocol invariant (unexpected sid, malformed frame).
    Invalid { expected: &'static str },
    /// The receiver reported a non-zero device error code.
    Device(u8),
    /// Sending the outbound frame through the transport failed. The command
    /// was never actually issued, so there is nothing to wait for.
    Transport(std::io::Error),
}

impl fmt::Display for OspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OspError::Busy => f.write_str("another command is already in flight"),
            OspError::Timeout => f.write_str("timed out waiting for a reply"),
            OspError::Retry(nacid) => write!(f, "receiver sent nack 0x{nacid:02x}"),
            OspError::Invalid { expected } => write!(f, "invalid reply, expected {expected}"),
            OspError::Device(code) => write!(f, "device reported error code {code}"),
            OspError::Transport(e) => write!(f, "transport send failed: {e}"),
        }
    }
}

impl std::error::Error for OspError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OspError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for OspError {
    fn from(e: std::io::Error) -> Self {
        OspError::Transport(e)
    }
}

pub type Result<T> = std::result::Result<T, OspError>;

/// Error returned when decoding a malformed inbound frame.
#[derive(Debug, PartialEq, Eq)]
pub enum CodecError {
    InvalidLength {
        mid: u8,
        expected: usize,
        got: usize,
    },
    UnknownMid(u8),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::InvalidLength { mid, expected, got } => write!(
                f,
                "invalid payload length for mid {mid}, expected {expected}, got {got}"
            ),
            CodecError::UnknownMid(mid) => write!(f, "unknown message id {mid}"),
        }
    }
}

impl std::error::Error for CodecError {}
