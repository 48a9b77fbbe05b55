#![cfg_attr(docsrs, feature(doc_cfg))]

//! Client-side driver core for the OSP GPS receiver protocol.
//!
//! This crate owns the wire codec, the command engine that correlates
//! host-initiated requests with their replies, and the aiding responder
//! that answers the receiver's own position/time requests. It knows
//! nothing about any particular transport (serial port, TCP socket, file)
//! or about persisting almanac/ephemeris data to disk; those concerns
//! live in the embedding application.

pub mod aiding;
pub mod cache;
pub mod callbacks;
pub mod clock;
pub mod codec;
pub mod constants;
pub mod dispatcher;
mod engine;
pub mod error;
pub mod scanner;
pub mod transport;

pub use cache::{Cache, PositionSeed};
pub use callbacks::NavCallbacks;
pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{decode_inbound, InboundFrame, OutboundFrame};
pub use dispatcher::dispatch;
pub use engine::OspCore;
pub use error::{CodecError, OspError, Result};
pub use scanner::{FinishReason, ScanOutcome, Scanner};
pub use transport::Transport;
