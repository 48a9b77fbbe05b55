//! The single-slot scanner that correlates an outbound command with its
//! reply on a full-duplex, interleaved byte stream.
//!
//! Exactly one scanner is ever active at a time (enforced by the engine's
//! mutex), so an ack/nack needs no host-generated transaction id to know
//! which command it belongs to: the first one to arrive while a scanner is
//! active is necessarily the answer to that command. The `sid` an ack or
//! nack carries on the wire is the message id of the command it is
//! acknowledging, not a correlation token the host chose; the almanac and
//! ephemeris poll scanners use it to tell "done" apart from a stray ack for
//! something else in flight on a shared bus.

use crate::codec::inbound::{AckFrame, CommandEchoFrame, InboundFrame, NackFrame, PwrAckFrame, SessionResponseFrame};
use crate::constants::{MID_ALMANAC_POLL, MID_EPHEMERIS_POLL};

/// Result of offering one inbound frame to the active scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The frame had nothing to do with the pending command.
    Skipped,
    /// The frame matched and was consumed, but the command is still waiting
    /// (e.g. a row frame before the stream-terminating ack).
    Consumed,
    /// The frame completed the command.
    Finished(FinishReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Ok,
    Nack(u8),
    Device(u8),
    /// The reply arrived but violated a protocol invariant (wrong echoed
    /// sid, or a sentinel value the original driver treats as a hard fail).
    Invalid(&'static str),
}

/// The kind of reply the currently pending command is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scanner {
    /// Waiting for any ack/nack (init, factory, almanac/ephemeris upload).
    Ack,
    /// Waiting for the unsolicited ok-to-send frame.
    OkToSend,
    /// Waiting for a session-response frame.
    Session,
    /// Waiting for a pwr-ack frame echoing `expected_sid`.
    PwrAck { expected_sid: u8 },
    /// Waiting for the almanac-row stream followed by its terminating ack.
    AlmanacPoll { rows_seen: u8 },
    /// Waiting for the ephemeris-row stream followed by its terminating ack.
    EphemerisPoll,
    /// Waiting for a command-echo frame acknowledging a cw scan request.
    CwAck,
    /// Waiting for the version string frame.
    Version,
}

impl Scanner {
    /// Offers one inbound frame to this scanner. Does not mutate engine
    /// state; the engine applies the returned outcome itself.
    pub fn examine(&mut self, frame: &InboundFrame) -> ScanOutcome {
        match self {
            Scanner::Ack => match frame {
                InboundFrame::Ack(AckFrame { .. }) => ScanOutcome::Finished(FinishReason::Ok),
                InboundFrame::Nack(NackFrame { nacid }) => {
                    ScanOutcome::Finished(FinishReason::Nack(*nacid))
                }
                _ => ScanOutcome::Skipped,
            },
            Scanner::OkToSend => match frame {
                InboundFrame::OkToSend => ScanOutcome::Finished(FinishReason::Ok),
                _ => ScanOutcome::Skipped,
            },
            Scanner::Session => match frame {
                InboundFrame::SessionResponse(SessionResponseFrame { status, .. }) => {
                    if *status == 0 {
                        ScanOutcome::Finished(FinishReason::Ok)
                    } else {
                        ScanOutcome::Finished(FinishReason::Device(*status))
                    }
                }
                // A command-echo (MID 75) during a session request is the
                // original driver's sentinel for "not a session response":
                // it sets response[0] = 3, which then always fails the
                // sid == 1/2 check in the caller. Surface that as FAIL
                // directly instead of leaving the command to time out.
                InboundFrame::CommandEcho(CommandEchoFrame { .. }) => {
                    ScanOutcome::Finished(FinishReason::Invalid("session response (got command echo)"))
                }
                _ => ScanOutcome::Skipped,
            },
            Scanner::PwrAck { expected_sid } => match frame {
                InboundFrame::PwrAck(PwrAckFrame { sid, error_code }) => {
                    if *sid != *expected_sid {
                        ScanOutcome::Finished(FinishReason::Invalid("pwr-ack sid"))
                    } else if *error_code == 0 {
                        ScanOutcome::Finished(FinishReason::Ok)
                    } else {
                        ScanOutcome::Finished(FinishReason::Device(*error_code))
                    }
                }
                _ => ScanOutcome::Skipped,
            },
            Scanner::AlmanacPoll { rows_seen } => match frame {
                InboundFrame::AlmanacRow(_) => {
                    *rows_seen += 1;
                    ScanOutcome::Consumed
                }
                InboundFrame::Ack(AckFrame { sid }) if *sid == MID_ALMANAC_POLL => {
                    ScanOutcome::Finished(FinishReason::Ok)
                }
                InboundFrame::Nack(NackFrame { nacid }) => {
                    ScanOutcome::Finished(FinishReason::Nack(*nacid))
                }
                _ => ScanOutcome::Skipped,
            },
            Scanner::EphemerisPoll => match frame {
                InboundFrame::EphemerisRow(_) => ScanOutcome::Consumed,
                InboundFrame::Ack(AckFrame { sid }) if *sid == MID_EPHEMERIS_POLL => {
                    ScanOutcome::Finished(FinishReason::Ok)
                }
                InboundFrame::Nack(NackFrame { nacid }) => {
                    ScanOutcome::Finished(FinishReason::Nack(*nacid))
                }
                _ => ScanOutcome::Skipped,
            },
            Scanner::CwAck => match frame {
                InboundFrame::CommandEcho(CommandEchoFrame { .. }) => {
                    ScanOutcome::Finished(FinishReason::Ok)
                }
                _ => ScanOutcome::Skipped,
            },
            Scanner::Version => match frame {
                InboundFrame::Version(_) => ScanOutcome::Finished(FinishReason::Ok),
                _ => ScanOutcome::Skipped,
            },
        }
    }
}
