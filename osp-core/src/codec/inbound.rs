use super::{require_len, require_min_len};
use crate::constants::*;
use crate::error::CodecError;

/// A decoded inbound OSP frame (mid + payload already split by the
/// transport framer).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum InboundFrame {
    Version(VersionFrame),
    Ack(AckFrame),
    Nack(NackFrame),
    VisibleList(VisibleListFrame),
    AlmanacRow(AlmanacRowFrame),
    EphemerisRow(EphemerisRowFrame),
    OkToSend,
    MeasureNav(RawTelemetryFrame),
    TrackerState(TrackerStateFrame),
    ClockStatus(RawTelemetryFrame),
    NavLibrary(RawTelemetryFrame),
    GeodeticNav(GeodeticNavFrame),
    HwConfigRequest,
    AidingRequest(AidingRequestFrame),
    SessionResponse(SessionResponseFrame),
    CommandEcho(CommandEchoFrame),
    PwrAck(PwrAckFrame),
}

pub(super) fn decode(mid: u8, payload: &[u8]) -> Result<InboundFrame, CodecError> {
    Ok(match mid {
        MID_VERSION => InboundFrame::Version(VersionFrame::decode(payload)?),
        MID_ACK => InboundFrame::Ack(AckFrame::decode(payload)?),
        MID_NACK => InboundFrame::Nack(NackFrame::decode(payload)?),
        MID_VISIBLE_LIST => InboundFrame::VisibleList(VisibleListFrame::decode(payload)?),
        MID_ALMANAC_ROW => InboundFrame::AlmanacRow(AlmanacRowFrame::decode(payload)?),
        MID_EPHEMERIS_ROW => InboundFrame::EphemerisRow(EphemerisRowFrame::decode(payload)?),
        MID_OK_TO_SEND => InboundFrame::OkToSend,
        MID_MEASURE_NAV => InboundFrame::MeasureNav(RawTelemetryFrame::decode(payload)),
        MID_TRACKER_STATE => InboundFrame::TrackerState(TrackerStateFrame::decode(payload)?),
        MID_CLOCK_STATUS => InboundFrame::ClockStatus(RawTelemetryFrame::decode(payload)),
        MID_NAV_LIBRARY => InboundFrame::NavLibrary(RawTelemetryFrame::decode(payload)),
        MID_GEODETIC_NAV => InboundFrame::GeodeticNav(GeodeticNavFrame::decode(payload)?),
        MID_HW_CONFIG_REQUEST => InboundFrame::HwConfigRequest,
        MID_AIDING_REQUEST => InboundFrame::AidingRequest(AidingRequestFrame::decode(payload)?),
        MID_SESSION_RESPONSE => InboundFrame::SessionResponse(SessionResponseFrame::decode(payload)?),
        MID_COMMAND_ECHO => InboundFrame::CommandEcho(CommandEchoFrame::decode(payload)?),
        MID_PWR_ACK => InboundFrame::PwrAck(PwrAckFrame::decode(payload)?),
        other => return Err(CodecError::UnknownMid(other)),
    })
}

/// Version string, copied verbatim (not necessarily NUL-terminated or UTF-8).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VersionFrame {
    pub bytes: Vec<u8>,
}

impl VersionFrame {
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        require_min_len(MID_VERSION, payload, 0)?;
        let take = payload.len().min(MAX_VERSION_LEN);
        Ok(VersionFrame {
            bytes: payload[..take].to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![MID_VERSION];
        out.extend_from_slice(&self.bytes);
        out
    }

    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AckFrame {
    pub sid: u8,
}

impl AckFrame {
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        require_len(MID_ACK, payload, 1)?;
        Ok(AckFrame { sid: payload[0] })
    }

    pub fn encode(&self) -> Vec<u8> {
        vec![MID_ACK, self.sid]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NackFrame {
    pub nacid: u8,
}

impl NackFrame {
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        require_len(MID_NACK, payload, 1)?;
        Ok(NackFrame { nacid: payload[0] })
    }

    pub fn encode(&self) -> Vec<u8> {
        vec![MID_NACK, self.nacid]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VisibleChannel {
    pub svid: u8,
    pub azimuth: u16,
    pub elevation: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VisibleListFrame {
    pub channels: Vec<VisibleChannel>,
}

impl VisibleListFrame {
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        require_min_len(MID_VISIBLE_LIST, payload, 1)?;
        let svs = payload[0] as usize;
        require_len(MID_VISIBLE_LIST, payload, 1 + svs * 5)?;
        let mut channels = Vec::with_capacity(svs);
        for chunk in payload[1..].chunks_exact(5) {
            channels.push(VisibleChannel {
                svid: chunk[0],
                azimuth: u16::from_be_bytes([chunk[1], chunk[2]]),
                elevation: u16::from_be_bytes([chunk[3], chunk[4]]),
            });
        }
        Ok(VisibleListFrame { channels })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![MID_VISIBLE_LIST, self.channels.len() as u8];
        for ch in &self.channels {
            out.push(ch.svid);
            out.extend_from_slice(&ch.azimuth.to_be_bytes());
            out.extend_from_slice(&ch.elevation.to_be_bytes());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AlmanacRowFrame {
    pub svid: u8,
    pub row: [u8; ALMANAC_ROW_LEN],
}

impl AlmanacRowFrame {
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        require_len(MID_ALMANAC_ROW, payload, 1 + ALMANAC_ROW_LEN)?;
        let mut row = [0u8; ALMANAC_ROW_LEN];
        row.copy_from_slice(&payload[1..]);
        Ok(AlmanacRowFrame {
            svid: payload[0],
            row,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + ALMANAC_ROW_LEN);
        out.push(MID_ALMANAC_ROW);
        out.push(self.svid);
        out.extend_from_slice(&self.row);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EphemerisRowFrame {
    pub svid: u8,
    pub data: [u16; EPHEMERIS_WORDS],
}

impl EphemerisRowFrame {
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        require_len(MID_EPHEMERIS_ROW, payload, 1 + EPHEMERIS_WORDS * 2)?;
        let mut data = [0u16; EPHEMERIS_WORDS];
        for (word, chunk) in data.iter_mut().zip(payload[1..].chunks_exact(2)) {
            *word = u16::from_be_bytes([chunk[0], chunk[1]]);
        }
        Ok(EphemerisRowFrame {
            svid: payload[0],
            data,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + EPHEMERIS_WORDS * 2);
        out.push(MID_EPHEMERIS_ROW);
        out.push(self.svid);
        for word in &self.data {
            out.extend_from_slice(&word.to_be_bytes());
        }
        out
    }
}

/// Telemetry whose internal sub-fields are not pinned by this
/// specification (MID 2, 7, 28); kept as opaque bytes for observability.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawTelemetryFrame {
    pub payload: Vec<u8>,
}

impl RawTelemetryFrame {
    pub fn decode(payload: &[u8]) -> Self {
        RawTelemetryFrame {
            payload: payload.to_vec(),
        }
    }

    pub fn encode(&self, mid: u8) -> Vec<u8> {
        let mut out = vec![mid];
        out.extend_from_slice(&self.payload);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrackerChannel {
    pub svid: u8,
    pub cn0: [u8; 10],
    pub state: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrackerStateFrame {
    pub channels: Vec<TrackerChannel>,
}

impl TrackerStateFrame {
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        require_min_len(MID_TRACKER_STATE, payload, 1)?;
        let chans = payload[0] as usize;
        require_len(MID_TRACKER_STATE, payload, 1 + chans * 13)?;
        let mut channels = Vec::with_capacity(chans);
        for chunk in payload[1..].chunks_exact(13) {
            let mut cn0 = [0u8; 10];
            cn0.copy_from_slice(&chunk[1..11]);
            channels.push(TrackerChannel {
                svid: chunk[0],
                cn0,
                state: u16::from_be_bytes([chunk[11], chunk[12]]),
            });
        }
        Ok(TrackerStateFrame { channels })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![MID_TRACKER_STATE, self.channels.len() as u8];
        for ch in &self.channels {
            out.push(ch.svid);
            out.extend_from_slice(&ch.cn0);
            out.extend_from_slice(&ch.state.to_be_bytes());
        }
        out
    }

    /// Average CN0 (carrier-to-noise density) over the 10-sample window for
    /// each channel, in the same order as `channels`.
    pub fn average_cn0(&self) -> Vec<u8> {
        self.channels
            .iter()
            .map(|ch| (ch.cn0.iter().map(|&v| v as u32).sum::<u32>() / ch.cn0.len() as u32) as u8)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UtcTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second_ms: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GeodeticNavFrame {
    pub utc: UtcTime,
    pub nav_valid: u16,
    pub nav_type: u16,
    pub svs_in_fix: u8,
    pub latitude: i32,
    pub longitude: i32,
    pub altitude_msl: i32,
    pub est_h_pos_error: u32,
    pub est_v_pos_error: u32,
    pub clock_drift: i32,
}

impl GeodeticNavFrame {
    const LEN: usize = 2 + 1 + 1 + 1 + 1 + 2 + 2 + 2 + 1 + 4 + 4 + 4 + 4 + 4 + 4;

    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        require_len(MID_GEODETIC_NAV, payload, Self::LEN)?;
        let year = u16::from_be_bytes([payload[0], payload[1]]);
        let month = payload[2];
        let day = payload[3];
        let hour = payload[4];
        let minute = payload[5];
        let second_ms = u16::from_be_bytes([payload[6], payload[7]]);
        let nav_valid = u16::from_be_bytes([payload[8], payload[9]]);
        let nav_type = u16::from_be_bytes([payload[10], payload[11]]);
        let svs_in_fix = payload[12];
        let latitude = i32::from_be_bytes(payload[13..17].try_into().unwrap());
        let longitude = i32::from_be_bytes(payload[17..21].try_into().unwrap());
        let altitude_msl = i32::from_be_bytes(payload[21..25].try_into().unwrap());
        let est_h_pos_error = u32::from_be_bytes(payload[25..29].try_into().unwrap());
        let est_v_pos_error = u32::from_be_bytes(payload[29..33].try_into().unwrap());
        let clock_drift = i32::from_be_bytes(payload[33..37].try_into().unwrap());
        Ok(GeodeticNavFrame {
            utc: UtcTime {
                year,
                month,
                day,
                hour,
                minute,
                second_ms,
            },
            nav_valid,
            nav_type,
            svs_in_fix,
            latitude,
            longitude,
            altitude_msl,
            est_h_pos_error,
            est_v_pos_error,
            clock_drift,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + Self::LEN);
        out.push(MID_GEODETIC_NAV);
        out.extend_from_slice(&self.utc.year.to_be_bytes());
        out.push(self.utc.month);
        out.push(self.utc.day);
        out.push(self.utc.hour);
        out.push(self.utc.minute);
        out.extend_from_slice(&self.utc.second_ms.to_be_bytes());
        out.extend_from_slice(&self.nav_valid.to_be_bytes());
        out.extend_from_slice(&self.nav_type.to_be_bytes());
        out.push(self.svs_in_fix);
        out.extend_from_slice(&self.latitude.to_be_bytes());
        out.extend_from_slice(&self.longitude.to_be_bytes());
        out.extend_from_slice(&self.altitude_msl.to_be_bytes());
        out.extend_from_slice(&self.est_h_pos_error.to_be_bytes());
        out.extend_from_slice(&self.est_v_pos_error.to_be_bytes());
        out.extend_from_slice(&self.clock_drift.to_be_bytes());
        out
    }

    /// UTC calendar time as a `chrono` naive datetime, if the fields are
    /// in-range (mirrors the original source's `mktime` call).
    pub fn utc_datetime(&self) -> Option<chrono::NaiveDateTime> {
        chrono::NaiveDate::from_ymd_opt(self.utc.year as i32, self.utc.month as u32, self.utc.day as u32)
            .and_then(|date| {
                date.and_hms_milli_opt(
                    self.utc.hour as u32,
                    self.utc.minute as u32,
                    (self.utc.second_ms / 1000) as u32,
                    (self.utc.second_ms % 1000) as u32,
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AidingRequestFrame {
    pub sid: u8,
}

impl AidingRequestFrame {
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        require_len(MID_AIDING_REQUEST, payload, 1)?;
        Ok(AidingRequestFrame { sid: payload[0] })
    }

    pub fn encode(&self) -> Vec<u8> {
        vec![MID_AIDING_REQUEST, self.sid]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SessionResponseFrame {
    pub sid: u8,
    pub status: u8,
}

impl SessionResponseFrame {
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        require_len(MID_SESSION_RESPONSE, payload, 2)?;
        Ok(SessionResponseFrame {
            sid: payload[0],
            status: payload[1],
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        vec![MID_SESSION_RESPONSE, self.sid, self.status]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CommandEchoFrame {
    pub sid: u8,
    pub echo_mid: u8,
    pub echo_sid: u8,
    pub ack: u8,
}

impl CommandEchoFrame {
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        require_len(MID_COMMAND_ECHO, payload, 4)?;
        Ok(CommandEchoFrame {
            sid: payload[0],
            echo_mid: payload[1],
            echo_sid: payload[2],
            ack: payload[3],
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        vec![MID_COMMAND_ECHO, self.sid, self.echo_mid, self.echo_sid, self.ack]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PwrAckFrame {
    pub sid: u8,
    pub error_code: u8,
}

impl PwrAckFrame {
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        require_len(MID_PWR_ACK, payload, 2)?;
        Ok(PwrAckFrame {
            sid: payload[0],
            error_code: payload[1],
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        vec![MID_PWR_ACK, self.sid, self.error_code]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_round_trips() {
        let frame = AckFrame { sid: 146 };
        let bytes = frame.encode();
        assert_eq!(bytes, vec![MID_ACK, 146]);
        let decoded = AckFrame::decode(&bytes[1..]).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn almanac_row_round_trips() {
        let mut row = [0u8; ALMANAC_ROW_LEN];
        for (i, b) in row.iter_mut().enumerate() {
            *b = i as u8;
        }
        let frame = AlmanacRowFrame { svid: 5, row };
        let bytes = frame.encode();
        assert_eq!(bytes.len(), 2 + ALMANAC_ROW_LEN);
        let decoded = AlmanacRowFrame::decode(&bytes[1..]).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn ephemeris_row_round_trips() {
        let mut data = [0u16; EPHEMERIS_WORDS];
        for (i, w) in data.iter_mut().enumerate() {
            *w = i as u16 * 3;
        }
        let frame = EphemerisRowFrame { svid: 12, data };
        let bytes = frame.encode();
        let decoded = EphemerisRowFrame::decode(&bytes[1..]).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn visible_list_round_trips() {
        let frame = VisibleListFrame {
            channels: vec![
                VisibleChannel {
                    svid: 3,
                    azimuth: 180,
                    elevation: 45,
                },
                VisibleChannel {
                    svid: 9,
                    azimuth: 270,
                    elevation: 12,
                },
            ],
        };
        let bytes = frame.encode();
        assert_eq!(bytes[1], 2);
        let decoded = VisibleListFrame::decode(&bytes[1..]).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn geodetic_nav_round_trips() {
        let frame = GeodeticNavFrame {
            utc: UtcTime {
                year: 2024,
                month: 3,
                day: 14,
                hour: 9,
                minute: 26,
                second_ms: 53_500,
            },
            nav_valid: 0,
            nav_type: 4,
            svs_in_fix: 7,
            latitude: 550_000_000,
            longitude: 370_000_000,
            altitude_msl: 10_000,
            est_h_pos_error: 150,
            est_v_pos_error: 300,
            clock_drift: 96_250,
        };
        let bytes = frame.encode();
        let decoded = GeodeticNavFrame::decode(&bytes[1..]).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let err = AckFrame::decode(&[1, 2]).unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidLength {
                mid: MID_ACK,
                expected: 1,
                got: 2
            }
        );
    }

    #[test]
    fn decode_dispatches_by_mid() {
        let frame = decode(MID_OK_TO_SEND, &[]).unwrap();
        assert!(matches!(frame, InboundFrame::OkToSend));

        let err = decode(250, &[]).unwrap_err();
        assert_eq!(err, CodecError::UnknownMid(250));
    }
}
