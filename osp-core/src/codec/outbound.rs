use crate::constants::*;
use bitflags::bitflags;

bitflags! {
    /// Reset/configuration flags carried by the init message.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct InitFlags: u8 {
        const SYSTEM_RESET = 0b0000_0001;
        const COLD_START   = 0b0000_0010;
        const FACTORY      = 0b0000_0100;
        const CLR_XOCW     = 0b0000_1000;
        const KEEP_ROM     = 0b0001_0000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InitFrame {
    pub channels: u8,
    pub flags: InitFlags,
    pub protocol: u8,
}

impl InitFrame {
    pub fn encode(&self) -> Vec<u8> {
        vec![MID_INIT, self.channels, self.flags.bits(), self.protocol]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AlmanacUploadFrame {
    pub rows: [u8; ALMANAC_LEN],
}

impl AlmanacUploadFrame {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + ALMANAC_LEN);
        out.push(MID_ALMANAC_UPLOAD);
        out.extend_from_slice(&self.rows);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VersionPollFrame;

impl VersionPollFrame {
    pub fn encode(&self) -> Vec<u8> {
        vec![MID_VERSION_POLL, 0]
    }
}

/// Almanac poll request. `control` is always sent as 0; there are no other
/// poll modes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AlmanacPollFrame {
    pub control: u8,
}

impl AlmanacPollFrame {
    pub fn encode(&self) -> Vec<u8> {
        vec![MID_ALMANAC_POLL, self.control]
    }
}

/// Ephemeris poll request for a single satellite, or every satellite when
/// `svid` is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EphemerisPollFrame {
    pub svid: u8,
}

impl EphemerisPollFrame {
    pub fn encode(&self) -> Vec<u8> {
        vec![MID_EPHEMERIS_POLL, self.svid]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EphemerisUploadFrame {
    pub data: [u16; EPHEMERIS_WORDS],
}

impl EphemerisUploadFrame {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + EPHEMERIS_WORDS * 2);
        out.push(MID_EPHEMERIS_UPLOAD);
        for word in &self.data {
            out.extend_from_slice(&word.to_be_bytes());
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SetMsgRateFrame {
    pub mode: u8,
    pub mid_to_set: u8,
    pub rate: u8,
}

impl SetMsgRateFrame {
    pub fn encode(&self) -> Vec<u8> {
        vec![MID_SET_MSG_RATE, self.mode, self.mid_to_set, self.rate]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SessionControlFrame {
    pub sid: u8,
    pub request: u8,
}

impl SessionControlFrame {
    pub fn encode(&self) -> Vec<u8> {
        vec![MID_SESSION_CONTROL, self.sid, self.request]
    }
}

bitflags! {
    /// Capability bits the host advertises in answer to a hardware config
    /// request.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct HwConfigFlags: u8 {
        const RTC_AVAILABLE = 0b0000_0001;
        const RTC_INTERNAL  = 0b0000_0010;
        const COARSE_TIME_TA = 0b0000_0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HwConfigReplyFrame {
    pub flags: HwConfigFlags,
}

impl HwConfigReplyFrame {
    pub fn encode(&self) -> Vec<u8> {
        vec![MID_HW_CONFIG_REPLY, self.flags.bits()]
    }
}

/// Payload the driver answers a position or time aiding request with. The
/// leading byte of each encoding (1 for `Position`, 2 for `Time`) is the
/// frame's own `sid`, exactly as the receiver's aiding request used that
/// value to pick which one to ask for. Field layout and the `deltat_utc[1]`
/// offset quirk in `Time` mirror the receiver's own aiding request encoding
/// exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AidingDataFrame {
    Position {
        latitude: i32,
        longitude: i32,
        altitude: i16,
        horiz_err: u8,
        vert_err: u16,
    },
    Time {
        week_number: u16,
        tow_h: u8,
        tow_l: u32,
        utc_delta_ms: u16,
        time_accuracy: u8,
    },
}

impl AidingDataFrame {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            AidingDataFrame::Position {
                latitude,
                longitude,
                altitude,
                horiz_err,
                vert_err,
            } => {
                let mut out = vec![MID_AIDING_DATA, 1];
                out.extend_from_slice(&latitude.to_be_bytes());
                out.extend_from_slice(&longitude.to_be_bytes());
                out.extend_from_slice(&altitude.to_be_bytes());
                out.push(*horiz_err);
                out.extend_from_slice(&vert_err.to_be_bytes());
                out
            }
            AidingDataFrame::Time {
                week_number,
                tow_h,
                tow_l,
                utc_delta_ms,
                time_accuracy,
            } => {
                let mut out = vec![MID_AIDING_DATA, 2];
                out.extend_from_slice(&week_number.to_be_bytes());
                out.push(*tow_h);
                out.extend_from_slice(&tow_l.to_be_bytes());
                // Reserved byte followed by the delta, reproducing the
                // original deltat_utc[1] placement rather than a plain u16.
                out.push(0);
                out.extend_from_slice(&utc_delta_ms.to_be_bytes());
                out.push(*time_accuracy);
                out
            }
        }
    }
}

/// Rejection of an aiding request the driver cannot answer (no cached
/// position). `rmid`/`rsid` name the request being rejected, mirroring
/// `struct mid216` exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AidingRejectFrame {
    pub rmid: u8,
    pub rsid: u8,
    pub reason: u8,
}

impl AidingRejectFrame {
    pub fn encode(&self) -> Vec<u8> {
        vec![MID_AIDING_REJECT, 2, self.rmid, self.rsid, self.reason]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PwrModeFrame {
    Full,
    Ptf {
        period: u32,
        max_search_time: u32,
        max_off_time: u32,
    },
}

impl PwrModeFrame {
    /// The `sid` this mode uses in its own frame and in the receiver's ack.
    pub fn sid(&self) -> u8 {
        match self {
            PwrModeFrame::Full => PWR_SID_FULL,
            PwrModeFrame::Ptf { .. } => PWR_SID_PTF,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            PwrModeFrame::Full => vec![MID_PWR_MODE, PWR_SID_FULL],
            PwrModeFrame::Ptf {
                period,
                max_search_time,
                max_off_time,
            } => {
                let mut out = vec![MID_PWR_MODE, PWR_SID_PTF];
                out.extend_from_slice(&period.to_be_bytes());
                out.extend_from_slice(&max_search_time.to_be_bytes());
                out.extend_from_slice(&max_off_time.to_be_bytes());
                out
            }
        }
    }
}

/// CW interference scan request. `sid` is always 1 on the wire; there is no
/// per-satellite targeting, only a fixed auto-scan mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CwScanFrame {
    pub sid: u8,
    pub cw_mode: u8,
}

impl CwScanFrame {
    pub fn encode(&self) -> Vec<u8> {
        vec![MID_CW_SCAN, self.sid, self.cw_mode]
    }
}

/// Ephemeris status poll. Always requests every satellite (`svid_mask =
/// 0xFFFF_FFFF`'s low byte set, matching the fixed 0xFF mask the receiver
/// is polled with); there is no per-satellite variant on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EphemerisStatusFrame {
    pub sid: u8,
    pub svid_mask: u32,
}

impl EphemerisStatusFrame {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![MID_EPHEMERIS_STATUS, self.sid];
        out.extend_from_slice(&self.svid_mask.to_be_bytes());
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum OutboundFrame {
    Init(InitFrame),
    AlmanacUpload(AlmanacUploadFrame),
    VersionPoll(VersionPollFrame),
    AlmanacPoll(AlmanacPollFrame),
    EphemerisPoll(EphemerisPollFrame),
    EphemerisUpload(EphemerisUploadFrame),
    SetMsgRate(SetMsgRateFrame),
    SessionControl(SessionControlFrame),
    HwConfigReply(HwConfigReplyFrame),
    AidingData(AidingDataFrame),
    AidingReject(AidingRejectFrame),
    PwrMode(PwrModeFrame),
    CwScan(CwScanFrame),
    EphemerisStatus(EphemerisStatusFrame),
}

impl OutboundFrame {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            OutboundFrame::Init(f) => f.encode(),
            OutboundFrame::AlmanacUpload(f) => f.encode(),
            OutboundFrame::VersionPoll(f) => f.encode(),
            OutboundFrame::AlmanacPoll(f) => f.encode(),
            OutboundFrame::EphemerisPoll(f) => f.encode(),
            OutboundFrame::EphemerisUpload(f) => f.encode(),
            OutboundFrame::SetMsgRate(f) => f.encode(),
            OutboundFrame::SessionControl(f) => f.encode(),
            OutboundFrame::HwConfigReply(f) => f.encode(),
            OutboundFrame::AidingData(f) => f.encode(),
            OutboundFrame::AidingReject(f) => f.encode(),
            OutboundFrame::PwrMode(f) => f.encode(),
            OutboundFrame::CwScan(f) => f.encode(),
            OutboundFrame::EphemerisStatus(f) => f.encode(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_frame_encodes_flags_byte() {
        let frame = InitFrame {
            channels: 12,
            flags: InitFlags::SYSTEM_RESET | InitFlags::COLD_START,
            protocol: 1,
        };
        let bytes = frame.encode();
        assert_eq!(bytes, vec![MID_INIT, 12, 0x03, 1]);
    }

    #[test]
    fn session_control_encodes_sid_and_request() {
        let frame = SessionControlFrame {
            sid: 7,
            request: SESSION_OPEN_REQUEST,
        };
        assert_eq!(frame.encode(), vec![MID_SESSION_CONTROL, 7, 1]);
    }

    #[test]
    fn aiding_time_preserves_deltat_offset_quirk() {
        let frame = AidingDataFrame::Time {
            week_number: 2300,
            tow_h: 0,
            tow_l: 123_456_789,
            utc_delta_ms: TIME_AIDING_UTC_DELTA_MS,
            time_accuracy: TIME_AIDING_ACCURACY,
        };
        let bytes = frame.encode();
        // mid, sid(=2), week(2), tow_h(1), tow_l(4), reserved(1), delta(2), accuracy(1)
        assert_eq!(bytes.len(), 1 + 1 + 2 + 1 + 4 + 1 + 2 + 1);
        assert_eq!(bytes[1], 2);
        let reserved_idx = 2 + 2 + 1 + 4;
        assert_eq!(bytes[reserved_idx], 0);
        let delta = u16::from_be_bytes([bytes[reserved_idx + 1], bytes[reserved_idx + 2]]);
        assert_eq!(delta, TIME_AIDING_UTC_DELTA_MS);
    }

    #[test]
    fn aiding_position_encodes_fixed_errors() {
        let frame = AidingDataFrame::Position {
            latitude: 123_456,
            longitude: -654_321,
            altitude: 5000,
            horiz_err: POSITION_AIDING_HORIZ_ERR,
            vert_err: POSITION_AIDING_VERT_ERR,
        };
        let bytes = frame.encode();
        assert_eq!(bytes[0], MID_AIDING_DATA);
        assert_eq!(bytes[1], 1);
    }

    #[test]
    fn pwr_full_encodes_mid_and_zero_sid_only() {
        let frame = PwrModeFrame::Full;
        assert_eq!(frame.encode(), vec![MID_PWR_MODE, 0]);
    }

    #[test]
    fn pwr_ptf_encodes_three_be_durations() {
        let frame = PwrModeFrame::Ptf {
            period: 1,
            max_search_time: 2,
            max_off_time: 3,
        };
        let bytes = frame.encode();
        assert_eq!(bytes.len(), 1 + 1 + 4 + 4 + 4);
        assert_eq!(bytes[1], PWR_SID_PTF);
        assert_eq!(u32::from_be_bytes(bytes[2..6].try_into().unwrap()), 1);
        assert_eq!(u32::from_be_bytes(bytes[6..10].try_into().unwrap()), 2);
        assert_eq!(u32::from_be_bytes(bytes[10..14].try_into().unwrap()), 3);
    }

    #[test]
    fn ephemeris_upload_carries_only_data_words() {
        let data = [7u16; EPHEMERIS_WORDS];
        let frame = EphemerisUploadFrame { data };
        let bytes = frame.encode();
        assert_eq!(bytes.len(), 1 + EPHEMERIS_WORDS * 2);
    }
}
