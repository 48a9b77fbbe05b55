use std::time::Duration;

// Message IDs, inbound.
pub const MID_VERSION: u8 = 6;
pub const MID_ACK: u8 = 11;
pub const MID_NACK: u8 = 12;
pub const MID_VISIBLE_LIST: u8 = 13;
pub const MID_ALMANAC_ROW: u8 = 14;
pub const MID_EPHEMERIS_ROW: u8 = 15;
pub const MID_OK_TO_SEND: u8 = 18;
pub const MID_MEASURE_NAV: u8 = 2;
pub const MID_TRACKER_STATE: u8 = 4;
pub const MID_CLOCK_STATUS: u8 = 7;
pub const MID_NAV_LIBRARY: u8 = 28;
pub const MID_GEODETIC_NAV: u8 = 41;
pub const MID_HW_CONFIG_REQUEST: u8 = 71;
pub const MID_AIDING_REQUEST: u8 = 73;
pub const MID_SESSION_RESPONSE: u8 = 74;
pub const MID_COMMAND_ECHO: u8 = 75;
pub const MID_PWR_ACK: u8 = 90;

// Message IDs, outbound.
pub const MID_INIT: u8 = 128;
pub const MID_ALMANAC_UPLOAD: u8 = 130;
pub const MID_VERSION_POLL: u8 = 132;
pub const MID_ALMANAC_POLL: u8 = 146;
pub const MID_EPHEMERIS_POLL: u8 = 147;
pub const MID_EPHEMERIS_UPLOAD: u8 = 149;
pub const MID_SET_MSG_RATE: u8 = 166;
pub const MID_SESSION_CONTROL: u8 = 213;
pub const MID_HW_CONFIG_REPLY: u8 = 214;
pub const MID_AIDING_DATA: u8 = 215;
pub const MID_AIDING_REJECT: u8 = 216;
pub const MID_PWR_MODE: u8 = 218;
pub const MID_CW_SCAN: u8 = 220;
pub const MID_EPHEMERIS_STATUS: u8 = 232;

// Session control sub-IDs and requests.
pub const SESSION_OPENING_REQUEST: u8 = 1;
pub const SESSION_CLOSING_REQUEST: u8 = 2;
pub const SESSION_OPEN_REQUEST: u8 = 1;
pub const SESSION_RESUME_REQUEST: u8 = 2;
pub const SESSION_CLOSE_REQUEST: u8 = 1;
pub const SESSION_SUSPEND_REQUEST: u8 = 2;

// Power-mode sub-IDs.
pub const PWR_SID_FULL: u8 = 0;
pub const PWR_SID_PTF: u8 = 4;

// CW scan mode. There is exactly one request shape on the wire; `sid` is a
// fixed constant, not a per-call token.
pub const CW_REQUEST_SID: u8 = 1;
pub const CW_MODE_SCAN_AUTO: u8 = 0;

// Ephemeris status poll always targets every satellite.
pub const EPH_STATUS_REQUEST_SID: u8 = 2;
pub const EPH_STATUS_ALL_SVIDS_MASK: u32 = 0xFF;

// Almanac/ephemeris sizing.
pub const ALMANAC_ROW_LEN: usize = 28;
pub const ALMANAC_ROWS: usize = 32;
pub const ALMANAC_LEN: usize = ALMANAC_ROW_LEN * ALMANAC_ROWS;
pub const EPHEMERIS_WORDS: usize = 45;
pub const MAX_EPHEMERIS_RECORDS: usize = 12;
pub const MAX_VERSION_LEN: usize = 80;

// Aiding constants.
pub const GPS_CLOCK_OFFSET_SECS: i64 = 18;
pub const GPS_EPOCH_UNIX_SECS: i64 = 315_964_800;
pub const SECONDS_PER_WEEK: i64 = 7 * 24 * 60 * 60;
pub const POSITION_AIDING_HORIZ_ERR: u8 = 0x50;
pub const POSITION_AIDING_VERT_ERR: u16 = 100;
pub const TIME_AIDING_ACCURACY: u8 = 0xB0;
pub const TIME_AIDING_UTC_DELTA_MS: u16 = (GPS_CLOCK_OFFSET_SECS as u16) * 1000;
pub const AIDING_REJECT_NO_DATA: u8 = 0x04;

/// Deadline for commands that expect a scanner to reach `Finished`.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(8);
/// Shorter deadline used by `wait_for_ready`, `open_session` and `close_session`.
pub const SHORT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// The one-shot NMEA sentence used to switch a 4800-baud NMEA-mode receiver
/// into OSP mode at 115200 baud. Never decoded, only ever emitted verbatim.
pub const NMEA_SWITCH_TO_OSP: &str = "$PSRF100,0,115200,8,1,0*04\r\n";
