//! Decode-then-encode round trips for the inbound frame types: for every
//! variant that carries fields, decoding arbitrary-but-valid wire bytes and
//! re-encoding must reproduce the original bytes exactly.

use osp_core::codec::inbound::{
    AckFrame, AidingRequestFrame, AlmanacRowFrame, CommandEchoFrame, EphemerisRowFrame,
    GeodeticNavFrame, NackFrame, PwrAckFrame, SessionResponseFrame, UtcTime,
};
use osp_core::constants::{ALMANAC_ROW_LEN, EPHEMERIS_WORDS};
use proptest::prelude::*;

proptest! {
    #[test]
    fn ack_round_trips(sid in any::<u8>()) {
        let frame = AckFrame { sid };
        let encoded = frame.encode();
        let decoded = AckFrame::decode(&encoded[1..]).unwrap();
        prop_assert_eq!(decoded, frame);
    }

    #[test]
    fn nack_round_trips(nacid in any::<u8>()) {
        let frame = NackFrame { nacid };
        let encoded = frame.encode();
        let decoded = NackFrame::decode(&encoded[1..]).unwrap();
        prop_assert_eq!(decoded, frame);
    }

    #[test]
    fn pwr_ack_round_trips(sid in any::<u8>(), error_code in any::<u8>()) {
        let frame = PwrAckFrame { sid, error_code };
        let encoded = frame.encode();
        let decoded = PwrAckFrame::decode(&encoded[1..]).unwrap();
        prop_assert_eq!(decoded, frame);
    }

    #[test]
    fn aiding_request_round_trips(sid in any::<u8>()) {
        let frame = AidingRequestFrame { sid };
        let encoded = frame.encode();
        let decoded = AidingRequestFrame::decode(&encoded[1..]).unwrap();
        prop_assert_eq!(decoded, frame);
    }

    #[test]
    fn session_response_round_trips(sid in any::<u8>(), status in any::<u8>()) {
        let frame = SessionResponseFrame { sid, status };
        let encoded = frame.encode();
        let decoded = SessionResponseFrame::decode(&encoded[1..]).unwrap();
        prop_assert_eq!(decoded, frame);
    }

    #[test]
    fn command_echo_round_trips(sid in any::<u8>(), echo_mid in any::<u8>(), echo_sid in any::<u8>(), ack in any::<u8>()) {
        let frame = CommandEchoFrame { sid, echo_mid, echo_sid, ack };
        let encoded = frame.encode();
        let decoded = CommandEchoFrame::decode(&encoded[1..]).unwrap();
        prop_assert_eq!(decoded, frame);
    }

    #[test]
    fn almanac_row_round_trips(svid in any::<u8>(), row in proptest::array::uniform28(any::<u8>())) {
        let frame = AlmanacRowFrame { svid, row };
        let encoded = frame.encode();
        let decoded = AlmanacRowFrame::decode(&encoded[1..]).unwrap();
        prop_assert_eq!(decoded, frame);
        prop_assert_eq!(row.len(), ALMANAC_ROW_LEN);
    }

    #[test]
    fn ephemeris_row_round_trips(svid in any::<u8>(), words in proptest::collection::vec(any::<u16>(), EPHEMERIS_WORDS..=EPHEMERIS_WORDS)) {
        let mut data = [0u16; EPHEMERIS_WORDS];
        data.copy_from_slice(&words);
        let frame = EphemerisRowFrame { svid, data };
        let encoded = frame.encode();
        let decoded = EphemerisRowFrame::decode(&encoded[1..]).unwrap();
        prop_assert_eq!(decoded, frame);
    }

    #[test]
    fn geodetic_nav_round_trips(
        year in any::<u16>(),
        month in any::<u8>(),
        day in any::<u8>(),
        hour in any::<u8>(),
        minute in any::<u8>(),
        second_ms in any::<u16>(),
        nav_valid in any::<u16>(),
        nav_type in any::<u16>(),
        svs_in_fix in any::<u8>(),
        latitude in any::<i32>(),
        longitude in any::<i32>(),
        altitude_msl in any::<i32>(),
        est_h_pos_error in any::<u32>(),
        est_v_pos_error in any::<u32>(),
        clock_drift in any::<i32>(),
    ) {
        let frame = GeodeticNavFrame {
            utc: UtcTime { year, month, day, hour, minute, second_ms },
            nav_valid,
            nav_type,
            svs_in_fix,
            latitude,
            longitude,
            altitude_msl,
            est_h_pos_error,
            est_v_pos_error,
            clock_drift,
        };
        let encoded = frame.encode();
        let decoded = GeodeticNavFrame::decode(&encoded[1..]).unwrap();
        prop_assert_eq!(decoded, frame);
    }
}
