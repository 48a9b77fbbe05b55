//! Encodes the aiding replies (MID 215) and rejections (MID 216) the
//! receiver expects in response to its own aiding request (MID 73).
//!
//! The bit-shift transforms below reproduce the original driver's position
//! and time transfer encoding exactly, including the 40-bit (`tow_h`,
//! `tow_l`) split of the GPS time-of-week field, the odd placement of the
//! UTC delta inside what would otherwise be a 2-byte reserved gap, and the
//! `lat << 32 / (180 * 1e7)` semicircle scaling used for position.

use std::time::SystemTime;

use crate::cache::{Cache, PositionSeed};
use crate::clock::Clock;
use crate::codec::outbound::{AidingDataFrame, AidingRejectFrame};
use crate::constants::{
    AIDING_REJECT_NO_DATA, GPS_CLOCK_OFFSET_SECS, GPS_EPOCH_UNIX_SECS, MID_AIDING_REQUEST,
    POSITION_AIDING_HORIZ_ERR, POSITION_AIDING_VERT_ERR, SECONDS_PER_WEEK, TIME_AIDING_ACCURACY,
    TIME_AIDING_UTC_DELTA_MS,
};

/// GPS week number and time-of-week (in microseconds) for a given UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpsTime {
    pub week_number: u16,
    pub tow_us: u64,
}

impl GpsTime {
    pub fn from_system_time(utc: SystemTime) -> Self {
        let unix_secs = utc
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        let gps_secs = unix_secs - GPS_EPOCH_UNIX_SECS + GPS_CLOCK_OFFSET_SECS;
        let week_number = (gps_secs / SECONDS_PER_WEEK).max(0) as u16;
        let tow_secs = gps_secs.rem_euclid(SECONDS_PER_WEEK) as u64;
        GpsTime {
            week_number,
            tow_us: tow_secs * 1_000_000,
        }
    }

    /// Splits the 40-bit time-of-week field into its wire halves.
    pub fn tow_halves(&self) -> (u8, u32) {
        ((self.tow_us >> 32) as u8, self.tow_us as u32)
    }
}

fn scale_latitude(lat_e7: i32) -> i32 {
    (((lat_e7 as i64) << 32) / (180 * 10_000_000)) as i32
}

fn scale_longitude(lon_e7: i32) -> i32 {
    (((lon_e7 as i64) << 32) / (360 * 10_000_000)) as i32
}

fn scale_altitude(alt_cm: i32) -> i16 {
    let meters = alt_cm / 100;
    ((meters + 500) * 10) as i16
}

/// Builds the reply to a position aiding request from whatever the cache
/// currently holds. Returns `None` when the cache has no position to offer,
/// in which case the caller should send `position_reject` instead.
pub fn position_reply(cache: &Cache) -> Option<AidingDataFrame> {
    let PositionSeed {
        lat_e7,
        lon_e7,
        alt_cm,
    } = cache.position()?;
    Some(AidingDataFrame::Position {
        latitude: scale_latitude(lat_e7),
        longitude: scale_longitude(lon_e7),
        altitude: scale_altitude(alt_cm),
        horiz_err: POSITION_AIDING_HORIZ_ERR,
        vert_err: POSITION_AIDING_VERT_ERR,
    })
}

/// Builds the reply to a time aiding request from the clock's current UTC
/// reading. Time aiding never fails: the host clock is always available.
pub fn time_reply(clock: &dyn Clock) -> AidingDataFrame {
    let gps = GpsTime::from_system_time(clock.now_utc());
    let (tow_h, tow_l) = gps.tow_halves();
    AidingDataFrame::Time {
        week_number: gps.week_number,
        tow_h,
        tow_l,
        utc_delta_ms: TIME_AIDING_UTC_DELTA_MS,
        time_accuracy: TIME_AIDING_ACCURACY,
    }
}

/// Rejection sent when a position aiding request arrives but the cache has
/// nothing to offer. `rsid` is the sid (always 1, position) of the request
/// being rejected.
pub fn position_reject(rsid: u8) -> AidingRejectFrame {
    AidingRejectFrame {
        rmid: MID_AIDING_REQUEST,
        rsid,
        reason: AIDING_REJECT_NO_DATA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use std::time::Duration;

    #[test]
    fn gps_time_matches_known_epoch() {
        // 1980-01-06 00:00:00 UTC is GPS week 0, tow 0 before leap-second offset.
        let gps = GpsTime::from_system_time(
            SystemTime::UNIX_EPOCH + Duration::from_secs(GPS_EPOCH_UNIX_SECS as u64),
        );
        assert_eq!(gps.week_number, 0);
        assert_eq!(gps.tow_us, (GPS_CLOCK_OFFSET_SECS as u64) * 1_000_000);
    }

    #[test]
    fn tow_halves_split_40_bits() {
        let gps = GpsTime {
            week_number: 2300,
            tow_us: 0x12_3456_7890,
        };
        let (h, l) = gps.tow_halves();
        assert_eq!(h, 0x12);
        assert_eq!(l, 0x3456_7890);
    }

    #[test]
    fn position_reply_uses_cached_seed() {
        let mut cache = Cache::new();
        cache.set_position(PositionSeed {
            lat_e7: 407_128_000,
            lon_e7: -740_060_000,
            alt_cm: 1000,
        });
        match position_reply(&cache) {
            Some(AidingDataFrame::Position { altitude, .. }) => {
                assert_eq!(altitude, (10 + 500) * 10);
            }
            _ => panic!("expected position reply"),
        }
    }

    #[test]
    fn position_reply_scales_a_seed_to_exact_wire_units() {
        let mut cache = Cache::new();
        cache.set_position(PositionSeed {
            lat_e7: 550_000_000,
            lon_e7: 370_000_000,
            alt_cm: 10_000,
        });
        match position_reply(&cache) {
            Some(AidingDataFrame::Position {
                latitude,
                longitude,
                altitude,
                ..
            }) => {
                assert_eq!(latitude, 1_312_351_118);
                assert_eq!(longitude, 441_427_194);
                assert_eq!(altitude, 6000);
            }
            _ => panic!("expected position reply"),
        }
    }

    #[test]
    fn position_reply_is_none_when_cache_empty() {
        let cache = Cache::new();
        assert!(position_reply(&cache).is_none());
    }

    #[test]
    fn time_reply_reads_fixed_clock() {
        let clock = FixedClock::from_unix_secs(1_700_000_000);
        match time_reply(&clock) {
            AidingDataFrame::Time { week_number, .. } => assert!(week_number > 0),
            _ => panic!("expected time reply"),
        }
    }
}
