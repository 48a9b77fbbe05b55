//! Host-side state the aiding encoder draws on when the receiver asks to be
//! aided. Nothing here is sent unprompted; it is only consulted when an
//! aiding request (MID 73) arrives.

/// A position fix good enough to seed the receiver's next acquisition.
/// Held in ordinary human units; the aiding encoder applies the wire's
/// fixed-point scaling at send time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionSeed {
    /// Latitude in units of 1e-7 degrees.
    pub lat_e7: i32,
    /// Longitude in units of 1e-7 degrees.
    pub lon_e7: i32,
    /// Altitude above the ellipsoid, in centimeters.
    pub alt_cm: i32,
}

/// Position and clock state the host keeps on hand to answer aiding
/// requests. `None` position means the driver has nothing to offer and an
/// aiding request should be rejected. Clock drift is tracked independently:
/// it is refreshed from every fix with satellites locked, regardless of
/// whether a position seed is present.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cache {
    position: Option<PositionSeed>,
    clock_drift: i32,
}

impl Cache {
    pub fn new() -> Self {
        Cache {
            position: None,
            clock_drift: 0,
        }
    }

    pub fn set_position(&mut self, seed: PositionSeed) {
        self.position = Some(seed);
    }

    pub fn clear_position(&mut self) {
        self.position = None;
    }

    pub fn position(&self) -> Option<PositionSeed> {
        self.position
    }

    pub fn set_clock_drift(&mut self, drift: i32) {
        self.clock_drift = drift;
    }

    pub fn clock_drift(&self) -> i32 {
        self.clock_drift
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let cache = Cache::new();
        assert!(cache.position().is_none());
    }

    #[test]
    fn stores_and_clears_position() {
        let mut cache = Cache::new();
        cache.set_position(PositionSeed {
            lat_e7: 1,
            lon_e7: 2,
            alt_cm: 3,
        });
        assert!(cache.position().is_some());
        cache.clear_position();
        assert!(cache.position().is_none());
    }

    #[test]
    fn clock_drift_tracks_independently_of_position() {
        let mut cache = Cache::new();
        cache.set_clock_drift(96_250);
        assert_eq!(cache.clock_drift(), 96_250);
        assert!(cache.position().is_none());
    }
}
