//! Hooks the embedder implements to receive unsolicited telemetry. Every
//! method has a no-op default except `on_geodetic_nav`, since a driver with
//! no position output is not useful for anything.

use crate::codec::inbound::{GeodeticNavFrame, RawTelemetryFrame, TrackerStateFrame, VisibleListFrame};

pub trait NavCallbacks: Send + Sync {
    /// Called for every geodetic navigation data frame (MID 41).
    fn on_geodetic_nav(&self, fix: &GeodeticNavFrame);

    fn on_visible_list(&self, _list: &VisibleListFrame) {}

    fn on_tracker_state(&self, _state: &TrackerStateFrame) {}

    fn on_measure_nav(&self, _raw: &RawTelemetryFrame) {}

    fn on_clock_status(&self, _raw: &RawTelemetryFrame) {}

    fn on_nav_library(&self, _raw: &RawTelemetryFrame) {}
}
