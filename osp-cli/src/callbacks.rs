//! Logs every unsolicited telemetry frame the receiver streams. A real
//! embedder would forward fixes somewhere useful; this one just narrates.

use osp_core::codec::inbound::{GeodeticNavFrame, RawTelemetryFrame, TrackerStateFrame, VisibleListFrame};
use osp_core::NavCallbacks;

pub struct LoggingCallbacks;

impl NavCallbacks for LoggingCallbacks {
    fn on_geodetic_nav(&self, fix: &GeodeticNavFrame) {
        log::info!(
            "fix: {} svs, lat={} lon={} alt_msl={}cm drift={}Hz",
            fix.svs_in_fix,
            fix.latitude,
            fix.longitude,
            fix.altitude_msl,
            fix.clock_drift,
        );
    }

    fn on_tracker_state(&self, state: &TrackerStateFrame) {
        log::debug!("tracker state: cn0 per channel {:?}", state.average_cn0());
    }

    fn on_visible_list(&self, list: &VisibleListFrame) {
        log::debug!("{} satellites visible", list.channels.len());
    }

    fn on_measure_nav(&self, _raw: &RawTelemetryFrame) {
        log::trace!("measure nav data received");
    }

    fn on_clock_status(&self, _raw: &RawTelemetryFrame) {
        log::trace!("clock status received");
    }

    fn on_nav_library(&self, _raw: &RawTelemetryFrame) {
        log::trace!("nav library data received");
    }
}
