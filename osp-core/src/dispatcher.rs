//! Routes every decoded inbound frame either to the engine's active
//! scanner, to a telemetry callback, or to the aiding responder. This is
//! the single place that decides what an inbound byte stream means; the
//! engine never parses frames itself.

use log::{error, trace, warn};

use crate::aiding;
use crate::codec::inbound::InboundFrame;
use crate::codec::outbound::OutboundFrame;
use crate::engine::OspCore;

/// Feeds one decoded inbound frame through the driver. Call this for every
/// frame the transport's reader loop decodes off the wire.
pub fn dispatch(core: &OspCore, frame: InboundFrame) {
    match &frame {
        InboundFrame::GeodeticNav(fix) => {
            if fix.svs_in_fix > 0 {
                core.set_clock_drift(fix.clock_drift);
            }
            core.callbacks().on_geodetic_nav(fix);
            return;
        }
        InboundFrame::VisibleList(list) => {
            core.callbacks().on_visible_list(list);
            return;
        }
        InboundFrame::TrackerState(state) => {
            core.callbacks().on_tracker_state(state);
            return;
        }
        InboundFrame::MeasureNav(raw) => {
            core.callbacks().on_measure_nav(raw);
            return;
        }
        InboundFrame::ClockStatus(raw) => {
            core.callbacks().on_clock_status(raw);
            return;
        }
        InboundFrame::NavLibrary(raw) => {
            core.callbacks().on_nav_library(raw);
            return;
        }
        InboundFrame::HwConfigRequest => {
            trace!("hardware config request received");
            if let Err(e) = core.reply_hw_config() {
                error!("failed to reply to hardware config request: {e}");
            }
            return;
        }
        InboundFrame::AidingRequest(req) => {
            handle_aiding_request(core, req.sid);
            return;
        }
        _ => {}
    }

    if !core.offer_frame(frame) {
        warn!("inbound frame did not match any pending command or known telemetry");
    }
}

fn handle_aiding_request(core: &OspCore, sid: u8) {
    let result = match sid {
        1 => {
            let cache = core.cache_snapshot();
            match aiding::position_reply(&cache) {
                Some(reply) => core.send_unsolicited(&OutboundFrame::AidingData(reply)),
                None => core.send_unsolicited(&OutboundFrame::AidingReject(aiding::position_reject(sid))),
            }
        }
        2 => {
            let reply = aiding::time_reply(core.clock().as_ref());
            core.send_unsolicited(&OutboundFrame::AidingData(reply))
        }
        other => {
            warn!("unhandled aiding transfer request sid={other}");
            return;
        }
    };
    if let Err(e) = result {
        error!("failed to answer aiding request: {e}");
    }
}
