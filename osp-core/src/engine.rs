//! The command engine: serializes host-initiated commands over a single
//! mutex-guarded scanner slot and blocks the calling thread until the
//! receiver's reply arrives or the deadline passes.
//!
//! Only one command may be in flight at a time. A second caller attempting
//! to issue a command while one is outstanding gets `OspError::Busy`
//! immediately rather than queuing, matching the original driver's
//! single-outstanding-command contract.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::cache::{Cache, PositionSeed};
use crate::callbacks::NavCallbacks;
use crate::clock::Clock;
use crate::codec::inbound::{AlmanacRowFrame, EphemerisRowFrame, InboundFrame, VersionFrame};
use crate::codec::outbound::{
    AlmanacPollFrame, AlmanacUploadFrame, CwScanFrame, EphemerisPollFrame, EphemerisStatusFrame,
    EphemerisUploadFrame, HwConfigFlags, HwConfigReplyFrame, InitFlags, InitFrame, OutboundFrame,
    PwrModeFrame, SessionControlFrame, SetMsgRateFrame, VersionPollFrame,
};
use crate::constants::*;
use crate::error::{OspError, Result};
use crate::scanner::{FinishReason, ScanOutcome, Scanner};
use crate::transport::Transport;

struct State {
    busy: bool,
    active_scanner: Option<Scanner>,
    collected: Vec<InboundFrame>,
    finish: Option<FinishReason>,
    cache: Cache,
}

impl State {
    fn new() -> Self {
        State {
            busy: false,
            active_scanner: None,
            collected: Vec::new(),
            finish: None,
            cache: Cache::new(),
        }
    }
}

/// The driver's host-side command interface. Cheap to clone (all state is
/// behind `Arc`); clones share the same underlying session.
#[derive(Clone)]
pub struct OspCore {
    state: Arc<Mutex<State>>,
    condvar: Arc<Condvar>,
    transport: Arc<dyn Transport>,
    callbacks: Arc<dyn NavCallbacks>,
    clock: Arc<dyn Clock>,
}

impl OspCore {
    pub fn new(
        transport: Arc<dyn Transport>,
        callbacks: Arc<dyn NavCallbacks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        OspCore {
            state: Arc::new(Mutex::new(State::new())),
            condvar: Arc::new(Condvar::new()),
            transport,
            callbacks,
            clock,
        }
    }

    pub fn callbacks(&self) -> &Arc<dyn NavCallbacks> {
        &self.callbacks
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Replaces the position the aiding encoder will answer with. Pass
    /// `None` to go back to rejecting position aiding requests.
    pub fn set_position_seed(&self, seed: Option<PositionSeed>) {
        let mut state = self.state.lock().unwrap();
        match seed {
            Some(seed) => state.cache.set_position(seed),
            None => state.cache.clear_position(),
        }
    }

    /// Seeds both the cached position and clock drift together, mirroring
    /// `init`'s seed argument: the two are always set atomically before a
    /// cold start.
    pub fn seed_cache(&self, position: PositionSeed, clock_drift: i32) {
        let mut state = self.state.lock().unwrap();
        state.cache.set_position(position);
        state.cache.set_clock_drift(clock_drift);
    }

    pub(crate) fn cache_snapshot(&self) -> Cache {
        self.state.lock().unwrap().cache
    }

    /// Refreshes the cached clock drift from a fix with satellites locked.
    /// Called by the dispatcher for every geodetic nav frame; does not
    /// touch the cached position.
    pub(crate) fn set_clock_drift(&self, drift: i32) {
        self.state.lock().unwrap().cache.set_clock_drift(drift);
    }

    /// Entry point the dispatcher calls for every inbound frame not routed
    /// to telemetry or aiding. Returns `true` if a waiting command consumed
    /// or finished on this frame.
    pub(crate) fn offer_frame(&self, frame: InboundFrame) -> bool {
        let mut state = self.state.lock().unwrap();
        let Some(scanner) = state.active_scanner.as_mut() else {
            return false;
        };
        let outcome = scanner.examine(&frame);
        trace!("scanner outcome: {outcome:?}");
        match outcome {
            ScanOutcome::Skipped => false,
            ScanOutcome::Consumed => {
                state.collected.push(frame);
                true
            }
            ScanOutcome::Finished(reason) => {
                state.collected.push(frame);
                state.finish = Some(reason);
                state.active_scanner = None;
                self.condvar.notify_all();
                true
            }
        }
    }

    fn run_command(
        &self,
        scanner: Scanner,
        frame: OutboundFrame,
        timeout: Duration,
    ) -> Result<Vec<InboundFrame>> {
        self.claim_scanner(scanner)?;

        let encoded = frame.encode();
        if let Err(e) = self.transport.send(&encoded) {
            let mut state = self.state.lock().unwrap();
            state.busy = false;
            state.active_scanner = None;
            return Err(OspError::from(e));
        }

        self.wait_for_scanner(timeout)
    }

    /// Installs `scanner` as the active scanner without sending anything.
    /// Used by `wait_for_ready`, which passively waits for an unsolicited
    /// frame rather than issuing a command of its own.
    fn claim_scanner(&self, scanner: Scanner) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.busy {
            return Err(OspError::Busy);
        }
        state.busy = true;
        state.active_scanner = Some(scanner);
        state.collected.clear();
        state.finish = None;
        Ok(())
    }

    /// Blocks until the active scanner (already installed by `claim_scanner`)
    /// reaches `Finished`, or `timeout` elapses.
    fn wait_for_scanner(&self, timeout: Duration) -> Result<Vec<InboundFrame>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(reason) = state.finish {
                state.busy = false;
                let collected = std::mem::take(&mut state.collected);
                return match reason {
                    FinishReason::Ok => Ok(collected),
                    FinishReason::Nack(nacid) => Err(OspError::Retry(nacid | 0x80)),
                    FinishReason::Device(code) => Err(OspError::Device(code)),
                    FinishReason::Invalid(expected) => Err(OspError::Invalid { expected }),
                };
            }
            let now = Instant::now();
            if now >= deadline {
                state.busy = false;
                state.active_scanner = None;
                warn!("command timed out waiting for a reply");
                return Err(OspError::Timeout);
            }
            let (guard, timeout_result) = self
                .condvar
                .wait_timeout(state, deadline - now)
                .unwrap();
            state = guard;
            let _ = timeout_result;
        }
    }

    /// Resets and reconfigures the receiver for normal (non-factory)
    /// operation. Always requests a cold start; `reset` additionally forces
    /// a system reset. Waits for the ack/nack the receiver sends back
    /// before it drops off the bus to actually reset. The receiver always
    /// reports 12 channels here; there is no channel count parameter on
    /// this path.
    pub fn init(&self, reset: bool) -> Result<()> {
        let mut flags = InitFlags::COLD_START;
        if reset {
            flags |= InitFlags::SYSTEM_RESET;
        }
        debug!("sending init: reset={reset}");
        self.run_command(
            Scanner::Ack,
            OutboundFrame::Init(InitFrame {
                channels: 12,
                flags,
                protocol: 0,
            }),
            DEFAULT_COMMAND_TIMEOUT,
        )
        .map(|_| ())
    }

    /// Full factory reset. `keep_prom` preserves stored almanac/ephemeris;
    /// `keep_xocw` preserves the crystal oscillator warm-start cache.
    /// Unlike `init`, this path reports zero channels and sends no soft
    /// reset bits; it is a distinct command, not `init` with extra flags.
    pub fn factory(&self, keep_prom: bool, keep_xocw: bool) -> Result<()> {
        let mut flags = InitFlags::FACTORY;
        if !keep_xocw {
            flags |= InitFlags::CLR_XOCW;
        }
        if keep_prom {
            flags |= InitFlags::KEEP_ROM;
        }
        debug!("sending factory reset: keep_prom={keep_prom} keep_xocw={keep_xocw}");
        self.run_command(
            Scanner::Ack,
            OutboundFrame::Init(InitFrame {
                channels: 0,
                flags,
                protocol: 0,
            }),
            DEFAULT_COMMAND_TIMEOUT,
        )
        .map(|_| ())
    }

    /// Blocks until the receiver announces it is ready to accept commands.
    /// Sends nothing: the receiver raises the unsolicited ok-to-send frame
    /// (MID 18) on its own once it has finished initializing.
    pub fn wait_for_ready(&self) -> Result<()> {
        self.claim_scanner(Scanner::OkToSend)?;
        self.wait_for_scanner(SHORT_COMMAND_TIMEOUT).map(|_| ())
    }

    pub fn open_session(&self, resume: bool) -> Result<()> {
        let request = if resume {
            SESSION_RESUME_REQUEST
        } else {
            SESSION_OPEN_REQUEST
        };
        self.run_command(
            Scanner::Session,
            OutboundFrame::SessionControl(SessionControlFrame {
                sid: SESSION_OPENING_REQUEST,
                request,
            }),
            SHORT_COMMAND_TIMEOUT,
        )
        .map(|_| ())
    }

    pub fn close_session(&self, suspend: bool) -> Result<()> {
        let request = if suspend {
            SESSION_SUSPEND_REQUEST
        } else {
            SESSION_CLOSE_REQUEST
        };
        self.run_command(
            Scanner::Session,
            OutboundFrame::SessionControl(SessionControlFrame {
                sid: SESSION_CLOSING_REQUEST,
                request,
            }),
            SHORT_COMMAND_TIMEOUT,
        )
        .map(|_| ())
    }

    pub fn pwr_full(&self) -> Result<()> {
        let mode = PwrModeFrame::Full;
        self.run_command(
            Scanner::PwrAck { expected_sid: mode.sid() },
            OutboundFrame::PwrMode(mode),
            DEFAULT_COMMAND_TIMEOUT,
        )
        .map(|_| ())
    }

    pub fn pwr_ptf(&self, period: u32, max_search_time: u32, max_off_time: u32) -> Result<()> {
        let mode = PwrModeFrame::Ptf {
            period,
            max_search_time,
            max_off_time,
        };
        self.run_command(
            Scanner::PwrAck { expected_sid: mode.sid() },
            OutboundFrame::PwrMode(mode),
            DEFAULT_COMMAND_TIMEOUT,
        )
        .map(|_| ())
    }

    /// Polls the receiver's stored almanac, returning every row it streams
    /// back before the final ack.
    pub fn almanac_poll(&self) -> Result<Vec<AlmanacRowFrame>> {
        let frames = self.run_command(
            Scanner::AlmanacPoll { rows_seen: 0 },
            OutboundFrame::AlmanacPoll(AlmanacPollFrame { control: 0 }),
            DEFAULT_COMMAND_TIMEOUT,
        )?;
        Ok(frames
            .into_iter()
            .filter_map(|f| match f {
                InboundFrame::AlmanacRow(row) => Some(row),
                _ => None,
            })
            .collect())
    }

    /// Uploads a full 32-row almanac image (896 bytes) to the receiver.
    pub fn almanac_set(&self, rows: [u8; ALMANAC_LEN]) -> Result<()> {
        self.run_command(
            Scanner::Ack,
            OutboundFrame::AlmanacUpload(AlmanacUploadFrame { rows }),
            DEFAULT_COMMAND_TIMEOUT,
        )
        .map(|_| ())
    }

    /// Polls ephemeris data for `svid`, or every satellite when `svid` is 0.
    pub fn eph_poll(&self, svid: u8) -> Result<Vec<EphemerisRowFrame>> {
        let frames = self.run_command(
            Scanner::EphemerisPoll,
            OutboundFrame::EphemerisPoll(EphemerisPollFrame { svid }),
            DEFAULT_COMMAND_TIMEOUT,
        )?;
        Ok(frames
            .into_iter()
            .filter_map(|f| match f {
                InboundFrame::EphemerisRow(row) => Some(row),
                _ => None,
            })
            .collect())
    }

    pub fn eph_set(&self, data: [u16; EPHEMERIS_WORDS]) -> Result<()> {
        self.run_command(
            Scanner::Ack,
            OutboundFrame::EphemerisUpload(EphemerisUploadFrame { data }),
            DEFAULT_COMMAND_TIMEOUT,
        )
        .map(|_| ())
    }

    /// Requests the receiver log ephemeris status for every satellite. Fire
    /// and forget: the receiver does not ack this one. There is no
    /// per-satellite variant; the mask is always "all".
    pub fn eph_status(&self) -> Result<()> {
        self.transport
            .send(
                &OutboundFrame::EphemerisStatus(EphemerisStatusFrame {
                    sid: EPH_STATUS_REQUEST_SID,
                    svid_mask: EPH_STATUS_ALL_SVIDS_MASK,
                })
                .encode(),
            )?;
        Ok(())
    }

    /// Requests a CW interference scan. `enable` is carried for API parity
    /// with the original command but is not reflected on the wire: the
    /// receiver is always asked for an auto-scan.
    pub fn cw(&self, _enable: bool) -> Result<()> {
        self.run_command(
            Scanner::CwAck,
            OutboundFrame::CwScan(CwScanFrame {
                sid: CW_REQUEST_SID,
                cw_mode: CW_MODE_SCAN_AUTO,
            }),
            DEFAULT_COMMAND_TIMEOUT,
        )
        .map(|_| ())
    }

    /// Sets the unsolicited output rate for `mid_to_set`. Fire and forget:
    /// the receiver does not ack this one either.
    pub fn set_msg_rate(&self, mode: u8, mid_to_set: u8, rate: u8) -> Result<()> {
        self.transport.send(
            &OutboundFrame::SetMsgRate(SetMsgRateFrame {
                mode,
                mid_to_set,
                rate,
            })
            .encode(),
        )?;
        Ok(())
    }

    pub fn version(&self) -> Result<VersionFrame> {
        let frames = self.run_command(
            Scanner::Version,
            OutboundFrame::VersionPoll(VersionPollFrame),
            SHORT_COMMAND_TIMEOUT,
        )?;
        frames
            .into_iter()
            .find_map(|f| match f {
                InboundFrame::Version(v) => Some(v),
                _ => None,
            })
            .ok_or(OspError::Invalid {
                expected: "version frame",
            })
    }

    /// Answers the receiver's hardware configuration poll. Not gated by the
    /// busy/scanner machinery: this is a reply to a receiver-initiated poll,
    /// not a host-initiated command awaiting correlation. Always advertises
    /// an available, internal, coarse-time RTC; the driver has no way to
    /// present anything else.
    pub fn reply_hw_config(&self) -> std::io::Result<()> {
        let flags = HwConfigFlags::RTC_AVAILABLE
            | HwConfigFlags::RTC_INTERNAL
            | HwConfigFlags::COARSE_TIME_TA;
        self.send_unsolicited(&OutboundFrame::HwConfigReply(HwConfigReplyFrame { flags }))
    }

    /// Sends a frame that answers a receiver-initiated poll or request
    /// rather than a host-initiated command, bypassing the busy/scanner
    /// machinery entirely.
    pub(crate) fn send_unsolicited(&self, frame: &OutboundFrame) -> std::io::Result<()> {
        self.transport.send(&frame.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::codec::inbound::AckFrame;
    use crate::transport::test_support::RecordingTransport;
    use std::thread;
    use std::time::Duration as StdDuration;

    struct NoopCallbacks;
    impl NavCallbacks for NoopCallbacks {
        fn on_geodetic_nav(&self, _fix: &crate::codec::inbound::GeodeticNavFrame) {}
    }

    fn make_core() -> (OspCore, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let core = OspCore::new(
            transport.clone(),
            Arc::new(NoopCallbacks),
            Arc::new(FixedClock::from_unix_secs(1_700_000_000)),
        );
        (core, transport)
    }

    #[test]
    fn second_command_while_busy_returns_busy_error() {
        let (core, _transport) = make_core();
        let core2 = core.clone();
        let handle = thread::spawn(move || core2.almanac_set([0u8; ALMANAC_LEN]));

        // Give the spawned command a moment to mark the engine busy, then
        // attempt a second command from this thread.
        thread::sleep(StdDuration::from_millis(20));
        let busy_result = core.version();
        assert!(matches!(busy_result, Err(OspError::Busy)));

        core.offer_frame(InboundFrame::Ack(AckFrame { sid: MID_ALMANAC_UPLOAD }));
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn almanac_set_completes_on_ack() {
        let (core, transport) = make_core();
        let core2 = core.clone();
        let handle = thread::spawn(move || core2.almanac_set([0u8; ALMANAC_LEN]));
        thread::sleep(StdDuration::from_millis(20));
        core.offer_frame(InboundFrame::Ack(AckFrame { sid: MID_ALMANAC_UPLOAD }));
        handle.join().unwrap().unwrap();
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn command_times_out_without_a_reply() {
        let transport = Arc::new(RecordingTransport::default());
        let core = OspCore::new(
            transport,
            Arc::new(NoopCallbacks),
            Arc::new(FixedClock::from_unix_secs(1_700_000_000)),
        );
        let result = core.run_command(
            Scanner::Ack,
            OutboundFrame::SetMsgRate(SetMsgRateFrame {
                mode: 0,
                mid_to_set: 41,
                rate: 1,
            }),
            StdDuration::from_millis(50),
        );
        assert!(matches!(result, Err(OspError::Timeout)));
    }

    #[test]
    fn init_with_reset_sends_cold_start_and_system_reset_bits() {
        let (core, transport) = make_core();
        let core2 = core.clone();
        let handle = thread::spawn(move || core2.init(true));
        thread::sleep(StdDuration::from_millis(20));
        core.offer_frame(InboundFrame::Ack(AckFrame { sid: MID_INIT }));
        handle.join().unwrap().unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0][0], MID_INIT);
        assert_eq!(sent[0][1], 12); // channels
        let flags = sent[0][2];
        assert_eq!(flags & InitFlags::COLD_START.bits(), InitFlags::COLD_START.bits());
        assert_eq!(flags & InitFlags::SYSTEM_RESET.bits(), InitFlags::SYSTEM_RESET.bits());
    }

    #[test]
    fn factory_reset_reports_zero_channels_and_clears_xocw() {
        let (core, transport) = make_core();
        let core2 = core.clone();
        let handle = thread::spawn(move || core2.factory(false, false));
        thread::sleep(StdDuration::from_millis(20));
        core.offer_frame(InboundFrame::Ack(AckFrame { sid: MID_INIT }));
        handle.join().unwrap().unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0][1], 0); // channels
        let flags = sent[0][2];
        assert_eq!(flags & InitFlags::FACTORY.bits(), InitFlags::FACTORY.bits());
        assert_eq!(flags & InitFlags::CLR_XOCW.bits(), InitFlags::CLR_XOCW.bits());
        assert_eq!(flags & InitFlags::KEEP_ROM.bits(), 0);
    }

    #[test]
    fn almanac_poll_returns_every_row_in_the_order_received() {
        let (core, _transport) = make_core();
        let core2 = core.clone();
        let handle = thread::spawn(move || core2.almanac_poll());
        thread::sleep(StdDuration::from_millis(20));
        for svid in 1..=32u8 {
            core.offer_frame(InboundFrame::AlmanacRow(crate::codec::inbound::AlmanacRowFrame {
                svid,
                row: [0u8; ALMANAC_ROW_LEN],
            }));
        }
        core.offer_frame(InboundFrame::Ack(AckFrame { sid: MID_ALMANAC_POLL }));
        let rows = handle.join().unwrap().unwrap();
        assert_eq!(rows.len(), 32);
        assert_eq!(rows.first().unwrap().svid, 1);
        assert_eq!(rows.last().unwrap().svid, 32);
    }

    #[test]
    fn eph_poll_with_svid_zero_returns_every_streamed_row() {
        let (core, transport) = make_core();
        let core2 = core.clone();
        let handle = thread::spawn(move || core2.eph_poll(0));
        thread::sleep(StdDuration::from_millis(20));
        for svid in [3u8, 9, 14] {
            core.offer_frame(InboundFrame::EphemerisRow(crate::codec::inbound::EphemerisRowFrame {
                svid,
                data: [0u16; crate::constants::EPHEMERIS_WORDS],
            }));
        }
        core.offer_frame(InboundFrame::Ack(AckFrame { sid: MID_EPHEMERIS_POLL }));
        let rows = handle.join().unwrap().unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(transport.sent.lock().unwrap()[0][1], 0); // requested svid
    }

    #[test]
    fn pwr_ptf_surfaces_a_nonzero_device_error() {
        use crate::codec::inbound::PwrAckFrame;

        let (core, transport) = make_core();
        let core2 = core.clone();
        let handle = thread::spawn(move || core2.pwr_ptf(30, 20, 25));
        thread::sleep(StdDuration::from_millis(20));
        core.offer_frame(InboundFrame::PwrAck(PwrAckFrame { sid: 4, error_code: 5 }));
        let result = handle.join().unwrap();
        assert!(matches!(result, Err(OspError::Device(5))));

        let sent = transport.sent.lock().unwrap();
        assert_eq!(&sent[0][2..6], &30u32.to_be_bytes());
    }
}
