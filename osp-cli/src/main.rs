//! Command-line driver binary. Opens a serial port, brings up the OSP
//! engine over it, and reproduces the reference tool's startup sequence:
//! optional NMEA-to-OSP coaxing, optional factory reset, init with an
//! optional seed position, optional almanac/ephemeris upload, then idles
//! until interrupted, optionally dumping almanac/ephemeris to disk on the
//! way out.

mod callbacks;
mod cli;
mod framer;
mod persist;
mod transport;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use osp_core::{dispatch, SystemClock};
use serialport::SerialPort;

use callbacks::LoggingCallbacks;
use cli::Args;
use transport::SerialTransport;

/// The legacy command the original tool sends to bump a receiver still
/// talking NMEA at 4800 baud onto OSP at 115200 before reopening the port.
const FORCE_OSP_SENTENCE: &[u8] = b"$PSRF100,0,115200,8,1,0*04\r\n";

fn force_osp(device: &str) -> Result<()> {
    log::info!("switching {device} from NMEA to OSP at 115200 8N1");
    let mut port = serialport::new(device, 4800)
        .timeout(Duration::from_millis(200))
        .open()
        .with_context(|| format!("opening {device} at 4800 baud to force OSP mode"))?;
    port.write_all(FORCE_OSP_SENTENCE)
        .context("sending NMEA mode-switch sentence")?;
    thread::sleep(Duration::from_millis(100));
    Ok(())
}

fn open_port(device: &str) -> Result<Box<dyn SerialPort>> {
    serialport::new(device, 115_200)
        .timeout(Duration::from_millis(100))
        .open()
        .with_context(|| format!("opening {device} at 115200 8N1"))
}

fn main() -> Result<()> {
    env_logger::init();
    let args: Args = cli::parse()?;

    if args.force {
        force_osp(&args.device)?;
    }

    let port = open_port(&args.device)?;
    let reader_port = port.try_clone().context("cloning serial port handle for the reader thread")?;
    let transport = Arc::new(SerialTransport::new(port));
    let callbacks = Arc::new(LoggingCallbacks);
    let clock = Arc::new(SystemClock);
    let core = Arc::new(osp_core::OspCore::new(transport, callbacks, clock));

    let terminate = Arc::new(AtomicBool::new(false));
    {
        let terminate = terminate.clone();
        ctrlc::set_handler(move || terminate.store(true, Ordering::SeqCst))
            .context("installing SIGINT handler")?;
    }

    spawn_reader(core.clone(), reader_port);
    core.wait_for_ready().context("waiting for receiver to come up")?;

    if args.factory {
        match core.factory(false, false) {
            Ok(()) => log::info!("factory reset: success"),
            Err(e) => log::error!("factory reset failed: {e}"),
        }
        thread::sleep(Duration::from_secs(1));
        force_osp(&args.device)?;
    }

    if let Some(seed) = args.seed {
        core.seed_cache(seed, args.drift as i32);
    }
    match core.init(true) {
        Ok(()) => log::info!("init: success"),
        Err(e) => log::error!("init failed: {e}"),
    }

    thread::sleep(Duration::from_millis(500));

    if args.upload {
        upload_saved_state(&core, &args)?;
    }

    while !terminate.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));
    }

    if args.download {
        download_current_state(&core, &args)?;
    }

    Ok(())
}

fn upload_saved_state(core: &osp_core::OspCore, args: &Args) -> Result<()> {
    let almanac_path = Path::new(&args.almanac_path);
    if almanac_path.exists() {
        let rows = persist::load_almanac(almanac_path)?;
        match core.almanac_set(rows) {
            Ok(()) => log::info!("uploaded almanac from {}", args.almanac_path),
            Err(e) => log::error!("almanac upload failed: {e}"),
        }
    }
    let ephemeris_path = Path::new(&args.ephemeris_path);
    if ephemeris_path.exists() {
        for row in persist::load_ephemeris(ephemeris_path)? {
            if let Err(e) = core.eph_set(row.data) {
                log::error!("ephemeris upload failed for svid {}: {e}", row.svid);
            }
        }
        log::info!("uploaded ephemeris from {}", args.ephemeris_path);
    }
    Ok(())
}

fn download_current_state(core: &osp_core::OspCore, args: &Args) -> Result<()> {
    match core.almanac_poll() {
        Ok(rows) => {
            let mut image = [0u8; osp_core::constants::ALMANAC_LEN];
            for row in rows {
                let Some(index) = (row.svid as usize).checked_sub(1) else {
                    continue;
                };
                let offset = index * osp_core::constants::ALMANAC_ROW_LEN;
                if index < osp_core::constants::ALMANAC_ROWS {
                    image[offset..offset + row.row.len()].copy_from_slice(&row.row);
                }
            }
            persist::save_almanac(Path::new(&args.almanac_path), &image)?;
            log::info!("saved almanac to {}", args.almanac_path);
        }
        Err(e) => log::error!("almanac download failed: {e}"),
    }
    match core.eph_poll(0) {
        Ok(records) => {
            persist::save_ephemeris(Path::new(&args.ephemeris_path), &records)?;
            log::info!("saved ephemeris to {}", args.ephemeris_path);
        }
        Err(e) => log::error!("ephemeris download failed: {e}"),
    }
    Ok(())
}

fn spawn_reader(core: Arc<osp_core::OspCore>, mut port: Box<dyn SerialPort>) {
    thread::spawn(move || {
        let mut framer = framer::Framer::new();
        let mut buf = [0u8; 1024];
        loop {
            match port.read(&mut buf) {
                Ok(0) => continue,
                Ok(n) => {
                    framer.feed(&buf[..n]);
                    while let Some(payload) = framer.next_frame() {
                        if payload.is_empty() {
                            continue;
                        }
                        match osp_core::decode_inbound(payload[0], &payload[1..]) {
                            Ok(frame) => dispatch(&core, frame),
                            Err(e) => log::warn!("failed to decode inbound frame: {e}"),
                        }
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                Err(e) => {
                    log::error!("serial read error: {e}");
                    return;
                }
            }
        }
    });
}
