//! Argument parsing, mirroring the shape of the original `example.c`
//! command line: device path, almanac/ephemeris file paths, factory reset
//! and force-NMEA-switch flags, optional seed position/drift, and
//! upload/download toggles.

use clap::{value_parser, Arg};
use osp_core::PositionSeed;

pub struct Args {
    pub device: String,
    pub almanac_path: String,
    pub ephemeris_path: String,
    pub factory: bool,
    pub force: bool,
    pub upload: bool,
    pub download: bool,
    pub seed: Option<PositionSeed>,
    pub drift: u32,
}

pub fn build() -> clap::Command {
    clap::Command::new("osp-cli")
        .about("Drives an OSP GPS receiver over a serial port")
        .arg(
            Arg::new("device")
                .short('s')
                .long("device")
                .default_value("/dev/ttyUSB0")
                .help("Serial device to open"),
        )
        .arg(
            Arg::new("almanac")
                .short('a')
                .long("almanac")
                .default_value("almanac.bin")
                .help("Almanac data file"),
        )
        .arg(
            Arg::new("ephemeris")
                .short('e')
                .long("ephemeris")
                .default_value("eph.bin")
                .help("Ephemeris data file"),
        )
        .arg(
            Arg::new("factory")
                .short('r')
                .long("factory")
                .action(clap::ArgAction::SetTrue)
                .help("Perform factory reset"),
        )
        .arg(
            Arg::new("force")
                .short('f')
                .long("force")
                .action(clap::ArgAction::SetTrue)
                .help("Switch the receiver from NMEA to OSP before opening the port"),
        )
        .arg(
            Arg::new("upload")
                .short('u')
                .long("upload")
                .action(clap::ArgAction::SetTrue)
                .help("Upload almanac/ephemeris from disk on start"),
        )
        .arg(
            Arg::new("download")
                .short('l')
                .long("download")
                .action(clap::ArgAction::SetTrue)
                .help("Download almanac/ephemeris to disk on exit"),
        )
        .arg(
            Arg::new("position")
                .short('p')
                .long("position")
                .value_name("LAT,LON,ALT")
                .help("Seed position as lat_e7,lon_e7,alt_cm"),
        )
        .arg(
            Arg::new("drift")
                .short('d')
                .long("drift")
                .value_parser(value_parser!(u32))
                .default_value("0")
                .help("GPS clock drift seed"),
        )
}

pub fn parse() -> anyhow::Result<Args> {
    let matches = build().get_matches();

    let seed = matches
        .get_one::<String>("position")
        .map(|raw| -> anyhow::Result<PositionSeed> {
            let parts: Vec<&str> = raw.split(',').collect();
            anyhow::ensure!(parts.len() == 3, "--position expects LAT,LON,ALT");
            Ok(PositionSeed {
                lat_e7: parts[0].parse()?,
                lon_e7: parts[1].parse()?,
                alt_cm: parts[2].parse()?,
            })
        })
        .transpose()?;

    Ok(Args {
        device: matches.get_one::<String>("device").unwrap().clone(),
        almanac_path: matches.get_one::<String>("almanac").unwrap().clone(),
        ephemeris_path: matches.get_one::<String>("ephemeris").unwrap().clone(),
        factory: matches.get_flag("factory"),
        force: matches.get_flag("force"),
        upload: matches.get_flag("upload"),
        download: matches.get_flag("download"),
        seed,
        drift: *matches.get_one::<u32>("drift").unwrap(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_hold_when_nothing_is_passed() {
        let matches = build().get_matches_from(["osp-cli"]);
        assert_eq!(matches.get_one::<String>("device").unwrap(), "/dev/ttyUSB0");
        assert!(!matches.get_flag("factory"));
        assert!(!matches.get_flag("force"));
    }

    #[test]
    fn position_flag_parses_into_lat_lon_alt() {
        let matches = build().get_matches_from(["osp-cli", "--position", "123,-456,789"]);
        let raw = matches.get_one::<String>("position").unwrap();
        let parts: Vec<&str> = raw.split(',').collect();
        assert_eq!(parts, ["123", "-456", "789"]);
    }

    #[test]
    fn drift_parses_as_u32() {
        let matches = build().get_matches_from(["osp-cli", "--drift", "42"]);
        assert_eq!(*matches.get_one::<u32>("drift").unwrap(), 42);
    }
}
