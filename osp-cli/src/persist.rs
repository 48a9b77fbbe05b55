//! Almanac/ephemeris file persistence. The core library never touches the
//! filesystem; this is where raw receiver images become files and back.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use osp_core::codec::inbound::EphemerisRowFrame;
use osp_core::constants::{ALMANAC_LEN, EPHEMERIS_WORDS, MAX_EPHEMERIS_RECORDS};

pub fn load_almanac(path: &Path) -> Result<[u8; ALMANAC_LEN]> {
    let bytes = fs::read(path).with_context(|| format!("reading almanac file {path:?}"))?;
    let mut rows = [0u8; ALMANAC_LEN];
    let take = bytes.len().min(ALMANAC_LEN);
    rows[..take].copy_from_slice(&bytes[..take]);
    Ok(rows)
}

pub fn save_almanac(path: &Path, rows: &[u8; ALMANAC_LEN]) -> Result<()> {
    fs::write(path, rows).with_context(|| format!("writing almanac file {path:?}"))
}

/// Ephemeris records are persisted as `{svid:u8, data:[u16;45] big-endian}`,
/// the same layout the receiver streams, up to twelve per file.
pub fn load_ephemeris(path: &Path) -> Result<Vec<EphemerisRowFrame>> {
    let bytes = fs::read(path).with_context(|| format!("reading ephemeris file {path:?}"))?;
    let record_len = 1 + EPHEMERIS_WORDS * 2;
    let mut records = Vec::new();
    for chunk in bytes.chunks(record_len).take(MAX_EPHEMERIS_RECORDS) {
        if chunk.len() != record_len {
            break;
        }
        let svid = chunk[0];
        let mut data = [0u16; EPHEMERIS_WORDS];
        for (i, word) in data.iter_mut().enumerate() {
            let off = 1 + i * 2;
            *word = u16::from_be_bytes([chunk[off], chunk[off + 1]]);
        }
        records.push(EphemerisRowFrame { svid, data });
    }
    Ok(records)
}

pub fn save_ephemeris(path: &Path, records: &[EphemerisRowFrame]) -> Result<()> {
    let mut out = Vec::with_capacity(records.len() * (1 + EPHEMERIS_WORDS * 2));
    for record in records.iter().take(MAX_EPHEMERIS_RECORDS) {
        out.push(record.svid);
        for word in &record.data {
            out.extend_from_slice(&word.to_be_bytes());
        }
    }
    fs::write(path, out).with_context(|| format!("writing ephemeris file {path:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn almanac_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("almanac.bin");
        let mut rows = [0u8; ALMANAC_LEN];
        rows[0] = 0xAB;
        rows[ALMANAC_LEN - 1] = 0xCD;
        save_almanac(&path, &rows).unwrap();
        assert_eq!(load_almanac(&path).unwrap(), rows);
    }

    #[test]
    fn load_almanac_zero_pads_a_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.bin");
        fs::write(&path, [0x11, 0x22, 0x33]).unwrap();
        let rows = load_almanac(&path).unwrap();
        assert_eq!(&rows[..3], &[0x11, 0x22, 0x33]);
        assert!(rows[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn ephemeris_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eph.bin");
        let records = vec![
            EphemerisRowFrame {
                svid: 3,
                data: [0x1234; EPHEMERIS_WORDS],
            },
            EphemerisRowFrame {
                svid: 7,
                data: [0x5678; EPHEMERIS_WORDS],
            },
        ];
        save_ephemeris(&path, &records).unwrap();
        let loaded = load_ephemeris(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].svid, 3);
        assert_eq!(loaded[1].data[0], 0x5678);
    }

    #[test]
    fn ephemeris_load_caps_at_max_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eph_many.bin");
        let records: Vec<_> = (0..20)
            .map(|svid| EphemerisRowFrame {
                svid,
                data: [0u16; EPHEMERIS_WORDS],
            })
            .collect();
        save_ephemeris(&path, &records).unwrap();
        assert_eq!(load_ephemeris(&path).unwrap().len(), MAX_EPHEMERIS_RECORDS);
    }
}
