//! Snapshot files.
//!
//! One file per flush, named `MonitorInfo_<YYYYMMDDHHMMSS>.log`, holding one
//! `<key>: <value>` line per metric with six fractional digits.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use shmprom_core::error::{Result, ShmPromError};

pub const FILE_PREFIX: &str = "MonitorInfo_";
pub const FILE_SUFFIX: &str = ".log";
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

pub fn file_name<Tz>(ts: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{FILE_PREFIX}{}{FILE_SUFFIX}", ts.format(TIMESTAMP_FORMAT))
}

pub fn format_line(key: &str, value: f64) -> String {
    format!("{key}: {value:.6}")
}

/// Inverse of [`format_line`].
pub fn parse_line(line: &str) -> Option<(String, f64)> {
    let (key, value) = line.split_once(": ")?;
    if key.is_empty() {
        return None;
    }
    let value = value.trim_end().parse::<f64>().ok()?;
    Some((key.to_string(), value))
}

/// Write `entries` into a new snapshot file under `dir`.
///
/// An existing file with the same name (two flushes within one second) is
/// truncated.
pub fn write_snapshot<'a, I, Tz>(dir: &Path, entries: I, ts: &DateTime<Tz>) -> Result<PathBuf>
where
    I: IntoIterator<Item = (&'a str, f64)>,
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let path = dir.join(file_name(ts));
    let persist_err = |source| ShmPromError::Persist {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(persist_err)?;
    let mut w = BufWriter::new(file);
    for (key, value) in entries {
        writeln!(w, "{}", format_line(key, value)).map_err(persist_err)?;
    }
    w.flush().map_err(persist_err)?;

    Ok(path)
}

/// Read a snapshot file back into a key/value map.
pub fn read_snapshot(path: &Path) -> Result<HashMap<String, f64>> {
    let text = fs::read_to_string(path).map_err(|source| ShmPromError::Persist {
        path: path.to_path_buf(),
        source,
    })?;

    let mut out = HashMap::new();
    for (n, line) in text.lines().enumerate() {
        let (key, value) = parse_line(line).ok_or_else(|| {
            ShmPromError::Internal(format!(
                "{}:{}: malformed snapshot line",
                path.display(),
                n + 1
            ))
        })?;
        out.insert(key, value);
    }
    Ok(out)
}
