//! # Key-Value Config Patching
//!
//! Single-key numeric reads and writes against `key = value` text files
//! (wfb.conf style).
//!
//! Writes preserve every byte outside the patched value: comments,
//! ordering, unrelated keys, indentation, spacing around `=`, trailing
//! comments on the target line, and line endings all survive. Replacement
//! is atomic (temp file in place, then rename).
//!
//! Concurrent writers to the same file are not serialized here; the
//! read-compare-write sequence can race. Callers needing exclusion must
//! provide it externally.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;

/// Read the numeric value of `key` from the file at `path`.
///
/// Returns `Ok(None)` when the file exists but contains no matching key.
/// The first matching line wins.
///
/// # Errors
///
/// Returns error if the file cannot be read.
pub fn read_numeric_key<P: AsRef<Path>>(path: P, key: &str) -> Result<Option<i64>> {
    let contents = fs::read_to_string(path)?;

    for line in contents.lines() {
        if let Some((start, end)) = find_value_span(line, key) {
            if let Ok(value) = line[start..end].parse::<i64>() {
                return Ok(Some(value));
            }
        }
    }

    Ok(None)
}

/// Patch `key` to `value` in the file at `path`, if it differs.
///
/// Returns `Ok(true)` only when the file was actually rewritten. A value
/// equal to the current one is a no-op and leaves the file untouched. A
/// missing key logs a warning and is also a no-op; appending keys is the
/// provisioning system's job, not ours.
///
/// # Errors
///
/// Returns error if the file cannot be read or the atomic replace fails.
pub fn write_numeric_key_if_changed<P: AsRef<Path>>(
    path: P,
    key: &str,
    value: i64,
) -> Result<bool> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let mut patched = String::with_capacity(contents.len());
    let mut found = false;
    let mut changed = false;

    for line in contents.split_inclusive('\n') {
        if !found {
            let (body, eol) = split_eol(line);
            if let Some((start, end)) = find_value_span(body, key) {
                found = true;
                let current = body[start..end].parse::<i64>().ok();
                if current != Some(value) {
                    changed = true;
                    patched.push_str(&body[..start]);
                    patched.push_str(&value.to_string());
                    patched.push_str(&body[end..]);
                    patched.push_str(eol);
                    continue;
                }
            }
        }
        patched.push_str(line);
    }

    if !found {
        warn!("key {} not found in {}, leaving file unmodified", key, path.display());
        return Ok(false);
    }

    if !changed {
        debug!("{} already set to {} in {}", key, value, path.display());
        return Ok(false);
    }

    replace_atomically(path, &patched)?;
    Ok(true)
}

/// Locate the numeric value of a `key = value` line.
///
/// Returns the byte span of the value within `line`, or `None` if the
/// line does not assign a number to exactly this key. Leading whitespace
/// before the key is tolerated; commented-out lines never match.
fn find_value_span(line: &str, key: &str) -> Option<(usize, usize)> {
    let indent = line.len() - line.trim_start().len();
    let body = &line[indent..];
    if !body.starts_with(key) {
        return None;
    }

    let bytes = line.as_bytes();
    let mut pos = indent + key.len();

    // The key must end here; "wifi_channel" must not match "wifi_channel_b"
    match bytes.get(pos) {
        Some(b' ') | Some(b'\t') | Some(b'=') => {}
        _ => return None,
    }

    while matches!(bytes.get(pos), Some(b' ') | Some(b'\t')) {
        pos += 1;
    }
    if bytes.get(pos) != Some(&b'=') {
        return None;
    }
    pos += 1;
    while matches!(bytes.get(pos), Some(b' ') | Some(b'\t')) {
        pos += 1;
    }

    let start = pos;
    if matches!(bytes.get(pos), Some(b'-')) {
        pos += 1;
    }
    let digits_start = pos;
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    if pos == digits_start {
        return None;
    }

    Some((start, pos))
}

/// Split a `split_inclusive('\n')` segment into body and line ending
fn split_eol(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Write `contents` to a sibling temp file and rename it over `path`
fn replace_atomically(path: &Path, contents: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
