//! # wfb-ng Stats Protocol
//!
//! Decodes the message stream emitted on the wfb-ng stats socket and
//! aggregates rx frames into a [`LinkStatsSnapshot`].
//!
//! Each message on the wire is a 4-byte big-endian unsigned length
//! prefix followed by exactly that many bytes of msgpack payload. The
//! antenna block uses composite tuple keys
//! `((frequency, mcs_index, bandwidth), antenna_id)`, which rules out a
//! plain struct mapping; it is kept as a raw [`rmpv::Value`] and walked
//! manually. Integral values arrive in whatever width the encoder chose,
//! so everything goes through [`coerce_i64`] before use.

use std::collections::{BTreeMap, HashMap};

use rmpv::Value;
use serde::Deserialize;
use tracing::warn;

use crate::error::Result;

use super::snapshot::LinkStatsSnapshot;

/// Length prefix size in bytes
pub const FRAME_HEADER_LEN: usize = 4;

/// Hard ceiling on a declared payload length; anything larger is a
/// protocol violation and drops the connection before allocating
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Discriminator of the frames that feed the snapshot
pub const RX_FRAME_TYPE: &str = "rx";

fn nil_value() -> Value {
    Value::Nil
}

/// One decoded stats message
#[derive(Debug, Deserialize)]
pub struct StatsFrame {
    /// Frame discriminator; only "rx" frames are aggregated
    #[serde(rename = "type")]
    pub frame_type: String,

    /// Named rate counters; keys: "all", "lost", "fec_rec", "bad",
    /// "all_bytes". The first element of each sequence is the per-second
    /// rate for the interval.
    #[serde(default)]
    pub packets: HashMap<String, Vec<Value>>,

    /// Antenna block with composite tuple keys, decoded manually
    #[serde(default = "nil_value")]
    pub rx_ant_stats: Value,

    /// Session parameters; carries at least fec_k / fec_n
    #[serde(default)]
    pub session: HashMap<String, Value>,
}

impl StatsFrame {
    fn rate(&self, key: &str) -> i64 {
        self.packets
            .get(key)
            .and_then(|values| values.first())
            .and_then(coerce_i64)
            .unwrap_or(0)
    }

    fn session_value(&self, key: &str) -> i64 {
        self.session.get(key).and_then(coerce_i64).unwrap_or(0)
    }
}

/// Decode one msgpack payload into a [`StatsFrame`].
///
/// # Errors
///
/// Returns error if the payload is not a valid stats message. Callers
/// skip the frame and keep the connection.
pub fn decode_frame(payload: &[u8]) -> Result<StatsFrame> {
    Ok(rmp_serde::from_slice(payload)?)
}

/// Normalize any msgpack numeric representation to `i64`.
///
/// Accepts every integer width plus floats that carry an integral value
/// (some encoders emit rates as floats). Anything else is `None`.
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(n) => n.as_i64(),
        Value::F32(f) if f.fract() == 0.0 => Some(*f as i64),
        Value::F64(f) if f.fract() == 0.0 => Some(*f as i64),
        _ => None,
    }
}

/// Aggregate one rx frame into a fresh snapshot.
///
/// The first antenna entry supplies the representative
/// `(frequency, mcs_index, bandwidth)` triple; every entry contributes
/// its average RSSI (value[2]) and SNR (value[5]), emitted in ascending
/// antenna-id order. Entries that do not match the expected shape are
/// skipped.
pub fn build_snapshot(frame: &StatsFrame) -> LinkStatsSnapshot {
    let mut snapshot = LinkStatsSnapshot {
        video_packets_per_sec: frame.rate("all"),
        lost_packets_per_sec: frame.rate("lost"),
        fec_packets_per_sec: frame.rate("fec_rec"),
        bad_blocks_per_sec: frame.rate("bad"),
        link_flow_bytes_per_sec: frame.rate("all_bytes"),
        fec_k: frame.session_value("fec_k"),
        fec_n: frame.session_value("fec_n"),
        ..Default::default()
    };

    let Value::Map(entries) = &frame.rx_ant_stats else {
        return snapshot;
    };

    // BTreeMap gives the ascending antenna-id order for free
    let mut antennas: BTreeMap<i64, (i8, i8)> = BTreeMap::new();
    let mut radio_info_seen = false;

    for (key, value) in entries {
        let Value::Array(key_parts) = key else {
            warn!("skipping antenna entry with non-tuple key");
            continue;
        };

        // Key: [[freq, mcs, bw], antenna_id]; every entry in one block
        // shares the same triple, so the first valid one is taken
        if !radio_info_seen {
            if let Some(Value::Array(radio_info)) = key_parts.first() {
                if radio_info.len() >= 3 {
                    snapshot.frequency = coerce_i64(&radio_info[0]).unwrap_or(0) as u32;
                    snapshot.mcs_index = coerce_i64(&radio_info[1]).unwrap_or(0);
                    snapshot.bandwidth = coerce_i64(&radio_info[2]).unwrap_or(0);
                    radio_info_seen = true;
                }
            }
        }

        let Some(antenna_id) = key_parts.get(1).and_then(coerce_i64) else {
            continue;
        };

        // Value: [pkt_s, rssi_min, rssi_avg, rssi_max, snr_min, snr_avg, snr_max]
        let Value::Array(values) = value else {
            continue;
        };
        if values.len() < 6 {
            continue;
        }
        let rssi = coerce_i64(&values[2]).unwrap_or(0) as i8;
        let snr = coerce_i64(&values[5]).unwrap_or(0) as i8;
        antennas.insert(antenna_id, (rssi, snr));
    }

    for (rssi, snr) in antennas.values() {
        snapshot.rssi.push(*rssi);
        snapshot.snr.push(*snr);
    }

    snapshot
}
