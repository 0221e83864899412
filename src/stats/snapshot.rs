//! # Link Stats Snapshot
//!
//! The published aggregate of wireless-link statistics. Replaced
//! wholesale each time a valid rx frame is decoded; consumers always see
//! a complete snapshot, never a partially updated one.

use serde::Serialize;

/// Aggregated link statistics for one stats interval
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkStatsSnapshot {
    /// Average RSSI per antenna, ordered ascending by antenna id
    pub rssi: Vec<i8>,
    /// Average SNR per antenna, same order as `rssi`
    pub snr: Vec<i8>,

    // Link rates
    pub video_packets_per_sec: i64,
    pub fec_packets_per_sec: i64,
    pub lost_packets_per_sec: i64,
    pub bad_blocks_per_sec: i64,
    pub link_flow_bytes_per_sec: i64,

    // Transmission parameters from the representative radio info
    pub frequency: u32,
    pub mcs_index: i64,
    pub bandwidth: i64,
    pub fec_k: i64,
    pub fec_n: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_is_valid_json() {
        let snapshot = LinkStatsSnapshot::default();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["rssi"], serde_json::json!([]));
        assert_eq!(json["snr"], serde_json::json!([]));
        assert_eq!(json["video_packets_per_sec"], 0);
        assert_eq!(json["frequency"], 0);
    }

    #[test]
    fn test_json_field_names() {
        // The UI contract: snake_case rate and radio-info names
        let snapshot = LinkStatsSnapshot {
            rssi: vec![-60],
            snr: vec![20],
            video_packets_per_sec: 100,
            link_flow_bytes_per_sec: 120_000,
            frequency: 5805,
            mcs_index: 1,
            bandwidth: 20,
            fec_k: 8,
            fec_n: 12,
            ..Default::default()
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["rssi"][0], -60);
        assert_eq!(json["link_flow_bytes_per_sec"], 120_000);
        assert_eq!(json["mcs_index"], 1);
        assert_eq!(json["fec_n"], 12);
    }
}
