//! Test fixtures for stats frames.

use rmpv::Value;

use super::protocol::FRAME_HEADER_LEN;

/// Build an rx stats frame: `all` rate plus `(antenna_id, rssi_avg,
/// snr_avg)` entries, with a fixed radio info of (5805 MHz, MCS 1,
/// 20 MHz) and FEC 8/12.
pub fn rx_frame(all: i64, antennas: &[(i64, i64, i64)]) -> Value {
    frame_with_type("rx", all, antennas)
}

/// Same shape as [`rx_frame`] but with an arbitrary discriminator
pub fn frame_with_type(frame_type: &str, all: i64, antennas: &[(i64, i64, i64)]) -> Value {
    let ant_entries: Vec<(Value, Value)> = antennas
        .iter()
        .map(|&(id, rssi, snr)| {
            (
                Value::Array(vec![
                    Value::Array(vec![5805.into(), 1.into(), 20.into()]),
                    id.into(),
                ]),
                Value::Array(vec![
                    100.into(),
                    (rssi - 5).into(),
                    rssi.into(),
                    (rssi + 5).into(),
                    (snr - 3).into(),
                    snr.into(),
                    (snr + 3).into(),
                ]),
            )
        })
        .collect();

    Value::Map(vec![
        (Value::from("type"), Value::from(frame_type)),
        (
            Value::from("packets"),
            Value::Map(vec![
                (Value::from("all"), Value::Array(vec![all.into()])),
                (
                    Value::from("all_bytes"),
                    Value::Array(vec![(all * 1200).into()]),
                ),
            ]),
        ),
        (Value::from("rx_ant_stats"), Value::Map(ant_entries)),
        (
            Value::from("session"),
            Value::Map(vec![
                (Value::from("fec_k"), 8.into()),
                (Value::from("fec_n"), 12.into()),
            ]),
        ),
    ])
}

/// Encode a frame value to its msgpack payload
pub fn encode_payload(value: &Value) -> Vec<u8> {
    let mut payload = Vec::new();
    rmpv::encode::write_value(&mut payload, value).unwrap();
    payload
}

/// Encode a frame value to wire bytes: length prefix plus payload
pub fn frame_bytes(value: &Value) -> Vec<u8> {
    let payload = encode_payload(value);
    let mut bytes = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&payload);
    bytes
}

/// Wire bytes for a raw payload, length prefix included
pub fn raw_frame_bytes(payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(payload);
    bytes
}
