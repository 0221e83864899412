//! # Radio Settings Model
//!
//! Partial update request/response for radio-link parameters.
//!
//! Every field is optional: a field absent from an inbound update must
//! leave the persisted value untouched, and a field absent from a
//! response was simply not available from the source that produced it.
//! `Option` + `skip_serializing_if` keeps the JSON wire schema
//! present-or-absent rather than zero-vs-present.

use serde::{Deserialize, Serialize};

/// Response header carrying the provenance marker for the HTTP layer
pub const DATA_SOURCE_HEADER: &str = "X-GS-Data-Source";

/// Radio-link parameters, all optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_power: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcs_index: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fec_k: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fec_n: Option<i64>,
}

/// Where a response's data came from
///
/// `Remote` is authoritative; `Local` marks degraded data served from the
/// fallback file while the air unit is unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Remote,
    Local,
}

impl DataSource {
    /// Value for the [`DATA_SOURCE_HEADER`] response header
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Remote => "remote",
            DataSource::Local => "local",
        }
    }
}

/// One field mirrored into the local fallback file
pub(crate) struct KeyBinding {
    pub key: &'static str,
    pub get: fn(&RadioSettings) -> Option<i64>,
    pub set: fn(&mut RadioSettings, i64),
}

/// Fields the local fallback file encodes, in patch order.
///
/// Only the wifi channel lives in wfb.conf today; extend this table when
/// more keys move into the file. Unknown keys in the file pass through
/// untouched either way.
pub(crate) const LOCAL_KEY_BINDINGS: &[KeyBinding] = &[KeyBinding {
    key: "wifi_channel",
    get: |settings| settings.channel,
    set: |settings, value| settings.channel = Some(value),
}];
