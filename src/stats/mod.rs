//! # Link Stats Module
//!
//! Live ingestion of wfb-ng link statistics.
//!
//! This module handles:
//! - TCP client connection to the wfb-ng stats socket (with retry)
//! - Length-prefixed msgpack frame decoding
//! - Aggregation of rx frames into a published snapshot

pub mod ingestor;
pub mod protocol;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testutil;
