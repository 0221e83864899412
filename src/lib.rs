//! # GS Link Library
//!
//! Radio settings reconciliation and live link telemetry for an OpenIPC
//! FPV ground station.
//!
//! This library keeps the air unit's radio configuration and a local
//! fallback copy consistent while either side may be unreachable, and
//! maintains a continuously updated aggregate of wfb-ng link statistics
//! received over TCP.

pub mod config;
pub mod error;
pub mod radio;
pub mod stats;
