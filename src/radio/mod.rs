//! # Radio Settings Module
//!
//! Reconciliation of radio-link settings between the air unit and the
//! local fallback config.
//!
//! This module handles:
//! - Partial radio settings updates (present-or-absent field semantics)
//! - Forwarding reads/writes to the air unit with bounded timeouts
//! - Format-preserving patches of the local wfb.conf fallback
//! - Deferred wifibroadcast service restarts after a persisted change

pub mod forward;
pub mod keyfile;
pub mod reconciler;
pub mod service;
pub mod settings;
