//! # Radio Settings Reconciler
//!
//! Applies a radio settings change to both the remote air unit and the
//! local fallback file, tolerating either being unavailable, and reports
//! one coherent outcome to the caller.
//!
//! The two writes are independent best-effort operations; there is no
//! transaction between them. On the read path the remote peer wins
//! whenever it is reachable, and responses carry a provenance marker so
//! clients can tell authoritative data from degraded local data.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{error, info, warn};

use crate::config::RadioConfig;
use crate::error::Result;

use super::forward::{ForwardOutcome, Forwarder};
use super::keyfile;
use super::service::ServiceController;
use super::settings::{DataSource, RadioSettings, LOCAL_KEY_BINDINGS};

/// Result of a settings read, always produced
#[derive(Debug, Clone)]
pub struct RadioReadResult {
    pub settings: RadioSettings,
    pub source: DataSource,
}

/// Caller-visible result of a settings write
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The remote peer handled the write; relay its response verbatim
    Remote(ForwardOutcome),
    /// The remote peer was unreachable but the settings were persisted
    /// locally; the echoed settings stand in for the response body
    Local(RadioSettings),
}

impl UpdateOutcome {
    pub fn source(&self) -> DataSource {
        match self {
            UpdateOutcome::Remote(_) => DataSource::Remote,
            UpdateOutcome::Local(_) => DataSource::Local,
        }
    }
}

/// Reconciles radio settings between the air unit and the local fallback
pub struct RadioReconciler<F, S> {
    forwarder: F,
    controller: Arc<S>,
    local_config_path: PathBuf,
    restart_script: String,
    restart_delay: Duration,
}

impl<F: Forwarder, S: ServiceController> RadioReconciler<F, S> {
    pub fn new(forwarder: F, controller: S, config: &RadioConfig) -> Self {
        Self {
            forwarder,
            controller: Arc::new(controller),
            local_config_path: PathBuf::from(&config.local_config_path),
            restart_script: config.restart_script.clone(),
            restart_delay: Duration::from_millis(config.restart_delay_ms),
        }
    }

    /// Read the current radio settings.
    ///
    /// Prefers the remote peer; degrades to whatever the local fallback
    /// file encodes when the peer is unreachable, slow, or erroring
    /// (5xx). Never fails: with both sides down the result is an empty
    /// settings object marked [`DataSource::Local`], which is enough for
    /// a client to render its degraded mode.
    pub async fn get(&self) -> RadioReadResult {
        match self.forwarder.forward_get().await {
            Ok(outcome) if !outcome.is_server_error() => {
                match serde_json::from_slice::<RadioSettings>(&outcome.body) {
                    Ok(settings) => {
                        return RadioReadResult {
                            settings,
                            source: DataSource::Remote,
                        }
                    }
                    Err(e) => {
                        warn!("unparseable radio settings from remote peer: {}", e);
                    }
                }
            }
            Ok(outcome) => {
                warn!(
                    "remote peer returned {}, falling back to local config",
                    outcome.status
                );
            }
            Err(e) => {
                warn!("radio settings forward failed: {}, falling back to local config", e);
            }
        }

        RadioReadResult {
            settings: self.local_settings(),
            source: DataSource::Local,
        }
    }

    /// Apply a partial settings update.
    ///
    /// Forwards the write to the remote peer and independently patches
    /// the local fallback file. A restart of the downstream service is
    /// scheduled only when the local value actually changed and the
    /// remote accepted the write.
    ///
    /// # Errors
    ///
    /// Fails only when the remote forward failed at the transport level
    /// AND the local patch failed too; every other combination produces
    /// a usable outcome.
    pub async fn update(&self, settings: &RadioSettings) -> Result<UpdateOutcome> {
        let body = Bytes::from(serde_json::to_vec(settings)?);
        let forwarded = self.forwarder.forward_update(body).await;
        let remote_ok = matches!(&forwarded, Ok(outcome) if outcome.is_success());

        let (changed, local_ok) = self.patch_local(settings);

        if changed && remote_ok {
            self.schedule_restart();
        }

        match forwarded {
            Ok(outcome) if !outcome.is_server_error() => Ok(UpdateOutcome::Remote(outcome)),
            Ok(outcome) => {
                if local_ok {
                    Ok(UpdateOutcome::Local(settings.clone()))
                } else {
                    // Both sides failed; relay the 5xx the peer produced
                    Ok(UpdateOutcome::Remote(outcome))
                }
            }
            Err(e) => {
                if local_ok {
                    Ok(UpdateOutcome::Local(settings.clone()))
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Populate settings from the local fallback file.
    ///
    /// Unreadable files degrade to absent fields; degraded service beats
    /// failure on the read path.
    fn local_settings(&self) -> RadioSettings {
        let mut settings = RadioSettings::default();
        for binding in LOCAL_KEY_BINDINGS {
            match keyfile::read_numeric_key(&self.local_config_path, binding.key) {
                Ok(Some(value)) => (binding.set)(&mut settings, value),
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        "failed to read {} from {}: {}",
                        binding.key,
                        self.local_config_path.display(),
                        e
                    );
                }
            }
        }
        settings
    }

    /// Patch every present field into the local file.
    ///
    /// Returns `(any_value_changed, all_patches_succeeded)`.
    fn patch_local(&self, settings: &RadioSettings) -> (bool, bool) {
        let mut changed = false;
        let mut ok = true;

        for binding in LOCAL_KEY_BINDINGS {
            let Some(value) = (binding.get)(settings) else {
                continue;
            };
            match keyfile::write_numeric_key_if_changed(&self.local_config_path, binding.key, value)
            {
                Ok(c) => changed |= c,
                Err(e) => {
                    error!(
                        "failed to patch {} in {}: {}",
                        binding.key,
                        self.local_config_path.display(),
                        e
                    );
                    ok = false;
                }
            }
        }

        (changed, ok)
    }

    /// Restart the downstream service on a detached task.
    ///
    /// The delay before the restart lets the HTTP response flush to the
    /// client before the link bounces; it is an ordering guarantee, not a
    /// robustness mechanism. The settings are already durably saved, so a
    /// failed restart is only logged.
    fn schedule_restart(&self) {
        let controller = Arc::clone(&self.controller);
        let script = self.restart_script.clone();
        let delay = self.restart_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match controller.restart(&script).await {
                Ok(()) => info!("{} restarted", script),
                Err(e) => error!("failed to restart {}: {}", script, e),
            }
        });
    }
}
