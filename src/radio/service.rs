//! # Service Control
//!
//! Restart hook for the downstream wifibroadcast service after a
//! persisted radio change. Restarts are fire-and-forget from the
//! reconciler's point of view; results are logged, never awaited by a
//! request.

use std::future::Future;

use tokio::process::Command;
use tracing::debug;

use crate::error::{GsLinkError, Result};

/// Seam over the platform's service manager
pub trait ServiceController: Send + Sync + 'static {
    /// Restart the named service
    fn restart(&self, service: &str) -> impl Future<Output = Result<()>> + Send;
}

/// SysV-style controller running `<script> restart`
///
/// The stock OpenIPC image manages wifibroadcast with an init script
/// (`/etc/init.d/S98wifibroadcast`), so `service` is the script path.
pub struct InitServiceController;

impl ServiceController for InitServiceController {
    async fn restart(&self, service: &str) -> Result<()> {
        debug!("running {} restart", service);
        let output = Command::new(service).arg("restart").output().await?;

        if !output.status.success() {
            return Err(GsLinkError::ServiceControl(format!(
                "{} restart exited with {}: {}",
                service,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}
