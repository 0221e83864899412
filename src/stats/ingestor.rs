//! # Link Stats Ingestor
//!
//! Owns the TCP connection to the wfb-ng stats socket and keeps the
//! published [`LinkStatsSnapshot`] current.
//!
//! The connection loop runs on one dedicated background task for the
//! life of the ingestor and owns its own retry: connect failures back
//! off and try again, dropped connections reconnect after a shorter
//! delay, and the loop only ends when [`StatsIngestor::stop`] is called.
//! Snapshot readers never touch the network; they get a copy of the
//! latest published aggregate.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::StatsConfig;

use super::protocol::{self, FRAME_HEADER_LEN, MAX_FRAME_LEN, RX_FRAME_TYPE};
use super::snapshot::LinkStatsSnapshot;

/// Maintains a live aggregate of wireless-link statistics
pub struct StatsIngestor {
    shared: Arc<Shared>,
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    address: String,
    connect_timeout: Duration,
    connect_retry: Duration,
    reconnect_delay: Duration,
    /// Held only for the pointer swap; frames are decoded outside it
    snapshot: Mutex<Arc<LinkStatsSnapshot>>,
}

impl StatsIngestor {
    pub fn new(config: &StatsConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                address: config.address.clone(),
                connect_timeout: Duration::from_millis(config.connect_timeout_ms),
                connect_retry: Duration::from_millis(config.connect_retry_ms),
                reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
                snapshot: Mutex::new(Arc::new(LinkStatsSnapshot::default())),
            }),
            shutdown_tx,
            task: Mutex::new(None),
        }
    }

    /// Spawn the background connection loop. Idempotent while the loop
    /// is alive; must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let shutdown_rx = self.shutdown_tx.subscribe();
        *task = Some(tokio::spawn(run_loop(shared, shutdown_rx)));
    }

    /// Stop the ingestor.
    ///
    /// Closes the active connection (unblocking any pending read) and
    /// prevents further reconnect attempts. Idempotent; stopping is
    /// terminal for this instance.
    pub fn stop(&self) {
        // send_replace records the value even with no live receiver, so
        // stop-before-start still sticks
        self.shutdown_tx.send_replace(true);
    }

    /// Defensive copy of the most recently published snapshot.
    ///
    /// Always succeeds: before the first rx frame this is the
    /// empty-but-valid default. Never blocks on network I/O.
    pub fn snapshot(&self) -> LinkStatsSnapshot {
        let guard = self
            .shared
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        (**guard).clone()
    }
}

impl Drop for StatsIngestor {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_loop(shared: Arc<Shared>, mut shutdown: watch::Receiver<bool>) {
    info!("stats ingestor connecting to {}", shared.address);

    while !*shutdown.borrow() {
        let delay = match timeout(shared.connect_timeout, TcpStream::connect(&shared.address)).await
        {
            Ok(Ok(stream)) => {
                debug!("connected to stats socket at {}", shared.address);
                stream_frames(&shared, stream, &mut shutdown).await;
                shared.reconnect_delay
            }
            Ok(Err(e)) => {
                debug!("stats connect to {} failed: {}", shared.address, e);
                shared.connect_retry
            }
            Err(_) => {
                debug!("stats connect to {} timed out", shared.address);
                shared.connect_retry
            }
        };

        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = sleep(delay) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!("stats ingestor stopped");
}

/// Read and process frames until the connection drops, a protocol
/// violation forces a resync, or shutdown is requested.
async fn stream_frames(shared: &Shared, mut stream: TcpStream, shutdown: &mut watch::Receiver<bool>) {
    let mut header = [0u8; FRAME_HEADER_LEN];

    loop {
        tokio::select! {
            result = stream.read_exact(&mut header) => {
                if let Err(e) = result {
                    debug!("stats connection closed: {}", e);
                    return;
                }
            }
            _ = shutdown.changed() => return,
        }

        let length = u32::from_be_bytes(header) as usize;
        if length > MAX_FRAME_LEN {
            // Framing is lost; reconnect to resync rather than allocate
            warn!(
                "stats frame length {} exceeds {} byte limit, dropping connection",
                length, MAX_FRAME_LEN
            );
            return;
        }

        let mut payload = vec![0u8; length];
        tokio::select! {
            result = stream.read_exact(&mut payload) => {
                if let Err(e) = result {
                    debug!("stats connection closed mid-frame: {}", e);
                    return;
                }
            }
            _ = shutdown.changed() => return,
        }

        match protocol::decode_frame(&payload) {
            Ok(frame) if frame.frame_type == RX_FRAME_TYPE => publish(shared, &frame),
            Ok(frame) => debug!("ignoring {} stats frame", frame.frame_type),
            Err(e) => warn!("failed to decode stats frame, skipping: {}", e),
        }
    }
}

/// Build the new snapshot outside the lock, then swap it in
fn publish(shared: &Shared, frame: &protocol::StatsFrame) {
    let snapshot = Arc::new(protocol::build_snapshot(frame));
    *shared
        .snapshot
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = snapshot;
}
