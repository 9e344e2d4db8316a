use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use mavtap_transport::UnixEndpoint;
use tracing::{debug, error, info, warn};

use crate::error::{FanoutError, Result};
use crate::hub::SubscriberHub;
use crate::subscriber::StreamSubscriber;

/// Subscriber socket settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Permission mode applied to the socket file.
    pub socket_mode: u32,
    /// Per-event write timeout. A subscriber that stalls past it is closed.
    pub write_timeout: Option<Duration>,
    /// How often the accept loop checks for new connections and shutdown.
    pub poll_interval: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            socket_mode: UnixEndpoint::DEFAULT_SOCKET_MODE,
            write_timeout: Some(Duration::from_millis(500)),
            poll_interval: Duration::from_millis(25),
        }
    }
}

/// Accepts subscriber connections on a Unix socket and registers each one
/// with a [`SubscriberHub`].
///
/// Connected clients receive newline-delimited JSON events. The socket file is
/// removed when the listener stops.
pub struct SubscriberListener {
    path: PathBuf,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SubscriberListener {
    /// Bind `path` with default settings and start accepting.
    pub fn start(path: impl AsRef<Path>, hub: SubscriberHub) -> Result<Self> {
        Self::start_with_config(path, hub, ListenerConfig::default())
    }

    /// Bind `path` and start accepting.
    pub fn start_with_config(
        path: impl AsRef<Path>,
        hub: SubscriberHub,
        config: ListenerConfig,
    ) -> Result<Self> {
        let endpoint = UnixEndpoint::bind_with_mode(path, config.socket_mode)?;
        endpoint.set_nonblocking(true)?;
        let path = endpoint.path().to_path_buf();
        info!(transport = endpoint.transport_name(), ?path, "subscriber listener started");

        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let worker = std::thread::Builder::new()
            .name("mavtap-listener".to_string())
            .spawn(move || accept_loop(endpoint, hub, config, &flag))
            .map_err(|source| FanoutError::Spawn {
                name: "listener",
                source,
            })?;

        Ok(Self {
            path,
            running,
            worker: Some(worker),
        })
    }

    /// Stop accepting and remove the socket file. Idempotent.
    ///
    /// Already-registered subscribers stay in the hub.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("listener worker panicked");
            }
        }
    }

    /// Bound socket path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True until `stop` is called or accepting fails.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for SubscriberListener {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for SubscriberListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberListener")
            .field("path", &self.path)
            .field("running", &self.is_running())
            .finish()
    }
}

fn accept_loop(
    endpoint: UnixEndpoint,
    hub: SubscriberHub,
    config: ListenerConfig,
    running: &AtomicBool,
) {
    let mut next_id: u64 = 1;
    while running.load(Ordering::SeqCst) {
        match endpoint.try_accept() {
            Ok(Some(stream)) => {
                if let Err(err) = stream.set_write_timeout(config.write_timeout) {
                    warn!(%err, "failed to set subscriber write timeout; dropping connection");
                    continue;
                }
                let id = format!("subscriber-{next_id}");
                next_id += 1;
                info!(%id, "subscriber connected");
                hub.register(Box::new(StreamSubscriber::new(id, stream)));
            }
            Ok(None) => {
                let pruned = hub.prune_closed();
                if pruned > 0 {
                    debug!(pruned, "removed disconnected subscribers");
                }
                std::thread::sleep(config.poll_interval);
            }
            Err(err) => {
                error!(%err, "subscriber accept failed; listener stopping");
                running.store(false, Ordering::SeqCst);
            }
        }
    }
    info!(path = ?endpoint.path(), "subscriber listener stopped");
}
