use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::models::Snapshot;
use crate::remote::DownloadSource;
use crate::store::Store;

use super::change::{canonicalize, snapshots_equal};

thread_local! {
    // Address of the gate whose snapshot is being published on this thread.
    static PUBLISHING: Cell<usize> = const { Cell::new(0) };
}

/// Periodically polls the download manager and publishes the download list
/// into a [`Store`] whenever it actually changed.
///
/// Cycles never overlap: the next tick is only awaited once the previous
/// fetch has finished, and ticks missed while a fetch was outstanding are
/// skipped rather than replayed.
pub struct DownloadSync {
    source: Arc<dyn DownloadSource>,
    store: Store<Snapshot>,
    period: Duration,
    runtime: Handle,
}

/// Controls a running [`DownloadSync`]. Dropping the handle deactivates it.
pub struct DownloadSyncHandle {
    gate: Arc<Gate>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

/// Activation flag plus the lock every publish runs under.
struct Gate {
    active: AtomicBool,
    publish: Mutex<()>,
}

impl DownloadSync {
    /// Creates an engine bound to the Tokio runtime of the calling context.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime; use
    /// [`on_runtime`](Self::on_runtime) after constructing elsewhere.
    pub fn new(source: Arc<dyn DownloadSource>, store: Store<Snapshot>, period: Duration) -> Self {
        Self {
            source,
            store,
            period,
            runtime: Handle::current(),
        }
    }

    pub fn on_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = runtime;
        self
    }

    /// Spawns the polling loop. The first fetch happens immediately.
    ///
    /// Safe to call from threads outside the runtime.
    pub fn start(self) -> DownloadSyncHandle {
        let gate = Arc::new(Gate {
            active: AtomicBool::new(true),
            publish: Mutex::new(()),
        });
        let (shutdown, shutdown_rx) = watch::channel(false);
        let runtime = self.runtime.clone();
        let task = runtime.spawn(self.run(Arc::clone(&gate), shutdown_rx));

        DownloadSyncHandle {
            gate,
            shutdown,
            task: Some(task),
        }
    }

    async fn run(self, gate: Arc<Gate>, mut shutdown: watch::Receiver<bool>) {
        info!(period_ms = self.period.as_millis() as u64, "Download sync started");
        let mut ticker = time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut previous: Snapshot = (*self.store.get()).clone();

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {}
            }
            if !gate.is_active() {
                break;
            }
            self.poll_once(&mut previous, &gate).await;
        }

        info!("Download sync stopped");
    }

    async fn poll_once(&self, previous: &mut Snapshot, gate: &Gate) {
        let fetched = match self.source.fetch_downloads().await {
            Ok(downloads) => downloads,
            Err(err) => {
                warn!(error = ?err, "Failed to fetch downloads");
                return;
            }
        };

        let canonical = canonicalize(fetched);
        if snapshots_equal(previous, &canonical) {
            trace!(count = canonical.len(), "Downloads unchanged");
            return;
        }

        // Held across the publish so a concurrent stop() cannot slip in between.
        let _publish = gate.publish_lock();
        if !gate.is_active() {
            debug!("Discarding downloads fetched after deactivation");
            return;
        }
        let count = canonical.len();
        *previous = canonical.clone();
        let version = gate.publishing(|| self.store.set(canonical));
        debug!(version, count, "Published download snapshot");
    }
}

impl DownloadSyncHandle {
    pub fn is_active(&self) -> bool {
        self.gate.is_active()
    }

    /// Cancels future polls. A fetch already in flight may finish, but its
    /// result is never published.
    ///
    /// When called from another thread while a snapshot is being published,
    /// this waits for that publish to finish, so no publish starts after it
    /// returns. Snapshot subscribers may call it from their callback; the
    /// publish that invoked them is the last one.
    pub fn stop(&self) {
        if self.gate.close() {
            let _ = self.shutdown.send(true);
        }
    }

    /// Stops the engine and waits for its task to wind down.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!(error = ?err, "Download sync task ended abnormally");
            }
        }
    }
}

impl Drop for DownloadSyncHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Gate {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn publish_lock(&self) -> MutexGuard<'_, ()> {
        self.publish
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn address(&self) -> usize {
        self as *const Gate as usize
    }

    fn publishing<R>(&self, publish: impl FnOnce() -> R) -> R {
        struct Restore(usize);
        impl Drop for Restore {
            fn drop(&mut self) {
                PUBLISHING.with(|current| current.set(self.0));
            }
        }

        let _restore = Restore(PUBLISHING.with(|current| current.replace(self.address())));
        publish()
    }

    /// Deactivates the gate, returning whether it was active. Waits out a
    /// publish running on another thread.
    fn close(&self) -> bool {
        let was_active = self.active.swap(false, Ordering::SeqCst);
        let reentrant = PUBLISHING.with(|current| current.get() == self.address());
        if !reentrant {
            drop(self.publish_lock());
        }
        was_active
    }
}
