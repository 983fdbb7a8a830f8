//! Single-consumer worker that owns the reconciler and decoration engine.
//!
//! Surface providers push anchor events through a [`SurfaceFeed`]; the
//! worker thread applies them in arrival order, so bucket and node-map
//! mutation stays single-writer. A provider dropping its feed ends the
//! stream and the worker exits after reporting it.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, SendTimeoutError, Sender};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use roomtone_core::{AnchorEvent, SurfaceClass};
use thiserror::Error;
use tracing::info;

use crate::decorate::DecorationEngine;
use crate::reconcile::AnchorReconciler;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    DecorationApplied { class: SurfaceClass, decals: usize },
    StreamEnded,
}

pub type SceneEventCallback = Arc<dyn Fn(SceneEvent) + Send + Sync>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SurfaceWorkerError {
    #[error("surface worker command queue full")]
    QueueFull,
    #[error("surface worker exited")]
    Exited,
    #[error("surface worker response timed out")]
    Timeout,
}

#[derive(Debug, Clone)]
pub struct SurfaceWorkerConfig {
    pub command_capacity: usize,
    /// Fixed seed for reproducible decal geometry; `None` seeds from the
    /// operating system.
    pub placement_seed: Option<u64>,
}

impl Default for SurfaceWorkerConfig {
    fn default() -> Self {
        Self {
            command_capacity: 256,
            placement_seed: None,
        }
    }
}

/// Counters for one point in time, answered by the worker itself so the
/// numbers are consistent with the event order it has applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneSnapshot {
    pub anchors: usize,
    pub ceiling: usize,
    pub wall: usize,
    pub floor: usize,
    pub furniture: usize,
    pub decals_placed: usize,
}

enum SurfaceCommand {
    Anchor(AnchorEvent),
    Snapshot { resp_tx: Sender<SceneSnapshot> },
    Shutdown { ack_tx: Sender<()> },
}

/// Cloneable handle providers use to push anchor events into the worker.
#[derive(Clone)]
pub struct SurfaceFeed {
    tx: Sender<SurfaceCommand>,
}

impl SurfaceFeed {
    pub fn push(&self, event: AnchorEvent) -> Result<(), SurfaceWorkerError> {
        self.tx
            .send(SurfaceCommand::Anchor(event))
            .map_err(|_| SurfaceWorkerError::Exited)
    }
}

pub struct SurfaceWorker {
    tx: Sender<SurfaceCommand>,
    join: JoinHandle<()>,
}

impl SurfaceWorker {
    pub fn start(config: SurfaceWorkerConfig, callback: SceneEventCallback) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(config.command_capacity.max(1));
        let rng = match config.placement_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let join = std::thread::Builder::new()
            .name("roomtone-surface-worker".to_string())
            .spawn(move || surface_main(rx, callback, rng))
            .expect("failed to spawn surface worker");
        Self { tx, join }
    }

    pub fn feed(&self) -> SurfaceFeed {
        SurfaceFeed {
            tx: self.tx.clone(),
        }
    }

    pub fn push(&self, event: AnchorEvent, timeout: Duration) -> Result<(), SurfaceWorkerError> {
        self.tx
            .send_timeout(SurfaceCommand::Anchor(event), timeout)
            .map_err(|error| match error {
                SendTimeoutError::Timeout(_) => SurfaceWorkerError::QueueFull,
                SendTimeoutError::Disconnected(_) => SurfaceWorkerError::Exited,
            })
    }

    pub fn snapshot(&self, timeout: Duration) -> Result<SceneSnapshot, SurfaceWorkerError> {
        let (resp_tx, resp_rx) = crossbeam_channel::bounded(1);
        self.tx
            .send_timeout(SurfaceCommand::Snapshot { resp_tx }, timeout)
            .map_err(|error| match error {
                SendTimeoutError::Timeout(_) => SurfaceWorkerError::QueueFull,
                SendTimeoutError::Disconnected(_) => SurfaceWorkerError::Exited,
            })?;
        resp_rx
            .recv_timeout(timeout)
            .map_err(|_| SurfaceWorkerError::Timeout)
    }

    pub fn shutdown(self, timeout: Duration) -> Result<(), SurfaceWorkerError> {
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        self.tx
            .send_timeout(SurfaceCommand::Shutdown { ack_tx }, timeout)
            .map_err(|_| SurfaceWorkerError::Exited)?;
        ack_rx
            .recv_timeout(timeout)
            .map_err(|_| SurfaceWorkerError::Timeout)?;
        self.join.join().map_err(|_| SurfaceWorkerError::Exited)
    }
}

fn surface_main(rx: Receiver<SurfaceCommand>, callback: SceneEventCallback, mut rng: SmallRng) {
    let mut reconciler = AnchorReconciler::new();
    let engine = DecorationEngine::new();
    let mut decals_placed = 0usize;

    loop {
        match rx.recv() {
            Ok(SurfaceCommand::Anchor(event)) => {
                if let Some(delta) = reconciler.consume(event) {
                    let placed = engine.apply(&mut reconciler, &delta, &mut rng);
                    if placed > 0 {
                        decals_placed += placed;
                        callback(SceneEvent::DecorationApplied {
                            class: delta.class,
                            decals: placed,
                        });
                    }
                }
            },
            Ok(SurfaceCommand::Snapshot { resp_tx }) => {
                let _ = resp_tx.send(SceneSnapshot {
                    anchors: reconciler.anchor_count(),
                    ceiling: reconciler.bucket(SurfaceClass::Ceiling).len(),
                    wall: reconciler.bucket(SurfaceClass::Wall).len(),
                    floor: reconciler.bucket(SurfaceClass::Floor).len(),
                    furniture: reconciler.bucket(SurfaceClass::Furniture).len(),
                    decals_placed,
                });
            },
            Ok(SurfaceCommand::Shutdown { ack_tx }) => {
                let _ = ack_tx.send(());
                break;
            },
            Err(_) => {
                // All feeds dropped: the anchor stream is over.
                info!("surface stream disconnected, worker exiting");
                callback(SceneEvent::StreamEnded);
                break;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use roomtone_core::{AnchorEvent, AnchorId, Extent, Mat4, SurfaceAnchor, SurfaceClass};

    use super::{SceneEvent, SceneEventCallback, SurfaceWorker, SurfaceWorkerConfig};

    const TEST_TIMEOUT: Duration = Duration::from_millis(500);

    fn test_config() -> SurfaceWorkerConfig {
        SurfaceWorkerConfig {
            placement_seed: Some(42),
            ..SurfaceWorkerConfig::default()
        }
    }

    fn added(id: u64, class: SurfaceClass) -> AnchorEvent {
        AnchorEvent::Added(SurfaceAnchor::new(
            AnchorId(id),
            class,
            Mat4::IDENTITY,
            Extent::new(3.0, 3.0),
        ))
    }

    #[test]
    fn worker_applies_events_in_order_and_reports_decor() {
        let decor_events = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&decor_events);
        let callback: SceneEventCallback = Arc::new(move |event| {
            if matches!(event, SceneEvent::DecorationApplied { .. }) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        let worker = SurfaceWorker::start(test_config(), callback);

        worker
            .push(added(1, SurfaceClass::Floor), TEST_TIMEOUT)
            .expect("push floor");
        worker
            .push(added(2, SurfaceClass::Wall), TEST_TIMEOUT)
            .expect("push wall");
        worker
            .push(AnchorEvent::Removed(AnchorId(1)), TEST_TIMEOUT)
            .expect("push removal");

        let snapshot = worker.snapshot(TEST_TIMEOUT).expect("snapshot");
        assert_eq!(snapshot.anchors, 1);
        assert_eq!(snapshot.floor, 0);
        assert_eq!(snapshot.wall, 1);
        assert_eq!(snapshot.decals_placed, 32);
        assert_eq!(decor_events.load(Ordering::SeqCst), 2);

        worker.shutdown(TEST_TIMEOUT).expect("shutdown");
    }

    #[test]
    fn dropping_every_feed_ends_the_stream() {
        let ended = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ended);
        let callback: SceneEventCallback = Arc::new(move |event| {
            if event == SceneEvent::StreamEnded {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        let worker = SurfaceWorker::start(test_config(), callback);
        let feed = worker.feed();
        feed.push(added(1, SurfaceClass::Ceiling)).expect("push");

        let SurfaceWorker { tx, join } = worker;
        drop(tx);
        drop(feed);
        join.join().expect("worker thread exits");

        assert_eq!(ended.load(Ordering::SeqCst), 1);
    }
}
