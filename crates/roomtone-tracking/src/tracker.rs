//! Pose tracking over two independent feeds.
//!
//! A periodic sampler polls the world-tracking provider at a fixed rate;
//! the motion-sensor feed pushes orientation samples at its own cadence.
//! Both post onto one single-consumer channel, and one owning thread
//! applies updates in arrival order, so no transform state is shared
//! between writers. The composed listener orientation
//! (`device x secondary`) is published through an atomic pointer swap;
//! readers tolerate staleness and never block a feed.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use crossbeam_channel::{Receiver, Sender, TrySendError, select_biased};
use roomtone_core::Mat4;
use thiserror::Error;
use tracing::debug;

use crate::provider::{OrientationSample, WorldPoseProvider};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PoseTrackerError {
    #[error("pose tracker exited")]
    Exited,
    #[error("pose tracker shutdown timed out")]
    Timeout,
}

#[derive(Debug, Clone)]
pub struct PoseTrackerConfig {
    /// Target device-pose sampling rate.
    pub sample_rate_hz: u32,
    pub update_capacity: usize,
}

impl Default for PoseTrackerConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 90,
            update_capacity: 256,
        }
    }
}

impl PoseTrackerConfig {
    fn sample_interval(&self) -> Duration {
        Duration::from_secs(1) / self.sample_rate_hz.max(1)
    }
}

/// Latest composed pose state. `listener` is always
/// `device x secondary`, recomputed whenever either input updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListenerPose {
    pub device: Mat4,
    pub secondary: Mat4,
    pub listener: Mat4,
}

impl Default for ListenerPose {
    fn default() -> Self {
        Self {
            device: Mat4::IDENTITY,
            secondary: Mat4::IDENTITY,
            listener: Mat4::IDENTITY,
        }
    }
}

enum PoseUpdate {
    Device(Mat4),
    Orientation(OrientationSample),
    Shutdown { ack_tx: Sender<()> },
}

/// Push handle for the motion-sensor feed.
#[derive(Clone)]
pub struct MotionFeed {
    tx: Sender<PoseUpdate>,
}

impl MotionFeed {
    pub fn push(&self, sample: OrientationSample) -> Result<(), PoseTrackerError> {
        self.tx
            .send(PoseUpdate::Orientation(sample))
            .map_err(|_| PoseTrackerError::Exited)
    }
}

pub struct PoseTracker {
    update_tx: Sender<PoseUpdate>,
    sampler_stop_tx: Sender<()>,
    sampler_join: JoinHandle<()>,
    hub_join: JoinHandle<()>,
    pose: Arc<ArcSwap<ListenerPose>>,
}

impl PoseTracker {
    pub fn start(provider: Arc<dyn WorldPoseProvider>, config: PoseTrackerConfig) -> Self {
        let (update_tx, update_rx) =
            crossbeam_channel::bounded::<PoseUpdate>(config.update_capacity.max(1));
        let (sampler_stop_tx, sampler_stop_rx) = crossbeam_channel::bounded::<()>(1);
        let pose = Arc::new(ArcSwap::from_pointee(ListenerPose::default()));

        let interval = config.sample_interval();
        let sampler_tx = update_tx.clone();
        let sampler_join = std::thread::Builder::new()
            .name("roomtone-pose-sampler".to_string())
            .spawn(move || sampler_main(provider, interval, sampler_tx, sampler_stop_rx))
            .expect("failed to spawn pose sampler");

        let hub_pose = Arc::clone(&pose);
        let hub_join = std::thread::Builder::new()
            .name("roomtone-pose-hub".to_string())
            .spawn(move || hub_main(update_rx, hub_pose))
            .expect("failed to spawn pose hub");

        Self {
            update_tx,
            sampler_stop_tx,
            sampler_join,
            hub_join,
            pose,
        }
    }

    pub fn motion_feed(&self) -> MotionFeed {
        MotionFeed {
            tx: self.update_tx.clone(),
        }
    }

    /// Latest composed pose; lock-free, possibly one update stale.
    pub fn listener_pose(&self) -> Arc<ListenerPose> {
        self.pose.load_full()
    }

    /// Latest device placement for scene-side consumers.
    pub fn device_transform(&self) -> Mat4 {
        self.pose.load().device
    }

    /// Stop both threads. The sampler observes the stop within one
    /// sampling interval; the hub drains in-flight updates first.
    pub fn shutdown(self, timeout: Duration) -> Result<(), PoseTrackerError> {
        let _ = self.sampler_stop_tx.send_timeout((), timeout);
        self.sampler_join
            .join()
            .map_err(|_| PoseTrackerError::Exited)?;

        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        self.update_tx
            .send_timeout(PoseUpdate::Shutdown { ack_tx }, timeout)
            .map_err(|_| PoseTrackerError::Exited)?;
        ack_rx
            .recv_timeout(timeout)
            .map_err(|_| PoseTrackerError::Timeout)?;
        self.hub_join.join().map_err(|_| PoseTrackerError::Exited)
    }
}

fn sampler_main(
    provider: Arc<dyn WorldPoseProvider>,
    interval: Duration,
    tx: Sender<PoseUpdate>,
    stop_rx: Receiver<()>,
) {
    loop {
        let tick = crossbeam_channel::after(interval);
        select_biased! {
            recv(stop_rx) -> _ => break,
            recv(tick) -> _ => {},
        }
        // Device poses are only available while the provider is running.
        if !provider.state().is_running() {
            continue;
        }
        let Some(device) = provider.query_pose(Instant::now()) else {
            continue;
        };
        match tx.try_send(PoseUpdate::Device(device)) {
            Ok(()) => {},
            Err(TrySendError::Full(_)) => {
                // Consumers tolerate staleness; drop the sample.
                debug!("pose hub backlogged, dropping device sample");
            },
            Err(TrySendError::Disconnected(_)) => break,
        }
    }
}

fn hub_main(rx: Receiver<PoseUpdate>, pose: Arc<ArcSwap<ListenerPose>>) {
    let mut device = Mat4::IDENTITY;
    let mut secondary = Mat4::IDENTITY;
    while let Ok(update) = rx.recv() {
        match update {
            PoseUpdate::Device(transform) => device = transform,
            PoseUpdate::Orientation(sample) => secondary = sample.to_transform(),
            PoseUpdate::Shutdown { ack_tx } => {
                let _ = ack_tx.send(());
                break;
            },
        }
        pose.store(Arc::new(ListenerPose {
            device,
            secondary,
            listener: device * secondary,
        }));
    }
}
