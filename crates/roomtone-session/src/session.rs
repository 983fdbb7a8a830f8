//! Immersive session orchestration.
//!
//! Owns the audio session context, the surface worker, and the pose
//! tracker, and wires them together: authorization gates anchor tracking,
//! the bundled ambience table drives the spatial graph builds, and view
//! transitions map onto bulk sound-event lifecycle operations.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::warn;

use roomtone_audio::{
    AssetRegistry, AudioSession, ListenerId, SoundEvent, SoundEventLifecycleManager,
    SpatialAudioGraphBuilder,
};
use roomtone_scene::{
    SceneEvent, SceneEventCallback, SceneSnapshot, SurfaceFeed, SurfaceWorker, SurfaceWorkerConfig,
};
use roomtone_tracking::{ListenerPose, MotionFeed, PoseTracker, WorldPoseProvider};

use crate::authorization::{
    AuthorizationError, AuthorizationMonitor, AuthorizationStatus, ProviderSessionEvent,
    SensingGate,
};
use crate::config::SessionConfig;
use crate::events::{SessionEvent, SessionEventHub};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("immersive session already started")]
    AlreadyStarted,
}

pub struct ImmersiveSession {
    config: SessionConfig,
    audio: Arc<Mutex<AudioSession>>,
    lifecycle: SoundEventLifecycleManager,
    hub: Arc<SessionEventHub>,
    listener: ListenerId,
    monitor: AuthorizationMonitor,
    surfaces: Option<SurfaceWorker>,
    tracker: Option<PoseTracker>,
    sound_events: Vec<SoundEvent>,
    started: bool,
}

impl ImmersiveSession {
    pub fn new(registry: Box<dyn AssetRegistry>, config: SessionConfig) -> Self {
        let mut audio = AudioSession::new(registry);
        let listener = audio.make_listener_at_root();
        let hub = Arc::new(SessionEventHub::new(config.event_capacity));
        let audio = Arc::new(Mutex::new(audio));
        let lifecycle = SoundEventLifecycleManager::new(Arc::clone(&audio));
        Self {
            config,
            audio,
            lifecycle,
            hub,
            listener,
            monitor: AuthorizationMonitor::new(AuthorizationStatus::NotDetermined),
            surfaces: None,
            tracker: None,
            sound_events: Vec::new(),
            started: false,
        }
    }

    /// Enter the immersive session: request authorization, bring up
    /// anchor tracking when allowed, build the bundled ambience graphs,
    /// start the engine, and start every built event.
    ///
    /// A denied authorization is returned to the caller but does not stop
    /// the session; only anchor tracking stays down.
    pub fn start(
        &mut self,
        gate: &mut dyn SensingGate,
        world_provider: Arc<dyn WorldPoseProvider>,
    ) -> Result<AuthorizationStatus, SessionError> {
        if self.started {
            return Err(SessionError::AlreadyStarted);
        }
        self.started = true;

        let status = gate.request_world_sensing();
        self.monitor = AuthorizationMonitor::new(status);
        self.hub.emit(SessionEvent::AuthorizationChanged { status });

        if status == AuthorizationStatus::Allowed {
            let hub = Arc::clone(&self.hub);
            let callback: SceneEventCallback = Arc::new(move |event| match event {
                SceneEvent::DecorationApplied { class, decals } => {
                    hub.emit(SessionEvent::DecorationApplied { class, decals });
                },
                SceneEvent::StreamEnded => hub.emit(SessionEvent::AnchorStreamEnded),
            });
            self.surfaces = Some(SurfaceWorker::start(
                SurfaceWorkerConfig {
                    placement_seed: self.config.placement_seed,
                    ..SurfaceWorkerConfig::default()
                },
                callback,
            ));
            self.tracker = Some(PoseTracker::start(world_provider, self.config.pose.clone()));
        } else {
            warn!("world sensing not authorized, anchor tracking disabled");
        }

        self.build_ambience();

        self.audio.lock().start();
        for event in &self.sound_events {
            event.start();
        }
        self.hub.emit(SessionEvent::EngineStarted);
        Ok(status)
    }

    /// Build one spatial graph per bundled track. A failed build is
    /// logged and skipped, and its half-attached source is torn down;
    /// the remaining tracks are unaffected.
    fn build_ambience(&mut self) {
        let builder = SpatialAudioGraphBuilder::new();
        let mut audio = self.audio.lock();
        for track in &self.config.tracks {
            let descriptor = track.descriptor();
            let source = audio.make_source();
            match builder.build(&mut audio, &descriptor, source, self.listener) {
                Ok(event) => self.sound_events.push(event),
                Err(error) => {
                    warn!(%error, url = %track.url, "skipping ambience track");
                    audio.detach_source(source);
                },
            }
        }
    }

    /// Apply a session-host event. Revocation disables anchor tracking
    /// and is surfaced to the caller; the session keeps running.
    pub fn observe(&mut self, event: &ProviderSessionEvent) -> Result<(), AuthorizationError> {
        let result = self.monitor.observe(event);
        if let ProviderSessionEvent::AuthorizationChanged { status } = event {
            self.hub.emit(SessionEvent::AuthorizationChanged { status: *status });
        }
        if result == Err(AuthorizationError::Revoked) {
            self.disable_tracking();
        }
        result
    }

    /// The immersive view went away: pause every live event.
    pub fn on_background(&self) -> usize {
        self.lifecycle.pause_all()
    }

    /// The immersive view reappeared: resume every live event.
    pub fn on_foreground(&self) -> usize {
        self.lifecycle.resume_all()
    }

    pub fn authorization(&self) -> AuthorizationStatus {
        self.monitor.status()
    }

    pub fn sound_events(&self) -> &[SoundEvent] {
        &self.sound_events
    }

    pub fn audio_session(&self) -> Arc<Mutex<AudioSession>> {
        Arc::clone(&self.audio)
    }

    pub fn lifecycle(&self) -> &SoundEventLifecycleManager {
        &self.lifecycle
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.hub.subscribe()
    }

    /// Push handle for the surface-detection provider; `None` while
    /// anchor tracking is disabled.
    pub fn surface_feed(&self) -> Option<SurfaceFeed> {
        self.surfaces.as_ref().map(SurfaceWorker::feed)
    }

    /// Push handle for the motion-sensor feed; `None` while tracking is
    /// disabled.
    pub fn motion_feed(&self) -> Option<MotionFeed> {
        self.tracker.as_ref().map(PoseTracker::motion_feed)
    }

    pub fn listener_pose(&self) -> Option<Arc<ListenerPose>> {
        self.tracker.as_ref().map(PoseTracker::listener_pose)
    }

    pub fn listener(&self) -> ListenerId {
        self.listener
    }

    /// Apply the latest composed `device x secondary` orientation to the
    /// audio session's live listener. Called from the application's frame
    /// loop; staleness between the two feeds is tolerated.
    pub fn sync_listener_pose(&self) {
        let Some(tracker) = self.tracker.as_ref() else {
            return;
        };
        let pose = tracker.listener_pose();
        if let Err(error) = self
            .audio
            .lock()
            .set_listener_transform(self.listener, pose.listener)
        {
            warn!(%error, "failed to apply listener pose");
        }
    }

    pub fn surface_snapshot(&self) -> Option<SceneSnapshot> {
        let worker = self.surfaces.as_ref()?;
        worker.snapshot(self.config.command_timeout).ok()
    }

    fn disable_tracking(&mut self) {
        if let Some(worker) = self.surfaces.take()
            && let Err(error) = worker.shutdown(self.config.command_timeout)
        {
            warn!(%error, "surface worker shutdown failed");
        }
        if let Some(tracker) = self.tracker.take()
            && let Err(error) = tracker.shutdown(self.config.command_timeout)
        {
            warn!(%error, "pose tracker shutdown failed");
        }
    }

    /// Leave the session: stop the engine (terminal for every live
    /// event) and tear the tracking workers down.
    pub fn shutdown(mut self) {
        self.audio.lock().stop();
        self.hub.emit(SessionEvent::EngineStopped);
        self.disable_tracking();
    }
}
