//! Playable, stateful handles bound to a constructed mixer graph.

use std::sync::Arc;

use parking_lot::Mutex;
use roomtone_core::Quat;

use crate::layout::ChannelLayout;
use crate::session::{ListenerId, SourceId};
use crate::types::{SamplerNodeConfig, SpatialPipelineConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoundEventId(pub u64);

/// Playback state machine:
/// `Created -> Playing <-> Paused`, and any live state `-> Stopped`.
/// `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Created,
    Playing,
    Paused,
    Stopped,
}

/// How the sampler is routed: through a directional spatial pipeline, or
/// an orientation-fixed ambient bed.
#[derive(Debug, Clone, PartialEq)]
pub enum MixerBinding {
    Spatial { pipeline: SpatialPipelineConfig },
    Ambient { layout: ChannelLayout, orientation: Quat },
}

/// Handle to one playable sound event. Clones share state; the session
/// keeps a clone in its live set so bulk lifecycle operations observe the
/// same transitions as the caller's handle.
#[derive(Clone)]
pub struct SoundEvent {
    id: SoundEventId,
    source: SourceId,
    listener: ListenerId,
    asset_identifier: String,
    sampler: SamplerNodeConfig,
    mixer: MixerBinding,
    state: Arc<Mutex<PlaybackState>>,
}

impl SoundEvent {
    pub(crate) fn new(
        id: SoundEventId,
        source: SourceId,
        listener: ListenerId,
        asset_identifier: String,
        sampler: SamplerNodeConfig,
        mixer: MixerBinding,
    ) -> Self {
        Self {
            id,
            source,
            listener,
            asset_identifier,
            sampler,
            mixer,
            state: Arc::new(Mutex::new(PlaybackState::Created)),
        }
    }

    pub fn id(&self) -> SoundEventId {
        self.id
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    pub fn listener(&self) -> ListenerId {
        self.listener
    }

    pub fn asset_identifier(&self) -> &str {
        &self.asset_identifier
    }

    pub fn sampler(&self) -> &SamplerNodeConfig {
        &self.sampler
    }

    pub fn mixer(&self) -> &MixerBinding {
        &self.mixer
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.lock()
    }

    /// `Created -> Playing`. Returns whether a transition happened; any
    /// other state is left unchanged.
    pub fn start(&self) -> bool {
        self.transition(|state| matches!(state, PlaybackState::Created), PlaybackState::Playing)
    }

    /// `Playing -> Paused`. Pausing an already-paused event is a no-op.
    pub fn pause(&self) -> bool {
        self.transition(|state| matches!(state, PlaybackState::Playing), PlaybackState::Paused)
    }

    /// `Paused -> Playing`. Resuming an already-playing event is a no-op.
    pub fn resume(&self) -> bool {
        self.transition(|state| matches!(state, PlaybackState::Paused), PlaybackState::Playing)
    }

    /// Any live state `-> Stopped`; terminal. Stopping twice is a no-op.
    pub fn stop(&self) -> bool {
        self.transition(
            |state| !matches!(state, PlaybackState::Stopped),
            PlaybackState::Stopped,
        )
    }

    fn transition(&self, allowed: impl Fn(PlaybackState) -> bool, next: PlaybackState) -> bool {
        let mut state = self.state.lock();
        if allowed(*state) {
            *state = next;
            true
        } else {
            false
        }
    }
}

impl std::fmt::Debug for SoundEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundEvent")
            .field("id", &self.id)
            .field("asset", &self.asset_identifier)
            .field("state", &self.state())
            .finish()
    }
}
