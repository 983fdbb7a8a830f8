//! The audio session context: registry, graph root, default reverb, and
//! the live sound-event set.
//!
//! This object replaces process-wide engine state. The owning application
//! creates one per session and passes it to the graph builders; start and
//! stop must be serialized by that owner.

use std::collections::BTreeMap;

use roomtone_core::{Mat4, Vec3};
use tracing::{debug, info};

use crate::error::GraphBuildError;
use crate::event::{MixerBinding, SoundEvent, SoundEventId};
use crate::registry::AssetRegistry;
use crate::types::{ReverbPreset, SamplerNodeConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Stopped,
    Running,
}

// Only the translation of an attached source matters to the mixer graph;
// orientation comes from the listener side.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Attachment {
    Detached,
    AtRoot(Vec3),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ListenerSlot {
    attachment: Attachment,
    transform: Mat4,
}

pub struct AudioSession {
    registry: Box<dyn AssetRegistry>,
    state: EngineState,
    default_reverb: ReverbPreset,
    sources: BTreeMap<SourceId, Attachment>,
    listeners: BTreeMap<ListenerId, ListenerSlot>,
    events: Vec<SoundEvent>,
    next_source: u64,
    next_listener: u64,
    next_event: u64,
}

impl AudioSession {
    pub fn new(registry: Box<dyn AssetRegistry>) -> Self {
        Self {
            registry,
            state: EngineState::Stopped,
            default_reverb: ReverbPreset::default(),
            sources: BTreeMap::new(),
            listeners: BTreeMap::new(),
            events: Vec::new(),
            next_source: 0,
            next_listener: 0,
            next_event: 0,
        }
    }

    pub fn make_source(&mut self) -> SourceId {
        self.next_source += 1;
        let id = SourceId(self.next_source);
        self.sources.insert(id, Attachment::Detached);
        id
    }

    pub fn make_listener(&mut self) -> ListenerId {
        self.insert_listener(Attachment::Detached)
    }

    /// Create a listener and attach it to the graph root in one step.
    pub fn make_listener_at_root(&mut self) -> ListenerId {
        self.insert_listener(Attachment::AtRoot(Vec3::ZERO))
    }

    fn insert_listener(&mut self, attachment: Attachment) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.insert(
            id,
            ListenerSlot {
                attachment,
                transform: Mat4::IDENTITY,
            },
        );
        id
    }

    /// Attach a source to the graph root at `location`. Re-attaching an
    /// already-attached source just moves it.
    pub fn attach_source_at(
        &mut self,
        source: SourceId,
        location: Vec3,
    ) -> Result<(), GraphBuildError> {
        let slot = self
            .sources
            .get_mut(&source)
            .ok_or(GraphBuildError::UnknownSource(source))?;
        *slot = Attachment::AtRoot(location);
        Ok(())
    }

    /// Attach a listener to the graph root.
    pub fn attach_listener(&mut self, listener: ListenerId) -> Result<(), GraphBuildError> {
        let slot = self
            .listeners
            .get_mut(&listener)
            .ok_or(GraphBuildError::UnknownListener(listener))?;
        slot.attachment = Attachment::AtRoot(Vec3::ZERO);
        Ok(())
    }

    /// Apply the composed head/device orientation to a live listener.
    pub fn set_listener_transform(
        &mut self,
        listener: ListenerId,
        transform: Mat4,
    ) -> Result<(), GraphBuildError> {
        let slot = self
            .listeners
            .get_mut(&listener)
            .ok_or(GraphBuildError::UnknownListener(listener))?;
        slot.transform = transform;
        Ok(())
    }

    pub fn listener_transform(&self, listener: ListenerId) -> Option<Mat4> {
        self.listeners.get(&listener).map(|slot| slot.transform)
    }

    /// Remove a source from the graph root. This is the teardown path for
    /// partial state left behind by an aborted build.
    pub fn detach_source(&mut self, source: SourceId) {
        if let Some(slot) = self.sources.get_mut(&source) {
            *slot = Attachment::Detached;
        }
    }

    pub fn contains_listener(&self, listener: ListenerId) -> bool {
        self.listeners.contains_key(&listener)
    }

    pub fn source_location(&self, source: SourceId) -> Option<Vec3> {
        match self.sources.get(&source)? {
            Attachment::AtRoot(location) => Some(*location),
            Attachment::Detached => None,
        }
    }

    pub fn attached_source_count(&self) -> usize {
        self.sources
            .values()
            .filter(|slot| matches!(slot, Attachment::AtRoot(_)))
            .count()
    }

    /// Single global reverb value shared by every pipeline; last writer
    /// wins across builds.
    pub fn set_default_reverb(&mut self, preset: ReverbPreset) {
        self.default_reverb = preset;
    }

    pub fn default_reverb(&self) -> ReverbPreset {
        self.default_reverb
    }

    pub fn registry_mut(&mut self) -> &mut dyn AssetRegistry {
        self.registry.as_mut()
    }

    pub(crate) fn create_event(
        &mut self,
        source: SourceId,
        listener: ListenerId,
        asset_identifier: String,
        sampler: SamplerNodeConfig,
        mixer: MixerBinding,
    ) -> SoundEvent {
        self.next_event += 1;
        let event = SoundEvent::new(
            SoundEventId(self.next_event),
            source,
            listener,
            asset_identifier,
            sampler,
            mixer,
        );
        self.events.push(event.clone());
        debug!(event = ?event.id(), "sound event created");
        event
    }

    pub fn start(&mut self) {
        self.state = EngineState::Running;
        info!("audio session started");
    }

    /// Stop the engine: every live event is forced to its terminal state
    /// and the live set is cleared.
    pub fn stop(&mut self) {
        for event in self.events.drain(..) {
            event.stop();
        }
        self.state = EngineState::Stopped;
        info!("audio session stopped");
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// The live event set as of this call. Lifecycle bulk operations
    /// iterate this, not an earlier snapshot.
    pub fn live_events(&self) -> Vec<SoundEvent> {
        self.events.clone()
    }

    pub fn live_event_count(&self) -> usize {
        self.events.len()
    }
}

impl std::fmt::Debug for AudioSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSession")
            .field("state", &self.state)
            .field("default_reverb", &self.default_reverb)
            .field("sources", &self.sources.len())
            .field("listeners", &self.listeners.len())
            .field("events", &self.events.len())
            .finish()
    }
}
