//! Ambient mixer-graph construction.
//!
//! Ambient beds have no directional categories and no distance model:
//! the mixer orientation is fixed and the bed is never culled. One sound
//! event is produced per descriptor, preserving input order.

use roomtone_core::Quat;
use tracing::debug;

use crate::error::GraphBuildError;
use crate::event::{MixerBinding, SoundEvent};
use crate::layout::ChannelLayout;
use crate::session::{AudioSession, ListenerId};
use crate::types::{
    CalibrationMode, CullBehavior, ReverbPreset, SamplerNodeConfig, SoundSourceDescriptor,
};

/// Fixed mixer orientation shared by every ambient bed.
pub const AMBIENT_ORIENTATION: Quat = Quat {
    i: 1.0,
    j: 0.0,
    k: 0.0,
    w: 0.0,
};

pub struct AmbientAudioGraphBuilder {
    layout: ChannelLayout,
    reverb: ReverbPreset,
}

impl AmbientAudioGraphBuilder {
    /// Stereo ambient beds.
    pub fn new() -> Self {
        Self {
            layout: ChannelLayout::Stereo,
            reverb: ReverbPreset::LargeChamber,
        }
    }

    /// Multichannel variant for 7.1 beds.
    pub fn surround_7_1() -> Self {
        Self {
            layout: ChannelLayout::Surround7_1,
            reverb: ReverbPreset::LargeChamber,
        }
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Build one ambient sound event. The source is attached at the
    /// descriptor location for bookkeeping, but ambient playback ignores
    /// the distance to it.
    pub fn build(
        &self,
        session: &mut AudioSession,
        descriptor: &SoundSourceDescriptor,
        listener: ListenerId,
    ) -> Result<SoundEvent, GraphBuildError> {
        let source = session.make_source();
        session.attach_source_at(source, descriptor.location)?;
        let asset =
            session
                .registry_mut()
                .register_url(&descriptor.url, None, Some(self.layout))?;
        session.set_default_reverb(self.reverb);

        let sampler = SamplerNodeConfig {
            asset_identifier: asset.identifier.clone(),
            playback_mode: descriptor.playback_mode,
            calibration: CalibrationMode::RelativeSpl {
                level: descriptor.calibration_level,
            },
            cull: CullBehavior::SleepWake,
        };
        let event_asset = format!("{}_event", asset.identifier);
        session
            .registry_mut()
            .register_event_asset(&event_asset, sampler.clone())?;

        if !session.contains_listener(listener) {
            return Err(GraphBuildError::UnknownListener(listener));
        }

        let event = session.create_event(
            source,
            listener,
            event_asset,
            sampler,
            MixerBinding::Ambient {
                layout: self.layout,
                orientation: AMBIENT_ORIENTATION,
            },
        );
        debug!(event = ?event.id(), asset = %asset.identifier, "ambient graph built");
        Ok(event)
    }

    /// Build one event per descriptor, in input order. The first failure
    /// aborts the remainder; events already built stay live.
    pub fn build_all(
        &self,
        session: &mut AudioSession,
        descriptors: &[SoundSourceDescriptor],
        listener: ListenerId,
    ) -> Result<Vec<SoundEvent>, GraphBuildError> {
        let mut events = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            events.push(self.build(session, descriptor, listener)?);
        }
        Ok(events)
    }
}

impl Default for AmbientAudioGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
