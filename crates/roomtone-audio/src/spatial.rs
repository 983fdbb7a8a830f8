//! Spatial mixer-graph construction.
//!
//! `build` composes the full chain for one source: attach, register,
//! pipeline, distance model, sampler, composite event asset, mixer
//! binding. Any failing step aborts the build and surfaces its error;
//! a source attached in step one is left on the graph root and must be
//! torn down by the caller.

use tracing::debug;

use crate::error::GraphBuildError;
use crate::event::{MixerBinding, SoundEvent};
use crate::session::{AudioSession, ListenerId, SourceId};
use crate::types::{
    CalibrationMode, CullBehavior, DistanceModelConfig, LATE_REVERB_SEND, ReverbPreset,
    SamplerNodeConfig, SoundSourceDescriptor, SpatialPipelineConfig,
};

pub struct SpatialAudioGraphBuilder {
    reverb: ReverbPreset,
}

impl SpatialAudioGraphBuilder {
    pub fn new() -> Self {
        Self {
            reverb: ReverbPreset::MediumRoom,
        }
    }

    pub fn with_reverb(reverb: ReverbPreset) -> Self {
        Self { reverb }
    }

    /// Build a playable spatial sound event from a streamed asset.
    pub fn build(
        &self,
        session: &mut AudioSession,
        descriptor: &SoundSourceDescriptor,
        source: SourceId,
        listener: ListenerId,
    ) -> Result<SoundEvent, GraphBuildError> {
        session.attach_source_at(source, descriptor.location)?;
        let asset = session
            .registry_mut()
            .register_url(&descriptor.url, None, None)?;
        self.finish(session, descriptor, asset.identifier, source, listener)
    }

    /// Build a playable spatial sound event from an in-memory buffer,
    /// e.g. one block of live capture.
    pub fn build_buffered(
        &self,
        session: &mut AudioSession,
        data: &[u8],
        descriptor: &SoundSourceDescriptor,
        source: SourceId,
        listener: ListenerId,
    ) -> Result<SoundEvent, GraphBuildError> {
        session.attach_source_at(source, descriptor.location)?;
        let asset = session.registry_mut().register_buffer(data, None)?;
        self.finish(session, descriptor, asset.identifier, source, listener)
    }

    fn finish(
        &self,
        session: &mut AudioSession,
        descriptor: &SoundSourceDescriptor,
        asset_identifier: String,
        source: SourceId,
        listener: ListenerId,
    ) -> Result<SoundEvent, GraphBuildError> {
        let pipeline = SpatialPipelineConfig {
            direct_path_send: descriptor.send_level,
            late_reverb_send: LATE_REVERB_SEND,
            reverb: self.reverb,
            distance: DistanceModelConfig {
                rolloff_factor: descriptor.rolloff_factor,
                cull_distance: descriptor.cull_distance,
            },
        };
        session.set_default_reverb(self.reverb);

        let sampler = SamplerNodeConfig {
            asset_identifier: asset_identifier.clone(),
            playback_mode: descriptor.playback_mode,
            calibration: CalibrationMode::RelativeSpl {
                level: descriptor.calibration_level,
            },
            cull: CullBehavior::SleepWake,
        };
        let event_asset = format!("{asset_identifier}_event");
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
            MixerBinding::Spatial { pipeline },
        );
        debug!(event = ?event.id(), asset = %asset_identifier, "spatial graph built");
        Ok(event)
    }
}

impl Default for SpatialAudioGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
