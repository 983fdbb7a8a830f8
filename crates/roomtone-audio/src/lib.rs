#![deny(clippy::wildcard_imports)]

pub mod ambient;
pub mod error;
pub mod event;
pub mod layout;
pub mod lifecycle;
pub mod registry;
pub mod session;
pub mod spatial;
pub mod types;

pub use ambient::{AMBIENT_ORIENTATION, AmbientAudioGraphBuilder};
pub use error::{AssetError, GraphBuildError};
pub use event::{MixerBinding, PlaybackState, SoundEvent, SoundEventId};
pub use layout::ChannelLayout;
pub use lifecycle::SoundEventLifecycleManager;
pub use registry::{AssetKind, AssetRegistry, MemoryAssetRegistry, SoundAsset};
pub use session::{AudioSession, EngineState, ListenerId, SourceId};
pub use spatial::SpatialAudioGraphBuilder;
pub use types::{
    CalibrationMode, CullBehavior, DEFAULT_CULL_DISTANCE, DEFAULT_SEND_LEVEL, DistanceModelConfig,
    LATE_REVERB_SEND, PlaybackMode, ReverbPreset, SamplerNodeConfig, SoundSourceDescriptor,
    SpatialPipelineConfig,
};
