//! Bundled session configuration.
//!
//! The ambience table is fixed at build time and not user-editable at
//! runtime; it serializes for tooling only.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use roomtone_audio::{PlaybackMode, SoundSourceDescriptor};
use roomtone_core::Vec3;
use roomtone_tracking::PoseTrackerConfig;

/// One ambience track: where its asset lives, where it sits in the
/// world, and how it plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbienceTrack {
    pub url: String,
    pub location: Vec3,
    pub send_level: f32,
    pub playback_mode: PlaybackMode,
}

impl AmbienceTrack {
    pub fn descriptor(&self) -> SoundSourceDescriptor {
        SoundSourceDescriptor::new(self.url.clone(), self.location)
            .with_send_level(self.send_level)
            .with_playback_mode(self.playback_mode)
    }
}

/// The fixed ambience bed shipped with the session.
pub fn bundled_ambience() -> Vec<AmbienceTrack> {
    vec![
        AmbienceTrack {
            url: "wind_grass.wav".to_string(),
            location: Vec3::new(0.0, 0.1, 0.0),
            send_level: 0.02,
            playback_mode: PlaybackMode::Loop,
        },
        AmbienceTrack {
            url: "wind_gusts.wav".to_string(),
            location: Vec3::new(0.0, 20.0, 0.0),
            send_level: 0.01,
            playback_mode: PlaybackMode::Loop,
        },
        AmbienceTrack {
            url: "surf.wav".to_string(),
            location: Vec3::new(200.0, 0.0, 200.0),
            send_level: 0.02,
            playback_mode: PlaybackMode::Loop,
        },
    ]
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tracks: Vec<AmbienceTrack>,
    /// Fixed seed for reproducible decal geometry; `None` seeds from the
    /// operating system.
    pub placement_seed: Option<u64>,
    pub pose: PoseTrackerConfig,
    /// Bound on worker handshakes (snapshots, shutdown joins).
    pub command_timeout: Duration,
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tracks: bundled_ambience(),
            placement_seed: None,
            pose: PoseTrackerConfig::default(),
            command_timeout: Duration::from_secs(5),
            event_capacity: 256,
        }
    }
}
