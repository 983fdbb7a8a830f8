use serde::{Deserialize, Serialize};

use roomtone_core::Vec3;

/// Default direct-path send level when a descriptor leaves it unset.
pub const DEFAULT_SEND_LEVEL: f32 = 0.1;
/// Late-reverb send level; fixed for every spatial pipeline.
pub const LATE_REVERB_SEND: f32 = 0.1;
/// Default fade-out start distance for bundled sources, in meters.
pub const DEFAULT_CULL_DISTANCE: f32 = 1200.0;
/// Default geometric-spreading rolloff for bundled sources.
pub const DEFAULT_ROLLOFF_FACTOR: f32 = 1.0;

/// The live-capture path uses a much tighter distance model and a hotter
/// calibration level than bundled files.
pub const CAPTURE_CULL_DISTANCE: f32 = 10.0;
pub const CAPTURE_ROLLOFF_FACTOR: f32 = 0.25;
pub const CAPTURE_CALIBRATION_LEVEL: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    #[default]
    Loop,
    OneShot,
}

/// Global reverb character applied by the engine; a single value shared by
/// every pipeline, last writer wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReverbPreset {
    None,
    SmallRoom,
    #[default]
    MediumRoom,
    LargeRoom,
    LargeChamber,
    Cathedral,
}

/// Policy for sources that fall entirely outside the audible range.
/// Sleeping trades CPU for resume latency when the listener comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullBehavior {
    #[default]
    SleepWake,
    KeepAlive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationMode {
    RelativeSpl { level: f32 },
}

impl Default for CalibrationMode {
    fn default() -> Self {
        Self::RelativeSpl { level: 1.0 }
    }
}

/// Geometric-spreading attenuation: gain falls with `rolloff_factor` and
/// fades out entirely past `cull_distance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceModelConfig {
    pub rolloff_factor: f32,
    pub cull_distance: f32,
}

impl Default for DistanceModelConfig {
    fn default() -> Self {
        Self {
            rolloff_factor: DEFAULT_ROLLOFF_FACTOR,
            cull_distance: DEFAULT_CULL_DISTANCE,
        }
    }
}

/// Directional routing for one spatial mixer: direct-path and late-reverb
/// category sends plus the distance model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialPipelineConfig {
    pub direct_path_send: f32,
    pub late_reverb_send: f32,
    pub reverb: ReverbPreset,
    pub distance: DistanceModelConfig,
}

/// Sampler node bound to a mixer: which asset it plays and how.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerNodeConfig {
    pub asset_identifier: String,
    pub playback_mode: PlaybackMode,
    pub calibration: CalibrationMode,
    pub cull: CullBehavior,
}

/// One playable source: where it sits, how loud it sends, and how it is
/// attenuated. Descriptor-level rolloff/cull let the bundled and capture
/// paths coexist without hard-coded constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundSourceDescriptor {
    pub url: String,
    pub location: Vec3,
    #[serde(default = "default_send_level")]
    pub send_level: f32,
    #[serde(default = "default_cull_distance")]
    pub cull_distance: f32,
    #[serde(default = "default_rolloff_factor")]
    pub rolloff_factor: f32,
    #[serde(default)]
    pub playback_mode: PlaybackMode,
    #[serde(default = "default_calibration_level")]
    pub calibration_level: f32,
}

fn default_send_level() -> f32 {
    DEFAULT_SEND_LEVEL
}

fn default_cull_distance() -> f32 {
    DEFAULT_CULL_DISTANCE
}

fn default_rolloff_factor() -> f32 {
    DEFAULT_ROLLOFF_FACTOR
}

fn default_calibration_level() -> f32 {
    1.0
}

impl SoundSourceDescriptor {
    pub fn new(url: impl Into<String>, location: Vec3) -> Self {
        Self {
            url: url.into(),
            location,
            send_level: DEFAULT_SEND_LEVEL,
            cull_distance: DEFAULT_CULL_DISTANCE,
            rolloff_factor: DEFAULT_ROLLOFF_FACTOR,
            playback_mode: PlaybackMode::default(),
            calibration_level: 1.0,
        }
    }

    pub fn with_send_level(mut self, send_level: f32) -> Self {
        self.send_level = send_level;
        self
    }

    pub fn with_playback_mode(mut self, playback_mode: PlaybackMode) -> Self {
        self.playback_mode = playback_mode;
        self
    }

    pub fn with_cull_distance(mut self, cull_distance: f32) -> Self {
        self.cull_distance = cull_distance;
        self
    }

    /// Descriptor for the live-capture path: one-shot playback of an
    /// in-memory buffer, tight cull radius, shallow rolloff.
    pub fn capture(location: Vec3) -> Self {
        Self {
            url: String::new(),
            location,
            send_level: DEFAULT_SEND_LEVEL,
            cull_distance: CAPTURE_CULL_DISTANCE,
            rolloff_factor: CAPTURE_ROLLOFF_FACTOR,
            playback_mode: PlaybackMode::OneShot,
            calibration_level: CAPTURE_CALIBRATION_LEVEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use roomtone_core::Vec3;

    use super::{PlaybackMode, SoundSourceDescriptor};

    #[test]
    fn descriptor_defaults_match_the_bundled_path() {
        let descriptor = SoundSourceDescriptor::new("surf.wav", Vec3::ZERO);
        assert_eq!(descriptor.send_level, 0.1);
        assert_eq!(descriptor.cull_distance, 1200.0);
        assert_eq!(descriptor.rolloff_factor, 1.0);
        assert_eq!(descriptor.playback_mode, PlaybackMode::Loop);
    }

    #[test]
    fn capture_descriptor_uses_the_tight_distance_model() {
        let descriptor = SoundSourceDescriptor::capture(Vec3::ZERO);
        assert_eq!(descriptor.cull_distance, 10.0);
        assert_eq!(descriptor.rolloff_factor, 0.25);
        assert_eq!(descriptor.playback_mode, PlaybackMode::OneShot);
        assert_eq!(descriptor.calibration_level, 3.0);
    }

    #[test]
    fn descriptor_deserializes_with_defaults_filled_in() {
        let descriptor: SoundSourceDescriptor = serde_json::from_str(
            r#"{"url":"wind_grass.wav","location":{"x":0.0,"y":0.1,"z":0.0},"send_level":0.02}"#,
        )
        .expect("descriptor parses");
        assert_eq!(descriptor.send_level, 0.02);
        assert_eq!(descriptor.cull_distance, 1200.0);
        assert_eq!(descriptor.playback_mode, PlaybackMode::Loop);
    }
}
