use std::time::Instant;

use roomtone_core::{Mat4, ProviderState};

/// Device/world tracking collaborator. Sampling only happens while the
/// provider reports [`ProviderState::Running`]; a non-running provider
/// yields no sample for that tick, which is a skip, not an error.
pub trait WorldPoseProvider: Send + Sync + 'static {
    fn state(&self) -> ProviderState;

    /// Pose of the tracked device at `timestamp`, or `None` while the
    /// device is not tracked.
    fn query_pose(&self, timestamp: Instant) -> Option<Mat4>;
}

/// One orientation sample from the motion-sensor feed, as a row-major
/// rotation matrix in the sensor's attitude frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSample {
    pub rotation: [[f32; 3]; 3],
}

impl OrientationSample {
    pub fn identity() -> Self {
        Self {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Orientation matrix with the sample's rotation rows as columns.
    pub fn to_transform(self) -> Mat4 {
        Mat4::from_rotation_rows(self.rotation)
    }
}
