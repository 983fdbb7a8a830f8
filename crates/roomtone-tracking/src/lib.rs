#![deny(clippy::wildcard_imports)]

pub mod provider;
pub mod tracker;

pub use provider::{OrientationSample, WorldPoseProvider};
pub use tracker::{ListenerPose, MotionFeed, PoseTracker, PoseTrackerConfig, PoseTrackerError};
