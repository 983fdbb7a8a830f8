#![deny(clippy::wildcard_imports)]

pub mod anchor;
pub mod math;
pub mod provider;

pub use anchor::{AnchorEvent, AnchorId, Extent, SurfaceAnchor, SurfaceClass};
pub use math::{Mat4, Quat, Vec3};
pub use provider::ProviderState;
