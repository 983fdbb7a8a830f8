use serde::{Deserialize, Serialize};

use crate::math::Mat4;

/// Stable identifier assigned by the surface-detection provider. The same
/// id is carried across the added/updated/removed lifetime of one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorId(pub u64);

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "anchor-{}", self.0)
    }
}

/// Surface category reported by the detection provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceClass {
    Ceiling,
    Wall,
    Floor,
    Furniture,
    Other,
}

/// Planar extent of a detected surface, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

impl Extent {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A tracked physical surface: identity, category, pose, and extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceAnchor {
    pub id: AnchorId,
    pub class: SurfaceClass,
    pub transform: Mat4,
    pub extent: Extent,
}

impl SurfaceAnchor {
    pub fn new(id: AnchorId, class: SurfaceClass, transform: Mat4, extent: Extent) -> Self {
        Self {
            id,
            class,
            transform,
            extent,
        }
    }
}

/// One entry of the ordered surface-detection stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorEvent {
    Added(SurfaceAnchor),
    Updated(SurfaceAnchor),
    Removed(AnchorId),
}

impl AnchorEvent {
    pub fn anchor_id(&self) -> AnchorId {
        match self {
            Self::Added(anchor) | Self::Updated(anchor) => anchor.id,
            Self::Removed(id) => *id,
        }
    }
}
