#![deny(clippy::wildcard_imports)]

pub mod decorate;
pub mod graph;
pub mod reconcile;
pub mod worker;

pub use decorate::{DecalKind, DecorationEngine, MIN_DECORATED_EXTENT};
pub use graph::{NodeId, SceneGraph, SceneNode};
pub use reconcile::{AnchorReconciler, DecorContainer, DecorSite, MembershipDelta};
pub use worker::{
    SceneEvent, SceneEventCallback, SceneSnapshot, SurfaceFeed, SurfaceWorker, SurfaceWorkerConfig,
    SurfaceWorkerError,
};
