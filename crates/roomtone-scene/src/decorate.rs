//! Procedural decal placement on classified surfaces.
//!
//! Each classification carries a fixed multiset of decal variants. A
//! membership delta triggers a pass over that classification's bucket;
//! the per-container `decorated` guard makes the pass idempotent, and a
//! surface skipped for being too small is picked up again by the next
//! pass over the same bucket.

use rand::Rng;
use roomtone_core::{Extent, Mat4, Quat, SurfaceClass, Vec3};
use tracing::debug;

use crate::graph::{NodeId, SceneGraph};
use crate::reconcile::{AnchorReconciler, MembershipDelta};

/// Decoration variants, named for what they depict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecalKind {
    CeilingPatch,
    FloorStain,
    BootPrint,
    Splatter,
    FootPrint,
    Fingerprint,
}

/// Floors and walls below this extent on either planar axis are left
/// undecorated until they grow.
pub const MIN_DECORATED_EXTENT: f32 = 1.0;

/// Decals sit almost flush with the surface; the normal axis gets only
/// this much jitter in offset and scale.
const NORMAL_JITTER: f32 = 1.0e-4;

const CEILING_PATCH_COUNT: usize = 1;
const FLOOR_STAIN_COUNT: usize = 2;
const BOOT_PRINT_COUNT: usize = 5;
const FLOOR_SPLATTER_COUNT: usize = 8;
const FOOT_PRINT_COUNT: usize = 5;
const WALL_SPLATTER_COUNT: usize = 4;
const FINGERPRINT_COUNT: usize = 8;

pub struct DecorationEngine;

impl DecorationEngine {
    pub fn new() -> Self {
        Self
    }

    /// React to a membership delta: decorate every undecorated anchor in
    /// the delta's classification bucket. Returns the number of decal
    /// nodes placed.
    pub fn apply(
        &self,
        scene: &mut AnchorReconciler,
        delta: &MembershipDelta,
        rng: &mut impl Rng,
    ) -> usize {
        let candidates: Vec<_> = scene.bucket(delta.class).iter().copied().collect();
        let mut placed = 0;
        for id in candidates {
            let Some(site) = scene.site(id) else {
                continue;
            };
            if site.container.decorated {
                continue;
            }
            let parent = site.container.node;
            let extent = site.container.extent;
            let count = match delta.class {
                SurfaceClass::Ceiling => place_ceiling(site.graph, parent, extent, rng),
                SurfaceClass::Floor => {
                    if undersized(extent) {
                        continue;
                    }
                    place_floor(site.graph, parent, extent, rng)
                },
                SurfaceClass::Wall => {
                    if undersized(extent) {
                        continue;
                    }
                    place_wall(site.graph, parent, extent, rng)
                },
                SurfaceClass::Furniture | SurfaceClass::Other => continue,
            };
            site.container.decorated = true;
            debug!(anchor = %id, count, "decorated surface");
            placed += count;
        }
        placed
    }
}

impl Default for DecorationEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn undersized(extent: Extent) -> bool {
    extent.width < MIN_DECORATED_EXTENT || extent.height < MIN_DECORATED_EXTENT
}

fn place_ceiling(graph: &mut SceneGraph, parent: NodeId, extent: Extent, rng: &mut impl Rng) -> usize {
    let flip = Quat::from_axis_angle(Vec3::new(1.0, 0.0, 0.0), std::f32::consts::PI);
    for _ in 0..CEILING_PATCH_COUNT {
        spawn_decal(
            graph,
            parent,
            DecalKind::CeilingPatch,
            planar_offset(extent, rng),
            flip,
            Vec3::ONE,
        );
    }
    CEILING_PATCH_COUNT
}

fn place_floor(graph: &mut SceneGraph, parent: NodeId, extent: Extent, rng: &mut impl Rng) -> usize {
    for _ in 0..FLOOR_STAIN_COUNT {
        let side = rng.random_range(0.05..0.40);
        spawn_decal(
            graph,
            parent,
            DecalKind::FloorStain,
            planar_offset(extent, rng),
            Quat::IDENTITY,
            flat_scale(side, rng),
        );
    }
    for _ in 0..BOOT_PRINT_COUNT {
        spawn_decal(
            graph,
            parent,
            DecalKind::BootPrint,
            planar_offset(extent, rng),
            random_yaw(rng),
            print_scale(rng),
        );
    }
    for _ in 0..FLOOR_SPLATTER_COUNT {
        let side = rng.random_range(0.01..0.15);
        spawn_decal(
            graph,
            parent,
            DecalKind::Splatter,
            planar_offset(extent, rng),
            random_yaw(rng),
            flat_scale(side, rng),
        );
    }
    for _ in 0..FOOT_PRINT_COUNT {
        spawn_decal(
            graph,
            parent,
            DecalKind::FootPrint,
            planar_offset(extent, rng),
            random_yaw(rng),
            print_scale(rng),
        );
    }
    FLOOR_STAIN_COUNT + BOOT_PRINT_COUNT + FLOOR_SPLATTER_COUNT + FOOT_PRINT_COUNT
}

fn place_wall(graph: &mut SceneGraph, parent: NodeId, extent: Extent, rng: &mut impl Rng) -> usize {
    for _ in 0..WALL_SPLATTER_COUNT {
        let side = rng.random_range(0.01..0.25);
        spawn_decal(
            graph,
            parent,
            DecalKind::Splatter,
            planar_offset(extent, rng),
            Quat::IDENTITY,
            flat_scale(side, rng),
        );
    }
    for _ in 0..FINGERPRINT_COUNT {
        let side = rng.random_range(0.20..0.25);
        spawn_decal(
            graph,
            parent,
            DecalKind::Fingerprint,
            planar_offset(extent, rng),
            Quat::IDENTITY,
            flat_scale(side, rng),
        );
    }
    WALL_SPLATTER_COUNT + FINGERPRINT_COUNT
}

fn spawn_decal(
    graph: &mut SceneGraph,
    parent: NodeId,
    kind: DecalKind,
    offset: Vec3,
    rotation: Quat,
    scale: Vec3,
) {
    let node = graph.spawn(parent, Mat4::from_trs(offset, rotation, scale));
    if let Some(scene_node) = graph.node_mut(node) {
        scene_node.decal = Some(kind);
    }
}

/// Uniform offset within the anchor's planar bounds, near-flush on the
/// normal axis.
fn planar_offset(extent: Extent, rng: &mut impl Rng) -> Vec3 {
    Vec3::new(
        symmetric(extent.width / 2.0, rng),
        symmetric(NORMAL_JITTER, rng),
        symmetric(extent.height / 2.0, rng),
    )
}

fn symmetric(half: f32, rng: &mut impl Rng) -> f32 {
    if half > 0.0 {
        rng.random_range(-half..half)
    } else {
        0.0
    }
}

fn random_yaw(rng: &mut impl Rng) -> Quat {
    Quat::from_yaw(rng.random_range(0.0..std::f32::consts::PI))
}

/// Uniform planar scale, flattened on the normal axis.
fn flat_scale(side: f32, rng: &mut impl Rng) -> Vec3 {
    Vec3::new(side, symmetric(NORMAL_JITTER, rng), side)
}

/// Boot and foot prints keep a fixed footprint aspect.
fn print_scale(rng: &mut impl Rng) -> Vec3 {
    Vec3::new(0.25, symmetric(NORMAL_JITTER, rng), 0.5)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use roomtone_core::{AnchorEvent, AnchorId, Extent, Mat4, SurfaceAnchor, SurfaceClass};

    use super::{DecalKind, DecorationEngine};
    use crate::reconcile::AnchorReconciler;

    fn added(id: u64, class: SurfaceClass, extent: Extent) -> AnchorEvent {
        AnchorEvent::Added(SurfaceAnchor::new(
            AnchorId(id),
            class,
            Mat4::IDENTITY,
            extent,
        ))
    }

    fn decal_kinds(reconciler: &AnchorReconciler, id: AnchorId) -> Vec<DecalKind> {
        let node = reconciler.node_id(id).expect("anchor node exists");
        let graph = reconciler.graph();
        graph
            .node(node)
            .expect("anchor node exists")
            .children()
            .iter()
            .filter_map(|child| graph.node(*child).and_then(|n| n.decal))
            .collect()
    }

    fn count_kind(kinds: &[DecalKind], kind: DecalKind) -> usize {
        kinds.iter().filter(|k| **k == kind).count()
    }

    #[test]
    fn ceiling_gets_a_single_flipped_patch() {
        let mut reconciler = AnchorReconciler::new();
        let engine = DecorationEngine::new();
        let mut rng = SmallRng::seed_from_u64(11);

        let delta = reconciler
            .consume(added(1, SurfaceClass::Ceiling, Extent::new(3.0, 3.0)))
            .expect("ceiling joins");
        let placed = engine.apply(&mut reconciler, &delta, &mut rng);

        assert_eq!(placed, 1);
        let kinds = decal_kinds(&reconciler, AnchorId(1));
        assert_eq!(kinds, vec![DecalKind::CeilingPatch]);
        assert!(reconciler.container(AnchorId(1)).expect("container").decorated);
    }

    #[test]
    fn floor_multiset_counts_match_the_fixed_table() {
        let mut reconciler = AnchorReconciler::new();
        let engine = DecorationEngine::new();
        let mut rng = SmallRng::seed_from_u64(7);

        let delta = reconciler
            .consume(added(2, SurfaceClass::Floor, Extent::new(4.0, 5.0)))
            .expect("floor joins");
        let placed = engine.apply(&mut reconciler, &delta, &mut rng);

        assert_eq!(placed, 20);
        let kinds = decal_kinds(&reconciler, AnchorId(2));
        assert_eq!(count_kind(&kinds, DecalKind::FloorStain), 2);
        assert_eq!(count_kind(&kinds, DecalKind::BootPrint), 5);
        assert_eq!(count_kind(&kinds, DecalKind::Splatter), 8);
        assert_eq!(count_kind(&kinds, DecalKind::FootPrint), 5);
    }

    #[test]
    fn wall_multiset_counts_match_the_fixed_table() {
        let mut reconciler = AnchorReconciler::new();
        let engine = DecorationEngine::new();
        let mut rng = SmallRng::seed_from_u64(13);

        let delta = reconciler
            .consume(added(3, SurfaceClass::Wall, Extent::new(6.0, 2.5)))
            .expect("wall joins");
        let placed = engine.apply(&mut reconciler, &delta, &mut rng);

        assert_eq!(placed, 12);
        let kinds = decal_kinds(&reconciler, AnchorId(3));
        assert_eq!(count_kind(&kinds, DecalKind::Splatter), 4);
        assert_eq!(count_kind(&kinds, DecalKind::Fingerprint), 8);
    }

    #[test]
    fn decal_offsets_stay_within_half_extent_bounds() {
        let mut reconciler = AnchorReconciler::new();
        let engine = DecorationEngine::new();
        let mut rng = SmallRng::seed_from_u64(29);
        let extent = Extent::new(2.0, 6.0);

        let delta = reconciler
            .consume(added(4, SurfaceClass::Floor, extent))
            .expect("floor joins");
        engine.apply(&mut reconciler, &delta, &mut rng);

        let node = reconciler.node_id(AnchorId(4)).expect("node exists");
        let graph = reconciler.graph();
        for child in graph.node(node).expect("node exists").children() {
            let offset = graph.node(*child).expect("decal exists").transform.translation();
            assert!(offset.x.abs() <= extent.width / 2.0, "x offset {} out of bounds", offset.x);
            assert!(offset.z.abs() <= extent.height / 2.0, "z offset {} out of bounds", offset.z);
            assert!(offset.y.abs() <= 1.0e-4, "normal offset {} not flush", offset.y);
        }
    }

    #[test]
    fn print_and_stain_scales_follow_their_documented_ranges() {
        let mut reconciler = AnchorReconciler::new();
        let engine = DecorationEngine::new();
        let mut rng = SmallRng::seed_from_u64(3);

        let delta = reconciler
            .consume(added(5, SurfaceClass::Floor, Extent::new(3.0, 3.0)))
            .expect("floor joins");
        engine.apply(&mut reconciler, &delta, &mut rng);

        let node = reconciler.node_id(AnchorId(5)).expect("node exists");
        let graph = reconciler.graph();
        for child in graph.node(node).expect("node exists").children() {
            let decal = graph.node(*child).expect("decal exists");
            let scale = decal.transform.basis_scale();
            match decal.decal.expect("decal kind set") {
                DecalKind::FloorStain => {
                    assert!((0.05..0.40).contains(&scale.x));
                    assert!((scale.x - scale.z).abs() < 1e-6);
                },
                DecalKind::BootPrint | DecalKind::FootPrint => {
                    assert!((scale.x - 0.25).abs() < 1e-5);
                    assert!((scale.z - 0.5).abs() < 1e-5);
                },
                DecalKind::Splatter => {
                    assert!((0.01..0.15).contains(&scale.x));
                },
                kind => panic!("unexpected decal kind on floor: {kind:?}"),
            }
            assert!(scale.y.abs() <= 1.0e-4);
        }
    }

    #[test]
    fn second_pass_over_a_decorated_anchor_adds_zero_children() {
        let mut reconciler = AnchorReconciler::new();
        let engine = DecorationEngine::new();
        let mut rng = SmallRng::seed_from_u64(5);

        let delta = reconciler
            .consume(added(6, SurfaceClass::Wall, Extent::new(4.0, 4.0)))
            .expect("wall joins");
        engine.apply(&mut reconciler, &delta, &mut rng);
        let before = decal_kinds(&reconciler, AnchorId(6)).len();

        let placed = engine.apply(&mut reconciler, &delta, &mut rng);

        assert_eq!(placed, 0);
        assert_eq!(decal_kinds(&reconciler, AnchorId(6)).len(), before);
    }

    #[test]
    fn undersized_floor_is_skipped_then_decorated_after_growth() {
        let mut reconciler = AnchorReconciler::new();
        let engine = DecorationEngine::new();
        let mut rng = SmallRng::seed_from_u64(17);

        let delta = reconciler
            .consume(added(7, SurfaceClass::Floor, Extent::new(0.5, 0.5)))
            .expect("floor joins");
        let placed = engine.apply(&mut reconciler, &delta, &mut rng);
        assert_eq!(placed, 0);
        assert!(!reconciler.container(AnchorId(7)).expect("container").decorated);

        // The surface grows, then another floor anchor joins and triggers
        // a fresh pass over the bucket.
        reconciler.consume(AnchorEvent::Updated(SurfaceAnchor::new(
            AnchorId(7),
            SurfaceClass::Floor,
            Mat4::IDENTITY,
            Extent::new(2.0, 2.0),
        )));
        let delta = reconciler
            .consume(added(8, SurfaceClass::Floor, Extent::new(0.5, 0.5)))
            .expect("second floor joins");
        let placed = engine.apply(&mut reconciler, &delta, &mut rng);

        assert_eq!(placed, 20);
        assert!(reconciler.container(AnchorId(7)).expect("container").decorated);
        assert!(!reconciler.container(AnchorId(8)).expect("container").decorated);
    }

    #[test]
    fn furniture_surfaces_are_never_decorated() {
        let mut reconciler = AnchorReconciler::new();
        let engine = DecorationEngine::new();
        let mut rng = SmallRng::seed_from_u64(23);

        let delta = reconciler
            .consume(added(9, SurfaceClass::Furniture, Extent::new(3.0, 3.0)))
            .expect("furniture joins");
        let placed = engine.apply(&mut reconciler, &delta, &mut rng);

        assert_eq!(placed, 0);
        assert!(!reconciler.container(AnchorId(9)).expect("container").decorated);
    }
}
