use crate::mesh::vertex::{IndexedMesh, SimpleVertex, SkinnedVertex};
use crate::scene::accessor::{MeshId, SceneAccessor};
use crate::skeleton::{Joint, find_skin, joint_index};
use bevy::log::debug;

pub const MAX_INFLUENCES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Influence {
    pub weight: f32,
    pub joint_index: u32,
}

/// The retained influences of one vertex. Unused slots are `{0.0, 0}`.
pub type InfluenceSet = [Influence; MAX_INFLUENCES];

/// One [`InfluenceSet`] per polygon-vertex.
pub type InfluenceBuffer = Vec<InfluenceSet>;

/// Bounded insertion of `candidate` into `set`.
///
/// Walks the slots in order carrying a value; whenever a slot is lighter than
/// the carried value the two swap. Whatever is still carried after slot 3
/// falls off. Slot order is purely the result of that swap sequence: equal
/// weights keep arrival order, and a weight that is not positive never
/// displaces an empty slot. The set is never re-sorted afterwards.
pub fn insert_influence(set: &mut InfluenceSet, candidate: Influence) {
    let mut carried = candidate;
    for slot in set.iter_mut() {
        if slot.weight < carried.weight {
            std::mem::swap(slot, &mut carried);
        }
    }
}

/// Resolves the four strongest joint influences of every polygon-vertex of
/// `mesh`.
///
/// Influences are first gathered per control point from every cluster of the
/// mesh's skin, then copied out along the polygon-vertex index array.
/// Weights are taken as stored; the retained four are not renormalized.
///
/// # Panics
/// If the mesh has no skin deformer, if a cluster is linked to a node that is
/// not in `joints`, or if an index points past the control points.
pub fn resolve_influences<S: SceneAccessor + ?Sized>(
    scene: &S,
    mesh: MeshId,
    joints: &[Joint],
) -> InfluenceBuffer {
    let Some(skin) = find_skin(scene, mesh) else {
        panic!("influence resolution requires a skinned mesh");
    };
    let control_point_count = scene.control_points(mesh).len();
    let mut per_control_point: Vec<InfluenceSet> = vec![InfluenceSet::default(); control_point_count];

    for cluster in &skin.clusters {
        let Some(joint) = joint_index(joints, cluster.link) else {
            panic!(
                "cluster linked to '{}' which is not a joint of the skeleton",
                scene.node_name(cluster.link)
            );
        };
        for (&control_point, &weight) in cluster.control_point_indices.iter().zip(&cluster.weights) {
            let set = per_control_point
                .get_mut(control_point as usize)
                .unwrap_or_else(|| {
                    panic!(
                        "cluster control point {control_point} out of range ({control_point_count} control points)"
                    )
                });
            insert_influence(
                set,
                Influence {
                    weight,
                    joint_index: joint as u32,
                },
            );
        }
    }

    let buffer: InfluenceBuffer = scene
        .polygon_vertices(mesh)
        .iter()
        .map(|&control_point| per_control_point[control_point as usize])
        .collect();
    debug!(
        "Resolved influences for {} polygon-vertices from {} clusters",
        buffer.len(),
        skin.clusters.len()
    );
    buffer
}

/// Turns an expanded mesh into a skinned one, vertex `i` taking
/// `influences[i]`.
///
/// # Panics
/// If the mesh is not the expanded form (one vertex per influence set).
pub fn apply_influences(
    mesh: IndexedMesh<SimpleVertex>,
    influences: &[InfluenceSet],
) -> IndexedMesh<SkinnedVertex> {
    assert_eq!(
        mesh.vertices.len(),
        influences.len(),
        "influences must be applied to the expanded vertex stream"
    );
    let mut sets = influences.iter();
    mesh.map_vertices(|vertex| {
        let mut skinned = SkinnedVertex::from(vertex);
        if let Some(set) = sets.next() {
            skinned.weights = set.map(|influence| influence.weight);
            skinned.indices = set.map(|influence| influence.joint_index);
        }
        skinned
    })
}
