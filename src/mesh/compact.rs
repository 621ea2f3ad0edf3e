use super::vertex::{IndexedMesh, MeshVertex, VertexKey};
use bevy::log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How [`compact`] finds duplicate vertices. Both produce identical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DedupStrategy {
    /// Linear scan of the unique vertices found so far. O(n²).
    #[default]
    Linear,
    /// Hash lookup on the vertex bit pattern. O(n).
    Hashed,
}

pub fn compact<V: MeshVertex>(mesh: &IndexedMesh<V>, strategy: DedupStrategy) -> IndexedMesh<V> {
    match strategy {
        DedupStrategy::Linear => compactify(mesh),
        DedupStrategy::Hashed => compactify_hashed(mesh),
    }
}

/// Deduplicates field-wise identical vertices.
///
/// Walks the vertex stream referenced by `mesh.indices`; each vertex reuses the
/// slot of the first earlier vertex equal to it, otherwise it is appended.
/// Unique vertices keep their first-seen order.
pub fn compactify<V: MeshVertex>(mesh: &IndexedMesh<V>) -> IndexedMesh<V> {
    let mut vertices: Vec<V> = Vec::new();
    let mut indices = Vec::with_capacity(mesh.indices.len());

    for &index in &mesh.indices {
        let vertex = mesh.vertices[index as usize];
        match vertices.iter().position(|unique| *unique == vertex) {
            Some(found) => indices.push(found as u32),
            None => {
                indices.push(vertices.len() as u32);
                vertices.push(vertex);
            }
        }
    }

    log_stats(mesh, &vertices);
    IndexedMesh { vertices, indices }
}

/// Same contract as [`compactify`] using a hash map keyed on
/// [`MeshVertex::bit_key`].
pub fn compactify_hashed<V: MeshVertex>(mesh: &IndexedMesh<V>) -> IndexedMesh<V> {
    let mut vertices: Vec<V> = Vec::new();
    let mut indices = Vec::with_capacity(mesh.indices.len());
    let mut slots: HashMap<VertexKey, u32> = HashMap::new();

    for &index in &mesh.indices {
        let vertex = mesh.vertices[index as usize];
        let next = vertices.len() as u32;
        let slot = match vertex.bit_key() {
            Some(key) => *slots.entry(key).or_insert(next),
            // NaN never equals anything, so it is always a new vertex.
            None => next,
        };
        if slot == next {
            vertices.push(vertex);
        }
        indices.push(slot);
    }

    log_stats(mesh, &vertices);
    IndexedMesh { vertices, indices }
}

fn log_stats<V>(input: &IndexedMesh<V>, compacted: &[V]) {
    let before = input.vertices.len();
    let after = compacted.len();
    let reduction = if before == 0 {
        0.0
    } else {
        (before as f32 - after as f32) / before as f32 * 100.0
    };
    info!(
        "Compacted {} indices: {} vertices -> {} unique ({:.1}% reduction)",
        input.indices.len(),
        before,
        after,
        reduction
    );
}
