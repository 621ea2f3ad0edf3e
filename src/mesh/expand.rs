use super::vertex::{IndexedMesh, SimpleVertex};
use crate::scene::accessor::{MeshId, SceneAccessor};
use crate::scene::error::{ImportError, Result};
use bevy::log::{debug, warn};
use bevy::math::{Vec2, Vec3};

/// Unindexes `mesh` into one vertex per polygon-vertex.
///
/// Positions are looked up through the polygon index array and multiplied by
/// `scale`. Normals and UVs are already stored per polygon-vertex and are taken
/// by position in the stream; UVs come from the first UV set with V flipped to
/// `1 - v`. The returned indices are `0..N`.
pub fn expand_mesh<S: SceneAccessor + ?Sized>(
    scene: &S,
    mesh: MeshId,
    scale: f32,
) -> Result<IndexedMesh<SimpleVertex>> {
    let control_points: Vec<Vec3> = scene
        .control_points(mesh)
        .iter()
        .map(|point| *point * scale)
        .collect();
    let polygon_vertices = scene.polygon_vertices(mesh);
    let normals = scene.polygon_vertex_normals(mesh);
    let uv_layer = scene
        .uv_set_names(mesh)
        .first()
        .and_then(|name| scene.uv_layer(mesh, name));

    if normals.len() != polygon_vertices.len() {
        warn!(
            "Mesh has {} normals for {} polygon vertices; missing normals are zero",
            normals.len(),
            polygon_vertices.len()
        );
    }
    if uv_layer.is_none() {
        warn!("Mesh has no UV set; texture coordinates are zero");
    }

    let mut vertices = Vec::with_capacity(polygon_vertices.len());
    for (j, &point_index) in polygon_vertices.iter().enumerate() {
        let position = *control_points.get(point_index as usize).ok_or_else(|| {
            ImportError::InvalidData(format!(
                "Polygon vertex {} references control point {} of {}",
                j,
                point_index,
                control_points.len()
            ))
        })?;
        let normal = normals.get(j).copied().unwrap_or(Vec3::ZERO);
        let uv = uv_layer
            .and_then(|layer| layer.uv_at(j))
            .map(|uv| Vec2::new(uv.x, 1.0 - uv.y))
            .unwrap_or(Vec2::ZERO);
        vertices.push(SimpleVertex {
            position,
            normal,
            uv,
        });
    }

    debug!(
        "Expanded {} control points into {} vertices",
        control_points.len(),
        vertices.len()
    );
    Ok(IndexedMesh {
        indices: (0..vertices.len() as u32).collect(),
        vertices,
    })
}
