// src/scene/parser/blocks.rs

use super::helpers::*;
use super::{AnimationStackBlock, ClusterBlock, MeshBlock, NodeBlock, SkinBlock};
use crate::animation::MAX_DURATION;
use crate::scene::accessor::{
    DeformerCapabilities, Material, SkeletonRole, TimeSpan, UvLayer, UvReferenceMode,
};
use crate::scene::error::{ImportError, Result};
use crate::scene::types::{LocalTransform, NodeAnimationCurve};
use bevy::log::debug;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

pub fn parse_node_fields(cursor: &mut Cursor<&[u8]>, block_index: u32) -> Result<NodeBlock> {
    let name = read_string(cursor)?;
    let parent = read_link(cursor)?;
    let role = match cursor.read_u8()? {
        0 => None,
        raw => Some(SkeletonRole::try_from(raw).map_err(|bad| {
            ImportError::InvalidData(format!(
                "Node block {}: unknown skeleton role {}",
                block_index, bad
            ))
        })?),
    };
    let mesh = read_link(cursor)?;
    let materials = read_link_list(cursor)?;
    let local = LocalTransform {
        translation: read_vector3(cursor)?,
        rotation: read_quaternion(cursor)?,
        scale: read_vector3(cursor)?,
    };
    let curve = NodeAnimationCurve {
        rotations: read_keys(cursor, "Rotation key", read_quaternion)?,
        translations: read_keys(cursor, "Translation key", read_vector3)?,
        scales: read_keys(cursor, "Scale key", read_vector3)?,
    };
    debug!("Parsed node block {} '{}'", block_index, name);
    Ok(NodeBlock {
        name,
        parent,
        role,
        mesh,
        materials,
        local,
        curve,
    })
}

pub fn parse_mesh_fields(cursor: &mut Cursor<&[u8]>, block_index: u32) -> Result<MeshBlock> {
    let control_points = read_list(cursor, "Control point", read_vector3)?;
    let polygon_vertices = read_u32_list(cursor, "Polygon vertex")?;
    let normals = read_list(cursor, "Normal", read_vector3)?;
    let uv_layers = read_list(cursor, "UV layer", |c| parse_uv_layer(c, block_index))?;
    let deformers = read_link_list(cursor)?;

    if let Some(bad) = polygon_vertices
        .iter()
        .find(|index| **index as usize >= control_points.len())
    {
        return Err(ImportError::InvalidData(format!(
            "Mesh block {}: polygon vertex {} is out of range ({} control points)",
            block_index,
            bad,
            control_points.len()
        )));
    }
    if normals.len() != polygon_vertices.len() {
        return Err(ImportError::InvalidData(format!(
            "Mesh block {}: {} normals for {} polygon vertices",
            block_index,
            normals.len(),
            polygon_vertices.len()
        )));
    }
    for layer in &uv_layers {
        check_uv_layer(layer, polygon_vertices.len(), block_index)?;
    }
    debug!(
        "Parsed mesh block {}: {} control points, {} polygon vertices",
        block_index,
        control_points.len(),
        polygon_vertices.len()
    );
    Ok(MeshBlock {
        control_points,
        polygon_vertices,
        normals,
        uv_layers,
        deformers,
    })
}

fn parse_uv_layer(cursor: &mut Cursor<&[u8]>, block_index: u32) -> Result<UvLayer> {
    let name = read_string(cursor)?;
    let reference_mode = match cursor.read_u8()? {
        0 => UvReferenceMode::Direct,
        1 => UvReferenceMode::IndexToDirect,
        other => {
            return Err(ImportError::InvalidData(format!(
                "Mesh block {}: UV layer '{}' has unknown reference mode {}",
                block_index, name, other
            )));
        }
    };
    let direct = read_list(cursor, "UV", read_vector2)?;
    let indices = read_u32_list(cursor, "UV index")?;
    Ok(UvLayer {
        name,
        reference_mode,
        direct,
        indices,
    })
}

/// Every polygon-vertex must resolve to a UV in the layer's direct array.
fn check_uv_layer(layer: &UvLayer, polygon_vertex_count: usize, block_index: u32) -> Result<()> {
    let (kind, len) = match layer.reference_mode {
        UvReferenceMode::Direct => ("direct UVs", layer.direct.len()),
        UvReferenceMode::IndexToDirect => ("UV indices", layer.indices.len()),
    };
    if len != polygon_vertex_count {
        return Err(ImportError::InvalidData(format!(
            "Mesh block {}: UV layer '{}' has {} {} for {} polygon vertices",
            block_index, layer.name, len, kind, polygon_vertex_count
        )));
    }
    if layer.reference_mode == UvReferenceMode::IndexToDirect {
        if let Some(bad) = layer
            .indices
            .iter()
            .find(|index| **index as usize >= layer.direct.len())
        {
            return Err(ImportError::InvalidData(format!(
                "Mesh block {}: UV layer '{}' index {} is out of range ({} UVs)",
                block_index,
                layer.name,
                bad,
                layer.direct.len()
            )));
        }
    }
    Ok(())
}

pub fn parse_skin_fields(cursor: &mut Cursor<&[u8]>, block_index: u32) -> Result<SkinBlock> {
    let capabilities = DeformerCapabilities::from_bits_retain(cursor.read_u32::<LittleEndian>()?);
    let clusters = read_list(cursor, "Cluster", |c| {
        let link = read_link(c)?;
        let control_point_indices = read_u32_list(c, "Cluster index")?;
        let weights = read_f32_list(c, "Cluster weight")?;
        if weights.len() != control_point_indices.len() {
            return Err(ImportError::InvalidData(format!(
                "Skin block {}: cluster has {} indices but {} weights",
                block_index,
                control_point_indices.len(),
                weights.len()
            )));
        }
        Ok(ClusterBlock {
            link,
            control_point_indices,
            weights,
        })
    })?;
    Ok(SkinBlock {
        capabilities,
        clusters,
    })
}

pub fn parse_material_fields(cursor: &mut Cursor<&[u8]>, _block_index: u32) -> Result<Material> {
    let name = read_string(cursor)?;
    let diffuse_textures = read_string_list(cursor, "Texture")?;
    let layered_textures = read_list(cursor, "Layered texture", |c| {
        read_string_list(c, "Texture layer")
    })?;
    Ok(Material {
        name,
        diffuse_textures,
        layered_textures,
    })
}

pub fn parse_animation_stack_fields(
    cursor: &mut Cursor<&[u8]>,
    block_index: u32,
) -> Result<AnimationStackBlock> {
    let name = read_string(cursor)?;
    let start = cursor.read_f64::<LittleEndian>()?;
    let stop = cursor.read_f64::<LittleEndian>()?;
    if !start.is_finite() || !stop.is_finite() {
        return Err(ImportError::InvalidData(format!(
            "Animation stack block {} '{}': span {}..{} is not finite",
            block_index, name, start, stop
        )));
    }
    if stop < start {
        return Err(ImportError::InvalidData(format!(
            "Animation stack block {} '{}': stop {} precedes start {}",
            block_index, name, stop, start
        )));
    }
    if stop - start > MAX_DURATION {
        return Err(ImportError::InvalidData(format!(
            "Animation stack block {} '{}': span of {}s exceeds {}s",
            block_index,
            name,
            stop - start,
            MAX_DURATION
        )));
    }
    Ok(AnimationStackBlock {
        name,
        span: TimeSpan { start, stop },
    })
}
