//! Serializes a [`MemoryScene`] into the `.skscene` block container.
//!
//! Block order is nodes, meshes, one skin block per deformer, materials and
//! finally the animation stack, so every link can be computed up front.

use super::accessor::{TimeSpan, UvLayer, UvReferenceMode};
use super::error::Result;
use super::parser::{
    ANIMATION_STACK_BLOCK, FILE_VERSION, HEADER_LINE, MATERIAL_BLOCK, MESH_BLOCK, NODE_BLOCK,
    SKIN_BLOCK,
};
use super::types::{MemoryScene, SceneNode};
use bevy::math::{Quat, Vec2, Vec3};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

pub fn write_scene<W: Write>(scene: &MemoryScene, writer: &mut W) -> Result<()> {
    let node_count = scene.nodes().len();
    let mesh_count = scene.meshes().len();
    let skin_count: usize = scene.meshes().iter().map(|m| m.deformers.len()).sum();
    let material_base = node_count + mesh_count + skin_count;
    let has_stack = scene.animation_stack().is_some();
    let num_blocks = material_base + scene.materials().len() + usize::from(has_stack);

    writer.write_all(HEADER_LINE.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.write_u32::<LittleEndian>(FILE_VERSION)?;
    writer.write_u32::<LittleEndian>(num_blocks as u32)?;

    for node in scene.nodes() {
        write_string(writer, NODE_BLOCK)?;
        write_node_fields(writer, node, node_count, material_base)?;
    }

    let mut skin_block = node_count + mesh_count;
    for mesh in scene.meshes() {
        write_string(writer, MESH_BLOCK)?;
        write_list(writer, &mesh.control_points, |w, v| write_vector3(w, *v))?;
        write_list(writer, &mesh.polygon_vertices, |w, i| {
            Ok(w.write_u32::<LittleEndian>(*i)?)
        })?;
        write_list(writer, &mesh.normals, |w, v| write_vector3(w, *v))?;
        write_list(writer, &mesh.uv_layers, write_uv_layer)?;
        let links: Vec<i32> = (skin_block..skin_block + mesh.deformers.len())
            .map(|link| link as i32)
            .collect();
        write_list(writer, &links, |w, link| Ok(w.write_i32::<LittleEndian>(*link)?))?;
        skin_block += mesh.deformers.len();
    }

    for deformer in scene.meshes().iter().flat_map(|m| m.deformers.iter()) {
        write_string(writer, SKIN_BLOCK)?;
        writer.write_u32::<LittleEndian>(deformer.capabilities.bits())?;
        write_list(writer, &deformer.clusters, |w, cluster| {
            w.write_i32::<LittleEndian>(cluster.link.0 as i32)?;
            write_list(w, &cluster.control_point_indices, |w, i| {
                Ok(w.write_u32::<LittleEndian>(*i)?)
            })?;
            write_list(w, &cluster.weights, |w, weight| {
                Ok(w.write_f32::<LittleEndian>(*weight)?)
            })
        })?;
    }

    for material in scene.materials() {
        write_string(writer, MATERIAL_BLOCK)?;
        write_string(writer, &material.name)?;
        write_list(writer, &material.diffuse_textures, |w, s| write_string(w, s))?;
        write_list(writer, &material.layered_textures, |w, layer| {
            write_list(w, layer, |w, s| write_string(w, s))
        })?;
    }

    if let Some(TimeSpan { start, stop }) = scene.animation_stack() {
        write_string(writer, ANIMATION_STACK_BLOCK)?;
        write_string(writer, "Take 001")?;
        writer.write_f64::<LittleEndian>(start)?;
        writer.write_f64::<LittleEndian>(stop)?;
    }
    Ok(())
}

fn write_node_fields<W: Write>(
    writer: &mut W,
    node: &SceneNode,
    node_count: usize,
    material_base: usize,
) -> Result<()> {
    write_string(writer, &node.name)?;
    write_link(writer, node.parent.map(|p| p.0))?;
    writer.write_u8(node.role.map(u8::from).unwrap_or(0))?;
    write_link(writer, node.mesh.map(|m| node_count + m.0))?;
    write_list(writer, &node.materials, |w, m| write_link(w, Some(material_base + *m)))?;
    write_vector3(writer, node.local.translation)?;
    write_quaternion(writer, node.local.rotation)?;
    write_vector3(writer, node.local.scale)?;
    write_list(writer, &node.curve.rotations, |w, (t, q)| {
        w.write_f32::<LittleEndian>(*t)?;
        write_quaternion(w, *q)
    })?;
    write_list(writer, &node.curve.translations, |w, (t, v)| {
        w.write_f32::<LittleEndian>(*t)?;
        write_vector3(w, *v)
    })?;
    write_list(writer, &node.curve.scales, |w, (t, v)| {
        w.write_f32::<LittleEndian>(*t)?;
        write_vector3(w, *v)
    })
}

fn write_uv_layer<W: Write>(writer: &mut W, layer: &UvLayer) -> Result<()> {
    write_string(writer, &layer.name)?;
    writer.write_u8(match layer.reference_mode {
        UvReferenceMode::Direct => 0,
        UvReferenceMode::IndexToDirect => 1,
    })?;
    write_list(writer, &layer.direct, |w, uv| write_vector2(w, *uv))?;
    write_list(writer, &layer.indices, |w, i| Ok(w.write_u32::<LittleEndian>(*i)?))
}

fn write_list<W: Write, T>(
    writer: &mut W,
    items: &[T],
    mut write_item: impl FnMut(&mut W, &T) -> Result<()>,
) -> Result<()> {
    writer.write_u32::<LittleEndian>(items.len() as u32)?;
    for item in items {
        write_item(writer, item)?;
    }
    Ok(())
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<()> {
    writer.write_u32::<LittleEndian>(value.len() as u32)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

fn write_link<W: Write>(writer: &mut W, link: Option<usize>) -> Result<()> {
    writer.write_i32::<LittleEndian>(link.map(|l| l as i32).unwrap_or(-1))?;
    Ok(())
}

fn write_vector2<W: Write>(writer: &mut W, v: Vec2) -> Result<()> {
    writer.write_f32::<LittleEndian>(v.x)?;
    writer.write_f32::<LittleEndian>(v.y)?;
    Ok(())
}

fn write_vector3<W: Write>(writer: &mut W, v: Vec3) -> Result<()> {
    writer.write_f32::<LittleEndian>(v.x)?;
    writer.write_f32::<LittleEndian>(v.y)?;
    writer.write_f32::<LittleEndian>(v.z)?;
    Ok(())
}

fn write_quaternion<W: Write>(writer: &mut W, q: Quat) -> Result<()> {
    writer.write_f32::<LittleEndian>(q.x)?;
    writer.write_f32::<LittleEndian>(q.y)?;
    writer.write_f32::<LittleEndian>(q.z)?;
    writer.write_f32::<LittleEndian>(q.w)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::accessor::{Cluster, Deformer, Material, SceneAccessor, SkeletonRole};
    use crate::scene::read_scene;
    use crate::scene::types::{LocalTransform, NodeAnimationCurve, SceneMesh};

    #[test]
    fn written_scenes_read_back() {
        let mut scene = MemoryScene::new("root");
        let hips = scene.add_node("hips", scene.root(), Some(SkeletonRole::Root));
        scene.set_local_transform(hips, LocalTransform::from_translation(Vec3::Y));
        scene.set_curve(
            hips,
            NodeAnimationCurve {
                rotations: vec![(0.0, Quat::IDENTITY), (1.0, Quat::from_rotation_y(1.0))],
                ..Default::default()
            },
        );
        let body = scene.add_node("body", scene.root(), None);
        scene.add_mesh(
            body,
            SceneMesh {
                control_points: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
                polygon_vertices: vec![0, 1, 2],
                normals: vec![Vec3::Z; 3],
                uv_layers: vec![UvLayer {
                    name: "map1".to_string(),
                    direct: vec![Vec2::ZERO; 3],
                    ..Default::default()
                }],
                deformers: vec![Deformer::skin(vec![Cluster {
                    link: hips,
                    control_point_indices: vec![0, 2],
                    weights: vec![1.0, 0.5],
                }])],
            },
        );
        scene.add_material(
            body,
            Material {
                name: "skin".to_string(),
                diffuse_textures: vec!["skin.png".to_string()],
                layered_textures: vec![vec!["a.png".to_string(), "b.png".to_string()]],
            },
        );
        scene.set_animation_stack(TimeSpan {
            start: 0.0,
            stop: 2.0,
        });

        let mut bytes = Vec::new();
        write_scene(&scene, &mut bytes).unwrap();
        let read = read_scene(&bytes).unwrap();

        assert_eq!(read.nodes().len(), 3);
        assert_eq!(read.node_name(hips), "hips");
        assert_eq!(read.skeleton_role(hips), Some(SkeletonRole::Root));
        assert_eq!(read.node(hips).local, scene.node(hips).local);
        assert_eq!(read.node(hips).curve, scene.node(hips).curve);
        assert_eq!(read.meshes()[0].deformers, scene.meshes()[0].deformers);
        assert_eq!(read.meshes()[0].uv_layers, scene.meshes()[0].uv_layers);
        assert_eq!(read.materials(), scene.materials());
        assert_eq!(read.current_animation_stack(), scene.current_animation_stack());
    }
}
