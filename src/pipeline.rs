//! End-to-end load calls: scene in, GPU-ready mesh and animation clip out.

use crate::animation::{AnimationClip, sample_animation};
use crate::config::{ImportConfig, ImportSettings};
use crate::mesh::{
    IndexedMesh, SimpleVertex, SkinnedVertex, compact, expand_mesh, rh_to_lh,
};
use crate::scene::accessor::{MeshId, NodeId, SceneAccessor};
use crate::scene::error::{ImportError, Result};
use crate::scene::read_scene;
use crate::scene::types::MemoryScene;
use crate::skeleton::{extract_skeleton, find_skin};
use crate::skinning::{apply_influences, resolve_influences};
use bevy::log::{debug, error};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct StaticAsset {
    pub mesh: IndexedMesh<SimpleVertex>,
    /// Normalized texture file name, if the mesh node has a diffuse texture.
    pub texture: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkinnedAsset {
    pub mesh: IndexedMesh<SkinnedVertex>,
    pub clip: AnimationClip,
    /// Joint node names, index-aligned with the clip's joint poses.
    pub joint_names: Vec<String>,
    pub texture: Option<String>,
}

/// Reads and resolves a scene file. Failures are logged before being returned.
pub fn open_scene(path: &Path) -> Result<MemoryScene> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to open scene {:?}: {}", path, e);
            return Err(ImportError::Io(e));
        }
    };
    read_scene(&bytes).inspect_err(|e| error!("Failed to import scene {:?}: {}", path, e))
}

/// Depth-first search below `node` for the first node that carries a mesh.
///
/// Children are checked in enumeration order; a child is only descended into
/// when it carries no mesh itself.
pub fn find_mesh_node<S: SceneAccessor + ?Sized>(scene: &S, node: NodeId) -> Option<(NodeId, MeshId)> {
    for &child in scene.children(node) {
        if let Some(mesh) = scene.node_mesh(child) {
            return Some((child, mesh));
        }
        if let Some(found) = find_mesh_node(scene, child) {
            return Some(found);
        }
    }
    None
}

/// Diffuse texture file of `node`, as authored.
///
/// Materials are visited in order and the last directly bound diffuse texture
/// wins. A material whose diffuse channel uses layered textures contributes
/// nothing.
pub fn texture_filename<S: SceneAccessor + ?Sized>(scene: &S, node: NodeId) -> Option<String> {
    let mut found = None;
    for material in scene.node_materials(node) {
        if !material.layered_textures.is_empty() {
            debug!(
                "Material '{}' has {} layered diffuse textures; skipping",
                material.name,
                material.layered_textures.len()
            );
            continue;
        }
        if let Some(name) = material.diffuse_textures.last() {
            found = Some(name.clone());
        }
    }
    found
}

/// Strips any directory prefix (`/` or `\`) and replaces whatever follows the
/// last `.` with `extension`. A name without a `.` keeps its stem unchanged.
pub fn normalize_texture_filename(name: &str, extension: &str) -> String {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match file.rfind('.') {
        Some(dot) => format!("{}{}", &file[..=dot], extension),
        None => file.to_string(),
    }
}

fn locate_mesh<S: SceneAccessor + ?Sized>(scene: &S) -> Result<(NodeId, MeshId)> {
    let (node, mesh) = find_mesh_node(scene, scene.root()).ok_or(ImportError::NoMesh)?;
    debug!(
        "Mesh node '{}': {} control points, {} polygon-vertices",
        scene.node_name(node),
        scene.control_points(mesh).len(),
        scene.polygon_vertices(mesh).len()
    );
    Ok((node, mesh))
}

fn normalized_texture<S: SceneAccessor + ?Sized>(
    scene: &S,
    node: NodeId,
    settings: &ImportSettings,
) -> Option<String> {
    let texture = texture_filename(scene, node)
        .map(|name| normalize_texture_filename(&name, &settings.texture_extension));
    debug!("Texture file: {:?}", texture);
    texture
}

/// Imports the first mesh of `scene` without skinning data.
pub fn load_static<S: SceneAccessor + ?Sized>(scene: &S, settings: &ImportSettings) -> Result<StaticAsset> {
    let (node, mesh_id) = locate_mesh(scene)?;
    let expanded = expand_mesh(scene, mesh_id, settings.scale)?;
    let mut mesh = compact(&expanded, settings.dedup);
    if settings.convert_handedness {
        rh_to_lh(&mut mesh);
    }
    Ok(StaticAsset {
        mesh,
        texture: normalized_texture(scene, node, settings),
    })
}

/// Imports the first mesh of `scene` with per-vertex joint influences and
/// the sampled animation of its skeleton.
///
/// Returns [`ImportError::NoSkin`] when the mesh has no skin deformer.
///
/// # Panics
/// On a broken skeleton (no skeleton root above the first cluster's joint,
/// or a cluster linked outside the skeleton).
pub fn load_skinned<S: SceneAccessor + ?Sized>(scene: &S, settings: &ImportSettings) -> Result<SkinnedAsset> {
    let (node, mesh_id) = locate_mesh(scene)?;
    let node_name = scene.node_name(node);
    if find_skin(scene, mesh_id).is_none() {
        return Err(ImportError::NoSkin(node_name.to_string()));
    }
    let joints = extract_skeleton(scene, mesh_id)
        .ok_or_else(|| ImportError::NoSkin(node_name.to_string()))?;

    let expanded = expand_mesh(scene, mesh_id, settings.scale)?;
    let influences = resolve_influences(scene, mesh_id, &joints);
    let skinned = apply_influences(expanded, &influences);
    let mut mesh = compact(&skinned, settings.dedup);
    if settings.convert_handedness {
        rh_to_lh(&mut mesh);
    }

    let clip = sample_animation(scene, &joints);
    debug!(
        "Skeleton of '{}': {} joints, {} keyframes",
        node_name,
        joints.len(),
        clip.keyframes.len()
    );

    Ok(SkinnedAsset {
        mesh,
        clip,
        joint_names: joints
            .iter()
            .map(|joint| scene.node_name(joint.node).to_string())
            .collect(),
        texture: normalized_texture(scene, node, settings),
    })
}

/// Opens `config.path` and runs [`load_static`]. The scene is dropped before
/// returning, on success and on failure alike.
pub fn load_static_file(config: &ImportConfig) -> Result<StaticAsset> {
    let scene = open_scene(&config.path)?;
    load_static(&scene, &config.settings)
}

/// Opens `config.path` and runs [`load_skinned`].
pub fn load_skinned_file(config: &ImportConfig) -> Result<SkinnedAsset> {
    let scene = open_scene(&config.path)?;
    load_skinned(&scene, &config.settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::accessor::{Cluster, Deformer, Material, SkeletonRole, TimeSpan, UvLayer};
    use crate::scene::types::{LocalTransform, SceneMesh};
    use bevy::math::{Vec2, Vec3};

    #[test]
    fn texture_names_lose_their_directory_and_extension() {
        assert_eq!(normalize_texture_filename("C:\\art\\skin.png", "dds"), "skin.dds");
        assert_eq!(normalize_texture_filename("textures/body.final.tga", "dds"), "body.final.dds");
        assert_eq!(normalize_texture_filename("a/b\\c.jpeg", "ktx2"), "c.ktx2");
        assert_eq!(normalize_texture_filename("plain.bmp", "dds"), "plain.dds");
        assert_eq!(normalize_texture_filename("noext", "dds"), "noext");
    }

    fn triangle() -> SceneMesh {
        SceneMesh {
            control_points: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            polygon_vertices: vec![0, 1, 2],
            normals: vec![Vec3::Z; 3],
            uv_layers: vec![UvLayer {
                name: "map1".to_string(),
                direct: vec![Vec2::ZERO, Vec2::X, Vec2::Y],
                ..Default::default()
            }],
            deformers: Vec::new(),
        }
    }

    #[test]
    fn mesh_search_is_depth_first() {
        let mut scene = MemoryScene::new("root");
        let group = scene.add_node("group", scene.root(), None);
        let deep = scene.add_node("deep", group, None);
        let late = scene.add_node("late", scene.root(), None);
        let deep_mesh = scene.add_mesh(deep, triangle());
        scene.add_mesh(late, triangle());

        assert_eq!(find_mesh_node(&scene, scene.root()), Some((deep, deep_mesh)));
        assert_eq!(find_mesh_node(&scene, late), None);
    }

    #[test]
    fn last_direct_diffuse_texture_wins() {
        let mut scene = MemoryScene::new("root");
        let node = scene.add_node("body", scene.root(), None);
        scene.add_material(
            node,
            Material {
                name: "base".to_string(),
                diffuse_textures: vec!["a.png".to_string(), "b.png".to_string()],
                ..Default::default()
            },
        );
        scene.add_material(
            node,
            Material {
                name: "layered".to_string(),
                diffuse_textures: vec!["ignored.png".to_string()],
                layered_textures: vec![vec!["layer.png".to_string()]],
            },
        );
        assert_eq!(texture_filename(&scene, node).as_deref(), Some("b.png"));
        assert_eq!(texture_filename(&scene, scene.root()), None);
    }

    #[test]
    fn static_load_scales_compacts_and_converts() {
        let mut scene = MemoryScene::new("root");
        let node = scene.add_node("tri", scene.root(), None);
        scene.add_mesh(node, triangle());
        scene.add_material(
            node,
            Material {
                diffuse_textures: vec!["maps/tri.tga".to_string()],
                ..Default::default()
            },
        );
        let settings = ImportSettings {
            scale: 2.0,
            ..Default::default()
        };
        let asset = load_static(&scene, &settings).unwrap();

        assert_eq!(asset.texture.as_deref(), Some("tri.dds"));
        assert_eq!(asset.mesh.indices, [2, 1, 0]);
        assert_eq!(asset.mesh.vertices[1].position, Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(asset.mesh.vertices[2].uv, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn scenes_without_meshes_or_skins_are_errors() {
        let scene = MemoryScene::new("empty");
        assert!(matches!(
            load_static(&scene, &ImportSettings::default()),
            Err(ImportError::NoMesh)
        ));

        let mut scene = MemoryScene::new("root");
        let node = scene.add_node("prop", scene.root(), None);
        scene.add_mesh(node, triangle());
        match load_skinned(&scene, &ImportSettings::default()) {
            Err(ImportError::NoSkin(name)) => assert_eq!(name, "prop"),
            other => panic!("expected NoSkin, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn skinned_load_produces_clip_and_attributes() {
        let mut scene = MemoryScene::new("root");
        let hips = scene.add_node("hips", scene.root(), Some(SkeletonRole::Root));
        let arm = scene.add_node("arm", hips, Some(SkeletonRole::LimbNode));
        scene.set_local_transform(arm, LocalTransform::from_translation(Vec3::Y));
        scene.set_animation_stack(TimeSpan { start: 0.0, stop: 0.5 });
        let body = scene.add_node("body", scene.root(), None);
        scene.add_mesh(
            body,
            SceneMesh {
                deformers: vec![Deformer::skin(vec![
                    Cluster {
                        link: hips,
                        control_point_indices: vec![0, 1],
                        weights: vec![1.0, 0.25],
                    },
                    Cluster {
                        link: arm,
                        control_point_indices: vec![1, 2],
                        weights: vec![0.75, 1.0],
                    },
                ])],
                ..triangle()
            },
        );

        let asset = load_skinned(&scene, &ImportSettings::default()).unwrap();
        assert_eq!(asset.joint_names, ["hips", "arm"]);
        assert_eq!(asset.clip.keyframes.len(), 12);
        assert_eq!(asset.clip.joint_count(), 2);

        let corner = asset
            .mesh
            .vertices
            .iter()
            .find(|v| v.position == Vec3::new(-1.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(corner.weights, [0.75, 0.25, 0.0, 0.0]);
        assert_eq!(corner.indices, [1, 0, 0, 0]);
    }
}
