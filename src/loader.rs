// src/loader.rs
use crate::animation::AnimationClip;
use crate::config::ImportSettings;
use crate::mesh::{IndexedMesh, SimpleVertex, SkinnedVertex};
use crate::pipeline::{find_mesh_node, load_skinned, load_static};
use crate::scene::accessor::SceneAccessor;
use crate::scene::error::ImportError;
use crate::scene::read_scene;
use crate::skeleton::find_skin;
use bevy::asset::{Asset, AssetLoader, Handle, LoadContext, RenderAssetUsages, io::Reader};
use bevy::log::{error, info, warn};
use bevy::reflect::TypePath;
use bevy::render::mesh::{Indices, Mesh, PrimitiveTopology, VertexAttributeValues};

/// A `.skscene` file baked into a renderable mesh plus, for skinned meshes,
/// its joint animation.
#[derive(Asset, TypePath, Debug)]
pub struct SkinnedScene {
    /// Labeled sub-asset `"mesh"`.
    pub mesh: Handle<Mesh>,
    /// `None` for static meshes.
    pub clip: Option<AnimationClip>,
    pub joint_names: Vec<String>,
    pub texture: Option<String>,
}

#[derive(Default)]
pub struct SkinnedSceneLoader;

impl AssetLoader for SkinnedSceneLoader {
    type Asset = SkinnedScene;
    type Settings = ImportSettings;
    type Error = ImportError;
    async fn load(
        &self,
        reader: &mut dyn Reader,
        settings: &ImportSettings,
        load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();

        if let Err(e) = reader.read_to_end(&mut bytes).await {
            error!("SkinnedSceneLoader: Failed to read bytes: {:?}", e);
            return Err(ImportError::Io(e));
        }

        let scene = read_scene(&bytes)?;
        let (_, mesh_id) = find_mesh_node(&scene, scene.root()).ok_or(ImportError::NoMesh)?;

        let asset = if find_skin(&scene, mesh_id).is_some() {
            let skinned = load_skinned(&scene, settings)?;
            SkinnedScene {
                mesh: load_context.add_labeled_asset("mesh".to_string(), skinned.mesh.to_bevy_mesh()),
                clip: Some(skinned.clip),
                joint_names: skinned.joint_names,
                texture: skinned.texture,
            }
        } else {
            let simple = load_static(&scene, settings)?;
            SkinnedScene {
                mesh: load_context.add_labeled_asset("mesh".to_string(), simple.mesh.to_bevy_mesh()),
                clip: None,
                joint_names: Vec::new(),
                texture: simple.texture,
            }
        };
        info!(
            "Loaded {:?}: {} joints, {} keyframes",
            load_context.path(),
            asset.joint_names.len(),
            asset.clip.as_ref().map_or(0, |clip| clip.keyframes.len())
        );
        Ok(asset)
    }

    fn extensions(&self) -> &[&str] {
        &["skscene"]
    }
}

/// Conversion of a baked vertex buffer into a bevy triangle-list [`Mesh`].
pub trait ToBevyMesh {
    fn to_bevy_mesh(&self) -> Mesh;
}

fn base_mesh(positions: Vec<[f32; 3]>, normals: Vec<[f32; 3]>, uvs: Vec<[f32; 2]>, indices: &[u32]) -> Mesh {
    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U32(indices.to_vec()))
}

impl ToBevyMesh for IndexedMesh<SimpleVertex> {
    fn to_bevy_mesh(&self) -> Mesh {
        base_mesh(
            self.vertices.iter().map(|v| v.position.to_array()).collect(),
            self.vertices.iter().map(|v| v.normal.to_array()).collect(),
            self.vertices.iter().map(|v| v.uv.to_array()).collect(),
            &self.indices,
        )
    }
}

impl ToBevyMesh for IndexedMesh<SkinnedVertex> {
    fn to_bevy_mesh(&self) -> Mesh {
        let mut mesh = base_mesh(
            self.vertices.iter().map(|v| v.position.to_array()).collect(),
            self.vertices.iter().map(|v| v.normal.to_array()).collect(),
            self.vertices.iter().map(|v| v.uv.to_array()).collect(),
            &self.indices,
        );
        // bevy joint indices are u16
        let joint_indices: Vec<[u16; 4]> = self
            .vertices
            .iter()
            .map(|v| {
                v.indices.map(|joint| {
                    u16::try_from(joint).unwrap_or_else(|_| {
                        warn!("Joint index {} does not fit a u16 vertex attribute", joint);
                        0
                    })
                })
            })
            .collect();
        let joint_weights: Vec<[f32; 4]> = self.vertices.iter().map(|v| v.weights).collect();
        mesh.insert_attribute(
            Mesh::ATTRIBUTE_JOINT_INDEX,
            VertexAttributeValues::Uint16x4(joint_indices),
        );
        mesh.insert_attribute(
            Mesh::ATTRIBUTE_JOINT_WEIGHT,
            VertexAttributeValues::Float32x4(joint_weights),
        );
        mesh
    }
}
