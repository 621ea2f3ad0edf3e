//! Turns block links into typed ids and builds a [`MemoryScene`].

use super::helpers::resolve_link;
use super::{ParsedBlock, ParsedScene};
use crate::scene::accessor::{Cluster, Deformer, MeshId, NodeId};
use crate::scene::error::{ImportError, Result};
use crate::scene::types::{MemoryScene, SceneMesh, SceneNode};
use bevy::log::warn;

pub fn resolve_scene(parsed: ParsedScene) -> Result<MemoryScene> {
    // block index -> index within its typed table
    let mut node_ids = vec![None; parsed.blocks.len()];
    let mut mesh_ids = vec![None; parsed.blocks.len()];
    let mut material_ids = vec![None; parsed.blocks.len()];
    let (mut node_count, mut mesh_count, mut material_count) = (0, 0, 0);
    for (index, block) in parsed.blocks.iter().enumerate() {
        match block {
            ParsedBlock::Node(_) => {
                node_ids[index] = Some(node_count);
                node_count += 1;
            }
            ParsedBlock::Mesh(_) => {
                mesh_ids[index] = Some(mesh_count);
                mesh_count += 1;
            }
            ParsedBlock::Material(_) => {
                material_ids[index] = Some(material_count);
                material_count += 1;
            }
            _ => {}
        }
    }

    let mut nodes = Vec::with_capacity(node_count);
    let mut meshes = Vec::with_capacity(mesh_count);
    let mut materials = Vec::with_capacity(material_count);
    let mut animation_stack = None;

    for (index, block) in parsed.blocks.iter().enumerate() {
        match block {
            ParsedBlock::Node(node) => {
                let parent = node
                    .parent
                    .map(|link| resolve_link(&node_ids, index, link).map(NodeId))
                    .transpose()?;
                let mesh = node
                    .mesh
                    .map(|link| resolve_link(&mesh_ids, index, link).map(MeshId))
                    .transpose()?;
                let node_materials = node
                    .materials
                    .iter()
                    .flatten()
                    .map(|link| resolve_link(&material_ids, index, *link))
                    .collect::<Result<Vec<_>>>()?;
                nodes.push(SceneNode {
                    name: node.name.clone(),
                    parent,
                    children: Vec::new(),
                    role: node.role,
                    mesh,
                    materials: node_materials,
                    local: node.local,
                    curve: node.curve.clone(),
                });
            }
            ParsedBlock::Mesh(mesh) => {
                let mut deformers = Vec::with_capacity(mesh.deformers.len());
                for &skin_index in mesh.deformers.iter().flatten() {
                    let Some(ParsedBlock::Skin(skin)) = parsed.blocks.get(skin_index) else {
                        return Err(ImportError::DanglingLink {
                            block: index,
                            link: skin_index,
                        });
                    };
                    let mut clusters = Vec::with_capacity(skin.clusters.len());
                    for cluster in &skin.clusters {
                        let Some(node_link) = cluster.link else {
                            return Err(ImportError::InvalidData(format!(
                                "Skin block {} has a cluster with no linked node",
                                skin_index
                            )));
                        };
                        clusters.push(Cluster {
                            link: NodeId(resolve_link(&node_ids, skin_index, node_link)?),
                            control_point_indices: cluster.control_point_indices.clone(),
                            weights: cluster.weights.clone(),
                        });
                    }
                    deformers.push(Deformer {
                        capabilities: skin.capabilities,
                        clusters,
                    });
                }
                meshes.push(SceneMesh {
                    control_points: mesh.control_points.clone(),
                    polygon_vertices: mesh.polygon_vertices.clone(),
                    normals: mesh.normals.clone(),
                    uv_layers: mesh.uv_layers.clone(),
                    deformers,
                });
            }
            ParsedBlock::Material(material) => materials.push(material.clone()),
            ParsedBlock::AnimationStack(stack) => {
                if animation_stack.is_some() {
                    warn!(
                        "Ignoring extra animation stack '{}' in block {}",
                        stack.name, index
                    );
                } else {
                    animation_stack = Some(stack.span);
                }
            }
            ParsedBlock::Skin(_) => {}
        }
    }

    MemoryScene::from_parts(nodes, meshes, materials, animation_stack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::accessor::SceneAccessor;
    use crate::scene::parser::{MeshBlock, NodeBlock};

    fn node(name: &str, parent: Option<usize>, mesh: Option<usize>) -> ParsedBlock {
        ParsedBlock::Node(NodeBlock {
            name: name.to_string(),
            parent,
            mesh,
            ..Default::default()
        })
    }

    fn parsed(blocks: Vec<ParsedBlock>) -> ParsedScene {
        ParsedScene {
            blocks,
            ..Default::default()
        }
    }

    #[test]
    fn links_become_typed_ids() {
        let scene = resolve_scene(parsed(vec![
            node("root", None, None),
            ParsedBlock::Mesh(MeshBlock::default()),
            node("body", Some(0), Some(1)),
        ]))
        .unwrap();

        let body = NodeId(1);
        assert_eq!(scene.children(scene.root()), [body]);
        assert_eq!(scene.node_mesh(body), Some(MeshId(0)));
    }

    #[test]
    fn deformer_links_must_point_at_skins() {
        let result = resolve_scene(parsed(vec![
            node("root", None, None),
            ParsedBlock::Mesh(MeshBlock {
                deformers: vec![Some(0)],
                ..Default::default()
            }),
        ]));
        assert!(matches!(
            result,
            Err(ImportError::DanglingLink { block: 1, link: 0 })
        ));
    }

    #[test]
    fn node_links_must_point_at_nodes() {
        let result = resolve_scene(parsed(vec![
            ParsedBlock::Mesh(MeshBlock::default()),
            node("root", Some(0), None),
        ]));
        assert!(matches!(
            result,
            Err(ImportError::DanglingLink { block: 1, link: 0 })
        ));
    }
}
