//! Reader for the block-based `.skscene` container.

pub mod blocks;
pub mod helpers;
pub mod resolve;
pub mod start;

use crate::scene::accessor::{DeformerCapabilities, Material, SkeletonRole, TimeSpan, UvLayer};
use crate::scene::types::{LocalTransform, NodeAnimationCurve};
use bevy::math::Vec3;
use helpers::RecordLink;

pub const HEADER_LINE: &str = "Skinned Scene Format";
pub const FILE_VERSION: u32 = 0x0001_0000;

pub const NODE_BLOCK: &str = "SceneNode";
pub const MESH_BLOCK: &str = "SceneMesh";
pub const SKIN_BLOCK: &str = "SkinDeformer";
pub const MATERIAL_BLOCK: &str = "Material";
pub const ANIMATION_STACK_BLOCK: &str = "AnimationStack";

#[derive(Debug, Clone, Default)]
pub struct SceneHeader {
    pub version_string: String,
    pub file_version: u32,
    pub num_blocks: u32,
}

#[derive(Debug, Clone, Default)]
pub struct NodeBlock {
    pub name: String,
    pub parent: RecordLink,
    pub role: Option<SkeletonRole>,
    pub mesh: RecordLink,
    pub materials: Vec<RecordLink>,
    pub local: LocalTransform,
    pub curve: NodeAnimationCurve,
}

#[derive(Debug, Clone, Default)]
pub struct MeshBlock {
    pub control_points: Vec<Vec3>,
    pub polygon_vertices: Vec<u32>,
    pub normals: Vec<Vec3>,
    pub uv_layers: Vec<UvLayer>,
    pub deformers: Vec<RecordLink>,
}

#[derive(Debug, Clone, Default)]
pub struct ClusterBlock {
    pub link: RecordLink,
    pub control_point_indices: Vec<u32>,
    pub weights: Vec<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct SkinBlock {
    pub capabilities: DeformerCapabilities,
    pub clusters: Vec<ClusterBlock>,
}

#[derive(Debug, Clone, Default)]
pub struct AnimationStackBlock {
    pub name: String,
    pub span: TimeSpan,
}

#[derive(Debug, Clone)]
pub enum ParsedBlock {
    Node(NodeBlock),
    Mesh(MeshBlock),
    Skin(SkinBlock),
    Material(Material),
    AnimationStack(AnimationStackBlock),
}

impl ParsedBlock {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParsedBlock::Node(_) => NODE_BLOCK,
            ParsedBlock::Mesh(_) => MESH_BLOCK,
            ParsedBlock::Skin(_) => SKIN_BLOCK,
            ParsedBlock::Material(_) => MATERIAL_BLOCK,
            ParsedBlock::AnimationStack(_) => ANIMATION_STACK_BLOCK,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedScene {
    pub header: SceneHeader,
    pub blocks: Vec<ParsedBlock>,
}
