//! The capability interface the import pipeline uses to query a scene graph.
//!
//! Nothing in the pipeline touches a concrete scene type; it only calls through
//! [`SceneAccessor`]. That keeps skeleton extraction and influence resolution
//! testable against small synthetic graphs.

use bevy::math::{Mat4, Vec2, Vec3};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

/// Skeletal role attached to a node. Nodes without one are not joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkeletonRole {
    Root,
    Limb,
    LimbNode,
    Effector,
}

impl SkeletonRole {
    pub fn is_root(self) -> bool {
        self == SkeletonRole::Root
    }
}

impl TryFrom<u8> for SkeletonRole {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SkeletonRole::Root),
            2 => Ok(SkeletonRole::Limb),
            3 => Ok(SkeletonRole::LimbNode),
            4 => Ok(SkeletonRole::Effector),
            other => Err(other),
        }
    }
}

impl From<SkeletonRole> for u8 {
    fn from(role: SkeletonRole) -> Self {
        match role {
            SkeletonRole::Root => 1,
            SkeletonRole::Limb => 2,
            SkeletonRole::LimbNode => 3,
            SkeletonRole::Effector => 4,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
    pub struct DeformerCapabilities: u32 {
        const SKIN         = 1 << 0;
        const BLEND_SHAPE  = 1 << 1;
        const VERTEX_CACHE = 1 << 2;
    }
}

/// One joint's weighted set of control points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cluster {
    pub link: NodeId,
    pub control_point_indices: Vec<u32>,
    /// Index-aligned with `control_point_indices`.
    pub weights: Vec<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deformer {
    pub capabilities: DeformerCapabilities,
    pub clusters: Vec<Cluster>,
}

impl Deformer {
    pub fn skin(clusters: Vec<Cluster>) -> Self {
        Self {
            capabilities: DeformerCapabilities::SKIN,
            clusters,
        }
    }

    pub fn is_skin(&self) -> bool {
        self.capabilities.contains(DeformerCapabilities::SKIN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UvReferenceMode {
    /// `direct` is indexed by polygon-vertex position.
    #[default]
    Direct,
    /// `indices` maps polygon-vertex position to an entry of `direct`.
    IndexToDirect,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UvLayer {
    pub name: String,
    pub reference_mode: UvReferenceMode,
    pub direct: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl UvLayer {
    /// Raw UV for one polygon-vertex, before any texture-space flip.
    pub fn uv_at(&self, polygon_vertex: usize) -> Option<Vec2> {
        match self.reference_mode {
            UvReferenceMode::Direct => self.direct.get(polygon_vertex).copied(),
            UvReferenceMode::IndexToDirect => {
                let direct_index = *self.indices.get(polygon_vertex)? as usize;
                self.direct.get(direct_index).copied()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,
    /// File names of textures bound directly to the diffuse channel.
    pub diffuse_textures: Vec<String>,
    /// Layered textures on the diffuse channel, one entry per layer stack.
    pub layered_textures: Vec<Vec<String>>,
}

/// Local time span of an animation stack, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeSpan {
    pub start: f64,
    pub stop: f64,
}

impl TimeSpan {
    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }
}

pub trait SceneAccessor {
    fn root(&self) -> NodeId;
    fn node_name(&self, node: NodeId) -> &str;
    /// Children in a stable enumeration order.
    fn children(&self, node: NodeId) -> &[NodeId];
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn skeleton_role(&self, node: NodeId) -> Option<SkeletonRole>;
    fn node_mesh(&self, node: NodeId) -> Option<MeshId>;
    fn node_materials(&self, node: NodeId) -> Vec<&Material>;

    fn control_points(&self, mesh: MeshId) -> &[Vec3];
    /// Polygon-to-control-point index array, one entry per polygon-vertex.
    fn polygon_vertices(&self, mesh: MeshId) -> &[u32];
    /// Normals stored per polygon-vertex.
    fn polygon_vertex_normals(&self, mesh: MeshId) -> &[Vec3];
    fn uv_set_names(&self, mesh: MeshId) -> Vec<&str>;
    fn uv_layer(&self, mesh: MeshId, name: &str) -> Option<&UvLayer>;
    fn deformers(&self, mesh: MeshId) -> &[Deformer];

    fn current_animation_stack(&self) -> Option<TimeSpan>;
    /// World-space transform of `node` at `seconds`.
    fn evaluate_global_transform(&self, node: NodeId, seconds: f64) -> Mat4;
}
