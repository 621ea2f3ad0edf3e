//! In-memory scene graph implementing [`SceneAccessor`].
//!
//! Used both as the target of the binary container parser and as a builder for
//! synthetic rigs in tests.
use super::accessor::{
    Deformer, Material, MeshId, NodeId, SceneAccessor, SkeletonRole, TimeSpan, UvLayer,
};
use super::error::{ImportError, Result};
use bevy::math::{Mat4, Quat, Vec3};

/// Translation / rotation / scale relative to the parent node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl LocalTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// Keyed local-space channels for one node. Times are absolute seconds.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct NodeAnimationCurve {
    pub rotations: Vec<(f32, Quat)>,
    pub translations: Vec<(f32, Vec3)>,
    pub scales: Vec<(f32, Vec3)>,
}

impl NodeAnimationCurve {
    pub fn is_empty(&self) -> bool {
        self.rotations.is_empty() && self.translations.is_empty() && self.scales.is_empty()
    }

    /// Samples every channel at `time`, falling back to `rest` for channels
    /// without keys.
    pub fn sample(&self, rest: &LocalTransform, time: f32) -> LocalTransform {
        LocalTransform {
            translation: sample_keys(&self.translations, time, |a, b, t| a.lerp(b, t))
                .unwrap_or(rest.translation),
            rotation: sample_keys(&self.rotations, time, |a, b, t| a.slerp(b, t))
                .unwrap_or(rest.rotation),
            scale: sample_keys(&self.scales, time, |a, b, t| a.lerp(b, t)).unwrap_or(rest.scale),
        }
    }
}

/// Linear key sampling, clamped to the first and last key.
fn sample_keys<T: Copy>(keys: &[(f32, T)], time: f32, lerp: impl Fn(T, T, f32) -> T) -> Option<T> {
    let (first, last) = (keys.first()?, keys.last()?);
    if time <= first.0 {
        return Some(first.1);
    }
    if time >= last.0 {
        return Some(last.1);
    }
    // First key strictly after `time`; guaranteed to be in 1..len here.
    let next = keys.partition_point(|(t, _)| *t <= time);
    let (t0, v0) = keys[next - 1];
    let (t1, v1) = keys[next];
    let span = t1 - t0;
    if span <= f32::EPSILON {
        return Some(v1);
    }
    Some(lerp(v0, v1, (time - t0) / span))
}

#[derive(Debug, Clone, Default)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub role: Option<SkeletonRole>,
    pub mesh: Option<MeshId>,
    /// Indices into the scene's material table.
    pub materials: Vec<usize>,
    pub local: LocalTransform,
    pub curve: NodeAnimationCurve,
}

#[derive(Debug, Clone, Default)]
pub struct SceneMesh {
    pub control_points: Vec<Vec3>,
    pub polygon_vertices: Vec<u32>,
    pub normals: Vec<Vec3>,
    pub uv_layers: Vec<UvLayer>,
    pub deformers: Vec<Deformer>,
}

#[derive(Debug, Clone)]
pub struct MemoryScene {
    root: NodeId,
    nodes: Vec<SceneNode>,
    meshes: Vec<SceneMesh>,
    materials: Vec<Material>,
    animation_stack: Option<TimeSpan>,
}

impl MemoryScene {
    /// Creates a scene holding only a root node.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root: NodeId(0),
            nodes: vec![SceneNode {
                name: root_name.into(),
                ..Default::default()
            }],
            meshes: Vec::new(),
            materials: Vec::new(),
            animation_stack: None,
        }
    }

    /// Builds a scene from flat tables. Every parent must precede its children
    /// and exactly one node may be parentless.
    pub fn from_parts(
        mut nodes: Vec<SceneNode>,
        meshes: Vec<SceneMesh>,
        materials: Vec<Material>,
        animation_stack: Option<TimeSpan>,
    ) -> Result<Self> {
        let mut root = None;
        for index in 0..nodes.len() {
            nodes[index].children.clear();
            match nodes[index].parent {
                None if root.is_none() => root = Some(NodeId(index)),
                None => {
                    return Err(ImportError::InvalidData(format!(
                        "Node {} is a second root (first root is {:?})",
                        index, root
                    )));
                }
                Some(parent) if parent.0 >= index => {
                    return Err(ImportError::InvalidData(format!(
                        "Node {} has parent {} which does not precede it",
                        index, parent.0
                    )));
                }
                Some(parent) => nodes[parent.0].children.push(NodeId(index)),
            }
            if let Some(mesh) = nodes[index].mesh {
                if mesh.0 >= meshes.len() {
                    return Err(ImportError::InvalidData(format!(
                        "Node {} references missing mesh {}",
                        index, mesh.0
                    )));
                }
            }
            if let Some(&material) = nodes[index].materials.iter().find(|m| **m >= materials.len())
            {
                return Err(ImportError::InvalidData(format!(
                    "Node {} references missing material {}",
                    index, material
                )));
            }
        }
        let root = root.ok_or_else(|| ImportError::InvalidData("Scene has no root node".into()))?;
        for (mesh_index, mesh) in meshes.iter().enumerate() {
            for cluster in mesh.deformers.iter().flat_map(|d| d.clusters.iter()) {
                if cluster.link.0 >= nodes.len() {
                    return Err(ImportError::InvalidData(format!(
                        "Mesh {} has a cluster linked to missing node {}",
                        mesh_index, cluster.link.0
                    )));
                }
                let count = mesh.control_points.len();
                if let Some(bad) = cluster
                    .control_point_indices
                    .iter()
                    .find(|index| **index as usize >= count)
                {
                    return Err(ImportError::InvalidData(format!(
                        "Mesh {} has a cluster weighting control point {} of {}",
                        mesh_index, bad, count
                    )));
                }
            }
        }
        Ok(Self {
            root,
            nodes,
            meshes,
            materials,
            animation_stack,
        })
    }

    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        parent: NodeId,
        role: Option<SkeletonRole>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            name: name.into(),
            parent: Some(parent),
            role,
            ..Default::default()
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn set_local_transform(&mut self, node: NodeId, local: LocalTransform) {
        self.nodes[node.0].local = local;
    }

    pub fn set_curve(&mut self, node: NodeId, curve: NodeAnimationCurve) {
        self.nodes[node.0].curve = curve;
    }

    /// Attaches `mesh` to `node`, replacing any mesh it already carried.
    pub fn add_mesh(&mut self, node: NodeId, mesh: SceneMesh) -> MeshId {
        let id = MeshId(self.meshes.len());
        self.meshes.push(mesh);
        self.nodes[node.0].mesh = Some(id);
        id
    }

    pub fn mesh_mut(&mut self, mesh: MeshId) -> &mut SceneMesh {
        &mut self.meshes[mesh.0]
    }

    pub fn add_material(&mut self, node: NodeId, material: Material) -> usize {
        let index = self.materials.len();
        self.materials.push(material);
        self.nodes[node.0].materials.push(index);
        index
    }

    pub fn set_animation_stack(&mut self, span: TimeSpan) {
        self.animation_stack = Some(span);
    }

    pub fn node(&self, node: NodeId) -> &SceneNode {
        &self.nodes[node.0]
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn meshes(&self) -> &[SceneMesh] {
        &self.meshes
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn animation_stack(&self) -> Option<TimeSpan> {
        self.animation_stack
    }

    fn local_at(&self, node: NodeId, seconds: f32) -> Mat4 {
        let data = &self.nodes[node.0];
        if data.curve.is_empty() {
            data.local.to_matrix()
        } else {
            data.curve.sample(&data.local, seconds).to_matrix()
        }
    }
}

impl SceneAccessor for MemoryScene {
    fn root(&self) -> NodeId {
        self.root
    }

    fn node_name(&self, node: NodeId) -> &str {
        &self.nodes[node.0].name
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn skeleton_role(&self, node: NodeId) -> Option<SkeletonRole> {
        self.nodes[node.0].role
    }

    fn node_mesh(&self, node: NodeId) -> Option<MeshId> {
        self.nodes[node.0].mesh
    }

    fn node_materials(&self, node: NodeId) -> Vec<&Material> {
        self.nodes[node.0]
            .materials
            .iter()
            .filter_map(|index| self.materials.get(*index))
            .collect()
    }

    fn control_points(&self, mesh: MeshId) -> &[Vec3] {
        &self.meshes[mesh.0].control_points
    }

    fn polygon_vertices(&self, mesh: MeshId) -> &[u32] {
        &self.meshes[mesh.0].polygon_vertices
    }

    fn polygon_vertex_normals(&self, mesh: MeshId) -> &[Vec3] {
        &self.meshes[mesh.0].normals
    }

    fn uv_set_names(&self, mesh: MeshId) -> Vec<&str> {
        self.meshes[mesh.0]
            .uv_layers
            .iter()
            .map(|layer| layer.name.as_str())
            .collect()
    }

    fn uv_layer(&self, mesh: MeshId, name: &str) -> Option<&UvLayer> {
        self.meshes[mesh.0]
            .uv_layers
            .iter()
            .find(|layer| layer.name == name)
    }

    fn deformers(&self, mesh: MeshId) -> &[Deformer] {
        &self.meshes[mesh.0].deformers
    }

    fn current_animation_stack(&self) -> Option<TimeSpan> {
        self.animation_stack
    }

    fn evaluate_global_transform(&self, node: NodeId, seconds: f64) -> Mat4 {
        let seconds = seconds as f32;
        let mut global = self.local_at(node, seconds);
        let mut current = self.nodes[node.0].parent;
        while let Some(parent) = current {
            global = self.local_at(parent, seconds) * global;
            current = self.nodes[parent.0].parent;
        }
        global
    }
}
