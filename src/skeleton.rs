use crate::scene::accessor::{Deformer, MeshId, NodeId, SceneAccessor};

/// One posable node of the extracted skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Joint {
    pub node: NodeId,
    /// Index into the joint list, `-1` for the root.
    pub parent: i32,
}

/// First deformer of `mesh` with skin capability.
pub fn find_skin<S: SceneAccessor + ?Sized>(scene: &S, mesh: MeshId) -> Option<&Deformer> {
    scene.deformers(mesh).iter().find(|deformer| deformer.is_skin())
}

/// Collects the joint hierarchy driving `mesh` in breadth-first order.
///
/// Starts from the node linked by the skin's first cluster, climbs to the
/// skeleton root and then walks down, keeping every child that carries a
/// skeletal role. Index 0 is always the root and every parent index is
/// smaller than the index of its child.
///
/// Returns `None` when the mesh has no skin deformer, or when the skin has no
/// clusters to start from.
///
/// # Panics
/// If the linked node has no skeleton root among its ancestors. That is an
/// authoring error with no usable partial skeleton.
pub fn extract_skeleton<S: SceneAccessor + ?Sized>(scene: &S, mesh: MeshId) -> Option<Vec<Joint>> {
    let skin = find_skin(scene, mesh)?;
    let mut link = skin.clusters.first()?.link;

    let mut role = scene.skeleton_role(link);
    assert!(
        role.is_some(),
        "cluster link '{}' is not a skeleton node",
        scene.node_name(link)
    );
    while !role.is_some_and(|r| r.is_root()) {
        let Some(parent) = scene.parent(link) else {
            panic!(
                "no skeleton root above '{}' (reached the scene root)",
                scene.node_name(link)
            );
        };
        link = parent;
        role = scene.skeleton_role(link);
    }

    let mut joints = vec![Joint {
        node: link,
        parent: -1,
    }];
    // The list doubles as the BFS queue.
    let mut i = 0;
    while i < joints.len() {
        let node = joints[i].node;
        for &child in scene.children(node) {
            if scene.skeleton_role(child).is_some() {
                joints.push(Joint {
                    node: child,
                    parent: i as i32,
                });
            }
        }
        i += 1;
    }
    Some(joints)
}

/// Position of `node` in `joints`, by linear search.
pub fn joint_index(joints: &[Joint], node: NodeId) -> Option<usize> {
    joints.iter().position(|joint| joint.node == node)
}
