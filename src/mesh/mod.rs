//! Vertex containers and the load-time passes that build them: expansion of
//! per-polygon attributes, deduplication and handedness conversion.

pub mod compact;
pub mod coords;
pub mod expand;
pub mod primitives;
pub mod vertex;

pub use compact::{DedupStrategy, compact, compactify, compactify_hashed};
pub use coords::{convert_joint_transform, rh_to_lh};
pub use expand::expand_mesh;
pub use vertex::{IndexedMesh, MeshVertex, SimpleVertex, SkinnedVertex, VertexKey};
