use bevy::math::{Vec2, Vec3};

/// Bit patterns of every vertex field, zero padded. Equal keys mean
/// field-wise equal vertices.
pub type VertexKey = [u32; 16];

pub trait MeshVertex: Copy + PartialEq {
    /// Negates the X component of position and normal.
    fn mirror_x(&mut self);
    /// Hash key consistent with `==`, or `None` when a field is NaN (such a
    /// vertex never compares equal to anything).
    fn bit_key(&self) -> Option<VertexKey>;
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimpleVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SkinnedVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    /// Not renormalized after truncation to four influences.
    pub weights: [f32; 4],
    pub indices: [u32; 4],
}

impl SimpleVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position: Vec3::from_array(position),
            normal: Vec3::from_array(normal),
            uv: Vec2::from_array(uv),
        }
    }
}

impl From<SimpleVertex> for SkinnedVertex {
    fn from(v: SimpleVertex) -> Self {
        Self {
            position: v.position,
            normal: v.normal,
            uv: v.uv,
            ..Default::default()
        }
    }
}

// +0.0 folds -0.0 into 0.0, matching float equality.
fn canonical_bits(value: f32) -> Option<u32> {
    if value.is_nan() {
        None
    } else {
        Some((value + 0.0).to_bits())
    }
}

fn write_floats(key: &mut VertexKey, offset: usize, values: &[f32]) -> Option<()> {
    for (slot, value) in key[offset..].iter_mut().zip(values) {
        *slot = canonical_bits(*value)?;
    }
    Some(())
}

impl MeshVertex for SimpleVertex {
    fn mirror_x(&mut self) {
        self.position.x = -self.position.x;
        self.normal.x = -self.normal.x;
    }

    fn bit_key(&self) -> Option<VertexKey> {
        let mut key = [0; 16];
        write_floats(&mut key, 0, &self.position.to_array())?;
        write_floats(&mut key, 3, &self.normal.to_array())?;
        write_floats(&mut key, 6, &self.uv.to_array())?;
        Some(key)
    }
}

impl MeshVertex for SkinnedVertex {
    fn mirror_x(&mut self) {
        self.position.x = -self.position.x;
        self.normal.x = -self.normal.x;
    }

    fn bit_key(&self) -> Option<VertexKey> {
        let mut key = [0; 16];
        write_floats(&mut key, 0, &self.position.to_array())?;
        write_floats(&mut key, 3, &self.normal.to_array())?;
        write_floats(&mut key, 6, &self.uv.to_array())?;
        write_floats(&mut key, 8, &self.weights)?;
        key[12..].copy_from_slice(&self.indices);
        Some(key)
    }
}

/// Vertex buffer plus triangle-list index buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedMesh<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
}

impl<V> Default for IndexedMesh<V> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }
}

impl<V: MeshVertex> IndexedMesh<V> {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// The vertex stream obtained by following every index.
    pub fn unindexed(&self) -> Vec<V> {
        self.indices
            .iter()
            .map(|index| self.vertices[*index as usize])
            .collect()
    }

    pub fn map_vertices<U>(self, f: impl FnMut(V) -> U) -> IndexedMesh<U> {
        IndexedMesh {
            vertices: self.vertices.into_iter().map(f).collect(),
            indices: self.indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_zeros_share_a_key() {
        let a = SimpleVertex::new([0.0, 1.0, 2.0], [0.0, 1.0, 0.0], [0.5, 0.5]);
        let b = SimpleVertex::new([-0.0, 1.0, 2.0], [0.0, 1.0, -0.0], [0.5, 0.5]);
        assert_eq!(a, b);
        assert_eq!(a.bit_key(), b.bit_key());
    }

    #[test]
    fn nan_vertices_have_no_key() {
        let v = SimpleVertex::new([f32::NAN, 0.0, 0.0], [0.0; 3], [0.0; 2]);
        assert_eq!(v.bit_key(), None);
    }

    #[test]
    fn skinned_keys_include_influences() {
        let base = SkinnedVertex::from(SimpleVertex::new([1.0; 3], [0.0; 3], [0.0; 2]));
        let mut other = base;
        other.indices[3] = 7;
        assert_ne!(base.bit_key(), other.bit_key());
        other = base;
        other.weights[0] = 0.25;
        assert_ne!(base.bit_key(), other.bit_key());
    }
}
