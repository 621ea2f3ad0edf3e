use super::vertex::{IndexedMesh, MeshVertex};
use bevy::math::Mat4;

/// Converts a right-handed mesh to left-handed in place.
///
/// Every position and normal is mirrored along X and every complete triangle
/// `(a, b, c)` becomes `(c, b, a)`. A trailing partial triangle is left alone.
pub fn rh_to_lh<V: MeshVertex>(mesh: &mut IndexedMesh<V>) {
    for vertex in &mut mesh.vertices {
        vertex.mirror_x();
    }
    for triangle in mesh.indices.chunks_exact_mut(3) {
        triangle.swap(0, 2);
    }
}

/// Applies the same handedness flip to a joint transform.
///
/// Column `i` of the glam matrix holds basis row `i` (translation in
/// `w_axis`). Negates Y and Z of the first basis row, X of the second and
/// third, and X of the translation. This is a fixed component pattern, not a
/// general mirror conjugation.
pub fn convert_joint_transform(transform: Mat4) -> Mat4 {
    let mut m = transform;
    m.x_axis.y = -m.x_axis.y;
    m.x_axis.z = -m.x_axis.z;
    m.y_axis.x = -m.y_axis.x;
    m.z_axis.x = -m.z_axis.x;
    m.w_axis.x = -m.w_axis.x;
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::vertex::{SimpleVertex, SkinnedVertex};
    use bevy::math::{Quat, Vec3, Vec4};

    #[test]
    fn mirrors_x_and_reverses_winding() {
        let mut mesh = IndexedMesh {
            vertices: vec![
                SimpleVertex::new([1.0, 2.0, 3.0], [0.5, 0.5, 0.0], [0.25, 0.75]),
                SimpleVertex::new([-4.0, 0.0, 1.0], [-1.0, 0.0, 0.0], [0.0, 0.0]),
                SimpleVertex::new([0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0]),
            ],
            indices: vec![0, 1, 2, 2, 1, 0],
        };
        let before = mesh.clone();
        rh_to_lh(&mut mesh);

        assert_eq!(mesh.indices, [2, 1, 0, 0, 1, 2]);
        for (old, new) in before.vertices.iter().zip(&mesh.vertices) {
            assert_eq!(new.position, Vec3::new(-old.position.x, old.position.y, old.position.z));
            assert_eq!(new.normal, Vec3::new(-old.normal.x, old.normal.y, old.normal.z));
            assert_eq!(new.uv, old.uv);
        }
    }

    #[test]
    fn skinning_data_is_untouched() {
        let mut vertex = SkinnedVertex::from(SimpleVertex::new([1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0; 2]));
        vertex.weights = [0.7, 0.3, 0.0, 0.0];
        vertex.indices = [2, 1, 0, 0];
        let mut mesh = IndexedMesh {
            vertices: vec![vertex],
            indices: vec![0, 0, 0, 0],
        };
        rh_to_lh(&mut mesh);

        assert_eq!(mesh.vertices[0].position.x, -1.0);
        assert_eq!(mesh.vertices[0].weights, vertex.weights);
        assert_eq!(mesh.vertices[0].indices, vertex.indices);
        assert_eq!(mesh.indices, [0, 0, 0, 0]);
    }

    #[test]
    fn joint_transform_negates_the_fixed_pattern() {
        let m = Mat4::from_cols_array(&[
            1.0, 2.0, 3.0, 4.0, //
            5.0, 6.0, 7.0, 8.0, //
            9.0, 10.0, 11.0, 12.0, //
            13.0, 14.0, 15.0, 16.0,
        ]);
        let converted = convert_joint_transform(m);

        assert_eq!(converted.x_axis, Vec4::new(1.0, -2.0, -3.0, 4.0));
        assert_eq!(converted.y_axis, Vec4::new(-5.0, 6.0, 7.0, 8.0));
        assert_eq!(converted.z_axis, Vec4::new(-9.0, 10.0, 11.0, 12.0));
        assert_eq!(converted.w_axis, Vec4::new(-13.0, 14.0, 15.0, 16.0));
        assert_eq!(convert_joint_transform(converted), m);
    }

    #[test]
    fn converted_transform_matches_mirrored_points() {
        let transform = Mat4::from_rotation_translation(
            Quat::from_rotation_y(0.6),
            Vec3::new(2.0, -1.0, 0.5),
        );
        let point = Vec3::new(0.3, 1.2, -0.7);
        let mirror = |v: Vec3| Vec3::new(-v.x, v.y, v.z);

        let expected = mirror(transform.transform_point3(point));
        let actual = convert_joint_transform(transform).transform_point3(mirror(point));
        assert!(expected.abs_diff_eq(actual, 1e-5));
    }
}
