use anyhow::Result;
use bevy::math::{Vec2, Vec3, Vec4};
use bevy_skinbake::mesh::DedupStrategy;
use bevy_skinbake::scene::accessor::{
    Cluster, Deformer, Material, SkeletonRole, TimeSpan, UvLayer, UvReferenceMode,
};
use bevy_skinbake::scene::types::{LocalTransform, NodeAnimationCurve, SceneMesh};
use bevy_skinbake::scene::writer::write_scene;
use bevy_skinbake::{
    ImportConfig, ImportError, ImportSettings, MemoryScene, SceneAccessor, load_skinned_file,
    load_static_file,
};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn create_temp_file() -> (TempDir, NamedTempFile) {
    let dir = TempDir::new().unwrap();
    let file = NamedTempFile::new_in(&dir).unwrap();
    (dir, file)
}

/// Unit quad in the XY plane: two triangles over four control points.
fn quad(deformers: Vec<Deformer>) -> SceneMesh {
    SceneMesh {
        control_points: vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        polygon_vertices: vec![0, 1, 2, 0, 2, 3],
        normals: vec![Vec3::Z; 6],
        uv_layers: vec![UvLayer {
            name: "map1".to_string(),
            reference_mode: UvReferenceMode::IndexToDirect,
            direct: vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)],
            indices: vec![0, 1, 2, 0, 2, 3],
        }],
        deformers,
    }
}

// root
// ├── armature
// │   └── hips (Root, slides +24 x per second)
// │       └── elbow (LimbNode, +1 x)
// └── arm (quad, skinned to hips and elbow)
fn arm_rig() -> MemoryScene {
    let mut scene = MemoryScene::new("root");
    let armature = scene.add_node("armature", scene.root(), None);
    let hips = scene.add_node("hips", armature, Some(SkeletonRole::Root));
    let elbow = scene.add_node("elbow", hips, Some(SkeletonRole::LimbNode));
    scene.set_local_transform(elbow, LocalTransform::from_translation(Vec3::X));
    scene.set_curve(
        hips,
        NodeAnimationCurve {
            translations: vec![(0.0, Vec3::ZERO), (1.0, Vec3::new(24.0, 0.0, 0.0))],
            ..Default::default()
        },
    );
    scene.set_animation_stack(TimeSpan {
        start: 0.0,
        stop: 1.0,
    });

    let arm = scene.add_node("arm", scene.root(), None);
    scene.add_mesh(
        arm,
        quad(vec![Deformer::skin(vec![
            Cluster {
                link: elbow,
                control_point_indices: vec![1, 2, 3],
                weights: vec![1.0, 1.0, 0.4],
            },
            Cluster {
                link: hips,
                control_point_indices: vec![0, 3],
                weights: vec![1.0, 0.6],
            },
        ])]),
    );
    scene.add_material(
        arm,
        Material {
            name: "skin".to_string(),
            diffuse_textures: vec!["C:\\textures\\arm.png".to_string()],
            ..Default::default()
        },
    );
    scene
}

fn write_to_disk(scene: &MemoryScene) -> Result<(TempDir, NamedTempFile)> {
    let (dir, mut file) = create_temp_file();
    write_scene(scene, &mut file)?;
    file.flush()?;
    Ok((dir, file))
}

#[test]
fn skinned_rig_survives_the_file_round_trip() -> Result<()> {
    let (_dir, file) = write_to_disk(&arm_rig())?;
    let asset = load_skinned_file(&ImportConfig::new(file.path()))?;

    assert_eq!(asset.joint_names, ["hips", "elbow"]);
    assert_eq!(asset.texture.as_deref(), Some("arm.dds"));

    // Shared corners collapse and the winding is reversed.
    assert_eq!(asset.mesh.vertices.len(), 4);
    assert_eq!(asset.mesh.indices, [2, 1, 0, 3, 2, 0]);

    let corner = asset.mesh.vertices[3];
    assert_eq!(corner.position, Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(corner.uv, Vec2::new(0.0, 0.0));
    assert_eq!(corner.weights, [0.6, 0.4, 0.0, 0.0]);
    assert_eq!(corner.indices, [0, 1, 0, 0]);
    assert_eq!(asset.mesh.vertices[1].position, Vec3::new(-1.0, 0.0, 0.0));
    assert_eq!(asset.mesh.vertices[1].indices, [1, 0, 0, 0]);
    Ok(())
}

#[test]
fn clip_is_sampled_at_twenty_four_frames_per_second() -> Result<()> {
    let (_dir, file) = write_to_disk(&arm_rig())?;
    let clip = load_skinned_file(&ImportConfig::new(file.path()))?.clip;

    assert_eq!(clip.keyframes.len(), 24);
    assert!(clip.is_consistent());
    for (i, keyframe) in clip.keyframes.iter().enumerate() {
        assert_eq!(keyframe.time, (i as f64 / 24.0) as f32);
        assert_eq!(keyframe.joints.len(), 2);
        assert_eq!(keyframe.joints[1].parent, 0);
    }

    let halfway = &clip.keyframes[12];
    assert_eq!(halfway.joints[0].transform.w_axis, Vec4::new(-12.0, 0.0, 0.0, 1.0));
    assert_eq!(halfway.joints[1].transform.w_axis, Vec4::new(-13.0, 0.0, 0.0, 1.0));

    let skinning = clip.skinning_matrices(12).unwrap();
    assert_eq!(skinning.len(), 2);
    assert!(
        skinning[1]
            .w_axis
            .abs_diff_eq(Vec4::new(-12.0, 0.0, 0.0, 1.0), 1e-5)
    );
    Ok(())
}

#[test]
fn static_import_ignores_skinning() -> Result<()> {
    let (_dir, file) = write_to_disk(&arm_rig())?;
    let config = ImportConfig::new(file.path()).with_scale(3.0);
    let asset = load_static_file(&config)?;

    assert_eq!(asset.mesh.vertices.len(), 4);
    assert_eq!(asset.mesh.vertices[2].position, Vec3::new(-3.0, 3.0, 0.0));
    assert_eq!(asset.texture.as_deref(), Some("arm.dds"));
    Ok(())
}

#[test]
fn dedup_strategies_agree_on_a_real_file() -> Result<()> {
    let (_dir, file) = write_to_disk(&arm_rig())?;
    let mut config = ImportConfig::new(file.path());
    let linear = load_skinned_file(&config)?;
    config.settings = ImportSettings {
        dedup: DedupStrategy::Hashed,
        texture_extension: "ktx2".to_string(),
        ..Default::default()
    };
    let hashed = load_skinned_file(&config)?;

    assert_eq!(linear.mesh, hashed.mesh);
    assert_eq!(linear.clip, hashed.clip);
    assert_eq!(hashed.texture.as_deref(), Some("arm.ktx2"));
    Ok(())
}

#[test]
fn unskinned_file_is_rejected_by_the_skinned_path() -> Result<()> {
    let mut scene = MemoryScene::new("root");
    let prop = scene.add_node("crate", scene.root(), None);
    scene.add_mesh(prop, quad(Vec::new()));
    let (_dir, file) = write_to_disk(&scene)?;
    let config = ImportConfig::new(file.path());

    assert!(matches!(load_skinned_file(&config), Err(ImportError::NoSkin(_))));
    assert_eq!(load_static_file(&config)?.mesh.triangle_count(), 2);
    Ok(())
}

#[test]
fn unreadable_files_are_errors() -> Result<()> {
    let (dir, mut file) = create_temp_file();
    file.write_all(b"definitely not a scene\n")?;
    file.flush()?;

    let garbage = load_skinned_file(&ImportConfig::new(file.path()));
    assert!(matches!(garbage, Err(ImportError::InvalidData(_))));

    let missing = load_static_file(&ImportConfig::new(dir.path().join("missing.skscene")));
    assert!(matches!(missing, Err(ImportError::Io(_))));
    Ok(())
}

#[test]
fn endless_animation_stack_is_rejected() -> Result<()> {
    let mut scene = arm_rig();
    scene.set_animation_stack(TimeSpan {
        start: 0.0,
        stop: f64::INFINITY,
    });
    let (_dir, file) = write_to_disk(&scene)?;

    let result = load_skinned_file(&ImportConfig::new(file.path()));
    assert!(matches!(result, Err(ImportError::InvalidData(_))));
    Ok(())
}
