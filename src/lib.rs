use bevy::prelude::*;
pub mod animation;
pub mod config;
pub mod loader;
pub mod mesh;
pub mod pipeline;
pub mod scene;
pub mod skeleton;
pub mod skinning;

pub use animation::{AnimationClip, JointPose, Keyframe};
pub use config::{ImportConfig, ImportSettings};
use loader::SkinnedSceneLoader;
pub use loader::{SkinnedScene, ToBevyMesh};
pub use pipeline::{
    SkinnedAsset, StaticAsset, load_skinned, load_skinned_file, load_static, load_static_file,
};
pub use scene::accessor::SceneAccessor;
pub use scene::error::ImportError;
pub use scene::types::MemoryScene;

/// Registers the [`SkinnedScene`] asset and its `.skscene` loader.
pub struct SkinBakePlugin;
impl Plugin for SkinBakePlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<SkinnedScene>()
            .init_asset_loader::<SkinnedSceneLoader>();
    }
}
