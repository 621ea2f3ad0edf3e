// src/scene/mod.rs

pub mod accessor;
pub mod error;
pub mod parser;
pub mod types;
pub mod writer;

use error::Result;
use parser::{resolve::resolve_scene, start::parse_scene_start};
use types::MemoryScene;

/// Parses a `.skscene` container and resolves its links.
pub fn read_scene(bytes: &[u8]) -> Result<MemoryScene> {
    let parsed = parse_scene_start(bytes)?;
    resolve_scene(parsed)
}
