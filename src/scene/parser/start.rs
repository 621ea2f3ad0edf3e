use super::blocks::*;
use super::helpers::read_string;
use super::{
    ANIMATION_STACK_BLOCK, FILE_VERSION, HEADER_LINE, MATERIAL_BLOCK, MESH_BLOCK, NODE_BLOCK,
    ParsedBlock, ParsedScene, SKIN_BLOCK, SceneHeader,
};
use crate::scene::error::{ImportError, Result};
use bevy::log::warn;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// Longest header line accepted before the terminating `\n`.
const MAX_HEADER_LEN: usize = 100;

/// Splits off the `\n`-terminated magic line. Returns the line without any
/// trailing `\r` and the offset of the first byte after it.
fn split_header_line(data: &[u8]) -> Result<(&str, usize)> {
    let end = data
        .iter()
        .take(MAX_HEADER_LEN + 1)
        .position(|&b| b == b'\n')
        .ok_or_else(|| {
            let reason = if data.len() > MAX_HEADER_LEN {
                "Header too long"
            } else {
                "EOF in header"
            };
            ImportError::InvalidData(reason.to_string())
        })?;
    let line = data[..end].strip_suffix(b"\r").unwrap_or(&data[..end]);
    match std::str::from_utf8(line) {
        Ok(line) if line == HEADER_LINE => Ok((line, end + 1)),
        _ => Err(ImportError::InvalidData(
            "Not a skinned scene file".to_string(),
        )),
    }
}

// --- Main Parsing Function ---
pub fn parse_scene_start(data: &[u8]) -> Result<ParsedScene> {
    // 1. Magic line
    let (magic, body_offset) = split_header_line(data)?;
    let version_string = magic.to_string();
    let mut cursor = Cursor::new(data);
    cursor.set_position(body_offset as u64);

    // 2. File version
    let file_version = cursor.read_u32::<LittleEndian>()?;
    if file_version != FILE_VERSION {
        warn!(
            "Expected scene version 0x{:08X}, found 0x{:08X}",
            FILE_VERSION, file_version
        );
    }

    // 3. Number of blocks
    let num_blocks = cursor.read_u32::<LittleEndian>()?;

    let header = SceneHeader {
        version_string,
        file_version,
        num_blocks,
    };
    let mut blocks: Vec<ParsedBlock> = Vec::with_capacity((num_blocks as usize).min(4096));

    // --- Block Reading Loop ---
    for i in 0..num_blocks {
        let block_type_name = read_string(&mut cursor)?;

        let parse_result = match block_type_name.as_str() {
            NODE_BLOCK => parse_node_fields(&mut cursor, i).map(ParsedBlock::Node),
            MESH_BLOCK => parse_mesh_fields(&mut cursor, i).map(ParsedBlock::Mesh),
            SKIN_BLOCK => parse_skin_fields(&mut cursor, i).map(ParsedBlock::Skin),
            MATERIAL_BLOCK => parse_material_fields(&mut cursor, i).map(ParsedBlock::Material),
            ANIMATION_STACK_BLOCK => {
                parse_animation_stack_fields(&mut cursor, i).map(ParsedBlock::AnimationStack)
            }
            unknown_type => {
                // Blocks carry no size prefix, so an unknown block cannot be skipped.
                Err(ImportError::UnsupportedBlockType(unknown_type.to_string()))
            }
        };

        match parse_result {
            Ok(parsed_block) => blocks.push(parsed_block),
            Err(e) => {
                warn!("Failed to parse block {}: {}", i, e);
                return Err(e);
            }
        }
    }

    if (cursor.position() as usize) < data.len() {
        warn!(
            "{} trailing bytes after the last block",
            data.len() - cursor.position() as usize
        );
    }

    Ok(ParsedScene { header, blocks })
}
