// src/scene/parser/helpers.rs

use crate::scene::error::{ImportError, Result};
use bevy::math::{Quat, Vec2, Vec3};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

/// Represents links to other blocks by index. `-1` on disk is `None`.
pub type RecordLink = Option<usize>;

pub const MAX_STRING_LEN: u32 = 819_200;
pub const MAX_LIST_LEN: u32 = 1 << 24;

pub fn read_string(cursor: &mut Cursor<&[u8]>) -> Result<String> {
    let len = cursor.read_u32::<LittleEndian>()?;
    if len > MAX_STRING_LEN {
        return Err(ImportError::InvalidData(format!(
            "String length too long: {}",
            len
        )));
    }
    if len == 0 {
        return Ok(String::new());
    }
    let mut buf = vec![0u8; len as usize];
    cursor.read_exact(&mut buf)?;
    Ok(String::from_utf8(buf)?)
}

pub fn read_count(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<usize> {
    let count = cursor.read_u32::<LittleEndian>()?;
    if count > MAX_LIST_LEN {
        return Err(ImportError::InvalidData(format!(
            "{} count too high: {}",
            what, count
        )));
    }
    Ok(count as usize)
}

pub fn read_link(cursor: &mut Cursor<&[u8]>) -> Result<RecordLink> {
    let index = cursor.read_i32::<LittleEndian>()?;
    if index < -1 {
        Err(ImportError::InvalidData(format!(
            "Invalid link index: {}",
            index
        )))
    } else if index == -1 {
        Ok(None)
    } else {
        Ok(Some(index as usize))
    }
}

pub fn read_link_list(cursor: &mut Cursor<&[u8]>) -> Result<Vec<RecordLink>> {
    read_list(cursor, "Link list", read_link)
}

pub fn read_vector2(cursor: &mut Cursor<&[u8]>) -> Result<Vec2> {
    Ok(Vec2::new(
        cursor.read_f32::<LittleEndian>()?,
        cursor.read_f32::<LittleEndian>()?,
    ))
}

pub fn read_vector3(cursor: &mut Cursor<&[u8]>) -> Result<Vec3> {
    Ok(Vec3::new(
        cursor.read_f32::<LittleEndian>()?,
        cursor.read_f32::<LittleEndian>()?,
        cursor.read_f32::<LittleEndian>()?,
    ))
}

// Stored as x, y, z, w.
pub fn read_quaternion(cursor: &mut Cursor<&[u8]>) -> Result<Quat> {
    Ok(Quat::from_xyzw(
        cursor.read_f32::<LittleEndian>()?,
        cursor.read_f32::<LittleEndian>()?,
        cursor.read_f32::<LittleEndian>()?,
        cursor.read_f32::<LittleEndian>()?,
    ))
}

pub fn read_u32_list(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<Vec<u32>> {
    read_list(cursor, what, |c| Ok(c.read_u32::<LittleEndian>()?))
}

pub fn read_f32_list(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<Vec<f32>> {
    read_list(cursor, what, |c| Ok(c.read_f32::<LittleEndian>()?))
}

pub fn read_string_list(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<Vec<String>> {
    read_list(cursor, what, read_string)
}

/// Reads a `u32` count followed by that many items.
pub fn read_list<'a, T>(
    cursor: &mut Cursor<&'a [u8]>,
    what: &str,
    mut read_item: impl FnMut(&mut Cursor<&'a [u8]>) -> Result<T>,
) -> Result<Vec<T>> {
    let count = read_count(cursor, what)?;
    // Don't trust the count for the allocation size.
    let mut items = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        items.push(read_item(cursor)?);
    }
    Ok(items)
}

pub fn read_keys<'a, T>(
    cursor: &mut Cursor<&'a [u8]>,
    what: &str,
    mut read_value: impl FnMut(&mut Cursor<&'a [u8]>) -> Result<T>,
) -> Result<Vec<(f32, T)>> {
    let keys = read_list(cursor, what, |c| {
        let time = c.read_f32::<LittleEndian>()?;
        Ok((time, read_value(c)?))
    })?;
    if keys.windows(2).any(|pair| pair[1].0 < pair[0].0) {
        return Err(ImportError::InvalidData(format!(
            "{} keys are not sorted by time",
            what
        )));
    }
    Ok(keys)
}

/// Maps a block link onto a typed id table built during resolution.
pub fn resolve_link(table: &[Option<usize>], block: usize, link: usize) -> Result<usize> {
    table
        .get(link)
        .copied()
        .flatten()
        .ok_or(ImportError::DanglingLink { block, link })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_one_link_is_none() {
        let bytes = (-1i32).to_le_bytes();
        let mut cursor = Cursor::new(&bytes[..]);
        assert_eq!(read_link(&mut cursor).unwrap(), None);
    }

    #[test]
    fn links_below_negative_one_are_rejected() {
        let bytes = (-7i32).to_le_bytes();
        let mut cursor = Cursor::new(&bytes[..]);
        assert!(matches!(
            read_link(&mut cursor),
            Err(ImportError::InvalidData(_))
        ));
    }

    #[test]
    fn oversized_string_lengths_fail_before_allocating() {
        let bytes = (MAX_STRING_LEN + 1).to_le_bytes();
        let mut cursor = Cursor::new(&bytes[..]);
        assert!(matches!(
            read_string(&mut cursor),
            Err(ImportError::InvalidData(_))
        ));
    }

    #[test]
    fn truncated_lists_surface_io_errors() {
        let mut bytes = 3u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        let mut cursor = Cursor::new(&bytes[..]);
        assert!(matches!(
            read_u32_list(&mut cursor, "Index"),
            Err(ImportError::Io(_))
        ));
    }
}
