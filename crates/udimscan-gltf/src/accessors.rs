//! Buffer resolution and accessor reading.

use base64::Engine;
use gltf::accessor::{DataType, Dimensions};
use std::path::Path;

/// Contents of one glTF buffer, or why it could not be loaded.
pub(crate) type BufferData = Result<Vec<u8>, String>;

/// Loads every buffer of the document.
///
/// The GLB binary chunk and base64 data URIs are always available. Other
/// URIs are read relative to `base_dir` when one is given.
pub(crate) fn resolve_buffers(
    doc: &gltf::Document,
    blob: Option<&[u8]>,
    base_dir: Option<&Path>,
) -> Vec<BufferData> {
    doc.buffers()
        .map(|buffer| match buffer.source() {
            gltf::buffer::Source::Bin => blob
                .map(<[u8]>::to_vec)
                .ok_or_else(|| "GLB binary chunk is missing".to_string()),
            gltf::buffer::Source::Uri(uri) => resolve_uri(uri, base_dir),
        })
        .collect()
}

fn resolve_uri(uri: &str, base_dir: Option<&Path>) -> BufferData {
    if let Some(rest) = uri.strip_prefix("data:") {
        let (_, encoded) = rest
            .split_once(";base64,")
            .ok_or_else(|| "data URI is not base64 encoded".to_string())?;
        return base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| format!("invalid base64 buffer: {}", e));
    }

    match base_dir {
        Some(dir) => {
            let path = dir.join(uri);
            std::fs::read(&path).map_err(|e| format!("failed to read {}: {}", path.display(), e))
        }
        None => Err(format!(
            "external buffer '{}' cannot be resolved without a base directory",
            uri
        )),
    }
}

/// The bytes of the accessor's buffer view, plus the stride between elements.
fn view_bytes<'a>(
    accessor: &gltf::Accessor,
    buffers: &'a [BufferData],
    element_size: usize,
) -> Result<(&'a [u8], usize), String> {
    let view = accessor
        .view()
        .ok_or_else(|| format!("accessor {} has no buffer view", accessor.index()))?;

    let data = match buffers.get(view.buffer().index()) {
        Some(Ok(data)) => data,
        Some(Err(message)) => return Err(message.clone()),
        None => return Err(format!("buffer {} does not exist", view.buffer().index())),
    };

    let start = view.offset();
    let end = start
        .checked_add(view.length())
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            format!(
                "buffer view {} does not fit in buffer {} ({} bytes)",
                view.index(),
                view.buffer().index(),
                data.len()
            )
        })?;

    let stride = view.stride().unwrap_or(element_size).max(1);
    Ok((&data[start..end], stride))
}

/// Byte offsets of every element of the accessor within its view.
///
/// Fails unless the last element ends inside the view, so the offsets can
/// be indexed without further checks.
fn element_starts(
    accessor: &gltf::Accessor,
    view_len: usize,
    stride: usize,
    element_size: usize,
) -> Result<impl Iterator<Item = usize>, String> {
    let offset = accessor.offset();
    let count = accessor.count();
    if count > 0 {
        let end = (count - 1)
            .checked_mul(stride)
            .and_then(|last| last.checked_add(offset))
            .and_then(|last| last.checked_add(element_size));
        if !matches!(end, Some(end) if end <= view_len) {
            return Err(format!(
                "accessor {} ({} elements at offset {}) reads past the end of its buffer view",
                accessor.index(),
                count,
                offset
            ));
        }
    }
    Ok((0..count).map(move |i| offset + i * stride))
}

/// Reads a `VEC2` float accessor, typically `TEXCOORD_0`.
pub(crate) fn read_uvs(
    accessor: &gltf::Accessor,
    buffers: &[BufferData],
) -> Result<Vec<[f32; 2]>, String> {
    if accessor.data_type() != DataType::F32 || accessor.dimensions() != Dimensions::Vec2 {
        return Err(format!(
            "accessor {} is {:?} {:?}; only f32 VEC2 texture coordinates are supported",
            accessor.index(),
            accessor.data_type(),
            accessor.dimensions()
        ));
    }

    let (data, stride) = view_bytes(accessor, buffers, 8)?;

    let mut uvs = Vec::new();
    for start in element_starts(accessor, data.len(), stride, 8)? {
        let u = f32::from_le_bytes([
            data[start],
            data[start + 1],
            data[start + 2],
            data[start + 3],
        ]);
        let v = f32::from_le_bytes([
            data[start + 4],
            data[start + 5],
            data[start + 6],
            data[start + 7],
        ]);
        uvs.push([u, v]);
    }
    Ok(uvs)
}

/// Reads an unsigned integer index accessor.
pub(crate) fn read_indices(
    accessor: &gltf::Accessor,
    buffers: &[BufferData],
) -> Result<Vec<u32>, String> {
    let component_size = match accessor.data_type() {
        DataType::U8 => 1,
        DataType::U16 => 2,
        DataType::U32 => 4,
        other => {
            return Err(format!(
                "accessor {} has unsupported index type {:?}",
                accessor.index(),
                other
            ))
        }
    };

    let (data, stride) = view_bytes(accessor, buffers, component_size)?;

    let mut indices = Vec::new();
    for start in element_starts(accessor, data.len(), stride, component_size)? {
        let index = match component_size {
            1 => u32::from(data[start]),
            2 => u32::from(u16::from_le_bytes([data[start], data[start + 1]])),
            _ => u32::from_le_bytes([
                data[start],
                data[start + 1],
                data[start + 2],
                data[start + 3],
            ]),
        };
        indices.push(index);
    }
    Ok(indices)
}
