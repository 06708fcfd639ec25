//! CTM decoding.

use std::io::Read;
use std::path::Path;

use crate::mesh::{AttributeFormat, MeshData, VertexAttribute, names};

use super::{CtmError, CtmMesh, CtmMethod, FLAG_NORMALS, FORMAT_VERSION, MAGIC};

/// Read and decode a CTM file from disk.
pub fn read_mesh_file(path: &Path) -> Result<CtmMesh, CtmError> {
    let data = std::fs::read(path)?;
    read_mesh(&data)
}

/// Decode a CTM file from memory.
pub fn read_mesh(data: &[u8]) -> Result<CtmMesh, CtmError> {
    let mut r = ByteReader::new(data);

    if r.read_tag()? != MAGIC {
        return Err(CtmError::InvalidFile("bad magic".into()));
    }
    let version = r.read_u32()?;
    if version != FORMAT_VERSION {
        return Err(CtmError::UnsupportedFormatVersion(version));
    }
    let tag = r.read_tag()?;
    let method = CtmMethod::from_tag(tag).ok_or(CtmError::UnsupportedMethod(tag))?;

    let vertex_count = r.read_u32()? as usize;
    let triangle_count = r.read_u32()? as usize;
    let uv_map_count = r.read_u32()? as usize;
    let attr_map_count = r.read_u32()? as usize;
    let flags = r.read_u32()?;
    let comment = r.read_string()?;

    if vertex_count == 0 {
        return Err(CtmError::InvalidMesh("mesh has no vertices".into()));
    }
    if triangle_count == 0 {
        return Err(CtmError::InvalidMesh("mesh has no triangles".into()));
    }

    r.expect_tag(b"INDX")?;
    let indices = r.read_u32_array(triangle_count * 3, method)?;
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(CtmError::InvalidMesh(format!(
            "index {bad} out of range for {vertex_count} vertices"
        )));
    }

    r.expect_tag(b"VERT")?;
    let positions = r.read_f32_array(vertex_count * 3, method)?;
    check_finite("vertex", &positions)?;
    let mut attributes = vec![VertexAttribute::new(
        names::POSITION,
        AttributeFormat::Float3,
        positions,
    )];

    if flags & FLAG_NORMALS != 0 {
        r.expect_tag(b"NORM")?;
        let normals = r.read_f32_array(vertex_count * 3, method)?;
        check_finite("normal", &normals)?;
        attributes.push(VertexAttribute::new(
            names::NORMAL,
            AttributeFormat::Float3,
            normals,
        ));
    }

    for set in 0..uv_map_count {
        r.expect_tag(b"TEXC")?;
        let name = r.read_string()?;
        let file_name = r.read_string()?;
        log::trace!("CTM UV map {set}: {name:?} ({file_name:?})");
        let coords = r.read_f32_array(vertex_count * 2, method)?;
        check_finite("texture coordinate", &coords)?;
        attributes.push(VertexAttribute::new(
            names::tex_coord(set),
            AttributeFormat::Float2,
            coords,
        ));
    }

    for _ in 0..attr_map_count {
        r.expect_tag(b"ATTR")?;
        let name = r.read_string()?;
        let values = r.read_f32_array(vertex_count * 4, method)?;
        check_finite("attribute", &values)?;
        if attributes.iter().any(|a| a.name == name) {
            return Err(CtmError::InvalidMesh(format!(
                "duplicate attribute map {name:?}"
            )));
        }
        attributes.push(VertexAttribute::new(name, AttributeFormat::Float4, values));
    }

    let mut mesh = MeshData::new(attributes, indices);
    if !comment.is_empty() {
        mesh = mesh.with_label(comment.clone());
    }

    Ok(CtmMesh {
        comment,
        method,
        mesh,
    })
}

fn check_finite(what: &str, values: &[f32]) -> Result<(), CtmError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(CtmError::InvalidMesh(format!(
            "non-finite {what} component at {i}"
        ))),
        None => Ok(()),
    }
}

/// Bounds-checked little-endian reader over a byte slice.
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CtmError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                CtmError::InvalidFile(format!("unexpected end of file at byte {}", self.pos))
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_tag(&mut self) -> Result<[u8; 4], CtmError> {
        let bytes = self.take(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn expect_tag(&mut self, tag: &[u8; 4]) -> Result<(), CtmError> {
        let found = self.read_tag()?;
        if &found != tag {
            return Err(CtmError::InvalidFile(format!(
                "expected chunk {:?}, found {:?}",
                String::from_utf8_lossy(tag),
                String::from_utf8_lossy(&found)
            )));
        }
        Ok(())
    }

    fn read_u32(&mut self) -> Result<u32, CtmError> {
        let tag = self.read_tag()?;
        Ok(u32::from_le_bytes(tag))
    }

    fn read_string(&mut self) -> Result<String, CtmError> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| CtmError::InvalidFile("string is not valid UTF-8".into()))
    }

    /// Read `count` 4-byte words, decompressing when the method requires it.
    fn read_words(&mut self, count: usize, method: CtmMethod) -> Result<Vec<u8>, CtmError> {
        let byte_len = count
            .checked_mul(4)
            .ok_or_else(|| CtmError::InvalidFile("array size overflow".into()))?;
        match method {
            CtmMethod::Raw => Ok(self.take(byte_len)?.to_vec()),
            CtmMethod::Brotli => {
                let packed_len = self.read_u32()? as usize;
                let packed = self.take(packed_len)?;
                // Header counts are untrusted: grow with the real output and
                // stop one byte past the expected size.
                let mut unpacked = Vec::new();
                brotli::Decompressor::new(packed, 4096)
                    .take(byte_len as u64 + 1)
                    .read_to_end(&mut unpacked)
                    .map_err(|e| CtmError::Decompress(e.to_string()))?;
                if unpacked.len() != byte_len {
                    return Err(CtmError::InvalidFile(format!(
                        "packed array holds {} bytes, expected {byte_len}",
                        unpacked.len()
                    )));
                }
                Ok(unpacked)
            }
        }
    }

    fn read_u32_array(&mut self, count: usize, method: CtmMethod) -> Result<Vec<u32>, CtmError> {
        let bytes = self.read_words(count, method)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    fn read_f32_array(&mut self, count: usize, method: CtmMethod) -> Result<Vec<f32>, CtmError> {
        let bytes = self.read_words(count, method)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctm::write_mesh;

    fn triangle_with_uvs() -> MeshData {
        MeshData::new(
            vec![
                VertexAttribute::from_vec3(
                    names::POSITION,
                    &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                ),
                VertexAttribute::from_vec3(names::NORMAL, &[[0.0, 0.0, 1.0]; 3]),
                VertexAttribute::from_vec2(
                    names::tex_coord(0),
                    &[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
                ),
                VertexAttribute::from_vec4("Ambient", &[[0.5, 0.5, 0.5, 1.0]; 3]),
            ],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn brotli_file_decodes_all_chunks() {
        let bytes = write_mesh(&triangle_with_uvs(), CtmMethod::Brotli, "unit triangle").unwrap();
        let decoded = read_mesh(&bytes).unwrap();

        assert_eq!(decoded.method, CtmMethod::Brotli);
        assert_eq!(decoded.comment, "unit triangle");
        let mesh = &decoded.mesh;
        assert_eq!(mesh.label(), Some("unit triangle"));
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.attribute_count(), 4);
        assert_eq!(mesh.positions()[1], [1.0, 0.0, 0.0]);
        assert_eq!(
            mesh.attribute("Ambient").unwrap().element(2),
            Some(&[0.5, 0.5, 0.5, 1.0][..])
        );
    }

    #[test]
    fn bad_magic_is_invalid_file() {
        let err = read_mesh(b"NOPE\x05\x00\x00\x00").unwrap_err();
        assert!(matches!(err, CtmError::InvalidFile(_)));
    }

    #[test]
    fn truncated_file_is_invalid_file() {
        let bytes = write_mesh(&triangle_with_uvs(), CtmMethod::Raw, "").unwrap();
        let err = read_mesh(&bytes[..bytes.len() - 5]).unwrap_err();
        assert!(matches!(err, CtmError::InvalidFile(_)), "got {err}");
    }

    #[test]
    fn version_and_method_are_checked() {
        let mut bytes = write_mesh(&triangle_with_uvs(), CtmMethod::Raw, "").unwrap();
        bytes[4] = 4;
        assert!(matches!(
            read_mesh(&bytes).unwrap_err(),
            CtmError::UnsupportedFormatVersion(4)
        ));

        bytes[4] = 5;
        bytes[8..12].copy_from_slice(b"LZMA");
        let err = read_mesh(&bytes).unwrap_err();
        assert!(matches!(err, CtmError::UnsupportedMethod(_)));
        assert!(err.to_string().contains("LZMA"));
    }

    #[test]
    fn corrupt_stream_is_decompress_error() {
        let mut bytes = write_mesh(&triangle_with_uvs(), CtmMethod::Brotli, "").unwrap();
        // Header is 36 bytes with an empty comment; INDX tag, packed length, then the stream.
        let stream_start = 36 + 4 + 4;
        for b in &mut bytes[stream_start..stream_start + 6] {
            *b = 0xFF;
        }
        let err = read_mesh(&bytes).unwrap_err();
        assert!(
            matches!(
                err,
                CtmError::Decompress(_) | CtmError::InvalidFile(_) | CtmError::InvalidMesh(_)
            ),
            "got {err}"
        );
    }

    fn brotli_header(vertices: u32, triangles: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"OCTM");
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(b"BRT1");
        for value in [vertices, triangles, 0, 0, 0, 0] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(b"INDX");
        bytes
    }

    #[test]
    fn huge_triangle_count_is_rejected_without_allocating() {
        let mut bytes = brotli_header(3, u32::MAX);
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.push(0);
        assert_eq!(bytes.len(), 45);
        let err = read_mesh(&bytes).unwrap_err();
        assert!(
            matches!(err, CtmError::Decompress(_) | CtmError::InvalidFile(_)),
            "got {err}"
        );
    }

    #[test]
    fn oversized_stream_is_invalid_file() {
        let mut packed = Vec::new();
        brotli::BrotliCompress(
            &mut std::io::Cursor::new(vec![0u8; 1 << 20]),
            &mut packed,
            &brotli::enc::BrotliEncoderParams::default(),
        )
        .unwrap();

        let mut bytes = brotli_header(3, 1);
        bytes.extend_from_slice(&(packed.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&packed);
        let err = read_mesh(&bytes).unwrap_err();
        assert!(matches!(err, CtmError::InvalidFile(_)), "got {err}");
        assert!(err.to_string().contains("expected 12"));
    }

    #[test]
    fn out_of_range_index_is_invalid_mesh() {
        let mut bytes = write_mesh(&triangle_with_uvs(), CtmMethod::Raw, "").unwrap();
        // First index follows the 36-byte header and the INDX tag.
        bytes[40..44].copy_from_slice(&9u32.to_le_bytes());
        let err = read_mesh(&bytes).unwrap_err();
        assert!(matches!(err, CtmError::InvalidMesh(_)));
    }
}
