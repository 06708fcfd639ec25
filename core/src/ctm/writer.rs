//! CTM encoding.

use std::io::Cursor;

use crate::mesh::{AttributeFormat, MeshData, names};

use super::{CtmError, CtmMethod, FLAG_NORMALS, FORMAT_VERSION, MAGIC};

/// Encode a mesh as a CTM file.
///
/// `TEXCOORD_n` attributes become UV maps, `POSITION` and `NORMAL` their own
/// chunks, and every other attribute an attribute map padded to four
/// components. Submesh boundaries are not stored.
pub fn write_mesh(mesh: &MeshData, method: CtmMethod, comment: &str) -> Result<Vec<u8>, CtmError> {
    mesh.validate().map_err(CtmError::InvalidMesh)?;
    if mesh.triangle_count() == 0 {
        return Err(CtmError::InvalidMesh("mesh has no triangles".into()));
    }

    let normals = mesh
        .attribute(names::NORMAL)
        .filter(|a| a.format == AttributeFormat::Float3);
    let mut uv_maps: Vec<(usize, &[f32])> = mesh
        .attributes()
        .iter()
        .filter(|a| a.format == AttributeFormat::Float2)
        .filter_map(|a| {
            let set = a.name.strip_prefix("TEXCOORD_")?.parse().ok()?;
            Some((set, a.data.as_slice()))
        })
        .collect();
    uv_maps.sort_by_key(|(set, _)| *set);
    let attr_maps: Vec<_> = mesh
        .attributes()
        .iter()
        .filter(|a| a.name != names::POSITION)
        .filter(|a| !(a.name == names::NORMAL && normals.is_some()))
        .filter(|a| {
            !(a.format == AttributeFormat::Float2 && a.name.starts_with("TEXCOORD_"))
        })
        .collect();

    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&method.tag());
    out.extend_from_slice(&(mesh.vertex_count() as u32).to_le_bytes());
    out.extend_from_slice(&(mesh.triangle_count() as u32).to_le_bytes());
    out.extend_from_slice(&(uv_maps.len() as u32).to_le_bytes());
    out.extend_from_slice(&(attr_maps.len() as u32).to_le_bytes());
    let flags = if normals.is_some() { FLAG_NORMALS } else { 0 };
    out.extend_from_slice(&flags.to_le_bytes());
    write_string(&mut out, comment);

    out.extend_from_slice(b"INDX");
    let index_bytes: Vec<u8> = mesh.indices().iter().flat_map(|i| i.to_le_bytes()).collect();
    write_words(&mut out, &index_bytes, method)?;

    out.extend_from_slice(b"VERT");
    let positions = mesh
        .attribute(names::POSITION)
        .ok_or_else(|| CtmError::InvalidMesh("mesh has no POSITION attribute".into()))?;
    write_floats(&mut out, &positions.data, method)?;

    if let Some(normals) = normals {
        out.extend_from_slice(b"NORM");
        write_floats(&mut out, &normals.data, method)?;
    }

    for (set, coords) in &uv_maps {
        out.extend_from_slice(b"TEXC");
        write_string(&mut out, &names::tex_coord(*set));
        write_string(&mut out, "");
        write_floats(&mut out, coords, method)?;
    }

    for attr in attr_maps {
        out.extend_from_slice(b"ATTR");
        write_string(&mut out, &attr.name);
        let c = attr.format.components();
        let padded: Vec<f32> = attr
            .data
            .chunks_exact(c)
            .flat_map(|e| (0..4).map(move |i| e.get(i).copied().unwrap_or(0.0)))
            .collect();
        write_floats(&mut out, &padded, method)?;
    }

    Ok(out)
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn write_floats(out: &mut Vec<u8>, values: &[f32], method: CtmMethod) -> Result<(), CtmError> {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    write_words(out, &bytes, method)
}

/// Append an array of 4-byte words in the method's storage form.
fn write_words(out: &mut Vec<u8>, bytes: &[u8], method: CtmMethod) -> Result<(), CtmError> {
    match method {
        CtmMethod::Raw => {
            out.extend_from_slice(bytes);
            Ok(())
        }
        CtmMethod::Brotli => {
            let mut packed = Vec::new();
            brotli::BrotliCompress(
                &mut Cursor::new(bytes),
                &mut packed,
                &brotli::enc::BrotliEncoderParams {
                    quality: 6,
                    lgwin: 22,
                    ..Default::default()
                },
            )
            .map_err(CtmError::Io)?;
            out.extend_from_slice(&(packed.len() as u32).to_le_bytes());
            out.extend_from_slice(&packed);
            Ok(())
        }
    }
}
