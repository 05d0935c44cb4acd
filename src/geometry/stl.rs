// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! Binary STL serialization

use super::mesh::{face_normal, Mesh};
use std::io::Cursor;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

/// Serialize a mesh to a binary STL buffer.
///
/// STL normals are computed from each triangle's actual geometry rather
/// than taken from the stored vertex normals.
pub fn serialize(mesh: &Mesh) -> std::io::Result<Vec<u8>> {
    let triangles: Vec<StlTriangle> = mesh
        .triangles
        .iter()
        .map(|tri| {
            let v0 = &mesh.vertices[tri.indices[0]];
            let v1 = &mesh.vertices[tri.indices[1]];
            let v2 = &mesh.vertices[tri.indices[2]];
            let normal = face_normal(&v0.position, &v1.position, &v2.position);

            StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [
                    StlVertex::new([
                        v0.position.x as f32,
                        v0.position.y as f32,
                        v0.position.z as f32,
                    ]),
                    StlVertex::new([
                        v1.position.x as f32,
                        v1.position.y as f32,
                        v1.position.z as f32,
                    ]),
                    StlVertex::new([
                        v2.position.x as f32,
                        v2.position.y as f32,
                        v2.position.z as f32,
                    ]),
                ],
            }
        })
        .collect();

    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    stl_io::write_stl(&mut cursor, triangles.iter())?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives;
    use nalgebra::Vector3;

    #[test]
    fn binary_stl_layout() {
        let mesh = primitives::cuboid(Vector3::new(1.0, 1.0, 1.0), false);
        let bytes = serialize(&mesh).unwrap();
        // 80-byte header, u32 count, 50 bytes per triangle
        assert_eq!(bytes.len(), 80 + 4 + 50 * mesh.triangle_count());
        let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]);
        assert_eq!(count as usize, mesh.triangle_count());
    }

    #[test]
    fn empty_mesh_serializes_to_header_only() {
        let bytes = serialize(&Mesh::empty()).unwrap();
        assert_eq!(bytes.len(), 84);
    }
}
