// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! Boolean set operations on meshes using BSP trees

use super::mesh::{Mesh, Triangle, Vertex};
use nalgebra::{Point3, Vector3};

const EPSILON: f64 = 1e-5;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

#[derive(Clone, Copy)]
struct Plane {
    normal: Vector3<f64>,
    w: f64,
}

#[derive(Clone)]
struct Polygon {
    vertices: Vec<Vertex>,
    plane: Plane,
}

impl Plane {
    fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let normal = (b - a).cross(&(c - a));
        if normal.norm() <= 0.0 {
            return None;
        }
        let normal = normal.normalize();
        Some(Self {
            normal,
            w: normal.dot(&a.coords),
        })
    }

    fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    fn classify(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.w
    }

    /// Split `polygon` by this plane, routing the pieces into the four
    /// output lists. Spanning polygons are cut along the plane with
    /// interpolated vertices.
    fn split_polygon(
        &self,
        polygon: &Polygon,
        coplanar_front: &mut Vec<Polygon>,
        coplanar_back: &mut Vec<Polygon>,
        front: &mut Vec<Polygon>,
        back: &mut Vec<Polygon>,
    ) {
        let mut polygon_type = COPLANAR;
        let mut types = Vec::with_capacity(polygon.vertices.len());
        for vertex in &polygon.vertices {
            let distance = self.classify(&vertex.position);
            let vertex_type = if distance < -EPSILON {
                BACK
            } else if distance > EPSILON {
                FRONT
            } else {
                COPLANAR
            };
            polygon_type |= vertex_type;
            types.push(vertex_type);
        }

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            }
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                let mut front_vertices = Vec::new();
                let mut back_vertices = Vec::new();
                let count = polygon.vertices.len();
                for i in 0..count {
                    let j = (i + 1) % count;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                    if ti != BACK {
                        front_vertices.push(vi);
                    }
                    if ti != FRONT {
                        back_vertices.push(vi);
                    }
                    if (ti | tj) == SPANNING {
                        let di = self.classify(&vi.position);
                        let dj = self.classify(&vj.position);
                        let t = di / (di - dj);
                        let normal = vi.normal + (vj.normal - vi.normal) * t;
                        let split = Vertex::new(
                            vi.position + (vj.position - vi.position) * t,
                            if normal.norm() > 0.0 {
                                normal.normalize()
                            } else {
                                vi.normal
                            },
                        );
                        front_vertices.push(split);
                        back_vertices.push(split);
                    }
                }
                if front_vertices.len() >= 3 {
                    front.push(Polygon {
                        vertices: front_vertices,
                        plane: polygon.plane,
                    });
                }
                if back_vertices.len() >= 3 {
                    back.push(Polygon {
                        vertices: back_vertices,
                        plane: polygon.plane,
                    });
                }
            }
        }
    }
}

impl Polygon {
    fn from_vertices(vertices: Vec<Vertex>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let plane = Plane::from_points(
            &vertices[0].position,
            &vertices[1].position,
            &vertices[2].position,
        )?;
        Some(Self { vertices, plane })
    }

    fn flip(&mut self) {
        self.vertices.reverse();
        for vertex in &mut self.vertices {
            vertex.normal = -vertex.normal;
        }
        self.plane.flip();
    }
}

/// BSP tree node over a set of polygons.
struct BspNode {
    plane: Option<Plane>,
    front: Option<Box<BspNode>>,
    back: Option<Box<BspNode>>,
    polygons: Vec<Polygon>,
}

impl BspNode {
    fn new(polygons: Vec<Polygon>) -> Self {
        let mut node = Self {
            plane: None,
            front: None,
            back: None,
            polygons: Vec::new(),
        };
        node.build(polygons);
        node
    }

    fn build(&mut self, polygons: Vec<Polygon>) {
        if polygons.is_empty() {
            return;
        }
        if self.plane.is_none() {
            self.plane = Some(polygons[0].plane);
        }
        // plane is Some from here on
        let Some(plane) = self.plane else {
            return;
        };

        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        let mut front_polys = Vec::new();
        let mut back_polys = Vec::new();
        for polygon in &polygons {
            plane.split_polygon(
                polygon,
                &mut coplanar_front,
                &mut coplanar_back,
                &mut front_polys,
                &mut back_polys,
            );
        }
        self.polygons.append(&mut coplanar_front);
        self.polygons.append(&mut coplanar_back);

        if !front_polys.is_empty() {
            self.front
                .get_or_insert_with(|| Box::new(BspNode::new(Vec::new())))
                .build(front_polys);
        }
        if !back_polys.is_empty() {
            self.back
                .get_or_insert_with(|| Box::new(BspNode::new(Vec::new())))
                .build(back_polys);
        }
    }

    fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = self.polygons.clone();
        if let Some(front) = &self.front {
            result.extend(front.all_polygons());
        }
        if let Some(back) = &self.back {
            result.extend(back.all_polygons());
        }
        result
    }

    /// Remove every part of this tree's polygons that lies inside `bsp`.
    fn clip_to(&mut self, bsp: &BspNode) {
        self.polygons = bsp.clip_polygons(std::mem::take(&mut self.polygons));
        if let Some(front) = &mut self.front {
            front.clip_to(bsp);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(bsp);
        }
    }

    /// Filter `polygons`, keeping the parts outside this tree's solid.
    fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = &self.plane else {
            return polygons;
        };

        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in &polygons {
            plane.split_polygon(
                polygon,
                &mut coplanar_front,
                &mut coplanar_back,
                &mut front,
                &mut back,
            );
        }
        // Coplanar pieces follow the side their normal faces
        front.append(&mut coplanar_front);
        back.append(&mut coplanar_back);

        let mut result = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        if let Some(node) = &self.back {
            result.extend(node.clip_polygons(back));
        }
        // Without a back child, polygons behind the final plane are inside
        // the solid and get dropped.
        result
    }

    fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }
        std::mem::swap(&mut self.front, &mut self.back);
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
    }
}

fn mesh_to_polygons(mesh: &Mesh) -> Vec<Polygon> {
    mesh.triangles
        .iter()
        .filter_map(|tri| {
            Polygon::from_vertices(vec![
                mesh.vertices[tri.indices[0]],
                mesh.vertices[tri.indices[1]],
                mesh.vertices[tri.indices[2]],
            ])
        })
        .collect()
}

fn polygons_to_mesh(polygons: &[Polygon]) -> Mesh {
    let mut mesh = Mesh::new();
    for polygon in polygons {
        // Fan-triangulate; BSP output polygons are convex
        for i in 1..polygon.vertices.len().saturating_sub(1) {
            let v0 = mesh.add_vertex(polygon.vertices[0]);
            let v1 = mesh.add_vertex(polygon.vertices[i]);
            let v2 = mesh.add_vertex(polygon.vertices[i + 1]);
            mesh.add_triangle(Triangle::new([v0, v1, v2]));
        }
    }
    mesh
}

/// A ∪ B. Merging the triangle soups produces valid geometry for rendering
/// and serialization; interior faces are not removed.
pub fn union(a: &Mesh, b: &Mesh) -> Mesh {
    let mut result = a.clone();
    result.merge(b);
    result
}

/// A − B. The retained B surface becomes the cavity wall, facing outward
/// from the result.
pub fn subtract(a: &Mesh, b: &Mesh) -> Mesh {
    if b.is_empty() {
        return a.clone();
    }
    if a.is_empty() {
        return Mesh::empty();
    }

    let mut tree_a = BspNode::new(mesh_to_polygons(a));
    let mut tree_b = BspNode::new(mesh_to_polygons(b));

    tree_a.invert();
    tree_a.clip_to(&tree_b);
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_b.clip_to(&tree_a);
    tree_b.invert();

    // tree_a is still inverted; one final flip restores A's orientation and
    // turns the kept B surface inside-out.
    let mut polygons = tree_a.all_polygons();
    polygons.extend(tree_b.all_polygons());
    for polygon in &mut polygons {
        polygon.flip();
    }
    polygons_to_mesh(&polygons)
}

/// A ∩ B.
pub fn intersect(a: &Mesh, b: &Mesh) -> Mesh {
    if a.is_empty() || b.is_empty() {
        return Mesh::empty();
    }

    let mut tree_a = BspNode::new(mesh_to_polygons(a));
    let mut tree_b = BspNode::new(mesh_to_polygons(b));

    tree_a.invert();
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_a.clip_to(&tree_b);
    tree_b.clip_to(&tree_a);

    // Both trees are inverted at this point
    let mut polygons = tree_a.all_polygons();
    polygons.extend(tree_b.all_polygons());
    for polygon in &mut polygons {
        polygon.flip();
    }
    polygons_to_mesh(&polygons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives;
    use nalgebra::{Matrix4, Vector3};

    fn cube_at(offset: f64) -> Mesh {
        let mut mesh = primitives::cuboid(Vector3::new(10.0, 10.0, 10.0), false);
        mesh.transform(&Matrix4::new_translation(&Vector3::new(offset, 0.0, 0.0)));
        mesh
    }

    #[test]
    fn union_merges_triangles() {
        let a = cube_at(0.0);
        let b = cube_at(20.0);
        let merged = union(&a, &b);
        assert_eq!(
            merged.triangle_count(),
            a.triangle_count() + b.triangle_count()
        );
    }

    #[test]
    fn subtract_clips_to_remaining_half() {
        let a = cube_at(0.0);
        let b = cube_at(5.0);
        let result = subtract(&a, &b);
        assert!(!result.is_empty());
        let (min, max) = result.bounds().unwrap();
        assert!(min.x >= -1e-4);
        assert!(max.x <= 5.0 + 1e-4);
    }

    #[test]
    fn subtract_disjoint_keeps_minuend() {
        let a = cube_at(0.0);
        let b = cube_at(100.0);
        let result = subtract(&a, &b);
        let (min, max) = result.bounds().unwrap();
        assert!(max.x <= 10.0 + 1e-4 && min.x >= -1e-4);
    }

    #[test]
    fn intersect_keeps_overlap_only() {
        let a = cube_at(0.0);
        let b = cube_at(5.0);
        let result = intersect(&a, &b);
        assert!(!result.is_empty());
        let (min, max) = result.bounds().unwrap();
        assert!(min.x >= 5.0 - 1e-4);
        assert!(max.x <= 10.0 + 1e-4);
    }

    #[test]
    fn intersect_disjoint_is_empty() {
        let a = cube_at(0.0);
        let b = cube_at(100.0);
        assert!(intersect(&a, &b).is_empty());
    }

    #[test]
    fn boolean_with_empty_operand() {
        let a = cube_at(0.0);
        let empty = Mesh::empty();
        assert_eq!(subtract(&a, &empty).triangle_count(), a.triangle_count());
        assert!(intersect(&a, &empty).is_empty());
    }
}
