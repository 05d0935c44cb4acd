// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! Solid and profile primitive generators

use super::mesh::{Mesh, Triangle, Vertex};
use super::profile::Profile;
use nalgebra::{Point2, Point3, Vector3};
use std::f64::consts::PI;

/// Axis-aligned cuboid. Centered at the origin when `center` is set,
/// otherwise the minimum corner sits at the origin.
pub fn cuboid(size: Vector3<f64>, center: bool) -> Mesh {
    let mut mesh = Mesh::new();

    let (min_x, max_x) = if center {
        (-size.x / 2.0, size.x / 2.0)
    } else {
        (0.0, size.x)
    };
    let (min_y, max_y) = if center {
        (-size.y / 2.0, size.y / 2.0)
    } else {
        (0.0, size.y)
    };
    let (min_z, max_z) = if center {
        (-size.z / 2.0, size.z / 2.0)
    } else {
        (0.0, size.z)
    };

    let positions = [
        Point3::new(min_x, min_y, min_z),
        Point3::new(max_x, min_y, min_z),
        Point3::new(max_x, max_y, min_z),
        Point3::new(min_x, max_y, min_z),
        Point3::new(min_x, min_y, max_z),
        Point3::new(max_x, min_y, max_z),
        Point3::new(max_x, max_y, max_z),
        Point3::new(min_x, max_y, max_z),
    ];

    // 6 faces, two triangles each, with per-face normals
    let faces = [
        // Front (z+)
        ([4, 5, 6], Vector3::new(0.0, 0.0, 1.0)),
        ([4, 6, 7], Vector3::new(0.0, 0.0, 1.0)),
        // Back (z-)
        ([1, 0, 3], Vector3::new(0.0, 0.0, -1.0)),
        ([1, 3, 2], Vector3::new(0.0, 0.0, -1.0)),
        // Right (x+)
        ([5, 1, 2], Vector3::new(1.0, 0.0, 0.0)),
        ([5, 2, 6], Vector3::new(1.0, 0.0, 0.0)),
        // Left (x-)
        ([0, 4, 7], Vector3::new(-1.0, 0.0, 0.0)),
        ([0, 7, 3], Vector3::new(-1.0, 0.0, 0.0)),
        // Top (y+)
        ([7, 6, 2], Vector3::new(0.0, 1.0, 0.0)),
        ([7, 2, 3], Vector3::new(0.0, 1.0, 0.0)),
        // Bottom (y-)
        ([0, 1, 5], Vector3::new(0.0, -1.0, 0.0)),
        ([0, 5, 4], Vector3::new(0.0, -1.0, 0.0)),
    ];

    for (indices, normal) in faces {
        let v0 = mesh.add_vertex(Vertex::new(positions[indices[0]], normal));
        let v1 = mesh.add_vertex(Vertex::new(positions[indices[1]], normal));
        let v2 = mesh.add_vertex(Vertex::new(positions[indices[2]], normal));
        mesh.add_triangle(Triangle::new([v0, v1, v2]));
    }

    mesh
}

/// UV sphere centered at the origin.
pub fn sphere(radius: f64, segments: u32) -> Mesh {
    let mut mesh = Mesh::new();
    let stacks = segments.max(2);
    let slices = segments.max(3);

    for i in 0..=stacks {
        let phi = PI * i as f64 / stacks as f64;
        let z = radius * phi.cos();
        let r = radius * phi.sin();

        for j in 0..=slices {
            let theta = 2.0 * PI * j as f64 / slices as f64;
            let x = r * theta.cos();
            let y = r * theta.sin();

            let position = Point3::new(x, y, z);
            let normal = if radius > 0.0 {
                Vector3::new(x, y, z) / radius
            } else {
                Vector3::new(0.0, 0.0, 1.0)
            };
            mesh.add_vertex(Vertex::new(position, normal));
        }
    }

    for i in 0..stacks {
        for j in 0..slices {
            let first = (i * (slices + 1) + j) as usize;
            let second = first + slices as usize + 1;

            mesh.add_triangle(Triangle::new([first, second, first + 1]));
            mesh.add_triangle(Triangle::new([second, second + 1, first + 1]));
        }
    }

    mesh
}

/// Cylinder centered on the Z axis, spanning z ∈ [-h/2, h/2].
pub fn cylinder(radius: f64, height: f64, segments: u32) -> Mesh {
    let mut mesh = Mesh::new();
    let segments = segments.max(3);
    let bottom_z = -height / 2.0;
    let top_z = height / 2.0;

    let bottom_center = mesh.add_vertex(Vertex::new(
        Point3::new(0.0, 0.0, bottom_z),
        Vector3::new(0.0, 0.0, -1.0),
    ));
    let top_center = mesh.add_vertex(Vertex::new(
        Point3::new(0.0, 0.0, top_z),
        Vector3::new(0.0, 0.0, 1.0),
    ));

    let mut bottom_ring = Vec::with_capacity(segments as usize);
    let mut top_ring = Vec::with_capacity(segments as usize);
    for i in 0..segments {
        let angle = 2.0 * PI * i as f64 / segments as f64;
        let (sin, cos) = angle.sin_cos();
        let radial = Vector3::new(cos, sin, 0.0);

        bottom_ring.push(mesh.add_vertex(Vertex::new(
            Point3::new(radius * cos, radius * sin, bottom_z),
            radial,
        )));
        top_ring.push(mesh.add_vertex(Vertex::new(
            Point3::new(radius * cos, radius * sin, top_z),
            radial,
        )));
    }

    for i in 0..segments as usize {
        let next = (i + 1) % segments as usize;

        // Caps
        mesh.add_triangle(Triangle::new([bottom_center, bottom_ring[next], bottom_ring[i]]));
        mesh.add_triangle(Triangle::new([top_center, top_ring[i], top_ring[next]]));

        // Side quad
        mesh.add_triangle(Triangle::new([bottom_ring[i], top_ring[i], bottom_ring[next]]));
        mesh.add_triangle(Triangle::new([top_ring[i], top_ring[next], bottom_ring[next]]));
    }

    mesh
}

/// Regular polygon approximating a circle, centered at the origin.
pub fn circle(radius: f64, segments: u32) -> Profile {
    let segments = segments.max(3);
    let points = (0..segments)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / segments as f64;
            Point2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect();
    Profile::new(points)
}

/// Axis-aligned rectangle centered at the origin.
pub fn rect(width: f64, height: f64) -> Profile {
    let hw = width / 2.0;
    let hh = height / 2.0;
    Profile::new(vec![
        Point2::new(-hw, -hh),
        Point2::new(hw, -hh),
        Point2::new(hw, hh),
        Point2::new(-hw, hh),
    ])
}

/// Triangle from three side lengths (SSS). The first side lies on the X
/// axis. Side lengths that violate the triangle inequality degenerate to an
/// empty profile rather than faulting.
pub fn triangle_sss(a: f64, b: f64, c: f64) -> Profile {
    if a <= 0.0 {
        return Profile::empty();
    }
    // Apex at distance c from the origin and b from (a, 0)
    let x = (a * a + c * c - b * b) / (2.0 * a);
    let y_squared = c * c - x * x;
    if y_squared < 0.0 || !y_squared.is_finite() {
        return Profile::empty();
    }
    Profile::new(vec![
        Point2::new(0.0, 0.0),
        Point2::new(a, 0.0),
        Point2::new(x, y_squared.sqrt()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cuboid_corner_placement() {
        let mesh = cuboid(Vector3::new(10.0, 20.0, 30.0), false);
        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(min.x, 0.0);
        assert_relative_eq!(max.x, 10.0);
        assert_relative_eq!(max.y, 20.0);
        assert_relative_eq!(max.z, 30.0);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn cuboid_centered_placement() {
        let mesh = cuboid(Vector3::new(10.0, 10.0, 10.0), true);
        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(min.x, -5.0);
        assert_relative_eq!(max.x, 5.0);
    }

    #[test]
    fn sphere_stays_within_radius() {
        let mesh = sphere(7.0, 16);
        let (min, max) = mesh.bounds().unwrap();
        assert!(max.x <= 7.0 + 1e-9 && min.x >= -7.0 - 1e-9);
        assert!(mesh.triangle_count() > 0);
    }

    #[test]
    fn cylinder_is_centered_on_z() {
        let mesh = cylinder(5.0, 10.0, 16);
        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(min.z, -5.0);
        assert_relative_eq!(max.z, 5.0);
        // 2 centers + 2 rings of 16
        assert_eq!(mesh.vertex_count(), 2 + 16 * 2);
    }

    #[test]
    fn circle_area_approaches_pi_r_squared() {
        let profile = circle(2.0, 64);
        let expected = PI * 4.0;
        assert!((profile.signed_area() - expected).abs() / expected < 0.01);
    }

    #[test]
    fn rect_defaults_to_centered() {
        let profile = rect(4.0, 2.0);
        assert_relative_eq!(profile.signed_area(), 8.0);
        assert_relative_eq!(profile.points[0].x, -2.0);
    }

    #[test]
    fn equilateral_triangle_area() {
        let profile = triangle_sss(2.0, 2.0, 2.0);
        assert_relative_eq!(profile.signed_area(), 3.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn impossible_triangle_is_degenerate() {
        assert!(triangle_sss(1.0, 1.0, 5.0).is_empty());
        assert!(triangle_sss(0.0, 1.0, 1.0).is_empty());
    }
}
