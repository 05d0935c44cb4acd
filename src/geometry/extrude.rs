// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! Linear and helical extrusion of planar profiles

use super::mesh::Mesh;
use super::profile::Profile;
use nalgebra::Point3;
use std::f64::consts::PI;

/// Extrude a profile straight up the Z axis, from z = 0 to z = `height`.
///
/// Caps are fan-triangulated, so the profile is assumed convex. Every
/// profile the builtin vocabulary produces is.
pub fn linear(profile: &Profile, height: f64) -> Mesh {
    if profile.is_empty() || height <= 0.0 {
        return Mesh::empty();
    }

    let mut mesh = Mesh::new();
    let bottom: Vec<Point3<f64>> = profile
        .points
        .iter()
        .map(|p| Point3::new(p.x, p.y, 0.0))
        .collect();
    let top: Vec<Point3<f64>> = profile
        .points
        .iter()
        .map(|p| Point3::new(p.x, p.y, height))
        .collect();

    let n = bottom.len();
    for i in 1..n - 1 {
        // Bottom cap faces -Z, top cap faces +Z
        mesh.add_face(bottom[0], bottom[i + 1], bottom[i]);
        mesh.add_face(top[0], top[i], top[i + 1]);
    }
    for i in 0..n {
        let j = (i + 1) % n;
        // Outward-facing side quad (profile is counter-clockwise)
        mesh.add_face(bottom[i], bottom[j], top[j]);
        mesh.add_face(bottom[i], top[j], top[i]);
    }
    mesh
}

/// Sweep a profile around the Z axis through `angle` radians, climbing
/// `pitch` units per full turn. The profile's X coordinate is the radial
/// distance from the axis, its Y coordinate the height offset.
pub fn helical(profile: &Profile, angle: f64, pitch: f64, segments_per_turn: u32) -> Mesh {
    if profile.is_empty() || angle <= 0.0 {
        return Mesh::empty();
    }

    let segments_per_turn = segments_per_turn.max(3);
    let steps = ((segments_per_turn as f64 * angle / (2.0 * PI)).ceil() as usize).max(1);

    let ring = |theta: f64| -> Vec<Point3<f64>> {
        let (sin, cos) = theta.sin_cos();
        let climb = pitch * theta / (2.0 * PI);
        profile
            .points
            .iter()
            .map(|p| Point3::new(p.x * cos, p.x * sin, p.y + climb))
            .collect()
    };

    let mut mesh = Mesh::new();
    let n = profile.points.len();
    let mut previous = ring(0.0);

    // Start cap faces back along the sweep
    for i in 1..n - 1 {
        mesh.add_face(previous[0], previous[i], previous[i + 1]);
    }

    for step in 1..=steps {
        let theta = angle * step as f64 / steps as f64;
        let current = ring(theta);
        for i in 0..n {
            let j = (i + 1) % n;
            mesh.add_face(previous[i], current[i], current[j]);
            mesh.add_face(previous[i], current[j], previous[j]);
        }
        previous = current;
    }

    // End cap faces forward along the sweep
    for i in 1..n - 1 {
        mesh.add_face(previous[0], previous[i + 1], previous[i]);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    fn unit_square() -> Profile {
        Profile::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ])
    }

    #[test]
    fn linear_extrude_spans_height() {
        let mesh = linear(&unit_square(), 5.0);
        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(min.z, 0.0);
        assert_relative_eq!(max.z, 5.0);
        // 2 caps x 2 triangles + 4 sides x 2 triangles
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn linear_extrude_of_empty_profile_is_empty() {
        assert!(linear(&Profile::empty(), 5.0).is_empty());
        assert!(linear(&unit_square(), 0.0).is_empty());
    }

    #[test]
    fn helical_full_turn_climbs_by_pitch() {
        let offset_square = Profile::new(vec![
            Point2::new(2.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(3.0, 1.0),
            Point2::new(2.0, 1.0),
        ]);
        let mesh = helical(&offset_square, 2.0 * PI, 4.0, 16);
        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(min.z, 0.0);
        assert_relative_eq!(max.z, 1.0 + 4.0, epsilon = 1e-9);
        // Radial extent matches the profile's X range
        assert!(max.x <= 3.0 + 1e-9);
    }

    #[test]
    fn helical_step_count_scales_with_angle() {
        let quarter = helical(&unit_square(), PI / 2.0, 0.0, 32);
        let full = helical(&unit_square(), 2.0 * PI, 0.0, 32);
        assert!(full.triangle_count() > quarter.triangle_count());
    }
}
