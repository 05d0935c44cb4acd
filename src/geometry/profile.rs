// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! 2D planar profiles consumed by the extrusion operations

use nalgebra::{Matrix4, Point2, Point3};

/// Closed planar polygon, wound counter-clockwise.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub points: Vec<Point2<f64>>,
}

impl Profile {
    pub fn new(points: Vec<Point2<f64>>) -> Self {
        let mut profile = Self { points };
        if profile.signed_area() < 0.0 {
            profile.points.reverse();
        }
        profile
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.points.len() < 3
    }

    /// Shoelace area; positive for counter-clockwise winding.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            area += a.x * b.y - b.x * a.y;
        }
        area / 2.0
    }

    /// Apply an affine transform, projecting the result back onto the plane.
    /// Translation and rotation about the Z axis are exact; any out-of-plane
    /// component flattens back onto XY.
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for point in &mut self.points {
            let lifted = matrix.transform_point(&Point3::new(point.x, point.y, 0.0));
            *point = Point2::new(lifted.x, lifted.y);
        }
    }
}
