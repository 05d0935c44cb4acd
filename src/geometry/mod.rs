// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! Geometry kernel: meshes, planar profiles, primitives, booleans,
//! extrusions and STL output.

pub mod csg;
pub mod extrude;
pub mod mesh;
pub mod primitives;
pub mod profile;
pub mod stl;

pub use mesh::{Mesh, Triangle, Vertex};
pub use profile::Profile;

/// A 3D body backed by a triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct Solid {
    pub mesh: Mesh,
}

impl Solid {
    pub fn new(mesh: Mesh) -> Self {
        Self { mesh }
    }

    /// Neutral value for unsupported or empty solid geometry.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }
}

/// A 2D body backed by a planar profile.
#[derive(Debug, Clone, Default)]
pub struct Sketch {
    pub profile: Profile,
}

impl Sketch {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    /// Neutral value for unsupported or empty sketch geometry.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.profile.is_empty()
    }
}
