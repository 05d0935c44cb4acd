// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! Lazy shape tree produced by evaluation.
//!
//! A [`ShapeNode`] records a builtin name, numeric parameters and child
//! nodes; no geometry exists until [`ShapeNode::as_solid`] or
//! [`ShapeNode::as_sketch`] walks the tree. A node asked for a mode it does
//! not implement yields one neutral empty value rather than a fault.

use crate::error::{Fault, Result};
use crate::geometry::{csg, extrude, primitives, stl, Sketch, Solid};
use crate::parser::source::Offset;
use nalgebra::{Matrix4, Rotation3, Vector3};

/// Segment count used when a shape omits its tessellation parameter.
pub const DEFAULT_SEGMENTS: f64 = 32.0;

/// The builtin shape vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cube,
    Sphere,
    Cylinder,
    Union,
    Subtract,
    Intersect,
    Translate,
    Assemble,
    Rotate,
    Scale,
    Circle,
    Rect,
    Triangle,
    Extrude,
    ExtrudeHelical,
}

impl Builtin {
    /// Look up a builtin by its surface name. Names outside the vocabulary
    /// resolve to user modules instead.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cube" => Some(Self::Cube),
            "sphere" => Some(Self::Sphere),
            "cylinder" => Some(Self::Cylinder),
            "union" => Some(Self::Union),
            "subtract" => Some(Self::Subtract),
            "intersect" => Some(Self::Intersect),
            "translate" => Some(Self::Translate),
            "assemble" => Some(Self::Assemble),
            "rotate" => Some(Self::Rotate),
            "scale" => Some(Self::Scale),
            "circle" => Some(Self::Circle),
            "rect" => Some(Self::Rect),
            "triangle" => Some(Self::Triangle),
            "extrude" => Some(Self::Extrude),
            "extrude_helical" => Some(Self::ExtrudeHelical),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cube => "cube",
            Self::Sphere => "sphere",
            Self::Cylinder => "cylinder",
            Self::Union => "union",
            Self::Subtract => "subtract",
            Self::Intersect => "intersect",
            Self::Translate => "translate",
            Self::Assemble => "assemble",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
            Self::Circle => "circle",
            Self::Rect => "rect",
            Self::Triangle => "triangle",
            Self::Extrude => "extrude",
            Self::ExtrudeHelical => "extrude_helical",
        }
    }
}

/// One node of the shape tree.
#[derive(Debug, Clone)]
pub struct ShapeNode {
    pub offset: Offset,
    pub builtin: Builtin,
    pub params: Vec<f64>,
    pub children: Vec<ShapeNode>,
}

impl ShapeNode {
    pub fn new(offset: Offset, builtin: Builtin, params: Vec<f64>, children: Vec<ShapeNode>) -> Self {
        Self {
            offset,
            builtin,
            params,
            children,
        }
    }

    fn param(&self, index: usize) -> Result<f64> {
        self.params.get(index).copied().ok_or_else(|| {
            Fault::new(self.offset.clone(), format!("expected argument of ${index}"))
        })
    }

    fn uparam(&self, index: usize) -> Result<f64> {
        let param = self.param(index)?;
        if param < 0.0 {
            return Err(Fault::new(
                self.offset.clone(),
                format!("argument of ${index} must not be less than zero"),
            ));
        }
        Ok(param)
    }

    fn optional_param(&self, index: usize, default: f64) -> f64 {
        self.params.get(index).copied().unwrap_or(default)
    }

    fn optional_uparam(&self, index: usize, default: f64) -> Result<f64> {
        let param = self.optional_param(index, default);
        if param < 0.0 {
            return Err(Fault::new(
                self.offset.clone(),
                format!("argument of ${index} must not be less than zero"),
            ));
        }
        Ok(param)
    }

    /// Realize this subtree as 3D solids.
    pub fn as_solid(&self) -> Result<Vec<Solid>> {
        match self.builtin {
            Builtin::Cube => self.cube_solid(),
            Builtin::Sphere => self.sphere_solid(),
            Builtin::Cylinder => self.cylinder_solid(),
            Builtin::Union => self.boolean_solid(csg::union),
            Builtin::Subtract => self.boolean_solid(csg::subtract),
            Builtin::Intersect => self.boolean_solid(csg::intersect),
            Builtin::Translate => self.transform_solid(self.translation_matrix()?),
            Builtin::Rotate => self.transform_solid(self.rotation_matrix()?),
            Builtin::Scale => self.transform_solid(self.scaling_matrix()?),
            Builtin::Assemble => self.child_solids(),
            Builtin::Extrude => self.extrude_solid(),
            Builtin::ExtrudeHelical => self.extrude_helical_solid(),
            _ => Ok(vec![Solid::empty()]),
        }
    }

    /// Realize this subtree as 2D sketches.
    pub fn as_sketch(&self) -> Result<Vec<Sketch>> {
        match self.builtin {
            Builtin::Circle => self.circle_sketch(),
            Builtin::Rect => self.rect_sketch(),
            Builtin::Triangle => self.triangle_sketch(),
            Builtin::Translate => self.transform_sketch(self.translation_matrix()?),
            Builtin::Rotate => self.transform_sketch(self.rotation_matrix()?),
            Builtin::Scale => self.transform_sketch(self.scaling_matrix()?),
            Builtin::Assemble => self.child_sketches(),
            _ => Ok(vec![Sketch::empty()]),
        }
    }

    /// Realize the tree and serialize every solid into one binary STL buffer.
    pub fn to_stl(&self) -> Result<Vec<u8>> {
        let mut combined = crate::geometry::Mesh::new();
        for solid in self.as_solid()? {
            combined.merge(&solid.mesh);
        }
        stl::serialize(&combined)
            .map_err(|error| Fault::new(self.offset.clone(), error.to_string()))
    }

    fn child_solids(&self) -> Result<Vec<Solid>> {
        let mut solids = Vec::new();
        for child in &self.children {
            solids.extend(child.as_solid()?);
        }
        Ok(solids)
    }

    fn child_sketches(&self) -> Result<Vec<Sketch>> {
        let mut sketches = Vec::new();
        for child in &self.children {
            sketches.extend(child.as_sketch()?);
        }
        Ok(sketches)
    }

    fn cube_solid(&self) -> Result<Vec<Solid>> {
        let width = self.uparam(0)?;
        let height = self.optional_uparam(1, width)?;
        let depth = self.optional_uparam(2, height)?;
        let center = self.optional_param(3, 0.0) != 0.0;
        Ok(vec![Solid::new(primitives::cuboid(
            Vector3::new(width, height, depth),
            center,
        ))])
    }

    fn sphere_solid(&self) -> Result<Vec<Solid>> {
        let radius = self.uparam(0)?;
        let segments = self.optional_uparam(1, DEFAULT_SEGMENTS)?;
        Ok(vec![Solid::new(primitives::sphere(radius, segments as u32))])
    }

    fn cylinder_solid(&self) -> Result<Vec<Solid>> {
        let radius = self.uparam(0)?;
        let height = self.uparam(1)?;
        let segments = self.optional_uparam(2, DEFAULT_SEGMENTS)?;
        Ok(vec![Solid::new(primitives::cylinder(
            radius,
            height,
            segments as u32,
        ))])
    }

    /// Boolean over the first child's solids against all remaining
    /// children's solids, folded left. Zero children yield one neutral
    /// empty solid.
    fn boolean_solid(
        &self,
        op: fn(&crate::geometry::Mesh, &crate::geometry::Mesh) -> crate::geometry::Mesh,
    ) -> Result<Vec<Solid>> {
        let Some((first, rest)) = self.children.split_first() else {
            return Ok(vec![Solid::empty()]);
        };
        let mut others = Vec::new();
        for child in rest {
            others.extend(child.as_solid()?);
        }
        first
            .as_solid()?
            .into_iter()
            .map(|solid| {
                let mesh = others
                    .iter()
                    .fold(solid.mesh, |mesh, other| op(&mesh, &other.mesh));
                Ok(Solid::new(mesh))
            })
            .collect()
    }

    fn translation_matrix(&self) -> Result<Matrix4<f64>> {
        let x = self.param(0)?;
        let y = self.param(1)?;
        let z = self.param(2)?;
        Ok(Matrix4::new_translation(&Vector3::new(x, y, z)))
    }

    /// Euler rotation in radians, applied X then Y then Z.
    fn rotation_matrix(&self) -> Result<Matrix4<f64>> {
        let x = self.param(0)?;
        let y = self.param(1)?;
        let z = self.param(2)?;
        Ok(Rotation3::from_euler_angles(x, y, z).to_homogeneous())
    }

    fn scaling_matrix(&self) -> Result<Matrix4<f64>> {
        let x = self.uparam(0)?;
        let y = self.optional_uparam(1, x)?;
        let z = self.optional_uparam(2, y)?;
        Ok(Matrix4::new_nonuniform_scaling(&Vector3::new(x, y, z)))
    }

    fn transform_solid(&self, matrix: Matrix4<f64>) -> Result<Vec<Solid>> {
        let mut solids = self.child_solids()?;
        for solid in &mut solids {
            solid.mesh.transform(&matrix);
        }
        Ok(solids)
    }

    fn transform_sketch(&self, matrix: Matrix4<f64>) -> Result<Vec<Sketch>> {
        let mut sketches = self.child_sketches()?;
        for sketch in &mut sketches {
            sketch.profile.transform(&matrix);
        }
        Ok(sketches)
    }

    fn extrude_solid(&self) -> Result<Vec<Solid>> {
        let height = self.uparam(0)?;
        let mut solids = Vec::new();
        for child in &self.children {
            let mut mesh = crate::geometry::Mesh::new();
            for sketch in child.as_sketch()? {
                mesh.merge(&extrude::linear(&sketch.profile, height));
            }
            solids.push(Solid::new(mesh));
        }
        Ok(solids)
    }

    fn extrude_helical_solid(&self) -> Result<Vec<Solid>> {
        let angle = self.uparam(0)?;
        let pitch = self.uparam(1)?;
        let segments = self.optional_uparam(2, DEFAULT_SEGMENTS)?;
        let mut solids = Vec::new();
        for child in &self.children {
            for sketch in child.as_sketch()? {
                solids.push(Solid::new(extrude::helical(
                    &sketch.profile,
                    angle,
                    pitch,
                    segments as u32,
                )));
            }
        }
        Ok(solids)
    }

    fn circle_sketch(&self) -> Result<Vec<Sketch>> {
        let radius = self.uparam(0)?;
        let segments = self.optional_uparam(1, DEFAULT_SEGMENTS)?;
        Ok(vec![Sketch::new(primitives::circle(radius, segments as u32))])
    }

    fn rect_sketch(&self) -> Result<Vec<Sketch>> {
        let width = self.uparam(0)?;
        let height = self.optional_uparam(1, width)?;
        Ok(vec![Sketch::new(primitives::rect(width, height))])
    }

    fn triangle_sketch(&self) -> Result<Vec<Sketch>> {
        let a = self.uparam(0)?;
        let b = self.optional_uparam(1, a)?;
        let c = self.optional_uparam(2, b)?;
        Ok(vec![Sketch::new(primitives::triangle_sss(a, b, c))])
    }
}
