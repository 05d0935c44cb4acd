// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! ascad
//!
//! A small declarative language for parametric CAD modeling. Programs
//! declare shapes, constants, modules, bounded loops and remote links;
//! evaluation produces a lazy shape tree that renders to binary STL.

pub mod error;
pub mod eval;
pub mod geometry;
pub mod parser;
pub mod shape;

pub use error::{Fault, Result};
pub use eval::links::{HttpFetcher, LinkCache, LinkFetcher};
pub use eval::Evaluator;
pub use geometry::{Mesh, Profile, Sketch, Solid};
pub use parser::{format, parse, Offset, Syntax};
pub use shape::{Builtin, ShapeNode};

/// Parse and evaluate a program, serializing every top-level solid into one
/// binary STL buffer.
pub fn render(source_name: &str, text: &str) -> Result<Vec<u8>> {
    let syntaxes = parser::parse(source_name, text)?;
    let root = Evaluator::new().evaluate(&syntaxes)?;
    root.to_stl()
}
