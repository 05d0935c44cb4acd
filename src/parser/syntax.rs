// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! Syntax tree definitions and canonical-form printing
//!
//! Nodes are immutable once parsed. Module bodies are shared through `Arc`
//! so that every invocation references the same definition instead of
//! copying it.

use super::Offset;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

/// One statement of a program. Insertion order is execution order.
#[derive(Debug, Clone, Serialize)]
pub enum Syntax {
    Module(Arc<ModuleSyntax>),
    Const(ConstSyntax),
    Shape(ShapeSyntax),
    For(ForSyntax),
    Link(LinkSyntax),
    Comment(CommentSyntax),
}

impl Syntax {
    /// Re-emit this node as canonical text. Each node's output ends with a
    /// newline; nested bodies are indented two spaces per level.
    pub fn format(&self) -> String {
        match self {
            Syntax::Module(node) => node.format(),
            Syntax::Const(node) => node.format(),
            Syntax::Shape(node) => node.format(),
            Syntax::For(node) => node.format(),
            Syntax::Link(node) => node.format(),
            Syntax::Comment(node) => node.format(),
        }
    }
}

/// A named, parameterized subprogram: `as name(params) { body }`.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleSyntax {
    pub offset: Offset,
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Syntax>,
}

impl ModuleSyntax {
    fn format(&self) -> String {
        let mut out = format!("as {}({}) {{\n", self.name, self.params.join(", "));
        indent_body(&self.body, &mut out);
        out.push_str("}\n");
        out
    }
}

/// `const name = value;` — the value is kept as its raw token, either a
/// numeric literal or an identifier resolved at evaluation time.
#[derive(Debug, Clone, Serialize)]
pub struct ConstSyntax {
    pub offset: Offset,
    pub name: String,
    pub value: String,
}

impl ConstSyntax {
    fn format(&self) -> String {
        format!("const {} = {};\n", self.name, self.value)
    }
}

/// A shape or module invocation. At parse time any keyword is acceptable as
/// the name; resolution against builtins and module tables happens during
/// evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct ShapeSyntax {
    pub offset: Offset,
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Syntax>,
}

impl ShapeSyntax {
    fn format(&self) -> String {
        let mut out = self.name.clone();
        // Parentheses are omitted only for a zero-parameter invocation that
        // has a non-empty body.
        if !self.params.is_empty() || self.body.is_empty() {
            out.push('(');
            out.push_str(&self.params.join(", "));
            out.push(')');
        }
        if self.body.is_empty() {
            out.push_str(";\n");
        } else {
            out.push_str(" {\n");
            indent_body(&self.body, &mut out);
            out.push_str("}\n");
        }
        out
    }
}

/// `for(constant, start, end, delta) { body }` with raw value tokens.
#[derive(Debug, Clone, Serialize)]
pub struct ForSyntax {
    pub offset: Offset,
    pub constant: String,
    pub start: String,
    pub end: String,
    pub delta: String,
    pub body: Vec<Syntax>,
}

impl ForSyntax {
    fn format(&self) -> String {
        let mut out = format!(
            "for({}, {}, {}, {})",
            self.constant, self.start, self.end, self.delta
        );
        if self.body.is_empty() {
            out.push_str(";\n");
        } else {
            out.push_str(" {\n");
            indent_body(&self.body, &mut out);
            out.push_str("}\n");
        }
        out
    }
}

/// `link "url";` — import constants and modules from a remote program.
#[derive(Debug, Clone, Serialize)]
pub struct LinkSyntax {
    pub offset: Offset,
    pub url: Url,
}

impl LinkSyntax {
    fn format(&self) -> String {
        format!("link \"{}\";\n", self.url)
    }
}

/// Carried through parsing, ignored by evaluation. Round-trips as a line
/// comment or a block comment depending on whether the text spans lines.
#[derive(Debug, Clone, Serialize)]
pub struct CommentSyntax {
    pub text: String,
}

impl CommentSyntax {
    fn format(&self) -> String {
        if self.text.contains('\n') {
            format!("/*\n{}\n*/\n", self.text)
        } else {
            format!("// {}\n", self.text)
        }
    }
}

/// Append `body` to `out`, prefixing every line of each child's own
/// formatted text with two spaces.
fn indent_body(body: &[Syntax], out: &mut String) {
    for child in body {
        for line in child.format().lines() {
            if line.is_empty() {
                out.push('\n');
            } else {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }
}
