// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! Structured parse/evaluation faults

use crate::parser::Offset;
use serde::Serialize;
use thiserror::Error;

/// The single fault kind surfaced by the parser and the evaluator.
///
/// Every fault is anchored at a source offset so the hosting application can
/// point at the offending character. Anything else escaping the core is a
/// defect, not a designed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{offset}: {message}")]
pub struct Fault {
    pub offset: Offset,
    pub message: String,
}

impl Fault {
    pub fn new(offset: Offset, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Fault>;
