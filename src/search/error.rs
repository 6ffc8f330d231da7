// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use thiserror::Error;

/// Errors raised while decoding or compiling a condition tree.
///
/// Both variants are caller errors: nothing is retried and no partial
/// query string is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The input matches none of the recognized node shapes.
    #[error("Invalid condition format: {0}")]
    InvalidConditionFormat(String),
    /// A leaf condition names an operator outside the supported set.
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
}
