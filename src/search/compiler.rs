// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Condition Compiler
//!
//! Compiles a condition tree into a RediSearch query string.
//!
//! # Output Syntax
//!
//! ```text
//! @field:{value}            - eq
//! -@field:{value}           - ne
//! @field:[(value +inf]      - gt (exclusive lower bound)
//! @field:[-inf (value)]     - lt (exclusive upper bound)
//! @field:[value +inf]       - gte
//! @field:[-inf value]       - lte
//! @f:{a} | @f:{b}           - in
//! -@f:{a} -@f:{b}           - nin
//! @field:/.*value.*/        - like (unanchored)
//! (q1 AND q2)               - group, always parenthesized
//! *                         - no condition at all
//! ```
//!
//! Field names and values are inserted verbatim. Nothing is escaped, so the
//! caller must keep RediSearch special characters out of them.
//!
//! Values render through [`Scalar`](super::condition::Scalar)'s `Display`:
//! `null`, `true`/`false`, integers as-is, and floats in plain decimal
//! without an exponent (`1e21` becomes `1000000000000000000000`, `1e-7`
//! becomes `0.0000001`). RediSearch parses both forms to the same number.

use super::condition::{
    Condition, ConditionGroup, ConditionNode, ConditionValue, Operator, WhereClause,
};
use super::error::QueryError;

/// Query that matches every document in the index.
pub const MATCH_ALL: &str = "*";

/// Condition tree to RediSearch query compiler
pub struct ConditionCompiler;

impl ConditionCompiler {
    /// Compile an optional `where` clause. `None` compiles to [`MATCH_ALL`].
    pub fn compile(clause: Option<&WhereClause>) -> Result<String, QueryError> {
        match clause {
            None => Ok(MATCH_ALL.to_string()),
            Some(clause) => Self::compile_node(&clause.resolve()),
        }
    }

    /// Compile an already-resolved tree.
    pub fn compile_node(node: &ConditionNode) -> Result<String, QueryError> {
        match node {
            ConditionNode::Condition(condition) => Self::compile_condition(condition),
            ConditionNode::Group(group) => Self::compile_group(group),
        }
    }

    fn compile_group(group: &ConditionGroup) -> Result<String, QueryError> {
        let parts = group
            .operands
            .iter()
            .map(Self::compile_node)
            .collect::<Result<Vec<_>, _>>()?;
        let separator = format!(" {} ", group.combinator.keyword());
        Ok(format!("({})", parts.join(&separator)))
    }

    fn compile_condition(condition: &Condition) -> Result<String, QueryError> {
        let field = &condition.field;

        match (condition.operator, &condition.value) {
            (Operator::In, ConditionValue::List(values)) => Ok(values
                .iter()
                .map(|v| format!("@{}:{{{}}}", field, v))
                .collect::<Vec<_>>()
                .join(" | ")),
            (Operator::Nin, ConditionValue::List(values)) => Ok(values
                .iter()
                .map(|v| format!("-@{}:{{{}}}", field, v))
                .collect::<Vec<_>>()
                .join(" ")),
            (Operator::Eq, ConditionValue::Scalar(v)) => Ok(format!("@{}:{{{}}}", field, v)),
            (Operator::Ne, ConditionValue::Scalar(v)) => Ok(format!("-@{}:{{{}}}", field, v)),
            (Operator::Gt, ConditionValue::Scalar(v)) => Ok(format!("@{}:[({} +inf]", field, v)),
            (Operator::Lt, ConditionValue::Scalar(v)) => Ok(format!("@{}:[-inf ({})]", field, v)),
            (Operator::Gte, ConditionValue::Scalar(v)) => Ok(format!("@{}:[{} +inf]", field, v)),
            (Operator::Lte, ConditionValue::Scalar(v)) => Ok(format!("@{}:[-inf {}]", field, v)),
            (Operator::Like, ConditionValue::Scalar(v)) => Ok(format!("@{}:/.*{}.*/ ", field, v)),
            (op, _) => Err(QueryError::InvalidConditionFormat(format!(
                "operator '{}' on field '{}' expects a {} value",
                op,
                field,
                if op.takes_list() { "list" } else { "scalar" }
            ))),
        }
    }
}
