//! Predicate expressions
//!
//! The AST the filter compiler renders and the plan builder merges.

mod ast;
mod literal;
mod rewrite;

pub use ast::{BinaryOp, Expr, Lambda, VarId, Variable};
pub use literal::{DateTimeKind, DateTimeValue, Literal};
pub use rewrite::{referenced_variables, substitute_variable};
