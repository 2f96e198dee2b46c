//! Query planner for composed queries
//!
//! Turns an operator chain over a remote resource collection into an
//! immutable plan, then into wire parameters.
//!
//! # Design Principles
//!
//! - Deterministic: same query, same plan
//! - All-or-nothing: a rejected shape yields no partial plan
//! - Explicit: chains the wire format cannot express are rejected, never
//!   approximated
//!
//! # Vocabulary
//!
//! `Where`, `OrderBy`, `OrderByDescending`, `Skip`, `Take`, `First`,
//! `FirstOrDefault`, `Any`. `Select` and `GroupBy` are recognized but not
//! implemented.

mod ast;
mod dispatch;
mod errors;
mod explain;
mod merger;
mod planner;
mod wire;

pub use ast::{OperatorCall, QueryArg, QueryExpr, SortOrder};
pub use dispatch::{is_known_operator, ArgShape};
pub use errors::{PlannerError, PlannerErrorCode, PlannerResult, Severity};
pub use explain::ExplainPlan;
pub use merger::{merge_all, merge_predicates};
pub use planner::{OrderSpec, Projection, QueryPlan, QueryPlanBuilder};
pub use wire::WireRequest;
