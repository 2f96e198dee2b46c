//! wirequery - compiles strongly-typed query chains into query plans and
//! OData-like filter strings

pub mod cli;
pub mod config;
pub mod expr;
pub mod filter;
pub mod observability;
pub mod planner;
pub mod registry;
pub mod types;
