//! Explain output
//!
//! Produces deterministic, human-readable explain output for a plan or a
//! rejection.

use std::fmt;

use crate::filter::{FilterCompiler, FilterError};

use super::errors::PlannerError;
use super::planner::QueryPlan;

/// Explain plan output
#[derive(Debug, Clone)]
pub struct ExplainPlan {
    /// Whether planning succeeded
    pub accepted: bool,
    pub element_type: Option<String>,
    /// Compiled filter, or the reason it could not be compiled
    pub filter: Option<String>,
    pub order: Option<String>,
    pub skip: Option<u64>,
    /// `None` with an accepted plan means unbounded
    pub take: Option<u64>,
    pub projection: Option<String>,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a successful query plan
    pub fn from_plan(plan: &QueryPlan, compiler: &FilterCompiler<'_>) -> Self {
        let render = |result: Result<String, FilterError>| match result {
            Ok(text) => text,
            Err(err) => format!("<{}: {}>", err.code(), err),
        };

        let filter = plan.predicate().map(|p| render(compiler.compile(p)));
        let order = plan
            .order()
            .map(|o| format!("{} {}", render(compiler.compile_selector(&o.key)), o.order.as_str()));

        Self {
            accepted: true,
            element_type: Some(plan.element_type().to_string()),
            filter,
            order,
            skip: Some(plan.skip()),
            take: plan.take(),
            projection: Some(plan.projection().as_str().to_string()),
            rejection_reason: None,
            rejection_code: None,
        }
    }

    /// Creates an explain plan from a planning error
    pub fn from_error(err: &PlannerError) -> Self {
        Self {
            accepted: false,
            element_type: None,
            filter: None,
            order: None,
            skip: None,
            take: None,
            projection: None,
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            if let Some(ty) = &self.element_type {
                writeln!(f, "Element Type: {}", ty)?;
            }
            if let Some(projection) = &self.projection {
                writeln!(f, "Projection: {}", projection)?;
            }
            if let Some(filter) = &self.filter {
                writeln!(f, "Filter: {}", filter)?;
            }
            if let Some(order) = &self.order {
                writeln!(f, "Order: {}", order)?;
            }
            if let Some(skip) = self.skip {
                writeln!(f, "Skip: {}", skip)?;
            }
            match self.take {
                Some(take) => writeln!(f, "Take: {}", take)?,
                None => writeln!(f, "Take: unbounded")?,
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}
