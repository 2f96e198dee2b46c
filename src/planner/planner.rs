//! Query Plan Builder
//!
//! Walks a composed query from the source marker outward and folds each
//! operator into an immutable plan. Operators are applied innermost first,
//! so the plan reflects chain order.
//!
//! Rejected shapes (all-or-nothing, no partial plan):
//! - a second Skip or a second Take
//! - Skip/Take before an ordering or a filter
//! - Skip after Take
//! - any operator after First, FirstOrDefault or Any
//! - negative Skip, Take below 1

use serde::Serialize;

use crate::expr::{Lambda, Literal};
use crate::observability::{log_event_with_fields, Event};
use crate::types::TypeRef;

use super::ast::{OperatorCall, QueryArg, QueryExpr, SortOrder};
use super::dispatch;
use super::errors::{PlannerError, PlannerResult};
use super::merger::merge_predicates;

/// Shape of the result the caller expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Projection {
    Enumerable,
    First,
    /// Declared for callers that distinguish it; the builder emits `First`
    FirstOrDefault,
    Any,
}

impl Projection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Projection::Enumerable => "ENUMERABLE",
            Projection::First => "FIRST",
            Projection::FirstOrDefault => "FIRST_OR_DEFAULT",
            Projection::Any => "ANY",
        }
    }
}

/// Ordering of a plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSpec {
    pub key: Lambda,
    pub order: SortOrder,
}

/// Immutable query plan (no runtime state)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    element_type: TypeRef,
    predicate: Option<Lambda>,
    order: Option<OrderSpec>,
    skip: u64,
    take: Option<u64>,
    projection: Projection,
}

impl QueryPlan {
    pub fn element_type(&self) -> &TypeRef {
        &self.element_type
    }

    /// Conjunction of every filter clause, over one variable
    pub fn predicate(&self) -> Option<&Lambda> {
        self.predicate.as_ref()
    }

    pub fn order(&self) -> Option<&OrderSpec> {
        self.order.as_ref()
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }

    /// `None` means unbounded
    pub fn take(&self) -> Option<u64> {
        self.take
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }
}

/// Plan under construction
#[derive(Debug)]
pub(crate) struct PlanAccumulator {
    element_type: TypeRef,
    predicate: Option<Lambda>,
    order: Option<OrderSpec>,
    skip: Option<u64>,
    take: Option<u64>,
    projection: Projection,
    terminal: Option<String>,
}

impl PlanAccumulator {
    fn new(element_type: TypeRef) -> Self {
        Self {
            element_type,
            predicate: None,
            order: None,
            skip: None,
            take: None,
            projection: Projection::Enumerable,
            terminal: None,
        }
    }

    fn paging_applied(&self) -> bool {
        self.skip.is_some() || self.take.is_some()
    }

    fn add_filter(&mut self, call: &OperatorCall, predicate: &Lambda) -> PlannerResult<()> {
        if self.paging_applied() {
            return Err(PlannerError::unsupported_at(
                &call.operator,
                "filter applied after Skip/Take",
            ));
        }
        self.predicate = Some(merge_predicates(self.predicate.take(), predicate));
        Ok(())
    }

    fn set_order(&mut self, call: &OperatorCall, order: SortOrder) -> PlannerResult<()> {
        if self.paging_applied() {
            return Err(PlannerError::unsupported_at(
                &call.operator,
                "ordering applied after Skip/Take",
            ));
        }
        let key = lambda_arg(call)?.clone();
        self.order = Some(OrderSpec { key, order });
        Ok(())
    }

    /// First, FirstOrDefault and Any: optional filter, then a single row
    fn set_terminal(&mut self, call: &OperatorCall, projection: Projection) -> PlannerResult<()> {
        if let Some(QueryArg::Lambda(predicate)) = call.args.first() {
            self.add_filter(call, predicate)?;
        }
        self.take = Some(1);
        self.projection = projection;
        self.terminal = Some(call.operator.clone());
        Ok(())
    }

    fn finish(self) -> QueryPlan {
        QueryPlan {
            element_type: self.element_type,
            predicate: self.predicate,
            order: self.order,
            skip: self.skip.unwrap_or(0),
            take: self.take,
            projection: self.projection,
        }
    }
}

fn lambda_arg(call: &OperatorCall) -> PlannerResult<&Lambda> {
    call.args
        .first()
        .and_then(QueryArg::as_lambda)
        .ok_or_else(|| PlannerError::unsupported_at(&call.operator, "expected a lambda argument"))
}

fn count_arg(call: &OperatorCall) -> PlannerResult<i64> {
    call.args
        .first()
        .and_then(QueryArg::as_constant)
        .and_then(Literal::as_int)
        .ok_or_else(|| PlannerError::unsupported_at(&call.operator, "expected an integer count"))
}

pub(crate) fn apply_where(acc: &mut PlanAccumulator, call: &OperatorCall) -> PlannerResult<()> {
    let predicate = lambda_arg(call)?;
    acc.add_filter(call, predicate)
}

pub(crate) fn apply_order_by(acc: &mut PlanAccumulator, call: &OperatorCall) -> PlannerResult<()> {
    acc.set_order(call, SortOrder::Ascending)
}

pub(crate) fn apply_order_by_descending(acc: &mut PlanAccumulator, call: &OperatorCall) -> PlannerResult<()> {
    acc.set_order(call, SortOrder::Descending)
}

pub(crate) fn apply_skip(acc: &mut PlanAccumulator, call: &OperatorCall) -> PlannerResult<()> {
    if acc.skip.is_some() {
        return Err(PlannerError::unsupported_at("Skip", "second Skip in chain"));
    }
    if acc.take.is_some() {
        return Err(PlannerError::unsupported_at("Skip", "Skip applied after Take"));
    }
    let count = count_arg(call)?;
    let count = u64::try_from(count)
        .map_err(|_| PlannerError::unsupported_at("Skip", format!("negative count {}", count)))?;
    acc.skip = Some(count);
    Ok(())
}

pub(crate) fn apply_take(acc: &mut PlanAccumulator, call: &OperatorCall) -> PlannerResult<()> {
    if acc.take.is_some() {
        return Err(PlannerError::unsupported_at("Take", "second Take in chain"));
    }
    let count = count_arg(call)?;
    if count < 1 {
        return Err(PlannerError::unsupported_at(
            "Take",
            format!("count {} is below 1", count),
        ));
    }
    acc.take = Some(count as u64);
    Ok(())
}

pub(crate) fn apply_first(acc: &mut PlanAccumulator, call: &OperatorCall) -> PlannerResult<()> {
    acc.set_terminal(call, Projection::First)
}

pub(crate) fn apply_first_or_default(acc: &mut PlanAccumulator, call: &OperatorCall) -> PlannerResult<()> {
    acc.set_terminal(call, Projection::First)
}

pub(crate) fn apply_any(acc: &mut PlanAccumulator, call: &OperatorCall) -> PlannerResult<()> {
    acc.set_terminal(call, Projection::Any)
}

pub(crate) fn apply_unimplemented(_: &mut PlanAccumulator, call: &OperatorCall) -> PlannerResult<()> {
    Err(PlannerError::not_implemented(&call.operator))
}

/// Builds query plans from composed queries
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPlanBuilder;

impl QueryPlanBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Builds an immutable plan, or rejects the whole query.
    ///
    /// Deterministic: the same query always yields an equal plan.
    pub fn build(&self, query: &QueryExpr) -> PlannerResult<QueryPlan> {
        match Self::build_inner(query) {
            Ok(plan) => {
                let take = plan.take.map(|t| t.to_string()).unwrap_or_default();
                log_event_with_fields(
                    Event::PlanBuilt,
                    &[
                        ("element_type", plan.element_type.to_string().as_str()),
                        ("projection", plan.projection.as_str()),
                        ("skip", plan.skip.to_string().as_str()),
                        ("take", take.as_str()),
                    ],
                );
                Ok(plan)
            }
            Err(err) => {
                log_event_with_fields(
                    Event::PlanRejected,
                    &[
                        ("code", err.code().code()),
                        ("query", query.to_string().as_str()),
                        ("reason", err.message()),
                    ],
                );
                Err(err)
            }
        }
    }

    fn build_inner(query: &QueryExpr) -> PlannerResult<QueryPlan> {
        // outermost first; applied in reverse
        let mut calls = Vec::new();
        let mut node = query;
        while let QueryExpr::Call(call) = node {
            calls.push(call);
            node = &call.source;
        }

        let mut acc = PlanAccumulator::new(query.element_type().clone());
        for call in calls.into_iter().rev() {
            if let Some(terminal) = &acc.terminal {
                return Err(PlannerError::unsupported_at(
                    &call.operator,
                    format!("operator applied after {}", terminal),
                ));
            }
            let apply = dispatch::resolve(call)?;
            apply(&mut acc, call)?;
        }
        Ok(acc.finish())
    }
}
