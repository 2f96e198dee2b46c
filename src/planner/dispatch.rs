//! Operator dispatch table
//!
//! Maps (operator name, generic arity, argument shapes) to the accumulator
//! routine that folds the operator into a plan. Built once per process.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::expr::Literal;
use crate::types::TypeRef;

use super::ast::{OperatorCall, QueryArg};
use super::errors::{PlannerError, PlannerResult};
use super::planner::{
    apply_any, apply_first, apply_first_or_default, apply_order_by, apply_order_by_descending,
    apply_skip, apply_take, apply_unimplemented, apply_where, PlanAccumulator,
};

/// Accumulator routine for one table row
pub(crate) type Apply = fn(&mut PlanAccumulator, &OperatorCall) -> PlannerResult<()>;

/// Expected shape of one operator argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    /// Lambda over the element type returning Boolean
    Predicate,
    /// Lambda over the element type
    Selector,
    /// Integer constant
    Count,
}

impl ArgShape {
    fn matches(&self, arg: &QueryArg, element_type: &TypeRef) -> bool {
        match (self, arg) {
            (ArgShape::Predicate, QueryArg::Lambda(lambda)) => {
                lambda.parameter.ty() == element_type && lambda.is_predicate()
            }
            (ArgShape::Selector, QueryArg::Lambda(lambda)) => lambda.parameter.ty() == element_type,
            (ArgShape::Count, QueryArg::Constant(Literal::Int(_))) => true,
            _ => false,
        }
    }
}

struct DispatchRow {
    generic_arity: usize,
    shapes: &'static [ArgShape],
    apply: Apply,
}

impl DispatchRow {
    fn matches(&self, call: &OperatorCall) -> bool {
        let Some(element_type) = call.type_args.first() else {
            return false;
        };
        call.type_args.len() == self.generic_arity
            && call.args.len() == self.shapes.len()
            && self
                .shapes
                .iter()
                .zip(&call.args)
                .all(|(shape, arg)| shape.matches(arg, element_type))
    }
}

const NONE: &[ArgShape] = &[];
const PREDICATE: &[ArgShape] = &[ArgShape::Predicate];
const SELECTOR: &[ArgShape] = &[ArgShape::Selector];
const COUNT: &[ArgShape] = &[ArgShape::Count];

fn table() -> &'static HashMap<&'static str, Vec<DispatchRow>> {
    static TABLE: OnceLock<HashMap<&'static str, Vec<DispatchRow>>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let rows: [(&'static str, usize, &'static [ArgShape], Apply); 14] = [
            ("Where", 1, PREDICATE, apply_where),
            ("OrderBy", 2, SELECTOR, apply_order_by),
            ("OrderByDescending", 2, SELECTOR, apply_order_by_descending),
            ("Skip", 1, COUNT, apply_skip),
            ("Take", 1, COUNT, apply_take),
            ("First", 1, NONE, apply_first),
            ("First", 1, PREDICATE, apply_first),
            ("FirstOrDefault", 1, NONE, apply_first_or_default),
            ("FirstOrDefault", 1, PREDICATE, apply_first_or_default),
            ("Any", 1, NONE, apply_any),
            ("Any", 1, PREDICATE, apply_any),
            ("Select", 2, SELECTOR, apply_unimplemented),
            ("GroupBy", 2, SELECTOR, apply_unimplemented),
            ("GroupBy", 3, &[ArgShape::Selector, ArgShape::Selector], apply_unimplemented),
        ];

        let mut table: HashMap<&'static str, Vec<DispatchRow>> = HashMap::new();
        for (name, generic_arity, shapes, apply) in rows {
            table.entry(name).or_default().push(DispatchRow {
                generic_arity,
                shapes,
                apply,
            });
        }
        table
    })
}

/// Finds the accumulator routine for `call`
pub(crate) fn resolve(call: &OperatorCall) -> PlannerResult<Apply> {
    let rows = table().get(call.operator.as_str()).ok_or_else(|| {
        PlannerError::unsupported_at(&call.operator, "unrecognized operator")
    })?;

    rows.iter()
        .find(|row| row.matches(call))
        .map(|row| row.apply)
        .ok_or_else(|| {
            PlannerError::unsupported_at(
                &call.operator,
                format!(
                    "no overload takes {} type argument(s) and {} argument(s) of this shape",
                    call.type_args.len(),
                    call.args.len()
                ),
            )
        })
}

/// Whether `operator` is part of the operator vocabulary
pub fn is_known_operator(operator: &str) -> bool {
    table().contains_key(operator)
}
