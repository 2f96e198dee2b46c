//! Wire request parameters
//!
//! Renders a plan into the ordered query parameters an execution layer sends:
//! filter, order, skip (only when non-zero), top (only when bounded).

use std::fmt;

use crate::config::WireParameterNames;
use crate::filter::{FilterCompiler, FilterResult};

use super::ast::SortOrder;
use super::planner::QueryPlan;

/// Ordered request parameters for one plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    params: Vec<(String, String)>,
}

impl WireRequest {
    pub fn from_plan(
        plan: &QueryPlan,
        compiler: &FilterCompiler<'_>,
        names: &WireParameterNames,
    ) -> FilterResult<Self> {
        let mut params = Vec::new();

        if let Some(predicate) = plan.predicate() {
            params.push((names.filter.clone(), compiler.compile(predicate)?));
        }
        if let Some(order) = plan.order() {
            let mut key = compiler.compile_selector(&order.key)?;
            if order.order == SortOrder::Descending {
                key.push_str(" desc");
            }
            params.push((names.order.clone(), key));
        }
        if plan.skip() > 0 {
            params.push((names.skip.clone(), plan.skip().to_string()));
        }
        if let Some(take) = plan.take() {
            params.push((names.top.clone(), take.to_string()));
        }

        Ok(Self { params })
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// `name=value` pairs joined by `&`, values unencoded
impl fmt::Display for WireRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Expr, Lambda};
    use crate::planner::{QueryExpr, QueryPlanBuilder};
    use crate::registry::FunctionRegistry;
    use crate::types::TypeRef;

    fn critter() -> TypeRef {
        TypeRef::named("Critter")
    }

    fn request(query: QueryExpr, names: &WireParameterNames) -> WireRequest {
        let registry = FunctionRegistry::builtin().unwrap();
        let plan = QueryPlanBuilder::new().build(&query).unwrap();
        WireRequest::from_plan(&plan, &FilterCompiler::new(registry), names).unwrap()
    }

    #[test]
    fn test_full_request() {
        let query = QueryExpr::source(critter())
            .filter(Lambda::build("x", critter(), |x| {
                x.property("Name", TypeRef::string()).equal(Expr::constant("Rex"))
            }))
            .order_by_descending(Lambda::build("x", critter(), |x| x.property("Age", TypeRef::int32())))
            .skip(20)
            .take(10);

        let req = request(query, &WireParameterNames::default());
        assert_eq!(req.to_string(), "filter=(name eq 'Rex')&order=age desc&skip=20&top=10");
        assert_eq!(req.get("top"), Some("10"));
    }

    #[test]
    fn test_zero_skip_and_unbounded_take_are_omitted() {
        let req = request(QueryExpr::source(critter()).skip(0), &WireParameterNames::default());
        assert!(req.is_empty());
    }

    #[test]
    fn test_custom_names() {
        let names = WireParameterNames {
            top: "$top".to_string(),
            ..WireParameterNames::default()
        };
        let req = request(QueryExpr::source(critter()).any(), &names);
        assert_eq!(req.params(), &[("$top".to_string(), "1".to_string())]);
    }
}
