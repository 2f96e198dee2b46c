//! Query Plan Invariant Tests
//!
//! Test Categories:
//! 1. Paging rules (Skip/Take)
//! 2. Ordering rules
//! 3. Terminal projections
//! 4. Predicate merging
//! 5. Wire parameters

use proptest::prelude::*;

use wirequery::config::WireParameterNames;
use wirequery::expr::{referenced_variables, Expr, Lambda};
use wirequery::filter::FilterCompiler;
use wirequery::planner::{
    merge_all, merge_predicates, PlannerErrorCode, Projection, QueryExpr, QueryPlan, QueryPlanBuilder,
    SortOrder, WireRequest,
};
use wirequery::registry::FunctionRegistry;
use wirequery::types::TypeRef;

fn critter() -> TypeRef {
    TypeRef::named("Critter")
}

fn source() -> QueryExpr {
    QueryExpr::source(critter())
}

fn age_gt(n: i32) -> Lambda {
    Lambda::build("x", critter(), |x| {
        x.property("Age", TypeRef::int32()).greater_than(Expr::constant(n))
    })
}

fn name_is(name: &str) -> Lambda {
    Lambda::build("c", critter(), |c| {
        c.property("Name", TypeRef::string()).equal(Expr::constant(name))
    })
}

fn by_name() -> Lambda {
    Lambda::build("x", critter(), |x| x.property("Name", TypeRef::string()))
}

fn build(query: &QueryExpr) -> Result<QueryPlan, PlannerErrorCode> {
    QueryPlanBuilder::new().build(query).map_err(|e| e.code())
}

fn filter_of(plan: &QueryPlan) -> String {
    let compiler = FilterCompiler::new(FunctionRegistry::builtin().unwrap());
    compiler.compile(plan.predicate().unwrap()).unwrap()
}

// =============================================================================
// PAGING RULES
// =============================================================================

#[test]
fn test_second_skip_is_rejected() {
    assert_eq!(
        build(&source().skip(1).skip(1)),
        Err(PlannerErrorCode::UnsupportedQueryShape)
    );
}

#[test]
fn test_second_take_is_rejected() {
    assert_eq!(
        build(&source().order_by(by_name()).take(3).take(1)),
        Err(PlannerErrorCode::UnsupportedQueryShape)
    );
}

#[test]
fn test_skip_then_take() {
    let plan = build(&source().skip(10).take(5)).unwrap();
    assert_eq!(plan.skip(), 10);
    assert_eq!(plan.take(), Some(5));
}

#[test]
fn test_negative_skip_and_zero_take_are_rejected() {
    assert!(build(&source().skip(-5)).is_err());
    assert!(build(&source().take(0)).is_err());
    assert!(build(&source().take(-1)).is_err());
}

// =============================================================================
// ORDERING RULES
// =============================================================================

#[test]
fn test_skip_before_order_by_is_rejected() {
    assert_eq!(
        build(&source().skip(1).order_by(by_name())),
        Err(PlannerErrorCode::UnsupportedQueryShape)
    );
}

#[test]
fn test_take_before_order_by_descending_is_rejected() {
    assert_eq!(
        build(&source().take(1).order_by_descending(by_name())),
        Err(PlannerErrorCode::UnsupportedQueryShape)
    );
}

#[test]
fn test_order_by_then_skip_is_accepted() {
    let plan = build(&source().order_by(by_name()).skip(1)).unwrap();
    let order = plan.order().unwrap();
    assert_eq!(order.order, SortOrder::Ascending);
    assert_eq!(plan.skip(), 1);
}

// =============================================================================
// TERMINAL PROJECTIONS
// =============================================================================

#[test]
fn test_any_with_predicate_is_where_plus_take_one() {
    let via_any = build(&source().any_where(age_gt(3))).unwrap();
    let via_where = build(&source().filter(age_gt(3)).any()).unwrap();

    assert_eq!(via_any.projection(), Projection::Any);
    assert_eq!(via_any.take(), Some(1));
    assert_eq!(filter_of(&via_any), "(age gt 3)");
    assert_eq!(filter_of(&via_any), filter_of(&via_where));
}

#[test]
fn test_any_without_predicate_only_limits() {
    let plan = build(&source().any()).unwrap();
    assert_eq!(plan.projection(), Projection::Any);
    assert_eq!(plan.take(), Some(1));
    assert!(plan.predicate().is_none());
}

#[test]
fn test_first_or_default_collapses_to_first() {
    let plan = build(&source().first_or_default_where(age_gt(1))).unwrap();
    assert_eq!(plan.projection(), Projection::First);
    assert_eq!(plan.take(), Some(1));
}

#[test]
fn test_select_is_not_implemented() {
    assert_eq!(
        build(&source().select(by_name())),
        Err(PlannerErrorCode::NotImplementedOperator)
    );
}

#[test]
fn test_unknown_operator_is_rejected() {
    assert_eq!(
        build(&source().apply("Reverse", Vec::new())),
        Err(PlannerErrorCode::UnsupportedQueryShape)
    );
}

// =============================================================================
// PREDICATE MERGING
// =============================================================================

#[test]
fn test_chained_where_matches_direct_conjunction() {
    let chained = build(&source().filter(age_gt(1)).filter(name_is("Rex"))).unwrap();
    let direct = build(&source().filter(Lambda::build("y", critter(), |y| {
        y.clone()
            .property("Age", TypeRef::int32())
            .greater_than(Expr::constant(1))
            .and_also(y.property("Name", TypeRef::string()).equal(Expr::constant("Rex")))
    })))
    .unwrap();

    assert_eq!(filter_of(&chained), "((age gt 1) and (name eq 'Rex'))");
    assert_eq!(filter_of(&chained), filter_of(&direct));
}

#[test]
fn test_merged_predicate_has_one_variable() {
    let plan = build(&source().filter(age_gt(1)).filter(name_is("a")).first_where(age_gt(2))).unwrap();
    let predicate = plan.predicate().unwrap();
    let vars = referenced_variables(&predicate.body);
    assert_eq!(vars.len(), 1);
    assert!(vars.contains(&predicate.parameter.id()));
}

proptest! {
    #[test]
    fn prop_merge_equals_direct_conjunction(bounds in proptest::collection::vec(-100i32..100, 1..6)) {
        let clauses: Vec<Lambda> = bounds.iter().map(|n| age_gt(*n)).collect();
        let merged = merge_all(&clauses).unwrap();

        let direct = Lambda::build("x", critter(), |x| {
            let mut terms = bounds
                .iter()
                .map(|n| x.clone().property("Age", TypeRef::int32()).greater_than(Expr::constant(*n)));
            let first = terms.next().unwrap();
            terms.fold(first, Expr::and_also)
        });

        prop_assert_eq!(&merged, &direct.rebind(&merged.parameter));
        prop_assert_eq!(referenced_variables(&merged.body).len(), 1);
    }

    #[test]
    fn prop_merge_does_not_touch_inputs(a in -50i32..50, b in -50i32..50) {
        let first = age_gt(a);
        let second = age_gt(b);
        let snapshot = (first.clone(), second.clone());
        let _ = merge_predicates(Some(first.clone()), &second);
        prop_assert_eq!((first, second), snapshot);
    }

    #[test]
    fn prop_plan_building_is_deterministic(skip in 0i64..1000, take in 1i64..1000) {
        let query = source().filter(age_gt(3)).order_by_descending(by_name()).skip(skip).take(take);
        let a = build(&query).unwrap();
        let b = build(&query).unwrap();
        prop_assert_eq!(a.skip(), skip as u64);
        prop_assert_eq!(a, b);
    }
}

// =============================================================================
// WIRE PARAMETERS
// =============================================================================

#[test]
fn test_wire_request_parameters() {
    let registry = FunctionRegistry::builtin().unwrap();
    let plan = build(&source().filter(name_is("Rex")).order_by(by_name()).skip(5).take(10)).unwrap();
    let request = WireRequest::from_plan(&plan, &FilterCompiler::new(registry), &WireParameterNames::default()).unwrap();

    let names: Vec<&str> = request.params().iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(names, vec!["filter", "order", "skip", "top"]);
    assert_eq!(request.get("filter"), Some("(name eq 'Rex')"));
    assert_eq!(request.get("order"), Some("name"));
}
