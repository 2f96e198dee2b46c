//! Predicate merging
//!
//! Successive filter clauses are folded into one conjunction over the first
//! clause's variable. Each later clause is rebound to that variable, so the
//! merged tree references exactly one variable identity. Nothing is
//! simplified or reordered.

use crate::expr::{Expr, Lambda};

/// Folds `next` into `running`; `None` means no filter so far.
pub fn merge_predicates(running: Option<Lambda>, next: &Lambda) -> Lambda {
    match running {
        None => next.clone(),
        Some(running) => {
            let next = next.rebind(&running.parameter);
            Lambda {
                parameter: running.parameter,
                body: Expr::and_also(running.body, next.body),
            }
        }
    }
}

/// Merges clauses in chain order; the first applied ends up leftmost.
pub fn merge_all<'a>(clauses: impl IntoIterator<Item = &'a Lambda>) -> Option<Lambda> {
    clauses
        .into_iter()
        .fold(None, |running, next| Some(merge_predicates(running, next)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{referenced_variables, BinaryOp};
    use crate::types::TypeRef;

    fn critter() -> TypeRef {
        TypeRef::named("Critter")
    }

    fn age_gt(n: i32) -> Lambda {
        Lambda::build("x", critter(), |x| {
            x.property("Age", TypeRef::int32()).greater_than(Expr::constant(n))
        })
    }

    #[test]
    fn test_single_clause_is_unchanged() {
        let clause = age_gt(1);
        assert_eq!(merge_predicates(None, &clause), clause);
    }

    #[test]
    fn test_merge_uses_first_variable() {
        let first = age_gt(1);
        let second = age_gt(2);
        let merged = merge_predicates(Some(first.clone()), &second);

        assert_eq!(merged.parameter, first.parameter);
        let vars = referenced_variables(&merged.body);
        assert_eq!(vars.len(), 1);
        assert!(vars.contains(&first.parameter.id()));
    }

    #[test]
    fn test_merge_is_left_nested_in_chain_order() {
        let clauses = [age_gt(1), age_gt(2), age_gt(3)];
        let merged = merge_all(&clauses).unwrap();

        let expected = Lambda::build("x", critter(), |x| {
            let age = x.property("Age", TypeRef::int32());
            age.clone()
                .greater_than(Expr::constant(1))
                .and_also(age.clone().greater_than(Expr::constant(2)))
                .and_also(age.greater_than(Expr::constant(3)))
        });
        let expected = expected.rebind(&merged.parameter);
        assert_eq!(merged, expected);

        match &merged.body {
            Expr::Binary { op: BinaryOp::And, right, .. } => {
                assert_eq!(**right, clauses[2].rebind(&merged.parameter).body);
            }
            other => panic!("expected conjunction, got {:?}", other),
        }
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let first = age_gt(1);
        let second = age_gt(2);
        let before = second.clone();
        let _ = merge_predicates(Some(first), &second);
        assert_eq!(second, before);
        assert_eq!(merge_all(std::iter::empty()), None);
    }
}
