//! Structural rewrites over predicate expressions
//!
//! Rewrites never mutate their input; they build a new tree.

use std::collections::BTreeSet;

use super::ast::{Expr, Lambda, VarId, Variable};

/// Returns a copy of `expr` with every occurrence of `from` replaced by `to`.
pub fn substitute_variable(expr: &Expr, from: &Variable, to: &Variable) -> Expr {
    match expr {
        Expr::Parameter(variable) if variable == from => Expr::Parameter(to.clone()),
        Expr::Parameter(_) | Expr::Constant { .. } => expr.clone(),
        Expr::Member { target, member, ty } => Expr::Member {
            target: Box::new(substitute_variable(target, from, to)),
            member: member.clone(),
            ty: ty.clone(),
        },
        Expr::Binary { op, left, right } => Expr::Binary {
            op: *op,
            left: Box::new(substitute_variable(left, from, to)),
            right: Box::new(substitute_variable(right, from, to)),
        },
        Expr::Call { member, args, ty } => Expr::Call {
            member: member.clone(),
            args: args.iter().map(|a| substitute_variable(a, from, to)).collect(),
            ty: ty.clone(),
        },
    }
}

impl Lambda {
    /// Re-expresses this lambda over `parameter`
    pub fn rebind(&self, parameter: &Variable) -> Lambda {
        Lambda {
            parameter: parameter.clone(),
            body: substitute_variable(&self.body, &self.parameter, parameter),
        }
    }
}

/// Identities of all variables referenced in `expr`
pub fn referenced_variables(expr: &Expr) -> BTreeSet<VarId> {
    let mut found = BTreeSet::new();
    collect(expr, &mut found);
    found
}

fn collect(expr: &Expr, found: &mut BTreeSet<VarId>) {
    match expr {
        Expr::Parameter(variable) => {
            found.insert(variable.id());
        }
        Expr::Constant { .. } => {}
        Expr::Member { target, .. } => collect(target, found),
        Expr::Binary { left, right, .. } => {
            collect(left, found);
            collect(right, found);
        }
        Expr::Call { args, .. } => args.iter().for_each(|a| collect(a, found)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRef;

    #[test]
    fn test_substitution_reaches_calls_and_members() {
        let entity = TypeRef::named("Critter");
        let clause = Lambda::build("y", entity.clone(), |y| {
            y.clone()
                .property("Name", TypeRef::string())
                .call_method("StartsWith", vec![Expr::constant("Re")], TypeRef::boolean())
                .and_also(y.property("Age", TypeRef::int32()).greater_than(Expr::constant(3)))
        });
        let canonical = Variable::new("x", entity);

        let rebound = clause.rebind(&canonical);

        let vars = referenced_variables(&rebound.body);
        assert_eq!(vars.len(), 1);
        assert!(vars.contains(&canonical.id()));
        // input untouched
        assert!(referenced_variables(&clause.body).contains(&clause.parameter.id()));
    }

    #[test]
    fn test_foreign_variables_are_kept() {
        let entity = TypeRef::named("Critter");
        let other = Variable::new("z", entity.clone());
        let from = Variable::new("y", entity.clone());
        let to = Variable::new("x", entity);

        let expr = Expr::param(&other).equal(Expr::param(&from));
        let rewritten = substitute_variable(&expr, &from, &to);

        assert_eq!(rewritten, Expr::param(&other).equal(Expr::param(&to)));
    }
}
