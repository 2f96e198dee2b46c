//! Predicate expression tree
//!
//! A closed set of node kinds: constants, the bound variable, member access,
//! binary operators, and calls. Lambdas pair a body with the single variable
//! it is bound over.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::literal::Literal;
use crate::types::{MemberIdentity, TypeRef};

static NEXT_VARIABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a bound variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub u64);

/// A lambda's bound variable.
///
/// Equality is by identity: two variables with the same name are distinct
/// unless they share an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    id: VarId,
    name: String,
    ty: TypeRef,
}

impl Variable {
    /// Creates a variable with a fresh identity
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            id: VarId(NEXT_VARIABLE_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            ty,
        }
    }

    pub fn id(&self) -> VarId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

/// Binary operators of the filter grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    And,
    Or,
}

impl BinaryOp {
    /// Grammar keyword for this operator
    pub fn token(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "eq",
            BinaryOp::Ne => "ne",
            BinaryOp::Gt => "gt",
            BinaryOp::Ge => "ge",
            BinaryOp::Lt => "lt",
            BinaryOp::Le => "le",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "eq" => Some(BinaryOp::Eq),
            "ne" => Some(BinaryOp::Ne),
            "gt" => Some(BinaryOp::Gt),
            "ge" => Some(BinaryOp::Ge),
            "lt" => Some(BinaryOp::Lt),
            "le" => Some(BinaryOp::Le),
            "and" => Some(BinaryOp::And),
            "or" => Some(BinaryOp::Or),
            _ => None,
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Predicate expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Constant {
        value: Literal,
        ty: TypeRef,
    },
    Parameter(Variable),
    Member {
        target: Box<Expr>,
        member: MemberIdentity,
        ty: TypeRef,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Method call; the receiver is argument 0 for instance members
    Call {
        member: MemberIdentity,
        args: Vec<Expr>,
        ty: TypeRef,
    },
}

impl Expr {
    /// Constant with the value's default type tag
    pub fn constant(value: impl Into<Literal>) -> Self {
        let value = value.into();
        let ty = value.type_ref();
        Expr::Constant { value, ty }
    }

    /// Constant with an explicit type tag
    pub fn typed_constant(value: impl Into<Literal>, ty: TypeRef) -> Self {
        Expr::Constant {
            value: value.into(),
            ty,
        }
    }

    /// Typed `null`
    pub fn null(ty: TypeRef) -> Self {
        Expr::Constant {
            value: Literal::Null,
            ty,
        }
    }

    pub fn param(variable: &Variable) -> Self {
        Expr::Parameter(variable.clone())
    }

    /// Instance property access on `self`
    pub fn property(self, name: impl Into<String>, ty: TypeRef) -> Self {
        let member = MemberIdentity::property(self.ty(), name);
        Expr::Member {
            target: Box::new(self),
            member,
            ty,
        }
    }

    /// Instance method call on `self`; parameter types are taken from `args`
    pub fn call_method(self, name: impl Into<String>, args: Vec<Expr>, returns: TypeRef) -> Self {
        let params = args.iter().map(Expr::ty).collect();
        let member = MemberIdentity::method(self.ty(), name, params);
        let mut all = Vec::with_capacity(args.len() + 1);
        all.push(self);
        all.extend(args);
        Expr::Call {
            member,
            args: all,
            ty: returns,
        }
    }

    /// Call of an arbitrary member with fully ordered arguments
    pub fn call(member: MemberIdentity, args: Vec<Expr>, returns: TypeRef) -> Self {
        Expr::Call {
            member,
            args,
            ty: returns,
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn equal(self, other: Expr) -> Self {
        Self::binary(BinaryOp::Eq, self, other)
    }

    pub fn not_equal(self, other: Expr) -> Self {
        Self::binary(BinaryOp::Ne, self, other)
    }

    pub fn greater_than(self, other: Expr) -> Self {
        Self::binary(BinaryOp::Gt, self, other)
    }

    pub fn greater_or_equal(self, other: Expr) -> Self {
        Self::binary(BinaryOp::Ge, self, other)
    }

    pub fn less_than(self, other: Expr) -> Self {
        Self::binary(BinaryOp::Lt, self, other)
    }

    pub fn less_or_equal(self, other: Expr) -> Self {
        Self::binary(BinaryOp::Le, self, other)
    }

    pub fn and_also(self, other: Expr) -> Self {
        Self::binary(BinaryOp::And, self, other)
    }

    pub fn or_else(self, other: Expr) -> Self {
        Self::binary(BinaryOp::Or, self, other)
    }

    /// Static type of the expression
    pub fn ty(&self) -> TypeRef {
        match self {
            Expr::Constant { ty, .. } | Expr::Member { ty, .. } | Expr::Call { ty, .. } => ty.clone(),
            Expr::Parameter(variable) => variable.ty().clone(),
            Expr::Binary { .. } => TypeRef::boolean(),
        }
    }
}

/// Single-parameter lambda
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lambda {
    pub parameter: Variable,
    pub body: Expr,
}

impl Lambda {
    pub fn new(parameter: Variable, body: Expr) -> Self {
        Self { parameter, body }
    }

    /// Builds a lambda over a fresh variable.
    ///
    /// ```ignore
    /// let p = Lambda::build("x", TypeRef::named("Critter"), |x| {
    ///     x.property("Name", TypeRef::string()).equal(Expr::constant("Rex"))
    /// });
    /// ```
    pub fn build(name: &str, ty: TypeRef, body: impl FnOnce(Expr) -> Expr) -> Self {
        let parameter = Variable::new(name, ty);
        let body = body(Expr::param(&parameter));
        Self { parameter, body }
    }

    /// Type the body evaluates to
    pub fn return_type(&self) -> TypeRef {
        self.body.ty()
    }

    pub fn is_predicate(&self) -> bool {
        self.return_type().is_boolean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_compare_by_identity() {
        let a = Variable::new("x", TypeRef::string());
        let b = Variable::new("x", TypeRef::string());
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_call_method_prepends_receiver() {
        let x = Variable::new("x", TypeRef::string());
        let call = Expr::param(&x).call_method("StartsWith", vec![Expr::constant("a")], TypeRef::boolean());
        match call {
            Expr::Call { member, args, ty } => {
                assert_eq!(member, MemberIdentity::method(TypeRef::string(), "StartsWith", vec![TypeRef::string()]));
                assert_eq!(args.len(), 2);
                assert_eq!(args[0], Expr::param(&x));
                assert!(ty.is_boolean());
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_lambda_predicate_detection() {
        let entity = TypeRef::named("Critter");
        let predicate = Lambda::build("x", entity.clone(), |x| {
            x.property("Name", TypeRef::string()).equal(Expr::constant("Rex"))
        });
        assert!(predicate.is_predicate());

        let key = Lambda::build("x", entity, |x| x.property("Name", TypeRef::string()));
        assert!(!key.is_predicate());
        assert_eq!(key.return_type(), TypeRef::string());
    }

    #[test]
    fn test_operator_tokens_roundtrip() {
        for op in [BinaryOp::Eq, BinaryOp::Ne, BinaryOp::Gt, BinaryOp::Ge, BinaryOp::Lt, BinaryOp::Le, BinaryOp::And, BinaryOp::Or] {
            assert_eq!(BinaryOp::from_token(op.token()), Some(op));
        }
        assert_eq!(BinaryOp::from_token("xor"), None);
    }
}
