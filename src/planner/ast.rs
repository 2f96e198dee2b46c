//! Composed-query AST
//!
//! A query is a chain of operator calls ending in a source marker. The
//! outermost node is the last operator applied.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::expr::{Lambda, Literal};
use crate::types::TypeRef;

/// Sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// Argument of an operator call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryArg {
    Lambda(Lambda),
    Constant(Literal),
}

impl QueryArg {
    pub fn as_lambda(&self) -> Option<&Lambda> {
        match self {
            QueryArg::Lambda(lambda) => Some(lambda),
            QueryArg::Constant(_) => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Literal> {
        match self {
            QueryArg::Constant(value) => Some(value),
            QueryArg::Lambda(_) => None,
        }
    }
}

/// One operator applied to a source query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorCall {
    pub operator: String,
    /// Generic type arguments; the element type comes first
    #[serde(default)]
    pub type_args: Vec<TypeRef>,
    pub source: Box<QueryExpr>,
    #[serde(default)]
    pub args: Vec<QueryArg>,
}

/// Composed query expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryExpr {
    /// Root of every chain: the remote resource collection
    Source { element_type: TypeRef },
    Call(OperatorCall),
}

impl QueryExpr {
    pub fn source(element_type: TypeRef) -> Self {
        QueryExpr::Source { element_type }
    }

    /// Element type flowing out of this node
    pub fn element_type(&self) -> &TypeRef {
        match self {
            QueryExpr::Source { element_type } => element_type,
            QueryExpr::Call(call) => call.source.element_type(),
        }
    }

    /// Applies an arbitrary operator with the element type as its only type argument
    pub fn apply(self, operator: impl Into<String>, args: Vec<QueryArg>) -> Self {
        let type_args = vec![self.element_type().clone()];
        self.apply_generic(operator, type_args, args)
    }

    pub fn apply_generic(self, operator: impl Into<String>, type_args: Vec<TypeRef>, args: Vec<QueryArg>) -> Self {
        QueryExpr::Call(OperatorCall {
            operator: operator.into(),
            type_args,
            source: Box::new(self),
            args,
        })
    }

    /// `Where(predicate)`
    pub fn filter(self, predicate: Lambda) -> Self {
        self.apply("Where", vec![QueryArg::Lambda(predicate)])
    }

    /// `OrderBy(key)`; the key type is the second type argument
    pub fn order_by(self, key: Lambda) -> Self {
        self.ordered("OrderBy", key)
    }

    pub fn order_by_descending(self, key: Lambda) -> Self {
        self.ordered("OrderByDescending", key)
    }

    fn ordered(self, operator: &str, key: Lambda) -> Self {
        let type_args = vec![self.element_type().clone(), key.return_type()];
        self.apply_generic(operator, type_args, vec![QueryArg::Lambda(key)])
    }

    pub fn skip(self, count: i64) -> Self {
        self.apply("Skip", vec![QueryArg::Constant(Literal::Int(count))])
    }

    pub fn take(self, count: i64) -> Self {
        self.apply("Take", vec![QueryArg::Constant(Literal::Int(count))])
    }

    pub fn first(self) -> Self {
        self.apply("First", Vec::new())
    }

    pub fn first_where(self, predicate: Lambda) -> Self {
        self.apply("First", vec![QueryArg::Lambda(predicate)])
    }

    pub fn first_or_default(self) -> Self {
        self.apply("FirstOrDefault", Vec::new())
    }

    pub fn first_or_default_where(self, predicate: Lambda) -> Self {
        self.apply("FirstOrDefault", vec![QueryArg::Lambda(predicate)])
    }

    pub fn any(self) -> Self {
        self.apply("Any", Vec::new())
    }

    pub fn any_where(self, predicate: Lambda) -> Self {
        self.apply("Any", vec![QueryArg::Lambda(predicate)])
    }

    pub fn select(self, selector: Lambda) -> Self {
        let type_args = vec![self.element_type().clone(), selector.return_type()];
        self.apply_generic("Select", type_args, vec![QueryArg::Lambda(selector)])
    }

    pub fn group_by(self, key: Lambda) -> Self {
        let type_args = vec![self.element_type().clone(), key.return_type()];
        self.apply_generic("GroupBy", type_args, vec![QueryArg::Lambda(key)])
    }

    /// Operator names from innermost to outermost
    pub fn operators(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut node = self;
        while let QueryExpr::Call(call) = node {
            names.push(call.operator.as_str());
            node = &call.source;
        }
        names.reverse();
        names
    }
}

impl fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source<{}>", self.element_type())?;
        for op in self.operators() {
            write!(f, ".{}", op)?;
        }
        Ok(())
    }
}
