//! Filter Grammar Compiler
//!
//! Renders a predicate lambda as a filter string. Binary nodes are always
//! fully parenthesized; calls and mapped properties go through the registry's
//! forward lookup; everything else is a member path or a literal.

use std::sync::Arc;

use crate::expr::{Expr, Lambda, Variable};
use crate::observability::{log_event_with_fields, Event};
use crate::registry::{FunctionMapping, FunctionRegistry};
use crate::types::MemberIdentity;

use super::errors::{FilterError, FilterResult};
use super::literal::write_literal;
use super::names::{LowerFirstNames, MemberNameResolver};

static DEFAULT_NAMES: LowerFirstNames = LowerFirstNames;

/// Compiles predicate ASTs into filter strings
pub struct FilterCompiler<'a> {
    registry: &'a FunctionRegistry,
    names: &'a dyn MemberNameResolver,
}

impl<'a> FilterCompiler<'a> {
    /// Compiler using the default naming convention
    pub fn new(registry: &'a FunctionRegistry) -> Self {
        Self {
            registry,
            names: &DEFAULT_NAMES,
        }
    }

    pub fn with_names(registry: &'a FunctionRegistry, names: &'a dyn MemberNameResolver) -> Self {
        Self { registry, names }
    }

    /// Compiles a predicate lambda into a filter string
    pub fn compile(&self, predicate: &Lambda) -> FilterResult<String> {
        if !predicate.is_predicate() {
            let err = FilterError::UnsupportedExpression(format!(
                "predicate returns {}, expected Boolean",
                predicate.return_type()
            ));
            self.rejected(&err);
            return Err(err);
        }
        self.compile_lambda(predicate)
    }

    /// Compiles any lambda body, such as a sort key selector
    pub fn compile_selector(&self, selector: &Lambda) -> FilterResult<String> {
        self.compile_lambda(selector)
    }

    fn compile_lambda(&self, lambda: &Lambda) -> FilterResult<String> {
        let mut out = String::new();
        match self.write_expr(&lambda.body, &lambda.parameter, &mut out) {
            Ok(()) => {
                log_event_with_fields(Event::FilterCompiled, &[("filter", out.as_str())]);
                Ok(out)
            }
            Err(err) => {
                self.rejected(&err);
                Err(err)
            }
        }
    }

    fn rejected(&self, err: &FilterError) {
        let reason = err.to_string();
        log_event_with_fields(
            Event::FilterRejected,
            &[("code", err.code()), ("reason", reason.as_str())],
        );
    }

    fn write_expr(&self, expr: &Expr, root: &Variable, out: &mut String) -> FilterResult<()> {
        match expr {
            Expr::Constant { value, .. } => {
                write_literal(out, value);
                Ok(())
            }
            Expr::Binary { op, left, right } => {
                out.push('(');
                self.write_expr(left, root, out)?;
                out.push(' ');
                out.push_str(op.token());
                out.push(' ');
                self.write_expr(right, root, out)?;
                out.push(')');
                Ok(())
            }
            Expr::Member { target, member, .. } => self.write_member(target, member, root, out),
            Expr::Call { member, args, .. } => {
                let mapping = self
                    .registry
                    .try_get_grammar_form(member)
                    .ok_or_else(|| FilterError::UnmappedMember(member.to_string()))?;
                self.write_mapped(&mapping, args, root, out)
            }
            Expr::Parameter(variable) if variable == root => Err(FilterError::UnsupportedExpression(
                format!("bare variable '{}' used as an operand", variable.name()),
            )),
            Expr::Parameter(variable) => Err(foreign_variable(variable)),
        }
    }

    fn write_member(
        &self,
        target: &Expr,
        member: &MemberIdentity,
        root: &Variable,
        out: &mut String,
    ) -> FilterResult<()> {
        if let Some(mapping) = self.registry.try_get_grammar_form(member) {
            return self.write_mapped(&mapping, std::slice::from_ref(target), root, out);
        }

        match target {
            Expr::Parameter(variable) if variable == root => {}
            Expr::Parameter(variable) => return Err(foreign_variable(variable)),
            Expr::Member {
                target: inner,
                member: inner_member,
                ..
            } if self.registry.try_get_grammar_form(inner_member).is_none() => {
                self.write_member(inner, inner_member, root, out)?;
                out.push('.');
            }
            _ => return Err(FilterError::UnmappedMember(member.to_string())),
        }
        out.push_str(&self.names.wire_name(member));
        Ok(())
    }

    fn write_mapped(
        &self,
        mapping: &Arc<FunctionMapping>,
        call_args: &[Expr],
        root: &Variable,
        out: &mut String,
    ) -> FilterResult<()> {
        if call_args.len() != mapping.argument_count() {
            return Err(FilterError::UnsupportedExpression(format!(
                "{} expects {} argument(s), got {}",
                mapping.member(),
                mapping.argument_count(),
                call_args.len()
            )));
        }
        let rendered = call_args
            .iter()
            .map(|arg| {
                let mut text = String::new();
                self.write_expr(arg, root, &mut text)?;
                Ok(text)
            })
            .collect::<FilterResult<Vec<_>>>()?;
        out.push_str(&mapping.format_template().render(&rendered));
        Ok(())
    }
}

fn foreign_variable(variable: &Variable) -> FilterError {
    FilterError::UnsupportedExpression(format!(
        "variable '{}' is not bound by this predicate",
        variable.name()
    ))
}
