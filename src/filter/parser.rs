//! Filter string parser
//!
//! Reads the grammar the compiler emits back into a predicate lambda over a
//! single variable named `it`. Member paths are resolved through
//! [`ResourceMetadata`]; calls through the registry's reverse lookup.

use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::expr::{BinaryOp, Expr, Lambda, Literal, Variable};
use crate::observability::{log_event_with_fields, Event};
use crate::registry::FunctionRegistry;
use crate::types::TypeRef;

use super::errors::{FilterError, FilterResult};
use super::literal::parse_datetime;
use super::names::ResourceMetadata;

const ROOT_VARIABLE: &str = "it";
const NAN_TOKEN: &str = "NaN";
const INFINITY_TOKEN: &str = "INF";

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Comma,
    Dot,
    Ident(String),
    Str(String),
    Number(String),
    Guid(String),
    DateTime(String),
    End,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Str(_) => "string literal".to_string(),
            Token::Number(text) => format!("number {}", text),
            Token::Guid(_) => "guid literal".to_string(),
            Token::DateTime(_) => "datetime literal".to_string(),
            Token::End => "end of input".to_string(),
        }
    }
}

fn tokenize(input: &str) -> FilterResult<Vec<(usize, Token)>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let c = bytes[pos];
        match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                pos += 1;
                continue;
            }
            b'(' => tokens.push((start, Token::LParen)),
            b')' => tokens.push((start, Token::RParen)),
            b',' => tokens.push((start, Token::Comma)),
            b'.' => tokens.push((start, Token::Dot)),
            b'\'' => {
                let (text, end) = read_quoted(input, start)?;
                tokens.push((start, Token::Str(text)));
                pos = end;
                continue;
            }
            b'-' if input[start + 1..].starts_with(INFINITY_TOKEN)
                && !bytes
                    .get(start + 1 + INFINITY_TOKEN.len())
                    .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_') =>
            {
                let end = start + 1 + INFINITY_TOKEN.len();
                tokens.push((start, Token::Number(input[start..end].to_string())));
                pos = end;
                continue;
            }
            b'-' | b'0'..=b'9' => {
                let end = scan_number(bytes, start);
                if end == start + 1 && c == b'-' {
                    return Err(FilterError::syntax(start, "expected digits after '-'"));
                }
                tokens.push((start, Token::Number(input[start..end].to_string())));
                pos = end;
                continue;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let mut end = start;
                while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                    end += 1;
                }
                let word = &input[start..end];
                if end < bytes.len() && bytes[end] == b'\'' && (word == "guid" || word == "datetime") {
                    let (text, after) = read_quoted(input, end)?;
                    let token = if word == "guid" {
                        Token::Guid(text)
                    } else {
                        Token::DateTime(text)
                    };
                    tokens.push((start, token));
                    pos = after;
                } else {
                    tokens.push((start, Token::Ident(word.to_string())));
                    pos = end;
                }
                continue;
            }
            _ => {
                let ch = input[start..].chars().next().unwrap_or('?');
                return Err(FilterError::syntax(start, format!("unexpected character '{}'", ch)));
            }
        }
        pos += 1;
    }

    tokens.push((input.len(), Token::End));
    Ok(tokens)
}

/// Reads a single-quoted literal starting at `quote`; `''` is an escaped quote
fn read_quoted(input: &str, quote: usize) -> FilterResult<(String, usize)> {
    let bytes = input.as_bytes();
    let mut text = String::new();
    let mut pos = quote + 1;
    let mut segment = pos;

    loop {
        match bytes.get(pos) {
            None => return Err(FilterError::syntax(quote, "unterminated string literal")),
            Some(b'\'') if bytes.get(pos + 1) == Some(&b'\'') => {
                text.push_str(&input[segment..=pos]);
                pos += 2;
                segment = pos;
            }
            Some(b'\'') => {
                text.push_str(&input[segment..pos]);
                return Ok((text, pos + 1));
            }
            Some(_) => pos += 1,
        }
    }
}

fn scan_number(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    if bytes.get(end) == Some(&b'-') {
        end += 1;
    }
    let digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    end = digits(end);
    if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
        end = digits(end + 1);
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            end = digits(exp);
        }
    }
    if matches!(bytes.get(end), Some(b'm' | b'M')) {
        end += 1;
    }
    end
}

fn number_literal(offset: usize, text: &str) -> FilterResult<Literal> {
    let invalid = || FilterError::syntax(offset, format!("invalid number '{}'", text));

    if let Some(digits) = text.strip_suffix(['m', 'M']) {
        return Decimal::from_str(digits).map(Literal::Decimal).map_err(|_| invalid());
    }
    if text.strip_prefix('-') == Some(INFINITY_TOKEN) {
        return Ok(Literal::Double(f64::NEG_INFINITY));
    }
    if text.contains(['.', 'e', 'E']) {
        return text.parse::<f64>().map(Literal::Double).map_err(|_| invalid());
    }
    match text.parse::<i64>() {
        Ok(v) => Ok(Literal::Int(v)),
        // integral doubles beyond i64 are written without a fraction
        Err(_) => text.parse::<f64>().map(Literal::Double).map_err(|_| invalid()),
    }
}

/// Integral double constants are written like integers; retype an integer
/// constant compared against a double operand
fn widen_to_double(expr: Expr, other: &Expr) -> Expr {
    match expr {
        Expr::Constant {
            value: Literal::Int(v),
            ..
        } if other.ty() == TypeRef::double() => Expr::constant(Literal::Double(v as f64)),
        expr => expr,
    }
}

/// Parses filter strings into predicate lambdas
pub struct FilterParser<'a> {
    registry: &'a FunctionRegistry,
    metadata: &'a dyn ResourceMetadata,
}

impl<'a> FilterParser<'a> {
    pub fn new(registry: &'a FunctionRegistry, metadata: &'a dyn ResourceMetadata) -> Self {
        Self { registry, metadata }
    }

    /// Parses `input` as a predicate over `element_type`
    pub fn parse(&self, input: &str, element_type: &TypeRef) -> FilterResult<Lambda> {
        self.parse_logged(input, element_type, true)
    }

    /// Parses `input` as a key selector, such as a sort key
    pub fn parse_selector(&self, input: &str, element_type: &TypeRef) -> FilterResult<Lambda> {
        self.parse_logged(input, element_type, false)
    }

    fn parse_logged(&self, input: &str, element_type: &TypeRef, predicate: bool) -> FilterResult<Lambda> {
        let result = self.parse_inner(input, element_type, predicate);
        match &result {
            Ok(_) => log_event_with_fields(Event::FilterParsed, &[("filter", input)]),
            Err(err) => {
                let reason = err.to_string();
                log_event_with_fields(
                    Event::FilterRejected,
                    &[("code", err.code()), ("filter", input), ("reason", reason.as_str())],
                );
            }
        }
        result
    }

    fn parse_inner(&self, input: &str, element_type: &TypeRef, predicate: bool) -> FilterResult<Lambda> {
        let mut state = ParseState {
            parser: self,
            tokens: tokenize(input)?,
            index: 0,
            root: Variable::new(ROOT_VARIABLE, element_type.clone()),
        };

        let body = state.operand()?;
        let (offset, token) = state.advance();
        if token != Token::End {
            return Err(FilterError::syntax(
                offset,
                format!("expected end of input, found {}", token.describe()),
            ));
        }
        if predicate && !body.ty().is_boolean() {
            return Err(FilterError::syntax(
                0,
                format!("filter evaluates to {}, expected Boolean", body.ty()),
            ));
        }
        Ok(Lambda::new(state.root, body))
    }
}

struct ParseState<'p, 'a> {
    parser: &'p FilterParser<'a>,
    tokens: Vec<(usize, Token)>,
    index: usize,
    root: Variable,
}

impl ParseState<'_, '_> {
    fn peek(&self) -> &Token {
        self.tokens
            .get(self.index)
            .map(|(_, token)| token)
            .unwrap_or(&Token::End)
    }

    fn advance(&mut self) -> (usize, Token) {
        match self.tokens.get(self.index) {
            Some((offset, token)) => {
                let next = (*offset, token.clone());
                if token != &Token::End {
                    self.index += 1;
                }
                next
            }
            None => (0, Token::End),
        }
    }

    fn expect(&mut self, expected: Token) -> FilterResult<usize> {
        let (offset, token) = self.advance();
        if token == expected {
            Ok(offset)
        } else {
            Err(FilterError::syntax(
                offset,
                format!("expected {}, found {}", expected.describe(), token.describe()),
            ))
        }
    }

    fn operand(&mut self) -> FilterResult<Expr> {
        let (offset, token) = self.advance();
        match token {
            Token::LParen => self.binary(offset),
            Token::Str(text) => Ok(Expr::constant(text)),
            Token::Number(text) => Ok(Expr::constant(number_literal(offset, &text)?)),
            Token::Guid(text) => Uuid::parse_str(&text)
                .map(Expr::constant)
                .map_err(|_| FilterError::syntax(offset, format!("invalid guid '{}'", text))),
            Token::DateTime(text) => parse_datetime(&text)
                .map(Expr::constant)
                .ok_or_else(|| FilterError::syntax(offset, format!("invalid datetime '{}'", text))),
            Token::Ident(name) => self.identifier(name),
            other => Err(FilterError::syntax(
                offset,
                format!("expected operand, found {}", other.describe()),
            )),
        }
    }

    fn identifier(&mut self, name: String) -> FilterResult<Expr> {
        let keyword = match name.as_str() {
            "true" => Some(Literal::Bool(true)),
            "false" => Some(Literal::Bool(false)),
            "null" => Some(Literal::Null),
            NAN_TOKEN => Some(Literal::Double(f64::NAN)),
            INFINITY_TOKEN => Some(Literal::Double(f64::INFINITY)),
            _ => None,
        };
        if let Some(value) = keyword {
            return Ok(Expr::constant(value));
        }
        if *self.peek() == Token::LParen {
            self.call(name)
        } else {
            self.member_path(name)
        }
    }

    /// `(` has been consumed
    fn binary(&mut self, open: usize) -> FilterResult<Expr> {
        let left = self.operand()?;
        let (offset, token) = self.advance();
        let op = match &token {
            Token::Ident(word) => BinaryOp::from_token(word),
            _ => None,
        }
        .ok_or_else(|| {
            FilterError::syntax(offset, format!("expected operator, found {}", token.describe()))
        })?;
        let right = self.operand()?;
        self.expect(Token::RParen)?;

        if op.is_logical() && !(left.ty().is_boolean() && right.ty().is_boolean()) {
            return Err(FilterError::syntax(
                open,
                format!("operands of '{}' must be predicates", op),
            ));
        }
        let left = widen_to_double(left, &right);
        let right = widen_to_double(right, &left);
        Ok(Expr::binary(op, left, right))
    }

    /// Function name has been consumed; the next token is `(`
    fn call(&mut self, name: String) -> FilterResult<Expr> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if *self.peek() == Token::RParen {
            self.advance();
        } else {
            loop {
                args.push(self.operand()?);
                let (offset, token) = self.advance();
                match token {
                    Token::Comma => continue,
                    Token::RParen => break,
                    other => {
                        return Err(FilterError::syntax(
                            offset,
                            format!("expected ',' or ')', found {}", other.describe()),
                        ))
                    }
                }
            }
        }

        let arity = args.len();
        self.parser
            .registry
            .try_parse_call(&name, args)
            .ok_or(FilterError::UnmappedFunction { name, arity })
    }

    fn member_path(&mut self, first: String) -> FilterResult<Expr> {
        let mut expr = Expr::param(&self.root);
        let mut name = first;
        loop {
            let owner = expr.ty();
            let resolved = self
                .parser
                .metadata
                .resolve_wire_name(&owner, &name)
                .ok_or_else(|| FilterError::UnknownMember {
                    owner: owner.to_string(),
                    name: name.clone(),
                })?;
            expr = expr.property(resolved.name, resolved.ty);

            if *self.peek() != Token::Dot {
                return Ok(expr);
            }
            self.advance();
            let (offset, token) = self.advance();
            name = match token {
                Token::Ident(next) => next,
                other => {
                    return Err(FilterError::syntax(
                        offset,
                        format!("expected member name, found {}", other.describe()),
                    ))
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterCompiler, StaticMetadata};

    fn registry() -> &'static FunctionRegistry {
        FunctionRegistry::builtin().unwrap()
    }

    fn critter() -> TypeRef {
        TypeRef::named("Critter")
    }

    fn metadata() -> StaticMetadata {
        StaticMetadata::new()
            .with_property(critter(), "Jalla", TypeRef::string())
            .with_property(critter(), "Age", TypeRef::int32())
            .with_property(critter(), "Owner", TypeRef::named("Person"))
            .with_property(critter(), "Scores", TypeRef::list(TypeRef::int32()))
            .with_property(TypeRef::named("Person"), "Name", TypeRef::string())
    }

    fn parse(input: &str) -> FilterResult<Lambda> {
        let metadata = metadata();
        FilterParser::new(registry(), &metadata).parse(input, &critter())
    }

    #[test]
    fn test_tokenize_quoted_escape() {
        let tokens = tokenize("'O''Brien'").unwrap();
        assert_eq!(tokens[0], (0, Token::Str("O'Brien".to_string())));
        assert_eq!(tokens[1].1, Token::End);
    }

    #[test]
    fn test_tokenize_numbers() {
        let tokens = tokenize("-42 10.25 100.10m 1e3").unwrap();
        let texts: Vec<_> = tokens
            .iter()
            .filter_map(|(_, t)| match t {
                Token::Number(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["-42", "10.25", "100.10m", "1e3"]);
    }

    #[test]
    fn test_number_literals() {
        assert_eq!(number_literal(0, "42").unwrap(), Literal::Int(42));
        assert_eq!(number_literal(0, "10.25").unwrap(), Literal::Double(10.25));
        assert_eq!(
            number_literal(0, "100.10m").unwrap(),
            Literal::Decimal(Decimal::new(10010, 2))
        );
        assert_eq!(
            number_literal(0, "1000000000000000000000").unwrap(),
            Literal::Double(1e21)
        );
        assert_eq!(number_literal(0, "-INF").unwrap(), Literal::Double(f64::NEG_INFINITY));
        assert!(number_literal(0, "1e").is_err());
    }

    #[test]
    fn test_tokenize_negative_infinity() {
        let tokens = tokenize("(-INF)").unwrap();
        assert_eq!(tokens[1], (1, Token::Number("-INF".to_string())));
        assert!(tokenize("-INFO").is_err());
    }

    #[test]
    fn test_parse_comparison() {
        let lambda = parse("(jalla eq 'What')").unwrap();
        assert_eq!(lambda.parameter.name(), "it");
        assert_eq!(
            FilterCompiler::new(registry()).compile(&lambda).unwrap(),
            "(jalla eq 'What')"
        );
    }

    #[test]
    fn test_parse_reordered_call() {
        let lambda = parse("substringof('cool',jalla)").unwrap();
        match &lambda.body {
            Expr::Call { member, args, .. } => {
                assert_eq!(member.name, "Contains");
                assert!(matches!(&args[0], Expr::Member { member, .. } if member.name == "Jalla"));
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_mapped_property_and_path() {
        let lambda = parse("((length(owner.name) gt 3) and (count(scores) eq 0))").unwrap();
        assert_eq!(
            FilterCompiler::new(registry()).compile(&lambda).unwrap(),
            "((length(owner.name) gt 3) and (count(scores) eq 0))"
        );
    }

    #[test]
    fn test_parse_typed_literals() {
        let input = "((jalla eq null) or (jalla eq datetime'2012-10-22T05:32:45Z'))";
        assert!(parse(input).is_ok());
        assert!(parse("(jalla ne guid'6dd20569-5c87-46f9-8665-9f413d9e7c47')").is_ok());
    }

    #[test]
    fn test_syntax_errors_carry_offsets() {
        match parse("(jalla eq 'What'") {
            Err(FilterError::Syntax { offset, .. }) => assert_eq!(offset, 16),
            other => panic!("expected syntax error, got {:?}", other),
        }
        match parse("(jalla is 'What')") {
            Err(FilterError::Syntax { offset, .. }) => assert_eq!(offset, 7),
            other => panic!("expected syntax error, got {:?}", other),
        }
        assert!(matches!(parse("'open"), Err(FilterError::Syntax { offset: 0, .. })));
        assert!(matches!(parse("(age eq 1) extra"), Err(FilterError::Syntax { .. })));
    }

    #[test]
    fn test_non_predicate_is_rejected() {
        assert!(matches!(parse("jalla"), Err(FilterError::Syntax { .. })));
        assert!(matches!(parse("((age) and (age eq 1))"), Err(FilterError::Syntax { .. })));
    }

    #[test]
    fn test_parse_selector() {
        let metadata = metadata();
        let parser = FilterParser::new(registry(), &metadata);
        let key = parser.parse_selector("owner.name", &critter()).unwrap();
        assert_eq!(key.return_type(), TypeRef::string());
        assert!(parser.parse_selector("owner.", &critter()).is_err());
    }

    #[test]
    fn test_unknown_member_and_function() {
        assert_eq!(
            parse("(weight gt 3)").unwrap_err(),
            FilterError::UnknownMember {
                owner: "Critter".to_string(),
                name: "weight".to_string()
            }
        );
        assert_eq!(
            parse("padleft(jalla,4)").unwrap_err(),
            FilterError::UnmappedFunction {
                name: "padleft".to_string(),
                arity: 2
            }
        );
    }
}
