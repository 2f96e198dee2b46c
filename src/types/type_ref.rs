//! Type references
//!
//! A `TypeRef` names a resource, primitive, or generic type as seen by the
//! query compiler. Text form: `String`, `List<Int32>`, `ICollection<?>` (wildcard
//! element type) and `!0` (generic parameter 0 of a definition).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Reference to a type known to the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// Non-generic type, e.g. `String` or a resource type name
    Named(String),
    /// Constructed generic type, e.g. `List<Int32>`
    Generic { definition: String, args: Vec<TypeRef> },
    /// Generic parameter of a definition, by position
    Param(usize),
    /// Any element type (registry templates only)
    Wildcard,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn generic(definition: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Generic {
            definition: definition.into(),
            args,
        }
    }

    pub fn string() -> Self {
        Self::named("String")
    }

    pub fn int32() -> Self {
        Self::named("Int32")
    }

    pub fn int64() -> Self {
        Self::named("Int64")
    }

    pub fn double() -> Self {
        Self::named("Double")
    }

    pub fn decimal() -> Self {
        Self::named("Decimal")
    }

    pub fn boolean() -> Self {
        Self::named("Boolean")
    }

    pub fn date_time() -> Self {
        Self::named("DateTime")
    }

    pub fn guid() -> Self {
        Self::named("Guid")
    }

    /// Type of an untyped `null`
    pub fn object() -> Self {
        Self::named("Object")
    }

    pub fn void() -> Self {
        Self::named("Void")
    }

    pub fn enumerable(element: TypeRef) -> Self {
        Self::generic("IEnumerable", vec![element])
    }

    pub fn collection(element: TypeRef) -> Self {
        Self::generic("ICollection", vec![element])
    }

    pub fn list(element: TypeRef) -> Self {
        Self::generic("List", vec![element])
    }

    /// Returns the generic definition name, if this is a constructed generic type
    pub fn definition(&self) -> Option<&str> {
        match self {
            TypeRef::Generic { definition, .. } => Some(definition),
            _ => None,
        }
    }

    /// Returns the type arguments of a constructed generic type (empty otherwise)
    pub fn type_args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Generic { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, TypeRef::Named(name) if name == "Boolean")
    }

    /// Returns true if a wildcard appears anywhere in this type
    pub fn contains_wildcard(&self) -> bool {
        match self {
            TypeRef::Wildcard => true,
            TypeRef::Generic { args, .. } => args.iter().any(TypeRef::contains_wildcard),
            _ => false,
        }
    }

    /// Replaces generic parameters with the given type arguments.
    ///
    /// Parameters without a matching argument are left in place.
    pub fn substitute(&self, args: &[TypeRef]) -> TypeRef {
        match self {
            TypeRef::Param(index) => args.get(*index).cloned().unwrap_or(TypeRef::Param(*index)),
            TypeRef::Generic { definition, args: inner } => TypeRef::Generic {
                definition: definition.clone(),
                args: inner.iter().map(|a| a.substitute(args)).collect(),
            },
            other => other.clone(),
        }
    }

    /// Structural match where a wildcard in `self` accepts any type.
    pub fn accepts(&self, actual: &TypeRef) -> bool {
        match (self, actual) {
            (TypeRef::Wildcard, _) => true,
            (TypeRef::Named(a), TypeRef::Named(b)) => a == b,
            (
                TypeRef::Generic { definition: da, args: aa },
                TypeRef::Generic { definition: db, args: ab },
            ) => {
                da == db
                    && aa.len() == ab.len()
                    && aa.iter().zip(ab).all(|(pattern, arg)| pattern.accepts(arg))
            }
            (TypeRef::Param(a), TypeRef::Param(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::Generic { definition, args } => {
                write!(f, "{}<", definition)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
            TypeRef::Param(index) => write!(f, "!{}", index),
            TypeRef::Wildcard => write!(f, "?"),
        }
    }
}

impl From<TypeRef> for String {
    fn from(ty: TypeRef) -> Self {
        ty.to_string()
    }
}

impl TryFrom<String> for TypeRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for TypeRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cursor = TypeCursor { input: s, pos: 0 };
        let ty = cursor.parse_type()?;
        cursor.skip_whitespace();
        if cursor.pos != s.len() {
            return Err(format!("unexpected '{}' in type '{}'", &s[cursor.pos..], s));
        }
        Ok(ty)
    }
}

struct TypeCursor<'a> {
    input: &'a str,
    pos: usize,
}

impl TypeCursor<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef, String> {
        self.skip_whitespace();
        if self.eat('?') {
            return Ok(TypeRef::Wildcard);
        }
        if self.eat('!') {
            let start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
            return self.input[start..self.pos]
                .parse()
                .map(TypeRef::Param)
                .map_err(|_| format!("invalid generic parameter in '{}'", self.input));
        }

        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '.') {
            self.pos += self.peek().map_or(1, char::len_utf8);
        }
        if start == self.pos {
            return Err(format!("expected type name in '{}'", self.input));
        }
        let name = self.input[start..self.pos].to_string();

        if !self.eat('<') {
            return Ok(TypeRef::Named(name));
        }
        let mut args = vec![self.parse_type()?];
        while self.eat(',') {
            args.push(self.parse_type()?);
        }
        if !self.eat('>') {
            return Err(format!("unterminated type arguments in '{}'", self.input));
        }
        Ok(TypeRef::generic(name, args))
    }
}
