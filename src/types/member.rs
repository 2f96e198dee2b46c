//! Member identities
//!
//! A member identity names one method or property of a declaring type. It is
//! the key the function registry uses to map calls onto grammar functions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::type_ref::TypeRef;

/// Kind of member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    Method,
    Property,
}

impl MemberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberKind::Method => "method",
            MemberKind::Property => "property",
        }
    }
}

/// Parameter signature of a member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signature {
    /// Concrete parameter types (empty for properties)
    Params(Vec<TypeRef>),
    /// Generic method definition, identified by its type parameter count
    GenericArity(usize),
}

/// Identity of a method or property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberIdentity {
    pub declaring_type: TypeRef,
    pub name: String,
    pub kind: MemberKind,
    #[serde(default)]
    pub is_static: bool,
    pub signature: Signature,
}

impl MemberIdentity {
    /// Instance property
    pub fn property(declaring_type: TypeRef, name: impl Into<String>) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            kind: MemberKind::Property,
            is_static: false,
            signature: Signature::Params(Vec::new()),
        }
    }

    /// Instance method with concrete parameter types
    pub fn method(declaring_type: TypeRef, name: impl Into<String>, params: Vec<TypeRef>) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            kind: MemberKind::Method,
            is_static: false,
            signature: Signature::Params(params),
        }
    }

    /// Static method with concrete parameter types
    pub fn static_method(
        declaring_type: TypeRef,
        name: impl Into<String>,
        params: Vec<TypeRef>,
    ) -> Self {
        Self {
            is_static: true,
            ..Self::method(declaring_type, name, params)
        }
    }

    /// Static generic method definition, e.g. `Enumerable.Any<T>`
    pub fn generic_static_method(
        declaring_type: TypeRef,
        name: impl Into<String>,
        arity: usize,
    ) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            kind: MemberKind::Method,
            is_static: true,
            signature: Signature::GenericArity(arity),
        }
    }

    pub fn is_property(&self) -> bool {
        self.kind == MemberKind::Property
    }

    /// Returns true if the member is bound to a receiver instance
    pub fn is_instance(&self) -> bool {
        !self.is_static
    }

    /// Concrete parameter types, if the signature is not a generic arity marker
    pub fn params(&self) -> Option<&[TypeRef]> {
        match &self.signature {
            Signature::Params(params) => Some(params),
            Signature::GenericArity(_) => None,
        }
    }
}

impl fmt::Display for MemberIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static {
            write!(f, "static ")?;
        }
        write!(f, "{}.{}", self.declaring_type, self.name)?;
        match (&self.kind, &self.signature) {
            (MemberKind::Property, _) => Ok(()),
            (MemberKind::Method, Signature::GenericArity(arity)) => write!(f, "`{}", arity),
            (MemberKind::Method, Signature::Params(params)) => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Key that identifies a member declared on a generic definition,
/// independent of the type arguments it is later bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateKey {
    pub definition: String,
    pub name: String,
    pub kind: MemberKind,
}

impl TemplateKey {
    /// Returns the template key for an instance member of a constructed generic type
    pub fn for_member(member: &MemberIdentity) -> Option<Self> {
        if member.is_static {
            return None;
        }
        member.declaring_type.definition().map(|definition| Self {
            definition: definition.to_string(),
            name: member.name.clone(),
            kind: member.kind,
        })
    }
}
