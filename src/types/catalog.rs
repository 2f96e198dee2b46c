//! Generic type catalog
//!
//! Describes the members and base types of generic definitions (`List<T>`,
//! `ICollection<T>`, ...) in terms of their own type parameters. The function
//! registry rebinds these declarations to concrete type arguments when a
//! wildcard mapping is looked up for a constructed type.

use std::collections::HashMap;

use super::member::{MemberIdentity, MemberKind, Signature};
use super::type_ref::TypeRef;

/// A member declared on a generic definition.
///
/// Parameter and return types may reference `TypeRef::Param`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDecl {
    pub name: String,
    pub kind: MemberKind,
    pub params: Vec<TypeRef>,
    pub returns: TypeRef,
}

impl MemberDecl {
    pub fn property(name: impl Into<String>, returns: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Property,
            params: Vec::new(),
            returns,
        }
    }

    pub fn method(name: impl Into<String>, params: Vec<TypeRef>, returns: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
            params,
            returns,
        }
    }
}

/// A generic type definition
#[derive(Debug, Clone)]
pub struct GenericDefinition {
    pub name: String,
    pub arity: usize,
    /// Base types and implemented interfaces, open over this definition's parameters
    pub bases: Vec<TypeRef>,
    pub members: Vec<MemberDecl>,
}

impl GenericDefinition {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
            bases: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.bases.push(base);
        self
    }

    pub fn with_member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }
}

/// A member of a generic definition rebound to concrete type arguments
#[derive(Debug, Clone, PartialEq)]
pub struct BoundMember {
    pub identity: MemberIdentity,
    pub returns: TypeRef,
}

/// Catalog of generic definitions
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    definitions: HashMap<String, GenericDefinition>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definition(mut self, definition: GenericDefinition) -> Self {
        self.definitions.insert(definition.name.clone(), definition);
        self
    }

    /// Catalog of the collection definitions the builtin function table refers to
    pub fn builtin() -> Self {
        let t = || TypeRef::Param(0);
        Self::new()
            .with_definition(GenericDefinition::new("IEnumerable", 1))
            .with_definition(
                GenericDefinition::new("ICollection", 1)
                    .with_base(TypeRef::enumerable(t()))
                    .with_member(MemberDecl::property("Count", TypeRef::int32()))
                    .with_member(MemberDecl::method("Contains", vec![t()], TypeRef::boolean()))
                    .with_member(MemberDecl::method("Add", vec![t()], TypeRef::void())),
            )
            .with_definition(
                GenericDefinition::new("List", 1)
                    .with_base(TypeRef::collection(t()))
                    .with_member(MemberDecl::property("Count", TypeRef::int32()))
                    .with_member(MemberDecl::method("Contains", vec![t()], TypeRef::boolean()))
                    .with_member(MemberDecl::method("IndexOf", vec![t()], TypeRef::int32()))
                    .with_member(MemberDecl::method("Add", vec![t()], TypeRef::void())),
            )
    }

    pub fn definition(&self, name: &str) -> Option<&GenericDefinition> {
        self.definitions.get(name)
    }

    /// Members of `definition` matching name and kind, still open over its parameters
    pub fn candidates(&self, definition: &str, name: &str, kind: MemberKind) -> Vec<&MemberDecl> {
        self.definition(definition)
            .map(|def| {
                def.members
                    .iter()
                    .filter(|m| m.name == name && m.kind == kind)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Rebinds the matching members of a generic definition to the type
    /// arguments of `declaring_type`, in declaration order.
    pub fn rebind(&self, declaring_type: &TypeRef, name: &str, kind: MemberKind) -> Vec<BoundMember> {
        let Some(definition) = declaring_type.definition() else {
            return Vec::new();
        };
        let args = declaring_type.type_args();
        self.candidates(definition, name, kind)
            .into_iter()
            .map(|decl| BoundMember {
                identity: MemberIdentity {
                    declaring_type: declaring_type.clone(),
                    name: decl.name.clone(),
                    kind: decl.kind,
                    is_static: false,
                    signature: Signature::Params(
                        decl.params.iter().map(|p| p.substitute(args)).collect(),
                    ),
                },
                returns: decl.returns.substitute(args),
            })
            .collect()
    }

    /// Finds the constructed form of `definition` that `actual` is or derives from.
    ///
    /// `List<Int32>` viewed as `ICollection` is `ICollection<Int32>`.
    pub fn view_as(&self, actual: &TypeRef, definition: &str) -> Option<TypeRef> {
        let own = actual.definition()?;
        if own == definition {
            return Some(actual.clone());
        }
        let def = self.definition(own)?;
        def.bases
            .iter()
            .map(|base| base.substitute(actual.type_args()))
            .find_map(|base| self.view_as(&base, definition))
    }

    /// Returns true if a value of type `actual` can be passed where `target` is expected.
    pub fn is_assignable(&self, target: &TypeRef, actual: &TypeRef) -> bool {
        if target.accepts(actual) {
            return true;
        }
        match target.definition() {
            Some(definition) => self
                .view_as(actual, definition)
                .map_or(false, |viewed| target.accepts(&viewed)),
            None => false,
        }
    }
}
