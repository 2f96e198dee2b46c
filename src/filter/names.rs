//! Wire names for members
//!
//! The compiler never derives wire names itself; a resolver supplied by the
//! resource metadata layer does. `LowerFirstNames` implements the default
//! convention (first character lower-cased).

use std::collections::HashMap;

use crate::types::{MemberIdentity, TypeRef};

/// Supplies the wire-visible name of a member
pub trait MemberNameResolver {
    fn wire_name(&self, member: &MemberIdentity) -> String;
}

/// Resolves wire names back to members; needed to parse filter strings
pub trait ResourceMetadata: MemberNameResolver {
    fn resolve_wire_name(&self, owner: &TypeRef, wire_name: &str) -> Option<ResolvedMember>;
}

/// A property found by its wire name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMember {
    pub name: String,
    pub ty: TypeRef,
}

/// Lower-cases the first character of a name
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Default naming convention: first character lower-cased
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerFirstNames;

impl MemberNameResolver for LowerFirstNames {
    fn wire_name(&self, member: &MemberIdentity) -> String {
        lower_first(&member.name)
    }
}

/// In-memory resource metadata, keyed by owning type
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    properties: HashMap<TypeRef, Vec<ResolvedMember>>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, owner: TypeRef, name: impl Into<String>, ty: TypeRef) -> Self {
        self.properties.entry(owner).or_default().push(ResolvedMember {
            name: name.into(),
            ty,
        });
        self
    }
}

impl MemberNameResolver for StaticMetadata {
    fn wire_name(&self, member: &MemberIdentity) -> String {
        lower_first(&member.name)
    }
}

impl ResourceMetadata for StaticMetadata {
    fn resolve_wire_name(&self, owner: &TypeRef, wire_name: &str) -> Option<ResolvedMember> {
        self.properties
            .get(owner)?
            .iter()
            .find(|p| lower_first(&p.name) == wire_name)
            .cloned()
    }
}
