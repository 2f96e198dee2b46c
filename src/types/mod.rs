//! Type model for the query compiler
//!
//! Type references, member identities, and the catalog of generic
//! definitions used to rebind wildcard function mappings.

mod catalog;
mod member;
mod type_ref;

pub use catalog::{BoundMember, GenericDefinition, MemberDecl, TypeCatalog};
pub use member::{MemberIdentity, MemberKind, Signature, TemplateKey};
pub use type_ref::TypeRef;
