//! Filter grammar
//!
//! Compiles predicate lambdas into OData-like filter strings and parses such
//! strings back. Output is deterministic: the same predicate always renders
//! to the same bytes.
//!
//! ```text
//! (jalla eq 'What')
//! ((age gt 3) and startswith(name,'Gangnam'))
//! substringof('cool',jalla)
//! ```

mod compiler;
mod errors;
mod literal;
mod names;
mod parser;

pub use compiler::FilterCompiler;
pub use errors::{FilterError, FilterResult};
pub use literal::{format_literal, write_literal};
pub use names::{lower_first, LowerFirstNames, MemberNameResolver, ResolvedMember, ResourceMetadata, StaticMetadata};
pub use parser::FilterParser;
