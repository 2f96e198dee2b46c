//! Function/member mapping registry
//!
//! Maps member identities (string, date/time, numeric and collection
//! operations) to grammar functions and back. The process-wide registry is
//! built once from the builtin table via [`FunctionRegistry::builtin`];
//! alternate registries can be built from custom tables for testing and
//! passed by reference wherever a registry is needed.

mod errors;
mod registry;
mod table;
mod template;

pub use errors::{RegistryError, RegistryResult};
pub use registry::{FunctionMapping, FunctionRegistry};
pub use table::{builtin_functions, FunctionSpec};
pub use template::FormatTemplate;
