//! Query documents
//!
//! The CLI reads queries as JSON: the element type, the properties of every
//! type a filter may reach, and the operator chain in application order.
//! Filters and keys are written in the filter grammar.
//!
//! ```json
//! {
//!   "element_type": "Critter",
//!   "properties": {
//!     "Critter": { "Name": "String", "Age": "Int32", "Owner": "Person" },
//!     "Person": { "Name": "String" }
//!   },
//!   "operators": [
//!     { "op": "Where", "filter": "(age gt 3)" },
//!     { "op": "OrderByDescending", "key": "owner.name" },
//!     { "op": "Take", "count": 10 }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Deserialize;

use crate::expr::Literal;
use crate::filter::{FilterParser, StaticMetadata};
use crate::planner::{QueryArg, QueryExpr};
use crate::registry::FunctionRegistry;
use crate::types::TypeRef;

use super::errors::{CliError, CliResult};

/// One operator of the chain
#[derive(Debug, Clone, Deserialize)]
pub struct QueryStep {
    pub op: String,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub count: Option<i64>,
}

/// A query as read from a file
#[derive(Debug, Clone, Deserialize)]
pub struct QueryDocument {
    pub element_type: TypeRef,
    #[serde(default)]
    pub properties: BTreeMap<String, BTreeMap<String, TypeRef>>,
    #[serde(default)]
    pub operators: Vec<QueryStep>,
}

impl QueryDocument {
    pub fn from_json(text: &str) -> CliResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Resource metadata declared by the document
    pub fn metadata(&self) -> CliResult<StaticMetadata> {
        let mut metadata = StaticMetadata::new();
        for (owner, properties) in &self.properties {
            let owner = TypeRef::from_str(owner)
                .map_err(|e| CliError::document(format!("invalid type '{}': {}", owner, e)))?;
            for (name, ty) in properties {
                metadata = metadata.with_property(owner.clone(), name.clone(), ty.clone());
            }
        }
        Ok(metadata)
    }

    /// Builds the composed query; filters are parsed, shape checks are left
    /// to the plan builder
    pub fn to_query(&self, registry: &FunctionRegistry) -> CliResult<QueryExpr> {
        let metadata = self.metadata()?;
        let parser = FilterParser::new(registry, &metadata);
        let element_type = &self.element_type;

        let mut query = QueryExpr::source(element_type.clone());
        for step in &self.operators {
            let mut type_args = vec![element_type.clone()];
            let mut args = Vec::new();

            if let Some(filter) = &step.filter {
                args.push(QueryArg::Lambda(parser.parse(filter, element_type)?));
            }
            if let Some(key) = &step.key {
                let selector = parser.parse_selector(key, element_type)?;
                type_args.push(selector.return_type());
                args.push(QueryArg::Lambda(selector));
            }
            if let Some(count) = step.count {
                args.push(QueryArg::Constant(Literal::Int(count)));
            }

            query = query.apply_generic(step.op.clone(), type_args, args);
        }
        Ok(query)
    }
}
