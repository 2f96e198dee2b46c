//! CLI command implementations
//!
//! Every command loads the configuration (or defaults), reads its query
//! document, and writes one result to stdout. Nothing is written on failure;
//! the error is returned to `main`.

use std::path::Path;

use serde_json::{json, Value};

use crate::config::CompilerConfig;
use crate::filter::FilterCompiler;
use crate::observability::ObservationScope;
use crate::planner::{ExplainPlan, QueryPlan, QueryPlanBuilder, WireRequest};
use crate::registry::FunctionRegistry;

use super::args::Command;
use super::document::QueryDocument;
use super::errors::{CliError, CliResult};
use super::io::{read_input, write_response, write_text};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let name = cmd.name();
    let scope = ObservationScope::with_fields("COMMAND", &[("command", name)]);

    let result = match cmd {
        Command::Filter { query, config } => filter(&query, config.as_deref()),
        Command::Plan { query, config } => plan(&query, config.as_deref()),
        Command::Explain { query, config } => explain(&query, config.as_deref()),
        Command::Functions { config } => functions(config.as_deref()),
    };

    match &result {
        Ok(()) => scope.complete(),
        Err(e @ CliError::Registry(_)) => scope.fail_fatal(e.code(), &e.to_string()),
        Err(e) => scope.fail(e.code(), &e.to_string()),
    }
    result
}

fn load_config(path: Option<&Path>) -> CliResult<CompilerConfig> {
    match path {
        Some(path) => {
            let config = CompilerConfig::load(path)?;
            config.apply();
            Ok(config)
        }
        None => Ok(CompilerConfig::default()),
    }
}

fn load_plan(query_path: &Path, registry: &FunctionRegistry) -> CliResult<QueryPlan> {
    let document = QueryDocument::from_json(&read_input(query_path)?)?;
    let query = document.to_query(registry)?;
    Ok(QueryPlanBuilder::new().build(&query)?)
}

/// Print the compiled filter string; an empty line when the query has no filter
pub fn filter(query_path: &Path, config_path: Option<&Path>) -> CliResult<()> {
    load_config(config_path)?;
    let registry = FunctionRegistry::builtin()?;
    let plan = load_plan(query_path, registry)?;

    let text = match plan.predicate() {
        Some(predicate) => FilterCompiler::new(registry).compile(predicate)?,
        None => String::new(),
    };
    write_text(&text)
}

/// Print the plan and its wire parameters as JSON
pub fn plan(query_path: &Path, config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let registry = FunctionRegistry::builtin()?;
    let plan = load_plan(query_path, registry)?;
    let compiler = FilterCompiler::new(registry);
    let request = WireRequest::from_plan(&plan, &compiler, &config.wire)?;

    write_response(plan_json(&plan, &request))
}

pub(crate) fn plan_json(plan: &QueryPlan, request: &WireRequest) -> Value {
    let params: serde_json::Map<String, Value> = request
        .params()
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    json!({
        "element_type": plan.element_type().to_string(),
        "projection": plan.projection().as_str(),
        "skip": plan.skip(),
        "take": plan.take(),
        "params": params,
        "request": request.to_string(),
    })
}

/// Print an explain of the plan, or of the rejection
pub fn explain(query_path: &Path, config_path: Option<&Path>) -> CliResult<()> {
    load_config(config_path)?;
    let registry = FunctionRegistry::builtin()?;
    let document = QueryDocument::from_json(&read_input(query_path)?)?;
    let query = document.to_query(registry)?;

    let explain = match QueryPlanBuilder::new().build(&query) {
        Ok(plan) => ExplainPlan::from_plan(&plan, &FilterCompiler::new(registry)),
        Err(err) => ExplainPlan::from_error(&err),
    };
    write_text(explain.to_string().trim_end())
}

/// List every registered mapping with its format template
pub fn functions(config_path: Option<&Path>) -> CliResult<()> {
    load_config(config_path)?;
    let registry = FunctionRegistry::builtin()?;
    write_text(&function_listing(registry))
}

pub(crate) fn function_listing(registry: &FunctionRegistry) -> String {
    registry
        .mappings()
        .map(|m| format!("{:<48} {}", m.member().to_string(), m.format_template().text()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn document_file(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    const DOCUMENT: &str = r#"{
        "element_type": "Critter",
        "properties": { "Critter": { "Name": "String", "Age": "Int32" } },
        "operators": [
            { "op": "Where", "filter": "(age gt 3)" },
            { "op": "OrderBy", "key": "name" },
            { "op": "Take", "count": 2 }
        ]
    }"#;

    #[test]
    fn test_plan_json() {
        let registry = FunctionRegistry::builtin().unwrap();
        let file = document_file(DOCUMENT);
        let plan = load_plan(file.path(), registry).unwrap();
        let request = WireRequest::from_plan(
            &plan,
            &FilterCompiler::new(registry),
            &CompilerConfig::default().wire,
        )
        .unwrap();

        let value = plan_json(&plan, &request);
        assert_eq!(value["element_type"], "Critter");
        assert_eq!(value["projection"], "ENUMERABLE");
        assert_eq!(value["take"], 2);
        assert_eq!(value["params"]["filter"], "(age gt 3)");
        assert_eq!(value["request"], "filter=(age gt 3)&order=name&top=2");
    }

    #[test]
    fn test_rejected_plan_surfaces_code() {
        let registry = FunctionRegistry::builtin().unwrap();
        let file = document_file(
            r#"{"element_type": "Critter", "operators": [{"op": "Take", "count": 1}, {"op": "Take", "count": 2}]}"#,
        );
        let err = load_plan(file.path(), registry).unwrap_err();
        assert!(matches!(err, CliError::Planner(_)));
        assert_eq!(err.code(), "WQ_UNSUPPORTED_QUERY_SHAPE");
    }

    #[test]
    fn test_function_listing() {
        let listing = function_listing(FunctionRegistry::builtin().unwrap());
        assert!(listing.contains("substringof({1},{0})"));
        assert!(listing.lines().count() >= 29);
    }

    #[test]
    fn test_missing_query_file() {
        let err = filter(Path::new("/nonexistent/wirequery/query.json"), None).unwrap_err();
        assert_eq!(err.code(), "WQ_CLI_IO_ERROR");
    }
}
