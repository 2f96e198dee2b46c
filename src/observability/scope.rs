//! ObservationScope for begin/complete logging around a unit of work
//!
//! - Logs `{name}_BEGIN` on creation (TRACE)
//! - Logs `{name}_COMPLETE` on `complete()` (INFO)
//! - Logs `{name}_FAILED` on `fail()` (WARN) or `fail_fatal()` (FATAL)
//! - Logs `{name}_INCOMPLETE` on drop if neither happened

use std::cell::Cell;
use std::time::Instant;

use super::logger::{Logger, Severity};

/// A scope that logs start and completion of a unit of work
pub struct ObservationScope<'a> {
    name: &'a str,
    completed: Cell<bool>,
    fields: Vec<(&'a str, String)>,
    started: Instant,
}

impl<'a> ObservationScope<'a> {
    pub fn new(name: &'a str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Create a scope whose fields are repeated on every line it logs
    pub fn with_fields(name: &'a str, fields: &[(&'a str, &str)]) -> Self {
        Logger::trace(&format!("{}_BEGIN", name), fields);

        Self {
            name,
            completed: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            started: Instant::now(),
        }
    }

    fn finish(&self, severity: Severity, suffix: &str, extra: &[(&str, &str)]) {
        self.completed.set(true);
        if !Logger::enabled(severity) {
            return;
        }
        let elapsed = self.started.elapsed().as_micros().to_string();
        let mut all: Vec<(&str, &str)> = self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        all.extend(extra.iter().copied());
        all.push(("elapsed_us", elapsed.as_str()));
        Logger::log(severity, &format!("{}_{}", self.name, suffix), &all);
    }

    pub fn complete(self) {
        self.finish(Severity::Info, "COMPLETE", &[]);
    }

    pub fn complete_with_fields(self, extra_fields: &[(&str, &str)]) {
        self.finish(Severity::Info, "COMPLETE", extra_fields);
    }

    /// Mark the scope as failed; the caller surfaces the error
    pub fn fail(self, code: &str, reason: &str) {
        self.finish(Severity::Warn, "FAILED", &[("code", code), ("reason", reason)]);
    }

    /// Mark the scope as failed with FATAL severity
    pub fn fail_fatal(self, code: &str, reason: &str) {
        self.finish(Severity::Fatal, "FAILED", &[("code", code), ("reason", reason)]);
    }

    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed.get() {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_starts_incomplete() {
        let scope = ObservationScope::new("TEST");
        assert!(!scope.is_completed());
        scope.complete();
    }

    #[test]
    fn test_scope_with_fields() {
        let scope = ObservationScope::with_fields("TEST", &[("element_type", "Critter")]);
        scope.complete_with_fields(&[("projection", "First")]);
    }

    #[test]
    fn test_scope_fail() {
        let scope = ObservationScope::new("TEST");
        scope.fail("WQ_UNSUPPORTED_QUERY_SHAPE", "second Skip");
    }

    #[test]
    fn test_scope_fail_fatal() {
        let scope = ObservationScope::with_fields("COMMAND", &[("command", "functions")]);
        assert!(!scope.is_completed());
        scope.fail_fatal("WQ_DUPLICATE_MAPPING", "duplicate mapping for String.Length");
    }

    #[test]
    fn test_scope_drop_without_complete() {
        let scope = ObservationScope::new("TEST");
        drop(scope);
    }
}
