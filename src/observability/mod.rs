//! Observability for the query compiler
//!
//! Structured JSON logging of registry initialization, plan building and
//! filter compilation.
//!
//! # Principles
//!
//! 1. Observability is read-only: it never changes a compilation result
//! 2. Synchronous, no background threads
//! 3. Deterministic output (sorted fields)
//! 4. Quiet by default: only WARN and above unless configured
//!
//! # Usage
//!
//! ```ignore
//! use wirequery::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::PlanRejected, &[("code", "WQ_UNSUPPORTED_QUERY_SHAPE")]);
//!
//! let scope = ObservationScope::new("PLAN");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

fn event_severity(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event.is_rejection() {
        Severity::Warn
    } else if event.is_per_query() {
        Severity::Trace
    } else {
        Severity::Info
    }
}

/// Log an event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event_severity(event), event.as_str(), fields);
}
