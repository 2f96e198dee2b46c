//! Observable compiler events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded
    ConfigLoaded,

    // Function registry
    /// Registry built and frozen
    RegistryBuilt,
    /// Registry build aborted (FATAL)
    RegistryBuildFailed,
    /// Wildcard mapping bound to concrete type arguments
    MappingInstantiated,

    // Plan building
    /// Query plan built
    PlanBuilt,
    /// Query shape rejected
    PlanRejected,

    // Filter compilation
    /// Filter string produced
    FilterCompiled,
    /// Filter compilation failed
    FilterRejected,
    /// Filter string parsed into a predicate
    FilterParsed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::RegistryBuilt => "REGISTRY_BUILT",
            Event::RegistryBuildFailed => "REGISTRY_BUILD_FAILED",
            Event::MappingInstantiated => "MAPPING_INSTANTIATED",

            Event::PlanBuilt => "PLAN_BUILT",
            Event::PlanRejected => "PLAN_REJECTED",

            Event::FilterCompiled => "FILTER_COMPILED",
            Event::FilterRejected => "FILTER_REJECTED",
            Event::FilterParsed => "FILTER_PARSED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::RegistryBuildFailed)
    }

    /// Returns true if this event reports a rejected request
    pub fn is_rejection(&self) -> bool {
        matches!(self, Event::PlanRejected | Event::FilterRejected)
    }

    /// Returns true for high-volume, per-query events
    pub fn is_per_query(&self) -> bool {
        matches!(
            self,
            Event::PlanBuilt | Event::FilterCompiled | Event::FilterParsed | Event::MappingInstantiated
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_registry_failure_is_fatal() {
        assert!(Event::RegistryBuildFailed.is_fatal());
        assert!(!Event::PlanRejected.is_fatal());
        assert!(!Event::FilterRejected.is_fatal());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(Event::PlanRejected.to_string(), "PLAN_REJECTED");
        assert_eq!(Event::MappingInstantiated.as_str(), "MAPPING_INSTANTIATED");
    }
}
