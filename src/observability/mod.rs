//! Observability for csvindex
//!
//! - Structured JSON logging (one line per event, stderr)
//! - Lookup metrics (relaxed atomic counters)
//! - Begin/complete scopes around construction-time work
//!
//! Observability never changes lookup outcomes: logging failures are
//! swallowed and counters are never read on the decision path.
//!
//! ```ignore
//! use csvindex::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::EngineOpen, &[("prefixes", "42")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{LookupMetrics, MetricsSnapshot};
pub use scope::ObservationScope;

/// Log an event with fields at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::IndexRowSkipped, &[("line", "3"), ("reason", "bad offset")]);
    }
}
