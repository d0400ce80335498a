//! Observable events for csvindex
//!
//! Events are explicit and typed. Every log line emitted by the engine
//! carries one of these names.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded and validated
    ConfigLoaded,

    // Engine lifecycle
    /// Engine constructed and ready for lookups
    EngineOpen,
    /// Engine construction rejected
    EngineOpenFailed,

    // Index load
    /// A malformed index row was dropped
    IndexRowSkipped,

    // Handle pool
    /// A fresh handle was opened onto the data file
    HandleOpened,
    /// Acquisition rejected by admission control
    HandleAdmissionRejected,
    /// The data file could not be opened for a new handle
    HandleOpenFailed,

    // Lookups
    /// Exact-match lookup finished
    LookupExact,
    /// Partial-match lookup finished
    LookupPartial,
    /// Lookup failed with an error
    LookupFailed,

    // Batch
    /// Batch run finished
    BatchComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::EngineOpen => "ENGINE_OPEN",
            Event::EngineOpenFailed => "ENGINE_OPEN_FAILED",

            Event::IndexRowSkipped => "INDEX_ROW_SKIPPED",

            Event::HandleOpened => "HANDLE_OPENED",
            Event::HandleAdmissionRejected => "HANDLE_ADMISSION_REJECTED",
            Event::HandleOpenFailed => "HANDLE_OPEN_FAILED",

            Event::LookupExact => "LOOKUP_EXACT",
            Event::LookupPartial => "LOOKUP_PARTIAL",
            Event::LookupFailed => "LOOKUP_FAILED",

            Event::BatchComplete => "BATCH_COMPLETE",
        }
    }

    /// Severity the event is logged at by default
    pub fn severity(&self) -> super::Severity {
        use super::Severity;
        match self {
            Event::HandleOpened | Event::LookupExact | Event::LookupPartial => Severity::Trace,
            Event::IndexRowSkipped | Event::HandleAdmissionRejected => Severity::Warn,
            Event::EngineOpenFailed | Event::HandleOpenFailed | Event::LookupFailed => {
                Severity::Error
            }
            Event::ConfigLoaded | Event::EngineOpen | Event::BatchComplete => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
