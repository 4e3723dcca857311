//! Warning types for non-fatal errors during JSONL processing.
//!
//! Resilient reading continues past malformed lines. The [`Warning`] type
//! records what was skipped and where, and [`WarningCollector`] accumulates
//! warnings while a stream is being consumed.

use std::sync::{Arc, Mutex};

/// A non-fatal warning that occurred during JSONL processing.
///
/// Each variant carries the 1-based line number where the issue occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A line contained JSON that could not be parsed into the target type.
    MalformedJson {
        /// The 1-based line number where the error occurred.
        line_number: usize,
        /// A description of the JSON parsing error.
        error: String,
    },

    /// A line was skipped for a reason other than malformed JSON.
    SkippedLine {
        /// The 1-based line number that was skipped.
        line_number: usize,
        /// The reason the line was skipped.
        reason: String,
    },
}

impl Warning {
    /// Returns the line number associated with this warning.
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedJson { line_number, .. } | Self::SkippedLine { line_number, .. } => {
                *line_number
            }
        }
    }

    /// Returns a human-readable description of the warning.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::MalformedJson { line_number, error } => {
                format!("line {}: malformed JSON: {}", line_number, error)
            }
            Self::SkippedLine {
                line_number,
                reason,
            } => {
                format!("line {}: skipped: {}", line_number, reason)
            }
        }
    }

    /// Returns a static string identifying the warning kind.
    ///
    /// Useful for filtering and grouping without matching on the variants.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::SkippedLine { .. } => "skipped_line",
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::error::Error for Warning {}

/// A thread-safe collector for accumulating warnings during JSONL processing.
///
/// Clones share the same underlying list, which lets the collector be handed
/// out alongside a stream and inspected while the stream is still being
/// consumed. All methods panic if the internal mutex is poisoned, which only
/// happens if another thread panicked while holding the lock.
///
/// # Examples
///
/// ```
/// use truss_jsonl::warning::{Warning, WarningCollector};
///
/// let collector = WarningCollector::new();
/// collector.add(Warning::MalformedJson {
///     line_number: 5,
///     error: "unexpected end of input".to_string(),
/// });
///
/// let warnings = collector.into_warnings();
/// assert_eq!(warnings.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WarningCollector {
    warnings: Arc<Mutex<Vec<Warning>>>,
}

impl WarningCollector {
    /// Creates a new empty `WarningCollector`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            warnings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a warning to the collector.
    pub fn add(&self, warning: Warning) {
        self.warnings
            .lock()
            .expect("warning collector mutex should not be poisoned")
            .push(warning);
    }

    /// Returns the number of warnings collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings
            .lock()
            .expect("warning collector mutex should not be poisoned")
            .len()
    }

    /// Returns `true` if no warnings have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the collected warnings in insertion order.
    #[must_use]
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings
            .lock()
            .expect("warning collector mutex should not be poisoned")
            .clone()
    }

    /// Removes all collected warnings.
    pub fn clear(&self) {
        self.warnings
            .lock()
            .expect("warning collector mutex should not be poisoned")
            .clear();
    }

    /// Consumes the collector and returns the collected warnings.
    ///
    /// If other clones still hold the shared list, the warnings are copied
    /// out instead of moved.
    #[must_use]
    pub fn into_warnings(self) -> Vec<Warning> {
        match Arc::try_unwrap(self.warnings) {
            Ok(mutex) => mutex
                .into_inner()
                .expect("warning collector mutex should not be poisoned"),
            Err(shared) => shared
                .lock()
                .expect("warning collector mutex should not be poisoned")
                .clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_reports_line_number() {
        let warning = Warning::MalformedJson {
            line_number: 42,
            error: "unexpected token".to_string(),
        };
        assert_eq!(warning.line_number(), 42);

        let skipped = Warning::SkippedLine {
            line_number: 7,
            reason: "empty after trim".to_string(),
        };
        assert_eq!(skipped.line_number(), 7);
    }

    #[test]
    fn description_contains_line_and_detail() {
        let warning = Warning::MalformedJson {
            line_number: 5,
            error: "unexpected end of input".to_string(),
        };
        let desc = warning.description();
        assert!(desc.contains("line 5"));
        assert!(desc.contains("unexpected end of input"));
    }

    #[test]
    fn kind_identifies_variant() {
        let malformed = Warning::MalformedJson {
            line_number: 1,
            error: "parse error".to_string(),
        };
        assert_eq!(malformed.kind(), "malformed_json");

        let skipped = Warning::SkippedLine {
            line_number: 2,
            reason: "empty".to_string(),
        };
        assert_eq!(skipped.kind(), "skipped_line");
    }

    #[test]
    fn display_matches_description() {
        let warning = Warning::SkippedLine {
            line_number: 3,
            reason: "test".to_string(),
        };
        assert_eq!(format!("{}", warning), warning.description());
    }

    #[test]
    fn collector_accumulates_in_order() {
        let collector = WarningCollector::new();
        assert!(collector.is_empty());

        for i in 1..=5 {
            collector.add(Warning::MalformedJson {
                line_number: i,
                error: format!("error{}", i),
            });
        }

        assert_eq!(collector.len(), 5);
        let warnings = collector.into_warnings();
        for (i, warning) in warnings.iter().enumerate() {
            assert_eq!(warning.line_number(), i + 1);
        }
    }

    #[test]
    fn collector_clones_share_state() {
        let collector1 = WarningCollector::new();
        let collector2 = collector1.clone();

        collector1.add(Warning::MalformedJson {
            line_number: 1,
            error: "test".to_string(),
        });
        collector2.add(Warning::SkippedLine {
            line_number: 2,
            reason: "test".to_string(),
        });

        assert_eq!(collector1.len(), 2);
        assert_eq!(collector2.len(), 2);
    }

    #[test]
    fn collector_clear_removes_all() {
        let collector = WarningCollector::new();
        collector.add(Warning::MalformedJson {
            line_number: 1,
            error: "test".to_string(),
        });
        collector.clear();
        assert!(collector.is_empty());
    }

    #[test]
    fn into_warnings_with_live_clone_copies() {
        let collector = WarningCollector::new();
        let clone = collector.clone();
        collector.add(Warning::MalformedJson {
            line_number: 9,
            error: "test".to_string(),
        });

        let warnings = collector.into_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(clone.len(), 1);
    }
}
