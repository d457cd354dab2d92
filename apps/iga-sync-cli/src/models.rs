//! CLI data models for the diagnostics report

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of a single diagnostic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticStatus {
    Pass,
    Warn,
    Fail,
    Skip,
}

impl DiagnosticStatus {
    /// Whether the check allows dependent checks to run.
    pub fn is_ok(self) -> bool {
        matches!(self, DiagnosticStatus::Pass | DiagnosticStatus::Warn)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            DiagnosticStatus::Pass => "✓",
            DiagnosticStatus::Warn => "!",
            DiagnosticStatus::Fail => "✗",
            DiagnosticStatus::Skip => "-",
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            DiagnosticStatus::Pass => "PASS",
            DiagnosticStatus::Warn => "WARN",
            DiagnosticStatus::Fail => "FAIL",
            DiagnosticStatus::Skip => "SKIP",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            DiagnosticStatus::Pass => "\x1b[32m",
            DiagnosticStatus::Warn => "\x1b[33m",
            DiagnosticStatus::Fail => "\x1b[31m",
            DiagnosticStatus::Skip => "\x1b[90m",
        }
    }
}

/// Result of one diagnostic check.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticCheck {
    pub name: String,
    pub display_name: String,
    pub status: DiagnosticStatus,
    pub message: String,
    pub suggestion: Option<String>,
}

impl DiagnosticCheck {
    pub fn pass(name: &str, display_name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            status: DiagnosticStatus::Pass,
            message: message.to_string(),
            suggestion: None,
        }
    }

    pub fn warn(name: &str, display_name: &str, message: &str, suggestion: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            status: DiagnosticStatus::Warn,
            message: message.to_string(),
            suggestion: suggestion.map(str::to_string),
        }
    }

    pub fn fail(name: &str, display_name: &str, message: &str, suggestion: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            status: DiagnosticStatus::Fail,
            message: message.to_string(),
            suggestion: Some(suggestion.to_string()),
        }
    }

    pub fn skip(name: &str, display_name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            status: DiagnosticStatus::Skip,
            message: message.to_string(),
            suggestion: None,
        }
    }
}

/// Aggregated diagnostics for one doctor run.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub checks: Vec<DiagnosticCheck>,
    pub overall_status: DiagnosticStatus,
    pub cli_version: String,
    pub timestamp: DateTime<Utc>,
}

impl DiagnosticReport {
    pub fn new(checks: Vec<DiagnosticCheck>) -> Self {
        let overall_status = if checks
            .iter()
            .any(|c| c.status == DiagnosticStatus::Fail)
        {
            DiagnosticStatus::Fail
        } else if checks.iter().any(|c| c.status == DiagnosticStatus::Warn) {
            DiagnosticStatus::Warn
        } else if checks.iter().all(|c| c.status == DiagnosticStatus::Skip) {
            DiagnosticStatus::Skip
        } else {
            DiagnosticStatus::Pass
        };

        Self {
            checks,
            overall_status,
            cli_version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.checks
            .iter()
            .all(|c| c.status == DiagnosticStatus::Pass)
    }

    pub fn fail_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == DiagnosticStatus::Fail)
            .count()
    }
}
