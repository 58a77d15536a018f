#![forbid(unsafe_code)]

//! Non-fatal runtime diagnostics.
//!
//! Nothing in the core escalates to process termination. Conditions that a
//! stricter design would reject (missing host, out-of-range initial values,
//! unknown identifiers) are corrected or skipped, and a [`Diagnostic`] is
//! recorded here and emitted as a `tracing` warning.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

const DIAGNOSTIC_LOG_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    HostUnavailable,
    PanelUnavailable,
    ValueClamped,
    SelectionReplaced,
    InvalidBounds,
    UnknownIdentifier,
    PayloadMismatch,
    MissingSibling,
    UnrecognizedWidget,
    MalformedEvent,
}

impl DiagnosticKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HostUnavailable => "host_unavailable",
            Self::PanelUnavailable => "panel_unavailable",
            Self::ValueClamped => "value_clamped",
            Self::SelectionReplaced => "selection_replaced",
            Self::InvalidBounds => "invalid_bounds",
            Self::UnknownIdentifier => "unknown_identifier",
            Self::PayloadMismatch => "payload_mismatch",
            Self::MissingSibling => "missing_sibling",
            Self::UnrecognizedWidget => "unrecognized_widget",
            Self::MalformedEvent => "malformed_event",
        }
    }
}

/// One recorded condition. `subject` is usually a control identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.kind.as_str(), self.subject, self.message)
    }
}

/// Bounded log of the most recent diagnostics.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: VecDeque<Diagnostic>,
    total: u64,
}

impl DiagnosticLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, subject: &str, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            kind,
            subject: subject.to_owned(),
            message: message.into(),
        };
        tracing::warn!(
            kind = kind.as_str(),
            subject = diagnostic.subject.as_str(),
            "{}",
            diagnostic.message
        );
        if self.entries.len() >= DIAGNOSTIC_LOG_CAPACITY {
            let _ = self.entries.pop_front();
        }
        self.entries.push_back(diagnostic);
        self.total = self.total.saturating_add(1);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    #[must_use]
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        self.entries.drain(..).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of diagnostics ever pushed, including evicted ones.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }
}
