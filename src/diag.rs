//! Internal diagnostic model for grammar-level failures.
//!
//! The default `parse` API swallows grammar errors and returns `None`;
//! callers that opt into the diagnostic mode get these rendered as
//! `miette` reports with the query attached as source context.

use miette::{Diagnostic, LabeledSpan, Report, Severity};
use std::fmt;

use crate::ast::Span;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagSeverity {
    /// The grammar could not recognize the input.
    Error,
    /// Suspicious but recognizable input.
    Warning,
}

impl fmt::Display for DiagSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagSeverity::Error => write!(f, "error"),
            DiagSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// A labeled span within a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagLabel {
    pub span: Span,
    pub message: String,
}

/// A structured diagnostic produced while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub severity: DiagSeverity,
    pub message: String,
    pub labels: Vec<DiagLabel>,
    pub help: Option<String>,
}

impl Diag {
    /// Creates an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: DiagSeverity::Error,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }

    /// Adds a labeled span.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(DiagLabel {
            span,
            message: message.into(),
        });
        self
    }

    /// Sets the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Renders diagnostics as miette reports with the query attached.
pub fn to_reports(diagnostics: &[Diag], source: &str) -> Vec<Report> {
    diagnostics
        .iter()
        .map(|diag| to_report(diag, source))
        .collect()
}

/// Renders one diagnostic as a miette report.
///
/// Labels are clamped to the source bounds so a stale span can never
/// panic the renderer.
pub fn to_report(diag: &Diag, source: &str) -> Report {
    let labels = diag
        .labels
        .iter()
        .map(|label| {
            let start = label.span.start.min(source.len());
            let end = label.span.end.min(source.len()).max(start);
            LabeledSpan::new_primary_with_span(Some(label.message.clone()), (start, end - start))
        })
        .collect();

    let rendered = RenderedDiag {
        message: diag.message.clone(),
        severity: match diag.severity {
            DiagSeverity::Error => Severity::Error,
            DiagSeverity::Warning => Severity::Warning,
        },
        help: diag.help.clone(),
        labels,
    };

    Report::new(rendered).with_source_code(source.to_string())
}

/// Adapter implementing miette's `Diagnostic` trait.
#[derive(Debug)]
struct RenderedDiag {
    message: String,
    severity: Severity,
    help: Option<String>,
    labels: Vec<LabeledSpan>,
}

impl fmt::Display for RenderedDiag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RenderedDiag {}

impl Diagnostic for RenderedDiag {
    fn severity(&self) -> Option<Severity> {
        Some(self.severity)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            None
        } else {
            Some(Box::new(self.labels.clone().into_iter()))
        }
    }
}
