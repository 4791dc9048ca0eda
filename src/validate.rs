//! Validation diagnostics and the handler that receives them.
//!
//! Warnings and errors never change the records being built; they are
//! reported to an [`ErrorHandler`] and processing continues. A fatal
//! diagnostic aborts the document.
use crate::{
    error::{ErrorContext, XmlError, XmlErrorKind, XmlResult},
    span::TextPosition,
};
use std::collections::HashSet;
use tracing::{error, warn};

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational; processing continues.
    Warning,

    /// The document is invalid, but processing continues.
    Error,

    /// Processing stops.
    Fatal,
}
impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal error"),
        }
    }
}

/// A validation finding tied to a position in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// How serious the finding is.
    pub severity: Severity,

    /// Where in the document it was found.
    pub position: TextPosition,

    /// What was found.
    pub message: String,
}
impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(severity: Severity, position: TextPosition, message: impl Into<String>) -> Self {
        Self {
            severity,
            position,
            message: message.into(),
        }
    }
}
impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}: {}", self.severity, self.position, self.message)
    }
}

/// Receives validation diagnostics as they are found.
pub trait ErrorHandler {
    /// A warning. Processing continues.
    fn warning(&mut self, _diagnostic: &Diagnostic) {}

    /// A recoverable error. Processing continues.
    fn error(&mut self, _diagnostic: &Diagnostic) {}

    /// A fatal error. The returned error aborts the document.
    fn fatal_error(&mut self, diagnostic: Diagnostic) -> XmlError {
        diagnostic.into()
    }
}

/// Logs warnings and errors through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingErrorHandler;
impl ErrorHandler for LoggingErrorHandler {
    fn warning(&mut self, diagnostic: &Diagnostic) {
        warn!(position = %diagnostic.position, "{}", diagnostic.message);
    }

    fn error(&mut self, diagnostic: &Diagnostic) {
        error!(position = %diagnostic.position, "{}", diagnostic.message);
    }

    fn fatal_error(&mut self, diagnostic: Diagnostic) -> XmlError {
        error!(position = %diagnostic.position, fatal = true, "{}", diagnostic.message);
        diagnostic.into()
    }
}

/// Keeps every diagnostic, including the fatal one that ended the document.
#[derive(Debug, Clone, Default)]
pub struct CollectingErrorHandler {
    /// Diagnostics in the order they were reported.
    pub diagnostics: Vec<Diagnostic>,
}
impl CollectingErrorHandler {
    /// The fatal diagnostic, if the document was aborted.
    #[must_use]
    pub fn fatal(&self) -> Option<&Diagnostic> {
        self.diagnostics
            .iter()
            .find(|d| d.severity == Severity::Fatal)
    }
}
impl ErrorHandler for CollectingErrorHandler {
    fn warning(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }

    fn error(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }

    fn fatal_error(&mut self, diagnostic: Diagnostic) -> XmlError {
        self.diagnostics.push(diagnostic.clone());
        diagnostic.into()
    }
}

impl From<Diagnostic> for XmlError {
    fn from(diagnostic: Diagnostic) -> Self {
        let position = diagnostic.position;
        XmlError::new(
            XmlErrorKind::Validation(diagnostic),
            ErrorContext::at(position),
        )
    }
}

/// Route a diagnostic to the matching handler method.
///
/// # Errors
/// Returns the handler's error for fatal diagnostics.
pub fn report(handler: &mut dyn ErrorHandler, diagnostic: Diagnostic) -> XmlResult<()> {
    match diagnostic.severity {
        Severity::Warning => {
            handler.warning(&diagnostic);
            Ok(())
        }
        Severity::Error => {
            handler.error(&diagnostic);
            Ok(())
        }
        Severity::Fatal => Err(handler.fatal_error(diagnostic)),
    }
}

/// Grammar checks run while the document streams past.
///
/// Only what can be checked without buffering: the document type declaration
/// must exist and name the root element, and entities are declared once.
#[derive(Debug, Default)]
pub struct Validation {
    doctype: Option<String>,
    entities: HashSet<String>,
}
impl Validation {
    /// Create a validator with no grammar yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A `<!DOCTYPE name ...>` declaration was found.
    pub fn doctype(&mut self, name: &str) {
        self.doctype = Some(name.to_string());
    }

    /// An entity was declared in the internal subset.
    #[must_use]
    pub fn entity(&mut self, name: &str, position: TextPosition) -> Option<Diagnostic> {
        if self.entities.insert(name.to_string()) {
            return None;
        }

        Some(Diagnostic::new(
            Severity::Warning,
            position,
            format!("The entity \"{name}\" was declared more than once."),
        ))
    }

    /// The root element started.
    #[must_use]
    pub fn root(&self, name: &str, position: TextPosition) -> Option<Diagnostic> {
        match &self.doctype {
            None => Some(Diagnostic::new(
                Severity::Error,
                position,
                "Document is invalid: no grammar found.",
            )),
            Some(doctype) if doctype != name => Some(Diagnostic::new(
                Severity::Error,
                position,
                format!("Document root element \"{name}\", must match DOCTYPE root \"{doctype}\"."),
            )),
            Some(_) => None,
        }
    }
}
