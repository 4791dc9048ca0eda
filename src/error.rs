//! Error handling for record extraction
use crate::{
    span::{Span, TextPosition},
    validate::Diagnostic,
};
use std::{num::ParseIntError, path::PathBuf};

/// A result type for record extraction, which can be either a successful value or an error.
pub type XmlResult<T> = std::result::Result<T, XmlError>;

/// An error that aborted the processing of a document.
///
/// There is no partial output: once one of these is returned, every record
/// built so far has been dropped.
#[derive(Debug)]
pub struct XmlError {
    /// The context of the error
    pub context: Box<ErrorContext>,

    /// The kind of error that occurred while processing a document
    pub kind: XmlErrorKind,
}
impl XmlError {
    /// Creates a new `XmlError`
    #[must_use]
    pub fn new(kind: XmlErrorKind, context: ErrorContext) -> Self {
        Self {
            context: Box::new(context),
            kind,
        }
    }

    /// Adds a path to the error context.
    #[must_use]
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.context.path = Some(path);
        self
    }

    /// Adds a source location to the error, unless it already has one.
    #[must_use]
    pub fn with_location(mut self, src: &str, span: Span) -> Self {
        if self.context.position.is_none() {
            let path = self.context.path.take();
            self.context = Box::new(ErrorContext::new(src, span));
            self.context.path = path;
        }
        self
    }
}
impl std::fmt::Display for XmlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.context)?;

        for line in self.kind.to_string().lines() {
            writeln!(f, "= {line}")?;
        }
        Ok(())
    }
}
impl std::error::Error for XmlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
impl From<XmlErrorKind> for XmlError {
    fn from(kind: XmlErrorKind) -> Self {
        Self::new(kind, ErrorContext::default())
    }
}
impl From<std::io::Error> for XmlError {
    fn from(err: std::io::Error) -> Self {
        XmlErrorKind::Io(err).into()
    }
}

/// The kind of error that occurred while processing a document.
#[derive(Debug, thiserror::Error)]
pub enum XmlErrorKind {
    /// Another error occurred while processing the document
    #[error("{0}")]
    Custom(String),

    /// An end event arrived with no open element to close
    #[error("Structural underflow: element end with no open element")]
    Underflow,

    /// A field expected to hold an integer could not be parsed
    #[error("Invalid {field} value `{value}`: {source}")]
    FieldFormat {
        /// Name of the field being accumulated
        field: &'static str,

        /// The offending text
        value: String,

        /// Why parsing failed
        source: ParseIntError,
    },

    /// A tag in the document was not closed before the document ended
    #[error("Unclosed tag: {0}")]
    UnclosedTag(String),

    /// A closing tag did not match the innermost open tag
    #[error("Mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedTag {
        /// The innermost open element
        expected: String,

        /// The element actually closed
        found: String,
    },

    /// The XML declaration was not first
    #[error("The <?xml> declaration must appear at the start of the document")]
    DeclarationNotFirst,

    /// More than one document type declaration
    #[error("A document may only have one <!DOCTYPE> declaration")]
    DuplicateDoctype,

    /// A token appeared where the document structure does not allow it
    #[error("Unexpected {token} {context}")]
    UnexpectedToken {
        /// What was found
        token: &'static str,

        /// Where it was found
        context: &'static str,
    },

    /// File ended unexpectedly
    #[error("End of file reached unexpectedly")]
    UnexpectedEof,

    /// An element or attribute used a namespace prefix that was never declared
    #[error("Unknown namespace prefix: {0}")]
    UnknownPrefix(String),

    /// A character or entity reference could not be decoded
    #[error("Invalid entity reference: {0}")]
    Entity(String),

    /// The validation collaborator reported a fatal error
    #[error("{0}")]
    Validation(Diagnostic),

    /// XML tokenizing failed
    #[error("XML parser error: {0}")]
    Xml(#[from] xmlparser::Error),

    /// IO error occurred while reading a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl XmlErrorKind {
    /// Whether the error means the document is not well-formed XML, as
    /// opposed to a failure while building records from it.
    #[must_use]
    pub fn is_well_formedness(&self) -> bool {
        matches!(
            self,
            Self::Underflow
                | Self::UnclosedTag(_)
                | Self::MismatchedTag { .. }
                | Self::DeclarationNotFirst
                | Self::DuplicateDoctype
                | Self::UnexpectedToken { .. }
                | Self::UnexpectedEof
                | Self::UnknownPrefix(_)
                | Self::Entity(_)
                | Self::Xml(_)
        )
    }
}

/// Context describing the error location in the source document.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The path to the file that was parsed, if available.
    pub path: Option<PathBuf>,

    /// The first source line of the offending markup.
    pub line: String,

    /// Position of the error in the source document.
    pub position: Option<TextPosition>,
}
impl ErrorContext {
    /// Creates a new `ErrorContext` from the source and the span of the offending markup.
    #[must_use]
    pub fn new(src: &str, span: Span) -> Self {
        Self {
            path: None,
            line: span.first_line(src).to_string(),
            position: Some(span.position(src)),
        }
    }

    /// Creates a new `ErrorContext` pointing at a position, with no source line.
    #[must_use]
    pub fn at(position: TextPosition) -> Self {
        Self {
            path: None,
            line: String::new(),
            position: Some(position),
        }
    }
}
impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = self.path.as_ref().map(|p| p.display());

        if !self.line.is_empty() {
            writeln!(f, "| {}", self.line)?;
        }

        if let Some(position) = self.position {
            write!(f, "= At ")?;

            if let Some(path) = path {
                write!(f, "{path}:")?;
            }

            writeln!(f, "{position}")?;
        } else if let Some(path) = path {
            writeln!(f, "= In {path}")?;
        }
        Ok(())
    }
}

/// Return early with an error located at a span of the source.
macro_rules! bail {
    ($src:expr, $span:expr, msg = $($fmt:tt)+) => {
        bail!($src, $span, $crate::error::XmlErrorKind::Custom(format!($($fmt)+)))
    };
    ($src:expr, $span:expr, $kind:expr) => {
        return Err($crate::error::XmlError::new(
            $kind,
            $crate::error::ErrorContext::new($src, $span),
        ))
    };
}
pub(crate) use bail;
