use crate::{
    dispatcher::{EventDispatcher, Extraction},
    error::{XmlError, XmlResult},
    options::ParseOptions,
    reader::read_str,
    schema::Schema,
    validate::{ErrorHandler, LoggingErrorHandler},
};
use std::{io::Read, marker::PhantomData, path::Path};
use tracing::{debug, info};

/// Extracts the records of one [`Schema`] from XML documents.
///
/// A parser holds no per-document state, so one instance can process any
/// number of documents. Each call starts from a clean dispatcher.
#[derive(Debug, Clone)]
pub struct Parser<S: Schema> {
    options: ParseOptions,
    _schema: PhantomData<S>,
}
impl<S: Schema> Default for Parser<S> {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}
impl<S: Schema> Parser<S> {
    /// Create a parser with the given options.
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            _schema: PhantomData,
        }
    }

    /// The options this parser was created with.
    #[must_use]
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Extract records from a document held in memory.
    /// Validation diagnostics are logged.
    ///
    /// # Errors
    /// Returns errors if the XML is malformed or a field cannot be converted.
    pub fn parse_str(&self, src: &str) -> XmlResult<Extraction<S::Record>> {
        self.parse_str_with(src, &mut LoggingErrorHandler)
    }

    /// Extract records from a document held in memory, sending validation
    /// diagnostics to `handler`.
    ///
    /// # Errors
    /// Returns errors if the XML is malformed, a field cannot be converted,
    /// or the handler rejects a diagnostic.
    pub fn parse_str_with(
        &self,
        src: &str,
        handler: &mut dyn ErrorHandler,
    ) -> XmlResult<Extraction<S::Record>> {
        let mut dispatcher = EventDispatcher::new(S::dispatch_table());
        read_str(src, &mut dispatcher, &self.options, handler)?;

        let extraction = dispatcher.finish().map_err(|e| match &self.options.path {
            Some(path) => e.with_path(path.clone()),
            None => e,
        })?;
        debug!(records = extraction.records.len(), "Document processed");
        Ok(extraction)
    }

    /// Read a whole document from `reader`, then extract its records.
    ///
    /// # Errors
    /// Returns errors if reading fails, or for the same reasons as [`Self::parse_str`].
    pub fn parse_reader<R: Read>(&self, mut reader: R) -> XmlResult<Extraction<S::Record>> {
        let mut src = String::new();
        reader.read_to_string(&mut src)?;
        self.parse_str(&src)
    }

    /// Read and process the file at `path`. The path is attached to any error.
    ///
    /// # Errors
    /// Returns errors if the file cannot be read, or for the same reasons as [`Self::parse_str`].
    pub fn parse_file(&self, path: impl AsRef<Path>) -> XmlResult<Extraction<S::Record>> {
        let path = path.as_ref();
        info!(path = %path.display(), "Processing document");

        let src = std::fs::read_to_string(path)
            .map_err(|e| XmlError::from(e).with_path(path.to_path_buf()))?;

        let parser = Self::new(self.options.clone().with_path(path));
        parser.parse_str(&src)
    }

    /// Process a document held in memory and summarize it.
    ///
    /// # Errors
    /// Same as [`Self::parse_str`].
    pub fn report_str(&self, src: &str) -> XmlResult<S::Report> {
        self.parse_str(src).map(Into::into)
    }

    /// Process the file at `path` and summarize it.
    ///
    /// # Errors
    /// Same as [`Self::parse_file`].
    pub fn report_file(&self, path: impl AsRef<Path>) -> XmlResult<S::Report> {
        self.parse_file(path).map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ArticleSchema, MoleculeSchema, XmlErrorKind,
        validate::{CollectingErrorHandler, Severity},
    };

    const ARTICLES: &str = "<articles><article><front><article-meta>\
        <title-group><article-title>Streams</article-title></title-group>\
        </article-meta></front></article></articles>";

    #[test]
    fn test_parser_is_reusable() {
        let parser = Parser::<ArticleSchema>::default();
        let first = parser.parse_str(ARTICLES).unwrap();
        let second = parser.parse_str(ARTICLES).unwrap();
        assert_eq!(first.records.len(), 1);
        assert_eq!(second.records.len(), 1);
        assert_eq!(second.records[0].title(), "Streams");
    }

    #[test]
    fn test_parse_reader() {
        let parser = Parser::<ArticleSchema>::default();
        let extraction = parser.parse_reader(ARTICLES.as_bytes()).unwrap();
        assert_eq!(extraction.records[0].title(), "Streams");
    }

    #[test]
    fn test_missing_file_reports_path() {
        let parser = Parser::<MoleculeSchema>::default();
        let err = parser.parse_file("does/not/exist.xml").unwrap_err();
        assert!(matches!(err.kind, XmlErrorKind::Io(_)));
        assert_eq!(
            err.context.path.as_deref(),
            Some(Path::new("does/not/exist.xml"))
        );
    }

    #[test]
    fn test_validation_leaves_records_unchanged() {
        let parser = Parser::<ArticleSchema>::new(ParseOptions::new().with_validation(true));
        let mut handler = CollectingErrorHandler::default();
        let validated = parser.parse_str_with(ARTICLES, &mut handler).unwrap();
        let plain = Parser::<ArticleSchema>::default().parse_str(ARTICLES).unwrap();

        assert_eq!(validated.records, plain.records);
        assert_eq!(handler.diagnostics.len(), 1);
        assert_eq!(handler.diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn test_report_str() {
        let report = Parser::<ArticleSchema>::default()
            .report_str(ARTICLES)
            .unwrap();
        assert_eq!(report.articles.len(), 1);
        assert_eq!(report.longest_abstract, "Streams");
    }
}
