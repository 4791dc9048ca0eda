use pretty_assertions::assert_eq;
use xmlrecords::{
    ArticleReport, ArticleSchema, ParseOptions, Parser, XmlErrorKind,
    validate::{CollectingErrorHandler, Severity},
};

const SRC: &str = include_str!("articles.xml");

const REPORT: &str = "\
- Longest namespace: http://www.w3.org/1998/Math/MathML
- Longest abstract belongs to: \"Streaming XML Extraction: A Practical Survey\".
- Comments: 2
- Articles found: 2
  - \"Streaming XML Extraction\" written by Smith, Jones. Published in 2003. Sections: 3.
  - \"Short Note\" written by Lee. Publication year unknown. Sections: 1.
";

#[test]
fn test_articles() {
    let extraction = match Parser::<ArticleSchema>::default().parse_str(SRC) {
        Ok(extraction) => extraction,
        Err(e) => panic!("{e}"),
    };
    assert_eq!(extraction.records.len(), 2);

    let first = &extraction.records[0];
    assert_eq!(first.title(), "Streaming XML Extraction");
    assert_eq!(first.subtitle(), "A Practical Survey");
    assert_eq!(first.authors(), ["Smith", "Jones"]);
    assert_eq!(first.publication_year(), Some(2003));
    assert_eq!(first.sections(), 3);
    assert_eq!(
        first.abstract_text(),
        "Event-driven parsers never build a tree.\nThey keep memory flat & predictable."
    );

    let second = &extraction.records[1];
    assert_eq!(second.title(), "Short Note");
    assert_eq!(second.authors(), ["Lee"]);
    assert_eq!(second.publication_year(), None);

    let reply = &second.sub_articles()[0];
    assert_eq!(reply.title(), "Reply");
    assert_eq!(reply.publication_year(), Some(2010));
    assert!(reply.authors().is_empty());
}

#[test]
fn test_article_report() {
    let report: ArticleReport = match Parser::<ArticleSchema>::default().report_str(SRC) {
        Ok(report) => report,
        Err(e) => panic!("{e}"),
    };
    assert_eq!(report.to_string(), REPORT);
}

#[test]
fn test_bad_year_aborts() {
    let src = "<articles><article><front><article-meta>\
        <pub-date><year>20x4</year></pub-date>\
        </article-meta></front></article></articles>";

    let err = Parser::<ArticleSchema>::default().parse_str(src).unwrap_err();
    match &err.kind {
        XmlErrorKind::FieldFormat { field, value, .. } => {
            assert_eq!(*field, "publication year");
            assert_eq!(value, "20x4");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.context.position.is_some());
}

#[test]
fn test_mismatched_tags_abort() {
    let src = "<articles><article><front></article></front></articles>";
    assert!(Parser::<ArticleSchema>::default().parse_str(src).is_err());
}

#[test]
fn test_validation_is_reported_not_applied() {
    let parser = Parser::<ArticleSchema>::new(ParseOptions::new().with_validation(true));
    let mut handler = CollectingErrorHandler::default();

    let validated = match parser.parse_str_with(SRC, &mut handler) {
        Ok(extraction) => extraction,
        Err(e) => panic!("{e}"),
    };
    assert!(handler.diagnostics.is_empty());

    let src = SRC.replace("<!DOCTYPE articles", "<!DOCTYPE journal");
    let mismatched = match parser.parse_str_with(&src, &mut handler) {
        Ok(extraction) => extraction,
        Err(e) => panic!("{e}"),
    };
    assert_eq!(handler.diagnostics.len(), 1);
    assert_eq!(handler.diagnostics[0].severity, Severity::Error);
    assert_eq!(validated.records, mismatched.records);
}

#[test]
fn test_dtd_comments_are_not_counted() {
    let src = "<!DOCTYPE articles [<!-- a --><!-- b -->]><!-- c --><articles><!-- d --></articles>";
    let extraction = Parser::<ArticleSchema>::default().parse_str(src).unwrap();
    assert_eq!(extraction.comments, 2);
    assert!(extraction.records.is_empty());
}

#[test]
fn test_malformed_document_is_fatal_when_validating() {
    let parser = Parser::<ArticleSchema>::new(ParseOptions::new().with_validation(true));
    let mut handler = CollectingErrorHandler::default();

    let result = parser.parse_str_with("<articles><article></articles>", &mut handler);
    let Err(err) = result else {
        panic!("malformed document produced records");
    };
    assert!(matches!(err.kind, XmlErrorKind::Validation(_)));

    let severities: Vec<Severity> = handler.diagnostics.iter().map(|d| d.severity).collect();
    assert_eq!(severities, [Severity::Error, Severity::Fatal]);
}

#[test]
fn test_html_entities_are_rejected() {
    let src = "<articles><article><front><article-meta><title-group>\
        <article-title>A&nbsp;B &eacute;</article-title>\
        </title-group></article-meta></front></article></articles>";

    let err = Parser::<ArticleSchema>::default().parse_str(src).unwrap_err();
    assert!(matches!(err.kind, XmlErrorKind::Entity(ref e) if e == "&nbsp;"));
}
