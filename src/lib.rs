//! Single-pass extraction of typed records from XML collections.
//!
//! Documents are never turned into a tree. The tokenizer drives an
//! [`EventDispatcher`] one event at a time; the dispatcher tracks where it is
//! with a [`PathStack`], resolves that position to a path relative to the
//! innermost record element, and looks the path up in a static
//! [`DispatchTable`] to decide what to do with the event.
//!
//! Two record kinds ship with the crate:
//! - [`Article`]s from JATS-style `<articles><article>...` collections
//! - [`Molecule`]s from CML-style `<molecules><molecule>...` collections, where
//!   molecules may contain further molecules
//!
//! ```rust
//! use xmlrecords::{MoleculeSchema, Parser};
//!
//! let src = r#"<molecules>
//!     <molecule>
//!         <formula title="water"/>
//!         <atomArray><atom elementType="H"/><atom elementType="H"/><atom elementType="O"/></atomArray>
//!     </molecule>
//! </molecules>"#;
//!
//! let extraction = Parser::<MoleculeSchema>::default().parse_str(src).unwrap();
//! assert_eq!(extraction.records[0].name(), "water");
//! assert_eq!(extraction.records[0].formula(), "H2O");
//! ```
#![warn(missing_docs)]

pub mod error;
pub use error::{ErrorContext, XmlError, XmlErrorKind, XmlResult};

mod span;
pub use span::{Span, TextPosition};

mod event;
pub use event::{Attribute, Attributes, EventSink, QName};

mod path;
pub use path::PathStack;

mod record;
pub use record::{Record, RecordStack};

mod dispatch;
pub use dispatch::{DispatchTable, StartAction, TextAction, TextPattern};

mod dispatcher;
pub use dispatcher::{EventDispatcher, Extraction};

mod article;
pub use article::Article;

mod molecule;
pub use molecule::Molecule;

mod schema;
pub use schema::{ArticleSchema, MoleculeSchema, Schema};

mod report;
pub use report::{ArticleReport, MoleculeReport};

pub mod validate;
pub use validate::{Diagnostic, ErrorHandler, LoggingErrorHandler, Severity};

mod options;
pub use options::ParseOptions;

mod reader;
pub use reader::read_str;

mod parser;
pub use parser::Parser;
