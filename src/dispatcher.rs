use crate::{
    dispatch::{DispatchTable, StartAction},
    error::{XmlErrorKind, XmlResult},
    event::{Attributes, EventSink, QName},
    path::PathStack,
    record::{Record, RecordStack},
};
use tracing::{debug, trace};

/// Everything a completed document produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<R> {
    /// Completed top-level records, in document order.
    pub records: Vec<R>,

    /// Comments seen outside the internal DTD subset.
    pub comments: usize,

    /// The longest namespace URI declared or used in the document.
    pub longest_namespace: String,
}

/// Builds records of type `R` from a stream of document events.
///
/// The state of the machine is the pair of stacks: where in the document the
/// current event is, and which records are open. Every event is resolved to a
/// path relative to the innermost record element and looked up in the
/// dispatch table.
///
/// One dispatcher handles one document. [`EventDispatcher::finish`] consumes it;
/// if any event fails, the dispatcher should be dropped along with every
/// record it holds.
#[derive(Debug)]
pub struct EventDispatcher<'t, R> {
    table: &'t DispatchTable<R>,
    path: PathStack,
    records: RecordStack<R>,
    finished: Vec<R>,
    comments: usize,
    in_dtd: bool,
    longest_namespace: String,
}
impl<'t, R: Record> EventDispatcher<'t, R> {
    /// Create a dispatcher driven by `table`.
    #[must_use]
    pub fn new(table: &'t DispatchTable<R>) -> Self {
        Self {
            table,
            path: PathStack::new(),
            records: RecordStack::new(),
            finished: Vec::new(),
            comments: 0,
            in_dtd: false,
            longest_namespace: String::new(),
        }
    }

    /// The current position in the document.
    #[must_use]
    pub fn path(&self) -> &PathStack {
        &self.path
    }

    /// The top-level records completed so far.
    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.finished
    }

    /// The number of comments counted so far.
    #[must_use]
    pub fn comments(&self) -> usize {
        self.comments
    }

    /// The longest namespace URI seen so far.
    #[must_use]
    pub fn longest_namespace(&self) -> &str {
        &self.longest_namespace
    }

    /// Hand over the completed records.
    ///
    /// # Errors
    /// Fails with [`XmlErrorKind::UnclosedTag`] if the event stream stopped
    /// inside an element; the open records are discarded.
    pub fn finish(self) -> XmlResult<Extraction<R>> {
        if let Some(open) = self.path.top() {
            return Err(XmlErrorKind::UnclosedTag(open.to_string()).into());
        }
        if !self.records.is_empty() {
            return Err(XmlErrorKind::UnclosedTag(self.table.marker().to_string()).into());
        }

        debug!(
            records = self.finished.len(),
            comments = self.comments,
            "document finished"
        );
        Ok(Extraction {
            records: self.finished,
            comments: self.comments,
            longest_namespace: self.longest_namespace,
        })
    }

    fn relative_path(&self) -> String {
        self.path.record_relative_path(self.table.marker())
    }

    fn note_namespace(&mut self, uri: &str) {
        if uri.len() > self.longest_namespace.len() {
            self.longest_namespace = uri.to_string();
        }
    }
}

impl<R: Record> EventSink for EventDispatcher<'_, R> {
    fn start_document(&mut self) {
        self.path = PathStack::new();
        self.records.clear();
        self.finished.clear();
        self.comments = 0;
        self.in_dtd = false;
        self.longest_namespace.clear();
    }

    fn start_element(&mut self, name: &QName<'_>, attributes: &Attributes) -> XmlResult<()> {
        self.path.push(name.local);
        if let Some(namespace) = name.namespace {
            trace!(element = %name, namespace, "namespaced element");
            self.note_namespace(namespace);
        }

        let path = self.relative_path();
        if self.table.is_marker(&path) {
            trace!(depth = self.records.depth() + 1, "record started");
            self.records.push_new();
            return Ok(());
        }

        let Some(action) = self.table.start_action(&path) else {
            return Ok(());
        };
        let Some(record) = self.records.top_mut() else {
            return Ok(());
        };

        trace!(path = %path, ?action, "start action");
        match action {
            StartAction::Increment(apply) => apply(record),
            StartAction::Attribute { name, apply } => {
                if let Some(value) = attributes.get(name).filter(|v| !v.is_empty()) {
                    apply(record, value);
                }
            }
        }
        Ok(())
    }

    fn end_element(&mut self, _name: &QName<'_>) -> XmlResult<()> {
        if self.table.is_marker(&self.relative_path()) {
            if let Some(record) = self.records.close()? {
                debug!(index = self.finished.len(), "record completed");
                self.finished.push(record);
            }
        }

        self.path.pop()?;
        Ok(())
    }

    fn text(&mut self, text: &str) -> XmlResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        let path = self.relative_path();
        let Some(action) = self.table.text_action(&path) else {
            return Ok(());
        };
        let Some(record) = self.records.top_mut() else {
            return Ok(());
        };

        trace!(path = %path, "text action");
        action(record, text)?;
        Ok(())
    }

    fn comment(&mut self, _text: &str) {
        if !self.in_dtd {
            self.comments += 1;
        }
    }

    fn start_dtd(&mut self, _name: &str) {
        self.in_dtd = true;
    }

    fn end_dtd(&mut self) {
        self.in_dtd = false;
    }

    fn start_prefix_mapping(&mut self, _prefix: Option<&str>, uri: &str) {
        self.note_namespace(uri);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::TextPattern;

    #[derive(Debug, Default, PartialEq)]
    struct Item {
        label: String,
        parts: usize,
        notes: Vec<String>,
        children: Vec<Item>,
    }
    impl Record for Item {
        fn attach(&mut self, child: Self) {
            self.children.push(child);
        }
    }

    fn table() -> DispatchTable<Item> {
        DispatchTable::<Item>::new("item")
            .on_start("item.part", StartAction::Increment(|i| i.parts += 1))
            .on_start(
                "item.label",
                StartAction::Attribute {
                    name: "value",
                    apply: |i, v| i.label = v.to_string(),
                },
            )
            .on_text(TextPattern::Exact("item.note"), |i, t| {
                i.notes.push(t.to_string());
                Ok(())
            })
            .on_text(TextPattern::Exact("item.number"), |_, t| {
                t.parse::<i32>()
                    .map(|_| ())
                    .map_err(|source| XmlErrorKind::FieldFormat {
                        field: "number",
                        value: t.to_string(),
                        source,
                    })
            })
    }

    fn start(d: &mut EventDispatcher<'_, Item>, name: &str) {
        d.start_element(&QName::local(name), &Attributes::new()).unwrap();
    }

    fn start_with(d: &mut EventDispatcher<'_, Item>, name: &str, attrs: &[(&str, &str)]) {
        let attributes: Attributes = attrs.iter().copied().collect();
        d.start_element(&QName::local(name), &attributes).unwrap();
    }

    fn end(d: &mut EventDispatcher<'_, Item>, name: &str) {
        d.end_element(&QName::local(name)).unwrap();
    }

    #[test]
    fn test_two_records_second_nested() {
        let table = table();
        let mut d = EventDispatcher::new(&table);
        d.start_document();

        start(&mut d, "items");
        start(&mut d, "item");
        start(&mut d, "part");
        end(&mut d, "part");
        end(&mut d, "item");
        start(&mut d, "item");
        start(&mut d, "item");
        start(&mut d, "part");
        end(&mut d, "part");
        end(&mut d, "item");
        end(&mut d, "item");
        end(&mut d, "items");

        assert_eq!(d.path().depth(), 0);
        let extraction = d.finish().unwrap();
        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.records[0].parts, 1);
        assert_eq!(extraction.records[1].parts, 0);
        assert_eq!(extraction.records[1].children.len(), 1);
        assert_eq!(extraction.records[1].children[0].parts, 1);
    }

    #[test]
    fn test_attribute_actions() {
        let table = table();
        let mut d = EventDispatcher::new(&table);

        start(&mut d, "item");
        start_with(&mut d, "label", &[("value", "")]);
        end(&mut d, "label");
        start(&mut d, "label");
        end(&mut d, "label");
        start_with(&mut d, "label", &[("value", "named")]);
        end(&mut d, "label");
        end(&mut d, "item");

        let extraction = d.finish().unwrap();
        assert_eq!(extraction.records[0].label, "named");
    }

    #[test]
    fn test_text_is_trimmed_and_unknown_paths_ignored() {
        let table = table();
        let mut d = EventDispatcher::new(&table);

        start(&mut d, "item");
        d.text("ignored at item level").unwrap();
        start(&mut d, "note");
        d.text("  hello \n").unwrap();
        d.text("   ").unwrap();
        end(&mut d, "note");
        start(&mut d, "unknown");
        d.text("skipped").unwrap();
        end(&mut d, "unknown");
        end(&mut d, "item");

        let extraction = d.finish().unwrap();
        assert_eq!(extraction.records[0].notes, vec!["hello"]);
    }

    #[test]
    fn test_text_action_errors_propagate() {
        let table = table();
        let mut d = EventDispatcher::new(&table);

        start(&mut d, "item");
        start(&mut d, "number");
        let err = d.text("twelve").unwrap_err();
        assert!(matches!(err.kind, XmlErrorKind::FieldFormat { field: "number", .. }));
    }

    #[test]
    fn test_end_without_start_underflows() {
        let table = table();
        let mut d = EventDispatcher::new(&table);
        let err = d.end_element(&QName::local("item")).unwrap_err();
        assert!(matches!(err.kind, XmlErrorKind::Underflow));
    }

    #[test]
    fn test_finish_with_open_elements_fails() {
        let table = table();
        let mut d = EventDispatcher::new(&table);
        start(&mut d, "items");
        start(&mut d, "item");

        let err = d.finish().unwrap_err();
        assert!(matches!(err.kind, XmlErrorKind::UnclosedTag(ref name) if name == "item"));
    }

    #[test]
    fn test_comments_inside_dtd_are_not_counted() {
        let table = table();
        let mut d = EventDispatcher::new(&table);

        d.comment("prolog");
        d.start_dtd("items");
        d.comment("in subset");
        d.end_dtd();
        start(&mut d, "items");
        d.comment("body");
        end(&mut d, "items");

        assert_eq!(d.comments(), 2);
    }

    #[test]
    fn test_longest_namespace() {
        let table = table();
        let mut d = EventDispatcher::new(&table);

        d.start_prefix_mapping(None, "urn:a");
        d.start_prefix_mapping(Some("x"), "http://example.com/long");
        let name = QName::new(Some("y"), "items").with_namespace(Some("urn:b"));
        d.start_element(&name, &Attributes::new()).unwrap();
        d.end_element(&name).unwrap();

        let extraction = d.finish().unwrap();
        assert_eq!(extraction.longest_namespace, "http://example.com/long");
    }

    #[test]
    fn test_start_document_resets_state() {
        let table = table();
        let mut d = EventDispatcher::new(&table);
        start(&mut d, "item");
        d.comment("c");

        d.start_document();
        assert_eq!(d.comments(), 0);
        assert!(d.path().is_empty());
        assert!(d.finish().unwrap().records.is_empty());
    }
}
