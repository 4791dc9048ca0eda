//! Static lookup from record-relative paths to accumulation actions.
use crate::{error::XmlErrorKind, path::SEPARATOR};
use std::collections::HashMap;

/// Applies a run of trimmed text to a record.
pub type TextAction<R> = fn(&mut R, &str) -> Result<(), XmlErrorKind>;

/// What to do when an element at a registered path starts.
pub enum StartAction<R> {
    /// Bump a structural counter on the record.
    Increment(fn(&mut R)),

    /// Read an attribute of the element and apply it to the record.
    /// Skipped when the attribute is absent or empty.
    Attribute {
        /// The attribute to read.
        name: &'static str,

        /// Applies the attribute value.
        apply: fn(&mut R, &str),
    },
}
impl<R> Clone for StartAction<R> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<R> Copy for StartAction<R> {}
impl<R> std::fmt::Debug for StartAction<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Increment(_) => write!(f, "Increment"),
            Self::Attribute { name, .. } => write!(f, "Attribute({name})"),
        }
    }
}

/// Which text events a text action receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPattern {
    /// Only text directly at this path.
    Exact(&'static str),

    /// Text at this path or anywhere below it.
    ///
    /// Used for fields whose text is split up by inline formatting markup.
    Subtree(&'static str),
}
impl TextPattern {
    /// Return true if the pattern covers `path`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match *self {
            Self::Exact(pattern) => path == pattern,
            Self::Subtree(pattern) => path
                .strip_prefix(pattern)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(SEPARATOR)),
        }
    }
}

/// Maps record-relative paths to the actions that accumulate a record of type `R`.
///
/// Built once per record kind; lookups never allocate.
pub struct DispatchTable<R> {
    marker: &'static str,
    on_start: HashMap<&'static str, StartAction<R>>,
    on_text: HashMap<&'static str, TextAction<R>>,
    on_subtree_text: Vec<(&'static str, TextAction<R>)>,
}
impl<R> DispatchTable<R> {
    /// Create an empty table for records that begin at `marker` elements.
    #[must_use]
    pub fn new(marker: &'static str) -> Self {
        Self {
            marker,
            on_start: HashMap::new(),
            on_text: HashMap::new(),
            on_subtree_text: Vec::new(),
        }
    }

    /// Register an action for elements starting at `path`.
    #[must_use]
    pub fn on_start(mut self, path: &'static str, action: StartAction<R>) -> Self {
        self.on_start.insert(path, action);
        self
    }

    /// Register an action for text matching `pattern`.
    ///
    /// Exact paths take precedence over subtrees; among subtrees the first one
    /// registered wins.
    #[must_use]
    pub fn on_text(mut self, pattern: TextPattern, action: TextAction<R>) -> Self {
        match pattern {
            TextPattern::Exact(path) => {
                self.on_text.insert(path, action);
            }
            TextPattern::Subtree(path) => self.on_subtree_text.push((path, action)),
        }
        self
    }

    /// The element name that begins a record.
    #[must_use]
    pub fn marker(&self) -> &'static str {
        self.marker
    }

    /// Return true if `path` is the path of a record element itself.
    #[must_use]
    pub fn is_marker(&self, path: &str) -> bool {
        path == self.marker
    }

    /// The action for an element starting at `path`, if any.
    #[must_use]
    pub fn start_action(&self, path: &str) -> Option<StartAction<R>> {
        self.on_start.get(path).copied()
    }

    /// The action for text at `path`, if any.
    #[must_use]
    pub fn text_action(&self, path: &str) -> Option<TextAction<R>> {
        if let Some(action) = self.on_text.get(path) {
            return Some(*action);
        }

        self.on_subtree_text
            .iter()
            .find(|(pattern, _)| TextPattern::Subtree(pattern).matches(path))
            .map(|(_, action)| *action)
    }
}
impl<R> std::fmt::Debug for DispatchTable<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("marker", &self.marker)
            .field("on_start", &self.on_start)
            .field("on_text", &self.on_text.keys().collect::<Vec<_>>())
            .field(
                "on_subtree_text",
                &self.on_subtree_text.iter().map(|(p, _)| p).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Counter {
        starts: usize,
        label: String,
        text: Vec<String>,
    }

    fn table() -> DispatchTable<Counter> {
        DispatchTable::<Counter>::new("item")
            .on_start("item.part", StartAction::Increment(|c| c.starts += 1))
            .on_start(
                "item.label",
                StartAction::Attribute {
                    name: "value",
                    apply: |c, v| c.label = v.to_string(),
                },
            )
            .on_text(TextPattern::Exact("item.note"), |c, t| {
                c.text.push(format!("exact:{t}"));
                Ok(())
            })
            .on_text(TextPattern::Subtree("item.body"), |c, t| {
                c.text.push(format!("subtree:{t}"));
                Ok(())
            })
    }

    #[test]
    fn test_subtree_pattern_respects_segments() {
        let pattern = TextPattern::Subtree("a.abstract");
        assert!(pattern.matches("a.abstract"));
        assert!(pattern.matches("a.abstract.p.italic"));
        assert!(!pattern.matches("a.abstracts"));
        assert!(!pattern.matches("a"));
    }

    #[test]
    fn test_exact_pattern() {
        let pattern = TextPattern::Exact("a.b");
        assert!(pattern.matches("a.b"));
        assert!(!pattern.matches("a.b.c"));
    }

    #[test]
    fn test_start_actions() {
        let table = table();
        let mut counter = Counter::default();

        let Some(StartAction::Increment(apply)) = table.start_action("item.part") else {
            panic!("expected an increment");
        };
        apply(&mut counter);
        assert_eq!(counter.starts, 1);

        let Some(StartAction::Attribute { name, apply }) = table.start_action("item.label") else {
            panic!("expected an attribute action");
        };
        assert_eq!(name, "value");
        apply(&mut counter, "x");
        assert_eq!(counter.label, "x");

        assert!(table.start_action("item.other").is_none());
    }

    #[test]
    fn test_text_actions() {
        let table = table();
        let mut counter = Counter::default();

        table.text_action("item.note").unwrap()(&mut counter, "n").unwrap();
        table.text_action("item.body.p").unwrap()(&mut counter, "p").unwrap();
        assert!(table.text_action("item.note.inner").is_none());
        assert_eq!(counter.text, vec!["exact:n", "subtree:p"]);
    }

    #[test]
    fn test_marker() {
        let table = table();
        assert_eq!(table.marker(), "item");
        assert!(table.is_marker("item"));
        assert!(!table.is_marker("items.item"));
    }
}
