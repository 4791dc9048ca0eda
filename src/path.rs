use crate::error::XmlErrorKind;

/// Joins path segments.
pub const SEPARATOR: &str = ".";

/// The names of the currently open elements, root first.
///
/// Pushed on every element start and popped on every element end, so for a
/// well-formed document it is empty again once the root closes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathStack {
    names: Vec<String>,
}
impl PathStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter an element.
    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    /// Leave the innermost element.
    ///
    /// # Errors
    /// Fails with [`XmlErrorKind::Underflow`] if no element is open.
    pub fn pop(&mut self) -> Result<String, XmlErrorKind> {
        self.names.pop().ok_or(XmlErrorKind::Underflow)
    }

    /// Returns the number of open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.names.len()
    }

    /// Return true if no element is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the innermost open element.
    #[must_use]
    pub fn top(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    /// Returns the open elements, root first.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// All open elements joined root to leaf: `articles.article.front`
    #[must_use]
    pub fn current_path(&self) -> String {
        self.names.join(SEPARATOR)
    }

    /// The path from the innermost `marker` element down to the current element.
    ///
    /// With `[molecules, molecule, molecule, atomArray]` and marker `molecule`
    /// this is `molecule.atomArray`. Without any `marker` on the stack the full
    /// path is returned instead.
    #[must_use]
    pub fn record_relative_path(&self, marker: &str) -> String {
        match self.names.iter().rposition(|name| name == marker) {
            Some(index) => self.names[index..].join(SEPARATOR),
            None => self.current_path(),
        }
    }
}
impl std::fmt::Display for PathStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.current_path())
    }
}
