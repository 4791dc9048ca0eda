use crate::error::XmlErrorKind;

/// A domain entity materialized from a repeating element.
///
/// Records start out empty and are mutated by dispatch actions until their
/// element closes.
pub trait Record: Default + std::fmt::Debug {
    /// Take ownership of a completed record that was nested inside this one.
    fn attach(&mut self, child: Self);
}

/// The records whose elements are currently open, outermost first.
///
/// Closing a record hands it to the record below it; only the outermost record
/// is returned to the caller.
#[derive(Debug)]
pub struct RecordStack<R> {
    open: Vec<R>,
}
impl<R> Default for RecordStack<R> {
    fn default() -> Self {
        Self { open: Vec::new() }
    }
}
impl<R: Record> RecordStack<R> {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new, empty record nested in the current one.
    pub fn push_new(&mut self) {
        self.open.push(R::default());
    }

    /// The innermost open record, which receives every accumulation.
    pub fn top_mut(&mut self) -> Option<&mut R> {
        self.open.last_mut()
    }

    /// The innermost open record.
    #[must_use]
    pub fn top(&self) -> Option<&R> {
        self.open.last()
    }

    /// Returns the number of open records.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Return true if no record is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Complete the innermost record.
    ///
    /// If another record is still open the completed one is attached to it and
    /// `None` is returned; otherwise the completed top-level record is returned.
    ///
    /// # Errors
    /// Fails with [`XmlErrorKind::Underflow`] if no record is open.
    pub fn close(&mut self) -> Result<Option<R>, XmlErrorKind> {
        let record = self.open.pop().ok_or(XmlErrorKind::Underflow)?;
        match self.open.last_mut() {
            Some(parent) => {
                parent.attach(record);
                Ok(None)
            }
            None => Ok(Some(record)),
        }
    }

    /// Drop every open record.
    pub fn clear(&mut self) {
        self.open.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Node {
        id: usize,
        children: Vec<Node>,
    }
    impl Record for Node {
        fn attach(&mut self, child: Self) {
            self.children.push(child);
        }
    }

    #[test]
    fn test_close_top_level() {
        let mut stack = RecordStack::<Node>::new();
        stack.push_new();
        stack.top_mut().unwrap().id = 7;

        let closed = stack.close().unwrap().unwrap();
        assert_eq!(closed.id, 7);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_close_nested_attaches_to_parent() {
        let mut stack = RecordStack::<Node>::new();
        stack.push_new();
        stack.push_new();
        stack.top_mut().unwrap().id = 2;
        assert_eq!(stack.depth(), 2);

        assert!(stack.close().unwrap().is_none());
        let parent = stack.close().unwrap().unwrap();
        assert_eq!(parent.children.len(), 1);
        assert_eq!(parent.children[0].id, 2);
    }

    #[test]
    fn test_close_empty_underflows() {
        let mut stack = RecordStack::<Node>::new();
        assert!(matches!(stack.close(), Err(XmlErrorKind::Underflow)));
    }
}
