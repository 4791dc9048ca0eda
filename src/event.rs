//! The events a tokenizer feeds to the record builder.
use crate::error::XmlResult;

/// The name of an element, with an optional prefix and resolved namespace:
/// `prefix:local`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QName<'a> {
    /// The prefix as written in the document, if any.
    pub prefix: Option<&'a str>,

    /// The local portion of the name.
    pub local: &'a str,

    /// The namespace URI the prefix resolved to, if any.
    pub namespace: Option<&'a str>,
}
impl<'a> QName<'a> {
    /// Create a name with no namespace.
    #[must_use]
    pub fn new(prefix: Option<&'a str>, local: &'a str) -> Self {
        Self {
            prefix,
            local,
            namespace: None,
        }
    }

    /// Create an unprefixed name with no namespace.
    #[must_use]
    pub fn local(local: &'a str) -> Self {
        Self::new(None, local)
    }

    /// Attach a resolved namespace URI.
    #[must_use]
    pub fn with_namespace(mut self, namespace: Option<&'a str>) -> Self {
        self.namespace = namespace;
        self
    }

    /// Compare the name with a prefix and local name.
    #[must_use]
    pub fn equals(&self, prefix: Option<&str>, local: &str) -> bool {
        self.prefix == prefix && self.local == local
    }
}
impl std::fmt::Display for QName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(prefix) = self.prefix {
            write!(f, "{prefix}:{local}", local = self.local)
        } else {
            write!(f, "{local}", local = self.local)
        }
    }
}

/// An attribute set on an element, with its value already entity-decoded:
/// `name="value"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The prefix of the attribute name.
    pub prefix: Option<String>,

    /// The local portion of the attribute name.
    pub local: String,

    /// The value of the attribute.
    pub value: String,
}

/// The attributes of one element start event.
///
/// Duplicate attributes are allowed (lookups use the last attribute with the same name).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<Attribute>);
impl Attributes {
    /// Create an empty attribute list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute.
    pub fn push(&mut self, prefix: Option<&str>, local: &str, value: impl Into<String>) {
        self.0.push(Attribute {
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
            value: value.into(),
        });
    }

    /// Get the value of an unprefixed attribute by name.
    #[must_use]
    pub fn get(&self, local: &str) -> Option<&str> {
        self.get_qualified(None, local)
    }

    /// Get the value of an attribute by prefix and name.
    ///
    /// Searches the attributes in reverse order, so the last attribute with the same name is returned.
    #[must_use]
    pub fn get_qualified(&self, prefix: Option<&str>, local: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|a| a.prefix.as_deref() == prefix && a.local == local)
            .map(|a| a.value.as_str())
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the attributes in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.0.iter()
    }
}
impl<'a> FromIterator<(&'a str, &'a str)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut attributes = Self::new();
        for (local, value) in iter {
            attributes.push(None, local, value);
        }
        attributes
    }
}

/// Receives document events in document order.
///
/// Every handler runs to completion before the next event is delivered.
/// Returning an error aborts the whole document.
pub trait EventSink {
    /// Called once, before any other event.
    fn start_document(&mut self) {}

    /// An element started. Attributes are only available here.
    ///
    /// # Errors
    /// Implementations fail when the event cannot be applied to their state.
    fn start_element(&mut self, name: &QName<'_>, attributes: &Attributes) -> XmlResult<()>;

    /// An element ended.
    ///
    /// # Errors
    /// Implementations fail when the event cannot be applied to their state.
    fn end_element(&mut self, name: &QName<'_>) -> XmlResult<()>;

    /// A run of character data. A single logical value may arrive over several calls.
    ///
    /// # Errors
    /// Implementations fail when the text cannot be applied to their state.
    fn text(&mut self, text: &str) -> XmlResult<()>;

    /// A comment.
    fn comment(&mut self, text: &str);

    /// The internal DTD subset started.
    fn start_dtd(&mut self, _name: &str) {}

    /// The internal DTD subset ended.
    fn end_dtd(&mut self) {}

    /// A namespace prefix was bound to a URI. `prefix` is `None` for the default namespace.
    fn start_prefix_mapping(&mut self, _prefix: Option<&str>, _uri: &str) {}

    /// Called once, after the last event.
    ///
    /// # Errors
    /// Implementations fail when the document left them in an incomplete state.
    fn end_document(&mut self) -> XmlResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_display() {
        assert_eq!(QName::new(Some("cml"), "atom").to_string(), "cml:atom");
        assert_eq!(QName::local("atom").to_string(), "atom");
    }

    #[test]
    fn test_qname_equals_ignores_namespace() {
        let name = QName::new(Some("m"), "molecule").with_namespace(Some("urn:cml"));
        assert!(name.equals(Some("m"), "molecule"));
        assert!(!name.equals(None, "molecule"));
    }

    #[test]
    fn test_attributes_last_wins() {
        let attributes: Attributes = [("title", "first"), ("title", "second")].into_iter().collect();
        assert_eq!(attributes.get("title"), Some("second"));
        assert_eq!(attributes.len(), 2);
    }

    #[test]
    fn test_attributes_prefix_is_significant() {
        let mut attributes = Attributes::new();
        attributes.push(Some("xlink"), "title", "linked");
        assert_eq!(attributes.get("title"), None);
        assert_eq!(attributes.get_qualified(Some("xlink"), "title"), Some("linked"));
    }
}
