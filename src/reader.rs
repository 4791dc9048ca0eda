//! Drives the `xmlparser` tokenizer and turns its tokens into [`EventSink`] events.
//!
//! The tokenizer is zero-copy and only splits the input into tokens. This
//! module adds what the sink relies on: start tags are reported once all of
//! their attributes are known, namespace prefixes are resolved, character and
//! entity references are decoded, and every end tag is checked against the
//! innermost open tag.
use crate::{
    error::{ErrorContext, XmlError, XmlErrorKind, XmlResult, bail},
    event::{Attributes, EventSink, QName},
    options::ParseOptions,
    span::Span,
    validate::{self, Diagnostic, ErrorHandler, Severity, Validation},
};
use htmlentity::entity::{ICodedDataTrait, decode};
use std::{borrow::Cow, collections::HashMap};
use xmlparser::{ElementEnd, EntityDefinition, Token, Tokenizer};

const XMLNS: &str = "xmlns";
const XML_PREFIX: &str = "xml";
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Tokenize `src` and deliver its events to `sink`, in document order.
///
/// Validation diagnostics, if enabled in `options`, go to `handler`.
///
/// # Errors
/// Returns errors if the XML is malformed, if the sink rejects an event, or
/// if the handler turns a diagnostic into a fatal error.
pub fn read_str<S: EventSink + ?Sized>(
    src: &str,
    sink: &mut S,
    options: &ParseOptions,
    handler: &mut dyn ErrorHandler,
) -> XmlResult<()> {
    let mut reader = Reader {
        src,
        validation: options.validate.then(Validation::new),
        handler,
        entities: HashMap::new(),
        bindings: Vec::new(),
        open: Vec::new(),
        pending: None,
    };

    let result = match reader.run(sink) {
        Err(e) if options.validate && e.kind.is_well_formedness() => {
            Err(report_fatal(reader.handler, e))
        }
        other => other,
    };

    result.map_err(|e| match &options.path {
        Some(path) => e.with_path(path.clone()),
        None => e,
    })
}

/// With validation enabled, malformed markup is a fatal diagnostic and goes
/// through the handler like the grammar checks do.
fn report_fatal(handler: &mut dyn ErrorHandler, e: XmlError) -> XmlError {
    let position = e.context.position.unwrap_or_default();
    let diagnostic = Diagnostic::new(Severity::Fatal, position, e.kind.to_string());

    let mut fatal = handler.fatal_error(diagnostic);
    if fatal.context.line.is_empty() {
        fatal.context.line.clone_from(&e.context.line);
    }
    fatal
}

#[derive(PartialEq, Debug, Clone, Copy)]
enum ParserState {
    Prolog,
    Doctype,
    TagAttributes,
    TagChildren,
    Epilog,
}

/// A start tag whose attributes are still being read.
struct StartTag<'src> {
    prefix: &'src str,
    local: &'src str,
    span: Span,
    attributes: Vec<RawAttribute<'src>>,
}

struct RawAttribute<'src> {
    prefix: &'src str,
    local: &'src str,
    value: &'src str,
    span: Span,
}

struct OpenTag<'src> {
    prefix: &'src str,
    local: &'src str,
    namespace: Option<String>,

    /// Length of the binding stack before this tag declared its namespaces.
    scope: usize,
}

struct Reader<'src, 'h> {
    src: &'src str,
    validation: Option<Validation>,
    handler: &'h mut dyn ErrorHandler,

    /// Internal entities declared in the DTD; the first declaration wins.
    entities: HashMap<&'src str, String>,

    /// Namespace bindings in scope, innermost last. `None` is the default namespace.
    bindings: Vec<(Option<&'src str>, String)>,

    open: Vec<OpenTag<'src>>,
    pending: Option<StartTag<'src>>,
}
impl<'src> Reader<'src, '_> {
    fn run<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> XmlResult<()> {
        let src = self.src;
        let mut tokenizer = Tokenizer::from(src);
        let mut state = ParserState::Prolog;
        let mut prolog_started = false;
        let mut doctype_seen = false;

        sink.start_document();
        loop {
            // Get the next token
            let Some(next) = tokenizer.next() else {
                return self.finish(state, sink);
            };
            let token = match next {
                Ok(token) => token,
                Err(e) => {
                    let position = e.pos().into();
                    return Err(XmlError::new(XmlErrorKind::Xml(e), ErrorContext::at(position)));
                }
            };
            let span = token_span(&token);

            match state {
                ParserState::Prolog => {
                    match token {
                        Token::Declaration { .. } => {
                            if prolog_started {
                                bail!(src, span, XmlErrorKind::DeclarationNotFirst);
                            }
                        }

                        Token::ProcessingInstruction { .. } => {}

                        Token::Comment { text, .. } => sink.comment(text.as_str()),

                        Token::DtdStart { name, .. } | Token::EmptyDtd { name, .. } => {
                            if doctype_seen {
                                bail!(src, span, XmlErrorKind::DuplicateDoctype);
                            }
                            doctype_seen = true;

                            self.doctype(name.as_str());
                            sink.start_dtd(name.as_str());
                            if matches!(token, Token::DtdStart { .. }) {
                                state = ParserState::Doctype;
                            } else {
                                sink.end_dtd();
                            }
                        }

                        Token::ElementStart { prefix, local, .. } => {
                            self.begin_tag(prefix.as_str(), local.as_str(), span);
                            state = ParserState::TagAttributes;
                        }

                        Token::Text { text } if text.as_str().trim().is_empty() => {}

                        _ => {
                            bail!(src, span, unexpected(&token, "in prolog section"));
                        }
                    }
                    prolog_started = true;
                }

                ParserState::Doctype => match token {
                    Token::EntityDeclaration {
                        name, definition, ..
                    } => self.declare_entity(name.as_str(), definition, span)?,

                    Token::Comment { text, .. } => sink.comment(text.as_str()),

                    Token::ProcessingInstruction { .. } => {}

                    Token::DtdEnd { .. } => {
                        sink.end_dtd();
                        state = ParserState::Prolog;
                    }

                    _ => {
                        bail!(src, span, unexpected(&token, "in document type declaration"));
                    }
                },

                ParserState::TagAttributes => match token {
                    Token::Attribute {
                        prefix,
                        local,
                        value,
                        ..
                    } => {
                        let Some(tag) = self.pending.as_mut() else {
                            bail!(src, span, msg = "Bug; Cannot apply attribute; no start tag!");
                        };

                        tag.attributes.push(RawAttribute {
                            prefix: prefix.as_str(),
                            local: local.as_str(),
                            value: value.as_str(),
                            span,
                        });
                    }

                    Token::ElementEnd {
                        end: ElementEnd::Open,
                        ..
                    } => {
                        self.open_tag(sink)?;
                        state = ParserState::TagChildren;
                    }

                    Token::ElementEnd {
                        end: ElementEnd::Empty,
                        ..
                    } => {
                        self.open_tag(sink)?;
                        self.close_tag(sink, None, span)?;
                        state = self.state_after_close();
                    }

                    _ => {
                        bail!(src, span, unexpected(&token, "in tag attributes"));
                    }
                },

                ParserState::TagChildren => match token {
                    Token::ElementStart { prefix, local, .. } => {
                        self.begin_tag(prefix.as_str(), local.as_str(), span);
                        state = ParserState::TagAttributes;
                    }

                    Token::Text { text } => {
                        let text = self.decode(text.as_str(), span)?;
                        self.located(sink.text(&text), span)?;
                    }

                    Token::Cdata { text, .. } => {
                        self.located(sink.text(text.as_str()), span)?;
                    }

                    Token::Comment { text, .. } => sink.comment(text.as_str()),

                    Token::ProcessingInstruction { .. } => {}

                    Token::ElementEnd {
                        end: ElementEnd::Close(prefix, local),
                        ..
                    } => {
                        self.close_tag(sink, Some((prefix.as_str(), local.as_str())), span)?;
                        state = self.state_after_close();
                    }

                    _ => {
                        bail!(src, span, unexpected(&token, "inside tag"));
                    }
                },

                ParserState::Epilog => match token {
                    Token::Comment { text, .. } => sink.comment(text.as_str()),

                    Token::ProcessingInstruction { .. } => {}

                    Token::Text { text } if text.as_str().trim().is_empty() => {}

                    _ => {
                        bail!(src, span, unexpected(&token, "after root element"));
                    }
                },
            }
        }
    }

    fn finish<S: EventSink + ?Sized>(&self, state: ParserState, sink: &mut S) -> XmlResult<()> {
        let src = self.src;
        let end = Span::end_of(src);
        match state {
            ParserState::Epilog => self.located(sink.end_document(), end),

            ParserState::Prolog | ParserState::Doctype => {
                bail!(src, end, XmlErrorKind::UnexpectedEof)
            }

            ParserState::TagAttributes | ParserState::TagChildren => {
                let name = self
                    .pending
                    .as_ref()
                    .map(|tag| qualified(tag.prefix, tag.local))
                    .or_else(|| self.open.last().map(|tag| qualified(tag.prefix, tag.local)))
                    .unwrap_or_default();
                bail!(src, end, XmlErrorKind::UnclosedTag(name))
            }
        }
    }

    fn state_after_close(&self) -> ParserState {
        if self.open.is_empty() {
            ParserState::Epilog
        } else {
            ParserState::TagChildren
        }
    }

    fn begin_tag(&mut self, prefix: &'src str, local: &'src str, span: Span) {
        self.pending = Some(StartTag {
            prefix,
            local,
            span,
            attributes: Vec::new(),
        });
    }

    /// Report the pending start tag now that all of its attributes are known.
    fn open_tag<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> XmlResult<()> {
        let src = self.src;
        let Some(tag) = self.pending.take() else {
            bail!(src, Span::end_of(src), msg = "Bug; Cannot open tag; no start tag!");
        };

        //
        // Namespace declarations are consumed here and never reach the sink as attributes
        let scope = self.bindings.len();
        let mut attributes = Attributes::new();
        for attribute in &tag.attributes {
            let value = self.decode(attribute.value, attribute.span)?;
            match (non_empty(attribute.prefix), attribute.local) {
                (Some(XMLNS), local) => self.bind(sink, Some(local), value.into_owned()),
                (None, XMLNS) => self.bind(sink, None, value.into_owned()),
                (prefix, local) => attributes.push(prefix, local, value),
            }
        }

        let prefix = non_empty(tag.prefix);
        let namespace = match self.resolve(prefix) {
            Ok(namespace) => namespace,
            Err(kind) => bail!(src, tag.span, kind),
        };

        if self.open.is_empty() {
            if let Some(validation) = &self.validation {
                if let Some(diagnostic) = validation.root(tag.local, tag.span.position(src)) {
                    validate::report(self.handler, diagnostic)?;
                }
            }
        }

        let name = QName::new(prefix, tag.local).with_namespace(namespace.as_deref());
        self.located(sink.start_element(&name, &attributes), tag.span)?;

        self.open.push(OpenTag {
            prefix: tag.prefix,
            local: tag.local,
            namespace,
            scope,
        });
        Ok(())
    }

    /// Close the innermost open tag. `closing` is the name written in the end
    /// tag, or `None` for a self-closing tag.
    fn close_tag<S: EventSink + ?Sized>(
        &mut self,
        sink: &mut S,
        closing: Option<(&str, &str)>,
        span: Span,
    ) -> XmlResult<()> {
        let src = self.src;
        let Some(tag) = self.open.pop() else {
            bail!(src, span, XmlErrorKind::Underflow);
        };

        let name =
            QName::new(non_empty(tag.prefix), tag.local).with_namespace(tag.namespace.as_deref());
        if let Some((prefix, local)) = closing {
            if !name.equals(non_empty(prefix), local) {
                bail!(
                    src,
                    span,
                    XmlErrorKind::MismatchedTag {
                        expected: qualified(tag.prefix, tag.local),
                        found: qualified(prefix, local),
                    }
                );
            }
        }

        self.located(sink.end_element(&name), span)?;

        self.bindings.truncate(tag.scope);
        Ok(())
    }

    fn bind<S: EventSink + ?Sized>(&mut self, sink: &mut S, prefix: Option<&'src str>, uri: String) {
        sink.start_prefix_mapping(prefix, &uri);
        self.bindings.push((prefix, uri));
    }

    /// The namespace URI a prefix resolves to in the current scope.
    fn resolve(&self, prefix: Option<&str>) -> Result<Option<String>, XmlErrorKind> {
        let binding = self
            .bindings
            .iter()
            .rev()
            .find(|(bound, _)| *bound == prefix)
            .map(|(_, uri)| uri);

        match (prefix, binding) {
            // xmlns="" undeclares the default namespace
            (None, Some(uri)) if uri.is_empty() => Ok(None),
            (_, Some(uri)) => Ok(Some(uri.clone())),
            (None, None) => Ok(None),
            (Some(XML_PREFIX), None) => Ok(Some(XML_NAMESPACE.to_string())),
            (Some(prefix), None) => Err(XmlErrorKind::UnknownPrefix(prefix.to_string())),
        }
    }

    fn doctype(&mut self, name: &str) {
        if let Some(validation) = self.validation.as_mut() {
            validation.doctype(name);
        }
    }

    fn declare_entity(
        &mut self,
        name: &'src str,
        definition: EntityDefinition<'src>,
        span: Span,
    ) -> XmlResult<()> {
        if let Some(validation) = self.validation.as_mut() {
            if let Some(diagnostic) = validation.entity(name, span.position(self.src)) {
                validate::report(self.handler, diagnostic)?;
            }
        }

        //
        // External entities are never fetched
        if let EntityDefinition::EntityValue(value) = definition {
            if !self.entities.contains_key(name) {
                let value = self.decode(value.as_str(), span)?.into_owned();
                self.entities.insert(name, value);
            }
        }
        Ok(())
    }

    fn decode(&self, raw: &'src str, span: Span) -> XmlResult<Cow<'src, str>> {
        decode_references(raw, &self.entities)
            .map_err(|kind| XmlError::new(kind, ErrorContext::new(self.src, span)))
    }

    fn located<T>(&self, result: XmlResult<T>, span: Span) -> XmlResult<T> {
        result.map_err(|e| e.with_location(self.src, span))
    }
}

/// Replace character and entity references with the text they stand for.
///
/// Entities declared in the document take precedence over the predefined ones.
fn decode_references<'a>(
    raw: &'a str,
    entities: &HashMap<&str, String>,
) -> Result<Cow<'a, str>, XmlErrorKind> {
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }

    let mut decoded = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        decoded.push_str(&rest[..start]);
        let tail = &rest[start..];

        let Some(end) = tail.find(';') else {
            let fragment: String = tail.chars().take(16).collect();
            return Err(XmlErrorKind::Entity(fragment));
        };

        let reference = &tail[..=end];
        match entities.get(&reference[1..end]) {
            Some(value) => decoded.push_str(value),
            None => decoded.push_str(&decode_predefined(reference)?),
        }
        rest = &tail[end + 1..];
    }
    decoded.push_str(rest);

    Ok(Cow::Owned(decoded))
}

/// Decode one of the five predefined entities or a numeric character reference.
/// Anything else is an undeclared entity.
fn decode_predefined(reference: &str) -> Result<String, XmlErrorKind> {
    let name = &reference[1..reference.len() - 1];
    let decoded = match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        _ if name.starts_with('#') => return decode_numeric(reference),
        _ => return Err(XmlErrorKind::Entity(reference.to_string())),
    };
    Ok(decoded.to_string())
}

fn decode_numeric(reference: &str) -> Result<String, XmlErrorKind> {
    let decoded = decode(reference.as_bytes())
        .to_string()
        .map_err(|e| XmlErrorKind::Entity(format!("{reference}: {e}")))?;

    if decoded == reference {
        return Err(XmlErrorKind::Entity(reference.to_string()));
    }
    Ok(decoded)
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{prefix}:{local}")
    }
}

fn token_span(token: &Token<'_>) -> Span {
    let span = match *token {
        Token::Declaration { span, .. }
        | Token::ProcessingInstruction { span, .. }
        | Token::Comment { span, .. }
        | Token::DtdStart { span, .. }
        | Token::EmptyDtd { span, .. }
        | Token::EntityDeclaration { span, .. }
        | Token::DtdEnd { span, .. }
        | Token::ElementStart { span, .. }
        | Token::Attribute { span, .. }
        | Token::ElementEnd { span, .. }
        | Token::Cdata { span, .. } => span,
        Token::Text { text, .. } => text,
    };
    span.into()
}

fn unexpected(token: &Token<'_>, context: &'static str) -> XmlErrorKind {
    XmlErrorKind::UnexpectedToken {
        token: token_name(token),
        context,
    }
}

fn token_name(token: &Token<'_>) -> &'static str {
    match token {
        Token::Declaration { .. } => "XML declaration",
        Token::ProcessingInstruction { .. } => "processing instruction",
        Token::Comment { .. } => "comment",
        Token::DtdStart { .. } | Token::EmptyDtd { .. } => "DOCTYPE",
        Token::EntityDeclaration { .. } => "entity declaration",
        Token::DtdEnd { .. } => "DOCTYPE end",
        Token::ElementStart { .. } => "element",
        Token::Attribute { .. } => "attribute",
        Token::ElementEnd { .. } => "element end",
        Token::Text { .. } => "text",
        Token::Cdata { .. } => "CDATA section",
    }
}
