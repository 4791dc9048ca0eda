/// A byte range in the input XML.
///
/// The dispatcher works on owned strings; spans only survive long enough to
/// turn an offset into a human-readable position when something goes wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Offset of the first byte of the span.
    pub start: usize,

    /// Offset one past the last byte of the span.
    pub end: usize,
}
impl Span {
    /// Create a new span covering `start..end`.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Create an empty span at the end of the string.
    #[must_use]
    pub fn end_of(src: &str) -> Self {
        let len = src.len();
        let start = if len == 0 { 0 } else { len - 1 };
        Self { start, end: start }
    }

    /// Returns the length of the span.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Return true if len == 0
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the text covered by this span, or an empty string if the span
    /// does not fit the source.
    #[must_use]
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        src.get(self.start..self.end).unwrap_or_default()
    }

    /// Returns the first line of source covered by this span.
    #[must_use]
    pub fn first_line<'a>(&self, src: &'a str) -> &'a str {
        let text = self.text(src);
        text.split('\n').next().unwrap_or(text)
    }

    /// Calculates the row and column of the span in the input XML.
    ///
    /// Warning: This is an expensive operation, and should be used for error reporting only.
    #[must_use]
    pub fn position(&self, src: &str) -> TextPosition {
        TextPosition::from_offset(self.start, src)
    }
}

impl From<xmlparser::StrSpan<'_>> for Span {
    #[inline]
    fn from(span: xmlparser::StrSpan<'_>) -> Self {
        Self {
            start: span.start(),
            end: span.end(),
        }
    }
}

/// A 1-based row/column position in the input XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextPosition {
    /// Line number, starting at 1.
    pub row: usize,

    /// Column number in characters, starting at 1.
    pub col: usize,
}
impl TextPosition {
    /// Create a new position.
    #[must_use]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Walks the source up to `offset`, counting rows and columns.
    #[must_use]
    pub fn from_offset(offset: usize, src: &str) -> Self {
        let mut row = 1;
        let mut col = 1;
        for (i, c) in src.char_indices() {
            if i >= offset {
                break;
            }
            if c == '\n' {
                row += 1;
                col = 1;
            } else {
                col += 1;
            }
        }

        Self { row, col }
    }
}
impl Default for TextPosition {
    fn default() -> Self {
        Self { row: 1, col: 1 }
    }
}
impl From<xmlparser::TextPos> for TextPosition {
    fn from(pos: xmlparser::TextPos) -> Self {
        Self {
            row: pos.row as usize,
            col: pos.col as usize,
        }
    }
}
impl std::fmt::Display for TextPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}
