//! Bibliographic articles from JATS-style collections.
use crate::{
    dispatch::{DispatchTable, StartAction, TextPattern},
    error::XmlErrorKind,
    record::Record,
};
use std::sync::LazyLock;

/// The element that begins an article record.
pub const MARKER: &str = "article";

const TITLE_SEPARATOR: char = ' ';
const ABSTRACT_SEPARATOR: char = '\n';

/// An article assembled from one `<article>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    title: String,
    subtitle: String,
    abstract_text: String,
    authors: Vec<String>,
    publication_year: Option<i32>,
    sections: usize,
    sub_articles: Vec<Article>,
}
impl Article {
    /// Create an empty article.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment of the title, space separated.
    pub fn append_title(&mut self, fragment: &str) {
        append_fragment(&mut self.title, fragment, TITLE_SEPARATOR);
    }

    /// Append a fragment of the subtitle, space separated.
    pub fn append_subtitle(&mut self, fragment: &str) {
        append_fragment(&mut self.subtitle, fragment, TITLE_SEPARATOR);
    }

    /// Append a fragment of the abstract, newline separated.
    pub fn append_abstract(&mut self, fragment: &str) {
        append_fragment(&mut self.abstract_text, fragment, ABSTRACT_SEPARATOR);
    }

    /// Add an author surname. Authors keep their document order.
    pub fn add_author(&mut self, surname: impl Into<String>) {
        self.authors.push(surname.into());
    }

    /// Record a publication year, keeping the earliest one seen.
    pub fn add_publication_year(&mut self, year: i32) {
        self.publication_year = Some(match self.publication_year {
            Some(current) => current.min(year),
            None => year,
        });
    }

    /// Parse and record a publication year.
    ///
    /// # Errors
    /// Fails with [`XmlErrorKind::FieldFormat`] if `text` is not an integer.
    pub fn parse_publication_year(&mut self, text: &str) -> Result<(), XmlErrorKind> {
        let year = text
            .trim()
            .parse()
            .map_err(|source| XmlErrorKind::FieldFormat {
                field: "publication year",
                value: text.to_string(),
                source,
            })?;
        self.add_publication_year(year);
        Ok(())
    }

    /// Count one more body section.
    pub fn add_section(&mut self) {
        self.sections += 1;
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the subtitle, empty if the article has none.
    #[must_use]
    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    /// Returns the abstract, one fragment per line.
    #[must_use]
    pub fn abstract_text(&self) -> &str {
        &self.abstract_text
    }

    /// Returns the author surnames in document order.
    #[must_use]
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Returns the earliest publication year, if any was given.
    #[must_use]
    pub fn publication_year(&self) -> Option<i32> {
        self.publication_year
    }

    /// Returns the number of body sections.
    #[must_use]
    pub fn sections(&self) -> usize {
        self.sections
    }

    /// Returns articles nested inside this one.
    #[must_use]
    pub fn sub_articles(&self) -> &[Article] {
        &self.sub_articles
    }

    /// `title: subtitle`, or just the title if there is no subtitle.
    #[must_use]
    pub fn full_title(&self) -> String {
        if self.subtitle.is_empty() {
            self.title.clone()
        } else {
            format!("{}: {}", self.title, self.subtitle)
        }
    }

    /// The paths an article is built from.
    #[must_use]
    pub fn dispatch_table() -> &'static DispatchTable<Article> {
        &TABLE
    }
}
impl Record for Article {
    fn attach(&mut self, child: Self) {
        self.sub_articles.push(child);
    }
}
impl std::fmt::Display for Article {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\"{}\" written by {}. ",
            self.title,
            self.authors.join(", ")
        )?;
        match self.publication_year {
            Some(year) => write!(f, "Published in {year}. ")?,
            None => write!(f, "Publication year unknown. ")?,
        }
        write!(f, "Sections: {}.", self.sections)
    }
}

/// Merge a text fragment into a field.
///
/// Empty fragments are ignored, so `["A", "", "B"]` and `["A", "B"]` produce
/// the same value.
fn append_fragment(field: &mut String, fragment: &str, separator: char) {
    if fragment.is_empty() {
        return;
    }
    if !field.is_empty() {
        field.push(separator);
    }
    field.push_str(fragment);
}

static TABLE: LazyLock<DispatchTable<Article>> = LazyLock::new(|| {
    DispatchTable::<Article>::new(MARKER)
        .on_start("article.body.sec", StartAction::Increment(Article::add_section))
        .on_text(
            TextPattern::Subtree("article.front.article-meta.title-group.article-title"),
            |article, text| {
                article.append_title(text);
                Ok(())
            },
        )
        .on_text(
            TextPattern::Subtree("article.front.article-meta.title-group.subtitle"),
            |article, text| {
                article.append_subtitle(text);
                Ok(())
            },
        )
        .on_text(
            TextPattern::Subtree("article.front.article-meta.abstract"),
            |article, text| {
                article.append_abstract(text);
                Ok(())
            },
        )
        .on_text(
            TextPattern::Exact("article.front.article-meta.contrib-group.contrib.name.surname"),
            |article, text| {
                article.add_author(text);
                Ok(())
            },
        )
        .on_text(
            TextPattern::Exact("article.front.article-meta.contrib.name.surname"),
            |article, text| {
                article.add_author(text);
                Ok(())
            },
        )
        .on_text(
            TextPattern::Exact("article.front.article-meta.pub-date.year"),
            Article::parse_publication_year,
        )
});
