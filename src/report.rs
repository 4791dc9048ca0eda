//! Aggregate summaries computed once a document has been fully processed.
//!
//! Use the `Display` implementations, or `write_report` to send a report to a
//! file or other writer.
use crate::{article::Article, dispatcher::Extraction, molecule::Molecule};
use std::io::Write;

const INDENT: &str = "    ";

/// The first item with the greatest key. Later items only win with a strictly greater key.
fn first_max_by_key<T, K: Ord>(items: &[T], key: impl Fn(&T) -> K) -> Option<&T> {
    let mut best: Option<(&T, K)> = None;
    for item in items {
        let candidate = key(item);
        match &best {
            Some((_, current)) if candidate <= *current => {}
            _ => best = Some((item, candidate)),
        }
    }
    best.map(|(item, _)| item)
}

/// Summary of an article collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleReport {
    /// The longest namespace URI in the document.
    pub longest_namespace: String,

    /// Full title of the article with the longest abstract, empty if there are no articles.
    pub longest_abstract: String,

    /// Number of comments outside the internal DTD subset.
    pub comments: usize,

    /// Top-level articles in document order.
    pub articles: Vec<Article>,
}
impl ArticleReport {
    /// Write the report to the given writer.
    ///
    /// # Errors
    /// Fails if the writer fails.
    pub fn write_report(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        write!(writer, "{self}")
    }
}
impl From<Extraction<Article>> for ArticleReport {
    fn from(extraction: Extraction<Article>) -> Self {
        let longest_abstract =
            first_max_by_key(&extraction.records, |a| a.abstract_text().chars().count())
                .map(Article::full_title)
                .unwrap_or_default();

        Self {
            longest_namespace: extraction.longest_namespace,
            longest_abstract,
            comments: extraction.comments,
            articles: extraction.records,
        }
    }
}
impl std::fmt::Display for ArticleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "- Longest namespace: {}", self.longest_namespace)?;
        writeln!(
            f,
            "- Longest abstract belongs to: \"{}\".",
            self.longest_abstract
        )?;
        writeln!(f, "- Comments: {}", self.comments)?;
        writeln!(f, "- Articles found: {}", self.articles.len())?;
        for article in &self.articles {
            writeln!(f, "  - {article}")?;
        }
        Ok(())
    }
}

/// Summary of a molecule collection.
///
/// Each maximum is computed independently over the top-level molecules, so
/// the three may name different molecules.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeReport {
    /// Name of the molecule with the most atoms.
    pub most_atoms: String,

    /// Name of the molecule with the most direct sub-molecules.
    pub most_sub_molecules: String,

    /// Name of the molecule with the most distinct elements.
    pub most_elements: String,

    /// Top-level molecules in document order.
    pub molecules: Vec<Molecule>,
}
impl MoleculeReport {
    /// Write the report to the given writer.
    ///
    /// # Errors
    /// Fails if the writer fails.
    pub fn write_report(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        write!(writer, "{self}")
    }
}
impl From<Extraction<Molecule>> for MoleculeReport {
    fn from(extraction: Extraction<Molecule>) -> Self {
        let molecules = extraction.records;
        let name_of = |m: Option<&Molecule>| m.map(Molecule::name).unwrap_or_default();

        Self {
            most_atoms: name_of(first_max_by_key(&molecules, Molecule::total_atoms)),
            most_sub_molecules: name_of(first_max_by_key(&molecules, |m| {
                m.sub_molecules().len()
            })),
            most_elements: name_of(first_max_by_key(&molecules, |m| m.element_map().len())),
            molecules,
        }
    }
}
impl std::fmt::Display for MoleculeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "- The molecule with the highest amount of atoms: {}",
            self.most_atoms
        )?;
        writeln!(
            f,
            "- The molecule with the highest amount of sub-molecules: {}",
            self.most_sub_molecules
        )?;
        writeln!(
            f,
            "- The molecule with the highest amount of different elements: {}",
            self.most_elements
        )?;
        writeln!(f, "- Molecules found: {}", self.molecules.len())?;

        //
        // Depth-first, without recursion; children are pushed in reverse so
        // they pop in document order
        let mut stack: Vec<(&Molecule, usize)> =
            self.molecules.iter().rev().map(|m| (m, 1)).collect();
        while let Some((molecule, depth)) = stack.pop() {
            let tab = INDENT.repeat(depth);
            writeln!(f, "{tab}- {molecule}")?;
            for sub in molecule.sub_molecules().iter().rev() {
                stack.push((sub, depth + 1));
            }
        }
        Ok(())
    }
}
