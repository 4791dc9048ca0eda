//! Molecules from CML-style collections.
//!
//! A molecule owns the atoms listed directly under it and the molecules nested
//! inside it. Totals across the whole tree (`element_map`, `all_elements` and
//! everything derived from them) are recomputed on every call.
use crate::{
    dispatch::{DispatchTable, StartAction},
    record::Record,
};
use std::{collections::BTreeMap, sync::LazyLock};

/// The element that begins a molecule record.
pub const MARKER: &str = "molecule";

/// A molecule assembled from one `<molecule>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Molecule {
    name: Option<String>,
    atoms: BTreeMap<String, usize>,
    sub_molecules: Vec<Molecule>,
}
impl Molecule {
    /// Create an empty molecule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name of the molecule.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Add one atom of `element`.
    pub fn add_element(&mut self, element: &str) {
        self.add_element_count(element, 1);
    }

    /// Add `count` atoms of `element`. A count of zero is ignored.
    pub fn add_element_count(&mut self, element: &str, count: usize) {
        if count == 0 {
            return;
        }
        *self.atoms.entry(element.to_string()).or_default() += count;
    }

    /// Nest a completed molecule inside this one.
    pub fn add_molecule(&mut self, molecule: Molecule) {
        self.sub_molecules.push(molecule);
    }

    /// Returns the explicit name, or the formula if none was given.
    #[must_use]
    pub fn name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.formula(),
        }
    }

    /// Returns the atoms listed directly under this molecule.
    #[must_use]
    pub fn own_atoms(&self) -> &BTreeMap<String, usize> {
        &self.atoms
    }

    /// Returns the molecules nested directly inside this one.
    #[must_use]
    pub fn sub_molecules(&self) -> &[Molecule] {
        &self.sub_molecules
    }

    /// One entry per atom in this molecule and every nested molecule.
    #[must_use]
    pub fn all_elements(&self) -> Vec<&str> {
        let mut elements = Vec::new();
        let mut stack = vec![self];
        while let Some(molecule) = stack.pop() {
            for (element, count) in &molecule.atoms {
                elements.extend(std::iter::repeat_n(element.as_str(), *count));
            }
            stack.extend(molecule.sub_molecules.iter().rev());
        }
        elements
    }

    /// Total number of atoms in this molecule and every nested molecule.
    #[must_use]
    pub fn total_atoms(&self) -> usize {
        self.all_elements().len()
    }

    /// Atom counts per element across this molecule and every nested molecule.
    #[must_use]
    pub fn element_map(&self) -> BTreeMap<String, usize> {
        let mut map = self.atoms.clone();
        for molecule in &self.sub_molecules {
            for (element, count) in molecule.element_map() {
                *map.entry(element).or_default() += count;
            }
        }
        map
    }

    /// The chemical formula: element symbols in ascending order, each followed
    /// by its count when the count is above one.
    #[must_use]
    pub fn formula(&self) -> String {
        let mut formula = String::new();
        for (element, count) in self.element_map() {
            formula.push_str(&element);
            if count > 1 {
                formula.push_str(&count.to_string());
            }
        }
        formula
    }

    /// Whether the molecule contains carbon.
    ///
    /// Carbides, carbonates, cyanides and carbon oxides are inorganic but
    /// still classified as organic here.
    #[must_use]
    pub fn is_organic(&self) -> bool {
        self.element_map().contains_key("C")
    }

    /// `monatomic`, `diatomic`, `triatomic` or `polyatomic` by total atom
    /// count; empty for a molecule without atoms.
    #[must_use]
    pub fn atomic_categorization(&self) -> &'static str {
        match self.total_atoms() {
            0 => "",
            1 => "monatomic",
            2 => "diatomic",
            3 => "triatomic",
            _ => "polyatomic",
        }
    }

    /// The paths a molecule is built from.
    #[must_use]
    pub fn dispatch_table() -> &'static DispatchTable<Molecule> {
        &TABLE
    }
}
impl Record for Molecule {
    fn attach(&mut self, child: Self) {
        self.add_molecule(child);
    }
}
impl std::fmt::Display for Molecule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_organic() {
            "organic"
        } else {
            "inorganic"
        };
        let category = self.atomic_categorization();

        write!(
            f,
            "\"{name}\" made of {formula} ({atoms} atoms, {elements} elements). It is an {kind} ",
            name = self.name(),
            formula = self.formula(),
            atoms = self.total_atoms(),
            elements = self.element_map().len(),
        )?;
        if !category.is_empty() {
            write!(f, "{category} ")?;
        }
        write!(f, "compound.")?;

        if !self.sub_molecules.is_empty() {
            write!(f, " It has {} sub-molecules:", self.sub_molecules.len())?;
        }
        Ok(())
    }
}

static TABLE: LazyLock<DispatchTable<Molecule>> = LazyLock::new(|| {
    DispatchTable::<Molecule>::new(MARKER)
        .on_start(
            "molecule.formula",
            StartAction::Attribute {
                name: "title",
                apply: |molecule, title| molecule.set_name(title),
            },
        )
        .on_start(
            "molecule.atomArray.atom",
            StartAction::Attribute {
                name: "elementType",
                apply: Molecule::add_element,
            },
        )
});
