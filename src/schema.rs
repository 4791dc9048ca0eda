use crate::{
    article::Article,
    dispatch::DispatchTable,
    dispatcher::Extraction,
    molecule::Molecule,
    record::Record,
    report::{ArticleReport, MoleculeReport},
};

/// A kind of record collection the parser understands.
pub trait Schema {
    /// The record built from each marker element.
    type Record: Record + 'static;

    /// The summary produced once the document is complete.
    type Report: From<Extraction<Self::Record>> + std::fmt::Display;

    /// The table that drives record accumulation.
    fn dispatch_table() -> &'static DispatchTable<Self::Record>;
}

/// JATS-style `<articles><article>...</article></articles>` collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleSchema;
impl Schema for ArticleSchema {
    type Record = Article;
    type Report = ArticleReport;

    fn dispatch_table() -> &'static DispatchTable<Article> {
        Article::dispatch_table()
    }
}

/// CML-style `<molecules><molecule>...</molecule></molecules>` collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoleculeSchema;
impl Schema for MoleculeSchema {
    type Record = Molecule;
    type Report = MoleculeReport;

    fn dispatch_table() -> &'static DispatchTable<Molecule> {
        Molecule::dispatch_table()
    }
}
