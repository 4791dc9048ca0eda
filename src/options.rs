use std::path::PathBuf;

/// Settings for one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Run the grammar checks in [`crate::validate::Validation`].
    pub validate: bool,

    /// Where the document came from; attached to every error.
    pub path: Option<PathBuf>,
}
impl ParseOptions {
    /// Default options: no validation, no path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable grammar checks.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Set the path reported in errors.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}
