//! Error types for native module loading.

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Loader error types.
///
/// A missing symbol is not represented here: symbol lookups return a null
/// [`SymbolAddress`](crate::SymbolAddress) that the caller must check.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The platform loader could not locate or link the library.
    #[error("Failed to dynamically load library: {name} (error = {message})")]
    LoadFailure {
        /// Name passed to the platform loader.
        name: String,
        /// Diagnostic reported by the platform loader.
        message: String,
    },

    /// A symbol was requested from a module that has already been unloaded.
    #[error("Cannot resolve symbol `{symbol}`: library {name} has been unloaded")]
    UseAfterUnload {
        /// Name the module was loaded with.
        name: String,
        /// Symbol that was requested.
        symbol: String,
    },

    /// Every candidate for a library failed to load.
    #[error("No loadable candidate for library {name}: {}", attempts.join("; "))]
    NoCandidates {
        /// Requested library name.
        name: String,
        /// One failure message per candidate tried.
        attempts: Vec<String>,
    },

    /// Configuration could not be read or parsed.
    #[error("Invalid loader configuration: {0}")]
    Config(String),
}

impl LoaderError {
    /// Returns the library name this error refers to, if any.
    pub fn library_name(&self) -> Option<&str> {
        match self {
            LoaderError::LoadFailure { name, .. }
            | LoaderError::UseAfterUnload { name, .. }
            | LoaderError::NoCandidates { name, .. } => Some(name),
            LoaderError::Config(_) => None,
        }
    }
}
