use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodemodError {
    #[error("failed to parse {filename}: {message}")]
    Parse { filename: String, message: String },

    /// A destructuring pattern binds a key that must be renamed; the binding
    /// cannot be rewritten without renaming every use of it.
    #[error("{message}")]
    UntraceableObjectKey { filename: String, message: String },

    #[error("failed to print {filename}: {source}")]
    Emit {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid codemod config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid package pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl CodemodError {
    pub fn filename(&self) -> Option<&str> {
        match self {
            CodemodError::Parse { filename, .. }
            | CodemodError::UntraceableObjectKey { filename, .. }
            | CodemodError::Emit { filename, .. } => Some(filename),
            CodemodError::Config(_) | CodemodError::Pattern(_) => None,
        }
    }
}
