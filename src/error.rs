use thiserror::Error;

/// Classifies suffix list loading errors for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixListErrorKind {
    /// File open/read failure
    FileError,
    /// The dataset contained no rules
    Empty,
    /// The process-wide list was already initialized
    AlreadyInstalled,
}

/// Redirect guard error types
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Unknown public suffix for host: {0}")]
    UnknownSuffix(String),

    #[error("Malformed redirect candidate: {0}")]
    MalformedCandidate(String),

    #[error("Disallowed redirect scheme: {0}")]
    DisallowedScheme(String),

    #[error("Redirect domain {candidate} does not match site domain {site}")]
    ForeignDomain { candidate: String, site: String },

    #[error("Suffix list error: {message}")]
    SuffixList {
        kind: SuffixListErrorKind,
        message: String,
    },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GuardError {
    pub(crate) fn suffix_list(kind: SuffixListErrorKind, message: impl Into<String>) -> Self {
        GuardError::SuffixList {
            kind,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GuardError>;
