//! Error taxonomy for the package lifecycle engine.
//!
//! Schema problems are collected into `ValidationReport`s and only become
//! errors in strict mode; everything else here is fatal to a single
//! puzzle, trial or request, never to the process.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of schema violation found by the integrity validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required package file is absent.
    MissingArtifact,
    /// A required package file exists but has no content.
    EmptyArtifact,
    /// A metadata record omits a required field.
    MissingField,
    /// A metadata field is present but does not parse.
    MalformedField,
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MissingArtifact => "missing artifact",
            Self::EmptyArtifact => "empty artifact",
            Self::MissingField => "missing field",
            Self::MalformedField => "malformed field",
        };
        f.write_str(s)
    }
}

/// One `(field, kind)` entry of a `ValidationReport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(field: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: `{}`", self.kind, self.field)
    }
}

/// Stage of a plugin invocation, used to attribute runtime faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Generate,
    SolveDecrypt,
    SolveUnveil,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Generate => "generation",
            Self::SolveDecrypt => "decrypt solve",
            Self::SolveUnveil => "unveil solve",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum HiveError {
    /// Strict-mode validation failure (first violation encountered).
    #[error("package integrity: {0}")]
    Integrity(Violation),

    /// The package has no registered plugin implementations.
    #[error("puzzle `{puzzle}` has no registered capability bindings (id {id})")]
    MissingCapability { puzzle: String, id: u32 },

    /// Two generator runs with identical arguments disagreed.
    #[error("generator is not deterministic for instance key `{key}`")]
    NonDeterminism { key: String },

    /// Two distinct instance keys produced identical output; the forge
    /// likely ignores its key.
    #[error("generator output for key `{key}` duplicates an earlier trial")]
    KeyCollision { key: String },

    /// A generator or solver failed during a trial or instantiation.
    #[error("{stage} failed for instance key `{key}`: {source}")]
    RuntimeFault {
        key: String,
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },

    /// Unknown theme, puzzle or archive.
    #[error("{kind} `{name}` not found")]
    NotFound { kind: &'static str, name: String },

    /// Reload requested before the caller's cooldown elapsed.
    #[error("reload throttled, retry in {retry_after_secs}s")]
    Throttled { retry_after_secs: u64 },

    /// A generator was asked for zero lines.
    #[error("line count must be positive")]
    InvalidLineCount,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

impl HiveError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HiveError>;
