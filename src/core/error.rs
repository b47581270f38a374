use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the entire builder backend.
/// Every module returns `Result<T, BuilderError>`.
#[derive(Debug, Error)]
pub enum BuilderError {
    // ── Validation ──────────────────────────────────────
    #[error("You must accept the EULA to build the server.")]
    EulaNotAccepted,

    #[error("Please select a game version.")]
    NoVersionChosen,

    #[error("Please select a loader.")]
    NoLoaderChosen,

    // ── Resolution ──────────────────────────────────────
    #[error("No server jar available for this version/loader combination.")]
    NoServerJar { loader: String, version: String },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("{algorithm} mismatch for {url}: expected {expected}, got {actual}")]
    HashMismatch {
        url: String,
        algorithm: &'static str,
        expected: String,
        actual: String,
    },

    // ── Archive ─────────────────────────────────────────
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("modrinth.index.json not found in .mrpack")]
    MissingPackIndex,

    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Cancellation ────────────────────────────────────
    #[error("build cancelled")]
    Cancelled,

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type BuilderResult<T> = Result<T, BuilderError>;

impl From<std::io::Error> for BuilderError {
    fn from(source: std::io::Error) -> Self {
        BuilderError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl BuilderError {
    /// Whether the error was produced by pre-flight validation, before any
    /// network call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BuilderError::EulaNotAccepted
                | BuilderError::NoVersionChosen
                | BuilderError::NoLoaderChosen
        )
    }
}
