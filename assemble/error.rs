// ─────────────────────────────────────────────────────────────────────────────
//  snes-ide-build :: error
// ─────────────────────────────────────────────────────────────────────────────

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Download failed ({url}): {reason}")]
    Download { url: String, reason: String },

    #[error("Checksum mismatch for {url}\n  expected: {expected}\n  actual:   {actual}")]
    ChecksumMismatch { url: String, expected: String, actual: String },

    #[error("Failed to open ZIP: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive member escapes the output directory: {0}")]
    UnsafeMember(String),

    #[error("Invalid manifest {path}: {reason}")]
    Manifest { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BuildError>;
