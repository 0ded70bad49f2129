use depthcloud_core::SchemaMismatch;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PcdError>;

/// Everything that can go wrong while encoding or decoding a PCD file.
#[derive(Error, Debug)]
pub enum PcdError {
    /// The file could not be opened, created, read, written or renamed into place.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The header or a body token could not be understood.
    #[error("invalid PCD {section}: {message} (line {line:?})")]
    Format {
        /// Header keyword, or `"data"` for body tokens.
        section: String,
        message: String,
        /// The offending line, trimmed.
        line: String,
    },

    /// The cloud handed to the encoder disagrees with its own schema.
    #[error("point cloud does not match its schema: {0}")]
    Schema(#[from] SchemaMismatch),

    /// The body ended before the declared number of points.
    #[error("PCD body truncated: expected {expected} {unit}, found {found}")]
    TruncatedData {
        expected: u64,
        found: u64,
        /// `"points"` for ascii bodies, `"bytes"` for binary ones.
        unit: &'static str,
    },
}

impl PcdError {
    pub(crate) fn format(section: &str, message: impl Into<String>, line: &str) -> Self {
        PcdError::Format {
            section: section.to_string(),
            message: message.into(),
            line: line.trim().to_string(),
        }
    }
}
