//! Error types for ring configuration.

/// A digest name that does not match any built-in digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown digest `{name}`, expected `crc32` or `blake3`")]
pub struct ParseDigestError {
    /// The name that failed to parse.
    pub name: String,
}
