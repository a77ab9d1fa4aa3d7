//! Digest functions that place keys and virtual nodes on the ring.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::ParseDigestError;

/// Maps a byte string to a position on the 32-bit ring.
///
/// A digest must be pure: the same input yields the same output on every
/// call, and ideally in every process, so independently built rings agree.
/// The ring trusts this contract. A digest that panics or is not
/// deterministic leaves placement undefined.
pub trait Digest: Send + Sync {
    /// Hash `data` to a ring position.
    fn digest(&self, data: &[u8]) -> u32;
}

impl<D: Digest + ?Sized> Digest for &D {
    fn digest(&self, data: &[u8]) -> u32 {
        (**self).digest(data)
    }
}

impl<D: Digest + ?Sized> Digest for Box<D> {
    fn digest(&self, data: &[u8]) -> u32 {
        (**self).digest(data)
    }
}

impl<D: Digest + ?Sized> Digest for Arc<D> {
    fn digest(&self, data: &[u8]) -> u32 {
        (**self).digest(data)
    }
}

/// IEEE CRC32, the default digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc32;

impl Digest for Crc32 {
    fn digest(&self, data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }
}

/// BLAKE3, truncated to its first four bytes (little endian).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake3;

impl Digest for Blake3 {
    fn digest(&self, data: &[u8]) -> u32 {
        let hash = blake3::hash(data);
        let b = hash.as_bytes();
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }
}

/// A digest backed by a plain function or closure. Built by [`digest_fn`].
#[derive(Clone, Copy)]
pub struct FnDigest<F>(F);

impl<F> fmt::Debug for FnDigest<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnDigest")
    }
}

impl<F> Digest for FnDigest<F>
where
    F: Fn(&[u8]) -> u32 + Send + Sync,
{
    fn digest(&self, data: &[u8]) -> u32 {
        (self.0)(data)
    }
}

/// Use a function as a digest.
///
/// Handy for tests that want predictable placement, e.g. a digest that
/// parses its input as a decimal number.
pub fn digest_fn<F>(f: F) -> FnDigest<F>
where
    F: Fn(&[u8]) -> u32 + Send + Sync,
{
    FnDigest(f)
}

/// A built-in digest chosen at runtime (config files, command-line flags).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestKind {
    /// See [`Crc32`].
    #[default]
    Crc32,
    /// See [`Blake3`].
    Blake3,
}

impl DigestKind {
    /// The lowercase name used in config files.
    pub fn name(self) -> &'static str {
        match self {
            DigestKind::Crc32 => "crc32",
            DigestKind::Blake3 => "blake3",
        }
    }
}

impl Digest for DigestKind {
    fn digest(&self, data: &[u8]) -> u32 {
        match self {
            DigestKind::Crc32 => Crc32.digest(data),
            DigestKind::Blake3 => Blake3.digest(data),
        }
    }
}

impl fmt::Display for DigestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestKind {
    type Err = ParseDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crc32" => Ok(DigestKind::Crc32),
            "blake3" => Ok(DigestKind::Blake3),
            _ => Err(ParseDigestError {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_matches_ieee_check_value() {
        assert_eq!(Crc32.digest(b"123456789"), 0xCBF4_3926);
        assert_eq!(Crc32.digest(b""), 0);
    }

    #[test]
    fn test_blake3_uses_leading_bytes() {
        let full = blake3::hash(b"node-a");
        let b = full.as_bytes();
        let expected = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        assert_eq!(Blake3.digest(b"node-a"), expected);
        assert_ne!(Blake3.digest(b"node-a"), Blake3.digest(b"node-b"));
    }

    #[test]
    fn test_fn_digest_calls_function() {
        let d = digest_fn(|data: &[u8]| data.len() as u32);
        assert_eq!(d.digest(b"abcd"), 4);
        assert_eq!(d.digest(b""), 0);
    }

    #[test]
    fn test_wrappers_delegate() {
        fn place<D: Digest>(d: D) -> u32 {
            d.digest(b"key")
        }

        let expected = Crc32.digest(b"key");
        let boxed: Box<dyn Digest> = Box::new(Crc32);
        let shared: Arc<dyn Digest> = Arc::new(Crc32);
        assert_eq!(place(boxed), expected);
        assert_eq!(place(shared), expected);
        assert_eq!(place(&Crc32), expected);
    }

    #[test]
    fn test_digest_kind_dispatch() {
        assert_eq!(DigestKind::Crc32.digest(b"k"), Crc32.digest(b"k"));
        assert_eq!(DigestKind::Blake3.digest(b"k"), Blake3.digest(b"k"));
        assert_eq!(DigestKind::default(), DigestKind::Crc32);
    }

    #[test]
    fn test_digest_kind_from_str() {
        assert_eq!("crc32".parse::<DigestKind>(), Ok(DigestKind::Crc32));
        assert_eq!(" BLAKE3 ".parse::<DigestKind>(), Ok(DigestKind::Blake3));

        let err = "md5".parse::<DigestKind>().unwrap_err();
        assert_eq!(err.name, "md5");
        assert_eq!(
            err.to_string(),
            "unknown digest `md5`, expected `crc32` or `blake3`"
        );
    }

    #[test]
    fn test_digest_kind_display_round_trips() {
        for kind in [DigestKind::Crc32, DigestKind::Blake3] {
            assert_eq!(kind.to_string().parse::<DigestKind>(), Ok(kind));
        }
    }
}
