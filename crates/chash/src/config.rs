//! Ring options as they appear in config files.

use serde::Deserialize;

use crate::digest::DigestKind;
use crate::ring::{DEFAULT_REPLICAS, Ring};

/// Construction options for a [`Ring`].
///
/// Both fields are optional. Missing or zero `replicas` falls back to
/// [`DEFAULT_REPLICAS`]; a missing `digest` selects CRC32.
///
/// ```toml
/// replicas = 100
/// digest = "blake3"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RingOptions {
    /// Virtual nodes per added node.
    pub replicas: Option<usize>,
    /// Digest used for placement and lookup.
    pub digest: DigestKind,
}

impl RingOptions {
    /// Effective replica count (configured value or [`DEFAULT_REPLICAS`]).
    pub fn replicas(&self) -> usize {
        match self.replicas {
            Some(n) if n > 0 => n,
            _ => DEFAULT_REPLICAS,
        }
    }

    /// Build an empty ring with these options.
    pub fn build(&self) -> Ring<DigestKind> {
        Ring::with_digest(self.replicas(), self.digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_options() {
        let options: RingOptions = toml::from_str(
            r#"
replicas = 100
digest = "blake3"
"#,
        )
        .unwrap();
        assert_eq!(options.replicas, Some(100));
        assert_eq!(options.digest, DigestKind::Blake3);
        assert_eq!(options.build().replicas(), 100);
    }

    #[test]
    fn test_parse_empty_options() {
        let options: RingOptions = toml::from_str("").unwrap();
        assert_eq!(options, RingOptions::default());
        assert_eq!(options.replicas(), DEFAULT_REPLICAS);
        assert_eq!(options.digest, DigestKind::Crc32);
    }

    #[test]
    fn test_zero_replicas_falls_back() {
        let options = RingOptions {
            replicas: Some(0),
            digest: DigestKind::Crc32,
        };
        assert_eq!(options.replicas(), DEFAULT_REPLICAS);
    }

    #[test]
    fn test_unknown_digest_rejected() {
        let result: Result<RingOptions, _> = toml::from_str(r#"digest = "md5""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_blake3_options_build_working_ring() {
        let options = RingOptions {
            replicas: Some(20),
            digest: DigestKind::Blake3,
        };
        let mut ring = options.build();
        ring.add_nodes(["a", "b", "c"]);

        let mut direct = Ring::with_digest(20, crate::digest::Blake3);
        direct.add_nodes(["a", "b", "c"]);

        assert_eq!(ring.len(), 60);
        for i in 0..500 {
            let key = format!("key-{i}");
            let owner = ring.get_node(&key).unwrap();
            assert!(["a", "b", "c"].contains(&owner));
            assert_eq!(Some(owner), direct.get_node(&key));
        }
    }

    #[test]
    fn test_built_ring_matches_direct_construction() {
        let mut from_options = RingOptions::default().build();
        let mut direct = Ring::new();
        from_options.add_nodes(["a", "b", "c"]);
        direct.add_nodes(["a", "b", "c"]);

        for i in 0..500 {
            let key = format!("key-{i}");
            assert_eq!(from_options.get_node(&key), direct.get_node(&key));
        }
    }
}
