//! Local manifest codec.
//!
//! The persisted local manifest uses CBOR: self-describing, stable across
//! platforms, and tolerant of fields added in later releases. It shares no
//! bytes with the remote wire format.

use thiserror::Error;

use super::Manifest;

/// Errors from the local manifest codec.
#[derive(Debug, Error)]
pub enum LocalCodecError {
    #[error("failed to encode local manifest: {0}")]
    Encode(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("failed to decode local manifest: {0}")]
    Decode(#[from] ciborium::de::Error<std::io::Error>),
}

/// Encode a manifest for persistence.
pub fn encode(manifest: &Manifest) -> Result<Vec<u8>, LocalCodecError> {
    let mut buf = Vec::new();
    ciborium::into_writer(manifest, &mut buf)?;
    Ok(buf)
}

/// Decode a persisted manifest.
pub fn decode(data: &[u8]) -> Result<Manifest, LocalCodecError> {
    Ok(ciborium::from_reader(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::FileEntry;

    #[test]
    fn test_roundtrip() {
        let manifest = Manifest {
            entries: vec![
                FileEntry {
                    path: r"bin\client.exe".to_string(),
                    hash: "12".repeat(32),
                    last_modified: 1_650_000_000,
                },
                FileEntry {
                    path: "data/strings_ko.pak".to_string(),
                    hash: "34".repeat(32),
                    last_modified: 0,
                },
            ],
        };

        let encoded = encode(&manifest).unwrap();
        assert_eq!(decode(&encoded).unwrap(), manifest);
    }

    #[test]
    fn test_roundtrip_empty() {
        let manifest = Manifest::default();
        let encoded = encode(&manifest).unwrap();
        assert_eq!(decode(&encoded).unwrap(), manifest);
    }

    #[test]
    fn test_encoding_is_stable() {
        let manifest = Manifest {
            entries: vec![FileEntry {
                path: "a".to_string(),
                hash: "b".to_string(),
                last_modified: 7,
            }],
        };

        assert_eq!(encode(&manifest).unwrap(), encode(&manifest).unwrap());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(decode(b"not cbor at all \xff\xff").is_err());
    }

    #[test]
    fn test_differs_from_wire_format() {
        let manifest = Manifest {
            entries: vec![FileEntry {
                path: "a.dat".to_string(),
                hash: "cc".repeat(32),
                last_modified: 9,
            }],
        };

        assert_ne!(
            encode(&manifest).unwrap(),
            crate::manifest::wire::encode(&manifest)
        );
    }
}
