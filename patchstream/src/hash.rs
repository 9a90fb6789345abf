//! BLAKE2b-256 content hashing for file verification.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

/// BLAKE2b with a 32-byte digest, rendered as 64 lowercase hex characters.
pub type Blake2b256 = Blake2b<U32>;

/// Buffer size for reading files during hashing (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Stream BLAKE2b-256 over a reader.
///
/// Returns the lowercase hexadecimal digest of everything read.
pub fn hash_reader<R: Read>(reader: &mut R) -> std::io::Result<String> {
    let mut hasher = Blake2b256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Hash the contents of a file at `path`.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    hash_reader(&mut file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    // BLAKE2b-256 of the empty input.
    const EMPTY_DIGEST: &str =
        "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8";

    #[test]
    fn test_hash_empty_input() {
        let mut empty: &[u8] = &[];
        assert_eq!(hash_reader(&mut empty).unwrap(), EMPTY_DIGEST);
    }

    #[test]
    fn test_hash_is_lowercase_hex() {
        let mut data: &[u8] = b"some payload";
        let digest = hash_reader(&mut data).unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_hash_file_matches_reader() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blob.bin");

        let mut file = File::create(&path).unwrap();
        file.write_all(b"client data").unwrap();
        drop(file);

        let mut data: &[u8] = b"client data";
        assert_eq!(hash_file(&path).unwrap(), hash_reader(&mut data).unwrap());
    }

    #[test]
    fn test_hash_larger_than_buffer() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("large.bin");

        let data = vec![0x5au8; 200_000];
        std::fs::write(&path, &data).unwrap();

        let from_file = hash_file(&path).unwrap();
        let mut slice = data.as_slice();
        assert_eq!(from_file, hash_reader(&mut slice).unwrap());
    }

    #[test]
    fn test_hash_missing_file_errors() {
        assert!(hash_file(Path::new("/nonexistent/blob.bin")).is_err());
    }
}
