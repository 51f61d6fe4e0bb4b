//! Program image loading
//!
//! A program image ("scroll") is a sequence of big-endian 32-bit platters.

use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors turning a file or byte buffer into a program
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read program image: {0}")]
    Io(#[from] io::Error),

    #[error("Program image is {len} bytes, which is not a whole number of platters")]
    Misaligned { len: usize },
}

/// Decode a program image into platters
pub fn words_from_bytes(bytes: &[u8]) -> Result<Vec<u32>, LoadError> {
    if bytes.len() % 4 != 0 {
        return Err(LoadError::Misaligned { len: bytes.len() });
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Read a program image from disk without decoding it
pub fn read_image(path: impl AsRef<Path>) -> Result<Vec<u8>, LoadError> {
    Ok(fs::read(path)?)
}

/// Read and decode a program image from disk
pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<u32>, LoadError> {
    words_from_bytes(&read_image(path)?)
}

/// Encode platters as a program image
pub fn bytes_from_words(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_be_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian() {
        let words = words_from_bytes(&[0x12, 0x34, 0x56, 0x78, 0, 0, 0, 1]).unwrap();
        assert_eq!(words, vec![0x1234_5678, 1]);
    }

    #[test]
    fn test_empty_image() {
        assert_eq!(words_from_bytes(&[]).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_misaligned() {
        assert!(matches!(
            words_from_bytes(&[1, 2, 3]),
            Err(LoadError::Misaligned { len: 3 })
        ));
    }

    #[test]
    fn test_bytes_from_words() {
        assert_eq!(bytes_from_words(&[0xD000_0048]), vec![0xD0, 0, 0, 0x48]);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_file("does/not/exist.um"),
            Err(LoadError::Io(_))
        ));
    }

    #[test]
    fn test_missing_file_read_image() {
        let err = read_image("/nonexistent/program.um").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
        assert!(err.to_string().starts_with("Failed to read program image"));
    }
}
