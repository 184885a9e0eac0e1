//! Filename rules shared by the file store and the relay mirrors.
//!
//! Names arrive from the network and are joined onto a directory, so a name
//! must be exactly one normal path component.

use thiserror::Error;

/// Longest accepted name in bytes (common filesystem limit)
pub const MAX_NAME_BYTES: usize = 255;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("file name is empty")]
    Empty,

    #[error("file name longer than 255 bytes")]
    TooLong,

    #[error("file name must not be '.' or '..'")]
    DotEntry,

    #[error("file name contains a path separator or NUL byte")]
    IllegalCharacter,
}

/// Accept `name` only if it is a single path component that cannot escape the
/// directory it is joined onto.
pub fn validate_file_name(name: &str) -> Result<&str, NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.len() > MAX_NAME_BYTES {
        return Err(NameError::TooLong);
    }
    if name == "." || name == ".." {
        return Err(NameError::DotEntry);
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(NameError::IllegalCharacter);
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_accepted() {
        for name in ["a.txt", "report.pdf", ".hidden", "with space.bin", "ünïcødé.md", "a..b"] {
            assert_eq!(validate_file_name(name), Ok(name));
        }
    }

    #[test]
    fn test_traversal_rejected() {
        assert_eq!(validate_file_name(".."), Err(NameError::DotEntry));
        assert_eq!(validate_file_name("."), Err(NameError::DotEntry));
        assert_eq!(
            validate_file_name("../etc/passwd"),
            Err(NameError::IllegalCharacter)
        );
        assert_eq!(
            validate_file_name("..\\boot.ini"),
            Err(NameError::IllegalCharacter)
        );
        assert_eq!(
            validate_file_name("/abs"),
            Err(NameError::IllegalCharacter)
        );
    }

    #[test]
    fn test_empty_nul_and_long_rejected() {
        assert_eq!(validate_file_name(""), Err(NameError::Empty));
        assert_eq!(validate_file_name("a\0b"), Err(NameError::IllegalCharacter));
        assert_eq!(
            validate_file_name(&"x".repeat(MAX_NAME_BYTES + 1)),
            Err(NameError::TooLong)
        );
        assert!(validate_file_name(&"x".repeat(MAX_NAME_BYTES)).is_ok());
    }

    #[test]
    fn test_case_sensitive_names_are_distinct() {
        assert_ne!(
            validate_file_name("A.txt").unwrap(),
            validate_file_name("a.txt").unwrap()
        );
    }
}
