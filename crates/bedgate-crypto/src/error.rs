use std::path::PathBuf;
use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

/// Coarse classification of a [`CryptoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Not this protocol, or structurally broken data
    Format,
    /// Header present but declaring another protocol version
    UnsupportedVersion,
    /// Tampered data or a key mismatch
    Cryptographic,
    /// Missing, corrupt or unusable key material
    Key,
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("unsupported data version: expected {expected}, got {received}")]
    UnsupportedVersion { expected: i32, received: i32 },

    #[error(
        "the {codec} data codec expects {expected} sections, got {actual}. Is the correct data codec chosen?"
    )]
    SectionCount {
        codec: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("malformed {codec} section: {reason}")]
    MalformedSection { codec: &'static str, reason: String },

    #[error("malformed base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decryption failed: data was tampered with or the wrong key is used")]
    Authentication,

    #[error("the given signature is not valid")]
    InvalidSignature,

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("{0}")]
    MissingKey(&'static str),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("key file {}: {source}", path.display())]
    KeyIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("decoded data is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl CryptoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::InvalidFormat(_)
            | CryptoError::SectionCount { .. }
            | CryptoError::MalformedSection { .. }
            | CryptoError::Base64(_)
            | CryptoError::Utf8(_) => ErrorKind::Format,
            CryptoError::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            CryptoError::Authentication
            | CryptoError::InvalidSignature
            | CryptoError::Encryption(_) => ErrorKind::Cryptographic,
            CryptoError::MissingKey(_)
            | CryptoError::InvalidKey(_)
            | CryptoError::KeyGeneration(_)
            | CryptoError::KeyIo { .. } => ErrorKind::Key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(CryptoError::InvalidFormat("x".into()).kind(), ErrorKind::Format);
        assert_eq!(
            CryptoError::SectionCount {
                codec: "AES",
                expected: 2,
                actual: 3
            }
            .kind(),
            ErrorKind::Format
        );
        assert_eq!(
            CryptoError::UnsupportedVersion {
                expected: 2,
                received: 3
            }
            .kind(),
            ErrorKind::UnsupportedVersion
        );
        assert_eq!(
            CryptoError::MalformedSection {
                codec: "AES",
                reason: "short".into()
            }
            .kind(),
            ErrorKind::Format
        );
        assert_eq!(CryptoError::Authentication.kind(), ErrorKind::Cryptographic);
        assert_eq!(CryptoError::InvalidSignature.kind(), ErrorKind::Cryptographic);
        assert_eq!(CryptoError::MissingKey("no key").kind(), ErrorKind::Key);
    }

    #[test]
    fn test_version_message_carries_both_versions() {
        let msg = CryptoError::UnsupportedVersion {
            expected: 2,
            received: 1,
        }
        .to_string();
        assert!(msg.contains("expected 2"));
        assert!(msg.contains("got 1"));
    }
}
