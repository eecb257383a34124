use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The algorithm used to protect the handshake payload.
///
/// Resolved once at startup; every process that exchanges envelopes must
/// agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    /// AES-128-GCM, shared secret key
    #[default]
    Aes,
    /// Ed25519 signatures, key pair
    Ed25519,
    /// RSA PKCS#1 v1.5 / SHA-256 signatures, key pair
    Rsa,
}

impl CodecKind {
    pub const ALL: [CodecKind; 3] = [CodecKind::Aes, CodecKind::Ed25519, CodecKind::Rsa];

    pub fn name(self) -> &'static str {
        match self {
            CodecKind::Aes => "AES",
            CodecKind::Ed25519 => "Ed25519",
            CodecKind::Rsa => "RSA",
        }
    }

    /// Look a codec up by name, ignoring case.
    pub fn by_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    pub fn is_asymmetric(self) -> bool {
        !matches!(self, CodecKind::Aes)
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodecKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::by_name(s).ok_or_else(|| format!("unknown codec '{s}' (expected aes, ed25519 or rsa)"))
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}
