use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BedgateError, BedgateResult};
use crate::types::{CodecKind, LogFormat};

/// Top-level configuration (loaded from bedgate.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BedgateConfig {
    pub crypto: CryptoConfig,
    pub handshake: HandshakeConfig,
    pub logging: LoggingConfig,
}

impl BedgateConfig {
    /// Load the configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> BedgateResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| BedgateError::Config(format!("parsing {}: {e}", path.display())))
    }
}

/// Envelope protection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Active data codec: "aes", "ed25519" or "rsa" (default: aes)
    pub codec: CodecKind,
    /// Directory holding the key file(s)
    pub key_dir: PathBuf,
    /// Generate fresh keys on startup when none exist (default: true)
    pub generate_missing_keys: bool,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            codec: CodecKind::Aes,
            key_dir: PathBuf::from("."),
            generate_missing_keys: true,
        }
    }
}

/// Handshake acceptance settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HandshakeConfig {
    /// Maximum age of a payload timestamp in milliseconds (default: 6000)
    pub timestamp_tolerance_ms: u64,
    /// Clock error allowed in both directions in milliseconds (default: 150)
    pub error_margin_ms: u64,
    /// Number of XUIDs remembered for replay detection
    pub replay_cache_capacity: u64,
    /// Reject payloads whose timestamp is outside the window (default: true)
    pub check_timestamps: bool,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            timestamp_tolerance_ms: 6000,
            error_margin_ms: 150,
            replay_cache_capacity: 10_000,
            check_timestamps: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[crypto]
codec = "ed25519"
key_dir = "/etc/bedgate/keys"
generate_missing_keys = false

[handshake]
timestamp_tolerance_ms = 10000
error_margin_ms = 300
replay_cache_capacity = 500
check_timestamps = false

[logging]
level = "debug"
format = "json"
"#;
        let config: BedgateConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.crypto.codec, CodecKind::Ed25519);
        assert_eq!(config.crypto.key_dir, PathBuf::from("/etc/bedgate/keys"));
        assert!(!config.crypto.generate_missing_keys);
        assert_eq!(config.handshake.timestamp_tolerance_ms, 10000);
        assert_eq!(config.handshake.error_margin_ms, 300);
        assert_eq!(config.handshake.replay_cache_capacity, 500);
        assert!(!config.handshake.check_timestamps);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_defaults() {
        let config: BedgateConfig = toml::from_str("").unwrap();

        assert_eq!(config.crypto.codec, CodecKind::Aes);
        assert_eq!(config.crypto.key_dir, PathBuf::from("."));
        assert!(config.crypto.generate_missing_keys);
        assert_eq!(config.handshake.timestamp_tolerance_ms, 6000);
        assert_eq!(config.handshake.error_margin_ms, 150);
        assert!(config.handshake.check_timestamps);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[crypto]
codec = "rsa"
"#;
        let config: BedgateConfig = toml::from_str(toml_str).unwrap();

        // Overridden
        assert_eq!(config.crypto.codec, CodecKind::Rsa);
        // Defaults
        assert!(config.crypto.generate_missing_keys);
        assert_eq!(config.handshake.error_margin_ms, 150);
    }

    #[test]
    fn test_unknown_codec_rejected() {
        let result: Result<BedgateConfig, _> = toml::from_str("[crypto]\ncodec = \"des\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = BedgateConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.crypto.codec, CodecKind::Aes);
    }

    #[test]
    fn test_load_invalid_file_is_config_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bedgate.toml");
        std::fs::write(&path, "[crypto\ncodec = ").unwrap();

        let err = BedgateConfig::load(&path).unwrap_err();
        assert!(matches!(err, BedgateError::Config(_)));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = BedgateConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: BedgateConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.crypto.codec, parsed.crypto.codec);
        assert_eq!(config.crypto.key_dir, parsed.crypto.key_dir);
        assert_eq!(
            config.handshake.timestamp_tolerance_ms,
            parsed.handshake.timestamp_tolerance_ms
        );
    }
}
