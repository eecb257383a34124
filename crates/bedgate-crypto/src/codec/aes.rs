//! AES-128-GCM data codec
//!
//! ```text
//! section 0: [12 bytes: random nonce]
//! section 1: [N bytes: ciphertext][16 bytes: GCM tag]
//! ```
//! No associated data. The nonce comes fresh from a CSPRNG for every message.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes128Gcm, Nonce,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::{CryptoRng, RngCore};
use std::path::Path;
use zeroize::Zeroize;

use crate::codec::into_pair;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{self, KeyCodec, KeyProducer, SYMMETRIC_KEY_FILE};

pub const KEY_SIZE: usize = 16;
pub const NONCE_SIZE: usize = 12;
pub const TAG_SIZE: usize = 16;

const CODEC_NAME: &str = "AES";

/// A 128-bit AES key. Zeroized on drop.
#[derive(Clone)]
pub struct AesKey {
    bytes: [u8; KEY_SIZE],
}

impl AesKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidKey(format!(
                "AES key must be {KEY_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for AesKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for AesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AesKeyProducer;

impl KeyProducer for AesKeyProducer {
    type Key = AesKey;

    fn produce(&self) -> CryptoResult<AesKey> {
        let mut bytes = [0u8; KEY_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Ok(AesKey::from_bytes(bytes))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AesKeyCodec;

impl AesKeyCodec {
    /// Accepts base64 text (the current format) or the raw 16 key bytes.
    pub fn decode(&self, bytes: &[u8]) -> CryptoResult<AesKey> {
        if let Ok(decoded) = STANDARD.decode(bytes.trim_ascii()) {
            if decoded.len() == KEY_SIZE {
                return AesKey::from_slice(&decoded);
            }
        }
        if bytes.len() == KEY_SIZE {
            tracing::debug!("AES key is not base64 encoded, using raw bytes");
            return AesKey::from_slice(bytes);
        }
        Err(CryptoError::InvalidKey(format!(
            "expected a base64 encoded {KEY_SIZE}-byte AES key ({} bytes given)",
            bytes.len()
        )))
    }

    pub fn encode(&self, key: &AesKey) -> Vec<u8> {
        keys::encode_key_text(key.as_bytes())
    }
}

impl KeyCodec for AesKeyCodec {
    type Key = AesKey;

    fn key_files(&self) -> &'static [&'static str] {
        &[SYMMETRIC_KEY_FILE]
    }

    fn decode_dir(&self, dir: &Path) -> CryptoResult<AesKey> {
        let path = dir.join(SYMMETRIC_KEY_FILE);
        match keys::read_key_file(&path)? {
            Some(bytes) => self.decode(&bytes),
            None => Err(CryptoError::KeyIo {
                path,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "key file not found"),
            }),
        }
    }

    fn encode_dir(&self, key: &AesKey, dir: &Path) -> CryptoResult<()> {
        keys::write_key_file(&dir.join(SYMMETRIC_KEY_FILE), &self.encode(key))
    }
}

#[derive(Clone)]
pub struct AesDataCodec {
    cipher: Aes128Gcm,
}

impl AesDataCodec {
    pub fn new(key: AesKey) -> Self {
        Self {
            cipher: Aes128Gcm::new(key.as_bytes().into()),
        }
    }

    pub fn encode_with_rng<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        data: &[u8],
    ) -> CryptoResult<Vec<Vec<u8>>> {
        let mut nonce = [0u8; NONCE_SIZE];
        rng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), data)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        Ok(vec![nonce.to_vec(), ciphertext])
    }

    pub fn decode(&self, sections: Vec<Vec<u8>>) -> CryptoResult<Vec<u8>> {
        let (nonce, ciphertext) = into_pair(CODEC_NAME, sections)?;
        if nonce.len() != NONCE_SIZE {
            return Err(CryptoError::MalformedSection {
                codec: CODEC_NAME,
                reason: format!("nonce must be {NONCE_SIZE} bytes, got {}", nonce.len()),
            });
        }
        if ciphertext.len() < TAG_SIZE {
            return Err(CryptoError::MalformedSection {
                codec: CODEC_NAME,
                reason: format!(
                    "ciphertext too short: {} bytes (minimum {TAG_SIZE})",
                    ciphertext.len()
                ),
            });
        }

        self.cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_slice())
            .map_err(|_| CryptoError::Authentication)
    }
}

impl std::fmt::Debug for AesDataCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesDataCodec").finish_non_exhaustive()
    }
}
