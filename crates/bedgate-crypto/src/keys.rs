//! Key material: generation, key files, startup bootstrap
//!
//! Key files hold standard (padded) base64 text:
//! ```text
//! AES      floodgate.key          base64(raw 16-byte key)      (raw bytes accepted)
//! Ed25519  floodgate-private.key  base64(PKCS#8 v1 DER)
//!          floodgate-public.der   base64(SubjectPublicKeyInfo DER)
//! RSA      floodgate-private.key  base64(PKCS#8 DER)
//!          floodgate-public.der   base64(SubjectPublicKeyInfo DER)
//! ```
//!
//! Keys are loaded once at startup. Existing key files are never overwritten
//! here; regenerating keys is an explicit operator action.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

use bedgate_core::CodecKind;

use crate::codec::aes::{AesKey, AesKeyCodec, AesKeyProducer};
use crate::codec::ed25519::{Ed25519KeyCodec, Ed25519KeyPair, Ed25519KeyProducer};
use crate::codec::rsa::{RsaKeyCodec, RsaKeyPair, RsaKeyProducer};
use crate::error::{CryptoError, CryptoResult};

/// File name of the symmetric key
pub const SYMMETRIC_KEY_FILE: &str = "floodgate.key";

/// File name of the private half of a key pair
pub const PRIVATE_KEY_FILE: &str = "floodgate-private.key";

/// File name of the public half of a key pair
pub const PUBLIC_KEY_FILE: &str = "floodgate-public.der";

/// Generates fresh key material. No I/O.
pub trait KeyProducer {
    type Key;

    fn produce(&self) -> CryptoResult<Self::Key>;
}

/// Reads and writes key material to a key directory.
pub trait KeyCodec {
    type Key;

    /// Files this codec reads and writes, relative to the key directory.
    fn key_files(&self) -> &'static [&'static str];

    fn decode_dir(&self, dir: &Path) -> CryptoResult<Self::Key>;

    fn encode_dir(&self, key: &Self::Key, dir: &Path) -> CryptoResult<()>;
}

/// Byte-level codec for one half of an asymmetric key pair.
pub trait KeyHalfCodec {
    type Private;
    type Public;

    fn decode_private(&self, bytes: &[u8]) -> CryptoResult<Self::Private>;

    fn decode_public(&self, bytes: &[u8]) -> CryptoResult<Self::Public>;

    fn encode_private(&self, key: &Self::Private) -> CryptoResult<Vec<u8>>;

    fn encode_public(&self, key: &Self::Public) -> CryptoResult<Vec<u8>>;
}

/// An asymmetric key pair where either half may be absent.
///
/// A server that only verifies needs nothing but the public key; a proxy that
/// only signs needs nothing but the private key.
#[derive(Clone)]
pub struct KeyPair<S, P> {
    pub private: Option<S>,
    pub public: Option<P>,
}

impl<S, P> KeyPair<S, P> {
    pub fn new(private: Option<S>, public: Option<P>) -> Self {
        Self { private, public }
    }

    pub fn is_empty(&self) -> bool {
        self.private.is_none() && self.public.is_none()
    }
}

impl<S, P> std::fmt::Debug for KeyPair<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("private", &self.private.as_ref().map(|_| "[REDACTED]"))
            .field("public", &self.public.is_some())
            .finish()
    }
}

/// Key material for any of the supported codecs.
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    Aes(AesKey),
    Ed25519(Ed25519KeyPair),
    Rsa(RsaKeyPair),
}

impl KeyMaterial {
    pub fn kind(&self) -> CodecKind {
        match self {
            KeyMaterial::Aes(_) => CodecKind::Aes,
            KeyMaterial::Ed25519(_) => CodecKind::Ed25519,
            KeyMaterial::Rsa(_) => CodecKind::Rsa,
        }
    }
}

/// Generate fresh key material for `kind`.
pub fn produce(kind: CodecKind) -> CryptoResult<KeyMaterial> {
    Ok(match kind {
        CodecKind::Aes => KeyMaterial::Aes(AesKeyProducer.produce()?),
        CodecKind::Ed25519 => KeyMaterial::Ed25519(Ed25519KeyProducer.produce()?),
        CodecKind::Rsa => KeyMaterial::Rsa(RsaKeyProducer::default().produce()?),
    })
}

/// The key files used by `kind`.
pub fn key_files(kind: CodecKind) -> &'static [&'static str] {
    match kind {
        CodecKind::Aes => AesKeyCodec.key_files(),
        CodecKind::Ed25519 => Ed25519KeyCodec.key_files(),
        CodecKind::Rsa => RsaKeyCodec.key_files(),
    }
}

/// Read the key material for `kind` from `dir`.
pub fn decode_dir(kind: CodecKind, dir: &Path) -> CryptoResult<KeyMaterial> {
    Ok(match kind {
        CodecKind::Aes => KeyMaterial::Aes(AesKeyCodec.decode_dir(dir)?),
        CodecKind::Ed25519 => KeyMaterial::Ed25519(Ed25519KeyCodec.decode_dir(dir)?),
        CodecKind::Rsa => KeyMaterial::Rsa(RsaKeyCodec.decode_dir(dir)?),
    })
}

/// Write `material` into `dir`, overwriting existing files.
pub fn encode_dir(material: &KeyMaterial, dir: &Path) -> CryptoResult<()> {
    match material {
        KeyMaterial::Aes(key) => AesKeyCodec.encode_dir(key, dir),
        KeyMaterial::Ed25519(pair) => Ed25519KeyCodec.encode_dir(pair, dir),
        KeyMaterial::Rsa(pair) => RsaKeyCodec.encode_dir(pair, dir),
    }
}

/// Startup key bootstrap.
///
/// When none of the key files for `kind` exist and `generate_missing` is set,
/// fresh keys are generated and written. Otherwise whatever is present is
/// decoded; missing files are then a fatal [`CryptoError::KeyIo`].
pub fn load_or_generate(
    kind: CodecKind,
    dir: &Path,
    generate_missing: bool,
) -> CryptoResult<KeyMaterial> {
    let any_present = key_files(kind).iter().any(|name| dir.join(name).exists());

    if !any_present && generate_missing {
        std::fs::create_dir_all(dir).map_err(|source| CryptoError::KeyIo {
            path: dir.to_path_buf(),
            source,
        })?;
        let material = produce(kind)?;
        encode_dir(&material, dir)?;
        tracing::info!(codec = %kind, dir = %dir.display(), "generated new key material");
        return Ok(material);
    }

    let material = decode_dir(kind, dir)?;
    tracing::debug!(codec = %kind, dir = %dir.display(), "loaded key material");
    Ok(material)
}

/// Decode key file text. Files written before keys were base64 encoded hold
/// the raw key bytes; those are returned unchanged.
pub(crate) fn decode_key_text(bytes: &[u8]) -> Vec<u8> {
    match STANDARD.decode(bytes.trim_ascii()) {
        Ok(decoded) => decoded,
        Err(_) => {
            tracing::debug!("key is not base64 encoded, using raw bytes");
            bytes.to_vec()
        }
    }
}

pub(crate) fn encode_key_text(raw: &[u8]) -> Vec<u8> {
    STANDARD.encode(raw).into_bytes()
}

pub(crate) fn read_key_file(path: &Path) -> CryptoResult<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(CryptoError::KeyIo {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub(crate) fn write_key_file(path: &Path, contents: &[u8]) -> CryptoResult<()> {
    std::fs::write(path, contents).map_err(|source| CryptoError::KeyIo {
        path: path.to_path_buf(),
        source,
    })
}

/// Read both halves of a key pair. Either file may be missing, but not both.
pub(crate) fn decode_pair_dir<C: KeyHalfCodec>(
    codec: &C,
    dir: &Path,
) -> CryptoResult<KeyPair<C::Private, C::Public>> {
    let private = read_key_file(&dir.join(PRIVATE_KEY_FILE))?
        .map(|bytes| codec.decode_private(&bytes))
        .transpose()?;
    let public = read_key_file(&dir.join(PUBLIC_KEY_FILE))?
        .map(|bytes| codec.decode_public(&bytes))
        .transpose()?;

    let pair = KeyPair::new(private, public);
    if pair.is_empty() {
        return Err(CryptoError::KeyIo {
            path: dir.join(PUBLIC_KEY_FILE),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "neither a public nor a private key file exists",
            ),
        });
    }
    Ok(pair)
}

/// Write whichever halves of the pair are present.
pub(crate) fn encode_pair_dir<C: KeyHalfCodec>(
    codec: &C,
    pair: &KeyPair<C::Private, C::Public>,
    dir: &Path,
) -> CryptoResult<()> {
    if let Some(private) = &pair.private {
        write_key_file(&dir.join(PRIVATE_KEY_FILE), &codec.encode_private(private)?)?;
    }
    if let Some(public) = &pair.public {
        write_key_file(&dir.join(PUBLIC_KEY_FILE), &codec.encode_public(public)?)?;
    }
    Ok(())
}
