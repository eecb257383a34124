//! Data codecs: turn a plaintext into sections and back.
//!
//! The active codec is picked once from configuration and fixed for the
//! process lifetime; there is no per-message negotiation.

pub mod aes;
pub mod ed25519;
pub mod rsa;

use rand::{CryptoRng, RngCore};

use bedgate_core::CodecKind;

use crate::error::{CryptoError, CryptoResult};
use crate::keys::KeyMaterial;

use self::aes::AesDataCodec;
use self::ed25519::Ed25519DataCodec;
use self::rsa::RsaDataCodec;

#[derive(Debug, Clone)]
pub enum DataCodec {
    Aes(AesDataCodec),
    Ed25519(Ed25519DataCodec),
    Rsa(RsaDataCodec),
}

impl DataCodec {
    /// Build the codec matching the given key material.
    ///
    /// Fails with [`CryptoError::InvalidKey`] for a key pair with neither half.
    pub fn new(material: KeyMaterial) -> CryptoResult<Self> {
        Ok(match material {
            KeyMaterial::Aes(key) => DataCodec::Aes(AesDataCodec::new(key)),
            KeyMaterial::Ed25519(pair) => DataCodec::Ed25519(Ed25519DataCodec::new(pair)?),
            KeyMaterial::Rsa(pair) => DataCodec::Rsa(RsaDataCodec::new(pair)?),
        })
    }

    pub fn kind(&self) -> CodecKind {
        match self {
            DataCodec::Aes(_) => CodecKind::Aes,
            DataCodec::Ed25519(_) => CodecKind::Ed25519,
            DataCodec::Rsa(_) => CodecKind::Rsa,
        }
    }

    /// Encode `data` into sections using the thread-local CSPRNG.
    pub fn encode(&self, data: &[u8]) -> CryptoResult<Vec<Vec<u8>>> {
        self.encode_with_rng(&mut rand::thread_rng(), data)
    }

    /// Encode `data` into sections, drawing any randomness from `rng`.
    ///
    /// Only AES consumes randomness (the nonce); both signature schemes are
    /// deterministic.
    pub fn encode_with_rng<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        data: &[u8],
    ) -> CryptoResult<Vec<Vec<u8>>> {
        match self {
            DataCodec::Aes(codec) => codec.encode_with_rng(rng, data),
            DataCodec::Ed25519(codec) => codec.encode(data),
            DataCodec::Rsa(codec) => codec.encode(data),
        }
    }

    /// Recover the plaintext from sections, authenticating it on the way.
    pub fn decode(&self, sections: Vec<Vec<u8>>) -> CryptoResult<Vec<u8>> {
        match self {
            DataCodec::Aes(codec) => codec.decode(sections),
            DataCodec::Ed25519(codec) => codec.decode(sections),
            DataCodec::Rsa(codec) => codec.decode(sections),
        }
    }
}

/// Split a two-section message into its parts. Every codec uses two
/// sections; anything else means the peer picked another codec.
pub(crate) fn into_pair(
    codec: &'static str,
    sections: Vec<Vec<u8>>,
) -> CryptoResult<(Vec<u8>, Vec<u8>)> {
    let [first, second]: [Vec<u8>; 2] =
        sections
            .try_into()
            .map_err(|rejected: Vec<Vec<u8>>| CryptoError::SectionCount {
                codec,
                expected: 2,
                actual: rejected.len(),
            })?;
    Ok((first, second))
}
