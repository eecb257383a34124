//! RSA data codec: plaintext in the clear, PKCS#1 v1.5 SHA-256 signature.
//!
//! ```text
//! section 0: [N bytes: plaintext]
//! section 1: [modulus-size bytes: signature over section 0]
//! ```

use ::rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use ::rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use ::rsa::signature::{SignatureEncoding, Signer, Verifier};
use ::rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use std::path::Path;

use crate::codec::into_pair;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{self, KeyCodec, KeyHalfCodec, KeyPair, KeyProducer};

const CODEC_NAME: &str = "RSA";

pub const DEFAULT_KEY_BITS: usize = 2048;

pub type RsaKeyPair = KeyPair<RsaPrivateKey, RsaPublicKey>;

#[derive(Debug, Clone, Copy)]
pub struct RsaKeyProducer {
    bits: usize,
}

impl RsaKeyProducer {
    pub fn with_bits(bits: usize) -> Self {
        Self { bits }
    }
}

impl Default for RsaKeyProducer {
    fn default() -> Self {
        Self {
            bits: DEFAULT_KEY_BITS,
        }
    }
}

impl KeyProducer for RsaKeyProducer {
    type Key = RsaKeyPair;

    fn produce(&self) -> CryptoResult<RsaKeyPair> {
        let private = RsaPrivateKey::new(&mut rand::rngs::OsRng, self.bits)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        let public = private.to_public_key();
        Ok(KeyPair::new(Some(private), Some(public)))
    }
}

/// PKCS#8 (private) and SubjectPublicKeyInfo (public) DER, base64 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaKeyCodec;

impl KeyHalfCodec for RsaKeyCodec {
    type Private = RsaPrivateKey;
    type Public = RsaPublicKey;

    fn decode_private(&self, bytes: &[u8]) -> CryptoResult<RsaPrivateKey> {
        RsaPrivateKey::from_pkcs8_der(&keys::decode_key_text(bytes))
            .map_err(|e| CryptoError::InvalidKey(format!("RSA private key: {e}")))
    }

    fn decode_public(&self, bytes: &[u8]) -> CryptoResult<RsaPublicKey> {
        RsaPublicKey::from_public_key_der(&keys::decode_key_text(bytes))
            .map_err(|e| CryptoError::InvalidKey(format!("RSA public key: {e}")))
    }

    fn encode_private(&self, key: &RsaPrivateKey) -> CryptoResult<Vec<u8>> {
        let document = key
            .to_pkcs8_der()
            .map_err(|e| CryptoError::InvalidKey(format!("RSA private key: {e}")))?;
        Ok(keys::encode_key_text(document.as_bytes()))
    }

    fn encode_public(&self, key: &RsaPublicKey) -> CryptoResult<Vec<u8>> {
        let document = key
            .to_public_key_der()
            .map_err(|e| CryptoError::InvalidKey(format!("RSA public key: {e}")))?;
        Ok(keys::encode_key_text(document.as_bytes()))
    }
}

impl KeyCodec for RsaKeyCodec {
    type Key = RsaKeyPair;

    fn key_files(&self) -> &'static [&'static str] {
        &[keys::PRIVATE_KEY_FILE, keys::PUBLIC_KEY_FILE]
    }

    fn decode_dir(&self, dir: &Path) -> CryptoResult<RsaKeyPair> {
        keys::decode_pair_dir(self, dir)
    }

    fn encode_dir(&self, key: &RsaKeyPair, dir: &Path) -> CryptoResult<()> {
        keys::encode_pair_dir(self, key, dir)
    }
}

#[derive(Clone)]
pub struct RsaDataCodec {
    signing: Option<SigningKey<Sha256>>,
    verifying: Option<VerifyingKey<Sha256>>,
}

impl RsaDataCodec {
    pub fn new(pair: RsaKeyPair) -> CryptoResult<Self> {
        if pair.is_empty() {
            return Err(CryptoError::InvalidKey(
                "Neither a public nor a private key has been provided. Make sure you copied a key."
                    .into(),
            ));
        }
        Ok(Self {
            signing: pair.private.map(SigningKey::<Sha256>::new),
            verifying: pair.public.map(VerifyingKey::<Sha256>::new),
        })
    }

    pub fn encode(&self, data: &[u8]) -> CryptoResult<Vec<Vec<u8>>> {
        let signing = self
            .signing
            .as_ref()
            .ok_or(CryptoError::MissingKey("cannot sign data without a private key"))?;
        let signature = signing
            .try_sign(data)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;
        Ok(vec![data.to_vec(), signature.to_vec()])
    }

    pub fn decode(&self, sections: Vec<Vec<u8>>) -> CryptoResult<Vec<u8>> {
        let verifying = self
            .verifying
            .as_ref()
            .ok_or(CryptoError::MissingKey("cannot verify data without a public key"))?;
        let (data, signature) = into_pair(CODEC_NAME, sections)?;

        let signature =
            Signature::try_from(signature.as_slice()).map_err(|_| CryptoError::InvalidSignature)?;
        verifying
            .verify(&data, &signature)
            .map_err(|_| CryptoError::InvalidSignature)?;
        Ok(data)
    }
}

impl std::fmt::Debug for RsaDataCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaDataCodec")
            .field("can_sign", &self.signing.is_some())
            .field("can_verify", &self.verifying.is_some())
            .finish()
    }
}
