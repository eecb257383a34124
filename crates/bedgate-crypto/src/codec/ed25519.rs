//! Ed25519 data codec: the plaintext travels in the clear, signed.
//!
//! ```text
//! section 0: [N bytes: plaintext]
//! section 1: [64 bytes: Ed25519 signature over section 0]
//! ```

use ed25519_dalek::pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, KeypairBytes,
};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use std::path::Path;

use crate::codec::into_pair;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{self, KeyCodec, KeyHalfCodec, KeyPair, KeyProducer};

const CODEC_NAME: &str = "Ed25519";

pub type Ed25519KeyPair = KeyPair<SigningKey, VerifyingKey>;

#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519KeyProducer;

impl KeyProducer for Ed25519KeyProducer {
    type Key = Ed25519KeyPair;

    fn produce(&self) -> CryptoResult<Ed25519KeyPair> {
        let signing = SigningKey::generate(&mut rand::rngs::OsRng);
        let verifying = signing.verifying_key();
        Ok(KeyPair::new(Some(signing), Some(verifying)))
    }
}

/// PKCS#8 v1 (private) and SubjectPublicKeyInfo (public) DER, base64 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519KeyCodec;

impl KeyHalfCodec for Ed25519KeyCodec {
    type Private = SigningKey;
    type Public = VerifyingKey;

    fn decode_private(&self, bytes: &[u8]) -> CryptoResult<SigningKey> {
        SigningKey::from_pkcs8_der(&keys::decode_key_text(bytes))
            .map_err(|e| CryptoError::InvalidKey(format!("Ed25519 private key: {e}")))
    }

    fn decode_public(&self, bytes: &[u8]) -> CryptoResult<VerifyingKey> {
        VerifyingKey::from_public_key_der(&keys::decode_key_text(bytes))
            .map_err(|e| CryptoError::InvalidKey(format!("Ed25519 public key: {e}")))
    }

    fn encode_private(&self, key: &SigningKey) -> CryptoResult<Vec<u8>> {
        // v1 document without the embedded public key, as other Floodgate
        // implementations write it
        let document = KeypairBytes {
            secret_key: key.to_bytes(),
            public_key: None,
        }
        .to_pkcs8_der()
        .map_err(|e| CryptoError::InvalidKey(format!("Ed25519 private key: {e}")))?;
        Ok(keys::encode_key_text(document.as_bytes()))
    }

    fn encode_public(&self, key: &VerifyingKey) -> CryptoResult<Vec<u8>> {
        let document = key
            .to_public_key_der()
            .map_err(|e| CryptoError::InvalidKey(format!("Ed25519 public key: {e}")))?;
        Ok(keys::encode_key_text(document.as_bytes()))
    }
}

impl KeyCodec for Ed25519KeyCodec {
    type Key = Ed25519KeyPair;

    fn key_files(&self) -> &'static [&'static str] {
        &[keys::PRIVATE_KEY_FILE, keys::PUBLIC_KEY_FILE]
    }

    fn decode_dir(&self, dir: &Path) -> CryptoResult<Ed25519KeyPair> {
        keys::decode_pair_dir(self, dir)
    }

    fn encode_dir(&self, key: &Ed25519KeyPair, dir: &Path) -> CryptoResult<()> {
        keys::encode_pair_dir(self, key, dir)
    }
}

#[derive(Clone)]
pub struct Ed25519DataCodec {
    signing: Option<SigningKey>,
    verifying: Option<VerifyingKey>,
}

impl Ed25519DataCodec {
    pub fn new(pair: Ed25519KeyPair) -> CryptoResult<Self> {
        if pair.is_empty() {
            return Err(CryptoError::InvalidKey(
                "Neither a public nor a private key has been provided. Make sure you copied a key."
                    .into(),
            ));
        }
        Ok(Self {
            signing: pair.private,
            verifying: pair.public,
        })
    }

    pub fn encode(&self, data: &[u8]) -> CryptoResult<Vec<Vec<u8>>> {
        let signing = self
            .signing
            .as_ref()
            .ok_or(CryptoError::MissingKey("cannot sign data without a private key"))?;
        let signature = signing.sign(data);
        Ok(vec![data.to_vec(), signature.to_bytes().to_vec()])
    }

    pub fn decode(&self, sections: Vec<Vec<u8>>) -> CryptoResult<Vec<u8>> {
        let verifying = self
            .verifying
            .as_ref()
            .ok_or(CryptoError::MissingKey("cannot verify data without a public key"))?;
        let (data, signature) = into_pair(CODEC_NAME, sections)?;

        let signature =
            Signature::from_slice(&signature).map_err(|_| CryptoError::InvalidSignature)?;
        verifying
            .verify(&data, &signature)
            .map_err(|_| CryptoError::InvalidSignature)?;
        Ok(data)
    }
}

impl std::fmt::Debug for Ed25519DataCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519DataCodec")
            .field("can_sign", &self.signing.is_some())
            .field("can_verify", &self.verifying.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    const PRIVATE_1: &str = "MC4CAQAwBQYDK2VwBCIEINFyuLU8O7U/w4nkC5RCzTb2BnlUy8kjo1jwCkluqgYZ";
    const PUBLIC_1: &str = "MCowBQYDK2VwAyEA3lAOkEnih8ucexsKDtJb+eiwmMZgSLcCWNjSm+RCF9w=";
    const PRIVATE_2: &str = "MC4CAQAwBQYDK2VwBCIEII49NjdgnRL/EZsat0qsx1owAkEMj3rtLbNpjd9mbKSf";
    const PUBLIC_2: &str = "MCowBQYDK2VwAyEAepV2vnvTx68hraRTtF8jKK8POX/60i3jVMHc9BxEVkE=";

    const SIGNED: [(&str, &str, &str, &str); 2] = [
        (
            "Hello!!",
            "/ywjHxqp70GbTITLypZeovSG8YQs3xrv7BTP6tb9QIAD7J+xuH4E768nmv5QylvCk9Iai/t+1k/y5JCSLR3PAw==",
            PRIVATE_1,
            PUBLIC_1,
        ),
        (
            "What's up?",
            "tGGiuu+114Ta2OGCdj8Ntpu3m3chhGG6NQN1WMXpg+5XGwO8efmpyU6ISlmqRY1+mCSmXQhS1VKXfvCaCelXAA==",
            PRIVATE_2,
            PUBLIC_2,
        ),
    ];

    fn private_only(key: &str) -> Ed25519DataCodec {
        let private = Ed25519KeyCodec.decode_private(key.as_bytes()).unwrap();
        Ed25519DataCodec::new(KeyPair::new(Some(private), None)).unwrap()
    }

    fn public_only(key: &str) -> Ed25519DataCodec {
        let public = Ed25519KeyCodec.decode_public(key.as_bytes()).unwrap();
        Ed25519DataCodec::new(KeyPair::new(None, Some(public))).unwrap()
    }

    #[test]
    fn test_sign_known_vectors() {
        for (message, signature, private, _) in SIGNED {
            let sections = private_only(private).encode(message.as_bytes()).unwrap();
            assert_eq!(sections[0], message.as_bytes());
            assert_eq!(sections[1], STANDARD.decode(signature).unwrap());
        }
    }

    #[test]
    fn test_verify_known_vectors() {
        for (message, signature, _, public) in SIGNED {
            let sections = vec![message.as_bytes().to_vec(), STANDARD.decode(signature).unwrap()];
            let plaintext = public_only(public).decode(sections).unwrap();
            assert_eq!(plaintext, message.as_bytes());
        }
    }

    #[test]
    fn test_missing_halves() {
        let (message, signature, private, public) = SIGNED[0];
        let sections = vec![message.as_bytes().to_vec(), STANDARD.decode(signature).unwrap()];

        assert!(matches!(
            public_only(public).encode(message.as_bytes()),
            Err(CryptoError::MissingKey(_))
        ));
        assert!(matches!(
            private_only(private).decode(sections),
            Err(CryptoError::MissingKey(_))
        ));
    }

    #[test]
    fn test_empty_pair_is_rejected() {
        let err = Ed25519DataCodec::new(KeyPair::new(None, None)).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKey(_)));
        assert!(err.to_string().contains("Make sure you copied a key"));
    }

    #[test]
    fn test_tampered_message() {
        let (message, signature, _, public) = SIGNED[0];
        let mut tampered = message.as_bytes().to_vec();
        tampered[0] ^= 0x20;

        let result = public_only(public).decode(vec![tampered, STANDARD.decode(signature).unwrap()]);
        assert!(matches!(result, Err(CryptoError::InvalidSignature)));
    }

    #[test]
    fn test_signature_from_other_key() {
        let (message, signature, _, _) = SIGNED[0];
        let result = public_only(PUBLIC_2)
            .decode(vec![message.as_bytes().to_vec(), STANDARD.decode(signature).unwrap()]);
        assert!(matches!(result, Err(CryptoError::InvalidSignature)));
    }

    #[test]
    fn test_truncated_signature() {
        let result = public_only(PUBLIC_1).decode(vec![b"Hello!!".to_vec(), vec![0u8; 10]]);
        assert!(matches!(result, Err(CryptoError::InvalidSignature)));
    }

    #[test]
    fn test_key_codec_roundtrip() {
        for key in [PRIVATE_1, PRIVATE_2] {
            let decoded = Ed25519KeyCodec.decode_private(key.as_bytes()).unwrap();
            assert_eq!(Ed25519KeyCodec.encode_private(&decoded).unwrap(), key.as_bytes());
        }
        for key in [PUBLIC_1, PUBLIC_2] {
            let decoded = Ed25519KeyCodec.decode_public(key.as_bytes()).unwrap();
            assert_eq!(Ed25519KeyCodec.encode_public(&decoded).unwrap(), key.as_bytes());
        }
    }

    #[test]
    fn test_key_codec_accepts_raw_der() {
        let der = STANDARD.decode(PUBLIC_1).unwrap();
        let from_der = Ed25519KeyCodec.decode_public(&der).unwrap();
        let from_text = Ed25519KeyCodec.decode_public(PUBLIC_1.as_bytes()).unwrap();
        assert_eq!(from_der, from_text);
    }

    #[test]
    fn test_key_dir_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join(keys::PRIVATE_KEY_FILE), PRIVATE_1).unwrap();
        std::fs::write(tmp.path().join(keys::PUBLIC_KEY_FILE), PUBLIC_1).unwrap();

        let pair = Ed25519KeyCodec.decode_dir(tmp.path()).unwrap();
        let out = tempfile::TempDir::new().unwrap();
        Ed25519KeyCodec.encode_dir(&pair, out.path()).unwrap();

        assert_eq!(
            std::fs::read_to_string(out.path().join(keys::PRIVATE_KEY_FILE)).unwrap(),
            PRIVATE_1
        );
        assert_eq!(
            std::fs::read_to_string(out.path().join(keys::PUBLIC_KEY_FILE)).unwrap(),
            PUBLIC_1
        );
    }

    #[test]
    fn test_generated_pair_roundtrip() {
        let codec = Ed25519DataCodec::new(Ed25519KeyProducer.produce().unwrap()).unwrap();
        let sections = codec.encode(b"fresh").unwrap();
        assert_eq!(codec.decode(sections).unwrap(), b"fresh");
    }

    #[test]
    fn test_malformed_key() {
        assert!(matches!(
            Ed25519KeyCodec.decode_private(b"bm90IGEga2V5"),
            Err(CryptoError::InvalidKey(_))
        ));
    }
}
