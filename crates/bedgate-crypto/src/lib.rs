//! bedgate-crypto: the handshake envelope carried in the Java server address field
//!
//! Wire format:
//! ```text
//! ^Floodgate^ <version char> <topping>
//!
//! version char = VERSION + 0x3D
//! topping      = base64url(section0) "!" base64url(section1) ...
//! ```
//!
//! Data codecs and their sections:
//! ```text
//! AES-128-GCM  → [12-byte nonce][ciphertext || 16-byte tag]
//! Ed25519      → [plaintext][64-byte signature]
//! RSA-2048     → [plaintext][PKCS#1 v1.5 SHA-256 signature]
//! ```
//!
//! Decode pipeline: header → version → topping → data codec → plaintext.
//! Everything here is synchronous and free of shared mutable state; a
//! `FormatCodec` can be shared between connection handlers behind an `Arc`.

pub mod codec;
pub mod error;
pub mod format;
pub mod keys;
pub mod topping;

pub use codec::aes::{AesDataCodec, AesKey, AesKeyCodec, AesKeyProducer};
pub use codec::ed25519::{Ed25519DataCodec, Ed25519KeyCodec, Ed25519KeyPair, Ed25519KeyProducer};
pub use codec::rsa::{RsaDataCodec, RsaKeyCodec, RsaKeyPair, RsaKeyProducer};
pub use codec::DataCodec;
pub use error::{CryptoError, CryptoResult, ErrorKind};
pub use format::{FormatCodec, HEADER_LEN, IDENTIFIER, VERSION};
pub use keys::{load_or_generate, KeyCodec, KeyHalfCodec, KeyMaterial, KeyPair, KeyProducer};
pub use topping::{Base64Topping, Topping};

pub use bedgate_core::CodecKind;
