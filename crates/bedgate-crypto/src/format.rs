//! Format envelope: header framing around a topping-encoded data codec output
//!
//! ```text
//! "^Floodgate^" [version char] [topping]
//! ```
//!
//! Decoding is strictly staged; each stage either hands off to the next or
//! fails for good:
//! header → version → topping → data codec → plaintext

use rand::{CryptoRng, RngCore};
use std::path::Path;

use bedgate_core::CodecKind;

use crate::codec::DataCodec;
use crate::error::{CryptoError, CryptoResult};
use crate::keys;
use crate::topping::{Base64Topping, Topping};

/// Current envelope version. Decoders refuse any other version.
pub const VERSION: i32 = 2;

/// Marker identifying an envelope
pub const IDENTIFIER: &str = "^Floodgate^";

const VERSION_OFFSET: i32 = 0x3D;

/// The version as it appears on the wire (`?` for version 2)
pub const VERSION_CHAR: u8 = (VERSION + VERSION_OFFSET) as u8;

/// Marker plus version char
pub const HEADER_LEN: usize = IDENTIFIER.len() + 1;

/// The version declared by `data`, or -1 when it doesn't start with the
/// marker or has nothing after it. Never fails.
pub fn version(data: &str) -> i32 {
    data.strip_prefix(IDENTIFIER)
        .and_then(|rest| rest.chars().next())
        .map_or(-1, version_of)
}

fn version_of(c: char) -> i32 {
    c as i32 - VERSION_OFFSET
}

/// First character of `bytes`, if they start with valid UTF-8.
fn first_char(bytes: &[u8]) -> Option<char> {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => std::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
    };
    text.chars().next()
}

/// Check the marker and version of an envelope.
pub fn validate_header(data: &[u8]) -> CryptoResult<()> {
    if data.len() < HEADER_LEN {
        return Err(CryptoError::InvalidFormat(format!(
            "data length is smaller than the header: needed {HEADER_LEN}, got {}",
            data.len()
        )));
    }

    let marker = &data[..IDENTIFIER.len()];
    if marker != IDENTIFIER.as_bytes() {
        return Err(CryptoError::InvalidFormat(format!(
            "expected identifier {IDENTIFIER}, got {}",
            String::from_utf8_lossy(marker)
        )));
    }

    let received = first_char(&data[IDENTIFIER.len()..])
        .map(version_of)
        .ok_or_else(|| CryptoError::InvalidFormat("version character is not UTF-8".into()))?;
    if received != VERSION {
        return Err(CryptoError::UnsupportedVersion {
            expected: VERSION,
            received,
        });
    }
    Ok(())
}

/// Envelope encoder/decoder around the process-wide data codec.
///
/// Holds only immutable key material, so it is `Send + Sync` and can be
/// shared between connection handlers.
#[derive(Debug, Clone)]
pub struct FormatCodec<T: Topping = Base64Topping> {
    codec: DataCodec,
    topping: T,
}

impl FormatCodec<Base64Topping> {
    pub fn new(codec: DataCodec) -> Self {
        Self::with_topping(codec, Base64Topping)
    }

    /// Load (or, when allowed and absent, generate) the keys for `kind` from
    /// `dir` and build the envelope codec around them.
    pub fn from_key_dir(kind: CodecKind, dir: &Path, generate_missing: bool) -> CryptoResult<Self> {
        let material = keys::load_or_generate(kind, dir, generate_missing)?;
        Ok(Self::new(DataCodec::new(material)?))
    }
}

impl<T: Topping> FormatCodec<T> {
    pub fn with_topping(codec: DataCodec, topping: T) -> Self {
        Self { codec, topping }
    }

    pub fn kind(&self) -> CodecKind {
        self.codec.kind()
    }

    pub fn data_codec(&self) -> &DataCodec {
        &self.codec
    }

    pub fn encode(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        Ok(self.encode_to_string(data)?.into_bytes())
    }

    pub fn encode_with_rng<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        data: &[u8],
    ) -> CryptoResult<Vec<u8>> {
        Ok(self.encode_to_string_with_rng(rng, data)?.into_bytes())
    }

    pub fn encode_from_string(&self, data: &str) -> CryptoResult<Vec<u8>> {
        self.encode(data.as_bytes())
    }

    /// The envelope is always ASCII; this skips the bytes round trip for
    /// callers that put it into a hostname.
    pub fn encode_to_string(&self, data: &[u8]) -> CryptoResult<String> {
        self.encode_to_string_with_rng(&mut rand::thread_rng(), data)
    }

    pub fn encode_to_string_with_rng<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        data: &[u8],
    ) -> CryptoResult<String> {
        let sections = self.codec.encode_with_rng(rng, data)?;
        let topping = self.topping.encode(&sections);

        let mut envelope = String::with_capacity(HEADER_LEN + topping.len());
        envelope.push_str(IDENTIFIER);
        envelope.push(char::from(VERSION_CHAR));
        envelope.push_str(&topping);
        Ok(envelope)
    }

    pub fn decode(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        validate_header(data)?;

        let sections = self.topping.decode(&data[HEADER_LEN..])?;
        tracing::debug!(
            codec = %self.codec.kind(),
            sections = sections.len(),
            "decoded envelope topping"
        );

        self.codec.decode(sections)
    }

    pub fn decode_from_string(&self, data: &str) -> CryptoResult<Vec<u8>> {
        self.decode(data.as_bytes())
    }

    pub fn decode_to_string(&self, data: &[u8]) -> CryptoResult<String> {
        Ok(String::from_utf8(self.decode(data)?)?)
    }
}
