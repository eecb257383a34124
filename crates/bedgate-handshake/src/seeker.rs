//! Locating, decoding and accepting the envelope in a handshake hostname
//!
//! The Java handshake hostname field may carry several NUL-separated
//! components (BungeeCord IP forwarding uses `host\0ip\0uuid[\0properties]`).
//! At most one of them is the envelope:
//! ```text
//! play.example.com \0 ^Floodgate^?... \0 198.51.100.7 \0 <uuid>
//! ```

use std::sync::Arc;

use bedgate_core::config::HandshakeConfig;
use bedgate_crypto::{format, FormatCodec};

use crate::bedrock_data::BedrockData;
use crate::error::{HandshakeError, HandshakeResult};
use crate::timestamp::{Clock, ReplayCache, SystemClock, TimestampPolicy};

const COMPONENT_SEPARATOR: char = '\0';

/// A hostname split into the envelope and everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparatedHostname<'a> {
    /// The first component carrying the envelope marker, if any
    pub envelope: Option<&'a str>,
    /// The remaining components, rejoined with NUL
    pub hostname: String,
}

/// Split the envelope out of a handshake hostname.
pub fn separate_hostname(hostname: &str) -> SeparatedHostname<'_> {
    let mut envelope = None;
    let mut rest = Vec::new();

    for component in hostname.split(COMPONENT_SEPARATOR) {
        if envelope.is_none() && format::version(component) != -1 {
            envelope = Some(component);
        } else {
            rest.push(component);
        }
    }

    SeparatedHostname {
        envelope,
        hostname: rest.join("\0"),
    }
}

/// Client side: append the envelope to the hostname the player typed.
pub fn attach_to_hostname(hostname: &str, envelope: &str) -> String {
    let mut combined = String::with_capacity(hostname.len() + 1 + envelope.len());
    combined.push_str(hostname);
    combined.push(COMPONENT_SEPARATOR);
    combined.push_str(envelope);
    combined
}

/// Replace the forwarded IP and UUID (components 1 and 2) with the Bedrock
/// player's. Hostnames without forwarding data are returned unchanged.
pub fn correct_hostname(hostname: &str, data: &BedrockData) -> String {
    let mut components: Vec<String> = hostname
        .split(COMPONENT_SEPARATOR)
        .map(str::to_string)
        .collect();

    if components.len() >= 3 {
        let uuid = data.correct_uuid();
        tracing::debug!(
            old_ip = %components[1],
            new_ip = %data.ip,
            old_uuid = %components[2],
            new_uuid = %uuid,
            "replacing forwarded address and uuid"
        );
        components[1] = data.ip.clone();
        components[2] = uuid.to_string();
    }
    components.join("\0")
}

/// Client side: encode `data` and attach it to `hostname`.
pub fn build_hostname(
    codec: &FormatCodec,
    hostname: &str,
    data: &BedrockData,
) -> HandshakeResult<String> {
    let envelope = codec.encode_to_string(data.to_text().as_bytes())?;
    Ok(attach_to_hostname(hostname, &envelope))
}

/// Outcome of seeking an envelope in a hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeekResult {
    /// An ordinary Java connection; the hostname is untouched.
    NotFloodgate { hostname: String },
    /// A Bedrock player. `hostname` has the envelope removed and forwarding
    /// data corrected.
    Floodgate {
        data: Box<BedrockData>,
        hostname: String,
    },
}

/// Server side: finds, decodes and accepts envelopes.
///
/// Cheap to clone; clones share the codec and replay cache.
#[derive(Debug, Clone)]
pub struct DataSeeker<C: Clock = SystemClock> {
    codec: Arc<FormatCodec>,
    policy: TimestampPolicy,
    check_timestamps: bool,
    replay: ReplayCache,
    clock: C,
}

impl DataSeeker<SystemClock> {
    pub fn new(codec: Arc<FormatCodec>, config: &HandshakeConfig) -> Self {
        Self::with_clock(codec, config, SystemClock)
    }
}

impl<C: Clock> DataSeeker<C> {
    pub fn with_clock(codec: Arc<FormatCodec>, config: &HandshakeConfig, clock: C) -> Self {
        let policy = TimestampPolicy::from_config(config);
        Self {
            replay: ReplayCache::new(&policy, config.replay_cache_capacity),
            codec,
            policy,
            check_timestamps: config.check_timestamps,
            clock,
        }
    }

    pub fn codec(&self) -> &FormatCodec {
        &self.codec
    }

    /// Process the hostname of an inbound handshake.
    ///
    /// A hostname without an envelope is not an error. Everything else that
    /// goes wrong is: the caller should refuse the connection.
    pub fn seek(&self, hostname: &str) -> HandshakeResult<SeekResult> {
        let separated = separate_hostname(hostname);
        let Some(envelope) = separated.envelope else {
            return Ok(SeekResult::NotFloodgate {
                hostname: separated.hostname,
            });
        };

        let data = match self.decode(envelope) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "rejected handshake data");
                return Err(e);
            }
        };

        if let Err(e) = self.accept(&data) {
            tracing::warn!(
                username = %data.username,
                xuid = data.xuid,
                error = %e,
                "rejected handshake data"
            );
            return Err(e);
        }

        tracing::debug!(username = %data.username, xuid = data.xuid, "accepted handshake data");
        let hostname = correct_hostname(&separated.hostname, &data);
        Ok(SeekResult::Floodgate {
            data: Box::new(data),
            hostname,
        })
    }

    /// Decode and parse an envelope without acceptance checks.
    pub fn decode(&self, envelope: &str) -> HandshakeResult<BedrockData> {
        let text = self.codec.decode_to_string(envelope.as_bytes())?;
        BedrockData::from_text(&text)
    }

    fn accept(&self, data: &BedrockData) -> HandshakeResult<()> {
        if !self.check_timestamps {
            return Ok(());
        }
        let now = self.clock.now_millis();
        self.policy.check(data.timestamp, now)?;
        self.replay.check_and_record(data.xuid, data.timestamp, now)
    }
}
