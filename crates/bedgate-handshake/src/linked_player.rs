use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::error::{HandshakeError, HandshakeResult};

/// Wire form of an absent link
pub const NO_LINK: &str = "null";

/// A Java account the Bedrock player has linked to.
///
/// Wire form: `javaUsername;javaUuid;bedrockUuid`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedPlayer {
    pub java_username: String,
    pub java_uuid: Uuid,
    pub bedrock_uuid: Uuid,
}

impl LinkedPlayer {
    pub fn new(java_username: impl Into<String>, java_uuid: Uuid, bedrock_uuid: Uuid) -> Self {
        Self {
            java_username: java_username.into(),
            java_uuid,
            bedrock_uuid,
        }
    }

    /// Parse the wire form; `"null"` is no link.
    pub fn from_text(text: &str) -> HandshakeResult<Option<Self>> {
        if text == NO_LINK {
            return Ok(None);
        }

        let parts: Vec<&str> = text.split(';').collect();
        let [username, java_uuid, bedrock_uuid] = parts[..] else {
            return Err(HandshakeError::InvalidData(format!(
                "linked player needs 3 fields, got {}",
                parts.len()
            )));
        };

        Ok(Some(Self {
            java_username: username.to_string(),
            java_uuid: parse_uuid(java_uuid)?,
            bedrock_uuid: parse_uuid(bedrock_uuid)?,
        }))
    }

    /// The wire form of an optional link.
    pub fn to_text(link: Option<&Self>) -> String {
        link.map_or_else(|| NO_LINK.to_string(), ToString::to_string)
    }
}

impl fmt::Display for LinkedPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{}",
            self.java_username, self.java_uuid, self.bedrock_uuid
        )
    }
}

fn parse_uuid(text: &str) -> HandshakeResult<Uuid> {
    Uuid::parse_str(text)
        .map_err(|e| HandshakeError::InvalidData(format!("linked player uuid {text:?}: {e}")))
}
