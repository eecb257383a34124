//! The identity payload carried inside the envelope
//!
//! Text form, fields joined by NUL:
//! ```text
//! version \0 username \0 xuid \0 deviceOs \0 languageCode \0 uiProfile \0
//! inputMode \0 ip \0 linkedPlayer \0 fromProxy \0 subscribeId \0 verifyCode \0
//! timestamp
//! ```

use serde::Serialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{HandshakeError, HandshakeResult};
use crate::linked_player::LinkedPlayer;
use crate::platform::{DeviceOs, InputMode, UiProfile};

/// Number of fields in the text form
pub const EXPECTED_LENGTH: usize = 13;

const FIELD_SEPARATOR: char = '\0';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BedrockData {
    /// Bedrock game version of the client
    pub version: String,
    pub username: String,
    pub xuid: u64,
    pub device_os: DeviceOs,
    pub language_code: String,
    pub ui_profile: UiProfile,
    pub input_mode: InputMode,
    /// Address the Bedrock client connected from
    pub ip: String,
    pub linked_player: Option<LinkedPlayer>,
    /// Whether a proxy, not the Bedrock bridge itself, produced this payload
    pub from_proxy: bool,
    pub subscribe_id: i32,
    pub verify_code: String,
    /// Issue time, Unix milliseconds
    pub timestamp: i64,
}

impl BedrockData {
    pub fn from_text(text: &str) -> HandshakeResult<Self> {
        let fields: Vec<&str> = text.split(FIELD_SEPARATOR).collect();
        if fields.len() != EXPECTED_LENGTH {
            return Err(HandshakeError::InvalidArgumentLength {
                expected: EXPECTED_LENGTH,
                actual: fields.len(),
            });
        }

        Ok(Self {
            version: fields[0].to_string(),
            username: fields[1].to_string(),
            xuid: parse_field("xuid", fields[2])?,
            device_os: DeviceOs::from_id(parse_field("device os", fields[3])?),
            language_code: fields[4].to_string(),
            ui_profile: UiProfile::from_id(parse_field("ui profile", fields[5])?),
            input_mode: InputMode::from_id(parse_field("input mode", fields[6])?),
            ip: fields[7].to_string(),
            linked_player: LinkedPlayer::from_text(fields[8])?,
            from_proxy: fields[9] == "1",
            subscribe_id: parse_field("subscribe id", fields[10])?,
            verify_code: fields[11].to_string(),
            timestamp: parse_field("timestamp", fields[12])?,
        })
    }

    pub fn to_text(&self) -> String {
        [
            self.version.clone(),
            self.username.clone(),
            self.xuid.to_string(),
            self.device_os.id().to_string(),
            self.language_code.clone(),
            self.ui_profile.id().to_string(),
            self.input_mode.id().to_string(),
            self.ip.clone(),
            LinkedPlayer::to_text(self.linked_player.as_ref()),
            if self.from_proxy { "1" } else { "0" }.to_string(),
            self.subscribe_id.to_string(),
            self.verify_code.clone(),
            self.timestamp.to_string(),
        ]
        .join("\0")
    }

    /// The offline-mode Java UUID for this player: XUID in the low 64 bits.
    pub fn java_uuid(&self) -> Uuid {
        Uuid::from_u64_pair(0, self.xuid)
    }

    /// The UUID the player plays as: the linked account if any.
    pub fn correct_uuid(&self) -> Uuid {
        self.linked_player
            .as_ref()
            .map_or_else(|| self.java_uuid(), |link| link.java_uuid)
    }

    pub fn correct_username(&self) -> &str {
        self.linked_player
            .as_ref()
            .map_or(self.username.as_str(), |link| link.java_username.as_str())
    }
}

fn parse_field<T: FromStr>(name: &str, value: &str) -> HandshakeResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| HandshakeError::InvalidData(format!("{name} {value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steve() -> BedrockData {
        BedrockData {
            version: "1.21.30".into(),
            username: "Steve".into(),
            xuid: 123456789,
            device_os: DeviceOs::Android,
            language_code: "en_US".into(),
            ui_profile: UiProfile::Pocket,
            input_mode: InputMode::Touch,
            ip: "192.0.2.10".into(),
            linked_player: None,
            from_proxy: false,
            subscribe_id: 0,
            verify_code: "0".into(),
            timestamp: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_text_form() {
        assert_eq!(
            steve().to_text(),
            "1.21.30\0Steve\0123456789\x001\0en_US\x001\x002\0192.0.2.10\0null\x000\x000\x000\01700000000000"
        );
    }

    #[test]
    fn test_roundtrip() {
        let data = steve();
        assert_eq!(BedrockData::from_text(&data.to_text()).unwrap(), data);
    }

    #[test]
    fn test_roundtrip_with_link() {
        let mut data = steve();
        data.from_proxy = true;
        data.linked_player = Some(LinkedPlayer::new(
            "Notch",
            Uuid::parse_str("069a79f4-44e9-4726-a5be-fca90e38aaf5").unwrap(),
            data.java_uuid(),
        ));

        let parsed = BedrockData::from_text(&data.to_text()).unwrap();
        assert_eq!(parsed, data);
        assert_eq!(parsed.correct_username(), "Notch");
        assert_eq!(
            parsed.correct_uuid().to_string(),
            "069a79f4-44e9-4726-a5be-fca90e38aaf5"
        );
    }

    #[test]
    fn test_java_uuid_from_xuid() {
        assert_eq!(
            steve().java_uuid().to_string(),
            "00000000-0000-0000-0000-0000075bcd15"
        );
        assert_eq!(steve().correct_uuid(), steve().java_uuid());
        assert_eq!(steve().correct_username(), "Steve");
    }

    #[test]
    fn test_wrong_field_count() {
        let text = steve().to_text();
        let truncated = text.rsplit_once('\0').unwrap().0;

        let err = BedrockData::from_text(truncated).unwrap_err();
        assert!(matches!(
            err,
            HandshakeError::InvalidArgumentLength {
                expected: 13,
                actual: 12
            }
        ));

        let extended = format!("{text}\0extra");
        assert!(matches!(
            BedrockData::from_text(&extended),
            Err(HandshakeError::InvalidArgumentLength { actual: 14, .. })
        ));
    }

    #[test]
    fn test_non_numeric_field() {
        let text = steve().to_text().replace("123456789", "not-a-xuid");
        assert!(matches!(
            BedrockData::from_text(&text),
            Err(HandshakeError::InvalidData(_))
        ));
    }

    #[test]
    fn test_unknown_platform_ids() {
        let mut fields: Vec<String> = steve().to_text().split('\0').map(String::from).collect();
        fields[3] = "42".into();
        let parsed = BedrockData::from_text(&fields.join("\0")).unwrap();
        assert_eq!(parsed.device_os, DeviceOs::Unknown);
    }
}
