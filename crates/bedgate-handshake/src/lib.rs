//! bedgate-handshake: the identity payload and what a server does with it
//!
//! - [`BedrockData`]: the payload text form and its typed fields
//! - [`seeker`]: finding the envelope in a handshake hostname, decoding it,
//!   and the timestamp/replay acceptance checks
//! - [`build_hostname`]: the client side, embedding a payload into a hostname

pub mod bedrock_data;
pub mod error;
pub mod linked_player;
pub mod platform;
pub mod seeker;
pub mod timestamp;

pub use bedrock_data::{BedrockData, EXPECTED_LENGTH};
pub use error::{HandshakeError, HandshakeResult};
pub use linked_player::LinkedPlayer;
pub use platform::{DeviceOs, InputMode, UiProfile};
pub use seeker::{
    attach_to_hostname, build_hostname, correct_hostname, separate_hostname, DataSeeker,
    SeekResult, SeparatedHostname,
};
pub use timestamp::{Clock, ReplayCache, SystemClock, TimestampPolicy};
