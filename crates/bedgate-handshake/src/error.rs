use bedgate_crypto::CryptoError;
use thiserror::Error;

pub type HandshakeResult<T> = Result<T, HandshakeError>;

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error(transparent)]
    Codec(#[from] CryptoError),

    #[error("expected {expected} arguments in the identity payload, got {actual}")]
    InvalidArgumentLength { expected: usize, actual: usize },

    #[error("invalid identity payload: {0}")]
    InvalidData(String),

    #[error("timestamp denied ({reason}): payload {timestamp}, now {now}")]
    TimestampDenied {
        timestamp: i64,
        now: i64,
        reason: &'static str,
    },
}
