use thiserror::Error;

pub type BedgateResult<T> = Result<T, BedgateError>;

#[derive(Debug, Error)]
pub enum BedgateError {
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
