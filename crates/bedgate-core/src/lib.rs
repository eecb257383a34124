pub mod config;
pub mod error;
pub mod types;

pub use config::BedgateConfig;
pub use error::{BedgateError, BedgateResult};
pub use types::{CodecKind, LogFormat};
