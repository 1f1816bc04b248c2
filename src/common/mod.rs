pub mod config;
pub mod errors;

pub use config::{ListenRequest, Payload, Role, SendRequest, SessionConfig, Settings};
pub use errors::{ConfigError, ConnectionError, NcError, TransferError};
