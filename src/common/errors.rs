use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Problems with user input, detected before any socket or file is touched
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot send {requested} bytes: the message is only {available} bytes long")]
    InvalidByteCount { requested: u64, available: u64 },

    #[error("byte count must be greater than zero")]
    ZeroByteCount,

    #[error("a host and a file are required")]
    MissingFilename,

    #[error("message mode takes only a host, not a file")]
    UnexpectedFilename,

    #[error("listen mode writes to a file and cannot be combined with -m")]
    ListenWithMessage,

    #[error("port {0} is below 2000 and reserved for system services")]
    PrivilegedPort(u16),

    #[error("invalid host name '{0}'")]
    InvalidHost(String),

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error("failed to load settings")]
    Load(#[from] figment::Error),
}

/// Socket setup failures on either side of the transfer
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("TCP socket creation failed")]
    SocketCreationFailed(#[source] std::io::Error),

    #[error("connection could not be established to {addr}")]
    ConnectFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind listening socket to {addr}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to listen for incoming connections")]
    ListenFailed(#[source] std::io::Error),

    #[error("failed to accept client connection")]
    AcceptFailed(#[source] std::io::Error),
}

/// File and stream failures while moving bytes
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("could not open file '{}'", .path.display())]
    FileOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read failed")]
    ReadFailed(#[source] std::io::Error),

    #[error("write failed")]
    WriteFailed(#[source] std::io::Error),

    #[error("nothing was sent: the payload is empty")]
    EmptyTransfer,
}

/// Any failure that ends the process
#[derive(Error, Debug)]
pub enum NcError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl NcError {
    /// Config errors are shown together with usage text
    pub fn is_config(&self) -> bool {
        matches!(self, NcError::Config(_))
    }
}
