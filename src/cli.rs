//! Command-line surface, compatible with the classic netcat_part flags.

use crate::common::{
    ConfigError, ListenRequest, Payload, Role, SendRequest, SessionConfig, Settings,
};
use clap::Parser;
use std::net::SocketAddr;
use std::num::NonZeroU64;
use std::path::PathBuf;

/// Lowest port a listener may bind; lower ones are left to system services
pub const MIN_LISTEN_PORT: u16 = 2000;

#[derive(Parser, Debug)]
#[command(name = "netcat_part")]
#[command(about = "Send a message or a slice of a file over TCP")]
pub struct Cli {
    /// Listen on port instead of connecting and write output to file
    #[arg(short = 'l')]
    pub listen: bool,

    /// Send MSG instead of a file (do not pass a file with this option)
    #[arg(short = 'm', value_name = "MSG", allow_hyphen_values = true)]
    pub message: Option<String>,

    /// Port to connect on or listen on (default 6767)
    #[arg(short = 'p', value_name = "PORT")]
    pub port: Option<u16>,

    /// Number of bytes to send, defaults to the whole file
    #[arg(short = 'n', value_name = "BYTES")]
    pub bytes: Option<u64>,

    /// Offset into the file to start sending from
    #[arg(short = 'o', value_name = "OFFSET", default_value_t = 0)]
    pub offset: u64,

    /// Verbose output
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Host to connect to, or address to bind to with -l
    pub host: String,

    /// Input file for the client, output file for the server
    pub file: Option<PathBuf>,
}

impl Cli {
    /// Validate flags and resolve the host into a session
    pub async fn into_session(self, settings: &Settings) -> Result<SessionConfig, ConfigError> {
        let byte_limit = match self.bytes {
            Some(0) => return Err(ConfigError::ZeroByteCount),
            Some(n) => NonZeroU64::new(n),
            None => None,
        };
        let port = self.port.unwrap_or(settings.port);

        let role = match (self.listen, self.message, self.file) {
            (_, Some(_), Some(_)) => return Err(ConfigError::UnexpectedFilename),
            (_, None, None) => return Err(ConfigError::MissingFilename),
            (true, Some(_), None) => return Err(ConfigError::ListenWithMessage),
            (true, None, Some(dest)) => {
                if port < MIN_LISTEN_PORT {
                    return Err(ConfigError::PrivilegedPort(port));
                }
                if byte_limit.is_some() || self.offset != 0 {
                    tracing::warn!("-n and -o only apply to the sending side, ignoring");
                }
                Role::Listen(ListenRequest { dest })
            }
            (false, Some(message), None) => Role::Send(SendRequest {
                payload: Payload::Message(message),
                offset: self.offset,
                byte_limit,
            }),
            (false, None, Some(path)) => Role::Send(SendRequest {
                payload: Payload::File(path),
                offset: self.offset,
                byte_limit,
            }),
        };

        let peer = resolve(&self.host, port).await?;

        Ok(SessionConfig {
            peer,
            role,
            verbose: self.verbose,
        })
    }
}

/// Resolve `host`, preferring an IPv4 address when the name has several
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|_| ConfigError::InvalidHost(host.to_string()))?
        .collect();

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| ConfigError::InvalidHost(host.to_string()))
}
