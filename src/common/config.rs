use super::errors::ConfigError;
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::num::NonZeroU64;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 6767;
pub const DEFAULT_CHUNK_SIZE: usize = 1024;
pub const DEFAULT_LISTEN_BACKLOG: u32 = 5;

const ENV_PREFIX: &str = "NETCAT_PART_";

/// Ambient defaults for a run
/// Layered: built-in defaults < config.toml < NETCAT_PART_* env vars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub port: u16,
    pub chunk_size: usize,
    pub listen_backlog: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            listen_backlog: DEFAULT_LISTEN_BACKLOG,
        }
    }
}

impl Settings {
    /// Location of the optional user config file
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "netcat-part").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = Self::default_path() {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let settings: Settings = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidSetting(
                "chunk_size must be greater than zero".into(),
            ));
        }
        if self.listen_backlog == 0 {
            return Err(ConfigError::InvalidSetting(
                "listen_backlog must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// What the client sends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Message(String),
    File(PathBuf),
}

/// Client side of a session: payload plus optional slicing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub payload: Payload,
    /// Only applies to file payloads
    pub offset: u64,
    pub byte_limit: Option<NonZeroU64>,
}

/// Server side of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenRequest {
    pub dest: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Send(SendRequest),
    Listen(ListenRequest),
}

/// Immutable description of one run, built once from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Destination for the client, bind address for the server
    pub peer: SocketAddr,
    pub role: Role,
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_match_classic_netcat_part() {
        let settings = Settings::default();
        assert_eq!(settings.port, 6767);
        assert_eq!(settings.chunk_size, 1024);
        assert_eq!(settings.listen_backlog, 5);
    }

    #[test]
    fn env_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("NETCAT_PART_CHUNK_SIZE", "4096");
            jail.set_env("NETCAT_PART_PORT", "7000");

            let figment = Figment::from(Serialized::defaults(Settings::default()))
                .merge(Env::prefixed(ENV_PREFIX));
            let settings = Settings::from_figment(&figment).map_err(|e| e.to_string())?;

            assert_eq!(settings.chunk_size, 4096);
            assert_eq!(settings.port, 7000);
            assert_eq!(settings.listen_backlog, DEFAULT_LISTEN_BACKLOG);
            Ok(())
        });
    }

    #[test]
    fn toml_file_is_layered_over_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "listen_backlog = 16")?;

            let figment = Figment::from(Serialized::defaults(Settings::default()))
                .merge(Toml::file("config.toml"));
            let settings = Settings::from_figment(&figment).map_err(|e| e.to_string())?;

            assert_eq!(settings.listen_backlog, 16);
            assert_eq!(settings.port, DEFAULT_PORT);
            Ok(())
        });
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let settings = Settings {
            chunk_size: 0,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidSetting(_))
        ));
    }
}
