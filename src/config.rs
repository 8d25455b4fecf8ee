use serde::{Deserialize, Serialize};
use std::{env, fs, net::SocketAddr, str::FromStr};

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: Http,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub decoder: Decoder,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Http {
    #[serde(default = "default_http_listen")]
    pub listen: SocketAddr,
    #[serde(default)]
    pub cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decoder {
    /// Base command line for the external AFSK decoder; the controller
    /// appends `start` or `stop`.
    #[serde(default = "default_decoder_command")]
    pub command: String,
    /// Delay between SIGTERM and the finalize step, so the decoder can
    /// flush its capture.
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
    /// Upper bound on waiting for the decoder to exit.
    #[serde(default = "default_finalize_timeout_ms")]
    pub finalize_timeout_ms: u64,
}

fn default_http_listen() -> SocketAddr {
    SocketAddr::from_str(&format!(
        "0.0.0.0:{}",
        env::var("PORT").unwrap_or(String::from("8888"))
    ))
    .expect("invalid listen address")
}

impl Default for Http {
    fn default() -> Self {
        Self {
            listen: default_http_listen(),
            cors: Default::default(),
        }
    }
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug".to_string()
        } else {
            "info".to_string()
        }
    })
}

impl Default for Database {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://groundlink.db3?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            command: default_decoder_command(),
            grace_ms: default_grace_ms(),
            finalize_timeout_ms: default_finalize_timeout_ms(),
        }
    }
}

fn default_decoder_command() -> String {
    "python3 afsk_decoder.py".to_string()
}

fn default_grace_ms() -> u64 {
    1000
}

fn default_finalize_timeout_ms() -> u64 {
    10000
}

impl Config {
    pub fn parse(path: Option<String>) -> Self {
        let result = fs::read_to_string(path.unwrap_or(String::from("groundlink.toml")))
            .or(fs::read_to_string("/etc/groundlink/groundlink.toml"))
            .unwrap_or("".to_string());
        let cfg: Self = toml::from_str(result.as_str()).expect("config parse error");
        match cfg.validate() {
            Ok(_) => cfg,
            Err(err) => panic!("config validate [{}]", err),
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.decoder.command.trim().is_empty() {
            return Err(anyhow::anyhow!("decoder command must not be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("database max_connections must be at least 1"));
        }
        Ok(())
    }
}
