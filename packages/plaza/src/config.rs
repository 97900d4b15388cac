use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// Unified config (figment-deserialized from defaults / config.toml / env vars)
// =============================================================================
//
// Two equivalent ways to configure:
//
//   config.toml:     [chat]
//                    greeting = "Welcome to the chat"
//
//   env var:         PLAZA_CHAT__GREETING="..."   (double underscore = nesting)
//
// (single underscore stays within field names: PLAZA_CHAT__SEND_QUEUE)

/// Top-level tunable configuration, deserialized by figment.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerFileConfig,
    #[serde(default)]
    pub chat: ChatFileConfig,
}

/// Server tuning knobs (lives under `[server]` in config.toml).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerFileConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

/// Chat tunables (lives under `[chat]` in config.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatFileConfig {
    /// Greeting prefix for the direct welcome message; the joiner's display
    /// name is appended.
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Per-connection outbound queue capacity. Events beyond this are
    /// dropped for that recipient.
    #[serde(default = "default_send_queue")]
    pub send_queue: usize,
}

impl Default for ChatFileConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            send_queue: default_send_queue(),
        }
    }
}

fn default_greeting() -> String {
    plaza_chat::room::DEFAULT_GREETING.to_string()
}

fn default_send_queue() -> usize {
    100
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),
}

/// Build a figment that layers: struct defaults → config.toml → PLAZA_* env
/// vars.
///
/// Env vars use double-underscore for nesting into sections:
///   `PLAZA_SERVER__PORT=8080`  →  `server.port = 8080`
///   `PLAZA_CHAT__SEND_QUEUE=50`  →  `chat.send_queue = 50`
pub fn load_config(data_dir: &Path) -> figment::Figment {
    use figment::{
        Figment,
        providers::{Env, Format, Serialized, Toml},
    };

    Figment::from(Serialized::defaults(FileConfig::default()))
        .merge(Toml::file(data_dir.join("config.toml")))
        .merge(Env::prefixed("PLAZA_").split("__"))
}

/// Resolved runtime configuration.
#[derive(Clone, Debug)]
pub struct PlazaConfig {
    pub host: String,
    pub port: u16,
    pub greeting: String,
    pub send_queue: usize,
}

impl PlazaConfig {
    pub fn from_figment(figment: &figment::Figment) -> Result<Self, ConfigError> {
        let fc: FileConfig = figment.extract()?;
        Ok(Self {
            host: fc.server.host.unwrap_or_else(default_host),
            port: fc.server.port.unwrap_or_else(default_port),
            greeting: fc.chat.greeting,
            send_queue: fc.chat.send_queue.max(1),
        })
    }
}
