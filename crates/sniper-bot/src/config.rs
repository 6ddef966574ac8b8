//! Application configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sniper_alert::TelegramConfig;
use sniper_detector::{SpreadConfig, WallConfig};
use sniper_ws::ConnectionConfig;
use std::path::Path;

/// Environment variable overriding the config path.
pub const CONFIG_ENV: &str = "SNIPER_CONFIG";
/// Config path used when neither CLI nor environment name one.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Bot token variable.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
/// Destination chat variable.
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

/// Log file used while the console view owns the terminal.
pub const DEFAULT_LOG_FILE: &str = "app.log";

/// Depths the limit-depth stream accepts.
const SUPPORTED_DEPTHS: [u32; 3] = [5, 10, 20];

/// A symbol to watch and the book depth to subscribe at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    pub symbol: String,
    #[serde(default = "default_depth")]
    pub depth: u32,
}

fn default_depth() -> u32 {
    20
}

fn default_markets() -> Vec<MarketConfig> {
    vec![MarketConfig {
        symbol: "BTCUSDT".to_string(),
        depth: default_depth(),
    }]
}

fn default_ws_url() -> String {
    "wss://wbs-api.mexc.com/ws".to_string()
}

/// WebSocket configuration subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WsConfig {
    /// Fixed delay before reconnecting (ms).
    pub reconnect_delay_ms: u64,
    /// Client ping interval (ms).
    pub keepalive_interval_ms: u64,
    /// Connect + handshake timeout (ms).
    pub connect_timeout_ms: u64,
    /// Bound on waiting for the run-loop at shutdown (ms).
    pub shutdown_timeout_ms: u64,
}

impl Default for WsConfig {
    fn default() -> Self {
        let defaults = ConnectionConfig::default();
        Self {
            reconnect_delay_ms: defaults.reconnect_delay_ms,
            keepalive_interval_ms: defaults.keepalive_interval_ms,
            connect_timeout_ms: defaults.connect_timeout_ms,
            shutdown_timeout_ms: defaults.shutdown_timeout_ms,
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Append logs to this file instead of stderr. Defaults to
    /// [`DEFAULT_LOG_FILE`] while rendering is enabled.
    pub log_file: Option<String>,
}

/// Console view configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub enabled: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// WebSocket endpoint URL.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default)]
    pub websocket: WsConfig,
    /// Markets to subscribe to, in subscription order.
    #[serde(default = "default_markets")]
    pub markets: Vec<MarketConfig>,
    #[serde(default)]
    pub wall: WallConfig,
    #[serde(default)]
    pub spread: SpreadConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            websocket: WsConfig::default(),
            markets: default_markets(),
            wall: WallConfig::default(),
            spread: SpreadConfig::default(),
            telegram: TelegramConfig::default(),
            telemetry: TelemetryConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Config path: CLI argument > `SNIPER_CONFIG` > default.
    pub fn resolve_path(cli: Option<String>) -> String {
        cli.or_else(|| std::env::var(CONFIG_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &str) -> AppResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Validate values the type system does not rule out.
    pub fn validate(&self) -> AppResult<()> {
        if self.ws_url.trim().is_empty() {
            return Err(AppError::Config("ws_url must not be empty".to_string()));
        }
        if self.markets.is_empty() {
            return Err(AppError::Config("at least one market is required".to_string()));
        }
        for market in &self.markets {
            if market.symbol.trim().is_empty() {
                return Err(AppError::Config("market symbol must not be empty".to_string()));
            }
            if !SUPPORTED_DEPTHS.contains(&market.depth) {
                return Err(AppError::Config(format!(
                    "market {} depth {} not in {:?}",
                    market.symbol, market.depth, SUPPORTED_DEPTHS
                )));
            }
        }
        self.wall.validate()?;
        self.spread.validate()?;
        Ok(())
    }

    /// Where logs go: the configured file, else [`DEFAULT_LOG_FILE`] when the
    /// console view is drawn, else None (stderr).
    pub fn log_file(&self) -> Option<&str> {
        match self.telemetry.log_file.as_deref() {
            Some(path) => Some(path),
            None if self.render.enabled => Some(DEFAULT_LOG_FILE),
            None => None,
        }
    }

    /// Connection settings for the market-data socket.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            url: self.ws_url.clone(),
            reconnect_delay_ms: self.websocket.reconnect_delay_ms,
            keepalive_interval_ms: self.websocket.keepalive_interval_ms,
            connect_timeout_ms: self.websocket.connect_timeout_ms,
            shutdown_timeout_ms: self.websocket.shutdown_timeout_ms,
        }
    }
}

/// Required secrets, read from the environment.
#[derive(Clone)]
pub struct Secrets {
    pub bot_token: String,
    pub chat_id: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl Secrets {
    /// Read both secrets; a missing or blank one is a fatal startup error.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::Config(format!("{key} is not set")))
        };

        Ok(Self {
            bot_token: required(BOT_TOKEN_ENV)?,
            chat_id: required(CHAT_ID_ENV)?,
        })
    }
}
