//! Console configuration loading, including the team roster used for display.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the console looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/console.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LASERTAG_CONSOLE_CONFIG_PATH";
/// Environment variable that overrides the configured server base URL.
const SERVER_URL_ENV: &str = "LASERTAG_SERVER_URL";
/// Base URL used when neither the config file nor the environment provide one.
const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
/// Delay between a stream drop and the single scheduled reconnect attempt.
const DEFAULT_RECONNECT_DELAY_SECS: u64 = 3;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the console.
pub struct AppConfig {
    /// Base URL of the arena server, without a trailing slash.
    pub server_url: String,
    /// Delay before the single reconnect attempt after a stream drop.
    pub reconnect_delay: Duration,
    teams: Vec<TeamStyle>,
}

/// Display metadata for one team slot, indexed by team id.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TeamStyle {
    /// Human-readable team name.
    pub name: String,
    /// Background color as a hex string.
    pub color: String,
    /// Foreground color as a hex string.
    #[serde(rename = "textColor")]
    pub text_color: String,
}

impl AppConfig {
    /// Load the console configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        Self::load_from(&resolve_config_path()).with_env_overrides()
    }

    /// Read and parse one candidate config file; any failure yields defaults.
    fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded console config");
                    raw.into()
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Display style for the given team id, or a neutral gray fallback.
    pub fn team_style(&self, team_id: u32) -> TeamStyle {
        self.teams
            .get(team_id as usize)
            .cloned()
            .unwrap_or_else(|| TeamStyle {
                name: "Unknown".into(),
                color: "#888888".into(),
                text_color: "#000000".into(),
            })
    }

    /// Human-readable name for the given team id.
    pub fn team_name(&self, team_id: u32) -> String {
        self.team_style(team_id).name
    }

    /// URL of the SSE events endpoint.
    pub fn events_url(&self) -> String {
        format!("{}/api/events", self.server_url)
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var(SERVER_URL_ENV)
            && !url.is_empty()
        {
            self.server_url = url.trim_end_matches('/').to_string();
        }
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            reconnect_delay: Duration::from_secs(DEFAULT_RECONNECT_DELAY_SECS),
            teams: default_teams(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(rename = "serverUrl")]
    server_url: Option<String>,
    #[serde(rename = "reconnectDelaySecs")]
    reconnect_delay_secs: Option<u64>,
    teams: Option<Vec<TeamStyle>>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            server_url: value
                .server_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.server_url),
            reconnect_delay: value
                .reconnect_delay_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.reconnect_delay),
            teams: value.teams.unwrap_or(defaults.teams),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in team roster shipped with the binary.
fn default_teams() -> Vec<TeamStyle> {
    [
        ("Red", "#DC143C", "#FFFFFF"),
        ("Blue", "#1E90FF", "#FFFFFF"),
        ("Green", "#32CD32", "#000000"),
        ("Yellow", "#FFD700", "#000000"),
        ("Magenta", "#FF00FF", "#FFFFFF"),
        ("Cyan", "#00CED1", "#000000"),
    ]
    .into_iter()
    .map(|(name, color, text_color)| TeamStyle {
        name: name.into(),
        color: color.into(),
        text_color: text_color.into(),
    })
    .collect()
}
