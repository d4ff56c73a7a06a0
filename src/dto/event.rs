//! Inbound event payload shapes and the per-event-type decoder.
//!
//! Each SSE frame carries an event name and a JSON body; [`DashboardEvent::decode`]
//! maps the pair into a typed event. Decoding one event is isolated: a failure
//! never affects the subscription or any previously applied state.

use serde::Deserialize;
use serde_json::Value;

use crate::error::DecodeError;

const EVENT_IS_PLAYING: &str = "isPlaying";
const EVENT_TIME_LEFT: &str = "timeLeft";
const EVENT_PLAYERS: &str = "players";
const EVENT_DISPENSERS: &str = "dispensers";
const EVENT_SETTINGS: &str = "settings";
const EVENT_LOG: &str = "log";
const EVENT_GAME_STATE: &str = "game-state";

/// A decoded inbound event, ready to be applied to the view model store.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Explicit playing flag from the server.
    IsPlaying(bool),
    /// Seconds remaining in the current game.
    TimeLeft(u64),
    /// Full replacement list of player records.
    Players(Vec<PlayerRecord>),
    /// Full replacement snapshot of dispenser status.
    Dispensers(DispenserSnapshot),
    /// Full replacement settings snapshot.
    Settings(SettingsSnapshot),
    /// One leveled log line to append.
    Log(String),
    /// Legacy full game-state snapshot, sent by older servers at startup.
    GameState(GameStateSnapshot),
}

impl DashboardEvent {
    /// Decode an SSE frame into a typed event.
    ///
    /// Returns [`DecodeError::UnknownEvent`] for names this console does not
    /// handle; callers drop those at debug level so newer servers can add
    /// event types without breaking older consoles.
    pub fn decode(event: &str, data: &str) -> Result<Self, DecodeError> {
        match event {
            EVENT_IS_PLAYING => serde_json::from_str(data)
                .map(Self::IsPlaying)
                .map_err(|err| DecodeError::payload(EVENT_IS_PLAYING, err)),
            EVENT_TIME_LEFT => decode_time_left(data).map(Self::TimeLeft),
            EVENT_PLAYERS => serde_json::from_str(data)
                .map(Self::Players)
                .map_err(|err| DecodeError::payload(EVENT_PLAYERS, err)),
            EVENT_DISPENSERS => serde_json::from_str(data)
                .map(Self::Dispensers)
                .map_err(|err| DecodeError::payload(EVENT_DISPENSERS, err)),
            EVENT_SETTINGS => serde_json::from_str(data)
                .map(Self::Settings)
                .map_err(|err| DecodeError::payload(EVENT_SETTINGS, err)),
            EVENT_LOG => serde_json::from_str(data)
                .map(Self::Log)
                .map_err(|err| DecodeError::payload(EVENT_LOG, err)),
            EVENT_GAME_STATE => serde_json::from_str(data)
                .map(Self::GameState)
                .map_err(|err| DecodeError::payload(EVENT_GAME_STATE, err)),
            other => Err(DecodeError::UnknownEvent(other.to_string())),
        }
    }
}

/// The server emits `timeLeft` either as a JSON number or as a decimal string.
fn decode_time_left(data: &str) -> Result<u64, DecodeError> {
    let value: Value =
        serde_json::from_str(data).map_err(|err| DecodeError::payload(EVENT_TIME_LEFT, err))?;
    match value {
        Value::Number(num) => num
            .as_f64()
            .filter(|secs| *secs >= 0.0)
            .map(|secs| secs as u64)
            .ok_or_else(|| DecodeError::TimeLeft(num.to_string())),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|secs| *secs >= 0.0)
            .map(|secs| secs as u64)
            .ok_or(DecodeError::TimeLeft(text)),
        other => Err(DecodeError::TimeLeft(other.to_string())),
    }
}

/// One player entry of a `players` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    /// Stable player identity; the merge key for the edit shield.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Assigned team id; negative or absent means unassigned.
    #[serde(default)]
    pub team_id: Option<i64>,
    /// Damage dealt per hit.
    #[serde(default)]
    pub damage: i32,
    /// Magazine capacity.
    #[serde(default)]
    pub bullets_max: i32,
    /// Current frag count.
    #[serde(default)]
    pub score: i32,
    /// Remaining health points.
    #[serde(default)]
    pub health: i32,
    /// Whether the player's vest is currently reachable.
    #[serde(default)]
    pub online: bool,
}

/// One dispenser entry of a `dispensers` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispenserRecord {
    /// Stable dispenser identity.
    pub id: u32,
    /// Whether the station is currently reachable.
    #[serde(default)]
    pub online: bool,
    /// Amount of health or ammo granted per dispense.
    #[serde(default)]
    pub amount: i32,
    /// Cooldown between dispenses, in seconds.
    #[serde(default)]
    pub dispense_timeout_sec: i32,
}

/// Payload of a `dispensers` event: both station groups, fully replacing state.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DispenserSnapshot {
    /// Health station statuses.
    #[serde(default)]
    pub health: Vec<DispenserRecord>,
    /// Ammo station statuses.
    #[serde(default)]
    pub ammo: Vec<DispenserRecord>,
}

/// Game mode as configured on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum GameType {
    /// Free-for-all deathmatch.
    #[default]
    #[serde(rename = "DM")]
    Deathmatch,
    /// Two-team deathmatch.
    #[serde(rename = "TEAM_DM")]
    TeamDeathmatch,
    /// Capture the flag, also two-team.
    #[serde(rename = "CTF")]
    CaptureTheFlag,
}

impl GameType {
    /// Whether this mode restricts players to the two canonical teams.
    pub fn is_team_based(self) -> bool {
        matches!(self, Self::TeamDeathmatch | Self::CaptureTheFlag)
    }
}

/// The `general` block of a settings snapshot.
///
/// Older servers send a `teamPlay` boolean instead of a `gameType` name; both
/// are accepted, with `gameType` taking precedence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettings {
    /// Frag count that ends the game.
    #[serde(default = "default_frag_limit")]
    pub frag_limit: u32,
    /// Game duration in minutes.
    #[serde(default = "default_time_limit_minutes")]
    pub time_limit_minutes: u32,
    #[serde(default)]
    game_type: Option<GameType>,
    #[serde(default)]
    team_play: Option<bool>,
}

impl GeneralSettings {
    /// Effective game mode, resolving the legacy `teamPlay` flag.
    pub fn game_type(&self) -> GameType {
        match (self.game_type, self.team_play) {
            (Some(mode), _) => mode,
            (None, Some(true)) => GameType::TeamDeathmatch,
            _ => GameType::Deathmatch,
        }
    }
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            frag_limit: default_frag_limit(),
            time_limit_minutes: default_time_limit_minutes(),
            game_type: None,
            team_play: None,
        }
    }
}

/// Timeout/amount tuning for one dispenser group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DispenserTuning {
    /// Cooldown between dispenses, in seconds.
    #[serde(default = "default_dispenser_timeout")]
    pub timeout: u32,
    /// Amount granted per dispense.
    #[serde(default = "default_dispenser_amount")]
    pub amount: u32,
}

impl Default for DispenserTuning {
    fn default() -> Self {
        Self {
            timeout: default_dispenser_timeout(),
            amount: default_dispenser_amount(),
        }
    }
}

/// Tuning for both dispenser groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct DispenserTuningSet {
    /// Health station tuning.
    #[serde(default)]
    pub health: DispenserTuning,
    /// Ammo station tuning.
    #[serde(default)]
    pub ammo: DispenserTuning,
}

/// Payload of a `settings` event, fully replacing the settings view.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    /// General game parameters.
    #[serde(default)]
    pub general: GeneralSettings,
    /// Dispenser tuning for both groups.
    #[serde(default)]
    pub dispensers: DispenserTuningSet,
    /// Name of the preset these settings were loaded from, when any.
    #[serde(default)]
    pub preset_name: Option<String>,
}

/// Payload of a legacy `game-state` event.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateSnapshot {
    /// Whether a game is currently running.
    #[serde(default)]
    pub playing: bool,
    /// Seconds remaining in the current game.
    #[serde(default)]
    pub time_left_seconds: u64,
    /// Server-computed team totals, keyed by team id.
    #[serde(default)]
    pub team_scores: indexmap::IndexMap<u32, i64>,
}

fn default_frag_limit() -> u32 {
    10
}

fn default_time_limit_minutes() -> u32 {
    15
}

fn default_dispenser_timeout() -> u32 {
    60
}

fn default_dispenser_amount() -> u32 {
    40
}
