//! The console view model and the merge policy for inbound events.
//!
//! [`ViewModel::apply`] is the single mutation point: every decoded event
//! flows through it, in transport delivery order, and team scores are
//! recomputed in the same step so they are never observed stale relative to
//! the player list.

use indexmap::IndexMap;

use crate::dto::event::{
    DashboardEvent, DispenserRecord, DispenserSnapshot, GameType, PlayerRecord, SettingsSnapshot,
};
use crate::state::edit::{EditTracker, PlayerField};
use crate::state::ranking::{self, RankingScope};

/// Live game status shown in the console header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameState {
    /// Whether a game is currently running.
    ///
    /// Last-write-wins between explicit `isPlaying` events and the inference
    /// drawn from timer ticks (`time_left_seconds > 0`).
    pub playing: bool,
    /// Seconds remaining in the current game.
    pub time_left_seconds: u64,
    /// Derived team ranking, highest total first.
    pub team_scores: IndexMap<u32, i64>,
}

/// One player row of the console table.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Stable identity; the merge key.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Team assignment; `None` means unassigned.
    pub team_id: Option<u32>,
    /// Damage dealt per hit.
    pub damage: i32,
    /// Magazine capacity.
    pub bullets_max: i32,
    /// Current frag count.
    pub score: i32,
    /// Remaining health points.
    pub health: i32,
    /// Whether the player's vest is currently reachable.
    pub online: bool,
}

impl From<PlayerRecord> for Player {
    fn from(record: PlayerRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            // Negative wire values are the unassigned sentinel.
            team_id: record
                .team_id
                .and_then(|id| u32::try_from(id).ok()),
            damage: record.damage,
            bullets_max: record.bullets_max,
            score: record.score,
            health: record.health,
            online: record.online,
        }
    }
}

/// One dispenser row of the console table.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispenser {
    /// Stable identity.
    pub id: u32,
    /// Whether the station is currently reachable.
    pub online: bool,
    /// Amount granted per dispense.
    pub amount: i32,
    /// Cooldown between dispenses, in seconds.
    pub dispense_timeout_sec: i32,
}

impl From<DispenserRecord> for Dispenser {
    fn from(record: DispenserRecord) -> Self {
        Self {
            id: record.id,
            online: record.online,
            amount: record.amount,
            dispense_timeout_sec: record.dispense_timeout_sec,
        }
    }
}

/// Both dispenser groups; replaced wholesale on every `dispensers` event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispenserSet {
    /// Health stations.
    pub health: Vec<Dispenser>,
    /// Ammo stations.
    pub ammo: Vec<Dispenser>,
}

impl DispenserSet {
    /// Ids of health stations currently online.
    pub fn online_health_ids(&self) -> Vec<u32> {
        self.health.iter().filter(|d| d.online).map(|d| d.id).collect()
    }

    /// Ids of ammo stations currently online.
    pub fn online_ammo_ids(&self) -> Vec<u32> {
        self.ammo.iter().filter(|d| d.online).map(|d| d.id).collect()
    }
}

impl From<DispenserSnapshot> for DispenserSet {
    fn from(snapshot: DispenserSnapshot) -> Self {
        Self {
            health: snapshot.health.into_iter().map(Into::into).collect(),
            ammo: snapshot.ammo.into_iter().map(Into::into).collect(),
        }
    }
}

/// The whole console view, owned exclusively by the store.
#[derive(Debug, Default)]
pub struct ViewModel {
    /// Live game status.
    pub game: GameState,
    /// Player table, replaced (with the edit shield) on every `players` event.
    pub players: Vec<Player>,
    /// Dispenser tables, replaced on every `dispensers` event.
    pub dispensers: DispenserSet,
    /// Current settings, replaced on every `settings` event.
    pub settings: SettingsSnapshot,
    /// Name of the preset last reported by the server; survives settings
    /// snapshots whose `presetName` is empty.
    pub selected_preset: Option<String>,
    /// Scrolling log, append-only until [`ViewModel::clear_logs`].
    pub logs: Vec<String>,
}

impl ViewModel {
    /// Apply one decoded event, consulting the edit tracker for merge policy.
    pub fn apply(&mut self, event: DashboardEvent, edit: &EditTracker) {
        match event {
            DashboardEvent::IsPlaying(playing) => self.game.playing = playing,
            DashboardEvent::TimeLeft(seconds) => {
                self.game.time_left_seconds = seconds;
                // A timer tick implies the game is running iff time remains.
                self.game.playing = seconds > 0;
            }
            DashboardEvent::Players(records) => {
                self.merge_players(records, edit);
                self.refresh_team_scores();
            }
            DashboardEvent::Dispensers(snapshot) => self.dispensers = snapshot.into(),
            DashboardEvent::Settings(snapshot) => {
                if let Some(name) = snapshot
                    .preset_name
                    .as_ref()
                    .filter(|name| !name.is_empty())
                {
                    self.selected_preset = Some(name.clone());
                }
                self.settings = snapshot;
                // The ranking scope depends on the game mode.
                self.refresh_team_scores();
            }
            DashboardEvent::Log(line) => self.logs.push(line),
            DashboardEvent::GameState(snapshot) => {
                self.game.playing = snapshot.playing;
                self.game.time_left_seconds = snapshot.time_left_seconds;
                self.game.team_scores = snapshot.team_scores;
            }
        }
    }

    /// Drop the scrolling log. Explicit operator action, never automatic.
    pub fn clear_logs(&mut self) {
        self.logs.clear();
    }

    /// Effective game mode from the current settings.
    pub fn game_type(&self) -> GameType {
        self.settings.general.game_type()
    }

    /// Replace the player collection with an incoming snapshot.
    ///
    /// When the tracker holds an intent for one of the incoming players, that
    /// single field keeps its current local value; every other field of every
    /// record takes the server's fresh value. Unknown ids are accepted as new
    /// players, and the old collection is discarded.
    fn merge_players(&mut self, records: Vec<PlayerRecord>, edit: &EditTracker) {
        let intent = edit.active();
        let mut next: Vec<Player> = Vec::with_capacity(records.len());

        for record in records {
            let mut player: Player = record.into();
            if let Some(intent) = intent
                && intent.player_id == player.id
                && let Some(existing) = self.players.iter().find(|p| p.id == player.id)
            {
                shield_field(&mut player, existing, intent.field);
            }
            next.push(player);
        }

        self.players = next;
    }

    fn refresh_team_scores(&mut self) {
        let scope = RankingScope::from(self.game_type());
        self.game.team_scores = ranking::team_scores(&self.players, scope);
    }
}

/// Copy the one shielded field's local value over the incoming record.
fn shield_field(incoming: &mut Player, existing: &Player, field: PlayerField) {
    match field {
        PlayerField::Name => incoming.name = existing.name.clone(),
        PlayerField::TeamId => incoming.team_id = existing.team_id,
        PlayerField::Damage => incoming.damage = existing.damage,
        PlayerField::BulletsMax => incoming.bullets_max = existing.bullets_max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::edit::EditIntent;

    fn record(id: u32, name: &str, team_id: i64, score: i32) -> PlayerRecord {
        PlayerRecord {
            id,
            name: name.into(),
            team_id: Some(team_id),
            damage: 10,
            bullets_max: 40,
            score,
            health: 100,
            online: true,
        }
    }

    fn players_event(records: Vec<PlayerRecord>) -> DashboardEvent {
        DashboardEvent::Players(records)
    }

    #[test]
    fn time_left_infers_playing_flag() {
        let mut vm = ViewModel::default();
        let edit = EditTracker::default();

        vm.apply(DashboardEvent::IsPlaying(false), &edit);
        vm.apply(DashboardEvent::TimeLeft(42), &edit);
        assert!(vm.game.playing, "non-zero timer overrides stale isPlaying");
        assert_eq!(vm.game.time_left_seconds, 42);

        vm.apply(DashboardEvent::TimeLeft(0), &edit);
        assert!(!vm.game.playing);
    }

    #[test]
    fn players_event_replaces_collection_and_reranks() {
        let mut vm = ViewModel::default();
        let edit = EditTracker::default();

        vm.apply(
            players_event(vec![
                record(1, "a", 0, 5),
                record(2, "b", 1, 9),
                record(3, "c", 0, 2),
            ]),
            &edit,
        );
        assert_eq!(vm.players.len(), 3);
        assert_eq!(
            vm.game.team_scores.iter().collect::<Vec<_>>(),
            vec![(&1, &9), (&0, &7)]
        );
    }

    #[test]
    fn active_edit_shields_exactly_one_field() {
        let mut vm = ViewModel::default();
        let mut edit = EditTracker::default();

        vm.apply(players_event(vec![record(1, "Alice", 0, 0)]), &edit);
        edit.begin_edit(EditIntent::new(1, PlayerField::Name));

        let mut incoming = record(1, "Renamed", 2, 8);
        incoming.damage = 99;
        vm.apply(players_event(vec![incoming]), &edit);

        let player = &vm.players[0];
        assert_eq!(player.name, "Alice", "focused field keeps local value");
        assert_eq!(player.team_id, Some(2), "other fields take server values");
        assert_eq!(player.damage, 99);
        assert_eq!(player.score, 8);
    }

    #[test]
    fn edit_shield_survives_repeated_snapshots() {
        let mut vm = ViewModel::default();
        let mut edit = EditTracker::default();

        vm.apply(players_event(vec![record(1, "Alice", 0, 0)]), &edit);
        edit.begin_edit(EditIntent::new(1, PlayerField::Damage));

        for score in 1..=5 {
            let mut incoming = record(1, "Alice", 0, score);
            incoming.damage = score;
            vm.apply(players_event(vec![incoming]), &edit);
            assert_eq!(vm.players[0].damage, 10);
            assert_eq!(vm.players[0].score, score);
        }
    }

    #[test]
    fn edit_on_unknown_player_accepts_record_as_is() {
        let mut vm = ViewModel::default();
        let mut edit = EditTracker::default();
        edit.begin_edit(EditIntent::new(9, PlayerField::Name));

        vm.apply(players_event(vec![record(9, "Fresh", 1, 3)]), &edit);
        assert_eq!(vm.players[0].name, "Fresh");
    }

    #[test]
    fn negative_team_id_normalizes_to_unassigned() {
        let mut vm = ViewModel::default();
        let edit = EditTracker::default();
        vm.apply(players_event(vec![record(1, "a", -1, 5)]), &edit);
        assert_eq!(vm.players[0].team_id, None);
        assert!(vm.game.team_scores.is_empty());
    }

    #[test]
    fn team_based_settings_restrict_ranking_to_canonical_pair() {
        let mut vm = ViewModel::default();
        let edit = EditTracker::default();

        vm.apply(
            players_event(vec![
                record(1, "a", 0, 4),
                record(2, "b", 1, 6),
                record(3, "c", 5, 99),
            ]),
            &edit,
        );
        assert_eq!(vm.game.team_scores.len(), 3);

        let settings: SettingsSnapshot = serde_json::from_str(
            r#"{"general": {"gameType": "TEAM_DM"}}"#,
        )
        .unwrap();
        vm.apply(DashboardEvent::Settings(settings), &edit);
        assert_eq!(
            vm.game.team_scores.iter().collect::<Vec<_>>(),
            vec![(&1, &6), (&0, &4)]
        );
    }

    #[test]
    fn settings_preset_name_updates_indicator_only_when_non_empty() {
        let mut vm = ViewModel::default();
        let edit = EditTracker::default();

        let named: SettingsSnapshot =
            serde_json::from_str(r#"{"presetName": "friday-night"}"#).unwrap();
        vm.apply(DashboardEvent::Settings(named), &edit);
        assert_eq!(vm.selected_preset.as_deref(), Some("friday-night"));

        let unnamed: SettingsSnapshot = serde_json::from_str(r#"{"presetName": ""}"#).unwrap();
        vm.apply(DashboardEvent::Settings(unnamed), &edit);
        assert_eq!(
            vm.selected_preset.as_deref(),
            Some("friday-night"),
            "empty preset name leaves the indicator alone"
        );
    }

    #[test]
    fn logs_append_in_arrival_order_and_clear_explicitly() {
        let mut vm = ViewModel::default();
        let edit = EditTracker::default();

        for i in 0..1000 {
            vm.apply(DashboardEvent::Log(format!("INFO line {i}")), &edit);
        }
        assert_eq!(vm.logs.len(), 1000);
        assert_eq!(vm.logs[0], "INFO line 0");
        assert_eq!(vm.logs[999], "INFO line 999");

        vm.clear_logs();
        assert!(vm.logs.is_empty());
    }

    #[test]
    fn legacy_game_state_snapshot_does_not_touch_players_or_dispensers() {
        let mut vm = ViewModel::default();
        let edit = EditTracker::default();
        vm.apply(players_event(vec![record(1, "a", 0, 5)]), &edit);

        let snapshot = serde_json::from_str(
            r#"{"playing": true, "timeLeftSeconds": 120, "teamScores": {"0": 5}}"#,
        )
        .unwrap();
        vm.apply(DashboardEvent::GameState(snapshot), &edit);

        assert!(vm.game.playing);
        assert_eq!(vm.game.time_left_seconds, 120);
        assert_eq!(vm.players.len(), 1);
        assert!(vm.dispensers.health.is_empty());
    }

    #[test]
    fn dispensers_snapshot_replaces_wholesale() {
        let mut vm = ViewModel::default();
        let edit = EditTracker::default();

        let first: DispenserSnapshot = serde_json::from_str(
            r#"{"health": [{"id": 1, "online": true}], "ammo": [{"id": 2, "online": false}]}"#,
        )
        .unwrap();
        vm.apply(DashboardEvent::Dispensers(first), &edit);
        assert_eq!(vm.dispensers.online_health_ids(), vec![1]);
        assert!(vm.dispensers.online_ammo_ids().is_empty());

        let second: DispenserSnapshot =
            serde_json::from_str(r#"{"ammo": [{"id": 3, "online": true}]}"#).unwrap();
        vm.apply(DashboardEvent::Dispensers(second), &edit);
        assert!(vm.dispensers.health.is_empty());
        assert_eq!(vm.dispensers.online_ammo_ids(), vec![3]);
    }
}
