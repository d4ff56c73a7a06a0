//! Request bodies for the command gateway.
//!
//! These mirror the server's REST contracts exactly; the gateway never
//! invents fields and never mutates local state on the way out.

use serde::Serialize;

/// Body of `POST /api/game/start`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameRequest {
    /// Game duration in minutes.
    pub time_limit: u32,
    /// Frag count that ends the game.
    pub frag_limit: u32,
    /// Whether the game restricts players to the two canonical teams.
    pub team_play: bool,
}

/// Body of `PUT /api/players/{id}`.
///
/// Every field is optional; the server only touches the ones present.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlayerRequest {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New team assignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i64>,
    /// New per-hit damage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<i32>,
    /// New magazine capacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullets_max: Option<i32>,
}

/// Body of `PUT /api/dispensers/{type}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateDispenserRequest {
    /// New cooldown between dispenses, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// New amount granted per dispense.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_game_serializes_with_camel_case_keys() {
        let body = StartGameRequest {
            time_limit: 15,
            frag_limit: 10,
            team_play: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"timeLimit": 15, "fragLimit": 10, "teamPlay": true})
        );
    }

    #[test]
    fn update_player_omits_untouched_fields() {
        let body = UpdatePlayerRequest {
            damage: Some(12),
            ..Default::default()
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"damage": 12}));
    }
}
