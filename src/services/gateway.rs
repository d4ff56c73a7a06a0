//! Outbound command gateway for operator actions.
//!
//! Every method is a plain request/response exchange: failures come back as
//! [`GatewayError`] for the caller to surface, and local state is never
//! mutated here; the next inbound stream event is the only thing that does.

use reqwest::Response;

use crate::config::AppConfig;
use crate::dto::event::{DashboardEvent, DispenserSnapshot, GameStateSnapshot, PlayerRecord};
use crate::dto::requests::{StartGameRequest, UpdateDispenserRequest, UpdatePlayerRequest};
use crate::error::GatewayError;
use crate::state::SharedState;

/// Which dispenser group an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispenserKind {
    /// Health stations.
    Health,
    /// Ammo stations.
    Ammo,
}

impl DispenserKind {
    /// Path segment used by the server for this group.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Ammo => "ammo",
        }
    }
}

/// REST client for the arena server's write endpoints.
pub struct CommandGateway {
    http: reqwest::Client,
    base_url: String,
}

impl CommandGateway {
    /// Build a gateway against the configured server.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.server_url.clone(),
        }
    }

    /// `POST /api/game/start`
    pub async fn start_game(&self, request: &StartGameRequest) -> Result<(), GatewayError> {
        let response = self
            .http
            .post(self.url("/api/game/start"))
            .json(request)
            .send()
            .await?;
        check("start game", response).map(drop)
    }

    /// `POST /api/game/end`
    pub async fn end_game(&self) -> Result<(), GatewayError> {
        let response = self.http.post(self.url("/api/game/end")).send().await?;
        check("end game", response).map(drop)
    }

    /// `PUT /api/players/{id}`
    pub async fn update_player(
        &self,
        player_id: u32,
        request: &UpdatePlayerRequest,
    ) -> Result<(), GatewayError> {
        let response = self
            .http
            .put(self.url(&format!("/api/players/{player_id}")))
            .json(request)
            .send()
            .await?;
        check("update player", response).map(drop)
    }

    /// `PUT /api/dispensers/{type}`
    pub async fn update_dispensers(
        &self,
        kind: DispenserKind,
        request: &UpdateDispenserRequest,
    ) -> Result<(), GatewayError> {
        let response = self
            .http
            .put(self.url(&format!("/api/dispensers/{}", kind.as_str())))
            .json(request)
            .send()
            .await?;
        check("update dispensers", response).map(drop)
    }

    /// `GET /api/presets` — names of the saved presets.
    pub async fn list_presets(&self) -> Result<Vec<String>, GatewayError> {
        let response = self.http.get(self.url("/api/presets")).send().await?;
        check("list presets", response)?
            .json()
            .await
            .map_err(|source| GatewayError::Body {
                action: "list presets",
                source,
            })
    }

    /// `POST /api/presets/{name}` — create or update a preset from the
    /// server's current settings.
    pub async fn save_preset(&self, name: &str) -> Result<(), GatewayError> {
        let response = self
            .http
            .post(self.url(&format!("/api/presets/{name}")))
            .send()
            .await?;
        check("save preset", response).map(drop)
    }

    /// `POST /api/presets/{name}/load` — apply a saved preset.
    pub async fn load_preset(&self, name: &str) -> Result<(), GatewayError> {
        let response = self
            .http
            .post(self.url(&format!("/api/presets/{name}/load")))
            .send()
            .await?;
        check("load preset", response).map(drop)
    }

    /// Legacy startup bulk fetch, applied through the normal store merge path
    /// before the stream takes over.
    pub async fn fetch_initial(&self, state: &SharedState) -> Result<(), GatewayError> {
        let game: GameStateSnapshot = self.fetch("game state", "/api/game/state").await?;
        state.apply_event(DashboardEvent::GameState(game)).await;

        let players: Vec<PlayerRecord> = self.fetch("players", "/api/players").await?;
        state.apply_event(DashboardEvent::Players(players)).await;

        let dispensers: DispenserSnapshot = self.fetch("dispensers", "/api/dispensers").await?;
        state
            .apply_event(DashboardEvent::Dispensers(dispensers))
            .await;

        Ok(())
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        action: &'static str,
        path: &str,
    ) -> Result<T, GatewayError> {
        let response = self.http.get(self.url(path)).send().await?;
        check(action, response)?
            .json()
            .await
            .map_err(|source| GatewayError::Body { action, source })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Map any non-success status to a [`GatewayError::Rejected`].
fn check(action: &'static str, response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(GatewayError::Rejected { action, status })
    }
}
