//! HTTP client for a running league server.
//!
//! Used by the CLI to inspect and steer a season without opening the
//! database directly. Configuration is via environment variables:
//! - `DRAFTLEAGUE_URL` - Base URL (default: `http://localhost:17020/api/v1`)
//! - `DRAFTLEAGUE_API_KEY` - API key for authentication (optional for local)

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::api::middleware::ACTOR_HEADER;
use crate::api::types::{Acting, ActorRequest, AdvancePhase, ErrorBody};
use crate::engine::checkpoint::{CheckpointInfo, RollbackReport};
use crate::models::*;

/// Default URL for local development.
const DEFAULT_URL: &str = "http://localhost:17020/api/v1";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: API key required or invalid")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Server error: {0}")]
    Server(String),
}

#[derive(Debug, Clone)]
pub struct LeagueClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl LeagueClient {
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("DRAFTLEAGUE_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let api_key = std::env::var("DRAFTLEAGUE_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        Self::new(base_url, api_key)
    }

    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// A mutation on behalf of `actor`. The header shows up in server logs.
    fn acting(&self, path: &str, actor: Uuid) -> reqwest::RequestBuilder {
        self.request(Method::POST, path)
            .header(ACTOR_HEADER, actor.to_string())
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        Err(match status {
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::BadRequest(message)
            }
            StatusCode::CONFLICT => ClientError::Conflict(message),
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            _ => ClientError::Server(format!("{}: {}", status, message)),
        })
    }

    // ============================================================
    // Server
    // ============================================================

    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let response = self.request(Method::GET, "/health").send().await?;
        self.handle_response(response).await
    }

    // ============================================================
    // Season
    // ============================================================

    pub async fn season(&self, season_id: Uuid) -> Result<SeasonOverview, ClientError> {
        let response = self
            .request(Method::GET, &format!("/seasons/{}", season_id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn standings(&self, season_id: Uuid) -> Result<Vec<SeasonPlayer>, ClientError> {
        let response = self
            .request(Method::GET, &format!("/seasons/{}/standings", season_id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn advance_phase(
        &self,
        season_id: Uuid,
        target: &str,
        actor: Uuid,
    ) -> Result<Season, ClientError> {
        let body = Acting::new(
            actor,
            AdvancePhase {
                target: target.to_string(),
            },
        );
        let response = self
            .acting(&format!("/seasons/{}/phase/advance", season_id), actor)
            .json(&body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn start_week(&self, season_id: Uuid, actor: Uuid) -> Result<Season, ClientError> {
        let response = self
            .acting(&format!("/seasons/{}/weeks/start", season_id), actor)
            .json(&ActorRequest {
                requesting_actor_id: actor,
            })
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn draft_board(&self, season_id: Uuid) -> Result<DraftBoard, ClientError> {
        let response = self
            .request(Method::GET, &format!("/seasons/{}/draft", season_id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn events(
        &self,
        season_id: Uuid,
        week: Option<u32>,
    ) -> Result<Vec<EventEntry>, ClientError> {
        let mut req = self.request(Method::GET, &format!("/seasons/{}/events", season_id));
        if let Some(week) = week {
            req = req.query(&[("week", week)]);
        }
        let response = req.send().await?;
        self.handle_response(response).await
    }

    // ============================================================
    // Checkpoints
    // ============================================================

    pub async fn checkpoints(&self, season_id: Uuid) -> Result<Vec<CheckpointInfo>, ClientError> {
        let response = self
            .request(Method::GET, &format!("/seasons/{}/checkpoints", season_id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn rollback(
        &self,
        season_id: Uuid,
        checkpoint: &str,
        actor: Uuid,
    ) -> Result<RollbackReport, ClientError> {
        let response = self
            .acting(
                &format!("/seasons/{}/checkpoints/{}/rollback", season_id, checkpoint),
                actor,
            )
            .json(&ActorRequest {
                requesting_actor_id: actor,
            })
            .send()
            .await?;
        self.handle_response(response).await
    }
}
