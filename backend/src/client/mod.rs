//! Typed client for the REST API, plus the board submission flow a UI
//! drives once a [`BoardBuilder`](crate::board::BoardBuilder) is complete.

pub mod live;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::{
    board::{BuilderError, FinalizedBoard, SubmitGuard},
    models::{
        BackgroundPreset, BoardCreated, BoardSummary, BoardView, CallRequest, CallResponse,
        CallStatus, CampaignCreated, CampaignResults, CampaignSummary, CampaignView, ItemId,
        LoginRequest, NewCampaign, NewUser, SubmitBoardRequest, TokenResponse, UpdateBoardRequest,
        UpdateUserRequest, UserResponse,
    },
};

pub use live::LiveFeed;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Validation(String),
    #[error("Not signed in: {0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("Live feed error: {0}")]
    LiveFeed(String),
    #[error(transparent)]
    Board(#[from] BuilderError),
}

impl ClientError {
    /// Whether trying again later might succeed. Drives the generic
    /// "please try again" message; nothing retries automatically.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(e) => !e.is_decode() && !e.is_builder(),
            ClientError::Server { .. } | ClientError::LiveFeed(_) => true,
            ClientError::Board(BuilderError::Busy) => true,
            _ => false,
        }
    }

    fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(message)
            }
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            _ => ClientError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Holds the bearer token for one signed-in session. Cloning shares the
/// session.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    token: Arc<RwLock<Option<String>>>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token.into()))),
        }
    }

    pub async fn login(&self, token: String) {
        *self.token.write().await = Some(token);
    }

    pub async fn logout(&self) {
        *self.token.write().await = None;
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: AuthContext,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:3001`
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_auth(base_url, AuthContext::new())
    }

    pub fn with_auth(base_url: impl Into<String>, auth: AuthContext) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/api{}", self.base_url, path))
    }

    async fn dispatch(&self, request: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let request = match self.auth.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|body| body.error)
            .unwrap_or_else(|_| {
                if body.is_empty() {
                    status.to_string()
                } else {
                    body
                }
            });
        tracing::debug!("Request failed with {}: {}", status, message);
        Err(ClientError::from_status(status, message))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.dispatch(self.request(Method::GET, path)).await?;
        Ok(response.json().await?)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .dispatch(self.request(method, path).json(body))
            .await?;
        Ok(response.json().await?)
    }

    // Accounts

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<UserResponse, ClientError> {
        let body = NewUser {
            username: username.to_string(),
            password: password.to_string(),
            display_name: display_name.map(String::from),
        };
        self.send_json(Method::POST, "/users", &body).await
    }

    /// Sign in and keep the token in this client's [`AuthContext`]
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: TokenResponse = self.send_json(Method::POST, "/login", &body).await?;
        self.auth.login(response.token).await;
        Ok(())
    }

    pub async fn logout(&self) {
        self.auth.logout().await;
    }

    pub async fn current_user(&self) -> Result<UserResponse, ClientError> {
        self.get("/users/current").await
    }

    pub async fn update_current_user(
        &self,
        update: &UpdateUserRequest,
    ) -> Result<UserResponse, ClientError> {
        self.send_json(Method::PUT, "/users/current", update).await
    }

    // Campaigns

    pub async fn background_presets(&self) -> Result<Vec<BackgroundPreset>, ClientError> {
        self.get("/background-presets").await
    }

    pub async fn list_campaigns(&self) -> Result<Vec<CampaignSummary>, ClientError> {
        self.get("/campaigns").await
    }

    pub async fn my_campaigns(&self) -> Result<Vec<CampaignSummary>, ClientError> {
        self.get("/campaigns/user").await
    }

    /// Whether a typed code names an active campaign
    pub async fn validate_campaign(&self, code: &str) -> Result<bool, ClientError> {
        match self
            .dispatch(self.request(Method::GET, &format!("/campaigns/validate/{}", code)))
            .await
        {
            Ok(_) => Ok(true),
            Err(ClientError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn get_campaign(&self, code: &str) -> Result<CampaignView, ClientError> {
        self.get(&format!("/campaigns/{}", code)).await
    }

    pub async fn create_campaign(
        &self,
        campaign: &NewCampaign,
    ) -> Result<CampaignSummary, ClientError> {
        let created: CampaignCreated = self
            .send_json(Method::POST, "/campaigns", campaign)
            .await?;
        Ok(created.campaign)
    }

    pub async fn start_campaign(&self, code: &str) -> Result<CampaignSummary, ClientError> {
        self.send_json(Method::POST, &format!("/campaigns/{}/start", code), &())
            .await
    }

    pub async fn call_item(
        &self,
        code: &str,
        item_id: ItemId,
        status: CallStatus,
    ) -> Result<CallResponse, ClientError> {
        let body = CallRequest { item_id, status };
        self.send_json(Method::POST, &format!("/campaigns/{}/call", code), &body)
            .await
    }

    pub async fn campaign_results(&self, code: &str) -> Result<CampaignResults, ClientError> {
        self.get(&format!("/campaigns/{}/results", code)).await
    }

    pub async fn delete_campaign(&self, code: &str) -> Result<(), ClientError> {
        self.dispatch(self.request(Method::DELETE, &format!("/campaigns/{}", code)))
            .await?;
        Ok(())
    }

    // Boards

    /// Post a finalized board; returns its new board code
    pub async fn submit_board(
        &self,
        campaign_code: &str,
        board: &SubmitBoardRequest,
    ) -> Result<String, ClientError> {
        let created: BoardCreated = self
            .send_json(
                Method::POST,
                &format!("/campaigns/{}/board", campaign_code),
                board,
            )
            .await?;
        Ok(created.board_code)
    }

    pub async fn campaign_boards(&self, code: &str) -> Result<Vec<BoardSummary>, ClientError> {
        self.get(&format!("/campaigns/{}/boards", code)).await
    }

    pub async fn list_boards(&self) -> Result<Vec<BoardSummary>, ClientError> {
        self.get("/boards").await
    }

    pub async fn get_board(&self, board_code: &str) -> Result<BoardView, ClientError> {
        self.get(&format!("/boards/{}", board_code)).await
    }

    pub async fn update_board(
        &self,
        board_code: &str,
        board: &UpdateBoardRequest,
    ) -> Result<BoardView, ClientError> {
        self.send_json(Method::PUT, &format!("/boards/{}", board_code), board)
            .await
    }

    /// Open the live feed of a campaign
    pub async fn watch_campaign(&self, code: &str) -> Result<LiveFeed, ClientError> {
        LiveFeed::connect(&self.base_url, code).await
    }
}

/// Anything that can persist a finalized board and hand back its code
#[async_trait]
pub trait BoardSubmitter: Send + Sync {
    async fn submit(
        &self,
        campaign_code: &str,
        board: &SubmitBoardRequest,
    ) -> Result<String, ClientError>;
}

#[async_trait]
impl BoardSubmitter for ApiClient {
    async fn submit(
        &self,
        campaign_code: &str,
        board: &SubmitBoardRequest,
    ) -> Result<String, ClientError> {
        self.submit_board(campaign_code, board).await
    }
}

/// Post a board snapshot taken with
/// [`BoardBuilder::begin_finalize`](crate::board::BoardBuilder::begin_finalize).
///
/// Only the snapshot is borrowed, so the player can keep editing while the
/// request is out; the builder reports busy until `guard` drops here. Hand
/// the returned code to `BoardBuilder::complete` along with the same
/// snapshot. On failure nothing changed locally and the player can retry.
pub async fn finalize_board<S>(
    board: &FinalizedBoard,
    guard: SubmitGuard,
    submitter: &S,
) -> Result<String, ClientError>
where
    S: BoardSubmitter + ?Sized,
{
    let result = submitter.submit(&board.campaign_code, &board.request).await;
    drop(guard);

    match result {
        Ok(board_code) => {
            tracing::info!(
                "Board {} saved for campaign {}",
                board_code,
                board.campaign_code
            );
            Ok(board_code)
        }
        Err(e) => {
            tracing::warn!("Board submission failed: {}", e);
            Err(e)
        }
    }
}
