use crate::{
    auth::AuthenticatedUser,
    board::rules,
    db,
    error::{ApiJson, AppError, AppResult},
    models::{
        preset::BACKGROUND_PRESETS, BackgroundPreset, BoardSize, CallRequest, CallResponse,
        CampaignCreated, CampaignDraft, CampaignResults, CampaignRow, CampaignSummary,
        CampaignView, NewCampaign,
    },
    utils::codes::{generate_campaign_code, normalize_code, MAX_CODE_ATTEMPTS},
    websocket::messages::ServerMessage,
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Look up an active campaign by the code a user typed
pub(crate) async fn find_campaign(pool: &SqlitePool, code: &str) -> AppResult<CampaignRow> {
    db::queries::get_campaign_by_code(pool, &normalize_code(code))
        .await?
        .ok_or(AppError::NotFound("Campaign"))
}

fn ensure_creator(campaign: &CampaignRow, user: &AuthenticatedUser) -> AppResult<()> {
    if campaign.creator_id != user.id() {
        tracing::warn!(
            "User {} tried to moderate campaign {} they did not create",
            user.username(),
            campaign.code
        );
        return Err(AppError::Forbidden("Only the campaign creator can do that"));
    }
    Ok(())
}

pub async fn background_presets() -> Json<Vec<BackgroundPreset>> {
    Json(BACKGROUND_PRESETS.clone())
}

/// Browse active campaigns
pub async fn list_campaigns(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<CampaignSummary>>> {
    Ok(Json(db::queries::list_active_campaigns(&state.db).await?))
}

/// Campaigns created by the caller
pub async fn my_campaigns(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<CampaignSummary>>> {
    Ok(Json(
        db::queries::list_campaigns_by_creator(&state.db, user.id()).await?,
    ))
}

pub async fn validate_campaign(
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Value>> {
    find_campaign(&state.db, &code).await?;
    Ok(Json(json!({ "valid": true })))
}

pub async fn get_campaign(
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<CampaignView>> {
    let campaign = find_campaign(&state.db, &code).await?;
    Ok(Json(db::queries::campaign_view(&state.db, &campaign).await?))
}

pub async fn create_campaign(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NewCampaign>,
) -> AppResult<(StatusCode, Json<CampaignCreated>)> {
    let draft = rules::validate_new_campaign(payload, String::new())?;

    let pool = &state.db;
    let creator = user.id();
    let insert = move |code: String| {
        let draft = CampaignDraft {
            code,
            ..draft.clone()
        };
        async move { db::queries::create_campaign(pool, creator, &draft).await }
    };
    let campaign = db::insert_with_fresh_code(MAX_CODE_ATTEMPTS, generate_campaign_code, insert)
        .await?
        .ok_or_else(|| {
            AppError::Internal("Could not allocate an unused campaign code".to_string())
        })?;
    let view = db::queries::campaign_view(&state.db, &campaign).await?;

    tracing::info!(
        "User {} created campaign {} \"{}\"",
        user.username(),
        view.code,
        view.title
    );

    Ok((
        StatusCode::CREATED,
        Json(CampaignCreated {
            campaign: view.summary(),
        }),
    ))
}

/// Open the campaign for calls
pub async fn start_campaign(
    user: AuthenticatedUser,
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<CampaignSummary>> {
    let campaign = find_campaign(&state.db, &code).await?;
    ensure_creator(&campaign, &user)?;

    let started_at = db::queries::mark_campaign_started(&state.db, campaign.id).await?;
    if campaign.started_at.is_none() {
        state
            .feeds
            .publish(&campaign.code, ServerMessage::CampaignStarted { started_at });
        tracing::info!("Campaign {} started", campaign.code);
    }

    let view = db::queries::campaign_view(&state.db, &campaign).await?;
    let mut summary = view.summary();
    summary.started = true;
    Ok(Json(summary))
}

/// Moderator call on one item. `pending` undoes an earlier call.
pub async fn call_item(
    user: AuthenticatedUser,
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CallRequest>,
) -> AppResult<Json<CallResponse>> {
    let campaign = find_campaign(&state.db, &code).await?;
    ensure_creator(&campaign, &user)?;

    let updated =
        db::queries::set_item_status(&state.db, campaign.id, payload.item_id, payload.status)
            .await?;
    if !updated {
        return Err(AppError::NotFound("Item"));
    }

    let watching = state.feeds.publish(
        &campaign.code,
        ServerMessage::ItemCalled {
            item_id: payload.item_id,
            status: payload.status,
        },
    );
    tracing::info!(
        "Campaign {}: item {} called {:?} ({} watching)",
        campaign.code,
        payload.item_id,
        payload.status,
        watching
    );

    Ok(Json(CallResponse {
        item_id: payload.item_id,
        status: payload.status,
    }))
}

pub async fn campaign_results(
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<CampaignResults>> {
    let campaign = find_campaign(&state.db, &code).await?;
    let standings = db::queries::campaign_standings(&state.db, &campaign).await?;
    let goal = BoardSize::from_stored(campaign.board_size)
        .map(|size| size.goal().to_string())
        .unwrap_or_default();

    Ok(Json(CampaignResults {
        campaign_code: campaign.code,
        goal,
        standings,
    }))
}

/// Soft delete; the campaign and its boards disappear from every listing
pub async fn delete_campaign(
    user: AuthenticatedUser,
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> AppResult<StatusCode> {
    let campaign = find_campaign(&state.db, &code).await?;
    ensure_creator(&campaign, &user)?;

    db::queries::deactivate_campaign(&state.db, campaign.id).await?;
    state
        .feeds
        .publish(&campaign.code, ServerMessage::CampaignClosed);

    tracing::info!("User {} deleted campaign {}", user.username(), campaign.code);

    Ok(StatusCode::NO_CONTENT)
}
