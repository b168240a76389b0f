use crate::{
    auth::AuthenticatedUser,
    board::{rules, CampaignLayout},
    db,
    error::{ApiJson, AppError, AppResult},
    models::{
        BoardCreated, BoardSummary, BoardView, CampaignView, SubmitBoardRequest, TileSubmission,
        UpdateBoardRequest,
    },
    routes::campaigns::find_campaign,
    utils::codes::{generate_board_code, normalize_code, MAX_CODE_ATTEMPTS},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// Validate a tile list against the campaign and put it in storage order.
/// The center tile shows the player's name unless it carries its own text.
fn checked_tiles(
    campaign: &CampaignView,
    player_name: &str,
    tiles: Vec<TileSubmission>,
) -> AppResult<Vec<TileSubmission>> {
    let layout = CampaignLayout::from_view(campaign);
    rules::validate_tiles(&layout, player_name, &tiles)?;

    let mut tiles: Vec<TileSubmission> = tiles
        .into_iter()
        .map(|mut tile| {
            tile.custom_text = tile
                .custom_text
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty());
            if tile.is_center && tile.custom_text.is_none() {
                tile.custom_text = Some(player_name.to_string());
            }
            tile
        })
        .collect();
    tiles.sort_by_key(|tile| tile.position);
    Ok(tiles)
}

/// Store a finalized board
pub async fn submit_board(
    user: AuthenticatedUser,
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<SubmitBoardRequest>,
) -> AppResult<(StatusCode, Json<BoardCreated>)> {
    let campaign = find_campaign(&state.db, &code).await?;
    let view = db::queries::campaign_view(&state.db, &campaign).await?;

    let player_name = payload.player_name.trim().to_string();
    let tiles = checked_tiles(&view, &player_name, payload.selected_tiles)?;

    let pool = &state.db;
    let (campaign_id, user_id) = (campaign.id, user.id());
    let (name, tiles) = (player_name.as_str(), tiles.as_slice());
    let insert = move |code: String| async move {
        db::queries::create_board(pool, campaign_id, user_id, &code, name, tiles).await
    };
    let board = db::insert_with_fresh_code(MAX_CODE_ATTEMPTS, generate_board_code, insert)
        .await?
        .ok_or_else(|| AppError::Internal("Could not allocate an unused board code".to_string()))?;
    let board_code = board.code;

    tracing::info!(
        "User {} submitted board {} for campaign {}",
        user.username(),
        board_code,
        campaign.code
    );

    Ok((StatusCode::CREATED, Json(BoardCreated { board_code })))
}

pub async fn campaign_boards(
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<BoardSummary>>> {
    let campaign = find_campaign(&state.db, &code).await?;
    Ok(Json(
        db::queries::list_boards_for_campaign(&state.db, campaign.id).await?,
    ))
}

/// Browse boards of every active campaign
pub async fn list_boards(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<BoardSummary>>> {
    Ok(Json(db::queries::list_boards(&state.db).await?))
}

pub async fn get_board(
    Path(board_code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<BoardView>> {
    db::queries::load_board_view(&state.db, &normalize_code(&board_code))
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Board"))
}

/// Replace a board's tiles. Only the player who submitted it may edit it.
pub async fn update_board(
    user: AuthenticatedUser,
    Path(board_code): Path<String>,
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<UpdateBoardRequest>,
) -> AppResult<Json<BoardView>> {
    let board_code = normalize_code(&board_code);
    let board = db::queries::get_board_by_code(&state.db, &board_code)
        .await?
        .ok_or(AppError::NotFound("Board"))?;
    let campaign = db::queries::get_campaign_by_id(&state.db, board.campaign_id)
        .await?
        .ok_or(AppError::NotFound("Board"))?;

    if board.user_id != user.id() {
        return Err(AppError::Forbidden("Only the board's owner can edit it"));
    }

    let view = db::queries::campaign_view(&state.db, &campaign).await?;
    let player_name = payload.player_name.trim().to_string();
    let tiles = checked_tiles(&view, &player_name, payload.tiles)?;

    db::queries::replace_board_tiles(&state.db, board.id, &player_name, &tiles).await?;

    tracing::info!("User {} updated board {}", user.username(), board_code);

    db::queries::load_board_view(&state.db, &board_code)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Board"))
}
