use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Result, SqliteConnection, SqlitePool};

use crate::{
    board::lines::completed_lines,
    models::{
        preset, BoardId, BoardListingRow, BoardRow, BoardSize, BoardStanding, BoardSummary,
        BoardView, CallStatus, CampaignDraft, CampaignId, CampaignRow, CampaignSummary,
        CampaignView, CategoryRow, CategoryView, ItemId, ItemRow, ItemView, TileRow,
        TileSubmission, TileView, User, UserId,
    },
};

#[derive(Debug, FromRow)]
struct CampaignWithCount {
    #[sqlx(flatten)]
    campaign: CampaignRow,
    player_count: i64,
}

/// Board tile joined with its item and category
#[derive(Debug, FromRow)]
struct TileDetailRow {
    position: i64,
    item_id: Option<ItemId>,
    is_center: bool,
    custom_text: Option<String>,
    text: Option<String>,
    status: Option<CallStatus>,
    category_name: Option<String>,
}

#[derive(Debug, FromRow)]
struct StandingTileRow {
    board_id: BoardId,
    code: String,
    player_name: String,
    created_at: DateTime<Utc>,
    position: i64,
    is_center: bool,
    status: Option<CallStatus>,
}

fn board_size(campaign: &CampaignRow) -> Result<BoardSize> {
    BoardSize::from_stored(campaign.board_size).ok_or_else(|| {
        sqlx::Error::Protocol(format!(
            "campaign {} has invalid board size {}",
            campaign.code, campaign.board_size
        ))
    })
}

fn marked_positions(size: BoardSize, tiles: impl IntoIterator<Item = (i64, bool)>) -> Vec<bool> {
    let mut marked = vec![false; size.cell_count()];
    for (position, is_marked) in tiles {
        if let Some(slot) = usize::try_from(position).ok().and_then(|p| marked.get_mut(p)) {
            *slot = is_marked;
        }
    }
    marked
}

fn summarize(row: CampaignWithCount) -> Result<CampaignSummary> {
    let size = board_size(&row.campaign)?;
    let campaign = row.campaign;
    Ok(CampaignSummary {
        code: campaign.code,
        title: campaign.title,
        description: campaign.description,
        board_size: size,
        background_preset: preset::preset_or_default(campaign.background_preset).clone(),
        start_date_time: campaign.start_date_time,
        started: campaign.started_at.is_some(),
        player_count: row.player_count,
    })
}

fn board_summary(row: BoardListingRow) -> BoardSummary {
    BoardSummary {
        board_code: row.code,
        player_name: row.player_name,
        campaign_code: row.campaign_code,
        campaign_title: row.campaign_title,
        background_preset: preset::preset_or_default(row.background_preset).clone(),
        created_at: row.created_at,
    }
}

// User queries
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    display_name: Option<&str>,
) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password_hash, display_name, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(display_name)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

/// Overwrite the editable profile fields, returning the stored row
pub async fn update_user(
    pool: &SqlitePool,
    id: UserId,
    display_name: Option<&str>,
    password_hash: &str,
) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET display_name = ?, password_hash = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(display_name)
    .bind(password_hash)
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
}

// Campaign queries
/// Insert a campaign with all of its categories and items.
///
/// Runs in a single transaction: if any child insert fails, no campaign row
/// is left behind.
pub async fn create_campaign(
    pool: &SqlitePool,
    creator_id: UserId,
    draft: &CampaignDraft,
) -> Result<CampaignRow> {
    let mut tx = pool.begin().await?;

    let campaign = sqlx::query_as::<_, CampaignRow>(
        r#"
        INSERT INTO campaigns
            (code, title, description, background_preset, board_size,
             start_date_time, time_zone, creator_id, active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?)
        RETURNING *
        "#,
    )
    .bind(&draft.code)
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(draft.background_preset)
    .bind(u8::from(draft.board_size) as i64)
    .bind(draft.start_date_time)
    .bind(draft.time_zone.as_deref())
    .bind(creator_id)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    for (position, category) in draft.categories.iter().enumerate() {
        let category_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO categories (campaign_id, name, kind, required, position)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(campaign.id)
        .bind(&category.name)
        .bind(category.kind)
        .bind(category.required)
        .bind(position as i64)
        .fetch_one(&mut *tx)
        .await?;

        for (item_position, text) in category.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO items (category_id, text, position, status)
                VALUES (?, ?, ?, 'pending')
                "#,
            )
            .bind(category_id)
            .bind(text)
            .bind(item_position as i64)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    tracing::info!(
        "Created campaign {} ({}) with {} categories",
        campaign.code,
        campaign.id,
        draft.categories.len()
    );

    Ok(campaign)
}

/// Active campaigns only; soft-deleted ones behave as missing
pub async fn get_campaign_by_code(pool: &SqlitePool, code: &str) -> Result<Option<CampaignRow>> {
    sqlx::query_as::<_, CampaignRow>("SELECT * FROM campaigns WHERE code = ? AND active = 1")
        .bind(code)
        .fetch_optional(pool)
        .await
}

pub async fn get_campaign_by_id(
    pool: &SqlitePool,
    campaign_id: CampaignId,
) -> Result<Option<CampaignRow>> {
    sqlx::query_as::<_, CampaignRow>("SELECT * FROM campaigns WHERE id = ? AND active = 1")
        .bind(campaign_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_categories(pool: &SqlitePool, campaign_id: CampaignId) -> Result<Vec<CategoryRow>> {
    sqlx::query_as::<_, CategoryRow>(
        "SELECT * FROM categories WHERE campaign_id = ? ORDER BY position, id",
    )
    .bind(campaign_id)
    .fetch_all(pool)
    .await
}

pub async fn get_campaign_items(pool: &SqlitePool, campaign_id: CampaignId) -> Result<Vec<ItemRow>> {
    sqlx::query_as::<_, ItemRow>(
        r#"
        SELECT i.*
        FROM items i
        JOIN categories c ON c.id = i.category_id
        WHERE c.campaign_id = ?
        ORDER BY c.position, i.position, i.id
        "#,
    )
    .bind(campaign_id)
    .fetch_all(pool)
    .await
}

pub async fn count_boards(pool: &SqlitePool, campaign_id: CampaignId) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM boards WHERE campaign_id = ?")
        .bind(campaign_id)
        .fetch_one(pool)
        .await
}

/// Assemble the full nested view of a campaign row
pub async fn campaign_view(pool: &SqlitePool, campaign: &CampaignRow) -> Result<CampaignView> {
    let size = board_size(campaign)?;
    let categories = get_categories(pool, campaign.id).await?;
    let items = get_campaign_items(pool, campaign.id).await?;
    let player_count = count_boards(pool, campaign.id).await?;

    let categories = categories
        .into_iter()
        .map(|category| CategoryView {
            items: items
                .iter()
                .filter(|item| item.category_id == category.id)
                .map(|item| ItemView {
                    id: item.id,
                    text: item.text.clone(),
                    position: item.position,
                    status: item.status,
                })
                .collect(),
            id: category.id,
            name: category.name,
            kind: category.kind,
            required: category.required,
        })
        .collect();

    Ok(CampaignView {
        id: campaign.id,
        code: campaign.code.clone(),
        title: campaign.title.clone(),
        description: campaign.description.clone(),
        background_preset: preset::preset_or_default(campaign.background_preset).clone(),
        board_size: size,
        goal: size.goal().to_string(),
        start_date_time: campaign.start_date_time,
        time_zone: campaign.time_zone.clone(),
        creator_id: campaign.creator_id,
        started_at: campaign.started_at,
        player_count,
        categories,
    })
}

pub async fn load_campaign_view(pool: &SqlitePool, code: &str) -> Result<Option<CampaignView>> {
    match get_campaign_by_code(pool, code).await? {
        Some(campaign) => campaign_view(pool, &campaign).await.map(Some),
        None => Ok(None),
    }
}

pub async fn list_active_campaigns(pool: &SqlitePool) -> Result<Vec<CampaignSummary>> {
    sqlx::query_as::<_, CampaignWithCount>(
        r#"
        SELECT c.*,
               (SELECT COUNT(*) FROM boards b WHERE b.campaign_id = c.id) AS player_count
        FROM campaigns c
        WHERE c.active = 1
        ORDER BY c.start_date_time, c.id
        "#,
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(summarize)
    .collect()
}

pub async fn list_campaigns_by_creator(
    pool: &SqlitePool,
    creator_id: UserId,
) -> Result<Vec<CampaignSummary>> {
    sqlx::query_as::<_, CampaignWithCount>(
        r#"
        SELECT c.*,
               (SELECT COUNT(*) FROM boards b WHERE b.campaign_id = c.id) AS player_count
        FROM campaigns c
        WHERE c.active = 1 AND c.creator_id = ?
        ORDER BY c.created_at DESC, c.id DESC
        "#,
    )
    .bind(creator_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(summarize)
    .collect()
}

pub async fn deactivate_campaign(pool: &SqlitePool, campaign_id: CampaignId) -> Result<()> {
    sqlx::query("UPDATE campaigns SET active = 0 WHERE id = ?")
        .bind(campaign_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Record the start time. Starting twice keeps the first timestamp.
pub async fn mark_campaign_started(
    pool: &SqlitePool,
    campaign_id: CampaignId,
) -> Result<DateTime<Utc>> {
    sqlx::query_scalar::<_, DateTime<Utc>>(
        r#"
        UPDATE campaigns
        SET started_at = COALESCE(started_at, ?)
        WHERE id = ?
        RETURNING started_at
        "#,
    )
    .bind(Utc::now())
    .bind(campaign_id)
    .fetch_one(pool)
    .await
}

/// Set the call on an item, scoped to the campaign that owns it. Returns
/// false when the item is not part of that campaign.
pub async fn set_item_status(
    pool: &SqlitePool,
    campaign_id: CampaignId,
    item_id: ItemId,
    status: CallStatus,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE items
        SET status = ?
        WHERE id = ?
          AND category_id IN (SELECT id FROM categories WHERE campaign_id = ?)
        "#,
    )
    .bind(status)
    .bind(item_id)
    .bind(campaign_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// Board queries
async fn insert_tiles(
    conn: &mut SqliteConnection,
    board_id: BoardId,
    tiles: &[TileSubmission],
) -> Result<()> {
    for tile in tiles {
        sqlx::query(
            r#"
            INSERT INTO board_tiles (board_id, position, item_id, is_center, custom_text)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(board_id)
        .bind(tile.position as i64)
        .bind(tile.category_item_id)
        .bind(tile.is_center)
        .bind(tile.custom_text.as_deref())
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Insert a board and its tiles in one transaction
pub async fn create_board(
    pool: &SqlitePool,
    campaign_id: CampaignId,
    user_id: UserId,
    code: &str,
    player_name: &str,
    tiles: &[TileSubmission],
) -> Result<BoardRow> {
    let mut tx = pool.begin().await?;

    let board = sqlx::query_as::<_, BoardRow>(
        r#"
        INSERT INTO boards (campaign_id, user_id, code, player_name, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(campaign_id)
    .bind(user_id)
    .bind(code)
    .bind(player_name)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    insert_tiles(&mut tx, board.id, tiles).await?;

    tx.commit().await?;
    Ok(board)
}

pub async fn get_board_by_code(pool: &SqlitePool, code: &str) -> Result<Option<BoardRow>> {
    sqlx::query_as::<_, BoardRow>("SELECT * FROM boards WHERE code = ?")
        .bind(code)
        .fetch_optional(pool)
        .await
}

pub async fn get_board_tiles(pool: &SqlitePool, board_id: BoardId) -> Result<Vec<TileRow>> {
    sqlx::query_as::<_, TileRow>("SELECT * FROM board_tiles WHERE board_id = ? ORDER BY position")
        .bind(board_id)
        .fetch_all(pool)
        .await
}

/// Swap out a board's tiles and player name atomically
pub async fn replace_board_tiles(
    pool: &SqlitePool,
    board_id: BoardId,
    player_name: &str,
    tiles: &[TileSubmission],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE boards SET player_name = ? WHERE id = ?")
        .bind(player_name)
        .bind(board_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM board_tiles WHERE board_id = ?")
        .bind(board_id)
        .execute(&mut *tx)
        .await?;

    insert_tiles(&mut tx, board_id, tiles).await?;

    tx.commit().await?;
    Ok(())
}

pub async fn list_boards_for_campaign(
    pool: &SqlitePool,
    campaign_id: CampaignId,
) -> Result<Vec<BoardSummary>> {
    let rows = sqlx::query_as::<_, BoardListingRow>(
        r#"
        SELECT b.code, b.player_name, b.created_at,
               c.code AS campaign_code, c.title AS campaign_title, c.background_preset
        FROM boards b
        JOIN campaigns c ON c.id = b.campaign_id
        WHERE c.id = ? AND c.active = 1
        ORDER BY b.created_at DESC, b.id DESC
        "#,
    )
    .bind(campaign_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(board_summary).collect())
}

pub async fn list_boards(pool: &SqlitePool) -> Result<Vec<BoardSummary>> {
    let rows = sqlx::query_as::<_, BoardListingRow>(
        r#"
        SELECT b.code, b.player_name, b.created_at,
               c.code AS campaign_code, c.title AS campaign_title, c.background_preset
        FROM boards b
        JOIN campaigns c ON c.id = b.campaign_id
        WHERE c.active = 1
        ORDER BY b.created_at DESC, b.id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(board_summary).collect())
}

/// Read-only board with item text and call status resolved. Boards of
/// soft-deleted campaigns are treated as missing.
pub async fn load_board_view(pool: &SqlitePool, code: &str) -> Result<Option<BoardView>> {
    let Some(board) = get_board_by_code(pool, code).await? else {
        return Ok(None);
    };
    let Some(campaign) = get_campaign_by_id(pool, board.campaign_id).await? else {
        return Ok(None);
    };
    let size = board_size(&campaign)?;

    let tiles: Vec<TileView> = sqlx::query_as::<_, TileDetailRow>(
        r#"
        SELECT t.position, t.item_id, t.is_center, t.custom_text,
               i.text, i.status, c.name AS category_name
        FROM board_tiles t
        LEFT JOIN items i ON i.id = t.item_id
        LEFT JOIN categories c ON c.id = i.category_id
        WHERE t.board_id = ?
        ORDER BY t.position
        "#,
    )
    .bind(board.id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| TileView {
        position: row.position.max(0) as usize,
        item_id: row.item_id,
        text: row.text,
        category_name: row.category_name,
        status: row.status,
        is_center: row.is_center,
        custom_text: row.custom_text,
    })
    .collect();

    let marked = marked_positions(
        size,
        tiles.iter().map(|tile| (tile.position as i64, tile.is_marked())),
    );

    Ok(Some(BoardView {
        board_code: board.code,
        player_name: board.player_name,
        campaign_code: campaign.code,
        campaign_title: campaign.title,
        board_size: size,
        background_preset: preset::preset_or_default(campaign.background_preset).clone(),
        start_date_time: campaign.start_date_time,
        created_at: board.created_at,
        completed_lines: completed_lines(size, &marked),
        tiles,
    }))
}

/// Every board of a campaign scored against the current calls, best first.
/// Ties go to the board submitted earliest.
pub async fn campaign_standings(
    pool: &SqlitePool,
    campaign: &CampaignRow,
) -> Result<Vec<BoardStanding>> {
    let size = board_size(campaign)?;

    let rows = sqlx::query_as::<_, StandingTileRow>(
        r#"
        SELECT b.id AS board_id, b.code, b.player_name, b.created_at,
               t.position, t.is_center, i.status
        FROM boards b
        JOIN board_tiles t ON t.board_id = b.id
        LEFT JOIN items i ON i.id = t.item_id
        WHERE b.campaign_id = ?
        ORDER BY b.id, t.position
        "#,
    )
    .bind(campaign.id)
    .fetch_all(pool)
    .await?;

    let mut boards: BTreeMap<BoardId, (String, String, DateTime<Utc>, Vec<(i64, bool)>)> =
        BTreeMap::new();
    for row in rows {
        let marked = row.is_center || row.status == Some(CallStatus::Correct);
        boards
            .entry(row.board_id)
            .or_insert_with(|| (row.code, row.player_name, row.created_at, Vec::new()))
            .3
            .push((row.position, marked));
    }

    let mut standings: Vec<(DateTime<Utc>, BoardStanding)> = boards
        .into_values()
        .map(|(board_code, player_name, created_at, tiles)| {
            let marked = marked_positions(size, tiles);
            let lines = completed_lines(size, &marked);
            let standing = BoardStanding {
                board_code,
                player_name,
                marked_tiles: marked.iter().filter(|m| **m).count(),
                completed_lines: lines,
                has_bingo: lines > 0,
            };
            (created_at, standing)
        })
        .collect();

    standings.sort_by(|(a_created, a), (b_created, b)| {
        b.completed_lines
            .cmp(&a.completed_lines)
            .then(b.marked_tiles.cmp(&a.marked_tiles))
            .then(a_created.cmp(b_created))
    });

    Ok(standings.into_iter().map(|(_, standing)| standing).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{create_pool, run_migrations},
        models::{CategoryDraft, CategoryKind, ItemId},
    };

    async fn test_pool() -> SqlitePool {
        let pool = create_pool("sqlite::memory:", 1).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    async fn test_user(pool: &SqlitePool, username: &str) -> User {
        create_user(pool, username, "not-a-real-hash", None)
            .await
            .unwrap()
    }

    /// 3x3: required choose_one "Winner" (2 items), choose_many "Moments" (8)
    fn draft(code: &str) -> CampaignDraft {
        CampaignDraft {
            code: code.to_string(),
            title: "Finale Night".to_string(),
            description: "Season finale".to_string(),
            background_preset: 2,
            board_size: BoardSize::new(3).unwrap(),
            start_date_time: Utc::now(),
            time_zone: Some("Europe/Berlin".to_string()),
            categories: vec![
                CategoryDraft {
                    name: "Winner".to_string(),
                    kind: CategoryKind::ChooseOne,
                    required: true,
                    items: vec!["Robin".to_string(), "Alex".to_string()],
                },
                CategoryDraft {
                    name: "Moments".to_string(),
                    kind: CategoryKind::ChooseMany,
                    required: false,
                    items: (1..=8).map(|n| format!("Moment {}", n)).collect(),
                },
            ],
        }
    }

    /// A valid full tile list: the first winner at 0, moments elsewhere
    fn full_tiles(view: &CampaignView, player_name: &str) -> Vec<TileSubmission> {
        let winner = view.categories[0].items[0].id;
        let mut moments = view.categories[1].items.iter().map(|item| item.id);
        (0..9)
            .map(|position| match position {
                0 => TileSubmission {
                    position,
                    category_item_id: Some(winner),
                    is_center: false,
                    custom_text: None,
                },
                4 => TileSubmission {
                    position,
                    category_item_id: None,
                    is_center: true,
                    custom_text: Some(player_name.to_string()),
                },
                _ => TileSubmission {
                    position,
                    category_item_id: moments.next(),
                    is_center: false,
                    custom_text: None,
                },
            })
            .collect()
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let pool = test_pool().await;
        test_user(&pool, "robin").await;

        let result = create_user(&pool, "robin", "hash", None).await;
        assert!(result.is_err(), "Usernames must be unique");

        let found = get_user_by_username(&pool, "robin").await.unwrap();
        assert!(found.is_some());
        assert!(get_user_by_username(&pool, "alex").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_user_overwrites_profile() {
        let pool = test_pool().await;
        let user = test_user(&pool, "robin").await;
        let other = test_user(&pool, "alex").await;

        let updated = update_user(&pool, user.id, Some("Robin B."), "new-hash")
            .await
            .unwrap();
        assert_eq!(updated.id, user.id);
        assert_eq!(updated.display_name(), "Robin B.");
        assert_eq!(updated.password_hash, "new-hash");

        let cleared = update_user(&pool, user.id, None, "new-hash").await.unwrap();
        assert_eq!(cleared.display_name(), "robin");

        let untouched = get_user_by_username(&pool, "alex").await.unwrap().unwrap();
        assert_eq!(untouched.password_hash, other.password_hash);
    }

    #[tokio::test]
    async fn test_create_campaign_persists_nested_rows() {
        let pool = test_pool().await;
        let user = test_user(&pool, "host").await;

        let campaign = create_campaign(&pool, user.id, &draft("ABCD")).await.unwrap();
        assert_eq!(campaign.code, "ABCD");
        assert!(campaign.active);
        assert!(get_campaign_by_code(&pool, "ABCD").await.unwrap().is_some());

        let view = load_campaign_view(&pool, "ABCD").await.unwrap().unwrap();
        assert_eq!(view.goal, "BON");
        assert_eq!(view.background_preset.name, "Sunset Glow");
        assert_eq!(view.categories.len(), 2);
        assert_eq!(view.categories[0].name, "Winner");
        assert_eq!(view.categories[0].kind, CategoryKind::ChooseOne);
        assert!(view.categories[0].required);
        assert_eq!(view.categories[1].items.len(), 8);
        assert_eq!(view.categories[1].items[0].text, "Moment 1");
        assert!(view
            .categories
            .iter()
            .flat_map(|c| &c.items)
            .all(|item| item.status == CallStatus::Pending));
    }

    #[tokio::test]
    async fn test_failed_child_insert_leaves_no_campaign() {
        let pool = test_pool().await;
        let user = test_user(&pool, "host").await;

        let mut broken = draft("WXYZ");
        broken.categories[1].items.push(String::new());

        let result = create_campaign(&pool, user.id, &broken).await;
        assert!(result.is_err(), "Empty item text should violate the CHECK");

        assert!(get_campaign_by_code(&pool, "WXYZ").await.unwrap().is_none());
        let categories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(categories, 0, "No orphaned categories should remain");
    }

    #[tokio::test]
    async fn test_item_status_is_scoped_to_campaign() {
        let pool = test_pool().await;
        let user = test_user(&pool, "host").await;
        let first = create_campaign(&pool, user.id, &draft("AAAA")).await.unwrap();
        create_campaign(&pool, user.id, &draft("BBBB")).await.unwrap();

        let other = load_campaign_view(&pool, "BBBB").await.unwrap().unwrap();
        let foreign_item = other.categories[0].items[0].id;
        assert!(!set_item_status(&pool, first.id, foreign_item, CallStatus::Correct)
            .await
            .unwrap());

        let own = load_campaign_view(&pool, "AAAA").await.unwrap().unwrap();
        let item = own.categories[1].items[2].id;
        assert!(set_item_status(&pool, first.id, item, CallStatus::Incorrect)
            .await
            .unwrap());

        let reloaded = load_campaign_view(&pool, "AAAA").await.unwrap().unwrap();
        assert_eq!(
            reloaded.item(item).map(|(_, i)| i.status),
            Some(CallStatus::Incorrect)
        );
        assert_eq!(
            reloaded.item(ItemId(9999)).map(|(_, i)| i.status),
            None
        );
    }

    #[tokio::test]
    async fn test_board_round_trip_keeps_item_text() {
        let pool = test_pool().await;
        let host = test_user(&pool, "host").await;
        let player = test_user(&pool, "player").await;
        let campaign = create_campaign(&pool, host.id, &draft("ABCD")).await.unwrap();
        let view = campaign_view(&pool, &campaign).await.unwrap();
        let tiles = full_tiles(&view, "Robin");

        let board = create_board(&pool, campaign.id, player.id, "BOARD234", "Robin", &tiles)
            .await
            .unwrap();
        assert_eq!(get_board_tiles(&pool, board.id).await.unwrap().len(), 9);
        assert!(get_board_by_code(&pool, "BOARD234").await.unwrap().is_some());

        let loaded = load_board_view(&pool, "BOARD234").await.unwrap().unwrap();
        assert_eq!(loaded.player_name, "Robin");
        assert_eq!(loaded.campaign_code, "ABCD");
        assert_eq!(loaded.campaign_title, "Finale Night");
        assert_eq!(loaded.tiles.len(), 9);
        assert_eq!(loaded.tiles[0].text.as_deref(), Some("Robin"));
        assert_eq!(loaded.tiles[0].category_name.as_deref(), Some("Winner"));
        assert_eq!(loaded.tiles[1].text.as_deref(), Some("Moment 1"));
        assert!(loaded.tiles[4].is_center);
        assert_eq!(loaded.tiles[4].custom_text.as_deref(), Some("Robin"));
        assert_eq!(loaded.completed_lines, 0);

        let reloaded = campaign_view(&pool, &campaign).await.unwrap();
        assert_eq!(reloaded.player_count, 1);
    }

    #[tokio::test]
    async fn test_standings_rank_by_completed_lines() {
        let pool = test_pool().await;
        let host = test_user(&pool, "host").await;
        let player = test_user(&pool, "player").await;
        let campaign = create_campaign(&pool, host.id, &draft("ABCD")).await.unwrap();
        let view = campaign_view(&pool, &campaign).await.unwrap();

        let tiles = full_tiles(&view, "Early");
        create_board(&pool, campaign.id, player.id, "EARLY234", "Early", &tiles)
            .await
            .unwrap();

        // Same items, first row reversed so the winner sits at position 2
        let mut swapped = full_tiles(&view, "Late");
        swapped.swap(0, 2);
        swapped[0].position = 0;
        swapped[2].position = 2;
        create_board(&pool, campaign.id, player.id, "LATE2345", "Late", &swapped)
            .await
            .unwrap();

        // Positions 2, 4, 6 form a diagonal on "Late": winner, center, moment
        let diagonal_moment = swapped[6].category_item_id.unwrap();
        for item in [view.categories[0].items[0].id, diagonal_moment] {
            set_item_status(&pool, campaign.id, item, CallStatus::Correct)
                .await
                .unwrap();
        }

        let standings = campaign_standings(&pool, &campaign).await.unwrap();
        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].board_code, "LATE2345");
        assert_eq!(standings[0].completed_lines, 1);
        assert!(standings[0].has_bingo);
        assert_eq!(standings[1].board_code, "EARLY234");
        assert_eq!(standings[1].marked_tiles, 3);
        assert!(!standings[1].has_bingo);
    }

    #[tokio::test]
    async fn test_replace_board_tiles() {
        let pool = test_pool().await;
        let host = test_user(&pool, "host").await;
        let campaign = create_campaign(&pool, host.id, &draft("ABCD")).await.unwrap();
        let view = campaign_view(&pool, &campaign).await.unwrap();
        let board = create_board(
            &pool,
            campaign.id,
            host.id,
            "BOARD234",
            "Robin",
            &full_tiles(&view, "Robin"),
        )
        .await
        .unwrap();

        let mut tiles = full_tiles(&view, "Robin B");
        tiles[0].category_item_id = Some(view.categories[0].items[1].id);
        replace_board_tiles(&pool, board.id, "Robin B", &tiles)
            .await
            .unwrap();

        let loaded = load_board_view(&pool, "BOARD234").await.unwrap().unwrap();
        assert_eq!(loaded.player_name, "Robin B");
        assert_eq!(loaded.tiles.len(), 9);
        assert_eq!(loaded.tiles[0].text.as_deref(), Some("Alex"));
    }

    #[tokio::test]
    async fn test_deactivated_campaign_disappears() {
        let pool = test_pool().await;
        let host = test_user(&pool, "host").await;
        let campaign = create_campaign(&pool, host.id, &draft("ABCD")).await.unwrap();
        let view = campaign_view(&pool, &campaign).await.unwrap();
        create_board(
            &pool,
            campaign.id,
            host.id,
            "BOARD234",
            "Robin",
            &full_tiles(&view, "Robin"),
        )
        .await
        .unwrap();
        assert_eq!(list_active_campaigns(&pool).await.unwrap().len(), 1);
        assert_eq!(list_boards(&pool).await.unwrap().len(), 1);

        deactivate_campaign(&pool, campaign.id).await.unwrap();

        assert!(get_campaign_by_code(&pool, "ABCD").await.unwrap().is_none());
        assert!(list_active_campaigns(&pool).await.unwrap().is_empty());
        assert!(list_campaigns_by_creator(&pool, host.id).await.unwrap().is_empty());
        assert!(list_boards(&pool).await.unwrap().is_empty());
        assert!(load_board_view(&pool, "BOARD234").await.unwrap().is_none());
        // The code stays reserved
        let reused = create_campaign(&pool, host.id, &draft("ABCD")).await.unwrap_err();
        assert!(crate::db::is_unique_violation(&reused));
    }

    #[tokio::test]
    async fn test_start_keeps_first_timestamp() {
        let pool = test_pool().await;
        let host = test_user(&pool, "host").await;
        let campaign = create_campaign(&pool, host.id, &draft("ABCD")).await.unwrap();

        let first = mark_campaign_started(&pool, campaign.id).await.unwrap();
        let second = mark_campaign_started(&pool, campaign.id).await.unwrap();
        assert_eq!(first, second);

        let summaries = list_campaigns_by_creator(&pool, host.id).await.unwrap();
        assert!(summaries[0].started);
    }
}
