use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{BackgroundPreset, BoardId, BoardSize, CallStatus, CampaignId, ItemId, UserId};

#[derive(Debug, Clone, FromRow)]
pub struct BoardRow {
    pub id: BoardId,
    pub campaign_id: CampaignId,
    pub user_id: UserId,
    pub code: String,
    pub player_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TileRow {
    pub id: i64,
    pub board_id: BoardId,
    pub position: i64,
    pub item_id: Option<ItemId>,
    pub is_center: bool,
    pub custom_text: Option<String>,
}

/// Board joined with its campaign, for browse listings
#[derive(Debug, Clone, FromRow)]
pub struct BoardListingRow {
    pub code: String,
    pub player_name: String,
    pub created_at: DateTime<Utc>,
    pub campaign_code: String,
    pub campaign_title: String,
    pub background_preset: i64,
}

/// One finalized grid cell as submitted by a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileSubmission {
    pub position: usize,
    #[serde(default)]
    pub category_item_id: Option<ItemId>,
    #[serde(default)]
    pub is_center: bool,
    #[serde(default)]
    pub custom_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBoardRequest {
    pub player_name: String,
    pub selected_tiles: Vec<TileSubmission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    pub player_name: String,
    pub tiles: Vec<TileSubmission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardCreated {
    pub board_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileView {
    pub position: usize,
    pub item_id: Option<ItemId>,
    pub text: Option<String>,
    pub category_name: Option<String>,
    pub status: Option<CallStatus>,
    pub is_center: bool,
    pub custom_text: Option<String>,
}

impl TileView {
    /// Counts toward a line: the free tile, or an item called correct
    pub fn is_marked(&self) -> bool {
        self.is_center || self.status == Some(CallStatus::Correct)
    }
}

/// Read-only board, with item text resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub board_code: String,
    pub player_name: String,
    pub campaign_code: String,
    pub campaign_title: String,
    pub board_size: BoardSize,
    pub background_preset: BackgroundPreset,
    pub start_date_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub completed_lines: usize,
    pub tiles: Vec<TileView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub board_code: String,
    pub player_name: String,
    pub campaign_code: String,
    pub campaign_title: String,
    pub background_preset: BackgroundPreset,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardStanding {
    pub board_code: String,
    pub player_name: String,
    pub marked_tiles: usize,
    pub completed_lines: usize,
    pub has_bingo: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignResults {
    pub campaign_code: String,
    pub goal: String,
    pub standings: Vec<BoardStanding>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_submission_defaults() {
        let json = r#"{"position": 3, "categoryItemId": 12}"#;
        let tile: TileSubmission = serde_json::from_str(json).unwrap();

        assert_eq!(tile.position, 3);
        assert_eq!(tile.category_item_id, Some(ItemId(12)));
        assert!(!tile.is_center);
        assert!(tile.custom_text.is_none());
    }

    #[test]
    fn test_submit_board_request_uses_camel_case() {
        let request = SubmitBoardRequest {
            player_name: "Robin".to_string(),
            selected_tiles: vec![TileSubmission {
                position: 4,
                category_item_id: None,
                is_center: true,
                custom_text: Some("Robin".to_string()),
            }],
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("playerName"));
        assert!(json.contains("selectedTiles"));
        assert!(json.contains("isCenter"));
        assert!(json.contains("customText"));
    }

    #[test]
    fn test_tile_marked_when_center_or_correct() {
        let mut tile = TileView {
            position: 0,
            item_id: Some(ItemId(1)),
            text: Some("Plot twist".to_string()),
            category_name: Some("Events".to_string()),
            status: Some(CallStatus::Pending),
            is_center: false,
            custom_text: None,
        };
        assert!(!tile.is_marked());

        tile.status = Some(CallStatus::Incorrect);
        assert!(!tile.is_marked());

        tile.status = Some(CallStatus::Correct);
        assert!(tile.is_marked());

        tile.status = None;
        tile.is_center = true;
        assert!(tile.is_marked());
    }
}
