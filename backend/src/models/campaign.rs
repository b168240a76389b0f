use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use super::{BackgroundPreset, CampaignId, CategoryId, ItemId, UserId};

/// Side length of a square board. Only 3x3, 4x4 and 5x5 boards exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BoardSize(u8);

impl BoardSize {
    pub const ALL: [BoardSize; 3] = [BoardSize(3), BoardSize(4), BoardSize(5)];

    pub fn new(side: u8) -> Option<Self> {
        matches!(side, 3..=5).then_some(Self(side))
    }

    /// Convert the INTEGER stored in the campaigns table
    pub fn from_stored(value: i64) -> Option<Self> {
        u8::try_from(value).ok().and_then(Self::new)
    }

    pub fn side(self) -> usize {
        self.0 as usize
    }

    pub fn cell_count(self) -> usize {
        self.side() * self.side()
    }

    /// The free/name tile always sits at floor(n² / 2)
    pub fn center_index(self) -> usize {
        self.cell_count() / 2
    }

    /// Word shouted on a completed line, one letter per row
    pub fn goal(self) -> &'static str {
        match self.0 {
            3 => "BON",
            4 => "BONG",
            _ => "BONGI",
        }
    }
}

impl TryFrom<u8> for BoardSize {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("board size must be 3, 4 or 5 (got {})", value))
    }
}

impl From<BoardSize> for u8 {
    fn from(size: BoardSize) -> Self {
        size.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CategoryKind {
    ChooseMany,
    ChooseOne,
}

/// Moderator verdict on an item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CallStatus {
    #[default]
    Pending,
    Correct,
    Incorrect,
}

/// Category type as sent by the campaign editor. The editor folds the
/// required flag into the type name for single-choice categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    ChooseMany,
    ChooseOne,
    ChooseOneRequired,
    ChooseOneOptional,
}

impl CategoryType {
    pub fn resolve(self, required: bool) -> (CategoryKind, bool) {
        match self {
            CategoryType::ChooseMany => (CategoryKind::ChooseMany, required),
            CategoryType::ChooseOne => (CategoryKind::ChooseOne, required),
            CategoryType::ChooseOneRequired => (CategoryKind::ChooseOne, true),
            CategoryType::ChooseOneOptional => (CategoryKind::ChooseOne, false),
        }
    }
}

// =============================================================================
// Database rows
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct CampaignRow {
    pub id: CampaignId,
    pub code: String,
    pub title: String,
    pub description: String,
    pub background_preset: i64,
    pub board_size: i64,
    pub start_date_time: DateTime<Utc>,
    pub time_zone: Option<String>,
    pub creator_id: UserId,
    pub active: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: CategoryId,
    pub campaign_id: CampaignId,
    pub name: String,
    pub kind: CategoryKind,
    pub required: bool,
    pub position: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub id: ItemId,
    pub category_id: CategoryId,
    pub text: String,
    pub position: i64,
    pub status: CallStatus,
}

// =============================================================================
// API payloads
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    #[serde(default)]
    pub required: bool,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_preset")]
    pub background_preset: i64,
    pub board_size: u8,
    #[serde(deserialize_with = "deserialize_start_date_time")]
    pub start_date_time: DateTime<Utc>,
    #[serde(default)]
    pub time_zone: Option<String>,
    pub categories: Vec<NewCategory>,
}

fn default_preset() -> i64 {
    super::preset::DEFAULT_PRESET_ID
}

/// Accepts RFC 3339 as well as the zone-less `YYYY-MM-DD HH:MM[:SS]` form
/// (already converted to UTC) the campaign editor produces.
pub fn parse_start_date_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_start_date_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_start_date_time(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid start date/time '{}'", raw)))
}

/// A creation request that passed validation, with its generated code
#[derive(Debug, Clone)]
pub struct CampaignDraft {
    pub code: String,
    pub title: String,
    pub description: String,
    pub background_preset: i64,
    pub board_size: BoardSize,
    pub start_date_time: DateTime<Utc>,
    pub time_zone: Option<String>,
    pub categories: Vec<CategoryDraft>,
}

#[derive(Debug, Clone)]
pub struct CategoryDraft {
    pub name: String,
    pub kind: CategoryKind,
    pub required: bool,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: ItemId,
    pub text: String,
    pub position: i64,
    pub status: CallStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub required: bool,
    pub items: Vec<ItemView>,
}

/// Everything a player needs to build a board, and a moderator to call items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignView {
    pub id: CampaignId,
    pub code: String,
    pub title: String,
    pub description: String,
    pub background_preset: BackgroundPreset,
    pub board_size: BoardSize,
    pub goal: String,
    pub start_date_time: DateTime<Utc>,
    pub time_zone: Option<String>,
    pub creator_id: UserId,
    pub started_at: Option<DateTime<Utc>>,
    pub player_count: i64,
    pub categories: Vec<CategoryView>,
}

impl CampaignView {
    pub fn item(&self, item_id: ItemId) -> Option<(&CategoryView, &ItemView)> {
        self.categories.iter().find_map(|category| {
            category
                .items
                .iter()
                .find(|item| item.id == item_id)
                .map(|item| (category, item))
        })
    }

    pub fn summary(&self) -> CampaignSummary {
        CampaignSummary {
            code: self.code.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            board_size: self.board_size,
            background_preset: self.background_preset.clone(),
            start_date_time: self.start_date_time,
            started: self.started_at.is_some(),
            player_count: self.player_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    pub code: String,
    pub title: String,
    pub description: String,
    pub board_size: BoardSize,
    pub background_preset: BackgroundPreset,
    pub start_date_time: DateTime<Utc>,
    pub started: bool,
    pub player_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignCreated {
    pub campaign: CampaignSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub item_id: ItemId,
    pub status: CallStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResponse {
    pub item_id: ItemId,
    pub status: CallStatus,
}
