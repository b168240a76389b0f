use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::CampaignLayout;
use crate::models::{
    preset, BoardSize, CampaignDraft, CategoryDraft, CategoryId, CategoryKind, ItemId,
    NewCampaign, TileSubmission,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CampaignRuleViolation {
    #[error("Campaign title is required")]
    MissingTitle,
    #[error("Board size must be 3, 4 or 5")]
    InvalidBoardSize,
    #[error("Unknown background preset {0}")]
    UnknownPreset(i64),
    #[error("At least one category is required")]
    NoCategories,
    #[error("Every category needs a name")]
    UnnamedCategory,
    #[error("Category '{0}' has no items")]
    EmptyCategory(String),
    #[error("Categories can fill at most {available} of the {needed} tiles")]
    NotEnoughItems { needed: usize, available: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardRuleViolation {
    #[error("Player name is required")]
    MissingPlayerName,
    #[error("A board needs {expected} tiles, got {actual}")]
    WrongTileCount { expected: usize, actual: usize },
    #[error("Tile position {0} is off the board")]
    PositionOutOfRange(usize),
    #[error("Tile position {0} appears more than once")]
    DuplicatePosition(usize),
    #[error("The center tile must be at position {0}")]
    CenterMisplaced(usize),
    #[error("The center tile cannot hold an item")]
    CenterHoldsItem,
    #[error("Tile at position {0} has no item")]
    MissingItem(usize),
    #[error("Item {0} does not belong to this campaign")]
    UnknownItem(ItemId),
    #[error("Item {0} is on the board more than once")]
    DuplicateItem(ItemId),
    #[error("Category '{0}' allows only one tile")]
    ChooseOneExceeded(String),
    #[error("Category '{0}' requires a selection")]
    RequiredMissing(String),
}

/// How many non-center cells a campaign's categories can fill at most:
/// every `choose_many` item, plus one per `choose_one` category.
pub fn fill_capacity(categories: impl IntoIterator<Item = (CategoryKind, usize)>) -> usize {
    categories
        .into_iter()
        .map(|(kind, items)| match kind {
            CategoryKind::ChooseMany => items,
            CategoryKind::ChooseOne => items.min(1),
        })
        .sum()
}

/// Check a creation request and normalize it into a draft. Names and item
/// labels are trimmed; blank item labels are dropped.
pub fn validate_new_campaign(
    campaign: NewCampaign,
    code: String,
) -> Result<CampaignDraft, CampaignRuleViolation> {
    let title = campaign.title.trim().to_string();
    if title.is_empty() {
        return Err(CampaignRuleViolation::MissingTitle);
    }

    let board_size =
        BoardSize::new(campaign.board_size).ok_or(CampaignRuleViolation::InvalidBoardSize)?;

    if preset::preset_by_id(campaign.background_preset).is_none() {
        return Err(CampaignRuleViolation::UnknownPreset(campaign.background_preset));
    }

    if campaign.categories.is_empty() {
        return Err(CampaignRuleViolation::NoCategories);
    }

    let mut categories = Vec::with_capacity(campaign.categories.len());
    for category in campaign.categories {
        let name = category.name.trim().to_string();
        if name.is_empty() {
            return Err(CampaignRuleViolation::UnnamedCategory);
        }
        let items: Vec<String> = category
            .items
            .iter()
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect();
        if items.is_empty() {
            return Err(CampaignRuleViolation::EmptyCategory(name));
        }
        let (kind, required) = category.category_type.resolve(category.required);
        categories.push(CategoryDraft {
            name,
            kind,
            required,
            items,
        });
    }

    let needed = board_size.cell_count() - 1;
    let available = fill_capacity(categories.iter().map(|c| (c.kind, c.items.len())));
    if available < needed {
        return Err(CampaignRuleViolation::NotEnoughItems { needed, available });
    }

    Ok(CampaignDraft {
        code,
        title,
        description: campaign.description.trim().to_string(),
        background_preset: campaign.background_preset,
        board_size,
        start_date_time: campaign.start_date_time,
        time_zone: campaign
            .time_zone
            .map(|tz| tz.trim().to_string())
            .filter(|tz| !tz.is_empty()),
        categories,
    })
}

/// Check a finalized tile list against a campaign:
/// one tile per position, the center tile at the center and only there,
/// every other tile holding a distinct item of this campaign, at most one
/// tile per `choose_one` category, and every required category present.
pub fn validate_tiles(
    layout: &CampaignLayout,
    player_name: &str,
    tiles: &[TileSubmission],
) -> Result<(), BoardRuleViolation> {
    if player_name.trim().is_empty() {
        return Err(BoardRuleViolation::MissingPlayerName);
    }

    let expected = layout.size.cell_count();
    if tiles.len() != expected {
        return Err(BoardRuleViolation::WrongTileCount {
            expected,
            actual: tiles.len(),
        });
    }

    let center = layout.size.center_index();
    let mut positions = HashSet::with_capacity(tiles.len());
    let mut items = HashSet::with_capacity(tiles.len());
    let mut per_category: HashMap<CategoryId, usize> = HashMap::new();

    for tile in tiles {
        if tile.position >= expected {
            return Err(BoardRuleViolation::PositionOutOfRange(tile.position));
        }
        if !positions.insert(tile.position) {
            return Err(BoardRuleViolation::DuplicatePosition(tile.position));
        }
        if tile.is_center != (tile.position == center) {
            return Err(BoardRuleViolation::CenterMisplaced(center));
        }
        if tile.is_center {
            if tile.category_item_id.is_some() {
                return Err(BoardRuleViolation::CenterHoldsItem);
            }
            continue;
        }

        let item_id = tile
            .category_item_id
            .ok_or(BoardRuleViolation::MissingItem(tile.position))?;
        let item = layout
            .item(item_id)
            .ok_or(BoardRuleViolation::UnknownItem(item_id))?;
        if !items.insert(item_id) {
            return Err(BoardRuleViolation::DuplicateItem(item_id));
        }
        *per_category.entry(item.category_id).or_default() += 1;
    }

    for category in layout.categories() {
        let count = per_category.get(&category.id).copied().unwrap_or(0);
        if category.kind == CategoryKind::ChooseOne && count > 1 {
            return Err(BoardRuleViolation::ChooseOneExceeded(category.name.clone()));
        }
        if category.required && count == 0 {
            return Err(BoardRuleViolation::RequiredMissing(category.name.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fixtures;
    use crate::models::{CategoryType, NewCategory};
    use chrono::Utc;

    fn new_campaign(board_size: u8, categories: Vec<NewCategory>) -> NewCampaign {
        NewCampaign {
            title: "  Season Finale ".to_string(),
            description: String::new(),
            background_preset: 1,
            board_size,
            start_date_time: Utc::now(),
            time_zone: Some("UTC".to_string()),
            categories,
        }
    }

    fn category(name: &str, category_type: CategoryType, items: &[&str]) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            category_type,
            required: false,
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_valid_campaign_is_normalized() {
        let draft = validate_new_campaign(
            new_campaign(
                3,
                vec![
                    category("Winner", CategoryType::ChooseOneRequired, &["A", "B"]),
                    category("Moments", CategoryType::ChooseMany, &["x", " ", "y", "z", "w", "v", "u", "t"]),
                ],
            ),
            "ABCD".to_string(),
        )
        .unwrap();

        assert_eq!(draft.title, "Season Finale");
        assert_eq!(draft.code, "ABCD");
        assert_eq!(draft.categories[0].kind, CategoryKind::ChooseOne);
        assert!(draft.categories[0].required);
        assert_eq!(draft.categories[1].items.len(), 7);
    }

    #[test]
    fn test_campaign_rejections() {
        let ok_items = &["1", "2", "3", "4", "5", "6", "7", "8"];

        let mut untitled = new_campaign(3, vec![category("C", CategoryType::ChooseMany, ok_items)]);
        untitled.title = "   ".to_string();
        assert_eq!(
            validate_new_campaign(untitled, "ABCD".into()).unwrap_err(),
            CampaignRuleViolation::MissingTitle
        );

        let too_big = new_campaign(6, vec![category("C", CategoryType::ChooseMany, ok_items)]);
        assert_eq!(
            validate_new_campaign(too_big, "ABCD".into()).unwrap_err(),
            CampaignRuleViolation::InvalidBoardSize
        );

        let mut bad_preset = new_campaign(3, vec![category("C", CategoryType::ChooseMany, ok_items)]);
        bad_preset.background_preset = 42;
        assert_eq!(
            validate_new_campaign(bad_preset, "ABCD".into()).unwrap_err(),
            CampaignRuleViolation::UnknownPreset(42)
        );

        let blank_items = new_campaign(3, vec![category("Empty", CategoryType::ChooseMany, &["", " "])]);
        assert_eq!(
            validate_new_campaign(blank_items, "ABCD".into()).unwrap_err(),
            CampaignRuleViolation::EmptyCategory("Empty".to_string())
        );

        assert_eq!(
            validate_new_campaign(new_campaign(3, vec![]), "ABCD".into()).unwrap_err(),
            CampaignRuleViolation::NoCategories
        );
    }

    #[test]
    fn test_choose_one_categories_fill_a_single_tile() {
        // Eight items, but the single-choice category only ever fills one cell.
        let campaign = new_campaign(
            3,
            vec![
                category("Pick", CategoryType::ChooseOneOptional, &["a", "b", "c", "d"]),
                category("Many", CategoryType::ChooseMany, &["1", "2", "3", "4"]),
            ],
        );
        assert_eq!(
            validate_new_campaign(campaign, "ABCD".into()).unwrap_err(),
            CampaignRuleViolation::NotEnoughItems {
                needed: 8,
                available: 5
            }
        );
    }

    fn layout() -> CampaignLayout {
        // Category 1: required choose_one, items 101-102
        // Category 2: choose_many, items 103-110
        CampaignLayout::from_view(&fixtures::campaign(
            3,
            &[
                ("Winner", CategoryKind::ChooseOne, true, 2),
                ("Moments", CategoryKind::ChooseMany, false, 8),
            ],
        ))
    }

    fn tiles(items: &[i64]) -> Vec<TileSubmission> {
        let mut items = items.iter();
        (0..9)
            .map(|position| {
                if position == 4 {
                    TileSubmission {
                        position,
                        category_item_id: None,
                        is_center: true,
                        custom_text: Some("Robin".to_string()),
                    }
                } else {
                    TileSubmission {
                        position,
                        category_item_id: items.next().map(|id| ItemId(*id)),
                        is_center: false,
                        custom_text: None,
                    }
                }
            })
            .collect()
    }

    #[test]
    fn test_valid_board_passes() {
        let board = tiles(&[101, 103, 104, 105, 106, 107, 108, 109]);
        assert_eq!(validate_tiles(&layout(), "Robin", &board), Ok(()));
    }

    #[test]
    fn test_board_rule_violations() {
        let layout = layout();
        let valid = tiles(&[101, 103, 104, 105, 106, 107, 108, 109]);

        assert_eq!(
            validate_tiles(&layout, "  ", &valid),
            Err(BoardRuleViolation::MissingPlayerName)
        );

        assert_eq!(
            validate_tiles(&layout, "Robin", &valid[..8]),
            Err(BoardRuleViolation::WrongTileCount {
                expected: 9,
                actual: 8
            })
        );

        let mut off_board = valid.clone();
        off_board[0].position = 9;
        assert_eq!(
            validate_tiles(&layout, "Robin", &off_board),
            Err(BoardRuleViolation::PositionOutOfRange(9))
        );

        let mut repeated = valid.clone();
        repeated[1].position = 0;
        assert_eq!(
            validate_tiles(&layout, "Robin", &repeated),
            Err(BoardRuleViolation::DuplicatePosition(0))
        );

        assert_eq!(
            validate_tiles(&layout, "Robin", &tiles(&[101, 102, 104, 105, 106, 107, 108, 109])),
            Err(BoardRuleViolation::ChooseOneExceeded("Winner".to_string()))
        );

        assert_eq!(
            validate_tiles(&layout, "Robin", &tiles(&[110, 103, 104, 105, 106, 107, 108, 109])),
            Err(BoardRuleViolation::RequiredMissing("Winner".to_string()))
        );

        assert_eq!(
            validate_tiles(&layout, "Robin", &tiles(&[101, 103, 103, 105, 106, 107, 108, 109])),
            Err(BoardRuleViolation::DuplicateItem(ItemId(103)))
        );

        assert_eq!(
            validate_tiles(&layout, "Robin", &tiles(&[101, 999, 104, 105, 106, 107, 108, 109])),
            Err(BoardRuleViolation::UnknownItem(ItemId(999)))
        );

        assert_eq!(
            validate_tiles(&layout, "Robin", &tiles(&[101, 103, 104, 105, 106, 107, 108])),
            Err(BoardRuleViolation::MissingItem(8))
        );
    }

    #[test]
    fn test_center_rules() {
        let layout = layout();

        let mut no_center = tiles(&[101, 103, 104, 105, 106, 107, 108, 109]);
        no_center[4].is_center = false;
        no_center[4].category_item_id = Some(ItemId(110));
        assert_eq!(
            validate_tiles(&layout, "Robin", &no_center),
            Err(BoardRuleViolation::CenterMisplaced(4))
        );

        let mut center_item = tiles(&[101, 103, 104, 105, 106, 107, 108, 109]);
        center_item[4].category_item_id = Some(ItemId(110));
        assert_eq!(
            validate_tiles(&layout, "Robin", &center_item),
            Err(BoardRuleViolation::CenterHoldsItem)
        );
    }
}
