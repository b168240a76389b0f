// Board assembly and board rules

pub mod builder;
pub mod grid;
pub mod lines;
pub mod rules;
pub mod selection;

use std::collections::HashMap;

use crate::models::{BoardSize, CampaignView, CategoryId, CategoryKind, ItemId};

pub use builder::{BoardBuilder, BoardPhase, BuilderError, FinalizedBoard, MissingPiece, SubmitGuard};
pub use grid::{BoardGrid, Cell, PlacedItem};
pub use rules::{BoardRuleViolation, CampaignRuleViolation};
pub use selection::{Selection, SelectionChange, SelectionStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    pub id: CategoryId,
    pub name: String,
    pub kind: CategoryKind,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub id: ItemId,
    pub category_id: CategoryId,
    pub text: String,
}

/// The shape of a campaign as far as boards are concerned: which items
/// exist, which category owns each, and how each category may be picked
#[derive(Debug, Clone)]
pub struct CampaignLayout {
    pub code: String,
    pub size: BoardSize,
    categories: Vec<CategorySpec>,
    items: HashMap<ItemId, ItemSpec>,
}

impl CampaignLayout {
    pub fn from_view(view: &CampaignView) -> Self {
        let categories = view
            .categories
            .iter()
            .map(|category| CategorySpec {
                id: category.id,
                name: category.name.clone(),
                kind: category.kind,
                required: category.required,
            })
            .collect();

        let items = view
            .categories
            .iter()
            .flat_map(|category| {
                category.items.iter().map(move |item| {
                    (
                        item.id,
                        ItemSpec {
                            id: item.id,
                            category_id: category.id,
                            text: item.text.clone(),
                        },
                    )
                })
            })
            .collect();

        Self {
            code: view.code.clone(),
            size: view.board_size,
            categories,
            items,
        }
    }

    pub fn categories(&self) -> &[CategorySpec] {
        &self.categories
    }

    pub fn category(&self, category_id: CategoryId) -> Option<&CategorySpec> {
        self.categories.iter().find(|category| category.id == category_id)
    }

    pub fn item(&self, item_id: ItemId) -> Option<&ItemSpec> {
        self.items.get(&item_id)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;

    use crate::models::{
        preset, BoardSize, CallStatus, CampaignId, CampaignView, CategoryId, CategoryKind,
        CategoryView, ItemId, ItemView, UserId,
    };

    /// Build a campaign view from `(name, kind, required, item count)` tuples.
    /// Category ids start at 1 and item ids at 101, both in declaration order.
    pub fn campaign(side: u8, categories: &[(&str, CategoryKind, bool, usize)]) -> CampaignView {
        let mut next_item = 101;
        let categories = categories
            .iter()
            .enumerate()
            .map(|(index, (name, kind, required, count))| {
                let items = (0..*count)
                    .map(|position| {
                        let id = next_item;
                        next_item += 1;
                        ItemView {
                            id: ItemId(id),
                            text: format!("{} {}", name, position + 1),
                            position: position as i64,
                            status: CallStatus::Pending,
                        }
                    })
                    .collect();
                CategoryView {
                    id: CategoryId(index as i64 + 1),
                    name: name.to_string(),
                    kind: *kind,
                    required: *required,
                    items,
                }
            })
            .collect();

        let size = BoardSize::new(side).expect("fixture board size");
        CampaignView {
            id: CampaignId(1),
            code: "TEST".to_string(),
            title: "Test Campaign".to_string(),
            description: String::new(),
            background_preset: preset::preset_or_default(preset::DEFAULT_PRESET_ID).clone(),
            board_size: size,
            goal: size.goal().to_string(),
            start_date_time: Utc::now(),
            time_zone: None,
            creator_id: UserId(1),
            started_at: None,
            player_count: 0,
            categories,
        }
    }
}
