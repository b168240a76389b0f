use std::collections::HashMap;

use crate::models::{CategoryId, CategoryKind, ItemId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    One(ItemId),
    Many(Vec<ItemId>),
}

impl Selection {
    pub fn contains(&self, item_id: ItemId) -> bool {
        match self {
            Selection::One(selected) => *selected == item_id,
            Selection::Many(selected) => selected.contains(&item_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::One(_) => false,
            Selection::Many(selected) => selected.is_empty(),
        }
    }
}

/// What a click did to a category's selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Added(ItemId),
    /// A `choose_many` item was unticked
    Removed(ItemId),
    /// A `choose_one` category switched items
    Replaced { previous: ItemId, current: ItemId },
    /// A `choose_one` item was clicked again and the category is now empty
    Cleared(ItemId),
}

/// Per-category selected items. Transient state driving the board; the grid
/// is what gets submitted.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    selections: HashMap<CategoryId, Selection>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `item_id` within its category according to the category kind
    pub fn select(
        &mut self,
        category_id: CategoryId,
        kind: CategoryKind,
        item_id: ItemId,
    ) -> SelectionChange {
        match kind {
            CategoryKind::ChooseMany => {
                let mut selected = match self.selections.remove(&category_id) {
                    Some(Selection::Many(selected)) => selected,
                    Some(Selection::One(previous)) => vec![previous],
                    None => Vec::new(),
                };
                let change = if let Some(index) = selected.iter().position(|id| *id == item_id) {
                    selected.remove(index);
                    SelectionChange::Removed(item_id)
                } else {
                    selected.push(item_id);
                    SelectionChange::Added(item_id)
                };
                if !selected.is_empty() {
                    self.selections
                        .insert(category_id, Selection::Many(selected));
                }
                change
            }
            CategoryKind::ChooseOne => {
                let previous = match self.selections.get(&category_id) {
                    Some(Selection::One(previous)) => Some(*previous),
                    _ => None,
                };
                match previous {
                    Some(previous) if previous == item_id => {
                        self.selections.remove(&category_id);
                        SelectionChange::Cleared(item_id)
                    }
                    Some(previous) => {
                        self.selections
                            .insert(category_id, Selection::One(item_id));
                        SelectionChange::Replaced {
                            previous,
                            current: item_id,
                        }
                    }
                    None => {
                        self.selections
                            .insert(category_id, Selection::One(item_id));
                        SelectionChange::Added(item_id)
                    }
                }
            }
        }
    }

    /// Drop a single item from its category's selection, e.g. after its board
    /// cell was removed. Returns whether anything changed.
    pub fn deselect(&mut self, category_id: CategoryId, item_id: ItemId) -> bool {
        let Some(selection) = self.selections.get_mut(&category_id) else {
            return false;
        };
        let changed = match selection {
            Selection::One(selected) => *selected == item_id,
            Selection::Many(selected) => {
                let before = selected.len();
                selected.retain(|id| *id != item_id);
                selected.len() != before
            }
        };
        if changed && (matches!(selection, Selection::One(_)) || selection.is_empty()) {
            self.selections.remove(&category_id);
        }
        changed
    }

    pub fn selection(&self, category_id: CategoryId) -> Option<&Selection> {
        self.selections.get(&category_id)
    }

    pub fn has_selection(&self, category_id: CategoryId) -> bool {
        self.selections
            .get(&category_id)
            .is_some_and(|selection| !selection.is_empty())
    }

    pub fn is_item_selected(&self, category_id: CategoryId, item_id: ItemId) -> bool {
        self.selections
            .get(&category_id)
            .is_some_and(|selection| selection.contains(item_id))
    }
}
