use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use thiserror::Error;

use super::{
    grid::{BoardGrid, Cell, PlacedItem},
    selection::{SelectionChange, SelectionStore},
    CampaignLayout,
};
use crate::models::{CampaignView, CategoryId, CategoryKind, ItemId, SubmitBoardRequest, TileSubmission};

/// Lifecycle of a board being assembled. A builder starts `Initialized`
/// (only the center placed) and ends `Finalized` once the server accepted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPhase {
    Initialized,
    PartiallyFilled,
    Full,
    Finalized,
}

/// The piece most likely keeping a board from being submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingPiece {
    PlayerName,
    /// Names of required categories with nothing on the board, in campaign order
    RequiredCategories(Vec<String>),
    EmptyCells(usize),
}

impl fmt::Display for MissingPiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingPiece::PlayerName => write!(f, "Enter your name to finish your board"),
            MissingPiece::RequiredCategories(names) => {
                write!(f, "Pick something from: {}", names.join(", "))
            }
            MissingPiece::EmptyCells(1) => write!(f, "Fill the last empty tile"),
            MissingPiece::EmptyCells(count) => write!(f, "Fill the {} empty tiles", count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("Unknown category {0}")]
    UnknownCategory(CategoryId),
    #[error("Unknown item {0}")]
    UnknownItem(ItemId),
    #[error("Item {item} is not in category {category}")]
    ItemNotInCategory { item: ItemId, category: CategoryId },
    #[error("{0}")]
    NotReady(MissingPiece),
    #[error("This board is already being submitted")]
    Busy,
    #[error("This board has already been finalized")]
    AlreadyFinalized,
    #[error("The board is full, remove a tile first")]
    BoardFull,
    #[error("The board changed while it was being saved as {board_code}")]
    ChangedSinceSubmit { board_code: String },
}

/// Snapshot of a complete board, ready to post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedBoard {
    pub campaign_code: String,
    pub request: SubmitBoardRequest,
}

/// Holds the builder's busy flag while a submission is outstanding. The flag
/// clears when the guard drops, whatever the outcome.
#[derive(Debug)]
pub struct SubmitGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// A player's board in progress: category selections, the grid they drive,
/// and the player name bound into the center tile
#[derive(Debug)]
pub struct BoardBuilder {
    layout: CampaignLayout,
    selections: SelectionStore,
    grid: BoardGrid,
    player_name: String,
    busy: Arc<AtomicBool>,
    board_code: Option<String>,
}

impl BoardBuilder {
    pub fn new(layout: CampaignLayout) -> Self {
        let grid = BoardGrid::new(layout.size);
        Self {
            layout,
            selections: SelectionStore::new(),
            grid,
            player_name: String::new(),
            busy: Arc::new(AtomicBool::new(false)),
            board_code: None,
        }
    }

    pub fn from_campaign(campaign: &CampaignView) -> Self {
        Self::new(CampaignLayout::from_view(campaign))
    }

    pub fn layout(&self) -> &CampaignLayout {
        &self.layout
    }

    pub fn grid(&self) -> &BoardGrid {
        &self.grid
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Code the server assigned, once finalized
    pub fn board_code(&self) -> Option<&str> {
        self.board_code.as_deref()
    }

    pub fn phase(&self) -> BoardPhase {
        if self.board_code.is_some() {
            BoardPhase::Finalized
        } else if self.grid.is_full() {
            BoardPhase::Full
        } else if self.grid.placed_count() > 0 {
            BoardPhase::PartiallyFilled
        } else {
            BoardPhase::Initialized
        }
    }

    /// Toggle an item and reconcile the grid with the new selection
    pub fn select(
        &mut self,
        category_id: CategoryId,
        item_id: ItemId,
    ) -> Result<SelectionChange, BuilderError> {
        if self.board_code.is_some() {
            return Err(BuilderError::AlreadyFinalized);
        }
        let kind = self
            .layout
            .category(category_id)
            .ok_or(BuilderError::UnknownCategory(category_id))?
            .kind;
        let item = self
            .layout
            .item(item_id)
            .ok_or(BuilderError::UnknownItem(item_id))?;
        if item.category_id != category_id {
            return Err(BuilderError::ItemNotInCategory {
                item: item_id,
                category: category_id,
            });
        }
        let placed = PlacedItem {
            item_id,
            category_id,
            text: item.text.clone(),
        };

        let change = self.selections.select(category_id, kind, item_id);
        match change {
            SelectionChange::Added(_) => {
                if kind == CategoryKind::ChooseOne {
                    self.grid.clear_category(category_id);
                }
                if self.grid.place_first_empty(placed).is_none() {
                    // Nothing on the board to back the selection
                    self.selections.deselect(category_id, item_id);
                    tracing::debug!("Board is full, item {} not placed", item_id);
                    return Err(BuilderError::BoardFull);
                }
            }
            SelectionChange::Replaced { .. } => {
                self.grid.clear_category(category_id);
                self.grid.place_first_empty(placed);
            }
            SelectionChange::Removed(removed) => {
                self.grid.clear_item(removed);
            }
            SelectionChange::Cleared(_) => {
                self.grid.clear_category(category_id);
            }
        }
        Ok(change)
    }

    /// Empty a cell and drop its item from the selection. The center cell
    /// cannot be removed.
    pub fn remove_cell(&mut self, index: usize) -> Option<PlacedItem> {
        if self.board_code.is_some() {
            return None;
        }
        let removed = self.grid.remove_cell(index)?;
        self.selections.deselect(removed.category_id, removed.item_id);
        Some(removed)
    }

    /// Drag-and-drop rearrangement
    pub fn swap(&mut self, from: usize, to: usize) -> bool {
        if self.board_code.is_some() {
            return false;
        }
        self.grid.swap(from, to)
    }

    /// Update the name as the player types; the center tile follows it
    pub fn set_player_name(&mut self, name: impl Into<String>) {
        if self.board_code.is_some() {
            return;
        }
        self.player_name = name.into();
        let shown = Some(self.player_name.clone()).filter(|name| !name.trim().is_empty());
        self.grid.rename_center(shown);
    }

    pub fn is_item_selected(&self, category_id: CategoryId, item_id: ItemId) -> bool {
        self.selections.is_item_selected(category_id, item_id)
    }

    pub fn is_item_on_board(&self, item_id: ItemId) -> bool {
        self.grid.contains_item(item_id)
    }

    /// Name typed, every required category on the board, every cell filled
    pub fn can_finalize(&self) -> bool {
        self.missing_piece().is_none()
    }

    pub fn missing_piece(&self) -> Option<MissingPiece> {
        if self.player_name.trim().is_empty() {
            return Some(MissingPiece::PlayerName);
        }

        let missing: Vec<String> = self
            .layout
            .categories()
            .iter()
            .filter(|category| {
                category.required
                    && !self
                        .grid
                        .items()
                        .any(|(_, placed)| placed.category_id == category.id)
            })
            .map(|category| category.name.clone())
            .collect();
        if !missing.is_empty() {
            return Some(MissingPiece::RequiredCategories(missing));
        }

        match self.grid.empty_count() {
            0 => None,
            empty => Some(MissingPiece::EmptyCells(empty)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Whether the submit control should be enabled
    pub fn can_submit(&self) -> bool {
        self.board_code.is_none() && !self.is_busy() && self.can_finalize()
    }

    /// Snapshot the board for submission and raise the busy flag. Fails
    /// while a previous submission is still outstanding.
    pub fn begin_finalize(&self) -> Result<(FinalizedBoard, SubmitGuard), BuilderError> {
        if self.board_code.is_some() {
            return Err(BuilderError::AlreadyFinalized);
        }
        if let Some(missing) = self.missing_piece() {
            return Err(BuilderError::NotReady(missing));
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(BuilderError::Busy);
        }
        let guard = SubmitGuard {
            busy: Arc::clone(&self.busy),
        };

        let board = FinalizedBoard {
            campaign_code: self.layout.code.clone(),
            request: self.submission(),
        };
        Ok((board, guard))
    }

    /// The grid as the flat tile list the server expects, empty cells omitted
    fn submission(&self) -> SubmitBoardRequest {
        let player_name = self.player_name.trim().to_string();
        let selected_tiles = self
            .grid
            .cells()
            .iter()
            .enumerate()
            .filter_map(|(position, cell)| match cell.as_ref()? {
                Cell::Center { .. } => Some(TileSubmission {
                    position,
                    category_item_id: None,
                    is_center: true,
                    custom_text: Some(player_name.clone()),
                }),
                Cell::Item(placed) => Some(TileSubmission {
                    position,
                    category_item_id: Some(placed.item_id),
                    is_center: false,
                    custom_text: None,
                }),
            })
            .collect();

        SubmitBoardRequest {
            player_name,
            selected_tiles,
        }
    }

    /// Record the code the server assigned to `board`. No further edits are
    /// accepted. Fails, leaving the builder editable, when the grid or name
    /// no longer match what was sent.
    pub fn complete(
        &mut self,
        board: &FinalizedBoard,
        board_code: String,
    ) -> Result<(), BuilderError> {
        if self.board_code.is_some() {
            return Err(BuilderError::AlreadyFinalized);
        }
        if board.campaign_code != self.layout.code || board.request != self.submission() {
            return Err(BuilderError::ChangedSinceSubmit { board_code });
        }
        self.board_code = Some(board_code);
        Ok(())
    }
}
