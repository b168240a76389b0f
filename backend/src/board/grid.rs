use crate::models::{BoardSize, CategoryId, ItemId};

/// An item placed on the board, carrying enough to render and to match back
/// to its category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedItem {
    pub item_id: ItemId,
    pub category_id: CategoryId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// The free space. Shows the player's name once one is typed.
    Center { custom_text: Option<String> },
    Item(PlacedItem),
}

impl Cell {
    pub fn item(&self) -> Option<&PlacedItem> {
        match self {
            Cell::Item(placed) => Some(placed),
            Cell::Center { .. } => None,
        }
    }
}

/// Fixed-size sequence of `size²` cells; the center cell is always occupied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardGrid {
    size: BoardSize,
    cells: Vec<Option<Cell>>,
}

impl BoardGrid {
    pub fn new(size: BoardSize) -> Self {
        let mut cells = vec![None; size.cell_count()];
        cells[size.center_index()] = Some(Cell::Center { custom_text: None });
        Self { size, cells }
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn center_index(&self) -> usize {
        self.size.center_index()
    }

    pub fn cells(&self) -> &[Option<Cell>] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    /// Number of cells holding an item (the center is not counted)
    pub fn placed_count(&self) -> usize {
        self.items().count()
    }

    pub fn items(&self) -> impl Iterator<Item = (usize, &PlacedItem)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| cell.as_ref().and_then(Cell::item).map(|p| (index, p)))
    }

    pub fn position_of(&self, item_id: ItemId) -> Option<usize> {
        self.items()
            .find(|(_, placed)| placed.item_id == item_id)
            .map(|(index, _)| index)
    }

    pub fn contains_item(&self, item_id: ItemId) -> bool {
        self.position_of(item_id).is_some()
    }

    /// Place into the lowest-indexed empty cell. Returns where the item
    /// landed, or `None` when the grid is already full.
    pub fn place_first_empty(&mut self, item: PlacedItem) -> Option<usize> {
        let index = self.cells.iter().position(Option::is_none)?;
        self.cells[index] = Some(Cell::Item(item));
        Some(index)
    }

    /// Empty every cell holding an item from `category_id`. Returns how many
    /// cells were cleared.
    pub fn clear_category(&mut self, category_id: CategoryId) -> usize {
        let mut cleared = 0;
        for cell in self.cells.iter_mut() {
            let matches = cell
                .as_ref()
                .and_then(Cell::item)
                .is_some_and(|placed| placed.category_id == category_id);
            if matches {
                *cell = None;
                cleared += 1;
            }
        }
        cleared
    }

    /// Empty the cell holding `item_id`, leaving the rest of its category alone
    pub fn clear_item(&mut self, item_id: ItemId) -> Option<usize> {
        let index = self.position_of(item_id)?;
        self.cells[index] = None;
        Some(index)
    }

    /// Empty a cell. The center cell is never removable.
    pub fn remove_cell(&mut self, index: usize) -> Option<PlacedItem> {
        if index == self.center_index() {
            return None;
        }
        match self.cells.get_mut(index)?.take() {
            Some(Cell::Item(placed)) => Some(placed),
            other => {
                self.cells[index] = other;
                None
            }
        }
    }

    /// Exchange two cells (either may be empty). Dropping a cell onto itself,
    /// an index off the board, or any swap involving the center leaves the
    /// grid untouched and returns `false`.
    pub fn swap(&mut self, from: usize, to: usize) -> bool {
        let center = self.center_index();
        if from == to || from == center || to == center {
            return false;
        }
        if from >= self.cells.len() || to >= self.cells.len() {
            return false;
        }
        self.cells.swap(from, to);
        true
    }

    pub fn rename_center(&mut self, text: Option<String>) {
        let center = self.center_index();
        self.cells[center] = Some(Cell::Center { custom_text: text });
    }

    pub fn center_text(&self) -> Option<&str> {
        match self.cell(self.center_index()) {
            Some(Cell::Center { custom_text }) => custom_text.as_deref(),
            _ => None,
        }
    }
}
