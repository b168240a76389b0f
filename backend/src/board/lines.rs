use crate::models::BoardSize;

/// Every winning line on a board: rows, columns, then both diagonals, each
/// as a list of cell positions
pub fn winning_lines(size: BoardSize) -> Vec<Vec<usize>> {
    let n = size.side();
    let mut lines = Vec::with_capacity(2 * n + 2);

    for row in 0..n {
        lines.push((0..n).map(|col| row * n + col).collect());
    }
    for col in 0..n {
        lines.push((0..n).map(|row| row * n + col).collect());
    }
    lines.push((0..n).map(|i| i * n + i).collect());
    lines.push((0..n).map(|i| i * n + (n - 1 - i)).collect());

    lines
}

/// Count lines whose every cell is marked. `marked` is indexed by position;
/// positions past its end count as unmarked.
pub fn completed_lines(size: BoardSize, marked: &[bool]) -> usize {
    winning_lines(size)
        .iter()
        .filter(|line| line.iter().all(|&pos| marked.get(pos).copied().unwrap_or(false)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(side: u8) -> BoardSize {
        BoardSize::new(side).unwrap()
    }

    #[test]
    fn test_line_count_per_size() {
        assert_eq!(winning_lines(size(3)).len(), 8);
        assert_eq!(winning_lines(size(4)).len(), 10);
        assert_eq!(winning_lines(size(5)).len(), 12);
    }

    #[test]
    fn test_diagonals_on_3x3() {
        let lines = winning_lines(size(3));
        assert!(lines.contains(&vec![0, 4, 8]));
        assert!(lines.contains(&vec![2, 4, 6]));
    }

    #[test]
    fn test_only_center_marked_completes_nothing() {
        let mut marked = vec![false; 9];
        marked[4] = true;
        assert_eq!(completed_lines(size(3), &marked), 0);
    }

    #[test]
    fn test_middle_row_and_column() {
        let mut marked = vec![false; 9];
        for pos in [3, 4, 5, 1, 7] {
            marked[pos] = true;
        }
        assert_eq!(completed_lines(size(3), &marked), 2);
    }

    #[test]
    fn test_full_board_completes_every_line() {
        assert_eq!(completed_lines(size(4), &[true; 16]), 10);
    }

    #[test]
    fn test_short_marking_counts_as_unmarked() {
        assert_eq!(completed_lines(size(3), &[true; 3]), 1);
    }
}
