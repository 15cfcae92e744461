use crate::snapshot::Coord;

/// Widest yard accepted; column labels are two digits
pub const MAX_COLS: usize = 99;

// Yard grid dimensions
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: crate::GRID_ROWS,
            cols: crate::GRID_COLS,
        }
    }
}

impl GridConfig {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn cell_count(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    /// Whether a coordinate lies inside the yard (1-indexed).
    pub fn contains(&self, coord: Coord) -> bool {
        coord.y >= 1 && coord.x >= 1 && coord.y as usize <= self.rows && coord.x as usize <= self.cols
    }

    /// Yard coordinates in rendering order: top row first, left to right.
    pub fn traversal(&self) -> impl Iterator<Item = Coord> + '_ {
        (1..=self.rows as i64)
            .rev()
            .flat_map(move |y| (1..=self.cols as i64).map(move |x| Coord::new(y, x)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traversal_starts_top_left() {
        let config = GridConfig::default();
        let order: Vec<Coord> = config.traversal().collect();
        assert_eq!(order.len(), 96);
        assert_eq!(order[0], Coord::new(8, 1));
        assert_eq!(order[11], Coord::new(8, 12));
        assert_eq!(order[12], Coord::new(7, 1));
        assert_eq!(order[95], Coord::new(1, 12));
    }

    #[test]
    fn test_contains_excludes_park_row() {
        let config = GridConfig::default();
        assert!(config.contains(Coord::new(1, 1)));
        assert!(config.contains(Coord::new(8, 12)));
        assert!(!config.contains(Coord::new(9, 1)));
        assert!(!config.contains(Coord::new(0, 3)));
    }

    #[test]
    fn test_cell_count_saturates() {
        assert_eq!(GridConfig::default().cell_count(), 96);
        assert_eq!(GridConfig::new(8, usize::MAX).cell_count(), usize::MAX);
    }
}
