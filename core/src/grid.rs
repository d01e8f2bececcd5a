use crate::error::{Result, TerrainError};

// Offsets of the 8-neighbourhood, x offset outer, y offset inner.
// The centre (0, 0) is kept so callers iterate exactly like a nested
// `for i in -1..=1 { for j in -1..=1 }` loop.
pub const NEIGHBOUR_OFFSETS: [(isize, isize); 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Square grid stored row-major, indexed as `(x, y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    size: usize,
    cells: Vec<T>,
}

/// Elevation grid shared by the generator, both erosion passes and the mesh builder.
pub type HeightGrid = Grid<f32>;

impl<T: Clone> Grid<T> {
    // Create a size×size grid filled with `value`
    pub fn filled(size: usize, value: T) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }

    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T> Grid<T> {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.size && y < self.size, "({x}, {y}) outside grid");
        y * self.size + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.cells[self.index(x, y)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let i = self.index(x, y);
        &mut self.cells[i]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let i = self.index(x, y);
        self.cells[i] = value;
    }

    // Coordinates of (x + dx, y + dy) if they fall inside the grid
    #[inline]
    pub fn offset(&self, x: usize, y: usize, dx: isize, dy: isize) -> Option<(usize, usize)> {
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        (nx < self.size && ny < self.size).then_some((nx, ny))
    }

    // True on the outer ring of cells
    pub fn is_margin(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.size || y + 1 == self.size
    }

    // Row-major view, cell (x, y) sits at `y * size + x`
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }
}

impl Grid<f32> {
    pub fn new(size: usize) -> Self {
        Self::filled(size, 0.0)
    }

    // Build from explicit rows, `rows[y][x]`
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return Err(TerrainError::InvalidGridSize(size));
        }
        Ok(Self {
            size,
            cells: rows.iter().flat_map(|row| row.iter().copied()).collect(),
        })
    }

    // Global (min, max) elevation
    pub fn min_max(&self) -> (f32, f32) {
        self.cells
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            })
    }

    pub fn sum(&self) -> f64 {
        self.cells.iter().map(|&h| h as f64).sum()
    }

    // Returns the first NaN/infinite cell as an error
    pub fn check_finite(&self) -> Result<()> {
        match self.cells.iter().position(|h| !h.is_finite()) {
            Some(i) => Err(TerrainError::NonFiniteHeight {
                x: i % self.size,
                y: i / self.size,
            }),
            None => Ok(()),
        }
    }
}

// n = 2^k + 1 with k >= 1
pub fn is_diamond_square_size(size: usize) -> bool {
    size >= 3 && (size - 1).is_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_offsets_stay_in_bounds() {
        let g = HeightGrid::new(3);
        assert_eq!(g.offset(0, 0, -1, 0), None);
        assert_eq!(g.offset(2, 2, 1, 0), None);
        assert_eq!(g.offset(1, 1, 1, -1), Some((2, 0)));
    }

    #[test]
    fn grid_margin_is_outer_ring() {
        let g = HeightGrid::new(5);
        assert!(g.is_margin(0, 2));
        assert!(g.is_margin(4, 2));
        assert!(g.is_margin(2, 4));
        assert!(!g.is_margin(1, 3));
    }

    #[test]
    fn grid_row_major_layout() {
        let g = HeightGrid::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(*g.get(1, 0), 2.0);
        assert_eq!(*g.get(0, 1), 3.0);
        assert_eq!(g.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(g.min_max(), (1.0, 4.0));
    }

    #[test]
    fn grid_rejects_ragged_rows() {
        assert!(HeightGrid::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_err());
    }

    #[test]
    fn grid_reports_non_finite_cell() {
        let mut g = HeightGrid::new(3);
        g.set(2, 1, f32::NAN);
        match g.check_finite() {
            Err(TerrainError::NonFiniteHeight { x, y }) => assert_eq!((x, y), (2, 1)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn diamond_square_sizes() {
        assert!(is_diamond_square_size(3));
        assert!(is_diamond_square_size(129));
        assert!(!is_diamond_square_size(1));
        assert!(!is_diamond_square_size(2));
        assert!(!is_diamond_square_size(6));
    }
}
