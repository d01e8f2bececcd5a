use log::debug;

use crate::grid::{HeightGrid, NEIGHBOUR_OFFSETS};

// Fraction of the global height range moved per transfer
const EROSION_DIVISOR: f32 = 1000.0;

pub struct ThermalErosion {
    iterations: usize,
}

impl ThermalErosion {
    // iterations - how many passes to run
    // More iterations = smoother terrain.
    pub fn new(iterations: usize) -> Self {
        Self { iterations }
    }

    // In‐place apply erosion to the height‐map
    pub fn apply(&self, grid: &mut HeightGrid) {
        for pass in 0..self.iterations {
            if !Self::step(grid) {
                debug!("thermal erosion settled after {pass} passes");
                break;
            }
        }
    }

    /// Runs one sweep and returns `false` when the grid is flat.
    ///
    /// Every cell hands `(peak - low) / 1000` to each strictly lower
    /// 8-neighbour. The sweep reads the live grid, so a cell that already
    /// received material earlier in the sweep gives from its updated height.
    pub fn step(grid: &mut HeightGrid) -> bool {
        let (low, peak) = grid.min_max();
        if peak <= low {
            return false;
        }
        let erosion_height = (peak - low) / EROSION_DIVISOR;
        let size = grid.size();
        let mut transfers = 0usize;

        for x in 0..size {
            for y in 0..size {
                for &(i, j) in &NEIGHBOUR_OFFSETS {
                    let Some((nx, ny)) = grid.offset(x, y, i, j) else {
                        continue;
                    };
                    if grid.get(nx, ny) < grid.get(x, y) {
                        *grid.get_mut(nx, ny) += erosion_height;
                        *grid.get_mut(x, y) -= erosion_height;
                        transfers += 1;
                    }
                }
            }
        }

        debug!("thermal pass: step {erosion_height}, {transfers} transfers");
        true
    }
}
