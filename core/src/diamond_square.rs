use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Result, TerrainError};
use crate::grid::{HeightGrid, is_diamond_square_size};

// 2D fractal terrain generator using the Diamond–Square algorithm
pub struct DiamondSquare {
    roughness: f32, // scales the random offset, 0 gives a smooth interpolation
    min_random: f32,
    max_random: f32,
    corners: [f32; 4], // top-left, top-right, bottom-left, bottom-right
    rng: ChaCha8Rng,
}

impl DiamondSquare {
    pub fn new(roughness: f32, min_random: f32, max_random: f32) -> Self {
        Self {
            roughness,
            min_random,
            max_random,
            corners: [0.0; 4],
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    // Reproducible output for the same seed and parameters
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    pub fn with_corners(mut self, corners: [f32; 4]) -> Self {
        self.corners = corners;
        self
    }

    // Amplitude of the random offset for a step of width `step` on a grid with span `span`
    pub fn noise_amplitude(&self, step: usize, span: usize) -> f32 {
        (self.max_random - self.min_random) * self.roughness * (step as f32 / span as f32)
    }

    // Generate a fresh size×size height-map
    pub fn generate(&mut self, size: usize) -> Result<HeightGrid> {
        let mut grid = HeightGrid::new(size);
        self.fill(&mut grid)?;
        Ok(grid)
    }

    /// Overwrite `grid` with a new fractal surface.
    ///
    /// The grid is left untouched when its size is not `2^k + 1` or when the
    /// random range is empty.
    pub fn fill(&mut self, grid: &mut HeightGrid) -> Result<()> {
        let size = grid.size();
        if !is_diamond_square_size(size) {
            warn!("refusing to generate terrain: size {size} is not 2^k + 1");
            return Err(TerrainError::InvalidGridSize(size));
        }
        if self.min_random >= self.max_random {
            warn!(
                "refusing to generate terrain: empty random range {}..{}",
                self.min_random, self.max_random
            );
            return Err(TerrainError::InvalidRandomRange {
                min: self.min_random,
                max: self.max_random,
            });
        }

        let s = size - 1;
        grid.fill(0.0);
        let [tl, tr, bl, br] = self.corners;
        grid.set(0, 0, tl);
        grid.set(s, 0, tr);
        grid.set(0, s, bl);
        grid.set(s, s, br);

        /*
         * Names used inside one square of width i:
         *
         * s0 . d0. s1
         *  . . . . .
         * d1 . cn. d2
         *  . . . . .
         * s2 . d3. s3
         */
        let mut i = s;
        while i > 1 {
            let half = i / 2;
            let amp = self.noise_amplitude(i, s);

            // Diamond step
            for y in (0..s).step_by(i) {
                for x in (0..s).step_by(i) {
                    let avg = (grid.get(x, y)
                        + grid.get(x + i, y)
                        + grid.get(x, y + i)
                        + grid.get(x + i, y + i))
                        / 4.0;
                    let offset = self.offset(amp);
                    grid.set(x + half, y + half, avg + offset);
                }
            }

            // Square step, edge midpoints shared by two squares are written twice
            for y in (0..s).step_by(i) {
                for x in (0..s).step_by(i) {
                    let s0 = *grid.get(x, y);
                    let s1 = *grid.get(x + i, y);
                    let s2 = *grid.get(x, y + i);
                    let s3 = *grid.get(x + i, y + i);
                    let cn = *grid.get(x + half, y + half);

                    let d0 = if y == 0 {
                        (s0 + s1 + cn) / 3.0
                    } else {
                        (s0 + s1 + cn + grid.get(x + half, y - half)) / 4.0
                    };
                    let d1 = if x == 0 {
                        (s0 + cn + s2) / 3.0
                    } else {
                        (s0 + cn + s2 + grid.get(x - half, y + half)) / 4.0
                    };
                    let d2 = if x >= s - i {
                        (s1 + cn + s3) / 3.0
                    } else {
                        (s1 + cn + s3 + grid.get(x + i + half, y + half)) / 4.0
                    };
                    let d3 = if y >= s - i {
                        (cn + s2 + s3) / 3.0
                    } else {
                        (cn + s2 + s3 + grid.get(x + half, y + i + half)) / 4.0
                    };

                    let o0 = self.offset(amp);
                    let o1 = self.offset(amp);
                    let o2 = self.offset(amp);
                    let o3 = self.offset(amp);
                    grid.set(x + half, y, d0 + o0);
                    grid.set(x, y + half, d1 + o1);
                    grid.set(x + i, y + half, d2 + o2);
                    grid.set(x + half, y + i, d3 + o3);
                }
            }

            i = half;
        }

        info!(
            "generated {size}x{size} diamond-square terrain (roughness {})",
            self.roughness
        );
        Ok(())
    }

    // Uniform sample in [-amp, amp)
    fn offset(&mut self, amp: f32) -> f32 {
        -amp + self.rng.r#gen::<f32>() * (2.0 * amp)
    }
}
