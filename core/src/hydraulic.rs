//! Water and sediment transport flowing outward from local peaks.

use log::debug;

use crate::grid::{Grid, HeightGrid, NEIGHBOUR_OFFSETS};

// Deposition rate
const KD: f32 = 0.1;
// Sediment capacity per unit of moved water
const KC: f32 = 5.0;
// Erosion (pick-up) rate
const KS: f32 = 0.3;

// Axis-aligned offsets in the order a nested i/j loop visits them
const AXIS_OFFSETS: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// A local maximum: no 8-neighbour is strictly higher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub value: f32,
    pub x: usize,
    pub y: usize,
}

/// Mass bookkeeping for one hydraulic step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HydraulicReport {
    pub peaks: usize,
    pub cells_visited: usize,
    // Sediment discarded when flow reaches the outer ring
    pub margin_loss: f64,
    // Elevation added where water could not move on
    pub stalled_deposit: f64,
}

pub struct HydraulicErosion {
    iterations: usize,
    water_quantity: f32,
    sediment_factor: f32,
}

impl HydraulicErosion {
    // water_quantity - water every cell starts with
    // sediment_factor - share of moved water that carries terrain along
    pub fn new(iterations: usize, water_quantity: f32, sediment_factor: f32) -> Self {
        Self {
            iterations,
            water_quantity,
            sediment_factor,
        }
    }

    // In-place apply `iterations` steps, peaks are searched again every step
    pub fn apply(&self, grid: &mut HeightGrid) -> HydraulicReport {
        let mut total = HydraulicReport::default();
        for _ in 0..self.iterations {
            let report = self.step(grid);
            total.peaks += report.peaks;
            total.cells_visited += report.cells_visited;
            total.margin_loss += report.margin_loss;
            total.stalled_deposit += report.stalled_deposit;
        }
        total
    }

    pub fn step(&self, grid: &mut HeightGrid) -> HydraulicReport {
        let peaks = find_peaks(grid);
        let mut transport = Transport::new(grid, self.water_quantity, self.sediment_factor);
        for peak in &peaks {
            transport.propagate(peak.x, peak.y);
        }
        let mut report = transport.report;
        report.peaks = peaks.len();
        debug!(
            "hydraulic step: {} peaks, {} cells visited, margin loss {:.4}, stalled {:.4}",
            report.peaks, report.cells_visited, report.margin_loss, report.stalled_deposit
        );
        report
    }
}

// Collect peaks x outer, y inner
pub fn find_peaks(grid: &HeightGrid) -> Vec<Peak> {
    let size = grid.size();
    let mut peaks = Vec::new();
    for x in 0..size {
        for y in 0..size {
            let value = *grid.get(x, y);
            let higher = NEIGHBOUR_OFFSETS.iter().any(|&(i, j)| {
                grid.offset(x, y, i, j)
                    .is_some_and(|(nx, ny)| *grid.get(nx, ny) > value)
            });
            if !higher {
                peaks.push(Peak { value, x, y });
            }
        }
    }
    peaks
}

// One pending cell on the depth-first walk and the next axis offset to try
struct Frame {
    x: usize,
    y: usize,
    next: usize,
}

// Per-step state: terrain plus water, sediment and visited trackers
struct Transport<'a> {
    heights: &'a mut HeightGrid,
    visited: Grid<bool>,
    water: Grid<f32>,
    sediment: Grid<f32>,
    sediment_factor: f32,
    report: HydraulicReport,
}

impl<'a> Transport<'a> {
    fn new(heights: &'a mut HeightGrid, water_quantity: f32, sediment_factor: f32) -> Self {
        let size = heights.size();
        Self {
            heights,
            visited: Grid::filled(size, false),
            water: Grid::filled(size, water_quantity),
            sediment: Grid::filled(size, water_quantity * sediment_factor),
            sediment_factor,
            report: HydraulicReport::default(),
        }
    }

    /// Depth-first flow from `(x, y)`.
    ///
    /// Each frame tries its four axis neighbours in order and descends into an
    /// unvisited lower neighbour right after transferring to it, before trying
    /// the next offset. `visited` bounds the walk on cyclic neighbour graphs.
    fn propagate(&mut self, x: usize, y: usize) {
        let mut stack = Vec::new();
        self.enter(x, y, &mut stack);

        while let Some(frame) = stack.last_mut() {
            if frame.next == AXIS_OFFSETS.len() {
                stack.pop();
                continue;
            }
            let (i, j) = AXIS_OFFSETS[frame.next];
            frame.next += 1;
            let (cx, cy) = (frame.x, frame.y);

            let Some((nx, ny)) = self.heights.offset(cx, cy, i, j) else {
                continue;
            };
            let downhill = self.heights.get(cx, cy) > self.heights.get(nx, ny);
            if !downhill {
                continue;
            }

            if self.heights.is_margin(nx, ny) {
                self.drain(nx, ny);
            } else {
                self.transfer((cx, cy), (nx, ny));
            }

            if !*self.visited.get(nx, ny) {
                self.enter(nx, ny, &mut stack);
            }
        }
    }

    // Mark visited and open a frame unless nothing around is lower
    fn enter(&mut self, x: usize, y: usize, stack: &mut Vec<Frame>) {
        if !*self.visited.get(x, y) {
            self.visited.set(x, y, true);
            self.report.cells_visited += 1;
        }
        if self.lower_neighbours(x, y) > 0 {
            stack.push(Frame { x, y, next: 0 });
        }
    }

    fn lower_neighbours(&self, x: usize, y: usize) -> usize {
        let h = *self.heights.get(x, y);
        NEIGHBOUR_OFFSETS
            .iter()
            .filter_map(|&(i, j)| self.heights.offset(x, y, i, j))
            .filter(|&(nx, ny)| *self.heights.get(nx, ny) < h)
            .count()
    }

    // The outer ring swallows whatever reaches it
    fn drain(&mut self, x: usize, y: usize) {
        self.report.margin_loss += *self.sediment.get(x, y) as f64;
        self.water.set(x, y, 0.0);
        self.sediment.set(x, y, 0.0);
    }

    fn transfer(&mut self, (cx, cy): (usize, usize), (nx, ny): (usize, usize)) {
        let h = *self.heights.get(cx, cy);
        let nh = *self.heights.get(nx, ny);
        let w = *self.water.get(cx, cy);
        let nw = *self.water.get(nx, ny);
        let s = *self.sediment.get(cx, cy);

        let wt = w.min((w + h) - (nw + nh));
        if wt <= 0.0 {
            let deposit = KS * s;
            *self.heights.get_mut(cx, cy) += deposit;
            self.report.stalled_deposit += deposit as f64;
            return;
        }

        // Water carries terrain with it on top of the tracked sediment
        *self.water.get_mut(cx, cy) -= wt;
        *self.water.get_mut(nx, ny) += wt;
        *self.heights.get_mut(cx, cy) -= wt * self.sediment_factor;
        *self.heights.get_mut(nx, ny) += wt * self.sediment_factor;

        let cs = KC * wt;
        if s >= cs {
            // Over capacity: pass `cs` on and settle part of the rest
            *self.sediment.get_mut(nx, ny) += cs;
            *self.heights.get_mut(cx, cy) += KD * (s - cs);
            self.sediment.set(cx, cy, (1.0 - KD) * (s - cs));
        } else {
            // Under capacity: pick up terrain and hand everything on
            *self.sediment.get_mut(nx, ny) += s + KS * (cs - s);
            *self.heights.get_mut(cx, cy) -= KS * (cs - s);
            self.sediment.set(cx, cy, 0.0);
        }
    }
}
