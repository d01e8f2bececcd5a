use log::info;

use crate::config::TerrainConfig;
use crate::diamond_square::DiamondSquare;
use crate::error::Result;
use crate::grid::HeightGrid;
use crate::hydraulic::{HydraulicErosion, HydraulicReport};
use crate::mesh::{Mesh, MeshBuilder};
use crate::thermal::ThermalErosion;

/// Owns the height-map for one session.
///
/// Every mutation goes through `&mut self`, so generation and erosion can
/// never overlap on the same grid.
pub struct Terrain {
    config: TerrainConfig,
    grid: HeightGrid,
    builder: MeshBuilder,
}

impl Terrain {
    pub fn new(config: TerrainConfig) -> Result<Self> {
        let grid = HeightGrid::new(config.grid_size()?);
        Ok(Self {
            config,
            grid,
            builder: MeshBuilder::default(),
        })
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut TerrainConfig {
        &mut self.config
    }

    pub fn grid(&self) -> &HeightGrid {
        &self.grid
    }

    // On error the previous grid stays in place
    pub fn generate(&mut self) -> Result<()> {
        let c = &self.config;
        let mut generator = DiamondSquare::new(c.noise_factor(), c.min_random, c.max_random);
        if let Some(seed) = c.seed {
            generator = generator.with_seed(seed);
        }
        let mut grid = HeightGrid::new(c.grid_size()?);
        generator.fill(&mut grid)?;
        self.grid = grid;
        Ok(())
    }

    pub fn apply_thermal_erosion(&mut self, iterations: usize) -> Result<()> {
        ThermalErosion::new(iterations).apply(&mut self.grid);
        self.grid.check_finite()?;
        info!("applied {iterations} thermal erosion passes");
        Ok(())
    }

    pub fn apply_hydraulic_erosion(
        &mut self,
        iterations: usize,
        water_quantity: f32,
    ) -> Result<HydraulicReport> {
        let erosion = HydraulicErosion::new(iterations, water_quantity, self.config.sediment_factor);
        let report = erosion.apply(&mut self.grid);
        self.grid.check_finite()?;
        info!(
            "applied {iterations} hydraulic erosion steps (water {water_quantity}): {} peaks, margin loss {:.3}",
            report.peaks, report.margin_loss
        );
        Ok(report)
    }

    // Rebuild after every generation or erosion batch
    pub fn mesh(&self) -> Mesh {
        self.builder.build(&self.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::Terrain;
    use crate::config::TerrainConfig;
    use crate::error::TerrainError;

    fn seeded(exponent: u32) -> TerrainConfig {
        TerrainConfig {
            grid_exponent: exponent,
            seed: Some(11),
            ..TerrainConfig::default()
        }
    }

    #[test]
    fn failed_generation_keeps_previous_grid() {
        let mut t = Terrain::new(seeded(4)).unwrap();
        t.generate().unwrap();
        let before = t.grid().clone();
        t.config_mut().min_random = 50.0;
        assert!(t.generate().is_err());
        assert_eq!(t.grid(), &before);
    }

    #[test]
    fn erosion_batches_reshape_terrain() {
        let mut t = Terrain::new(seeded(5)).unwrap();
        t.generate().unwrap();
        let generated = t.grid().clone();
        t.apply_thermal_erosion(3).unwrap();
        assert_ne!(t.grid(), &generated);
        let eroded = t.grid().clone();
        let report = t.apply_hydraulic_erosion(2, 0.1).unwrap();
        assert!(report.peaks > 0);
        assert_ne!(t.grid(), &eroded);
    }

    #[test]
    fn mesh_tracks_grid_size() {
        let mut t = Terrain::new(seeded(3)).unwrap();
        t.generate().unwrap();
        let mesh = t.mesh();
        assert_eq!(mesh.vertices.len(), 81);
        assert_eq!(mesh.index_data().len(), 6 * 64);
    }

    #[test]
    fn oversized_exponent_is_an_error() {
        assert!(matches!(
            Terrain::new(seeded(64)),
            Err(TerrainError::InvalidGridExponent { exponent: 64, .. })
        ));
        // An exponent changed after construction fails the next generation
        let mut t = Terrain::new(seeded(3)).unwrap();
        t.generate().unwrap();
        let before = t.grid().clone();
        t.config_mut().grid_exponent = 40;
        assert!(t.generate().is_err());
        assert_eq!(t.grid(), &before);
    }
}
