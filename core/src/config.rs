use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};

// Largest accepted exponent, 4097×4097
pub const MAX_GRID_EXPONENT: u32 = 12;

/// Generation and erosion settings driven by the controls.
///
/// Missing keys in a TOML file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    // grid size is 2^grid_exponent + 1
    pub grid_exponent: u32,
    // slider value, the generator uses roughness / 5
    pub roughness: f32,
    pub min_random: f32,
    pub max_random: f32,
    pub seed: Option<u64>,
    pub sediment_factor: f32,
    pub water_quantity: f32,
    pub thermal_iterations: usize,
    pub hydraulic_iterations: usize,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            grid_exponent: 7, // 129×129
            roughness: 5.0,
            min_random: 0.0,
            max_random: 40.0,
            seed: None,
            sediment_factor: 0.5,
            water_quantity: 0.1,
            thermal_iterations: 10,
            hydraulic_iterations: 1,
        }
    }
}

impl TerrainConfig {
    // 2^grid_exponent + 1, exponents outside 1..=MAX_GRID_EXPONENT are refused
    pub fn grid_size(&self) -> Result<usize> {
        if !(1..=MAX_GRID_EXPONENT).contains(&self.grid_exponent) {
            return Err(TerrainError::InvalidGridExponent {
                exponent: self.grid_exponent,
                max: MAX_GRID_EXPONENT,
            });
        }
        1usize
            .checked_shl(self.grid_exponent)
            .map(|cells| cells + 1)
            .ok_or(TerrainError::InvalidGridExponent {
                exponent: self.grid_exponent,
                max: MAX_GRID_EXPONENT,
            })
    }

    pub fn noise_factor(&self) -> f32 {
        self.roughness / 5.0
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.grid_size()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
