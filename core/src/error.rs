use thiserror::Error;

/// Errors raised by terrain generation, erosion and configuration loading.
#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("grid size {0} is not 2^k + 1")]
    InvalidGridSize(usize),

    #[error("grid exponent {exponent} is outside 1..={max}")]
    InvalidGridExponent { exponent: u32, max: u32 },

    #[error("random range is empty: min {min} must be below max {max}")]
    InvalidRandomRange { min: f32, max: f32 },

    #[error("non-finite height at ({x}, {y})")]
    NonFiniteHeight { x: usize, y: usize },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TerrainError>;
