// core holds the fractal generator, both erosion simulations and the mesh builder
pub mod config;
pub mod diamond_square;
pub mod error;
pub mod grid;
pub mod hydraulic;
pub mod mesh;
pub mod preview;
pub mod terrain;
pub mod thermal;

pub use config::TerrainConfig;
pub use diamond_square::DiamondSquare;
pub use error::{Result, TerrainError};
pub use grid::{Grid, HeightGrid};
pub use hydraulic::{HydraulicErosion, HydraulicReport, Peak};
pub use mesh::{Mesh, MeshBuilder, Vertex};
pub use terrain::Terrain;
pub use thermal::ThermalErosion;
