// Generates and saves three 257×257 terrain images:
// Diamond–Square fractal
// Fractal + thermal erosion
// Fractal + thermal + hydraulic erosion

use std::path::Path;

use log::info;
use terrain_core::preview::grayscale_image;
use terrain_core::{DiamondSquare, HeightGrid, HydraulicErosion, ThermalErosion};

fn save_grayscale(grid: &HeightGrid, filename: &str) -> image::ImageResult<()> {
    grayscale_image(grid).save(Path::new(filename))?;
    info!("saved {filename}");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let size = 257;

    // 1) Diamond–Square fractal
    let fractal = DiamondSquare::new(1.0, 0.0, 40.0).with_seed(2025).generate(size)?;
    save_grayscale(&fractal, "terrain_fractal.png")?;

    // 2) Fractal + thermal erosion
    let mut thermal = fractal.clone();
    ThermalErosion::new(10).apply(&mut thermal);
    save_grayscale(&thermal, "terrain_thermal.png")?;

    // 3) Thermal + hydraulic erosion
    let mut hydraulic = thermal.clone();
    let report = HydraulicErosion::new(3, 0.1, 0.5).apply(&mut hydraulic);
    info!("hydraulic erosion: {report:?}");
    save_grayscale(&hydraulic, "terrain_hydraulic.png")?;

    Ok(())
}
