use std::path::Path;

use image::{Rgb, RgbImage};
use terrain_core::{HeightGrid, MeshBuilder, Terrain, TerrainConfig};

// Simple Lambert shading from the mesh normals
// The mesh normals face -y on flat ground, so the light comes from below
fn shade(normal: [f32; 3]) -> f32 {
    let light = [-0.4f32, -0.8, -0.4];
    let len = light.iter().map(|c| c * c).sum::<f32>().sqrt();
    let dot: f32 = normal.iter().zip(light).map(|(n, l)| n * l / len).sum();
    dot.max(0.0)
}

fn render(grid: &HeightGrid) -> RgbImage {
    let size = grid.size() as u32;
    let mesh = MeshBuilder::default().build(grid);
    RgbImage::from_fn(size, size, |x, y| {
        let v = &mesh.vertices[(y * size + x) as usize];
        let light = (shade(v.normal) * 0.5 + 0.5).clamp(0.0, 1.0);
        Rgb([
            (v.color[0] * light * 255.0) as u8,
            (v.color[1] * light * 255.0) as u8,
            (v.color[2] * light * 255.0) as u8,
        ])
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Generate a large height-map
    let config = TerrainConfig {
        grid_exponent: 9, // 2^9 + 1
        seed: Some(2025),
        ..TerrainConfig::default()
    };
    let mut terrain = Terrain::new(config)?;
    terrain.generate()?;
    terrain.apply_thermal_erosion(20)?;
    terrain.apply_hydraulic_erosion(2, 0.1)?;

    // Save
    let path = Path::new("terrain_final.png");
    render(terrain.grid()).save(path)?;
    println!("Saved final terrain image to {:?}", path);
    Ok(())
}
