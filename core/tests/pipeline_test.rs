use terrain_core::mesh::VERTEX_STRIDE;
use terrain_core::{DiamondSquare, HydraulicErosion, MeshBuilder, Terrain, TerrainConfig, ThermalErosion};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_generate_erode_mesh() {
    init_logs();

    // Generate a small height‐map
    let size = 65;
    let mut grid = DiamondSquare::new(1.0, 0.0, 40.0)
        .with_seed(42)
        .generate(size)
        .expect("valid size");
    ThermalErosion::new(3).apply(&mut grid);
    HydraulicErosion::new(2, 0.1, 0.5).apply(&mut grid);
    grid.check_finite().expect("erosion produced non-finite heights");

    let mesh = MeshBuilder::default().build(&grid);
    let data = mesh.vertex_data();
    assert_eq!(data.len(), size * size * VERTEX_STRIDE);
    assert_eq!(mesh.index_data().len(), 6 * (size - 1) * (size - 1));

    // position.y of the middle vertex is half its elevation
    let mid = size * size / 2;
    assert_eq!(data[mid * VERTEX_STRIDE + 1], grid.as_slice()[mid] / 2.0);
    // alpha channel of every color is opaque
    assert!(data.chunks_exact(VERTEX_STRIDE).all(|v| v[6] == 1.0));
}

#[test]
fn test_terrain_session_from_config() {
    init_logs();

    let config = TerrainConfig::from_toml_str(
        r#"
        grid_exponent = 5
        roughness = 2.5
        seed = 2025
        "#,
    )
    .expect("config parses");
    let mut a = Terrain::new(config.clone()).expect("valid config");
    let mut b = Terrain::new(config).expect("valid config");
    a.generate().expect("generation");
    b.generate().expect("generation");
    assert_eq!(a.grid(), b.grid());

    a.apply_thermal_erosion(a.config().thermal_iterations).unwrap();
    let water = a.config().water_quantity;
    a.apply_hydraulic_erosion(1, water).unwrap();
    let mesh = a.mesh();
    assert_eq!(mesh.vertices.len(), 33 * 33);
}
