use std::time::Instant;

use eframe::{App, Frame, NativeOptions, egui, run_native};
use egui::{Color32, ColorImage, TextureHandle};
use log::{info, warn};
use terrain_core::preview::color_image;
use terrain_core::{Mesh, Terrain, TerrainConfig};

// Pixels per world unit in the 3D preview
const PREVIEW_SCALE: f32 = 6.0;
// Radians per frame while A or D is held
const ROTATION_SPEED: f32 = 0.05;

struct TerrainApp {
    terrain: Terrain,
    seed: u64,
    use_seed: bool,

    // erosion parameters
    thermal_iters: usize,
    hydraulic_iters: usize,
    water_quantity: f32,

    // preview
    rotation: f32,
    terrain_texture: Option<TextureHandle>,
    mesh: Option<Mesh>,

    // timing & status
    last_duration: Option<f32>,
    status_message: String,
}

impl TerrainApp {
    fn new(terrain: Terrain) -> Self {
        let config = terrain.config();
        Self {
            seed: config.seed.unwrap_or(25),
            use_seed: config.seed.is_some(),
            thermal_iters: config.thermal_iterations,
            hydraulic_iters: config.hydraulic_iterations,
            water_quantity: config.water_quantity,
            terrain,
            rotation: 0.0,
            terrain_texture: None,
            mesh: None,
            last_duration: None,
            status_message: String::new(),
        }
    }

    // Re-upload the texture and mesh after the grid changed
    fn refresh(&mut self, ctx: &egui::Context, start: Instant, what: &str) {
        let img = color_image(self.terrain.grid());
        let size = [img.width() as usize, img.height() as usize];
        let color_image = ColorImage::from_rgb(size, img.as_raw());
        self.terrain_texture =
            Some(ctx.load_texture("terrain", color_image, egui::TextureOptions::NEAREST));
        self.mesh = Some(self.terrain.mesh());
        let ms = start.elapsed().as_secs_f32() * 1000.0;
        self.last_duration = Some(ms);
        self.status_message = format!("{what} in {ms:.2} ms");
        ctx.request_repaint();
    }

    fn controls(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.heading("Terrain Generator");
        ui.separator();

        let config = self.terrain.config_mut();
        let size_label = match config.grid_size() {
            Ok(size) => format!("{size}×{size}"),
            Err(_) => "invalid".to_owned(),
        };
        ui.horizontal(|ui| {
            ui.label("Resolution 2^n+1:");
            ui.add(
                egui::Slider::new(&mut config.grid_exponent, 3..=9)
                    .text(size_label)
                    .step_by(1.0),
            );
        });
        ui.label("Roughness");
        ui.add(egui::Slider::new(&mut config.roughness, 0.0..=10.0));

        ui.checkbox(&mut self.use_seed, "Fixed seed");
        if self.use_seed {
            ui.add(egui::DragValue::new(&mut self.seed).speed(1.0));
        }
        config.seed = self.use_seed.then_some(self.seed);

        if ui.button("Generate Terrain").clicked() {
            let start = Instant::now();
            match self.terrain.generate() {
                Ok(()) => self.refresh(ctx, start, "Generated"),
                Err(e) => {
                    warn!("generation failed: {e}");
                    self.status_message = format!("Generation failed: {e}");
                }
            }
        }

        ui.separator();
        ui.label("Thermal erosion iterations");
        ui.add(egui::Slider::new(&mut self.thermal_iters, 1..=100));
        if ui.button("Apply Thermal Erosion").clicked() {
            let start = Instant::now();
            match self.terrain.apply_thermal_erosion(self.thermal_iters) {
                Ok(()) => self.refresh(ctx, start, "Thermal erosion"),
                Err(e) => self.status_message = format!("Thermal erosion failed: {e}"),
            }
        }

        ui.separator();
        ui.label("Hydraulic erosion iterations");
        ui.add(egui::Slider::new(&mut self.hydraulic_iters, 1..=20));
        ui.label("Water quantity");
        ui.add(egui::Slider::new(&mut self.water_quantity, 0.01..=2.0));
        if ui.button("Apply Hydraulic Erosion").clicked() {
            let start = Instant::now();
            match self
                .terrain
                .apply_hydraulic_erosion(self.hydraulic_iters, self.water_quantity)
            {
                Ok(report) => {
                    self.refresh(ctx, start, "Hydraulic erosion");
                    self.status_message += &format!(" ({} peaks)", report.peaks);
                }
                Err(e) => self.status_message = format!("Hydraulic erosion failed: {e}"),
            }
        }

        ui.separator();

        // Save to PNG
        if ui.button("Save PNG…").clicked() && self.terrain_texture.is_some() {
            let picked = rfd::FileDialog::new()
                .add_filter("PNG image", &["png"])
                .set_file_name("terrain.png")
                .save_file();
            if let Some(path) = picked {
                self.status_message = match color_image(self.terrain.grid()).save(&path) {
                    Ok(()) => {
                        info!("saved {}", path.display());
                        format!("Saved {}", path.display())
                    }
                    Err(e) => format!("Save failed: {e}"),
                };
            }
        }

        ui.separator();
        ui.label(&self.status_message);
    }

    // Oblique projection of the mesh, rotated around the vertical axis
    fn preview(&self, ui: &mut egui::Ui, mesh: &Mesh) {
        let rect = ui.available_rect_before_wrap();
        let center = rect.center();
        let (sin, cos) = self.rotation.sin_cos();

        let vertices = mesh
            .vertices
            .iter()
            .map(|v| {
                let [px, py, pz] = v.position;
                let rx = px * cos - pz * sin;
                let rz = px * sin + pz * cos;
                // normals face -y on flat ground
                let light = (0.5 - 0.5 * v.normal[1]).clamp(0.2, 1.0);
                let channel = |c: f32| (c * light * 255.0) as u8;
                egui::epaint::Vertex {
                    pos: egui::pos2(
                        center.x + rx * PREVIEW_SCALE,
                        center.y + (rz * 0.5 - py * 0.25) * PREVIEW_SCALE,
                    ),
                    uv: egui::pos2(0.0, 0.0),
                    color: Color32::from_rgb(
                        channel(v.color[0]),
                        channel(v.color[1]),
                        channel(v.color[2]),
                    ),
                }
            })
            .collect();

        let shape = egui::epaint::Mesh {
            vertices,
            indices: mesh.index_data().to_vec(),
            texture_id: egui::TextureId::default(),
        };
        ui.painter().with_clip_rect(rect).add(egui::epaint::Shape::mesh(shape));
    }
}

impl App for TerrainApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // A and D spin the preview
        ctx.input(|i| {
            if i.key_down(egui::Key::A) {
                self.rotation -= ROTATION_SPEED;
            }
            if i.key_down(egui::Key::D) {
                self.rotation += ROTATION_SPEED;
            }
        });
        if self.rotation.abs() > std::f32::consts::TAU {
            self.rotation = 0.0;
        }

        egui::SidePanel::left("controls").show(ctx, |ui| self.controls(ui, ctx));

        // central display
        egui::CentralPanel::default().show(ctx, |ui| {
            match (&self.terrain_texture, &self.mesh) {
                (Some(tex), Some(mesh)) => {
                    ui.horizontal(|ui| {
                        ui.image((tex.id(), egui::vec2(192.0, 192.0)));
                        ui.label("Hold A / D to rotate");
                    });
                    ui.separator();
                    self.preview(ui, mesh);
                }
                _ => {
                    ui.centered_and_justified(|ui| {
                        ui.label("Click “Generate Terrain” to start");
                    });
                }
            }
        });
    }
}

fn main() -> eframe::Result {
    env_logger::init();

    // Optional TOML config as the only argument
    let config = match std::env::args().nth(1) {
        Some(path) => TerrainConfig::load(&path).unwrap_or_else(|e| {
            warn!("could not load {path}: {e}, using defaults");
            TerrainConfig::default()
        }),
        None => TerrainConfig::default(),
    };

    let opts = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 720.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };
    run_native(
        "Terrain Generator",
        opts,
        Box::new(move |_cc| {
            let terrain = Terrain::new(config)?;
            Ok(Box::new(TerrainApp::new(terrain)))
        }),
    )
}
