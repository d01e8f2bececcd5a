use glam::Vec3;
use palette::Srgb;

use crate::grid::HeightGrid;

// Distance between neighbouring vertices in world units
pub const CELL_SPACING: f32 = 0.25;

// Floats per vertex in `Mesh::vertex_data`: position(3), color(4), normal(3)
pub const VERTEX_STRIDE: usize = 10;

// Height buckets 0..=10, greens in the valleys to browns on the peaks
const PALETTE: [[u8; 3]; 11] = [
    [0x00, 0xFA, 0x9A],
    [0x00, 0xFF, 0x66],
    [0x00, 0xFF, 0x33],
    [0x00, 0xFF, 0x00],
    [0x00, 0xFF, 0x00],
    [0x00, 0xFA, 0x9A],
    [0xD1, 0xE2, 0x31],
    [0xCD, 0xC6, 0x73],
    [0x8B, 0x69, 0x14],
    [0x8B, 0x45, 0x00],
    [0x5E, 0x26, 0x05],
];

pub const TOP_BUCKET: usize = PALETTE.len() - 1;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub normal: [f32; 3],
}

/// Renderable terrain: one vertex per grid cell and a counter-clockwise triangle list.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    // Interleaved vertex buffer: position, color, normal
    pub fn vertex_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.vertices.len() * VERTEX_STRIDE);
        for v in &self.vertices {
            data.extend_from_slice(&v.position);
            data.extend_from_slice(&v.color);
            data.extend_from_slice(&v.normal);
        }
        data
    }

    pub fn index_data(&self) -> &[u32] {
        &self.indices
    }
}

pub struct MeshBuilder {
    cell_spacing: f32,
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self {
            cell_spacing: CELL_SPACING,
        }
    }
}

impl MeshBuilder {
    pub fn new(cell_spacing: f32) -> Self {
        Self { cell_spacing }
    }

    pub fn build(&self, grid: &HeightGrid) -> Mesh {
        let mut vertices = self.build_vertices(grid);
        let indices = Self::build_indices(grid.size());
        Self::compute_normals(&mut vertices, &indices);
        Self::compute_colors(&mut vertices);
        Mesh { vertices, indices }
    }

    // Row-major, centred on the origin, height halved
    pub fn build_vertices(&self, grid: &HeightGrid) -> Vec<Vertex> {
        let n = grid.size();
        let half = n as f32 / 2.0;
        let mut vertices = Vec::with_capacity(n * n);
        for y in 0..n {
            for x in 0..n {
                vertices.push(Vertex {
                    position: [
                        (x as f32 - half) * self.cell_spacing,
                        grid.get(x, y) / 2.0,
                        (y as f32 - half) * self.cell_spacing,
                    ],
                    ..Vertex::default()
                });
            }
        }
        vertices
    }

    pub fn build_indices(size: usize) -> Vec<u32> {
        let quads = size.saturating_sub(1);
        let mut indices = Vec::with_capacity(6 * quads * quads);
        let n = size as u32;
        for y in 0..quads as u32 {
            for x in 0..quads as u32 {
                // tl - - tr
                //  | \   |
                //  |   \ |
                // bl - - br
                let tl = x + y * n;
                let tr = (x + 1) + y * n;
                let bl = x + (y + 1) * n;
                let br = (x + 1) + (y + 1) * n;
                indices.extend_from_slice(&[tl, br, bl, tl, tr, br]);
            }
        }
        indices
    }

    /// Smooth vertex normals.
    ///
    /// Every triangle adds its unit face normal to its three vertices, then
    /// each sum is normalized. A vertex touched by no triangle keeps a zero
    /// normal.
    pub fn compute_normals(vertices: &mut [Vertex], indices: &[u32]) {
        let mut sums = vec![Vec3::ZERO; vertices.len()];
        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p0 = Vec3::from(vertices[a].position);
            let p1 = Vec3::from(vertices[b].position);
            let p2 = Vec3::from(vertices[c].position);
            let face = (p0 - p1).cross(p0 - p2).normalize_or_zero();
            sums[a] += face;
            sums[b] += face;
            sums[c] += face;
        }
        for (vertex, sum) in vertices.iter_mut().zip(sums) {
            vertex.normal = sum.normalize_or_zero().to_array();
        }
    }

    pub fn compute_colors(vertices: &mut [Vertex]) {
        let (min, max) = vertices.iter().fold(
            (f32::INFINITY, f32::NEG_INFINITY),
            |(lo, hi), v| (lo.min(v.position[1]), hi.max(v.position[1])),
        );
        for vertex in vertices.iter_mut() {
            vertex.color = palette_color(height_bucket(vertex.position[1], min, max));
        }
    }
}

// Palette bucket for `height` in [min, max], flat ranges fall into bucket 0
pub fn height_bucket(height: f32, min: f32, max: f32) -> usize {
    if max <= min {
        return 0;
    }
    let t = ((height - min) / (max - min)).clamp(0.0, 1.0);
    ((t * TOP_BUCKET as f32).trunc() as usize).min(TOP_BUCKET)
}

pub fn palette_color(bucket: usize) -> [f32; 4] {
    let [r, g, b] = PALETTE[bucket.min(TOP_BUCKET)];
    let rgb: Srgb<f32> = Srgb::new(r, g, b).into_format();
    [rgb.red, rgb.green, rgb.blue, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diamond_square::DiamondSquare;

    fn terrain(size: usize) -> HeightGrid {
        DiamondSquare::new(1.0, 0.0, 40.0).with_seed(5).generate(size).unwrap()
    }

    #[test]
    fn mesh_counts_and_index_bounds() {
        for n in [3, 5, 17, 33] {
            let mesh = MeshBuilder::default().build(&terrain(n));
            assert_eq!(mesh.vertices.len(), n * n);
            assert_eq!(mesh.indices.len(), 6 * (n - 1) * (n - 1));
            assert!(mesh.indices.iter().all(|&i| (i as usize) < n * n));
            assert_eq!(mesh.vertex_data().len(), n * n * VERTEX_STRIDE);
        }
    }

    #[test]
    fn first_quad_winding() {
        assert_eq!(MeshBuilder::build_indices(3)[..6], [0, 4, 3, 0, 1, 4]);
    }

    #[test]
    fn vertex_positions() {
        let mut g = HeightGrid::new(3);
        g.set(2, 1, 4.0);
        let v = MeshBuilder::default().build_vertices(&g);
        assert_eq!(v[5].position, [(2.0 - 1.5) * 0.25, 2.0, (1.0 - 1.5) * 0.25]);
    }

    #[test]
    fn normals_are_unit_length() {
        let mesh = MeshBuilder::default().build(&terrain(33));
        for v in &mesh.vertices {
            let len = Vec3::from(v.normal).length();
            assert!((len - 1.0).abs() < 1e-4, "normal length {len}");
        }
    }

    #[test]
    fn flat_grid_normals_are_vertical() {
        // (v0 - v1) x (v0 - v2) with rows running along +z faces -y
        let mesh = MeshBuilder::default().build(&HeightGrid::new(5));
        for v in &mesh.vertices {
            assert!((v.normal[1] + 1.0).abs() < 1e-6, "{:?}", v.normal);
        }
    }

    #[test]
    fn color_buckets_at_extremes() {
        let g = terrain(17);
        let (lo, hi) = g.min_max();
        let mesh = MeshBuilder::default().build(&g);
        let top = palette_color(TOP_BUCKET);
        let bottom = palette_color(0);
        for (v, &h) in mesh.vertices.iter().zip(g.as_slice()) {
            if h == hi {
                assert_eq!(v.color, top);
            }
            if h == lo {
                assert_eq!(v.color, bottom);
            }
        }
        assert_eq!(height_bucket(hi, lo, hi), TOP_BUCKET);
        assert_eq!(height_bucket(lo, lo, hi), 0);
    }

    #[test]
    fn flat_mesh_uses_first_bucket() {
        assert_eq!(height_bucket(3.0, 3.0, 3.0), 0);
        let mesh = MeshBuilder::default().build(&HeightGrid::filled(3, 3.0));
        assert!(mesh.vertices.iter().all(|v| v.color == palette_color(0)));
    }

    #[test]
    fn palette_is_normalized_rgba() {
        let c = palette_color(TOP_BUCKET);
        assert!((c[0] - 0x5E as f32 / 255.0).abs() < 1e-6);
        assert_eq!(c[3], 1.0);
        assert_eq!(palette_color(99), c);
    }
}
