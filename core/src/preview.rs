use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::grid::HeightGrid;
use crate::mesh::{height_bucket, palette_color};

// Top-down color preview using the same height palette as the mesh
pub fn color_image(grid: &HeightGrid) -> RgbImage {
    let size = grid.size() as u32;
    let (min, max) = grid.min_max();
    RgbImage::from_fn(size, size, |x, y| {
        let h = *grid.get(x as usize, y as usize);
        let [r, g, b, _] = palette_color(height_bucket(h, min, max));
        Rgb([to_byte(r), to_byte(g), to_byte(b)])
    })
}

// Height mapped to 0..=255, flat grids come out mid-grey
pub fn grayscale_image(grid: &HeightGrid) -> GrayImage {
    let size = grid.size() as u32;
    let (min, max) = grid.min_max();
    GrayImage::from_fn(size, size, |x, y| {
        let h = *grid.get(x as usize, y as usize);
        let norm = if (max - min).abs() < f32::EPSILON {
            0.5
        } else {
            (h - min) / (max - min)
        };
        Luma([to_byte(norm)])
    })
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_matches_grid_extremes() {
        let g = HeightGrid::from_rows(&[vec![0.0, 1.0], vec![2.0, 10.0]]).unwrap();
        let gray = grayscale_image(&g);
        assert_eq!(gray.dimensions(), (2, 2));
        assert_eq!(gray.get_pixel(0, 0).0, [0]);
        assert_eq!(gray.get_pixel(1, 1).0, [255]);

        let color = color_image(&g);
        // lowest cell is #00FA9A, highest is #5E2605
        assert_eq!(color.get_pixel(0, 0).0, [0x00, 0xFA, 0x9A]);
        assert_eq!(color.get_pixel(1, 1).0, [0x5E, 0x26, 0x05]);
    }

    #[test]
    fn flat_preview_is_mid_grey() {
        let gray = grayscale_image(&HeightGrid::filled(3, 7.0));
        assert!(gray.pixels().all(|p| p.0 == [128]));
    }
}
