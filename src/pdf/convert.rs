//! Bitmap to terminal halfblock conversion
//!
//! Each terminal cell shows two vertically stacked pixels via "▀": the top
//! pixel as foreground, the bottom as background. The page bitmap is
//! resized to fit the viewport while preserving aspect ratio.

use image::RgbImage;
use image::imageops::FilterType;

use super::backend::PageBitmap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalfblockCell {
    pub top: (u8, u8, u8),
    pub bottom: (u8, u8, u8),
}

/// A page image quantized to terminal cells, row-major
pub struct HalfblockImage {
    pub width: u16,
    pub height: u16,
    cells: Vec<HalfblockCell>,
}

impl HalfblockImage {
    #[must_use]
    pub fn cell(&self, x: u16, y: u16) -> Option<HalfblockCell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells
            .get(usize::from(y) * usize::from(self.width) + usize::from(x))
            .copied()
    }
}

/// Convert a rendered page to halfblock cells fitting `max_cols` x `max_rows`.
/// Returns None for degenerate bitmaps or a zero-sized viewport.
#[must_use]
pub fn bitmap_to_halfblocks(
    bitmap: &PageBitmap,
    max_cols: u16,
    max_rows: u16,
) -> Option<HalfblockImage> {
    if max_cols == 0 || max_rows == 0 || bitmap.width_px == 0 || bitmap.height_px == 0 {
        return None;
    }

    let img = RgbImage::from_raw(bitmap.width_px, bitmap.height_px, bitmap.pixels.clone())?;

    // Halfblocks give one pixel per column and two per row
    let max_w_px = f64::from(max_cols);
    let max_h_px = f64::from(max_rows) * 2.0;
    let scale = (max_w_px / f64::from(bitmap.width_px))
        .min(max_h_px / f64::from(bitmap.height_px))
        .min(1.0);

    let target_w = ((f64::from(bitmap.width_px) * scale).round() as u32).max(1);
    let target_h = ((f64::from(bitmap.height_px) * scale).round() as u32).max(1);
    let resized = image::imageops::resize(&img, target_w, target_h, FilterType::Triangle);

    let width = target_w as u16;
    let height = target_h.div_ceil(2) as u16;
    let mut cells = Vec::with_capacity(usize::from(width) * usize::from(height));

    for cell_y in 0..u32::from(height) {
        for x in 0..target_w {
            let top = resized.get_pixel(x, cell_y * 2).0;
            let bottom_y = cell_y * 2 + 1;
            let bottom = if bottom_y < target_h {
                resized.get_pixel(x, bottom_y).0
            } else {
                top
            };
            cells.push(HalfblockCell {
                top: (top[0], top[1], top[2]),
                bottom: (bottom[0], bottom[1], bottom[2]),
            });
        }
    }

    Some(HalfblockImage {
        width,
        height,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_bitmap(width: u32, height: u32, rgb: (u8, u8, u8)) -> PageBitmap {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&[rgb.0, rgb.1, rgb.2]);
        }
        PageBitmap {
            pixels,
            width_px: width,
            height_px: height,
        }
    }

    #[test]
    fn fits_within_viewport_preserving_aspect() {
        let bitmap = solid_bitmap(200, 400, (10, 20, 30));
        let img = bitmap_to_halfblocks(&bitmap, 40, 40).unwrap();

        // Height-bound: 80 pixel rows -> 40 cells, width scales to match
        assert!(img.height <= 40);
        assert!(img.width <= 40);
        assert_eq!(img.width, 40);
    }

    #[test]
    fn solid_color_survives_conversion() {
        let bitmap = solid_bitmap(8, 8, (200, 100, 50));
        let img = bitmap_to_halfblocks(&bitmap, 8, 4).unwrap();

        let cell = img.cell(0, 0).unwrap();
        assert_eq!(cell.top, (200, 100, 50));
        assert_eq!(cell.bottom, (200, 100, 50));
    }

    #[test]
    fn degenerate_inputs_return_none() {
        let bitmap = solid_bitmap(4, 4, (0, 0, 0));
        assert!(bitmap_to_halfblocks(&bitmap, 0, 10).is_none());
        assert!(bitmap_to_halfblocks(&bitmap, 10, 0).is_none());

        let empty = PageBitmap {
            pixels: vec![],
            width_px: 0,
            height_px: 0,
        };
        assert!(bitmap_to_halfblocks(&empty, 10, 10).is_none());
    }

    #[test]
    fn out_of_bounds_cell_is_none() {
        let bitmap = solid_bitmap(4, 4, (1, 2, 3));
        let img = bitmap_to_halfblocks(&bitmap, 4, 2).unwrap();
        assert!(img.cell(img.width, 0).is_none());
        assert!(img.cell(0, img.height).is_none());
    }
}
