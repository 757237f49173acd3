use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::constants::CANVAS_SIZE;

/// The fixed-size surface an image is shown on and clicked through.
///
/// Images are stretched to fill it, so a click maps back to the source
/// image by scaling each axis independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub filter: FilterType,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width: CANVAS_SIZE,
            height: CANVAS_SIZE,
            filter: FilterType::CatmullRom,
        }
    }
}

impl Viewport {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Image pixel under the canvas point `(x, y)`, or `None` off the canvas.
    pub fn to_image_coords(
        &self,
        x: u32,
        y: u32,
        image_width: u32,
        image_height: u32,
    ) -> Option<(u32, u32)> {
        if !self.contains(x, y) || image_width == 0 || image_height == 0 {
            return None;
        }
        let ix = x as u64 * image_width as u64 / self.width as u64;
        let iy = y as u64 * image_height as u64 / self.height as u64;
        Some((ix as u32, iy as u32))
    }

    /// The image as it appears on the canvas.
    pub fn render(&self, image: &RgbaImage) -> RgbaImage {
        imageops::resize(image, self.width, self.height, self.filter)
    }
}

pub fn parse_filter(name: &str) -> Option<FilterType> {
    match name.trim().to_lowercase().as_str() {
        "nearest" => Some(FilterType::Nearest),
        "triangle" | "bilinear" => Some(FilterType::Triangle),
        "catmullrom" | "bicubic" => Some(FilterType::CatmullRom),
        "gaussian" => Some(FilterType::Gaussian),
        "lanczos3" | "lanczos" => Some(FilterType::Lanczos3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn click_scales_each_axis() {
        let viewport = Viewport::default();
        assert_eq!(viewport.to_image_coords(0, 0, 1000, 50), Some((0, 0)));
        assert_eq!(viewport.to_image_coords(250, 250, 1000, 50), Some((500, 25)));
        assert_eq!(viewport.to_image_coords(499, 499, 1000, 50), Some((998, 49)));
        // floors
        assert_eq!(viewport.to_image_coords(499, 499, 3, 3), Some((2, 2)));
        assert_eq!(viewport.to_image_coords(166, 167, 3, 3), Some((0, 1)));
    }

    #[test]
    fn click_off_canvas_is_rejected() {
        let viewport = Viewport::default();
        assert_eq!(viewport.to_image_coords(500, 0, 10, 10), None);
        assert_eq!(viewport.to_image_coords(0, 500, 10, 10), None);
    }

    #[test]
    fn render_fills_canvas() {
        let viewport = Viewport {
            width: 8,
            height: 4,
            filter: FilterType::Nearest,
        };
        let image = RgbaImage::from_pixel(2, 3, Rgba([1, 2, 3, 4]));
        let shown = viewport.render(&image);
        assert_eq!(shown.dimensions(), (8, 4));
        assert!(shown.pixels().all(|p| *p == Rgba([1, 2, 3, 4])));
    }

    #[test]
    fn filter_names() {
        assert_eq!(parse_filter("Nearest"), Some(FilterType::Nearest));
        assert_eq!(parse_filter("bicubic"), Some(FilterType::CatmullRom));
        assert_eq!(parse_filter("blur"), None);
    }
}
