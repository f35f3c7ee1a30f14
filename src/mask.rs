// Mask builder: draw the logo centered on an offscreen canvas and keep only
// its alpha. Particles are seeded where that alpha is high.

use image::imageops::{self, FilterType};

use crate::config::{FieldParams, MAX_DRAWN_SIDE};
use crate::logo::Logo;
use crate::types::Mask;

/// Where the logo landed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoPlacement {
    /// Top-left corner, may be negative when the logo overflows the canvas.
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
    /// Drawn height / natural logo height.
    pub scale: f32,
}

/// Rasterize `logo` centered on a `width` x `height` canvas.
/// Logo height comes from the viewport category (mobile vs desktop) times
/// the logo scale; width keeps the logo's aspect ratio.
pub fn build_mask(width: usize, height: usize, logo: &Logo, params: &FieldParams) -> (Mask, LogoPlacement) {
    let logo_h = params.logo_height(width);
    let logo_w = logo_h * (logo.width() as f32 / logo.height() as f32);
    let placement = LogoPlacement {
        x: (width as f32 / 2.0 - logo_w / 2.0).floor() as i64,
        y: (height as f32 / 2.0 - logo_h / 2.0).floor() as i64,
        width: logo_w.round().min(MAX_DRAWN_SIDE) as u32,
        height: logo_h.round() as u32,
        scale: logo_h / logo.height() as f32,
    };

    let mut mask = Mask::empty(width, height);
    if mask.is_empty() || placement.width == 0 || placement.height == 0 {
        tracing::warn!(width, height, "empty canvas or logo; mask left blank");
        return (mask, placement);
    }
    if logo_w > MAX_DRAWN_SIDE {
        tracing::warn!(logo_w = f64::from(logo_w), "logo too wide to rasterize; mask left blank");
        return (mask, placement);
    }

    let drawn = imageops::resize(logo.image(), placement.width, placement.height, FilterType::Triangle);

    // Clip the drawn logo to the canvas and copy alpha row by row.
    let x0 = placement.x.max(0);
    let x1 = (placement.x + placement.width as i64).min(width as i64);
    let y0 = placement.y.max(0);
    let y1 = (placement.y + placement.height as i64).min(height as i64);
    for cy in y0..y1 {
        let ly = (cy - placement.y) as u32;
        let row = cy as usize * width;
        for cx in x0..x1 {
            let lx = (cx - placement.x) as u32;
            mask.alpha[row + cx as usize] = drawn.get_pixel(lx, ly)[3];
        }
    }

    (mask, placement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid_logo(w: u32, h: u32) -> Logo {
        Logo::from_image(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))).unwrap()
    }

    #[test]
    fn desktop_logo_is_centered_at_420px() {
        let params = FieldParams::default();
        let (mask, placement) = build_mask(1920, 1080, &solid_logo(200, 100), &params);
        assert_eq!(placement.height, 420);
        assert_eq!(placement.width, 840);
        assert_eq!((placement.x, placement.y), (540, 330));
        assert_eq!(placement.scale, 4.2);
        assert!(mask.alpha_at(960, 540) > 250);
        assert_eq!(mask.alpha_at(539, 540), 0);
        assert_eq!(mask.alpha_at(960, 329), 0);
        assert_eq!(mask.opaque_count(128), 840 * 420);
    }

    #[test]
    fn mobile_width_halves_logo_height() {
        let params = FieldParams::default();
        let (_, placement) = build_mask(767, 1000, &solid_logo(10, 10), &params);
        assert_eq!(placement.height, 210);
        let (_, placement) = build_mask(768, 1000, &solid_logo(10, 10), &params);
        assert_eq!(placement.height, 420);
    }

    #[test]
    fn oversized_logo_is_clipped() {
        let params = FieldParams::default();
        let (mask, placement) = build_mask(100, 100, &solid_logo(10, 10), &params);
        assert!(placement.x < 0 && placement.y < 0);
        assert_eq!(mask.opaque_count(128), 100 * 100);
    }

    #[test]
    fn transparent_logo_gives_empty_mask() {
        let logo = Logo::from_image(RgbaImage::new(50, 50)).unwrap();
        let (mask, _) = build_mask(800, 600, &logo, &FieldParams::default());
        assert_eq!(mask.opaque_count(0), 0);
    }

    #[test]
    fn extremely_wide_logo_is_not_rasterized() {
        let logo = Logo::from_image(RgbaImage::from_pixel(10_000, 1, Rgba([255, 255, 255, 255]))).unwrap();
        let (mask, placement) = build_mask(1920, 1080, &logo, &FieldParams::default());
        assert!(placement.width as f32 <= MAX_DRAWN_SIDE);
        assert_eq!(mask.opaque_count(0), 0);
    }

    #[test]
    fn zero_area_canvas_is_guarded() {
        let (mask, _) = build_mask(0, 0, &solid_logo(10, 10), &FieldParams::default());
        assert!(mask.is_empty());
        assert!(mask.alpha.is_empty());
        let (mask, _) = build_mask(640, 0, &solid_logo(10, 10), &FieldParams::default());
        assert!(mask.alpha.is_empty());
    }
}
