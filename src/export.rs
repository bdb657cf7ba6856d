use std::path::Path;

use anyhow::{anyhow, Context, Result};
use egui::Vec2;
use image::{DynamicImage, Rgba, RgbaImage};

use crate::annotation::{Annotation, DOT_BORDER, DOT_RADIUS};

const DOT_FILL: [u8; 4] = [0, 0, 0, 255];
const DOT_RING: [u8; 4] = [255, 255, 255, 255];

/// Rasterize the marker dots onto the full-resolution image.
///
/// Annotation coordinates live in display space; `displayed` is the size
/// the image was shown at, so positions scale up by native/displayed.
/// Label text is not rasterized: it would need a font rasterizer, and
/// labels are hover-only in the GUI as well.
pub fn flatten(raw: &DynamicImage, annotations: &[Annotation], displayed: Vec2) -> Result<RgbaImage> {
    if displayed.x <= 0.0 || displayed.y <= 0.0 {
        return Err(anyhow!("image was not displayed, nothing to flatten"));
    }
    let scale = raw.width() as f32 / displayed.x;

    let mut img = raw.to_rgba8();
    for ann in annotations {
        let cx = (ann.x + DOT_RADIUS) * scale;
        let cy = (ann.y + DOT_RADIUS) * scale;
        draw_disc(&mut img, cx, cy, (DOT_RADIUS + DOT_BORDER) * scale, DOT_RING);
        draw_disc(&mut img, cx, cy, DOT_RADIUS * scale, DOT_FILL);
    }
    Ok(img)
}

pub fn save_png(img: &RgbaImage, path: &Path) -> Result<()> {
    img.save(path)
        .with_context(|| format!("cannot write {}", path.display()))
}

fn draw_disc(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: [u8; 4]) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    let r = radius.max(1.0);
    let min_x = (cx - r).floor() as i32;
    let max_x = (cx + r).ceil() as i32;
    let min_y = (cy - r).floor() as i32;
    let max_y = (cy + r).ceil() as i32;

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            if px < 0 || px >= w || py < 0 || py >= h {
                continue;
            }
            let dx = px as f32 - cx;
            let dy = py as f32 - cy;
            if dx * dx + dy * dy <= r * r {
                img.put_pixel(px as u32, py as u32, Rgba(color));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    fn red_image(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255])))
    }

    fn marker(x: f32, y: f32) -> Annotation {
        Annotation {
            id: 1,
            x,
            y,
            text: "Description".to_owned(),
        }
    }

    #[test]
    fn flatten_draws_dot_and_ring_at_display_scale_one() {
        let raw = red_image(64, 64);
        let img = flatten(&raw, &[marker(10.0, 10.0)], vec2(64.0, 64.0)).unwrap();

        // Dot center sits DOT_RADIUS inside the footprint origin.
        assert_eq!(img.get_pixel(18, 18).0, DOT_FILL);
        // Just outside the black fill, inside the white ring.
        assert_eq!(img.get_pixel(27, 18).0, DOT_RING);
        // Far away, untouched.
        assert_eq!(img.get_pixel(50, 50).0, [255, 0, 0, 255]);
    }

    #[test]
    fn flatten_scales_positions_up_to_native_resolution() {
        let raw = red_image(64, 64);
        // Shown at half size: display (10,10) is native (36,36) center.
        let img = flatten(&raw, &[marker(10.0, 10.0)], vec2(32.0, 32.0)).unwrap();
        assert_eq!(img.get_pixel(36, 36).0, DOT_FILL);
        assert_eq!(img.dimensions(), (64, 64));
    }

    #[test]
    fn flatten_rejects_zero_display_size() {
        let raw = red_image(8, 8);
        assert!(flatten(&raw, &[], vec2(0.0, 0.0)).is_err());
    }
}
