use super::layout::{Border, BorderSide, Fill, Rect};
use image::{Rgb, RgbImage};

/// Clip `rect` to the image, returning the covered (x0, y0, x1, y1) span.
fn clip(img: &RgbImage, rect: Rect) -> Option<(u32, u32, u32, u32)> {
    let x1 = rect.x.saturating_add(rect.width).min(img.width());
    let y1 = rect.y.saturating_add(rect.height).min(img.height());
    if rect.x >= x1 || rect.y >= y1 {
        return None;
    }
    Some((rect.x, rect.y, x1, y1))
}

fn mix(base: Rgb<u8>, over: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let a = alpha.clamp(0.0, 1.0);
    let channel = |b: u8, o: u8| (f32::from(b) * (1.0 - a) + f32::from(o) * a).round() as u8;
    Rgb([
        channel(base[0], over[0]),
        channel(base[1], over[1]),
        channel(base[2], over[2]),
    ])
}

pub fn fill_solid(img: &mut RgbImage, rect: Rect, color: Rgb<u8>) {
    let Some((x0, y0, x1, y1)) = clip(img, rect) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, color);
        }
    }
}

pub fn fill(img: &mut RgbImage, rect: Rect, fill: Fill) {
    match fill {
        Fill::Solid(color) => fill_solid(img, rect, color),
        Fill::Gradient { from, to } => {
            let Some((x0, y0, x1, y1)) = clip(img, rect) else {
                return;
            };
            // Diagonal, top-left to bottom-right.
            let span = (rect.width + rect.height).max(1) as f32;
            for y in y0..y1 {
                for x in x0..x1 {
                    let t = ((x - rect.x) + (y - rect.y)) as f32 / span;
                    img.put_pixel(x, y, mix(from, to, t));
                }
            }
        }
        Fill::Tint { color, alpha } => {
            let Some((x0, y0, x1, y1)) = clip(img, rect) else {
                return;
            };
            let a = f32::from(alpha) / 255.0;
            for y in y0..y1 {
                for x in x0..x1 {
                    let base = *img.get_pixel(x, y);
                    img.put_pixel(x, y, mix(base, color, a));
                }
            }
        }
    }
}

pub fn stroke(img: &mut RgbImage, rect: Rect, border: Border) {
    let w = border.width;
    match border.side {
        BorderSide::Left => fill_solid(img, Rect::new(rect.x, rect.y, w, rect.height), border.color),
        BorderSide::All => {
            fill_solid(img, Rect::new(rect.x, rect.y, rect.width, w), border.color);
            fill_solid(
                img,
                Rect::new(rect.x, (rect.y + rect.height).saturating_sub(w), rect.width, w),
                border.color,
            );
            fill_solid(img, Rect::new(rect.x, rect.y, w, rect.height), border.color);
            fill_solid(
                img,
                Rect::new((rect.x + rect.width).saturating_sub(w), rect.y, w, rect.height),
                border.color,
            );
        }
    }
}

/// Blend one anti-aliased glyph sample; out-of-bounds samples are dropped.
pub fn blend_pixel(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= i64::from(img.width()) || y >= i64::from(img.height()) {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    let base = *img.get_pixel(x, y);
    img.put_pixel(x, y, mix(base, color, coverage));
}
