use super::canvas;
use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Side length of a glyph cell in the built-in bitmap face.
const BITMAP_CELL: u32 = 8;

// ---------------------------------------------------------------------------
// TextStyle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextStyle {
    Title,
    Subtitle,
    Caption,
    Heading,
    Emphasis,
    Body,
    Price,
}

impl TextStyle {
    /// Nominal pixel height.
    pub fn px(self) -> f32 {
        match self {
            TextStyle::Title => 48.0,
            TextStyle::Subtitle => 28.0,
            TextStyle::Caption => 20.0,
            TextStyle::Heading => 34.0,
            TextStyle::Emphasis => 26.0,
            TextStyle::Body => 24.0,
            TextStyle::Price => 60.0,
        }
    }

    fn bitmap_scale(self) -> u32 {
        ((self.px() / BITMAP_CELL as f32).round() as u32).max(1)
    }
}

// ---------------------------------------------------------------------------
// FontSet
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum Typeface {
    Outline(FontArc),
    /// 8x8 Basic Latin + Latin-1 glyphs compiled into the binary.
    Bitmap,
}

/// The face every text run is measured and drawn with.
///
/// Loading is best-effort: each candidate file is tried in order and the
/// bitmap face takes over when none of them parse, so composing a summary
/// never fails for lack of a font.
#[derive(Clone)]
pub struct FontSet {
    typeface: Typeface,
    source: Option<PathBuf>,
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("bitmap", &self.is_bitmap())
            .field("source", &self.source)
            .finish()
    }
}

impl FontSet {
    pub fn load(candidates: &[PathBuf]) -> Self {
        for path in candidates {
            match load_outline(path) {
                Ok(font) => {
                    tracing::debug!(path = %path.display(), "summary font loaded");
                    return Self {
                        typeface: Typeface::Outline(font),
                        source: Some(path.clone()),
                    };
                }
                Err(reason) => {
                    tracing::debug!(path = %path.display(), %reason, "font candidate skipped");
                }
            }
        }
        tracing::info!("no font candidate loaded, using bitmap face");
        Self::bitmap()
    }

    pub fn bitmap() -> Self {
        Self {
            typeface: Typeface::Bitmap,
            source: None,
        }
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self.typeface, Typeface::Bitmap)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn line_height(&self, style: TextStyle) -> u32 {
        match &self.typeface {
            Typeface::Outline(font) => {
                let scaled = font.as_scaled(PxScale::from(style.px()));
                (scaled.height() + scaled.line_gap()).ceil() as u32
            }
            Typeface::Bitmap => {
                let scale = style.bitmap_scale();
                BITMAP_CELL * scale + 2 * scale
            }
        }
    }

    /// Advance width of `text` in pixels.
    pub fn measure(&self, style: TextStyle, text: &str) -> u32 {
        match &self.typeface {
            Typeface::Outline(font) => {
                let scaled = font.as_scaled(PxScale::from(style.px()));
                let mut width = 0.0f32;
                let mut prev: Option<GlyphId> = None;
                for c in text.chars() {
                    let id = font.glyph_id(c);
                    if let Some(p) = prev {
                        width += scaled.kern(p, id);
                    }
                    width += scaled.h_advance(id);
                    prev = Some(id);
                }
                width.ceil() as u32
            }
            Typeface::Bitmap => {
                let advance = BITMAP_CELL * style.bitmap_scale();
                text.chars().count() as u32 * advance
            }
        }
    }

    /// Draw `text` with its top-left corner at (`x`, `y`).
    pub fn draw(&self, img: &mut RgbImage, style: TextStyle, x: u32, y: u32, text: &str, color: Rgb<u8>) {
        match &self.typeface {
            Typeface::Outline(font) => draw_outline(font, img, style, x, y, text, color),
            Typeface::Bitmap => draw_bitmap(img, style, x, y, text, color),
        }
    }
}

fn load_outline(path: &Path) -> Result<FontArc, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    FontArc::try_from_vec(bytes).map_err(|e| e.to_string())
}

fn draw_outline(
    font: &FontArc,
    img: &mut RgbImage,
    style: TextStyle,
    x: u32,
    y: u32,
    text: &str,
    color: Rgb<u8>,
) {
    let scale = PxScale::from(style.px());
    let scaled = font.as_scaled(scale);
    let baseline = y as f32 + scaled.ascent();
    let mut caret = x as f32;
    let mut prev: Option<GlyphId> = None;

    for c in text.chars() {
        let id = font.glyph_id(c);
        if let Some(p) = prev {
            caret += scaled.kern(p, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        prev = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let px = bounds.min.x as i64 + i64::from(gx);
            let py = bounds.min.y as i64 + i64::from(gy);
            canvas::blend_pixel(img, px, py, color, coverage);
        });
    }
}

fn bitmap_glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

fn draw_bitmap(img: &mut RgbImage, style: TextStyle, x: u32, y: u32, text: &str, color: Rgb<u8>) {
    let scale = style.bitmap_scale();
    let advance = BITMAP_CELL * scale;

    for (i, c) in text.chars().enumerate() {
        let origin_x = x + i as u32 * advance;
        for (row, bits) in bitmap_glyph(c).iter().enumerate() {
            for col in 0..BITMAP_CELL {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let rect = super::layout::Rect::new(
                    origin_x + col * scale,
                    y + row as u32 * scale,
                    scale,
                    scale,
                );
                canvas::fill_solid(img, rect, color);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
