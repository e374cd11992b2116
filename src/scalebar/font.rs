//! Label font loading
//!
//! The configured font is looked up as a path first, then by file name in the
//! configured and platform font directories. When nothing loads, a small
//! built-in bitmap font is used so the label is always drawn the same way.

use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, GlyphId, OutlinedGlyph, PxScale, ScaleFont};
use image::{DynamicImage, GenericImage, GenericImageView, Rgba};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use walkdir::WalkDir;

/// Glyph cell of the built-in font, in font pixels
const BUILTIN_GLYPH_WIDTH: u32 = 5;
const BUILTIN_GLYPH_HEIGHT: u32 = 7;

/// Font pixels per glyph advance (glyph + 1 column spacing)
const BUILTIN_ADVANCE: u32 = BUILTIN_GLYPH_WIDTH + 1;

/// How deep to look below each font directory
const FONT_SEARCH_DEPTH: usize = 4;

/// Font used to draw the scale bar label
pub enum LabelFont {
    /// TrueType/OpenType font loaded from disk
    TrueType { path: PathBuf, font: FontVec },
    /// Built-in 5x7 bitmap font, scaled by an integer factor
    Builtin,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelFont::TrueType { path, .. } => f.debug_tuple("TrueType").field(path).finish(),
            LabelFont::Builtin => f.write_str("Builtin"),
        }
    }
}

impl LabelFont {
    /// Load `font_style`, falling back to the built-in font.
    ///
    /// Never fails: a missing or unparsable font only produces a warning.
    pub fn load(font_style: &str, extra_dirs: &[PathBuf]) -> Self {
        let Some(path) = resolve_font_path(font_style, extra_dirs) else {
            log::warn!(
                "⚠️  Font '{}' not found, using the built-in label font",
                font_style
            );
            return LabelFont::Builtin;
        };

        let font = std::fs::read(&path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| FontVec::try_from_vec(bytes).map_err(|e| e.to_string()));

        match font {
            Ok(font) => {
                log::info!("🔤 Using label font {}", path.display());
                LabelFont::TrueType { path, font }
            }
            Err(e) => {
                log::warn!(
                    "⚠️  Failed to load font {}: {}. Using the built-in label font",
                    path.display(),
                    e
                );
                LabelFont::Builtin
            }
        }
    }

    /// Width and height in image pixels of the ink of `text` drawn at `fontsize`.
    ///
    /// This is the exact box `draw` fills: side bearings and the space between
    /// the ascender line and the top of the glyphs are not included.
    pub fn measure(&self, text: &str, fontsize: u32) -> (u32, u32) {
        match self {
            LabelFont::TrueType { font, .. } => {
                match InkBounds::of(&outline_text(font, fontsize, text)) {
                    Some(bounds) => bounds.size(),
                    None => (0, 0),
                }
            }
            LabelFont::Builtin => {
                let scale = builtin_scale(fontsize);
                let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
                if chars == 0 {
                    return (0, 0);
                }
                let width = chars
                    .saturating_mul(BUILTIN_ADVANCE)
                    .saturating_sub(1)
                    .saturating_mul(scale);
                (width, BUILTIN_GLYPH_HEIGHT.saturating_mul(scale))
            }
        }
    }

    /// Draw `text` so that its ink starts at (`x`, `y`).
    ///
    /// The ink covers exactly `measure(text, fontsize)` pixels from there.
    /// Pixels outside the image are skipped.
    pub fn draw(&self, image: &mut DynamicImage, x: i32, y: i32, fontsize: u32, text: &str, color: Rgba<u8>) {
        match self {
            LabelFont::TrueType { font, .. } => {
                let glyphs = outline_text(font, fontsize, text);
                let Some(bounds) = InkBounds::of(&glyphs) else {
                    return;
                };
                let dx = x as i64 - bounds.min_x;
                let dy = y as i64 - bounds.min_y;
                for glyph in &glyphs {
                    let origin = glyph.px_bounds().min;
                    let ox = origin.x as i64 + dx;
                    let oy = origin.y as i64 + dy;
                    glyph.draw(|gx, gy, coverage| {
                        blend_pixel(image, ox + gx as i64, oy + gy as i64, color, coverage);
                    });
                }
            }
            LabelFont::Builtin => {
                let scale = builtin_scale(fontsize) as i64;
                let advance = BUILTIN_ADVANCE as i64 * scale;
                for (index, ch) in text.chars().enumerate() {
                    let origin_x = x as i64 + index as i64 * advance;
                    for (row, bits) in builtin_glyph(ch).iter().enumerate() {
                        for col in 0..BUILTIN_GLYPH_WIDTH {
                            // Leftmost column is the highest of the 5 bits
                            if bits & (1 << (BUILTIN_GLYPH_WIDTH - 1 - col)) == 0 {
                                continue;
                            }
                            let (Ok(left), Ok(top)) = (
                                i32::try_from(origin_x + col as i64 * scale),
                                i32::try_from(y as i64 + row as i64 * scale),
                            ) else {
                                continue;
                            };
                            let rect = Rect::at(left, top).of_size(scale as u32, scale as u32);
                            draw_filled_rect_mut(image, rect, color);
                        }
                    }
                }
            }
        }
    }
}

/// Union of the pixel boxes of a run of outlined glyphs, half-open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InkBounds {
    min_x: i64,
    min_y: i64,
    max_x: i64,
    max_y: i64,
}

impl InkBounds {
    fn of(glyphs: &[OutlinedGlyph]) -> Option<Self> {
        glyphs
            .iter()
            .map(|glyph| {
                let rect = glyph.px_bounds();
                InkBounds {
                    min_x: rect.min.x as i64,
                    min_y: rect.min.y as i64,
                    max_x: rect.max.x as i64,
                    max_y: rect.max.y as i64,
                }
            })
            .reduce(|a, b| InkBounds {
                min_x: a.min_x.min(b.min_x),
                min_y: a.min_y.min(b.min_y),
                max_x: a.max_x.max(b.max_x),
                max_y: a.max_y.max(b.max_y),
            })
    }

    fn size(&self) -> (u32, u32) {
        let clamp = |v: i64| u32::try_from(v.max(0)).unwrap_or(u32::MAX);
        (clamp(self.max_x - self.min_x), clamp(self.max_y - self.min_y))
    }
}

/// Lay out `text` on one line with kerning and outline every visible glyph.
///
/// Glyphs without an outline (spaces) only advance the caret.
fn outline_text(font: &FontVec, fontsize: u32, text: &str) -> Vec<OutlinedGlyph> {
    let scale = PxScale::from(fontsize as f32);
    let scaled = font.as_scaled(scale);

    let mut caret = 0.0f32;
    let mut previous: Option<GlyphId> = None;
    let mut glyphs = Vec::new();

    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(previous) = previous {
            caret += scaled.kern(previous, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
        caret += scaled.h_advance(id);
        previous = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            glyphs.push(outlined);
        }
    }

    glyphs
}

/// Alpha-blend `color` into the pixel at (`x`, `y`) with the given coverage
fn blend_pixel(image: &mut DynamicImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    if coverage <= 0.0 || x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    let alpha = coverage.min(1.0);
    let under = image.get_pixel(x, y);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let value = under[c] as f32 * (1.0 - alpha) + color[c] as f32 * alpha;
        out[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    image.put_pixel(x, y, Rgba(out));
}

/// Integer magnification of the built-in font for a requested font size
fn builtin_scale(fontsize: u32) -> u32 {
    (fontsize / 10).max(1)
}

/// Rows of a built-in glyph, 5 bits each. Unknown characters are blank.
fn builtin_glyph(ch: char) -> [u8; 7] {
    match ch {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        'm' => [0b00000, 0b00000, 0b11010, 0b10101, 0b10101, 0b10001, 0b10001],
        _ => [0; 7],
    }
}

/// Find a font file.
///
/// `font_style` may be a path; otherwise the file name is matched
/// case-insensitively under `extra_dirs`, then the platform font directories.
pub fn resolve_font_path(font_style: &str, extra_dirs: &[PathBuf]) -> Option<PathBuf> {
    let direct = Path::new(font_style);
    if direct.is_file() {
        return Some(direct.to_path_buf());
    }

    let wanted = direct.file_name()?.to_string_lossy().to_lowercase();

    extra_dirs
        .iter()
        .cloned()
        .chain(system_font_dirs())
        .filter(|dir| dir.is_dir())
        .find_map(|dir| find_in_dir(&dir, &wanted))
}

fn find_in_dir(dir: &Path, wanted: &str) -> Option<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .max_depth(FONT_SEARCH_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|entry| {
            entry.file_type().is_file()
                && entry.file_name().to_string_lossy().to_lowercase() == wanted
        })
        .map(|entry| entry.into_path())
}

/// Platform font directories, most specific first
fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs_list = Vec::new();
    if let Some(user_fonts) = dirs::font_dir() {
        dirs_list.push(user_fonts);
    }
    for dir in [
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "/System/Library/Fonts",
        "C:\\Windows\\Fonts",
    ] {
        dirs_list.push(PathBuf::from(dir));
    }
    dirs_list
}
