//! Scale bar rendering
//!
//! Draws the bar and its "1 mm" label on an image. The source file is only ever
//! read; the annotated copy is written to a separate output path.

use std::path::Path;

use image::{DynamicImage, GenericImageView, Rgba};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::error::{LayoutError, RenderError};
use crate::scalebar::font::LabelFont;
use crate::scalebar::layout::{compute_layout, ScaleBarLayout};
use crate::scalebar::options::ScaleBarConfig;

/// Label drawn next to every bar
pub const SCALEBAR_LABEL: &str = "1 mm";

/// Bar and label colour
pub const SCALEBAR_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Draw the scale bar and label onto `image` in place.
///
/// Returns the layout that was drawn. Nothing is drawn when the layout does
/// not fit the image.
pub fn render_scalebar(
    image: &mut DynamicImage,
    bar_length_px: u32,
    config: &ScaleBarConfig,
    font: &LabelFont,
) -> Result<ScaleBarLayout, LayoutError> {
    let (width, height) = image.dimensions();
    let text_size = font.measure(SCALEBAR_LABEL, config.fontsize);
    let layout = compute_layout(width, height, bar_length_px, text_size, config)?;

    let bar = Rect::at(layout.bar.x as i32, layout.bar.y as i32)
        .of_size(layout.bar.width, layout.bar.height);
    draw_filled_rect_mut(image, bar, SCALEBAR_COLOR);

    font.draw(
        image,
        layout.label.x as i32,
        layout.label.y as i32,
        config.fontsize,
        SCALEBAR_LABEL,
        SCALEBAR_COLOR,
    );

    Ok(layout)
}

/// Load `input`, draw the scale bar and save the result to `output`.
///
/// The output format follows the output file extension, which is the same as
/// the input's when called from the batch.
pub fn annotate_file(
    input: &Path,
    output: &Path,
    bar_length_px: u32,
    config: &ScaleBarConfig,
    font: &LabelFont,
) -> Result<ScaleBarLayout, RenderError> {
    if is_same_file(input, output) {
        return Err(RenderError::SameAsInput(input.to_path_buf()));
    }

    let mut image = image::open(input).map_err(|source| RenderError::Decode {
        path: input.to_path_buf(),
        source,
    })?;

    let layout = render_scalebar(&mut image, bar_length_px, config, font)?;

    image.save(output).map_err(|source| RenderError::Save {
        path: output.to_path_buf(),
        source,
    })?;

    log::debug!(
        "Annotated {} -> {} (annotation at {:?})",
        input.display(),
        output.display(),
        layout.bounds()
    );

    Ok(layout)
}

pub(crate) fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
