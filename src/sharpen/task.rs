//! Sharpening batch task
//!
//! Writes a sharpened RGB copy of every image in the specimen's image folder.
//! No metadata is needed, so preparation only checks that the folder exists.

use std::path::Path;

use image::DynamicImage;

use crate::batch::runner::SpecimenTask;
use crate::batch::specimen::InputFolders;
use crate::error::{ConfigError, RenderError, SpecimenError};
use crate::scalebar::render::is_same_file;
use crate::sharpen::filter::sharpen;
use crate::sharpen::options::SharpenConfig;

#[derive(Debug, Clone)]
pub struct SharpenTask {
    config: SharpenConfig,
}

impl SharpenTask {
    pub fn new(config: SharpenConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }
}

/// Load `input`, sharpen it and save the RGB result to `output`
pub fn sharpen_file(input: &Path, output: &Path, config: &SharpenConfig) -> Result<(), RenderError> {
    if is_same_file(input, output) {
        return Err(RenderError::SameAsInput(input.to_path_buf()));
    }

    let image = image::open(input).map_err(|source| RenderError::Decode {
        path: input.to_path_buf(),
        source,
    })?;

    let sharpened = DynamicImage::ImageRgb8(sharpen(&image, config));
    sharpened.save(output).map_err(|source| RenderError::Save {
        path: output.to_path_buf(),
        source,
    })?;

    log::debug!("Sharpened {} -> {}", input.display(), output.display());
    Ok(())
}

impl SpecimenTask for SharpenTask {
    type Prepared = ();

    fn name(&self) -> &'static str {
        "sharpen"
    }

    fn input_folders(&self) -> &InputFolders {
        &self.config.input_folders
    }

    fn output_suffix(&self) -> &str {
        &self.config.output_suffix
    }

    fn prepare(&self, _specimen: &Path, _input_folder: &Path) -> Result<(), SpecimenError> {
        Ok(())
    }

    fn process_image(&self, _: &(), input: &Path, output: &Path) -> Result<(), RenderError> {
        sharpen_file(input, output, &self.config)
    }
}
