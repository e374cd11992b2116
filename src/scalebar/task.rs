//! Scale bar batch task
//!
//! Per specimen: read the pixel pitch from the metadata document and compute
//! the bar length once. Per image: draw the bar and label and save the copy.

use std::path::Path;

use crate::batch::runner::SpecimenTask;
use crate::batch::specimen::InputFolders;
use crate::error::{ConfigError, RenderError, SpecimenError};
use crate::metadata::{read_pixel_pitch, PixelPitch};
use crate::scalebar::font::LabelFont;
use crate::scalebar::options::ScaleBarConfig;
use crate::scalebar::render::annotate_file;

/// Per-specimen scale bar parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBarJob {
    pub pitch: PixelPitch,
    pub length_px: u32,
}

/// Annotates every image of a specimen folder with a 1 mm scale bar
#[derive(Debug)]
pub struct ScaleBarTask {
    config: ScaleBarConfig,
    font: LabelFont,
}

impl ScaleBarTask {
    /// Validate the configuration and load the label font once for the batch
    pub fn new(config: ScaleBarConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let font = LabelFont::load(&config.font_style, &config.font_dirs);
        Self::with_font(config, font)
    }

    /// Build a task with an already loaded font
    pub fn with_font(config: ScaleBarConfig, font: LabelFont) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, font })
    }
}

impl SpecimenTask for ScaleBarTask {
    type Prepared = ScaleBarJob;

    fn name(&self) -> &'static str {
        "scalebar"
    }

    fn input_folders(&self) -> &InputFolders {
        &self.config.input_folders
    }

    fn output_suffix(&self) -> &str {
        &self.config.output_suffix
    }

    fn prepare(&self, specimen: &Path, _input_folder: &Path) -> Result<ScaleBarJob, SpecimenError> {
        let pitch = read_pixel_pitch(specimen, &self.config.metadata_file)?;
        let length_px = pitch.scalebar_length_px()?;

        log::debug!("Object Pixel Pitch [um]: {}", pitch.micrometers());
        log::debug!("Scalebar Length [px]: {}", length_px);

        Ok(ScaleBarJob { pitch, length_px })
    }

    fn process_image(&self, job: &ScaleBarJob, input: &Path, output: &Path) -> Result<(), RenderError> {
        annotate_file(input, output, job.length_px, &self.config, &self.font)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::runner::BatchRunner;
    use crate::metadata::pitch::tests::write_scan_information;
    use image::{GenericImageView, Rgb, RgbImage};
    use std::fs;
    use std::path::PathBuf;

    fn task() -> ScaleBarTask {
        let config = ScaleBarConfig {
            fontsize: 40,
            x_margin: 20,
            y_margin: 20,
            ..ScaleBarConfig::default()
        };
        ScaleBarTask::with_font(config, LabelFont::Builtin).unwrap()
    }

    fn specimen(root: &Path, name: &str, pitch_line: Option<&str>) -> PathBuf {
        let folder = root.join(name);
        let input = folder.join("redof");
        fs::create_dir_all(&input).unwrap();
        for file in ["0001.png", "0002.PNG"] {
            RgbImage::from_pixel(640, 480, Rgb([240, 240, 240]))
                .save_with_format(input.join(file), image::ImageFormat::Png)
                .unwrap();
        }
        fs::write(input.join("broken.png"), b"garbage").unwrap();
        if let Some(line) = pitch_line {
            write_scan_information(
                &folder.join("ScanInformation.pdf"),
                &["2.4. Magnification: 5x", line, "2.6. Stacks: 40"],
            );
        }
        folder
    }

    #[test]
    fn test_prepare_reads_pitch() {
        let dir = tempfile::tempdir().unwrap();
        let folder = specimen(dir.path(), "ZMA-001", Some("2.5. Object Pixel Pitch: 5"));

        let job = task().prepare(&folder, &folder.join("redof")).unwrap();
        assert_eq!(job.pitch.micrometers(), 5.0);
        assert_eq!(job.length_px, 200);
    }

    #[test]
    fn test_batch_annotates_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let good = specimen(dir.path(), "ZMA-001", Some("2.5. Object Pixel Pitch: 5"));
        let no_pdf = specimen(dir.path(), "ZMA-002", None);
        let no_value = specimen(dir.path(), "ZMA-003", Some("2.7. Something else: 1"));
        let no_input = dir.path().join("ZMA-004");
        fs::create_dir_all(&no_input).unwrap();

        let runner = BatchRunner::new(task());
        let report = runner.run(&[good.clone(), no_pdf.clone(), no_value, no_input]);

        assert_eq!(report.processed_specimens(), 1);
        assert_eq!(report.skipped_specimens().count(), 3);
        assert_eq!(report.processed_images(), 2);
        assert_eq!(report.failed_images().count(), 1);

        let output = good.join("redof_scalebar");
        for file in ["0001.png", "0002.PNG"] {
            let annotated = image::open(output.join(file)).unwrap();
            assert_eq!(annotated.dimensions(), (640, 480));
            // Bar is 200 px, bottom right, label above it
            let bar_pixel = annotated.to_rgb8().get_pixel(640 - 20 - 1, 480 - 20 - 1).0;
            assert_eq!(bar_pixel, [0, 0, 0]);
        }
        assert!(!no_pdf.join("redof_scalebar").exists());

        // Inputs untouched
        let original = image::open(good.join("redof").join("0001.png")).unwrap();
        assert!(original.to_rgb8().pixels().all(|p| p.0 == [240, 240, 240]));
    }
}
