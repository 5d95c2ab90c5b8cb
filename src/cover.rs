//! Cover image rendering for published clips.
//!
//! Publishing platforms want a portrait cover per upload. We render a simple two-tone
//! vertical gradient named after the clip title; anything fancier (text overlays,
//! template art) belongs to an external design step.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use tracing::info;

use crate::error::{Error, Result};
use crate::pipeline::sanitize_filename;

/// Renders cover PNGs into a directory.
#[derive(Debug, Clone)]
pub struct CoverRenderer {
    width: u32,
    height: u32,
    output_dir: PathBuf,
    top: Rgb<u8>,
    bottom: Rgb<u8>,
}

impl CoverRenderer {
    /// Portrait 1080x1920 renderer with a dark default gradient.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            width: 1080,
            height: 1920,
            output_dir: output_dir.into(),
            top: Rgb([50, 50, 50]),
            bottom: Rgb([30, 30, 30]),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render a cover for `title` and return the written path.
    pub fn render(&self, title: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let mut img = RgbImage::new(self.width, self.height);
        for y in 0..self.height {
            let t = y as f32 / self.height.max(1) as f32;
            let row = Rgb([
                lerp(self.top.0[0], self.bottom.0[0], t),
                lerp(self.top.0[1], self.bottom.0[1], t),
                lerp(self.top.0[2], self.bottom.0[2], t),
            ]);
            for x in 0..self.width {
                img.put_pixel(x, y, row);
            }
        }

        let path = self
            .output_dir
            .join(format!("{}.png", sanitize_filename(title)));
        img.save(&path)
            .map_err(|err| Error::msg(format!("failed to write cover {}: {err}", path.display())))?;

        info!(path = %path.display(), "cover rendered");
        Ok(path)
    }
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_png_with_configured_dimensions() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let renderer = CoverRenderer::new(dir.path()).with_size(54, 96);

        let path = renderer.render("Career advice")?;
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "png");

        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (54, 96));
        Ok(())
    }

    #[test]
    fn gradient_darkens_from_top_to_bottom() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let renderer = CoverRenderer::new(dir.path()).with_size(8, 8);
        let path = renderer.render("t")?;

        let img = image::open(&path).unwrap().to_rgb8();
        assert!(img.get_pixel(0, 0).0[0] > img.get_pixel(0, 7).0[0]);
        Ok(())
    }
}
