use std::path::{Path, PathBuf};

use anyhow::Result;
use image::{Rgb, RgbImage};

use bgline::{FrameSink, InspectionFrames};

pub const WIDTH: u32 = 300;
pub const HEIGHT: u32 = 200;

/// Uniform grey "empty scene"
pub fn background_image() -> RgbImage {
    RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([200, 200, 200]))
}

/// The background with a dark horizontal bar across most of its width.
/// After correction the bar's lower edge is a long horizontal line.
pub fn bar_image(top: u32) -> RgbImage {
    let mut img = background_image();
    for y in top..top + 20 {
        for x in 20..280 {
            img.put_pixel(x, y, Rgb([40, 40, 40]));
        }
    }
    img
}

/// Write `image` as PNG to `dir/name` and return the path
pub fn save_png(dir: &Path, name: &str, image: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    image
        .save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save fixture image");
    path
}

/// Background file plus a candidate directory, kept alive by the returned TempDir
pub struct Scene {
    pub dir: tempfile::TempDir,
    pub background: PathBuf,
    pub images: PathBuf,
}

impl Scene {
    pub fn new() -> Self {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let background = save_png(dir.path(), "background.png", &background_image());
        let images = dir.path().join("candidates");
        std::fs::create_dir(&images).expect("Failed to create candidate directory");
        Self {
            dir,
            background,
            images,
        }
    }

    pub fn add(&self, name: &str, image: &RgbImage) -> PathBuf {
        save_png(&self.images, name, image)
    }
}

/// Sink that keeps the source path and segment count of every presentation
#[derive(Default)]
pub struct RecordingSink {
    pub presented: Vec<(PathBuf, usize)>,
}

impl FrameSink for RecordingSink {
    fn present(&mut self, frames: &InspectionFrames) -> Result<()> {
        self.presented.push((frames.source.clone(), frames.lines.len()));
        Ok(())
    }
}
