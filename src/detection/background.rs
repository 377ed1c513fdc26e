use std::path::Path;

use anyhow::Result;
use image::{ImageReader, Rgb, RgbImage};

use crate::error::InspectError;

/// Reference image of the empty scene used to flatten uneven illumination.
///
/// Channel values of 0 are stored as 1 so the per-pixel division in
/// [`Background::correct`] is always defined.
#[derive(Debug, Clone)]
pub struct Background {
    image: RgbImage,
}

impl Background {
    pub fn from_image(mut image: RgbImage) -> Self {
        for pixel in image.pixels_mut() {
            for channel in pixel.0.iter_mut() {
                if *channel == 0 {
                    *channel = 1;
                }
            }
        }
        Self { image }
    }

    /// Load the background as a color image
    pub fn load(path: &Path) -> Result<Self> {
        let image = load_color(path)?;
        tracing::debug!(
            "Background loaded: {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self::from_image(image))
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Divide `candidate` by the background and rescale to the full 8-bit range.
    ///
    /// Each channel becomes `round(candidate / background * 255)`, saturated to 255.
    pub fn correct(&self, candidate: &RgbImage) -> Result<RgbImage> {
        let (width, height) = self.dimensions();
        if candidate.dimensions() != (width, height) {
            return Err(InspectError::ShapeMismatch {
                expected_width: width,
                expected_height: height,
                actual_width: candidate.width(),
                actual_height: candidate.height(),
            }
            .into());
        }

        let corrected = RgbImage::from_fn(width, height, |x, y| {
            let c = candidate.get_pixel(x, y);
            let b = self.image.get_pixel(x, y);
            Rgb([
                correct_channel(c[0], b[0]),
                correct_channel(c[1], b[1]),
                correct_channel(c[2], b[2]),
            ])
        });
        Ok(corrected)
    }
}

fn correct_channel(candidate: u8, background: u8) -> u8 {
    let ratio = candidate as f32 / background as f32;
    (ratio * 255.0).round().min(255.0) as u8
}

/// Open and decode any supported image file as 8-bit RGB
pub fn load_color(path: &Path) -> Result<RgbImage> {
    if !path.exists() {
        return Err(InspectError::MissingPath {
            path: path.to_path_buf(),
        }
        .into());
    }

    let img = ImageReader::open(path)
        .map_err(|e| InspectError::image_load(path, e))?
        .with_guessed_format()
        .map_err(|e| InspectError::image_load(path, e))?
        .decode()
        .map_err(|e| InspectError::image_load(path, e))?;

    Ok(img.to_rgb8())
}
