use std::fmt;
use std::str::FromStr;

use image::{DynamicImage, GrayImage, Luma};
use imageproc::edges::canny;
use imageproc::gradients::vertical_sobel;

use crate::error::InspectError;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Strategy that turns a grayscale image into an 8-bit edge map
pub trait EdgeDetector: Send + Sync {
    fn detect(&self, gray: &GrayImage) -> GrayImage;

    fn name(&self) -> &str;
}

/// First-order Sobel derivative in y, saturated to 8 bits.
///
/// Negative responses (bright-to-dark going down) become 0, so only
/// dark-to-bright horizontal transitions survive.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerticalSobel;

impl EdgeDetector for VerticalSobel {
    fn detect(&self, gray: &GrayImage) -> GrayImage {
        let gradient = vertical_sobel(gray);
        GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            Luma([saturate_u8(gradient.get_pixel(x, y)[0] as i32)])
        })
    }

    fn name(&self) -> &str {
        "Vertical Sobel"
    }
}

/// Canny edge detector
#[derive(Debug, Clone, Copy)]
pub struct Canny {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl Default for Canny {
    fn default() -> Self {
        Self {
            low_threshold: 50.0,
            high_threshold: 150.0,
        }
    }
}

impl EdgeDetector for Canny {
    fn detect(&self, gray: &GrayImage) -> GrayImage {
        canny(gray, self.low_threshold, self.high_threshold)
    }

    fn name(&self) -> &str {
        "Canny"
    }
}

/// 3x3 Laplacian, absolute response saturated to 8 bits
#[derive(Debug, Clone, Copy, Default)]
pub struct Laplacian;

impl EdgeDetector for Laplacian {
    fn detect(&self, gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        let mut out = GrayImage::new(width, height);
        if width == 0 || height == 0 {
            return out;
        }

        // Replicate border pixels
        let at = |x: i64, y: i64| -> i32 {
            let cx = x.clamp(0, width as i64 - 1) as u32;
            let cy = y.clamp(0, height as i64 - 1) as u32;
            gray.get_pixel(cx, cy)[0] as i32
        };

        for y in 0..height as i64 {
            for x in 0..width as i64 {
                let response =
                    at(x, y - 1) + at(x - 1, y) + at(x + 1, y) + at(x, y + 1) - 4 * at(x, y);
                out.put_pixel(x as u32, y as u32, Luma([saturate_u8(response.abs())]));
            }
        }
        out
    }

    fn name(&self) -> &str {
        "Laplacian"
    }
}

fn saturate_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Edge operator selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeOperator {
    #[default]
    Sobel,
    Canny,
    Laplacian,
}

impl EdgeOperator {
    pub fn detector(&self) -> Box<dyn EdgeDetector> {
        match self {
            EdgeOperator::Sobel => Box::new(VerticalSobel),
            EdgeOperator::Canny => Box::new(Canny::default()),
            EdgeOperator::Laplacian => Box::new(Laplacian),
        }
    }
}

impl FromStr for EdgeOperator {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sobel" => Ok(EdgeOperator::Sobel),
            "canny" => Ok(EdgeOperator::Canny),
            "laplacian" => Ok(EdgeOperator::Laplacian),
            _ => Err(InspectError::UnknownName {
                kind: "edge operator",
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for EdgeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgeOperator::Sobel => "sobel",
            EdgeOperator::Canny => "canny",
            EdgeOperator::Laplacian => "laplacian",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_image(top: u8, bottom: u8) -> GrayImage {
        GrayImage::from_fn(20, 20, |_, y| if y < 10 { Luma([top]) } else { Luma([bottom]) })
    }

    #[test]
    fn test_sobel_dark_to_bright_saturates() {
        let edges = VerticalSobel.detect(&step_image(0, 200));

        assert_eq!(edges.get_pixel(10, 9)[0], 255);
        assert_eq!(edges.get_pixel(10, 10)[0], 255);
        assert_eq!(edges.get_pixel(10, 3)[0], 0);
        assert_eq!(edges.get_pixel(10, 16)[0], 0);
    }

    #[test]
    fn test_sobel_bright_to_dark_clips_to_zero() {
        let edges = VerticalSobel.detect(&step_image(200, 0));
        assert!(edges.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_sobel_ignores_vertical_edges() {
        let img = GrayImage::from_fn(20, 20, |x, _| if x < 10 { Luma([0]) } else { Luma([200]) });
        let edges = VerticalSobel.detect(&img);
        assert!(edges.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_laplacian_flat_image_is_zero() {
        let img = GrayImage::from_pixel(8, 8, Luma([90]));
        let edges = Laplacian.detect(&img);
        assert!(edges.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_laplacian_marks_step() {
        let edges = Laplacian.detect(&step_image(0, 100));
        assert_eq!(edges.get_pixel(5, 9)[0], 100);
        assert_eq!(edges.get_pixel(5, 10)[0], 100);
        assert_eq!(edges.get_pixel(5, 2)[0], 0);
    }

    #[test]
    fn test_edge_operator_from_name() {
        assert_eq!("sobel".parse::<EdgeOperator>().unwrap(), EdgeOperator::Sobel);
        assert_eq!("Canny".parse::<EdgeOperator>().unwrap(), EdgeOperator::Canny);
        assert_eq!("laplacian".parse::<EdgeOperator>().unwrap(), EdgeOperator::Laplacian);
        assert!("prewitt".parse::<EdgeOperator>().is_err());
        assert_eq!(EdgeOperator::Laplacian.to_string(), "laplacian");
    }

    #[test]
    fn test_edge_operator_detector_names() {
        assert_eq!(EdgeOperator::Sobel.detector().name(), "Vertical Sobel");
        assert_eq!(EdgeOperator::Canny.detector().name(), "Canny");
    }
}
