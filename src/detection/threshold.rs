use image::GrayImage;
use imageproc::contrast::{ThresholdType, otsu_level, threshold};

/// Fixed-level binarization, optionally with the level picked by Otsu's method.
///
/// When `otsu` is set the computed level replaces `level`. Pixels strictly
/// above the level become 255, everything else 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    pub level: u8,
    pub otsu: bool,
}

impl Default for Threshold {
    fn default() -> Self {
        Self {
            level: 127,
            otsu: true,
        }
    }
}

impl Threshold {
    pub fn fixed(level: u8) -> Self {
        Self { level, otsu: false }
    }

    /// The level that will be applied to `img`
    pub fn resolve_level(&self, img: &GrayImage) -> u8 {
        if self.otsu {
            otsu_level(img)
        } else {
            self.level
        }
    }

    /// Binarize `img`, returning the binary map and the level used
    pub fn apply(&self, img: &GrayImage) -> (GrayImage, u8) {
        let level = self.resolve_level(img);
        (threshold(img, level, ThresholdType::Binary), level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn bimodal() -> GrayImage {
        GrayImage::from_fn(10, 10, |x, _| if x < 5 { Luma([20]) } else { Luma([220]) })
    }

    #[test]
    fn test_otsu_separates_bimodal_image() {
        let (binary, level) = Threshold::default().apply(&bimodal());

        assert!((20..220).contains(&level));
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(9, 9)[0], 255);
    }

    #[test]
    fn test_fixed_level_is_strictly_greater() {
        let img = GrayImage::from_fn(3, 1, |x, _| Luma([126 + x as u8]));
        let (binary, level) = Threshold::fixed(127).apply(&img);

        assert_eq!(level, 127);
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(1, 0)[0], 0);
        assert_eq!(binary.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_output_is_binary() {
        let img = GrayImage::from_fn(16, 16, |x, y| Luma([(x * 16 + y) as u8]));
        let (binary, _) = Threshold::default().apply(&img);
        assert!(binary.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}
