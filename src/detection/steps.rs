use crate::pipeline::{InspectionData, PipelineStep, PipelineContext, MetadataValue};
use crate::detection::background::Background;
use crate::detection::hough::{self, HoughParams};
use crate::detection::overlay::{self, LineStyle};
use crate::detection::preprocessing::{self, EdgeDetector};
use crate::detection::segments::SegmentFilter;
use crate::detection::threshold::Threshold;
use anyhow::Result;
use image::DynamicImage;
use std::sync::Arc;

/// Stage names shown in the review windows
pub const STAGE_EDGES: &str = "edges";
pub const STAGE_EDGES_THRESH: &str = "edges_thresh";
pub const STAGE_IMAGE: &str = "image";

/// Divide the candidate by the background reference
pub struct BackgroundCorrectionStep {
    pub background: Arc<Background>,
}

impl PipelineStep for BackgroundCorrectionStep {
    fn process(&self, mut data: InspectionData, _context: &PipelineContext) -> Result<InspectionData> {
        let corrected = self.background.correct(&data.image.to_rgb8())?;
        data.image = DynamicImage::ImageRgb8(corrected);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Background Correction"
    }
}

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, mut data: InspectionData, _context: &PipelineContext) -> Result<InspectionData> {
        let gray = preprocessing::to_grayscale(&data.image);
        data.image = DynamicImage::ImageLuma8(gray);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Produce the 8-bit edge map with a pluggable operator
pub struct EdgeDetectionStep {
    pub detector: Box<dyn EdgeDetector>,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, mut data: InspectionData, _context: &PipelineContext) -> Result<InspectionData> {
        let gray = data.image.to_luma8();
        let edges = self.detector.detect(&gray);
        data.image = DynamicImage::ImageLuma8(edges);
        data.record_stage(STAGE_EDGES);
        Ok(data.with_metadata("edge_operator", MetadataValue::String(self.detector.name().to_string())))
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}

/// Binarize the edge map
pub struct ThresholdStep {
    pub threshold: Threshold,
}

impl PipelineStep for ThresholdStep {
    fn process(&self, mut data: InspectionData, context: &PipelineContext) -> Result<InspectionData> {
        let (binary, level) = self.threshold.apply(&data.image.to_luma8());
        if context.verbose {
            tracing::debug!("Threshold level: {}", level);
        }
        data.image = DynamicImage::ImageLuma8(binary);
        data.record_stage(STAGE_EDGES_THRESH);
        Ok(data.with_metadata("threshold_level", MetadataValue::Int(level as i32)))
    }

    fn name(&self) -> &str {
        "Threshold"
    }
}

/// Probabilistic Hough transform on the binary map
pub struct LineDetectionStep {
    pub params: HoughParams,
}

impl PipelineStep for LineDetectionStep {
    fn process(&self, mut data: InspectionData, context: &PipelineContext) -> Result<InspectionData> {
        data.lines = hough::detect_segments(&data.image.to_luma8(), &self.params)?;
        if context.verbose {
            tracing::debug!("Found {} line segments", data.lines.len());
        }
        let count = data.lines.len() as i32;
        Ok(data.with_metadata("line_count", MetadataValue::Int(count)))
    }

    fn name(&self) -> &str {
        "Line Detection"
    }
}

/// Keep only segments accepted by the filter
pub struct SegmentFilterStep {
    pub filter: SegmentFilter,
}

impl PipelineStep for SegmentFilterStep {
    fn process(&self, mut data: InspectionData, context: &PipelineContext) -> Result<InspectionData> {
        let before = data.lines.len();
        data.lines = self.filter.apply(&data.lines);
        if context.verbose {
            tracing::debug!("Segment filter kept {} of {}", data.lines.len(), before);
        }
        let count = data.lines.len() as i32;
        Ok(data.with_metadata("line_count", MetadataValue::Int(count)))
    }

    fn name(&self) -> &str {
        "Segment Filtering"
    }
}

/// Draw the detected segments onto the untouched original
pub struct OverlayStep {
    pub style: LineStyle,
}

impl PipelineStep for OverlayStep {
    fn process(&self, mut data: InspectionData, _context: &PipelineContext) -> Result<InspectionData> {
        let mut annotated = data.original.as_ref().clone();
        overlay::draw_segments(&data.lines, &mut annotated, self.style);
        data.image = DynamicImage::ImageRgb8(annotated);
        data.record_stage(STAGE_IMAGE);
        Ok(data)
    }

    fn name(&self) -> &str {
        "Line Overlay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::preprocessing::VerticalSobel;
    use crate::models::LineSegment;
    use image::{Rgb, RgbImage};

    fn context() -> PipelineContext {
        PipelineContext { verbose: true, debug: None }
    }

    #[test]
    fn test_edge_and_threshold_record_stages() {
        let img = RgbImage::from_fn(40, 40, |_, y| if y < 20 { Rgb([0, 0, 0]) } else { Rgb([250, 250, 250]) });
        let data = InspectionData::new("a.png", img);

        let data = GrayscaleStep.process(data, &context()).unwrap();
        let data = EdgeDetectionStep { detector: Box::new(VerticalSobel) }
            .process(data, &context())
            .unwrap();
        let data = ThresholdStep { threshold: Threshold::default() }
            .process(data, &context())
            .unwrap();

        assert!(data.stage(STAGE_EDGES).is_some());
        let binary = data.stage(STAGE_EDGES_THRESH).unwrap().to_luma8();
        assert_eq!(binary.get_pixel(5, 19)[0], 255);
        assert_eq!(binary.get_pixel(5, 5)[0], 0);
        assert!(data.get_int("threshold_level").is_some());
        assert_eq!(data.get_string("edge_operator"), Some("Vertical Sobel"));
    }

    #[test]
    fn test_overlay_draws_on_original_not_working_image() {
        let original = RgbImage::from_pixel(50, 50, Rgb([0, 0, 255]));
        let mut data = InspectionData::new("a.png", original);
        data.image = DynamicImage::ImageLuma8(image::GrayImage::new(50, 50));
        data.lines = vec![LineSegment::new(5, 25, 45, 25)];

        let data = OverlayStep { style: LineStyle::default() }
            .process(data, &context())
            .unwrap();

        let annotated = data.stage(STAGE_IMAGE).unwrap().to_rgb8();
        assert_eq!(annotated.get_pixel(20, 25), &Rgb([255, 0, 0]));
        assert_eq!(annotated.get_pixel(20, 10), &Rgb([0, 0, 255]));
        // The original stays clean for later use
        assert_eq!(data.original.get_pixel(20, 25), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_segment_filter_updates_count() {
        let mut data = InspectionData::new("a.png", RgbImage::new(10, 10));
        data.lines = vec![LineSegment::new(0, 0, 40, 0), LineSegment::new(0, 0, 0, 40)];

        let data = SegmentFilterStep { filter: SegmentFilter::default() }
            .process(data, &context())
            .unwrap();

        assert_eq!(data.lines.len(), 1);
        assert_eq!(data.get_int("line_count"), Some(1));
    }

    #[test]
    fn test_background_step_rejects_mismatched_size() {
        let background = Arc::new(Background::from_image(RgbImage::new(8, 8)));
        let data = InspectionData::new("a.png", RgbImage::new(9, 8));

        let result = BackgroundCorrectionStep { background }.process(data, &context());
        assert!(result.is_err());
    }
}
