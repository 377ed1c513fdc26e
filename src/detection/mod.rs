pub mod background;
pub mod preprocessing;
pub mod threshold;
pub mod hough;
pub mod overlay;
pub mod segments;
pub mod steps;

use std::sync::Arc;

use anyhow::Result;

use crate::config::InspectConfig;
use crate::pipeline::Pipeline;
use background::Background;

/// Build the inspection chain: background correction, grayscale, edges,
/// threshold, line detection, optional segment filter, overlay.
pub fn build_inspection_pipeline(config: &InspectConfig, background: Arc<Background>) -> Result<Pipeline> {
    use steps::*;

    config.hough.validate()?;

    let mut pipeline = Pipeline::new()
        .with_verbose(config.verbose)
        .add_step(Arc::new(BackgroundCorrectionStep { background }))
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(EdgeDetectionStep {
            detector: config.edge_operator.detector(),
        }))
        .add_step(Arc::new(ThresholdStep {
            threshold: config.threshold,
        }))
        .add_step(Arc::new(LineDetectionStep { params: config.hough }));

    if let Some(filter) = config.segment_filter {
        pipeline = pipeline.add_step(Arc::new(SegmentFilterStep { filter }));
    }

    pipeline = pipeline.add_step(Arc::new(OverlayStep {
        style: config.line_style,
    }));

    // Enable debug mode if requested
    if let Some(dir) = &config.debug_out {
        pipeline = pipeline.with_debug(dir.clone())?;
    }

    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::segments::SegmentFilter;
    use image::RgbImage;

    fn background() -> Arc<Background> {
        Arc::new(Background::from_image(RgbImage::new(4, 4)))
    }

    #[test]
    fn test_default_step_order() {
        let pipeline = build_inspection_pipeline(&InspectConfig::default(), background()).unwrap();
        assert_eq!(
            pipeline.step_names(),
            vec![
                "Background Correction",
                "Grayscale Conversion",
                "Edge Detection",
                "Threshold",
                "Line Detection",
                "Line Overlay",
            ]
        );
    }

    #[test]
    fn test_segment_filter_is_inserted_before_overlay() {
        let config = InspectConfig::default().with_segment_filter(Some(SegmentFilter::default()));
        let pipeline = build_inspection_pipeline(&config, background()).unwrap();
        let names = pipeline.step_names();
        assert_eq!(names.len(), 7);
        assert_eq!(names[5], "Segment Filtering");
    }
}
