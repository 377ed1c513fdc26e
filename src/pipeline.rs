use image::{DynamicImage, RgbImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Result;

use crate::models::LineSegment;

/// Named intermediate image recorded by a step
#[derive(Clone)]
pub struct Stage {
    pub name: String,
    pub image: DynamicImage,
}

/// Data that flows through the pipeline.
/// One `InspectionData` is created per candidate file.
#[derive(Clone)]
pub struct InspectionData {
    /// File the candidate was loaded from
    pub source: PathBuf,

    /// The current working image (color or grayscale depending on the step)
    pub image: DynamicImage,

    /// Candidate as loaded, before any correction (shared efficiently via Arc)
    pub original: Arc<RgbImage>,

    /// Segments found by line detection
    pub lines: Vec<LineSegment>,

    /// Images kept for display, in the order they were produced
    pub stages: Vec<Stage>,

    /// Metadata for tracking properties (e.g., "otsu_level", "line_count")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Bool(bool),
    Float(f32),
    String(String),
    Int(i32),
}

impl InspectionData {
    /// Create InspectionData for a freshly loaded candidate
    pub fn new(source: impl Into<PathBuf>, original: RgbImage) -> Self {
        let original = Arc::new(original);
        Self {
            source: source.into(),
            image: DynamicImage::ImageRgb8(original.as_ref().clone()),
            original,
            lines: Vec::new(),
            stages: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Record the current image under `name`
    pub fn record_stage(&mut self, name: impl Into<String>) {
        self.stages.push(Stage {
            name: name.into(),
            image: self.image.clone(),
        });
    }

    pub fn stage(&self, name: &str) -> Option<&DynamicImage> {
        self.stages.iter().rev().find(|s| s.name == name).map(|s| &s.image)
    }

    /// Get metadata as bool
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.metadata.get(key) {
            Some(MetadataValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get metadata as float
    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get metadata as int
    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get metadata as string
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.metadata.get(key) {
            Some(MetadataValue::String(v)) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
    /// Whether debug mode is enabled
    pub enabled: bool,
}

/// Context available to all pipeline steps
#[derive(Clone)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Transform one candidate's data
    fn process(&self, data: InspectionData, context: &PipelineContext) -> Result<InspectionData>;

    /// Human-readable name for this step (used in verbose output)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
#[derive(Clone)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext {
                verbose: false,
                debug: None,
            },
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        // Check if directory exists and is empty
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            // Create directory if it doesn't exist
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig {
            output_dir,
            enabled: true,
        });

        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step on one candidate
    pub fn run(&self, source: &Path, input: RgbImage) -> Result<InspectionData> {
        self.run_partial(source, input, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, source: &Path, input: RgbImage, num_steps: usize) -> Result<InspectionData> {
        let debug_dir = self.debug_dir_for(source)?;
        if let Some(dir) = &debug_dir {
            let input_path = dir.join("00_input.png");
            input.save(&input_path)
                .map_err(|e| anyhow::anyhow!("Failed to save debug input: {}", e))?;
        }

        let mut data = InspectionData::new(source, input);

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            if self.context.verbose {
                tracing::debug!("Running step {}: {}", step_idx + 1, step.name());
            }

            data = step.process(data, &self.context)?;

            // Save debug output for this step
            if let Some(dir) = &debug_dir {
                let filename = format!("{:02}_{}.png", step_idx + 1,
                    step.name().to_lowercase().replace(' ', "_"));
                data.image.save(dir.join(&filename))
                    .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
                if self.context.verbose {
                    tracing::debug!("  Debug: saved {}", filename);
                }
            }
        }

        Ok(data)
    }

    /// Per-candidate debug directory, created on demand
    fn debug_dir_for(&self, source: &Path) -> Result<Option<PathBuf>> {
        let Some(debug_config) = &self.context.debug else {
            return Ok(None);
        };
        if !debug_config.enabled {
            return Ok(None);
        }

        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());
        let dir = debug_config.output_dir.join(stem);
        std::fs::create_dir_all(&dir)?;
        Ok(Some(dir))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    struct InvertStep;

    impl PipelineStep for InvertStep {
        fn process(&self, mut data: InspectionData, _context: &PipelineContext) -> Result<InspectionData> {
            data.image.invert();
            data.record_stage("inverted");
            Ok(data.with_metadata("inverted", MetadataValue::Bool(true)))
        }

        fn name(&self) -> &str {
            "Invert Colors"
        }
    }

    fn sample() -> RgbImage {
        RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]))
    }

    #[test]
    fn test_run_applies_steps_in_order() {
        let pipeline = Pipeline::new()
            .add_step(Arc::new(InvertStep))
            .add_step_boxed(Box::new(InvertStep));

        let data = pipeline.run(Path::new("a.png"), sample()).unwrap();

        assert_eq!(pipeline.len(), 2);
        assert_eq!(data.image.to_rgb8().get_pixel(0, 0), &Rgb([10, 20, 30]));
        assert_eq!(data.stages.len(), 2);
        assert_eq!(data.get_bool("inverted"), Some(true));
        assert_eq!(data.original.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_run_partial_stops_early() {
        let pipeline = Pipeline::new()
            .add_step(Arc::new(InvertStep))
            .add_step(Arc::new(InvertStep));

        let data = pipeline.run_partial(Path::new("a.png"), sample(), 1).unwrap();

        assert_eq!(data.image.to_rgb8().get_pixel(0, 0), &Rgb([245, 235, 225]));
        assert_eq!(data.stages.len(), 1);
    }

    #[test]
    fn test_stage_lookup_returns_latest() {
        let mut data = InspectionData::new("a.png", sample());
        data.record_stage("x");
        data.image.invert();
        data.record_stage("x");

        let stage = data.stage("x").unwrap();
        assert_eq!(stage.to_rgb8().get_pixel(0, 0), &Rgb([245, 235, 225]));
        assert!(data.stage("missing").is_none());
    }

    #[test]
    fn test_debug_dir_must_be_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("stale.txt"), b"x").unwrap();

        assert!(Pipeline::new().with_debug(dir.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_debug_outputs_per_step() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("debug");
        let pipeline = Pipeline::new()
            .add_step(Arc::new(InvertStep))
            .with_debug(out.clone())
            .unwrap();

        pipeline.run(Path::new("shots/frame_3.jpg"), sample()).unwrap();

        assert!(out.join("frame_3").join("00_input.png").exists());
        assert!(out.join("frame_3").join("01_invert_colors.png").exists());
    }
}
