//! Batch background correction and inspection.
//!
//! An [`Inspector`] owns the read-only background and the assembled
//! pipeline. Files are processed one at a time; each successful result is
//! handed to a [`FrameSink`], which decides how (and for how long) to show it.
//! A file that fails to load or process is logged and skipped.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use image::{GrayImage, RgbImage};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::InspectConfig;
use crate::detection::background::{Background, load_color};
use crate::detection::build_inspection_pipeline;
use crate::detection::steps::{STAGE_EDGES, STAGE_EDGES_THRESH, STAGE_IMAGE};
use crate::error::InspectError;
use crate::models::LineSegment;
use crate::pipeline::Pipeline;

/// Everything shown for one candidate file
#[derive(Debug, Clone)]
pub struct InspectionFrames {
    pub source: PathBuf,
    /// Raw edge map
    pub edges: GrayImage,
    /// Binarized edge map
    pub edges_thresh: GrayImage,
    /// Original candidate with detected segments drawn on it
    pub image: RgbImage,
    pub lines: Vec<LineSegment>,
    pub threshold_level: u8,
}

impl InspectionFrames {
    /// Window titles paired with their images
    pub fn panels(&self) -> [(&'static str, image::DynamicImage); 3] {
        [
            (STAGE_EDGES, image::DynamicImage::ImageLuma8(self.edges.clone())),
            (STAGE_EDGES_THRESH, image::DynamicImage::ImageLuma8(self.edges_thresh.clone())),
            (STAGE_IMAGE, image::DynamicImage::ImageRgb8(self.image.clone())),
        ]
    }
}

/// Receives one set of frames per processed file
pub trait FrameSink {
    /// Show the frames; return once the viewer may move on
    fn present(&mut self, frames: &InspectionFrames) -> Result<()>;
}

/// Headless sink that only logs what was found
#[derive(Debug, Default)]
pub struct LogSink {
    pub presented: usize,
}

impl FrameSink for LogSink {
    fn present(&mut self, frames: &InspectionFrames) -> Result<()> {
        self.presented += 1;
        info!(
            "{}: {} segment(s), threshold level {}",
            frames.source.display(),
            frames.lines.len(),
            frames.threshold_level
        );
        for line in &frames.lines {
            tracing::debug!(
                "  ({}, {}) -> ({}, {})",
                line.x1, line.y1, line.x2, line.y2
            );
        }
        Ok(())
    }
}

/// Counts from one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub presented: usize,
    pub failed: usize,
}

/// Every file below `root`, sorted by path. A file path yields itself.
///
/// No extension filtering: files that are not images fail later, at decode.
pub fn collect_images(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(InspectError::MissingPath {
            path: root.to_path_buf(),
        }
        .into());
    }
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Processes candidate files against a fixed background
#[derive(Clone)]
pub struct Inspector {
    pipeline: Pipeline,
    files: Vec<PathBuf>,
}

impl Inspector {
    pub fn new(pipeline: Pipeline, files: Vec<PathBuf>) -> Self {
        Self { pipeline, files }
    }

    /// Load the background, collect the files and build the pipeline
    pub fn from_config(config: &InspectConfig) -> Result<Self> {
        let background = Arc::new(Background::load(&config.background)?);
        let files = collect_images(&config.images)?;
        info!("Found {} file(s) under {}", files.len(), config.images.display());
        let pipeline = build_inspection_pipeline(config, background)?;
        Ok(Self::new(pipeline, files))
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Run the pipeline on one file
    pub fn inspect_file(&self, path: &Path) -> Result<InspectionFrames> {
        let input = load_color(path)?;
        let data = self.pipeline.run(path, input)?;

        let stage = |name: &str| {
            data.stage(name)
                .ok_or_else(|| anyhow::anyhow!("Pipeline produced no '{}' stage", name))
        };
        let edges = stage(STAGE_EDGES)?.to_luma8();
        let edges_thresh = stage(STAGE_EDGES_THRESH)?.to_luma8();
        let image = stage(STAGE_IMAGE)?.to_rgb8();
        let threshold_level = data.get_int("threshold_level").unwrap_or(0).clamp(0, 255) as u8;

        Ok(InspectionFrames {
            source: path.to_path_buf(),
            edges,
            edges_thresh,
            image,
            lines: data.lines,
            threshold_level,
        })
    }

    /// Inspect the file at `index`, logging instead of returning a failure
    pub fn try_inspect(&self, index: usize) -> Option<InspectionFrames> {
        let path = self.files.get(index)?;
        match self.inspect_file(path) {
            Ok(frames) => Some(frames),
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                None
            }
        }
    }

    /// Present every successfully processed file, in order
    pub fn run(&self, sink: &mut dyn FrameSink) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        for index in 0..self.files.len() {
            match self.try_inspect(index) {
                Some(frames) => {
                    sink.present(&frames)?;
                    summary.presented += 1;
                }
                None => summary.failed += 1,
            }
        }
        info!("Presented {} file(s), skipped {}", summary.presented, summary.failed);
        Ok(summary)
    }
}
