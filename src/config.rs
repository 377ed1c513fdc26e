//! Tunable parameters for the inspection pipeline.
//!
//! [`InspectConfig::default`] reproduces the fixed settings of the manual
//! inspection loop: background `pic/All/image_87.jpg`, every file under
//! `pic/All`, vertical Sobel edges, Otsu thresholding and a probabilistic
//! Hough transform with a 50 vote threshold.

use std::path::PathBuf;

use crate::detection::hough::HoughParams;
use crate::detection::overlay::LineStyle;
use crate::detection::preprocessing::EdgeOperator;
use crate::detection::segments::SegmentFilter;
use crate::detection::threshold::Threshold;

pub const DEFAULT_BACKGROUND: &str = "pic/All/image_87.jpg";
pub const DEFAULT_IMAGE_ROOT: &str = "pic/All";

/// Complete configuration for one inspection run.
#[derive(Debug, Clone)]
pub struct InspectConfig {
    /// Reference "empty scene" image
    pub background: PathBuf,

    /// Directory scanned recursively, or a single image file
    pub images: PathBuf,

    pub edge_operator: EdgeOperator,
    pub threshold: Threshold,
    pub hough: HoughParams,

    /// Optional post-filter on detected segments
    pub segment_filter: Option<SegmentFilter>,

    pub line_style: LineStyle,

    /// Write every step's image below this directory
    pub debug_out: Option<PathBuf>,

    pub verbose: bool,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            background: PathBuf::from(DEFAULT_BACKGROUND),
            images: PathBuf::from(DEFAULT_IMAGE_ROOT),
            edge_operator: EdgeOperator::default(),
            threshold: Threshold::default(),
            hough: HoughParams::default(),
            segment_filter: None,
            line_style: LineStyle::default(),
            debug_out: None,
            verbose: false,
        }
    }
}

impl InspectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, path: impl Into<PathBuf>) -> Self {
        self.background = path.into();
        self
    }

    pub fn with_images(mut self, path: impl Into<PathBuf>) -> Self {
        self.images = path.into();
        self
    }

    pub fn with_edge_operator(mut self, operator: EdgeOperator) -> Self {
        self.edge_operator = operator;
        self
    }

    pub fn with_hough(mut self, hough: HoughParams) -> Self {
        self.hough = hough;
        self
    }

    pub fn with_segment_filter(mut self, filter: Option<SegmentFilter>) -> Self {
        self.segment_filter = filter;
        self
    }

    pub fn with_debug_out(mut self, dir: Option<PathBuf>) -> Self {
        self.debug_out = dir;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
