//! Error types for the bgline library

use std::path::PathBuf;
use thiserror::Error;

/// Typed failures raised by the inspection and model modules.
///
/// Library functions return `anyhow::Result`; these variants are what ends up
/// inside it, so callers can `downcast_ref::<InspectError>()` when they care.
#[derive(Error, Debug)]
pub enum InspectError {
    /// Path does not exist on disk
    #[error("Path does not exist: {}", path.display())]
    MissingPath { path: PathBuf },

    /// Image file could not be opened or decoded
    #[error("Failed to load image {}: {message}", path.display())]
    ImageLoad { path: PathBuf, message: String },

    /// Candidate and background images differ in size
    #[error(
        "Image size {actual_width}x{actual_height} does not match background {expected_width}x{expected_height}"
    )]
    ShapeMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Name that does not map to a known variant
    #[error("Unknown {kind}: {name}")]
    UnknownName { kind: &'static str, name: String },
}

impl InspectError {
    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    pub fn image_load(path: impl Into<PathBuf>, source: impl std::fmt::Display) -> Self {
        Self::ImageLoad {
            path: path.into(),
            message: source.to_string(),
        }
    }
}
