//! Input-shape resolution for a LeNet-style convolutional network.
//!
//! Only the tensor layout is decided here. No layers are assembled and no
//! weights are read; [`LeNetStub`] just carries the construction arguments
//! alongside the resolved input shape.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;

use crate::error::InspectError;

/// Environment variable consulted by [`Backend::from_env`]
pub const DATA_FORMAT_ENV: &str = "BGLINE_IMAGE_DATA_FORMAT";

pub const DEFAULT_ACTIVATION: &str = "relu";

/// Where the channel axis sits in an image tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageDataFormat {
    ChannelsFirst,
    #[default]
    ChannelsLast,
}

impl FromStr for ImageDataFormat {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "channels_first" => Ok(ImageDataFormat::ChannelsFirst),
            "channels_last" => Ok(ImageDataFormat::ChannelsLast),
            other => Err(InspectError::UnknownName {
                kind: "image data format",
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ImageDataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageDataFormat::ChannelsFirst => f.write_str("channels_first"),
            ImageDataFormat::ChannelsLast => f.write_str("channels_last"),
        }
    }
}

/// Numeric backend settings that affect model construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Backend {
    pub image_data_format: ImageDataFormat,
}

impl Backend {
    pub fn new(image_data_format: ImageDataFormat) -> Self {
        Self { image_data_format }
    }

    /// Read the data format from `BGLINE_IMAGE_DATA_FORMAT`, defaulting to channels-last
    pub fn from_env() -> Result<Self> {
        match std::env::var(DATA_FORMAT_ENV) {
            Ok(value) => Ok(Self::new(value.parse()?)),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn image_data_format(&self) -> ImageDataFormat {
        self.image_data_format
    }
}

/// Three-axis input shape in the backend's order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorShape(pub usize, pub usize, pub usize);

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Order (channels, rows, cols) according to `format`
pub fn input_shape(num_channels: usize, img_rows: usize, img_cols: usize, format: ImageDataFormat) -> TensorShape {
    match format {
        ImageDataFormat::ChannelsFirst => TensorShape(num_channels, img_rows, img_cols),
        ImageDataFormat::ChannelsLast => TensorShape(img_rows, img_cols, num_channels),
    }
}

/// What `LeNet::build` produces: the resolved input shape and the
/// arguments a full network would be built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeNetStub {
    pub input_shape: TensorShape,
    pub num_classes: usize,
    pub activation: String,
    pub weights_path: Option<PathBuf>,
}

pub struct LeNet;

impl LeNet {
    pub fn build(
        num_channels: usize,
        img_rows: usize,
        img_cols: usize,
        num_classes: usize,
        activation: Option<&str>,
        weights_path: Option<&Path>,
        backend: &Backend,
    ) -> Result<LeNetStub> {
        for (name, value) in [
            ("num_channels", num_channels),
            ("img_rows", img_rows),
            ("img_cols", img_cols),
            ("num_classes", num_classes),
        ] {
            if value == 0 {
                return Err(InspectError::invalid_parameter(name, value).into());
            }
        }

        let input_shape = input_shape(num_channels, img_rows, img_cols, backend.image_data_format());
        tracing::debug!("LeNet input shape {} ({})", input_shape, backend.image_data_format());

        Ok(LeNetStub {
            input_shape,
            num_classes,
            activation: activation.unwrap_or(DEFAULT_ACTIVATION).to_string(),
            weights_path: weights_path.map(Path::to_path_buf),
        })
    }
}
