pub mod config;
pub mod detection;
pub mod error;
pub mod inspect;
pub mod lenet;
pub mod models;
pub mod pipeline;

pub use config::InspectConfig;
pub use error::InspectError;
pub use inspect::{BatchSummary, FrameSink, InspectionFrames, Inspector, LogSink};
pub use lenet::{Backend, ImageDataFormat, LeNet, LeNetStub, TensorShape};
pub use models::{LineSegment, PolarLine};
pub use pipeline::{
    DebugConfig, InspectionData, MetadataValue, Pipeline, PipelineContext, PipelineStep,
};

#[cfg(feature = "gui")]
pub mod gui;
