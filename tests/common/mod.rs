mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from bgline for tests
pub use bgline::{
    BatchSummary, FrameSink, InspectConfig, InspectionFrames, Inspector, LineSegment, LogSink,
};
