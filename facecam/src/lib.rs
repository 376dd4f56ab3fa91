pub mod cadence;
pub mod config;
pub mod context;
pub mod layout;
pub mod pipeline;
pub mod source;

pub use cadence::DetectionCadence;
pub use config::Config;
pub use context::ProcessingContext;
pub use layout::Layout;
pub use pipeline::{DerivedView, FrameOutput, FramePipeline, View};
pub use source::{
    FixedDetector, FrameSource, NoDetector, RegionDetector, StillFrameSource, TestPatternSource,
};
