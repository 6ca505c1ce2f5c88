//! Processing pipeline components.

mod coordinator;
mod processor;

pub use coordinator::{BatchOptions, BatchSummary, PipelineMode, run_batch};
pub use processor::{FrameFilter, FrameResult, ProcessOptions, process_frame};
