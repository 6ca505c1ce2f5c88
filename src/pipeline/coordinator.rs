//! Batch coordination across frames.

use crate::detect::CrownDetector;
use crate::error::Result;
use crate::frames::FrameMetadata;
use crate::output::progress;
use crate::output::{CrownRow, CrownTableWriter};
use crate::pipeline::{FrameFilter, FrameResult, ProcessOptions, process_frame};
use std::time::Instant;
use tracing::{error, info, warn};

/// Which filter a run applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// Keep crowns inside the buffered inventory boundary.
    Mask,
    /// Keep crowns containing inventory trees and join their attributes.
    Fuse,
}

impl std::fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mask => write!(f, "mask"),
            Self::Fuse => write!(f, "fuse"),
        }
    }
}

/// Batch behaviour switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Abort on the first failed frame instead of skipping it.
    pub fail_fast: bool,
    /// Show a frame progress bar.
    pub progress: bool,
}

/// Totals for a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Frames listed in the metadata table.
    pub frames_total: usize,
    /// Frames written successfully.
    pub processed: usize,
    /// Frames skipped after a frame-local error.
    pub skipped: usize,
    /// Crowns reported by the detector.
    pub detections: usize,
    /// Crowns that survived the filter.
    pub crowns_kept: usize,
    /// Rows written to each crown table.
    pub rows: usize,
}

/// Process every frame, writing each frame's crowns to `writers`.
///
/// Frame-local errors are logged and the frame is skipped, unless
/// `fail_fast` is set. Any other error aborts the batch.
pub fn run_batch(
    frames: &[FrameMetadata],
    options: &ProcessOptions,
    filter: &FrameFilter<'_>,
    detector: &mut dyn CrownDetector,
    writers: &mut [Box<dyn CrownTableWriter>],
    batch: BatchOptions,
) -> Result<BatchSummary> {
    let start = Instant::now();
    let mut summary = BatchSummary {
        frames_total: frames.len(),
        ..BatchSummary::default()
    };

    for writer in writers.iter_mut() {
        writer.write_header()?;
    }

    info!(
        "Processing {} frame(s) with the {} detector",
        frames.len(),
        detector.name()
    );
    let frame_progress = progress::create_frame_progress(frames.len(), batch.progress);

    for frame in frames {
        progress::set_progress_message(frame_progress.as_ref(), &frame.image_name);

        match process_frame(frame, options, filter, detector) {
            Ok(result) => {
                summary.processed += 1;
                summary.detections += result.detections_total;
                summary.crowns_kept += result.crowns.len();
                summary.rows += write_rows(&result, filter, writers)?;
            }
            Err(e) if e.is_frame_local() && !batch.fail_fast => {
                error!("Skipping frame {}: {}", frame.image_name, e);
                summary.skipped += 1;
            }
            Err(e) => {
                error!("Failed to process frame {}: {}", frame.image_name, e);
                progress::finish_progress(frame_progress, "Failed");
                return Err(e);
            }
        }
        progress::inc_progress(frame_progress.as_ref());
    }

    progress::finish_progress(frame_progress, "Complete");

    for writer in writers.iter_mut() {
        writer.finalize()?;
    }

    info!(
        "Complete: {} processed, {} skipped, {} of {} crowns kept, {} table rows in {:.2}s",
        summary.processed,
        summary.skipped,
        summary.crowns_kept,
        summary.detections,
        summary.rows,
        start.elapsed().as_secs_f64()
    );
    if summary.skipped > 0 {
        warn!("{} frame(s) had errors", summary.skipped);
    }

    Ok(summary)
}

/// Write one frame's rows to every table, returning the row count.
fn write_rows(
    result: &FrameResult,
    filter: &FrameFilter<'_>,
    writers: &mut [Box<dyn CrownTableWriter>],
) -> Result<usize> {
    let rows: Vec<CrownRow<'_>> = match filter {
        FrameFilter::Mask(_) => result
            .crowns
            .iter()
            .enumerate()
            .map(|(crown_id, crown)| CrownRow {
                image: &result.image_file,
                crown_id,
                crown,
                record: None,
            })
            .collect(),
        FrameFilter::Fuse(inventory) => result
            .matches
            .iter()
            .map(|m| CrownRow {
                image: &result.image_file,
                crown_id: m.crown,
                crown: &result.crowns[m.crown],
                record: inventory.records().get(m.record),
            })
            .collect(),
    };

    for writer in writers.iter_mut() {
        for row in &rows {
            writer.write_row(row)?;
        }
    }

    Ok(rows.len())
}
