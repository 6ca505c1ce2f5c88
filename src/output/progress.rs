//! Progress bar utilities for frame processing.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar for processing a batch of frames.
pub fn create_frame_progress(total_frames: usize, enabled: bool) -> Option<ProgressBar> {
    if !enabled || total_frames == 0 {
        return None;
    }

    let pb = ProgressBar::new(total_frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ "),
    );
    Some(pb)
}

/// Show the frame currently being processed.
pub fn set_progress_message(pb: Option<&ProgressBar>, message: &str) {
    if let Some(pb) = pb {
        pb.set_message(message.to_string());
    }
}

/// Finish a progress bar with a message.
pub fn finish_progress(pb: Option<ProgressBar>, message: &str) {
    if let Some(pb) = pb {
        pb.finish_with_message(message.to_string());
    }
}

/// Increment a progress bar.
pub fn inc_progress(pb: Option<&ProgressBar>) {
    if let Some(pb) = pb {
        pb.inc(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_progress() {
        assert!(create_frame_progress(10, false).is_none());
        assert!(create_frame_progress(0, true).is_none());
    }

    #[test]
    fn test_enabled_progress() {
        let pb = create_frame_progress(3, true);
        inc_progress(pb.as_ref());
        assert_eq!(pb.as_ref().map(ProgressBar::position), Some(1));
        finish_progress(pb, "done");
    }
}
