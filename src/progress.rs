use indicatif::{ProgressBar, ProgressStyle};

/// Percent-style bar driven by the pipeline's progress fraction callback.
pub fn create_batch_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {percent:>3}% {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}
