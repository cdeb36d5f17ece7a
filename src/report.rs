use std::path::PathBuf;

/// Callbacks handed to the pipeline by the presentation layer. `log` receives
/// every notable event (file selected, rule applied, encoding tried, error);
/// `progress` receives a fraction in `0.0..=1.0` after each processed file.
pub trait Reporter {
    fn log(&self, message: &str);
    fn progress(&self, fraction: f64);
}

/// Discards everything. Used for quiet runs.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn log(&self, _message: &str) {}
    fn progress(&self, _fraction: f64) {}
}

#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub path: PathBuf,
    pub success: bool,
    pub replacements: usize,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub success_count: usize,
    pub failed_count: usize,
    pub total_replacements: usize,
    /// Failures in processing order, path plus stringified error.
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn record(&mut self, result: ProcessResult) {
        self.total_replacements += result.replacements;
        if result.success {
            self.success_count += 1;
        } else {
            self.failed_count += 1;
            let message = result
                .error
                .unwrap_or_else(|| "unknown error".to_string());
            self.failures.push((result.path, message));
        }
    }

    pub fn total(&self) -> usize {
        self.success_count + self.failed_count
    }

    pub fn summary(&self) -> String {
        format!(
            "processed {} file(s): {} succeeded, {} failed, {} replacement(s)",
            self.total(),
            self.success_count,
            self.failed_count,
            self.total_replacements
        )
    }
}
