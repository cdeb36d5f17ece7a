use std::path::Path;

use crate::batch::process_batch;
use crate::discover::{FileSelection, discover};
use crate::encoding::EncodingConfig;
use crate::error::Result;
use crate::report::{BatchReport, Reporter};
use crate::rules::ReplaceRule;
use crate::writer::StagingArea;

/// The interface the presentation layer drives: configure a selection, a rule
/// list, and encodings, then run the batch. The session owns the staging
/// area for the lifetime of the run and never blocks on user interaction.
pub struct ReplaceSession {
    selection: Option<FileSelection>,
    rules: Vec<ReplaceRule>,
    config: EncodingConfig,
    staging: StagingArea,
}

impl ReplaceSession {
    pub fn new() -> Result<Self> {
        Ok(ReplaceSession {
            selection: None,
            rules: Vec::new(),
            config: EncodingConfig::default(),
            staging: StagingArea::new()?,
        })
    }

    pub fn set_file_selection(&mut self, selection: FileSelection) {
        self.selection = Some(selection);
    }

    pub fn set_rules(&mut self, rules: Vec<ReplaceRule>) {
        self.rules = rules;
    }

    pub fn set_encoding_config(&mut self, config: EncodingConfig) {
        self.config = config;
    }

    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }

    /// Discovers the file list and processes it. Missing configuration is
    /// logged and yields an empty report rather than an error.
    pub fn run_batch(&mut self, reporter: &dyn Reporter) -> BatchReport {
        let Some(selection) = &self.selection else {
            reporter.log("error: no file selection configured");
            return BatchReport::default();
        };
        if self.rules.is_empty() {
            reporter.log("error: no replace rules configured");
            return BatchReport::default();
        }

        let files = discover(selection, reporter);
        if files.is_empty() {
            reporter.log("error: no files to process");
            return BatchReport::default();
        }

        process_batch(&files, &self.rules, &self.config, &mut self.staging, reporter)
    }

    /// Best-effort staging cleanup; failure is logged, never fatal.
    pub fn close(self, reporter: &dyn Reporter) {
        if let Err(err) = self.staging.close() {
            reporter.log(&format!("warning: failed to remove staging directory: {err}"));
        }
    }
}
