use std::path::{Path, PathBuf};

use crate::encoding::{self, EncodingConfig};
use crate::engine;
use crate::error::Result;
use crate::report::{BatchReport, ProcessResult, Reporter};
use crate::rules::ReplaceRule;
use crate::writer::StagingArea;

/// Runs the pipeline over the file list, strictly sequential. Any error while
/// processing a single file is caught at the file boundary, recorded, and the
/// batch moves on; there is no abort-on-first-failure.
pub fn process_batch(
    files: &[PathBuf],
    rules: &[ReplaceRule],
    config: &EncodingConfig,
    staging: &mut StagingArea,
    reporter: &dyn Reporter,
) -> BatchReport {
    let mut report = BatchReport::default();
    let total = files.len();

    for (index, path) in files.iter().enumerate() {
        reporter.log(&format!("processing {}", path.display()));
        let result = match process_file(path, rules, config, staging, reporter) {
            Ok(replacements) => ProcessResult {
                path: path.clone(),
                success: true,
                replacements,
                error: None,
            },
            Err(err) => {
                let message = err.to_string();
                reporter.log(&format!("error: {message}"));
                ProcessResult {
                    path: path.clone(),
                    success: false,
                    replacements: 0,
                    error: Some(message),
                }
            }
        };
        report.record(result);
        reporter.progress((index + 1) as f64 / total as f64);
    }

    reporter.log(&report.summary());
    report
}

/// Read, transform, and (only when something changed) write back one file.
/// Returns the total replacement count.
fn process_file(
    path: &Path,
    rules: &[ReplaceRule],
    config: &EncodingConfig,
    staging: &mut StagingArea,
    reporter: &dyn Reporter,
) -> Result<usize> {
    let decoded = encoding::resolve_and_read(path, &config.read, reporter)?;
    let outcome = engine::apply_rules(&decoded.text, rules, reporter);

    if outcome.modified {
        reporter.log(&format!(
            "{} replacement(s) in {}",
            outcome.total_replacements,
            path.display()
        ));
        let bytes = encoding::encode(&outcome.text, &config.write)?;
        staging.write_back(path, &bytes)?;
        reporter.log(&format!("saved {}", path.display()));
    } else {
        reporter.log(&format!("nothing to replace in {}", path.display()));
    }

    Ok(outcome.total_replacements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::ReadEncoding;
    use crate::report::NullReporter;
    use crate::report::testing::RecordingReporter;
    use std::fs;
    use tempfile::tempdir;

    fn utf8_config() -> EncodingConfig {
        EncodingConfig {
            read: ReadEncoding::Explicit("utf-8".to_string()),
            write: "utf-8".to_string(),
        }
    }

    #[test]
    fn failure_in_one_file_does_not_abort_the_batch() {
        let temp = tempdir().expect("temp dir");
        let one = temp.path().join("one.txt");
        let two = temp.path().join("two.txt");
        let three = temp.path().join("three.txt");
        fs::write(&one, "foo here").expect("write");
        // Not valid UTF-8; decoding with the explicit utf-8 reader fails.
        fs::write(&two, [0xD6, 0xD0, 0xCE, 0xC4]).expect("write");
        fs::write(&three, "foo there").expect("write");

        let files = vec![one.clone(), two.clone(), three.clone()];
        let rules = vec![ReplaceRule::literal("r", "foo", "bar")];
        let mut staging = StagingArea::new().expect("staging");
        let reporter = RecordingReporter::default();

        let report = process_batch(&files, &rules, &utf8_config(), &mut staging, &reporter);

        assert_eq!(report.success_count, 2);
        assert_eq!(report.failed_count, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, two);

        assert_eq!(fs::read_to_string(&one).expect("read"), "bar here");
        assert_eq!(fs::read(&two).expect("read"), vec![0xD6, 0xD0, 0xCE, 0xC4]);
        assert_eq!(fs::read_to_string(&three).expect("read"), "bar there");

        let fractions = reporter.fractions.borrow();
        assert!(fractions.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(*fractions.last().expect("progress emitted"), 1.0);
    }

    #[test]
    fn unmodified_file_is_left_untouched() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("doc.txt");
        fs::write(&path, "nothing matches").expect("write");

        let rules = vec![ReplaceRule::literal("r", "absent", "x")];
        let mut staging = StagingArea::new().expect("staging");
        let report = process_batch(
            &[path.clone()],
            &rules,
            &utf8_config(),
            &mut staging,
            &NullReporter,
        );

        assert_eq!(report.success_count, 1);
        assert_eq!(fs::read_to_string(&path).expect("read"), "nothing matches");
        // Nothing was staged for an unmodified file.
        assert_eq!(
            fs::read_dir(staging.path()).expect("read staging").count(),
            0
        );
    }

    #[test]
    fn write_back_uses_the_configured_write_encoding() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("cn.txt");
        fs::write(&path, "name=旧").expect("write");

        let rules = vec![ReplaceRule::literal("r", "旧", "中文")];
        let config = EncodingConfig {
            read: ReadEncoding::Explicit("utf-8".to_string()),
            write: "gbk".to_string(),
        };
        let mut staging = StagingArea::new().expect("staging");
        let report = process_batch(&[path.clone()], &rules, &config, &mut staging, &NullReporter);

        assert_eq!(report.success_count, 1);
        let mut expected = b"name=".to_vec();
        expected.extend_from_slice(&[0xD6, 0xD0, 0xCE, 0xC4]);
        assert_eq!(fs::read(&path).expect("read"), expected);
    }

    #[test]
    fn rerun_after_full_replacement_reports_no_changes() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("doc.txt");
        fs::write(&path, "foofoo").expect("write");

        let rules = vec![ReplaceRule::literal("r", "foo", "bar")];
        let mut staging = StagingArea::new().expect("staging");

        process_batch(&[path.clone()], &rules, &utf8_config(), &mut staging, &NullReporter);
        assert_eq!(fs::read_to_string(&path).expect("read"), "barbar");

        let reporter = RecordingReporter::default();
        let report = process_batch(&[path.clone()], &rules, &utf8_config(), &mut staging, &reporter);
        assert_eq!(report.success_count, 1);
        assert!(reporter.logged("nothing to replace"));
        assert_eq!(fs::read_to_string(&path).expect("read"), "barbar");
    }
}
