use std::fs;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::report::Reporter;

/// How the target files are specified. `Multiple` carries the raw
/// comma-separated path list as entered.
#[derive(Debug, Clone)]
pub enum FileSelection {
    Single(PathBuf),
    Multiple(String),
    Directory {
        path: PathBuf,
        recursive: bool,
        filters: Vec<String>,
    },
}

/// Expands a selection into a concrete file list. Never fails: unreachable or
/// missing paths are logged and skipped. Directory traversal order is
/// whatever the filesystem enumeration yields.
pub fn discover(selection: &FileSelection, reporter: &dyn Reporter) -> Vec<PathBuf> {
    match selection {
        FileSelection::Single(path) => {
            if path.is_file() {
                reporter.log(&format!("selected file {}", path.display()));
                vec![path.clone()]
            } else {
                reporter.log(&format!("error: not a file: {}", path.display()));
                Vec::new()
            }
        }
        FileSelection::Multiple(raw) => {
            let mut files = Vec::new();
            for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let path = PathBuf::from(part);
                if path.is_file() {
                    files.push(path);
                } else {
                    reporter.log(&format!("warning: skipping missing file {part}"));
                }
            }
            reporter.log(&format!("selected {} file(s)", files.len()));
            files
        }
        FileSelection::Directory {
            path,
            recursive,
            filters,
        } => {
            if !path.is_dir() {
                reporter.log(&format!("error: not a directory: {}", path.display()));
                return Vec::new();
            }

            let filter_set = build_filter_set(filters, reporter);
            reporter.log(&format!(
                "scanning {} ({})",
                path.display(),
                if *recursive { "recursive" } else { "flat" }
            ));

            let files = if *recursive {
                scan_recursive(path, &filter_set, reporter)
            } else {
                scan_flat(path, &filter_set, reporter)
            };

            reporter.log(&format!("found {} matching file(s)", files.len()));
            files
        }
    }
}

fn scan_recursive(dir: &Path, filters: &GlobSet, reporter: &dyn Reporter) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && filters.is_match(Path::new(entry.file_name())) {
                    files.push(entry.into_path());
                }
            }
            Err(err) => reporter.log(&format!("warning: {err}")),
        }
    }
    files
}

fn scan_flat(dir: &Path, filters: &GlobSet, reporter: &dyn Reporter) -> Vec<PathBuf> {
    let mut files = Vec::new();
    match fs::read_dir(dir) {
        Ok(entries) => {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() && filters.is_match(Path::new(&entry.file_name())) {
                    files.push(path);
                }
            }
        }
        Err(err) => reporter.log(&format!("warning: cannot read {}: {err}", dir.display())),
    }
    files
}

/// Builds a case-insensitive matcher over the base name. Filters default to
/// `*.*`; an invalid pattern is logged and skipped, not fatal.
fn build_filter_set(filters: &[String], reporter: &dyn Reporter) -> GlobSet {
    let mut patterns: Vec<&str> = filters
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if patterns.is_empty() {
        patterns.push("*.*");
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match GlobBuilder::new(pattern).case_insensitive(true).build() {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(err) => {
                reporter.log(&format!("warning: ignoring invalid filter '{pattern}': {err}"));
            }
        }
    }

    builder.build().unwrap_or_else(|err| {
        reporter.log(&format!("warning: filter set unusable: {err}"));
        GlobSet::empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NullReporter;
    use crate::report::testing::RecordingReporter;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    fn names(files: &[PathBuf]) -> BTreeSet<String> {
        files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn single_missing_file_yields_empty_list() {
        let reporter = RecordingReporter::default();
        let selection = FileSelection::Single(PathBuf::from("/no/such/file.txt"));
        assert!(discover(&selection, &reporter).is_empty());
        assert!(reporter.logged("not a file"));
    }

    #[test]
    fn multiple_skips_missing_and_preserves_order() {
        let temp = tempdir().expect("temp dir");
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        std::fs::write(&a, "a").expect("write");
        std::fs::write(&b, "b").expect("write");

        let raw = format!("{}, {}, {}", b.display(), temp.path().join("gone.txt").display(), a.display());
        let reporter = RecordingReporter::default();
        let files = discover(&FileSelection::Multiple(raw), &reporter);

        assert_eq!(files, vec![b, a]);
        assert!(reporter.logged("skipping missing file"));
    }

    #[test]
    fn directory_filter_is_case_insensitive_on_base_name() {
        let temp = tempdir().expect("temp dir");
        std::fs::write(temp.path().join("a.txt"), "").expect("write");
        std::fs::write(temp.path().join("b.TXT"), "").expect("write");
        std::fs::write(temp.path().join("c.md"), "").expect("write");

        let selection = FileSelection::Directory {
            path: temp.path().to_path_buf(),
            recursive: false,
            filters: vec!["*.txt".to_string()],
        };
        let files = discover(&selection, &NullReporter);
        assert_eq!(
            names(&files),
            ["a.txt", "b.TXT"].iter().map(|s| s.to_string()).collect()
        );
    }

    #[test]
    fn any_filter_pattern_may_match() {
        let temp = tempdir().expect("temp dir");
        std::fs::write(temp.path().join("a.txt"), "").expect("write");
        std::fs::write(temp.path().join("c.md"), "").expect("write");
        std::fs::write(temp.path().join("d.rs"), "").expect("write");

        let selection = FileSelection::Directory {
            path: temp.path().to_path_buf(),
            recursive: false,
            filters: vec!["*.md".to_string(), "*.txt".to_string()],
        };
        let files = discover(&selection, &NullReporter);
        assert_eq!(
            names(&files),
            ["a.txt", "c.md"].iter().map(|s| s.to_string()).collect()
        );
    }

    #[test]
    fn recursion_controls_subtree_visibility() {
        let temp = tempdir().expect("temp dir");
        let sub = temp.path().join("sub");
        std::fs::create_dir(&sub).expect("mkdir");
        std::fs::write(temp.path().join("top.txt"), "").expect("write");
        std::fs::write(sub.join("nested.txt"), "").expect("write");

        let flat = FileSelection::Directory {
            path: temp.path().to_path_buf(),
            recursive: false,
            filters: vec!["*.txt".to_string()],
        };
        assert_eq!(
            names(&discover(&flat, &NullReporter)),
            ["top.txt"].iter().map(|s| s.to_string()).collect()
        );

        let deep = FileSelection::Directory {
            path: temp.path().to_path_buf(),
            recursive: true,
            filters: vec!["*.txt".to_string()],
        };
        assert_eq!(
            names(&discover(&deep, &NullReporter)),
            ["top.txt", "nested.txt"]
                .iter()
                .map(|s| s.to_string())
                .collect()
        );
    }

    #[test]
    fn empty_filter_defaults_to_star_dot_star() {
        let temp = tempdir().expect("temp dir");
        std::fs::write(temp.path().join("a.txt"), "").expect("write");
        std::fs::write(temp.path().join("noext"), "").expect("write");

        let selection = FileSelection::Directory {
            path: temp.path().to_path_buf(),
            recursive: false,
            filters: Vec::new(),
        };
        // "*.*" requires a dot in the name, like the fnmatch pattern it
        // mirrors.
        let files = discover(&selection, &NullReporter);
        assert_eq!(
            names(&files),
            ["a.txt"].iter().map(|s| s.to_string()).collect()
        );
    }

    #[test]
    fn invalid_filter_pattern_is_skipped() {
        let temp = tempdir().expect("temp dir");
        std::fs::write(temp.path().join("a.txt"), "").expect("write");

        let reporter = RecordingReporter::default();
        let selection = FileSelection::Directory {
            path: temp.path().to_path_buf(),
            recursive: false,
            filters: vec!["[bad".to_string(), "*.txt".to_string()],
        };
        let files = discover(&selection, &reporter);
        assert_eq!(files.len(), 1);
        assert!(reporter.logged("invalid filter"));
    }
}
