use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use indicatif::ProgressBar;

mod batch;
mod discover;
mod encoding;
mod engine;
mod error;
mod progress;
mod report;
mod rules;
mod session;
mod writer;

use discover::FileSelection;
use encoding::{EncodingConfig, ReadEncoding};
use report::{BatchReport, NullReporter, Reporter};
use rules::ReplaceRule;
use session::ReplaceSession;

const PROGRESS_TICKS: u64 = 100;

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq, Default)]
enum SelectionMode {
    #[default]
    Single,
    Multiple,
    Directory,
}

#[derive(Parser, Debug)]
#[command(
    name = "resub",
    about = "Batch find/replace across files with encoding negotiation"
)]
struct Cli {
    /// File path, comma-separated file list, or directory depending on --mode
    path: String,

    #[arg(long, value_enum, default_value_t = SelectionMode::Single)]
    mode: SelectionMode,

    /// Recurse into subdirectories (directory mode)
    #[arg(short, long)]
    recursive: bool,

    /// Comma-separated glob filters for directory mode
    #[arg(short, long, default_value = "*.*")]
    filter: String,

    /// JSON rule file: ordered array of {alias, find, replace, regex}
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Inline rule: text (or pattern with --regex) to find
    #[arg(long)]
    find: Option<String>,

    /// Replacement text for --find
    #[arg(long, requires = "find")]
    replace: Option<String>,

    /// Treat --find as a regular expression
    #[arg(long, requires = "find")]
    regex: bool,

    /// Alias for the inline rule
    #[arg(long, default_value = "inline")]
    alias: String,

    /// Read encoding: a name, "auto-detect", or "try-all"
    #[arg(long, default_value = "try-all")]
    read_encoding: String,

    /// Write encoding name
    #[arg(long, default_value = "utf-8")]
    write_encoding: String,

    /// Save the assembled rule list to this file before running
    #[arg(long)]
    save_rules: Option<PathBuf>,

    /// Suppress logs and the progress bar
    #[arg(short, long)]
    quiet: bool,
}

struct ConsoleReporter {
    bar: ProgressBar,
}

impl Reporter for ConsoleReporter {
    fn log(&self, message: &str) {
        self.bar.println(message);
    }

    fn progress(&self, fraction: f64) {
        self.bar
            .set_position((fraction * PROGRESS_TICKS as f64).round() as u64);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let failed = run(cli)?;
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<usize> {
    let rules = assemble_rules(&cli)?;
    if let Some(path) = &cli.save_rules {
        rules::save_rules(path, &rules)
            .with_context(|| format!("saving rules to {}", path.display()))?;
        println!("saved {} rule(s) to {}", rules.len(), path.display());
    }

    let write_label = cli.write_encoding.trim().to_ascii_lowercase();
    encoding::validate_write_label(&write_label)?;
    let config = EncodingConfig {
        read: ReadEncoding::parse(&cli.read_encoding)?,
        write: write_label,
    };

    let mut session = ReplaceSession::new().context("creating staging area")?;
    session.set_rules(rules);
    session.set_encoding_config(config);
    session.set_file_selection(build_selection(&cli));
    if !cli.quiet {
        println!("staging directory: {}", session.staging_dir().display());
    }

    let report = if cli.quiet {
        let reporter = NullReporter;
        let report = session.run_batch(&reporter);
        session.close(&reporter);
        report
    } else {
        let reporter = ConsoleReporter {
            bar: progress::create_batch_bar(PROGRESS_TICKS),
        };
        let report = session.run_batch(&reporter);
        reporter.bar.finish_and_clear();
        session.close(&reporter);
        report
    };

    print_report(&report);
    Ok(report.failed_count)
}

fn print_report(report: &BatchReport) {
    println!("{}", report.summary());
    for (path, message) in &report.failures {
        println!("failed: {}: {message}", path.display());
    }
}

fn assemble_rules(cli: &Cli) -> Result<Vec<ReplaceRule>> {
    let mut rules = Vec::new();
    if let Some(path) = &cli.rules {
        let loaded = rules::load_rules(path)
            .with_context(|| format!("loading rules from {}", path.display()))?;
        rules.extend(loaded);
    }
    if let Some(find) = &cli.find {
        rules.push(ReplaceRule {
            alias: cli.alias.clone(),
            find: find.clone(),
            replace: cli.replace.clone().unwrap_or_default(),
            use_regex: cli.regex,
        });
    }
    if rules.is_empty() {
        bail!("no rules given; use --rules or --find/--replace");
    }
    rules::validate_rules(&rules)?;
    Ok(rules)
}

fn build_selection(cli: &Cli) -> FileSelection {
    match cli.mode {
        SelectionMode::Single => FileSelection::Single(PathBuf::from(cli.path.trim())),
        SelectionMode::Multiple => FileSelection::Multiple(cli.path.clone()),
        SelectionMode::Directory => FileSelection::Directory {
            path: PathBuf::from(cli.path.trim()),
            recursive: cli.recursive,
            filters: cli
                .filter
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        },
    }
}
