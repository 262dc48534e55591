use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use mention_patcher::{PatchError, PatchPlan, Patcher, SNIPPET_PATH, TARGET_PATH};
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mention-patcher")]
#[command(
    about = "Replace showMentionSuggestions (app.js lines 1984-2029) with snippet.js",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// File to patch in place
    #[arg(short, long, default_value = TARGET_PATH)]
    target: PathBuf,

    /// File whose contents replace the range
    #[arg(short, long, default_value = SNIPPET_PATH)]
    snippet: PathBuf,

    /// Dry run - check the marker and report without modifying files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes
    #[arg(short, long)]
    diff: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let patcher = Patcher::default()
        .with_target(cli.target)
        .with_snippet(cli.snippet);

    let plan = patcher.plan()?;

    let boundary = plan.boundary();
    println!("Original line {}: {}", boundary.first_line, boundary.first.trim());
    println!("Original line {}: {}", boundary.last_line, boundary.last.trim());

    match plan.verify() {
        Ok(()) => {}
        Err(e @ (PatchError::PreconditionFailed { .. } | PatchError::AlreadyApplied { .. })) => {
            println!("{}", format!("WARNING: {e}. Aborting safe patch.").yellow());
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    }

    if cli.diff {
        display_diff(&plan)?;
    }

    if cli.dry_run {
        println!(
            "{}",
            format!(
                "[DRY RUN] Would replace lines {}-{} of {}",
                boundary.first_line,
                boundary.last_line,
                plan.target_path().display()
            )
            .cyan()
        );
        return Ok(());
    }

    let report = plan.commit()?;
    println!(
        "{}",
        format!("Successfully patched {}", file_name(&report.file)).green()
    );
    tracing::debug!(
        lines_before = report.lines_before,
        lines_after = report.lines_after,
        "line counts"
    );

    Ok(())
}

/// Log to stderr so stdout only carries the patch report.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("MENTION_PATCHER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Helper: Show unified diff between original and patched content
fn display_diff(plan: &PatchPlan) -> Result<()> {
    let file = plan.target_path();
    let original = plan.original().join();
    let modified = plan.spliced()?.join();

    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(&original, &modified);

    for group in diff.grouped_ops(3) {
        for op in group {
            for change in diff.iter_changes(&op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => format!("-{}", change).red(),
                    ChangeTag::Insert => format!("+{}", change).green(),
                    ChangeTag::Equal => format!(" {}", change).normal(),
                };
                print!("{}", sign);
                if change.missing_newline() {
                    println!();
                }
            }
        }
    }
    println!();

    Ok(())
}
