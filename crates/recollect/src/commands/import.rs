use super::context::AppContext;
use recollect_core::ExtractedEntry;
use recollect_import::{import, AcceptAll, Approver, ImportOptions, ImportSummary};
use recollect_transcript::discover_transcripts;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Asks on the terminal before each file is committed
struct PromptApprover;

impl Approver for PromptApprover {
    fn approve(&mut self, transcript: &Path, entries: &[ExtractedEntry]) -> bool {
        if entries.is_empty() {
            return true;
        }
        println!("\n{} ({} new entries)", transcript.display(), entries.len());
        for entry in entries {
            println!("  [{}] {:.2} {}", entry.entry_type, entry.confidence, entry.content);
            if let Some(reasoning) = &entry.reasoning {
                println!("        because {}", reasoning);
            }
        }
        print!("Import these? [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

fn resolve_paths(ctx: &AppContext, path: Option<&str>) -> anyhow::Result<Vec<PathBuf>> {
    let target = match path {
        Some(p) => PathBuf::from(p),
        None => ctx.transcripts_dir()?,
    };
    if target.is_dir() {
        Ok(discover_transcripts(&target)?)
    } else if target.exists() {
        Ok(vec![target])
    } else if path.is_some() {
        anyhow::bail!("no such transcript: {}", target.display())
    } else {
        Ok(Vec::new())
    }
}

pub fn run(path: Option<&str>, execute: bool, interactive: bool) -> anyhow::Result<()> {
    let ctx = AppContext::strict()?;
    let paths = resolve_paths(&ctx, path)?;
    if paths.is_empty() {
        println!("No transcripts found");
        return Ok(());
    }

    let options = ImportOptions {
        execute,
        interactive,
        min_confidence: ctx.settings.min_confidence,
    };
    let mut store = ctx.open_store()?;
    let strategy = ctx.strategy();
    let summary = if interactive {
        import(&mut store, &paths, &strategy, &options, &mut PromptApprover)
    } else {
        import(&mut store, &paths, &strategy, &options, &mut AcceptAll)
    };

    print_summary(&summary, execute);
    Ok(())
}

fn print_summary(summary: &ImportSummary, execute: bool) {
    let verb = if execute { "Imported" } else { "Would import" };
    println!(
        "{} {} entries from {} messages in {} files",
        verb, summary.entries_created, summary.messages_scanned, summary.files_scanned
    );
    println!(
        "  duplicates: {}  below confidence: {}  unchanged files: {}",
        summary.duplicates_skipped, summary.below_confidence, summary.files_unchanged
    );
    if summary.malformed_lines > 0 {
        println!("  malformed lines skipped: {}", summary.malformed_lines);
    }
    if summary.files_declined > 0 {
        println!("  files declined: {}", summary.files_declined);
    }
    if summary.files_failed > 0 {
        println!("  files failed (rolled back): {}", summary.files_failed);
    }
    if !execute {
        println!("Preview only; run with --execute to write");
    }
}
