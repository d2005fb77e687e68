use super::context::AppContext;
use recollect_core::{Entry, EntryType};
use recollect_rank::Ranked;

pub fn run_search(query: &str, entry_type: Option<&str>, limit: usize) -> anyhow::Result<()> {
    let entry_type = entry_type.map(str::parse::<EntryType>).transpose()?;
    let ctx = AppContext::lenient()?;
    let store = ctx.open_store()?;

    let results = recollect_rank::search(&store, query, entry_type, limit)?;
    if results.is_empty() {
        println!("No entries match \"{}\"", query);
        return Ok(());
    }
    for ranked in &results {
        print!("{}", format_ranked(ranked));
    }
    Ok(())
}

pub fn run_why(query: &str, limit: usize) -> anyhow::Result<()> {
    let ctx = AppContext::lenient()?;
    let store = ctx.open_store()?;

    let results = recollect_rank::why(&store, query, limit)?;
    if results.is_empty() {
        println!("Nothing recorded about \"{}\"", query);
        return Ok(());
    }
    for ranked in &results {
        print!("{}", format_ranked(ranked));
    }
    Ok(())
}

pub fn short_id(entry: &Entry) -> &str {
    entry.id.get(..8).unwrap_or(&entry.id)
}

fn format_ranked(ranked: &Ranked) -> String {
    let entry = &ranked.entry;
    let mut out = format!(
        "[{}] {} {} ({:.2})\n  {}\n",
        entry.entry_type,
        short_id(entry),
        entry.timestamp.format("%Y-%m-%d"),
        ranked.score.total(),
        entry.content
    );
    if let Some(reasoning) = &entry.reasoning {
        out.push_str(&format!("  why: {}\n", reasoning));
    }
    if !entry.files.is_empty() {
        out.push_str(&format!("  files: {}\n", entry.files.join(", ")));
    }
    out
}
