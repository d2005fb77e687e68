use super::context::AppContext;
use super::goals::format_state;
use super::search::short_id;
use recollect_core::{Entry, EntryType};
use recollect_store::{CurrentState, EntryFilter};

const CONTEXT_ENTRIES: usize = 20;

pub fn run_read(
    entry_type: Option<&str>,
    tag: Option<String>,
    limit: usize,
    full: bool,
) -> anyhow::Result<()> {
    let filter = EntryFilter {
        entry_type: entry_type.map(str::parse::<EntryType>).transpose()?,
        tag,
        limit: Some(limit),
        ..EntryFilter::default()
    };
    let ctx = AppContext::lenient()?;
    let store = ctx.open_store()?;
    print_entries(&store.list_entries(&filter)?, full);
    Ok(())
}

pub fn run_recent(limit: usize) -> anyhow::Result<()> {
    let ctx = AppContext::lenient()?;
    let store = ctx.open_store()?;
    let filter = EntryFilter {
        limit: Some(limit),
        ..EntryFilter::default()
    };
    print_entries(&store.list_entries(&filter)?, false);
    Ok(())
}

/// What to know before starting work: recent entries plus open goals and steps
pub fn run_context(days: u32) -> anyhow::Result<()> {
    let ctx = AppContext::lenient()?;
    let store = ctx.open_store()?;
    let entries = store.list_entries(&EntryFilter::recent(days, CONTEXT_ENTRIES))?;
    let state = store.current_state()?;
    print!("{}", format_context(&entries, &state, days));
    Ok(())
}

fn print_entries(entries: &[Entry], full: bool) {
    if entries.is_empty() {
        println!("No entries");
        return;
    }
    for entry in entries {
        print!("{}", format_entry(entry, full));
    }
}

fn format_entry(entry: &Entry, full: bool) -> String {
    let mut out = format!(
        "[{}] {} {}\n  {}\n",
        entry.entry_type,
        short_id(entry),
        entry.timestamp.format("%Y-%m-%d"),
        entry.content
    );
    if let Some(reasoning) = &entry.reasoning {
        out.push_str(&format!("  why: {}\n", reasoning));
    }
    if full {
        if !entry.tags.is_empty() {
            out.push_str(&format!("  tags: {}\n", entry.tags.join(", ")));
        }
        if !entry.files.is_empty() {
            out.push_str(&format!("  files: {}\n", entry.files.join(", ")));
        }
        if let Some(branch) = &entry.branch {
            out.push_str(&format!("  branch: {}\n", branch));
        }
    }
    out
}

fn format_context(entries: &[Entry], state: &CurrentState, days: u32) -> String {
    let mut out = String::new();
    if !state.is_empty() {
        out.push_str(&format_state(state));
        out.push('\n');
    }

    if entries.is_empty() {
        out.push_str(&format!("Nothing recorded in the last {days} days\n"));
        return out;
    }
    // constraints and decisions first, then everything else in time order
    for entry_type in [EntryType::Gotcha, EntryType::Decision, EntryType::Preference] {
        let group: Vec<&Entry> = entries.iter().filter(|e| e.entry_type == entry_type).collect();
        if group.is_empty() {
            continue;
        }
        out.push_str(&format!("{}s:\n", capitalize(entry_type.as_str())));
        for entry in group {
            out.push_str(&format!("  - {}\n", entry.content));
        }
    }
    let rest: Vec<&Entry> = entries
        .iter()
        .filter(|e| {
            !matches!(
                e.entry_type,
                EntryType::Gotcha | EntryType::Decision | EntryType::Preference
            )
        })
        .collect();
    if !rest.is_empty() {
        out.push_str("Recent:\n");
        for entry in rest {
            out.push_str(&format!("  - [{}] {}\n", entry.entry_type, entry.content));
        }
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
