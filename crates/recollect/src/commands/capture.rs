use super::context::AppContext;
use super::search::short_id;
use recollect_core::EntryType;
use recollect_import::{capture, Captured, ManualEntry};

pub fn run(
    entry_type: EntryType,
    content: &str,
    reasoning: Option<String>,
    tags: Vec<String>,
    files: Vec<String>,
) -> anyhow::Result<()> {
    let ctx = AppContext::strict()?;
    let mut store = ctx.open_store()?;
    let manual = ManualEntry {
        reasoning,
        tags,
        files,
        ..ManualEntry::new(entry_type, content)
    };

    match capture(&mut store, manual)? {
        Captured::Created(entry) => {
            println!("Recorded {} [{}]: {}", short_id(&entry), entry.entry_type, entry.content);
            if let Some(reasoning) = &entry.reasoning {
                println!("  why: {}", reasoning);
            }
        }
        Captured::Duplicate => println!("Already recorded: {}", content.trim()),
    }
    Ok(())
}
