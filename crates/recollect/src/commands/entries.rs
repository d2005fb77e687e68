use super::context::AppContext;
use super::search::short_id;
use anyhow::Context;
use recollect_core::{Entry, EntryType};
use recollect_store::{EntryUpdate, Store};

fn resolve(store: &Store, id: &str) -> anyhow::Result<Entry> {
    store
        .find_entry(id)?
        .with_context(|| format!("no entry matches {id}"))
}

pub fn run_show(id: &str) -> anyhow::Result<()> {
    let ctx = AppContext::lenient()?;
    let store = ctx.open_store()?;
    let entry = resolve(&store, id)?;

    println!("{} [{}]", entry.id, entry.entry_type);
    println!("{}", entry.timestamp.to_rfc3339());
    if let Some(branch) = &entry.branch {
        println!("branch: {} {}", branch, entry.commit_hash.as_deref().unwrap_or(""));
    }
    println!("\n{}", entry.content);
    if let Some(reasoning) = &entry.reasoning {
        println!("\nwhy: {}", reasoning);
    }
    if !entry.tags.is_empty() {
        println!("tags: {}", entry.tags.join(", "));
    }
    if !entry.files.is_empty() {
        println!("files: {}", entry.files.join(", "));
    }
    Ok(())
}

pub fn run_edit(
    id: &str,
    content: Option<String>,
    reasoning: Option<String>,
    entry_type: Option<&str>,
    tags: Option<Vec<String>>,
) -> anyhow::Result<()> {
    let update = EntryUpdate {
        content,
        reasoning: reasoning.map(|r| if r.trim().is_empty() { None } else { Some(r) }),
        entry_type: entry_type.map(str::parse::<EntryType>).transpose()?,
        tags,
    };
    if update == EntryUpdate::default() {
        anyhow::bail!("nothing to change; pass --content, --reasoning, --type or --tags");
    }

    let ctx = AppContext::strict()?;
    let mut store = ctx.open_store()?;
    let entry = resolve(&store, id)?;
    let updated = store.update_entry(&entry.id, &update)?;
    println!("Updated {} [{}]", short_id(&updated), updated.entry_type);
    Ok(())
}

pub fn run_delete(id: &str) -> anyhow::Result<()> {
    let ctx = AppContext::strict()?;
    let mut store = ctx.open_store()?;
    let entry = resolve(&store, id)?;
    store.delete_entry(&entry.id)?;
    println!("Deleted {} [{}]", short_id(&entry), entry.entry_type);
    Ok(())
}
