use super::context::AppContext;

pub fn run() -> anyhow::Result<()> {
    let ctx = AppContext::lenient()?;
    let store = ctx.open_store()?;
    let counts = store.counts()?;
    let imports = recollect_import::import_status(&store)?;

    let by_type: serde_json::Map<String, serde_json::Value> = counts
        .by_type
        .iter()
        .map(|(t, n)| (t.to_string(), serde_json::json!(n)))
        .collect();
    let files: Vec<serde_json::Value> = imports
        .iter()
        .map(|r| {
            serde_json::json!({
                "path": r.path,
                "messages": r.messages_imported,
                "entries": r.entries_created,
                "last_message": r.last_message_timestamp.map(|t| t.to_rfc3339()),
                "imported_at": r.import_timestamp.to_rfc3339(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "database": ctx.database_path().display().to_string(),
        "schema_version": store.schema_version()?,
        "entries": counts.entries,
        "indexed": counts.indexed,
        "by_type": by_type,
        "sessions": counts.sessions,
        "raw_messages": counts.raw_messages,
        "imports": files,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if counts.indexed != counts.entries {
        tracing::warn!(
            entries = counts.entries,
            indexed = counts.indexed,
            "search index out of sync with entries"
        );
    }
    Ok(())
}
