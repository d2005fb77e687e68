use super::context::AppContext;

pub fn run(limit: usize) -> anyhow::Result<()> {
    let ctx = AppContext::lenient()?;
    let store = ctx.open_store()?;
    let sessions = store.list_sessions(limit)?;
    if sessions.is_empty() {
        println!("No sessions recorded");
        return Ok(());
    }

    for (i, session) in sessions.iter().enumerate() {
        let counts: Vec<String> = session
            .entry_counts
            .iter()
            .map(|(t, n)| format!("{t}:{n}"))
            .collect();
        println!(
            "{:>3}. {} {} ({} min) {}",
            i + 1,
            session.start_time.format("%Y-%m-%d %H:%M"),
            session.branch.as_deref().unwrap_or("-"),
            session.duration_minutes,
            counts.join(" ")
        );
        if let Some(summary) = &session.summary {
            println!("     {}", summary);
        }
    }
    Ok(())
}
