use super::context::AppContext;
use recollect_store::{CurrentState, StateKind};

fn label(kind: StateKind) -> &'static str {
    match kind {
        StateKind::Goal => "Goal",
        StateKind::NextStep => "Next step",
    }
}

pub fn run_add(kind: StateKind, content: &str) -> anyhow::Result<()> {
    let content = content.trim();
    if content.is_empty() {
        anyhow::bail!("{} text is empty", label(kind).to_lowercase());
    }
    let ctx = AppContext::strict()?;
    let mut store = ctx.open_store()?;
    store.add_state(kind, content)?;
    println!("{} added: {}", label(kind), content);
    Ok(())
}

pub fn run_done(kind: StateKind, text: &str) -> anyhow::Result<()> {
    let ctx = AppContext::strict()?;
    let mut store = ctx.open_store()?;
    match store.complete_state(kind, text)? {
        Some(item) => println!("{} done: {}", label(kind), item.content),
        None => println!("No open {} matches \"{}\"", label(kind).to_lowercase(), text),
    }
    Ok(())
}

pub fn run_clear(kind: StateKind) -> anyhow::Result<()> {
    let ctx = AppContext::strict()?;
    let mut store = ctx.open_store()?;
    let removed = store.clear_state(kind)?;
    let noun = match kind {
        StateKind::Goal => "goals",
        StateKind::NextStep => "next steps",
    };
    println!("Cleared {} {}", removed, noun);
    Ok(())
}

pub fn run_list_goals() -> anyhow::Result<()> {
    let ctx = AppContext::lenient()?;
    let store = ctx.open_store()?;
    let goals = store.open_state(StateKind::Goal)?;
    if goals.is_empty() {
        println!("No active goals");
        return Ok(());
    }
    for (i, goal) in goals.iter().enumerate() {
        println!("{:>3}. {}", i + 1, goal.content);
    }
    Ok(())
}

pub fn run_state() -> anyhow::Result<()> {
    let ctx = AppContext::lenient()?;
    let store = ctx.open_store()?;
    print!("{}", format_state(&store.current_state()?));
    Ok(())
}

pub fn format_state(state: &CurrentState) -> String {
    if state.is_empty() {
        return "No goals or next steps\n".to_string();
    }
    let mut out = String::new();
    for (title, items) in [("Goals", &state.goals), ("Next steps", &state.next_steps)] {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("{title}:\n"));
        for item in items {
            out.push_str(&format!("  - {}\n", item.content));
        }
    }
    out
}
