use super::context::AppContext;
use serde::Deserialize;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Fields of the session-end hook payload this tool reads
#[derive(Debug, Default, Deserialize)]
struct SessionEndInput {
    #[serde(default)]
    transcript_path: Option<PathBuf>,
    #[serde(default)]
    reason: Option<String>,
}

fn parse_session_end(raw: &str) -> SessionEndInput {
    if raw.trim().is_empty() {
        return SessionEndInput::default();
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable hook payload");
        SessionEndInput::default()
    })
}

/// Spawn a detached `import --execute` and return at once
pub fn hook_session_start() -> anyhow::Result<()> {
    let ctx = match AppContext::lenient() {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::warn!(error = %e, "session start: workspace unavailable");
            return Ok(());
        }
    };
    if !ctx.settings.auto_import {
        tracing::debug!("auto import disabled");
        return Ok(());
    }

    let spawned = std::env::current_exe().and_then(|exe| {
        Command::new(exe)
            .args(["import", "--execute"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
    });
    match spawned {
        Ok(child) => tracing::debug!(pid = child.id(), "background import started"),
        Err(e) => tracing::warn!(error = %e, "could not start background import"),
    }
    Ok(())
}

/// Record the finished session; failures are logged, never returned
pub fn hook_session_end() -> anyhow::Result<()> {
    let mut raw = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut raw) {
        tracing::warn!(error = %e, "session end: could not read stdin");
        return Ok(());
    }
    if let Err(e) = record_session(&parse_session_end(&raw)) {
        tracing::warn!(error = %format!("{e:#}"), "session end: summary not recorded");
    }
    Ok(())
}

fn record_session(input: &SessionEndInput) -> anyhow::Result<()> {
    let Some(path) = &input.transcript_path else {
        tracing::debug!("session end without transcript path");
        return Ok(());
    };
    let ctx = AppContext::lenient()?;
    let mut store = ctx.open_store()?;
    let recorded = recollect_import::write_session_summary(
        &mut store,
        path,
        &ctx.strategy(),
        input.reason.as_deref(),
    )?;
    if let Some(session) = recorded {
        tracing::info!(session = %session.id, "session recorded");
    }
    Ok(())
}
