use anyhow::Context;
use recollect_core::{GitContext, NewSession, Session};
use recollect_extract::sentence::truncate_chars;
use recollect_extract::ExtractionStrategy;
use recollect_store::Store;
use recollect_transcript::{classify, read_transcript, NoiseKind, Role, Transcript};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

const MAX_REQUEST_CHARS: usize = 200;
const MAX_REQUESTS: usize = 20;

/// Summarize a transcript as a session record
pub fn build_session(
    transcript: &Transcript,
    strategy: &dyn ExtractionStrategy,
    git: &GitContext,
    reason: Option<&str>,
) -> NewSession {
    let mut files = BTreeSet::new();
    let mut commands = Vec::new();
    let mut entry_counts = BTreeMap::new();
    let mut user_requests = Vec::new();

    for message in &transcript.messages {
        files.extend(message.referenced_files());
        commands.extend(message.commands());
        if let Ok(entries) = strategy.extract(message) {
            for entry in entries {
                *entry_counts.entry(entry.entry_type).or_insert(0) += 1;
            }
        }
        if message.role == Role::User
            && classify(message) == NoiseKind::Signal
            && user_requests.len() < MAX_REQUESTS
        {
            user_requests.push(truncate_chars(message.text().trim(), MAX_REQUEST_CHARS).to_string());
        }
    }

    let summary = transcript
        .summary
        .clone()
        .or_else(|| user_requests.first().cloned());

    NewSession {
        id: Some(session_id(transcript)),
        start_time: transcript.messages.first().map(|m| m.timestamp),
        end_time: transcript.messages.last().map(|m| m.timestamp),
        summary,
        branch: git.branch.clone(),
        reason: reason.map(String::from),
        files: files.into_iter().collect(),
        commands,
        entry_counts,
        user_requests,
    }
}

/// The transcript's own session id, else one derived from its path and first timestamp
fn session_id(transcript: &Transcript) -> String {
    if let Some(id) = transcript.messages.iter().find_map(|m| m.session_id.clone()) {
        return id;
    }
    let path = std::fs::canonicalize(&transcript.path).unwrap_or_else(|_| transcript.path.clone());
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    if let Some(first) = transcript.messages.first() {
        hasher.update(first.timestamp.to_rfc3339().as_bytes());
    }
    let digest = hex::encode(hasher.finalize());
    format!("derived-{}", &digest[..32])
}

/// Record the session held in a transcript; `None` when it has no messages
///
/// A session already recorded under the same id is returned unchanged.
pub fn write_session_summary(
    store: &mut Store,
    transcript_path: &Path,
    strategy: &dyn ExtractionStrategy,
    reason: Option<&str>,
) -> anyhow::Result<Option<Session>> {
    let transcript = read_transcript(transcript_path)?;
    if transcript.is_empty() {
        return Ok(None);
    }

    let session = build_session(&transcript, strategy, &GitContext::detect(), reason);
    if let Some(id) = &session.id {
        if let Some(existing) = store.get_session(id)? {
            if &existing.id == id {
                tracing::debug!(session = %id, "session already recorded");
                return Ok(Some(existing));
            }
        }
    }

    let stored = store
        .add_session(&session)
        .with_context(|| format!("failed to record session from {}", transcript_path.display()))?;
    Ok(Some(stored))
}
