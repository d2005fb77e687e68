use super::{Candidate, MatchContext};
use crate::scoring::Signal;
use crate::sentence::truncate_chars;
use recollect_core::EntryType;
use recollect_transcript::ContentBlock;

const MAX_ERROR_CHARS: usize = 200;

/// Failed tool results; fires regardless of visible text
pub(super) fn extract(ctx: &MatchContext<'_>) -> Vec<Candidate> {
    ctx.message
        .failed_tool_results()
        .filter_map(|block| match block {
            ContentBlock::ToolResult {
                tool_name,
                tool_input,
                content,
                ..
            } => Some((tool_name.as_deref(), tool_input.as_ref(), content.trim())),
            _ => None,
        })
        .map(|(name, input, content)| {
            let text = match (content.is_empty(), name) {
                (true, Some(name)) => format!("Tool {} failed with no output", name),
                (true, None) => "Tool call failed with no output".to_string(),
                (false, Some(name)) => format!(
                    "Tool error in {}: {}",
                    name,
                    truncate_chars(content, MAX_ERROR_CHARS)
                ),
                (false, None) => format!("Tool error: {}", truncate_chars(content, MAX_ERROR_CHARS)),
            };
            let reasoning = input.and_then(|input| {
                if let Some(cmd) = input.get("command").and_then(|c| c.as_str()) {
                    Some(format!("while running `{}`", truncate_chars(cmd, MAX_ERROR_CHARS)))
                } else {
                    input
                        .get("file_path")
                        .and_then(|p| p.as_str())
                        .map(|p| format!("on {}", p))
                }
            });
            Candidate::new(EntryType::Gotcha, text, Signal::Structured).with_reasoning(reasoning)
        })
        .collect()
}
