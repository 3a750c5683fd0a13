//! Prompt assembly shared by all agent variants.

use std::fmt::Write;

use crate::types::{AIRequest, ConversationContext};

/// Number of prior turns embedded into each prompt.
pub const HISTORY_TURNS: usize = 3;

/// Appended to every structured prompt, whatever the variant.
pub(crate) const JSON_ONLY: &str =
    "Respond with a single valid JSON object only. Do not wrap it in markdown or add commentary.";

/// Build the provider-ready user prompt.
///
/// Layout: learner profile lines, recent history, the request itself, then the
/// variant's output instructions. Pure: equal inputs give equal output.
pub fn compose(
    request: &AIRequest,
    context: Option<&ConversationContext>,
    instructions: &str,
) -> String {
    let mut prompt = String::new();

    let mut profile = Vec::new();
    if let Some(subject) = request.subject() {
        profile.push(format!("Subject: {}", subject));
    }
    if let Some(level) = request.level() {
        profile.push(format!("Level: {}", level));
    }
    if let Some(language) = request.language() {
        profile.push(format!("Language: {}", language));
    }
    if !profile.is_empty() {
        prompt.push_str(&profile.join("\n"));
        prompt.push_str("\n\n");
    }

    if let Some(context) = context {
        let recent = context.recent(HISTORY_TURNS);
        if !recent.is_empty() {
            prompt.push_str("Recent conversation:\n");
            for turn in recent {
                let _ = writeln!(prompt, "{}: {}", turn.role, turn.content.trim());
            }
            prompt.push('\n');
        }
    }

    let _ = writeln!(prompt, "Request: {}", request.prompt.trim());

    if let Some(language) = request.language() {
        let _ = writeln!(prompt, "Respond in {}.", language);
    }

    if !instructions.is_empty() {
        prompt.push('\n');
        prompt.push_str(instructions);
    }

    prompt
}
