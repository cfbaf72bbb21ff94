//! Prompt construction
//!
//! Deduplication is purely instructive: recent posts are listed in the user
//! message together with an instruction to write something different.

use crate::types::{ChatMessage, HistoryItem};

/// Hard ceiling stated to the model
pub const MAX_POST_CHARS: usize = 280;

pub const SYSTEM_PROMPT: &str = "You write posts for an account followed by software engineers, developers and game developers.

Every post should:
- Be engaging and invite replies
- Blend humor with technical insight
- Stay under 280 characters
- Alternate between funny and serious or thoughtful
- Cover topics such as coding, debugging, developer life, tech trends, game development, programming languages, DevOps, architecture and engineering practice

Humorous posts: observations, text-only memes, the everyday struggles developers recognize.
Serious posts: technical insight, career advice, industry trends, practices worth adopting.

Write exactly ONE post. Do not wrap it in quotes. Reply with the post text only.

The account's recent posts may be listed in the request. When they are, your post MUST differ from all of them in topic, style or angle. Do not reuse their jokes, themes or observations.";

pub const BASE_REQUEST: &str =
    "Write an engaging post for developers. Make it either humorous OR serious and insightful.";

pub const HISTORY_HEADER: &str = "My recent posts (DO NOT repeat similar content):";

pub const DIVERGENCE_INSTRUCTION: &str =
    "Write something COMPLETELY DIFFERENT from every post above.";

/// User instruction: the base request, plus numbered exclusions when there is history
pub fn build_user_prompt(history: &[HistoryItem]) -> String {
    let mut prompt = BASE_REQUEST.to_string();

    if history.is_empty() {
        return prompt;
    }

    prompt.push_str("\n\n");
    prompt.push_str(HISTORY_HEADER);
    prompt.push('\n');
    for (i, item) in history.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, item.text));
    }
    prompt.push('\n');
    prompt.push_str(DIVERGENCE_INSTRUCTION);

    prompt
}

/// System message followed by the user instruction
pub fn build_messages(history: &[HistoryItem]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_user_prompt(history)),
    ]
}
