use std::collections::HashMap;

use tracing::{info, warn};

use crate::domain::conversation::Conversation;
use crate::domain::draft::MessageRef;
use crate::error::AppResult;
use crate::services::ChatService;

/// Threads longer than this are cut off silently.
pub const THREAD_MESSAGE_LIMIT: usize = 50;
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Reads the thread anchored at `origin` into a transcript plus every file
/// shared anywhere in it.
pub async fn extract_conversation(
    chat: &dyn ChatService,
    origin: &MessageRef,
) -> AppResult<Conversation> {
    let messages = chat
        .thread_replies(&origin.channel, &origin.ts, THREAD_MESSAGE_LIMIT)
        .await?;

    let mut authors: HashMap<String, String> = HashMap::new();
    let mut lines = Vec::with_capacity(messages.len());
    let mut attachments = Vec::new();

    for message in messages {
        let author = match &message.user_id {
            Some(user) => match authors.get(user) {
                Some(name) => name.clone(),
                None => {
                    let name = match chat.user_display_name(user).await {
                        Ok(name) => name,
                        Err(err) => {
                            warn!(user = %user, error = %err, "author lookup failed");
                            UNKNOWN_AUTHOR.to_string()
                        }
                    };
                    authors.insert(user.clone(), name.clone());
                    name
                }
            },
            None => UNKNOWN_AUTHOR.to_string(),
        };
        lines.push(format!("@{author}: {}", message.text));
        attachments.extend(message.files);
    }

    let transcript = lines.join("\n");
    info!(
        channel = %origin.channel,
        messages = lines.len(),
        files = attachments.len(),
        chars = transcript.len(),
        "extracted conversation"
    );
    Ok(Conversation {
        transcript,
        attachments,
    })
}
