use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::MessagingCapabilities,
    Result,
};

/// Outbound side of the chat platform.
///
/// Adapters map their platform's errors into [`crate::Error::External`].
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;
    async fn reply_to(&self, msg: MessageRef, text: &str) -> Result<MessageRef>;
    async fn delete_message(&self, msg: MessageRef) -> Result<()>;
    async fn set_reaction(&self, msg: MessageRef, emoji: &str) -> Result<()>;
}
