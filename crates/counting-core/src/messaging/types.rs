use crate::domain::{MessageRef, UserId};

/// Inbound text message, already stripped of platform specifics.
#[derive(Clone, Debug)]
pub struct TextMessage {
    pub msg: MessageRef,
    pub user_id: UserId,
    pub text: String,
}

/// Capabilities / feature flags of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub supports_reactions: bool,
    pub supports_delete: bool,
    pub max_message_len: usize,
}
