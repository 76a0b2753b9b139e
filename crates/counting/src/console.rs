//! Console adapter: the "chat" is stdout.
//!
//! Implements the `counting-core` MessagingPort by printing one line per
//! reply, reaction or deletion.

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};

use counting_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{port::MessagingPort, types::MessagingCapabilities},
    Result,
};

pub struct ConsoleMessenger<W> {
    out: Mutex<W>,
    next_id: AtomicI32,
}

impl<W: AsyncWrite + Unpin + Send> ConsoleMessenger<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            // Ids above this are bot messages; input lines count up from 1.
            next_id: AtomicI32::new(1_000_000),
        }
    }

    pub async fn write_line(&self, line: &str) -> Result<()> {
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
        Ok(())
    }

    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        MessageRef {
            chat_id,
            message_id: MessageId(self.next_id.fetch_add(1, Ordering::Relaxed)),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> MessagingPort for ConsoleMessenger<W> {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            supports_reactions: true,
            supports_delete: true,
            max_message_len: usize::MAX,
        }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        self.write_line(text).await?;
        Ok(self.alloc(chat_id))
    }

    async fn reply_to(&self, msg: MessageRef, text: &str) -> Result<MessageRef> {
        if text.contains('\n') {
            return Err(Error::External(
                "console replies are single-line".to_string(),
            ));
        }
        self.write_line(&format!("> #{}: {text}", msg.message_id.0))
            .await?;
        Ok(self.alloc(msg.chat_id))
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.write_line(&format!("x #{} deleted", msg.message_id.0))
            .await
    }

    async fn set_reaction(&self, msg: MessageRef, emoji: &str) -> Result<()> {
        self.write_line(&format!("+ #{} {emoji}", msg.message_id.0))
            .await
    }
}
