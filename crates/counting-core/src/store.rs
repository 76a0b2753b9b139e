//! Where per-chat counts live between messages.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{domain::ChatId, sequence::CountState, Result};

/// Persistence port for [`CountState`].
///
/// A chat that was never saved loads as `CountState::default()`.
#[async_trait]
pub trait CountStore: Send + Sync {
    async fn load(&self, chat_id: ChatId) -> Result<CountState>;
    async fn save(&self, chat_id: ChatId, state: CountState) -> Result<()>;
}

/// Process-local store; counts are lost on restart.
#[derive(Default)]
pub struct InMemoryCountStore {
    inner: RwLock<HashMap<ChatId, CountState>>,
}

impl InMemoryCountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CountStore for InMemoryCountStore {
    async fn load(&self, chat_id: ChatId) -> Result<CountState> {
        Ok(self
            .inner
            .read()
            .await
            .get(&chat_id)
            .copied()
            .unwrap_or_default())
    }

    async fn save(&self, chat_id: ChatId, state: CountState) -> Result<()> {
        self.inner.write().await.insert(chat_id, state);
        Ok(())
    }
}
