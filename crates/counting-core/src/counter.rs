//! The counting service: one inbound message in, state saved, chat updated.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::{
    config::{Config, UnparseablePolicy},
    domain::{ChatId, MessageRef},
    engine,
    messaging::{port::MessagingPort, types::TextMessage},
    policy::{self, Action},
    sequence::{CountState, Outcome},
    store::CountStore,
    Result,
};

/// Idle chat locks are dropped once the map reaches this size.
const PRUNE_LOCKS_AT: usize = 1024;

/// One lock per chat so each conversation's count is updated by one message
/// at a time.
#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<ChatId, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: ChatId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            if map.len() >= PRUNE_LOCKS_AT {
                // Only the map holds an idle lock; holders and waiters keep a clone.
                map.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

pub struct Counter {
    cfg: Arc<Config>,
    messenger: Arc<dyn MessagingPort>,
    store: Arc<dyn CountStore>,
    chat_locks: ChatLocks,
}

impl Counter {
    pub fn new(
        cfg: Arc<Config>,
        messenger: Arc<dyn MessagingPort>,
        store: Arc<dyn CountStore>,
    ) -> Self {
        Self {
            cfg,
            messenger,
            store,
            chat_locks: ChatLocks::default(),
        }
    }

    /// Current state of a chat.
    pub async fn current(&self, chat_id: ChatId) -> Result<CountState> {
        self.store.load(chat_id).await
    }

    /// Feed one text message to its chat's count.
    ///
    /// Errors are store failures only; messaging failures are logged and the
    /// new count is kept.
    pub async fn handle_text(&self, msg: &TextMessage) -> Result<Outcome> {
        let chat_id = msg.msg.chat_id;
        let _guard = self.chat_locks.lock_chat(chat_id).await;

        let mut state = self.store.load(chat_id).await?;
        let before = state;
        let outcome = engine::judge(msg.text.trim(), &mut state);

        if let Outcome::Reject { reason } = outcome {
            if self.cfg.unparseable == UnparseablePolicy::Reset {
                state.reset();
            }
            info!(
                chat = chat_id.0,
                user = msg.user_id.0,
                ?reason,
                count = state.count,
                "not a number"
            );
        } else {
            info!(chat = chat_id.0, user = msg.user_id.0, ?outcome, "counted");
        }

        if state != before {
            self.store.save(chat_id, state).await?;
        }

        for action in policy::actions(&self.cfg, &outcome) {
            if let Err(e) = self.perform(msg.msg, &action).await {
                warn!(chat = chat_id.0, ?action, "messaging failed: {e}");
            }
        }

        Ok(outcome)
    }

    async fn perform(&self, msg: MessageRef, action: &Action) -> Result<()> {
        let caps = self.messenger.capabilities();
        match action {
            Action::Reply(text) => {
                let text = truncate_chars(text, caps.max_message_len);
                self.messenger.reply_to(msg, &text).await?;
            }
            Action::Post(text) => {
                let text = truncate_chars(text, caps.max_message_len);
                self.messenger.send_text(msg.chat_id, &text).await?;
            }
            Action::React(emoji) if caps.supports_reactions => {
                self.messenger.set_reaction(msg, emoji).await?;
            }
            Action::Delete if caps.supports_delete => {
                self.messenger.delete_message(msg).await?;
            }
            Action::React(_) | Action::Delete => {}
        }
        Ok(())
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageId, UserId};
    use crate::errors::Error;
    use crate::messaging::types::MessagingCapabilities;
    use crate::sequence::RejectReason;
    use crate::store::InMemoryCountStore;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct FakeMessenger {
        replies: StdMutex<Vec<(MessageRef, String)>>,
        posts: StdMutex<Vec<(ChatId, String)>>,
        reactions: StdMutex<Vec<(MessageRef, String)>>,
        deletes: StdMutex<Vec<MessageRef>>,
        fail: bool,
    }

    impl FakeMessenger {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn reply_texts(&self) -> Vec<String> {
            self.replies
                .lock()
                .unwrap()
                .iter()
                .map(|(_, t)| t.clone())
                .collect()
        }

        fn post_texts(&self) -> Vec<String> {
            self.posts
                .lock()
                .unwrap()
                .iter()
                .map(|(_, t)| t.clone())
                .collect()
        }
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        fn capabilities(&self) -> MessagingCapabilities {
            MessagingCapabilities {
                supports_reactions: true,
                supports_delete: true,
                max_message_len: 4096,
            }
        }

        async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
            if self.fail {
                return Err(Error::External("offline".to_string()));
            }
            self.posts.lock().unwrap().push((chat_id, text.to_string()));
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(0),
            })
        }

        async fn reply_to(&self, msg: MessageRef, text: &str) -> Result<MessageRef> {
            if self.fail {
                return Err(Error::External("offline".to_string()));
            }
            if self.deletes.lock().unwrap().contains(&msg) {
                return Err(Error::External("message to be replied not found".to_string()));
            }
            self.replies.lock().unwrap().push((msg, text.to_string()));
            Ok(msg)
        }

        async fn delete_message(&self, msg: MessageRef) -> Result<()> {
            self.deletes.lock().unwrap().push(msg);
            Ok(())
        }

        async fn set_reaction(&self, msg: MessageRef, emoji: &str) -> Result<()> {
            self.reactions.lock().unwrap().push((msg, emoji.to_string()));
            Ok(())
        }
    }

    fn text(chat: i64, id: i32, body: &str) -> TextMessage {
        TextMessage {
            msg: MessageRef {
                chat_id: ChatId(chat),
                message_id: MessageId(id),
            },
            user_id: UserId(1),
            text: body.to_string(),
        }
    }

    fn counter(cfg: Config, messenger: Arc<FakeMessenger>) -> Counter {
        Counter::new(
            Arc::new(cfg),
            messenger,
            Arc::new(InMemoryCountStore::new()),
        )
    }

    #[tokio::test]
    async fn counts_up_across_scripts() {
        let messenger = Arc::new(FakeMessenger::default());
        let c = counter(Config::default(), messenger.clone());

        for (i, body) in ["1", "٢", "३", " 4 ", "Ⅴ", "六", "𝟕", "2×4"].iter().enumerate() {
            let out = c.handle_text(&text(1, i as i32, body)).await.unwrap();
            assert_eq!(
                out,
                Outcome::Advance {
                    count: i as u64 + 1
                },
                "{body}"
            );
        }
        assert_eq!(c.current(ChatId(1)).await.unwrap().count, 8);
        assert!(messenger.reply_texts().is_empty());
    }

    #[tokio::test]
    async fn wrong_number_resets_and_replies() {
        let messenger = Arc::new(FakeMessenger::default());
        let c = counter(Config::default(), messenger.clone());

        c.handle_text(&text(1, 1, "1")).await.unwrap();
        let out = c.handle_text(&text(1, 2, "1")).await.unwrap();
        assert_eq!(
            out,
            Outcome::Reset {
                expected: 2,
                got: 1.0
            }
        );
        assert_eq!(c.current(ChatId(1)).await.unwrap().count, 0);
        assert_eq!(
            messenger.reply_texts(),
            vec!["Incorrect! The next number was 2. Count reset.".to_string()]
        );
    }

    #[tokio::test]
    async fn chats_are_independent() {
        let messenger = Arc::new(FakeMessenger::default());
        let c = counter(Config::default(), messenger);

        c.handle_text(&text(1, 1, "1")).await.unwrap();
        c.handle_text(&text(2, 1, "1")).await.unwrap();
        c.handle_text(&text(2, 2, "2")).await.unwrap();
        assert_eq!(c.current(ChatId(1)).await.unwrap().count, 1);
        assert_eq!(c.current(ChatId(2)).await.unwrap().count, 2);
    }

    #[tokio::test]
    async fn unparseable_text_is_ignored_by_default() {
        let messenger = Arc::new(FakeMessenger::default());
        let c = counter(Config::default(), messenger.clone());

        c.handle_text(&text(1, 1, "1")).await.unwrap();
        let out = c.handle_text(&text(1, 2, "great job everyone")).await.unwrap();
        assert_eq!(
            out,
            Outcome::Reject {
                reason: RejectReason::NotANumber
            }
        );
        assert_eq!(c.current(ChatId(1)).await.unwrap().count, 1);
        assert!(messenger.reply_texts().is_empty());
    }

    #[tokio::test]
    async fn unparseable_text_can_reset() {
        let messenger = Arc::new(FakeMessenger::default());
        let cfg = Config {
            unparseable: UnparseablePolicy::Reset,
            ..Config::default()
        };
        let c = counter(cfg, messenger.clone());

        c.handle_text(&text(1, 1, "1")).await.unwrap();
        c.handle_text(&text(1, 2, "४٢")).await.unwrap();
        assert_eq!(c.current(ChatId(1)).await.unwrap().count, 0);
        assert_eq!(
            messenger.reply_texts(),
            vec!["That's not a number. Count reset.".to_string()]
        );
    }

    #[tokio::test]
    async fn milestone_reaction_and_delete_reach_the_messenger() {
        let messenger = Arc::new(FakeMessenger::default());
        let cfg = Config {
            advance_reaction: Some("✅".to_string()),
            delete_wrong: true,
            milestones: [(2, "two!".to_string())].into_iter().collect(),
            ..Config::default()
        };
        let c = counter(cfg, messenger.clone());

        c.handle_text(&text(1, 1, "1")).await.unwrap();
        c.handle_text(&text(1, 2, "2")).await.unwrap();
        c.handle_text(&text(1, 3, "5")).await.unwrap();

        assert_eq!(messenger.reactions.lock().unwrap().len(), 2);
        assert_eq!(messenger.deletes.lock().unwrap().len(), 1);
        assert_eq!(messenger.reply_texts(), vec!["two!".to_string()]);
    }

    #[tokio::test]
    async fn reset_notice_survives_deleting_the_wrong_number() {
        let messenger = Arc::new(FakeMessenger::default());
        let cfg = Config {
            delete_wrong: true,
            ..Config::default()
        };
        let c = counter(cfg, messenger.clone());

        c.handle_text(&text(1, 1, "1")).await.unwrap();
        c.handle_text(&text(1, 2, "7")).await.unwrap();

        assert_eq!(
            *messenger.deletes.lock().unwrap(),
            vec![MessageRef {
                chat_id: ChatId(1),
                message_id: MessageId(2)
            }]
        );
        assert!(messenger.reply_texts().is_empty());
        assert_eq!(
            messenger.post_texts(),
            vec!["Incorrect! The next number was 2. Count reset.".to_string()]
        );
    }

    #[tokio::test]
    async fn messaging_failures_keep_the_new_count() {
        let messenger = Arc::new(FakeMessenger::failing());
        let c = counter(Config::default(), messenger);

        c.handle_text(&text(1, 1, "1")).await.unwrap();
        let out = c.handle_text(&text(1, 2, "3")).await.unwrap();
        assert!(matches!(out, Outcome::Reset { expected: 2, .. }));
        assert_eq!(c.current(ChatId(1)).await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn idle_chat_locks_are_pruned() {
        let locks = ChatLocks::default();
        let held = locks.lock_chat(ChatId(-1)).await;
        for i in 0..(PRUNE_LOCKS_AT as i64 * 2) {
            drop(locks.lock_chat(ChatId(i)).await);
        }
        let map = locks.inner.lock().await;
        assert!(map.len() <= PRUNE_LOCKS_AT);
        assert!(map.contains_key(&ChatId(-1)));
        drop(map);
        drop(held);
    }

    #[tokio::test]
    async fn concurrent_messages_in_one_chat_are_serialized() {
        let messenger = Arc::new(FakeMessenger::default());
        let c = Arc::new(counter(Config::default(), messenger));

        let mut handles = Vec::new();
        for i in 0..16 {
            let c = c.clone();
            handles.push(tokio::spawn(async move {
                c.handle_text(&text(1, i, "1")).await.unwrap()
            }));
        }
        let mut advances = 0;
        for h in handles {
            if matches!(h.await.unwrap(), Outcome::Advance { .. }) {
                advances += 1;
            }
        }
        // "1" only advances from 0, and every other "1" resets back to 0.
        assert!(advances >= 1);
        let count = c.current(ChatId(1)).await.unwrap().count;
        assert!(count <= 1);
    }
}
