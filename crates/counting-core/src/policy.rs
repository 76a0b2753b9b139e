//! What the bot does in the chat for each outcome.
//!
//! The engine only says advance/reset/reject; replies, reactions and
//! deletions are decided here from [`Config`].

use crate::{
    config::{Config, UnparseablePolicy},
    sequence::{CountState, Outcome},
};

/// A side effect on the message that produced an outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Reply(String),
    /// A new message in the chat, for when the triggering message is gone.
    Post(String),
    React(String),
    Delete,
}

/// Side effects for `outcome`, in the order they should run.
pub fn actions(cfg: &Config, outcome: &Outcome) -> Vec<Action> {
    let mut out = Vec::new();
    match outcome {
        Outcome::Advance { count } => {
            if let Some(emoji) = &cfg.advance_reaction {
                out.push(Action::React(emoji.clone()));
            }
            if let Some(reply) = cfg.milestones.get(count) {
                out.push(Action::Reply(reply.clone()));
            }
        }
        Outcome::Reset { expected, .. } => {
            let text = reset_text(cfg, *expected);
            if cfg.delete_wrong {
                out.push(Action::Delete);
                out.push(Action::Post(text));
            } else {
                out.push(Action::Reply(text));
            }
        }
        Outcome::Reject { .. } => match cfg.unparseable {
            UnparseablePolicy::Ignore => {}
            UnparseablePolicy::Reset => {
                out.push(Action::Reply(cfg.unparseable_reply.clone()));
            }
        },
    }
    out
}

pub fn reset_text(cfg: &Config, expected: u64) -> String {
    cfg.reset_template
        .replace("{expected}", &expected.to_string())
}

/// Human summary of a chat's count.
pub fn status_text(state: &CountState) -> String {
    format!(
        "Current count: {}\nNext number should be: {}",
        state.count,
        state.expected()
    )
}
