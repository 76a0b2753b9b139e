use std::{collections::BTreeMap, env, fs, path::Path};

use crate::{errors::Error, Result};

/// What to do with a message that is not a number at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnparseablePolicy {
    /// Leave the count alone and say nothing.
    Ignore,
    /// Reset the count to 0 and tell the chat.
    Reset,
}

/// Typed configuration for the counting service.
#[derive(Clone, Debug)]
pub struct Config {
    pub unparseable: UnparseablePolicy,
    /// Replies sent when the count lands on these numbers.
    pub milestones: BTreeMap<u64, String>,
    /// Reaction placed on every accepted message.
    pub advance_reaction: Option<String>,
    pub delete_wrong: bool,
    /// `{expected}` is replaced with the number that should have been sent.
    pub reset_template: String,
    pub unparseable_reply: String,
}

const DEFAULT_RESET_TEMPLATE: &str = "Incorrect! The next number was {expected}. Count reset.";
const DEFAULT_UNPARSEABLE_REPLY: &str = "That's not a number. Count reset.";

fn default_milestones() -> BTreeMap<u64, String> {
    BTreeMap::from([(69, "nice".to_string()), (420, "/blaze".to_string())])
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unparseable: UnparseablePolicy::Ignore,
            milestones: default_milestones(),
            advance_reaction: None,
            delete_wrong: false,
            reset_template: DEFAULT_RESET_TEMPLATE.to_string(),
            unparseable_reply: DEFAULT_UNPARSEABLE_REPLY.to_string(),
        }
    }
}

impl Config {
    /// Load from the process environment, after reading `.env` if present.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(env_str)
    }

    /// Build from an arbitrary key lookup (the environment, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let unparseable = match lookup("COUNTING_UNPARSEABLE")
            .map(|s| s.trim().to_lowercase())
            .as_deref()
        {
            None | Some("") | Some("ignore") => UnparseablePolicy::Ignore,
            Some("reset") => UnparseablePolicy::Reset,
            Some(other) => {
                return Err(Error::Config(format!(
                    "COUNTING_UNPARSEABLE must be 'ignore' or 'reset', got {other:?}"
                )))
            }
        };

        let milestones = match lookup("COUNTING_MILESTONES") {
            Some(raw) => parse_milestones(&raw)?,
            None => default_milestones(),
        };

        let advance_reaction = lookup("COUNTING_ADVANCE_REACTION").and_then(non_empty);
        let delete_wrong = lookup("COUNTING_DELETE_WRONG")
            .map(|s| parse_bool(&s))
            .unwrap_or(false);

        let reset_template = lookup("COUNTING_RESET_TEMPLATE")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_RESET_TEMPLATE.to_string());
        let unparseable_reply = lookup("COUNTING_UNPARSEABLE_REPLY")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_UNPARSEABLE_REPLY.to_string());

        Ok(Self {
            unparseable,
            milestones,
            advance_reaction,
            delete_wrong,
            reset_template,
            unparseable_reply,
        })
    }
}

/// `69=nice,420=/blaze` -> {69: "nice", 420: "/blaze"}.
fn parse_milestones(raw: &str) -> Result<BTreeMap<u64, String>> {
    let mut out = BTreeMap::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((n, reply)) = item.split_once('=') else {
            return Err(Error::Config(format!(
                "COUNTING_MILESTONES entry {item:?} is not number=reply"
            )));
        };
        let n = n.trim().parse::<u64>().map_err(|_| {
            Error::Config(format!("COUNTING_MILESTONES entry {item:?} has a bad number"))
        })?;
        out.insert(n, reply.trim().to_string());
    }
    Ok(out)
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
