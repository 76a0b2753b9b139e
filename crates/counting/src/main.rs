mod console;

use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, BufReader};

use counting_core::{
    config::Config,
    counter::Counter,
    domain::{ChatId, MessageId, MessageRef, UserId},
    messaging::types::TextMessage,
    policy::status_text,
    store::InMemoryCountStore,
};

use crate::console::ConsoleMessenger;

const USAGE: &str = "usage: counting [--json] [--chat <id>]

Reads one message per line from stdin and counts them in a single chat.";

#[derive(Debug, PartialEq, Eq)]
struct Args {
    json: bool,
    chat_id: i64,
}

impl Args {
    /// `Ok(None)` means help was requested.
    fn parse(mut it: impl Iterator<Item = String>) -> anyhow::Result<Option<Self>> {
        let mut args = Args {
            json: false,
            chat_id: 1,
        };
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--json" => args.json = true,
                "--chat" => {
                    let v = it.next().context("--chat needs a value")?;
                    args.chat_id = v
                        .parse()
                        .with_context(|| format!("--chat expects an integer, got {v:?}"))?;
                }
                "-h" | "--help" => return Ok(None),
                other => bail!("unknown argument {other:?}\n\n{USAGE}"),
            }
        }
        Ok(Some(args))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    counting_core::logging::init("counting")?;

    let Some(args) = Args::parse(std::env::args().skip(1))? else {
        println!("{USAGE}");
        return Ok(());
    };

    let cfg = Arc::new(Config::load()?);
    let messenger = Arc::new(ConsoleMessenger::new(tokio::io::stdout()));
    let counter = Counter::new(
        cfg,
        messenger.clone(),
        Arc::new(InMemoryCountStore::new()),
    );

    let chat_id = ChatId(args.chat_id);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut message_id = 0;

    while let Some(line) = lines.next_line().await? {
        message_id += 1;
        let msg = TextMessage {
            msg: MessageRef {
                chat_id,
                message_id: MessageId(message_id),
            },
            user_id: UserId(0),
            text: line,
        };

        let outcome = counter.handle_text(&msg).await?;
        if args.json {
            messenger.write_line(&outcome.to_json()?).await?;
        }
    }

    let state = counter.current(chat_id).await?;
    tracing::info!(chat = chat_id.0, count = state.count, "input closed");
    messenger.write_line(&status_text(&state)).await?;

    Ok(())
}
