// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Terminal chat client
//!
//! Sends each input line to a relay and renders the graph as it runs:
//! parallel perspectives are shown when they finish, the final-layer node
//! streams its text live. Ctrl+C cancels the response in flight.

use anyhow::Result;
use clap::Args;
use colored::{ColoredString, Colorize};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use agent_relay_sdk::types::{agent_profile, AgentLayer};
use agent_relay_sdk::{
    drive_exchange, AgentEvent, ChatView, ExchangeOutcome, ExchangeUpdate, RelayClient,
};

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Base URL the relay is served from
    #[arg(long, env = "AGENT_RELAY_URL", default_value = "http://localhost:3000")]
    pub url: String,

    /// Conversation id (default: random)
    #[arg(long)]
    pub session_id: Option<String>,

    /// Send one message and exit instead of reading stdin
    #[arg(value_name = "MESSAGE")]
    pub message: Option<String>,
}

pub async fn run(args: ChatArgs) -> Result<()> {
    let client = RelayClient::new(&args.url);
    let session_id = args
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let mut view = ChatView::new();

    if let Some(message) = args.message {
        let outcome = exchange(&client, &session_id, &mut view, &message).await;
        return match outcome {
            ExchangeOutcome::Completed => Ok(()),
            ExchangeOutcome::Failed(e) => anyhow::bail!(e),
            other => anyhow::bail!("Response ended early: {:?}", other),
        };
    }

    println!("{} {}", "Session:".bold(), session_id.dimmed());
    println!("{}", "Type a message and press Enter. Ctrl+D to quit.".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        exchange(&client, &session_id, &mut view, &line).await;
    }

    Ok(())
}

async fn exchange(
    client: &RelayClient,
    session_id: &str,
    view: &mut ChatView,
    text: &str,
) -> ExchangeOutcome {
    let reply_id = view.begin_exchange(text);
    let cancel = CancellationToken::new();

    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let outcome = drive_exchange(client, session_id, text, cancel, |update| match update {
        ExchangeUpdate::Event(event) => {
            render(event, view, &reply_id);
            view.apply(&reply_id, event);
        }
        ExchangeUpdate::Error(error) => {
            view.record_error(&reply_id, error);
            if let Some(message) = view.message(&reply_id) {
                eprintln!("{}", message.content.red());
            }
        }
    })
    .await;
    interrupt.abort();

    match &outcome {
        ExchangeOutcome::Completed | ExchangeOutcome::Failed(_) => {}
        ExchangeOutcome::Truncated => {
            println!("{}", "(response ended before completion)".yellow());
        }
        ExchangeOutcome::Cancelled => println!("{}", "(cancelled)".yellow()),
    }
    outcome
}

/// Print what `event` changes, before it is folded into the view
fn render(event: &AgentEvent, view: &ChatView, reply_id: &str) {
    let streamed_final = |node_id: &str| {
        view.message(reply_id)
            .and_then(|m| m.agent(node_id))
            .is_some_and(|a| !a.content.is_empty())
    };

    match event {
        AgentEvent::NodeStart { node_id } => {
            println!("{} {}", label(node_id), "⏳".dimmed());
        }
        AgentEvent::NodeStream { node_id, text } => {
            if agent_profile(node_id).layer == AgentLayer::Final {
                print!("{}", text);
                let _ = std::io::stdout().flush();
            }
        }
        AgentEvent::NodeStop { node_id, content } => {
            if agent_profile(node_id).layer == AgentLayer::Final && streamed_final(node_id) {
                println!();
                println!("{} {}", label(node_id), "✓".green());
            } else {
                println!("{} {}", label(node_id), "✓".green());
                println!("{}", content);
            }
        }
        AgentEvent::Complete { .. } => println!(),
        AgentEvent::Legacy { content } => println!("{}", content),
    }
}

fn label(node_id: &str) -> ColoredString {
    let profile = agent_profile(node_id);
    let text = format!("{} {}", profile.icon, profile.name);
    match hex_rgb(profile.color) {
        Some((r, g, b)) => text.truecolor(r, g, b).bold(),
        None => text.bold(),
    }
}

/// `#rrggbb` to its components
fn hex_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
