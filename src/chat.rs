// Interactive terminal chat over the same oracle the web UI uses.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::message::Conversation;
use crate::oracle::OracleSession;

const EXIT_COMMANDS: [&str; 2] = ["exit", "quit"];

/// Runs the chat until the input ends or the user types `exit`/`quit`.
/// Returns the full conversation.
pub async fn run_chat<R, W>(session: &OracleSession, input: R, mut output: W) -> Result<Conversation>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut conversation = Conversation::new();
    let mut lines = input.lines();

    output
        .write_all(format!("✨ {}\n", conversation.messages()[0].text).as_bytes())
        .await
        .context("Failed to write welcome message")?;

    loop {
        output.write_all(b"> ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&line.to_lowercase().as_str()) {
            info!("Chat ended by user");
            break;
        }

        let reply = session.ask(line, conversation.messages()).await;
        debug!(chars = reply.len(), "Oracle replied");

        conversation.push_user(line);
        conversation.push_bot(reply.as_str());

        output
            .write_all(format!("✨ {}\n", reply).as_bytes())
            .await
            .context("Failed to write reply")?;
    }

    output.flush().await?;
    Ok(conversation)
}

/// Chat on stdin/stdout.
pub async fn run_terminal_chat(session: &OracleSession) -> Result<Conversation> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run_chat(session, stdin, tokio::io::stdout()).await
}
