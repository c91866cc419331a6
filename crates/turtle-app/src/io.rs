use std::str::FromStr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::board::GameBoard;
use crate::page::Tab;
use crate::state::AppState;
use crate::toggle::ActivationToggle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Type(String),
    Back,
    Enter,
    Toggle,
    Status,
    /// Switch to another tab, by URL
    Tab(String),
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let command = match parts.next() {
            Some("type") => match parts.next() {
                Some(letters) => Command::Type(letters.to_string()),
                None => return Err("usage: type <letters>".to_string()),
            },
            Some("back") => Command::Back,
            Some("enter") => Command::Enter,
            Some("toggle") => Command::Toggle,
            Some("status") => Command::Status,
            Some("tab") => match parts.next() {
                Some(url) => Command::Tab(url.to_string()),
                None => return Err("usage: tab <url>".to_string()),
            },
            Some("quit") | Some("exit") => Command::Quit,
            Some(other) => return Err(format!("unknown command `{other}`")),
            None => return Err("empty command".to_string()),
        };
        if parts.next().is_some() {
            return Err(format!("too many arguments in `{line}`"));
        }
        Ok(command)
    }
}

/// Drive the game board and the toggle from stdin
pub async fn command_io(
    state: Arc<AppState>,
    mut board: GameBoard,
    tab: Arc<Tab>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let toggle = ActivationToggle::new(state.clone());
    toggle.toggle(tab.as_ref()).await;

    tracing::info!("Commands: type <letters>, back, enter, toggle, tab <url>, status, quit");
    // TODO: read stdin on a dedicated thread so Ctrl+C does not wait for a pending line
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            tracing::info!("Input closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => run_command(&state, &mut board, &tab, &toggle, command).await,
            Err(e) => tracing::warn!("{e}"),
        }
    }

    tab.close().await;
    cancel.cancel();
    Ok(())
}

async fn run_command(
    state: &AppState,
    board: &mut GameBoard,
    tab: &Tab,
    toggle: &ActivationToggle,
    command: Command,
) {
    match command {
        Command::Type(letters) => {
            for letter in letters.chars() {
                if !board.type_letter(letter) {
                    tracing::warn!("Cannot type `{letter}`");
                    break;
                }
            }
        }
        Command::Back => {
            board.backspace();
        }
        Command::Enter => match board.submit() {
            Some(feedback) => {
                let states: Vec<_> = feedback.iter().map(|s| s.as_str()).collect();
                tracing::info!("Row evaluated: {}", states.join(" "));
                if board.is_finished() {
                    tracing::info!("Board is full");
                }
            }
            None => tracing::warn!("Not enough letters"),
        },
        Command::Toggle => {
            let badge = toggle.toggle(tab).await;
            tracing::info!(badge = badge.text(), "Toggled");
        }
        Command::Status => {
            let checks = state.status.checks.read().await.clone();
            let badge = toggle.badge().await;
            tracing::info!(
                observing = toggle.is_observing(),
                badge = badge.text(),
                checks = checks.check_count,
                used = checks.used_count,
                errors = checks.error_count,
                last_word = checks.last_word.as_deref().unwrap_or("-"),
                "Status"
            );
        }
        Command::Tab(url) => {
            toggle.on_tab_activated(&url).await;
            let badge = toggle.badge().await;
            tracing::info!(url = %url, badge = badge.text(), "Tab activated");
        }
        Command::Quit => {}
    }
}
