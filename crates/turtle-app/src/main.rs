use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

pub mod board;
pub mod bridge;
pub mod check;
pub mod controller;
pub mod debouncer;
pub mod events;
pub mod io;
pub mod observer;
pub mod page;
pub mod presenter;
pub mod profile;
pub mod scanner;
pub mod state;
pub mod status;
pub mod toggle;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::state::AppState;

/// Flags previously used Wordle answers while you type a guess
#[derive(Parser, Debug)]
#[command(name = "turtle", version)]
struct Args {
    /// JSON profile to load instead of the environment
    #[arg(long)]
    config: Option<PathBuf>,

    /// Answer of the simulated game
    #[arg(long, default_value = "crane")]
    answer: String,

    /// URL of the simulated tab
    #[arg(long, default_value = "https://www.nytimes.com/games/wordle/index.html")]
    url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = profile::load_config(args.config.as_deref())?;
    init_tracing(config.log_json);

    let state = Arc::new(AppState::new(config));

    // Shutdown future (Ctrl+C)
    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl+c: {e}");
            std::future::pending::<()>().await;
        }
    };

    run(state, args, shutdown).await
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr));

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(
    state: Arc<AppState>,
    args: Args,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let capacity = state.config.read().await.channel_capacity;
    let controller = AppController::new(state, capacity);
    let mut tasks = controller.spawn_tasks(args.url, &args.answer).await?;

    tokio::select! {
        _ = shutdown => {
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::info!("Task finished, shutting down"),
                Ok(Err(e)) => tracing::error!("Task failed: {e}"),
                Err(e) => tracing::error!("Task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    while let Some(result) = tasks.join_next().await {
        if let Ok(Err(e)) = result {
            tracing::error!("Task failed during shutdown: {e}");
        }
    }

    Ok(())
}
