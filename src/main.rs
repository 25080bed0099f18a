// Terminal Sokoban
// Controls: W/A/S/D or arrow keys to move, R to reset, [ and ] for previous/next level,
// digits then Enter to jump to a level, Q to quit.
// Usage: sokoban_engine [level]

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::{mpsc, watch};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use sokoban_engine::animation::TimedAnimator;
use sokoban_engine::commands::{ChannelCommandSource, Input};
use sokoban_engine::config::GameConfig;
use sokoban_engine::console_interface::{
    ConsoleInput, GameRenderState, cleanup_terminal, handle_input, render_game, setup_terminal,
};
use sokoban_engine::game_loop::BoardView;
use sokoban_engine::levels::{LevelPack, LevelRequest, LevelSource};
use sokoban_engine::progress::ProgressStore;
use sokoban_engine::session::{Session, SessionHooks};

const INPUT_BUFFER: usize = 16;

struct TerminalHooks {
    progress: ProgressStore,
    banner: watch::Sender<Option<String>>,
    config: GameConfig,
}

#[async_trait]
impl SessionHooks for TerminalHooks {
    async fn on_level_loaded(&self, level_index: usize) {
        self.banner.send_replace(None);
        tracing::debug!(level = level_index, "showing level");
    }

    async fn on_level_complete(&self, level_index: usize) {
        if let Err(err) = self.progress.record(level_index as i64 + 1) {
            tracing::warn!(error = %err, "failed to save progress");
        }
        self.banner
            .send_replace(Some(format!("Level {} complete!", level_index)));
        tokio::time::sleep(self.config.win_banner).await;
        self.banner.send_replace(None);
        tokio::time::sleep(self.config.win_settle).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GameConfig::from_env();
    let _log_guard = setup_logging(&config)?;

    let levels = match &config.level_pack {
        Some(path) => LevelPack::from_path(path),
        None => LevelPack::builtin(),
    }
    .context("failed to load levels")?;
    let level_count = levels.level_count();

    let progress = ProgressStore::new(config.progress_file.clone(), config.session_id.clone());
    let initial = match std::env::args().nth(1) {
        Some(arg) => LevelRequest::parse(&arg),
        None => {
            let stored = progress.last_played().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "ignoring unreadable progress");
                None
            });
            LevelRequest::Index(stored.unwrap_or(1))
        }
    };

    let (banner_tx, banner_rx) = watch::channel(None);
    let hooks = Arc::new(TerminalHooks {
        progress,
        banner: banner_tx,
        config: config.clone(),
    });
    let animator = Arc::new(TimedAnimator::new(config.animation));
    let mut session = Session::start(levels, animator, hooks, config.session(), initial).await?;

    let (input_tx, mut source) = ChannelCommandSource::channel(INPUT_BUFFER);
    let (entry_tx, entry_rx) = watch::channel(String::new());

    let terminal = setup_terminal().map_err(|err| anyhow!(err))?;
    let renderer = tokio::spawn(render_loop(
        terminal,
        session.subscribe_board(),
        banner_rx,
        entry_rx,
        level_count,
    ));
    let pump = tokio::task::spawn_blocking(move || input_pump(input_tx, entry_tx));

    let outcome = session.run(&mut source).await;
    tracing::info!(?outcome, level = session.current_level_index(), "session ended");

    drop(session);
    drop(source);
    let rendered = renderer.await;
    let _ = pump.await;
    cleanup_terminal().map_err(|err| anyhow!(err))?;

    rendered??;
    outcome?;
    Ok(())
}

async fn render_loop(
    mut terminal: Terminal<CrosstermBackend<io::Stdout>>,
    mut board: watch::Receiver<BoardView>,
    mut banner: watch::Receiver<Option<String>>,
    mut entry: watch::Receiver<String>,
    level_count: usize,
) -> Result<()> {
    loop {
        let state = GameRenderState {
            view: board.borrow_and_update().clone(),
            level_count,
            banner: banner.borrow_and_update().clone(),
            level_entry: entry.borrow_and_update().clone(),
        };
        render_game(&mut terminal, &state).map_err(|err| anyhow!(err))?;

        let changed = tokio::select! {
            changed = board.changed() => changed,
            changed = banner.changed() => changed,
            changed = entry.changed() => changed,
        };
        if changed.is_err() {
            return Ok(());
        }
    }
}

fn input_pump(tx: mpsc::Sender<Input>, entry: watch::Sender<String>) {
    let mut level_entry = String::new();
    loop {
        match handle_input(&mut level_entry) {
            Ok(ConsoleInput::Input(input)) => {
                let quit = input == Input::Quit;
                entry.send_replace(level_entry.clone());
                if tx.blocking_send(input).is_err() || quit {
                    break;
                }
            }
            Ok(ConsoleInput::Editing) => {
                entry.send_replace(level_entry.clone());
            }
            Ok(ConsoleInput::Timeout) => {
                if tx.is_closed() {
                    break;
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to read input");
                break;
            }
        }
    }
}

/// Logs go to a file only; stderr belongs to the terminal UI.
fn setup_logging(config: &GameConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("failed to create log dir {}", config.log_dir.display()))?;

    let file_appender =
        tracing_appender::rolling::never(&config.log_dir, format!("{}.log", config.session_id));
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    tracing::info!(session = %config.session_id, "logging initialized");
    Ok(guard)
}
