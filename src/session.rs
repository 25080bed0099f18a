//! Host-facing control surface.
//!
//! A [`Session`] owns the active [`GameLoop`], translates host inputs into
//! turns and level loads, and reports loads and completions through
//! [`SessionHooks`]. Loading a level (including a reset) tears down the
//! current loop and builds a fresh one.
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::animation::Animator;
use crate::commands::{CommandSource, Input};
use crate::core::Direction;
use crate::error::Result;
use crate::game_loop::{BoardView, GameLoop, TurnReport};
use crate::levels::{select_level, LevelRequest, LevelSource};

#[async_trait]
pub trait SessionHooks: Send + Sync {
    /// Fired once per load, before the first command is accepted.
    async fn on_level_loaded(&self, _level_index: usize) {}

    /// Fired once per win. The session waits for it before moving on, so
    /// any inter-level pause belongs here.
    async fn on_level_complete(&self, _level_index: usize) {}
}

pub struct NoHooks;

#[async_trait]
impl SessionHooks for NoHooks {}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Load the following level after `on_level_complete` resolves.
    pub auto_advance: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { auto_advance: true }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionExit {
    Quit,
    SourceClosed,
}

pub struct Session<L: LevelSource> {
    levels: L,
    animator: Arc<dyn Animator>,
    hooks: Arc<dyn SessionHooks>,
    config: SessionConfig,
    board: Arc<watch::Sender<BoardView>>,
    game: GameLoop,
}

impl<L: LevelSource> Session<L> {
    /// Loads the initial level (wrapped like any other request) and fires
    /// `on_level_loaded` for it.
    pub async fn start(
        levels: L,
        animator: Arc<dyn Animator>,
        hooks: Arc<dyn SessionHooks>,
        config: SessionConfig,
        initial: LevelRequest,
    ) -> Result<Self> {
        let index = select_level(initial, levels.level_count());
        let game = GameLoop::new(index, levels.level(index)?, Arc::clone(&animator));
        let board = Arc::new(watch::channel(game.view()).0);
        let game = game.with_board_channel(Arc::clone(&board));
        let session = Self {
            levels,
            animator,
            hooks,
            config,
            board,
            game,
        };
        tracing::info!(request = %initial, level = index, "level loaded");
        session.hooks.on_level_loaded(index).await;
        Ok(session)
    }

    pub fn current_level_index(&self) -> usize {
        self.game.level_index()
    }

    pub fn level_count(&self) -> usize {
        self.levels.level_count()
    }

    pub fn game(&self) -> &GameLoop {
        &self.game
    }

    /// Receives a fresh [`BoardView`] after every visible change.
    pub fn subscribe_board(&self) -> watch::Receiver<BoardView> {
        self.board.subscribe()
    }

    pub async fn load_level(&mut self, request: LevelRequest) -> Result<usize> {
        let index = select_level(request, self.levels.level_count());
        let level = self.levels.level(index)?;
        self.game = GameLoop::new(index, level, Arc::clone(&self.animator))
            .with_board_channel(Arc::clone(&self.board));
        tracing::info!(%request, level = index, "level loaded");
        self.hooks.on_level_loaded(index).await;
        Ok(index)
    }

    pub async fn reset(&mut self) -> Result<usize> {
        self.load_level(LevelRequest::from(self.current_level_index()))
            .await
    }

    pub async fn previous_level(&mut self) -> Result<usize> {
        let index = self.current_level_index() as i64 - 1;
        self.load_level(LevelRequest::Index(index)).await
    }

    pub async fn next_level(&mut self) -> Result<usize> {
        let index = self.current_level_index() as i64 + 1;
        self.load_level(LevelRequest::Index(index)).await
    }

    /// Plays one directional command to completion, including animations.
    /// A winning move fires `on_level_complete` and, with `auto_advance`,
    /// loads the next level.
    pub async fn perform_move(&mut self, direction: Direction) -> Result<TurnReport> {
        let report = self.game.submit(Some(direction)).await?;
        if report.completed() {
            let index = self.current_level_index();
            self.hooks.on_level_complete(index).await;
            if self.config.auto_advance {
                self.load_level(LevelRequest::Index(index as i64 + 1)).await?;
            }
        }
        Ok(report)
    }

    /// Applies one host input. Returns `false` when the input asks to quit.
    pub async fn handle(&mut self, input: Input) -> Result<bool> {
        match input {
            Input::Move(direction) => {
                self.perform_move(direction).await?;
            }
            Input::NoOp => {
                self.game.submit(None).await?;
            }
            Input::Reset => {
                self.reset().await?;
            }
            Input::PreviousLevel => {
                self.previous_level().await?;
            }
            Input::NextLevel => {
                self.next_level().await?;
            }
            Input::SelectLevel(request) => {
                self.load_level(request).await?;
            }
            Input::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Drives the session from `source` until it closes or asks to quit.
    /// Inputs that pile up while a move is animating are dropped.
    pub async fn run(&mut self, source: &mut dyn CommandSource) -> Result<SessionExit> {
        loop {
            let Some(input) = source.next_input().await else {
                tracing::info!("command source closed");
                return Ok(SessionExit::SourceClosed);
            };

            let is_move = matches!(input, Input::Move(_));
            if !self.handle(input).await? {
                return Ok(SessionExit::Quit);
            }

            if is_move {
                let dropped = source.discard_pending();
                if dropped > 0 {
                    tracing::warn!(dropped, "discarded input received mid-move");
                }
            }
        }
    }
}
