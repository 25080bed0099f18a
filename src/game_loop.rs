//! Turn sequencing for a single level instance.
//!
//! A [`GameLoop`] walks every command through
//! `AwaitingCommand -> Resolving -> (Blocked | Animating -> Applying -> CheckingWin)`
//! and ends in `Completed` once all boxes are on targets. It is the only
//! writer of its [`GameState`]; a new level load builds a fresh loop.
use std::sync::Arc;

use tokio::sync::watch;

use crate::animation::Animator;
use crate::core::{resolve, Direction, EntityKind, EntityRef, GameState, Level, MoveOutcome, Vec2};
use crate::error::StateError;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum LoopPhase {
    AwaitingCommand,
    Resolving,
    Blocked,
    Animating,
    Applying,
    CheckingWin,
    Completed,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TurnReport {
    /// Non-directional input. The resolver was not consulted.
    Idle,
    /// The level is already complete; the command was dropped.
    Finished,
    Blocked,
    Moved { outcome: MoveOutcome, completed: bool },
}

impl TurnReport {
    pub fn completed(&self) -> bool {
        matches!(self, TurnReport::Moved { completed: true, .. })
    }
}

/// What the renderer reads for one entity instead of decoding a label.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Sprite {
    pub entity: EntityRef,
    pub kind: EntityKind,
    pub position: Vec2,
    pub facing: Option<Direction>,
    pub in_motion: bool,
}

/// Read-only projection of a loop, published after every phase that
/// changes what is on screen.
#[derive(Clone, Debug)]
pub struct BoardView {
    pub level_index: usize,
    pub game: GameState,
    pub phase: LoopPhase,
    pub sprites: Vec<Sprite>,
    pub moves: u32,
    pub pushes: u32,
}

impl BoardView {
    pub fn player(&self) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.entity == EntityRef::Player)
    }

    pub fn is_completed(&self) -> bool {
        self.phase == LoopPhase::Completed
    }
}

pub struct GameLoop {
    level_index: usize,
    state: GameState,
    phase: LoopPhase,
    facing: Direction,
    moving: Vec<EntityRef>,
    moves: u32,
    pushes: u32,
    animator: Arc<dyn Animator>,
    board: Option<Arc<watch::Sender<BoardView>>>,
}

impl GameLoop {
    pub fn new(level_index: usize, level: Arc<Level>, animator: Arc<dyn Animator>) -> Self {
        Self {
            level_index,
            state: GameState::new(level),
            phase: LoopPhase::AwaitingCommand,
            facing: Direction::Down,
            moving: Vec::new(),
            moves: 0,
            pushes: 0,
            animator,
            board: None,
        }
    }

    /// Publishes a [`BoardView`] to `board` whenever the picture changes.
    pub fn with_board_channel(mut self, board: Arc<watch::Sender<BoardView>>) -> Self {
        board.send_replace(self.view());
        self.board = Some(board);
        self
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn is_completed(&self) -> bool {
        self.phase == LoopPhase::Completed
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn pushes(&self) -> u32 {
        self.pushes
    }

    /// Runs one turn. `None` is a non-directional input and leaves the loop
    /// waiting without touching the resolver. Returns once the move's
    /// animations have all finished and the state has been updated.
    pub async fn submit(&mut self, command: Option<Direction>) -> Result<TurnReport, StateError> {
        if self.is_completed() {
            tracing::debug!(level = self.level_index, "level already complete, dropping command");
            return Ok(TurnReport::Finished);
        }

        let Some(direction) = command else {
            return Ok(TurnReport::Idle);
        };

        self.enter(LoopPhase::Resolving);
        let outcome = resolve(&self.state, direction);
        self.facing = direction;
        tracing::debug!(level = self.level_index, ?direction, ?outcome, "resolved move");

        if outcome.is_blocked() {
            self.enter(LoopPhase::Blocked);
            self.publish();
            self.enter(LoopPhase::AwaitingCommand);
            return Ok(TurnReport::Blocked);
        }

        self.enter(LoopPhase::Animating);
        self.animate(outcome).await?;

        self.enter(LoopPhase::Applying);
        self.apply(outcome)?;

        self.enter(LoopPhase::CheckingWin);
        let completed = self.state.is_won();
        if completed {
            tracing::info!(
                level = self.level_index,
                moves = self.moves,
                pushes = self.pushes,
                "level complete"
            );
            self.enter(LoopPhase::Completed);
        } else {
            self.enter(LoopPhase::AwaitingCommand);
        }
        self.publish();

        Ok(TurnReport::Moved { outcome, completed })
    }

    async fn animate(&mut self, outcome: MoveOutcome) -> Result<(), StateError> {
        let animator = Arc::clone(&self.animator);
        match outcome {
            MoveOutcome::Blocked => {}
            MoveOutcome::PlayerMoved { from, to } => {
                self.moving = vec![EntityRef::Player];
                self.publish();
                animator.animate(EntityRef::Player, from, to).await;
            }
            MoveOutcome::PlayerPushedBox {
                player_from,
                player_to,
                box_from,
                box_to,
            } => {
                let id = self.state.box_at(&box_from).ok_or(StateError::NoBoxAt(box_from))?;
                self.moving = vec![EntityRef::Player, EntityRef::Box(id)];
                self.publish();
                // Both transitions must finish before the state moves on.
                tokio::join!(
                    animator.animate(EntityRef::Player, player_from, player_to),
                    animator.animate(EntityRef::Box(id), box_from, box_to),
                );
            }
        }
        self.moving.clear();
        Ok(())
    }

    fn apply(&mut self, outcome: MoveOutcome) -> Result<(), StateError> {
        self.state.apply_outcome(outcome)?;
        match outcome {
            MoveOutcome::Blocked => {}
            MoveOutcome::PlayerMoved { .. } => self.moves += 1,
            MoveOutcome::PlayerPushedBox { .. } => {
                self.moves += 1;
                self.pushes += 1;
            }
        }
        Ok(())
    }

    fn enter(&mut self, phase: LoopPhase) {
        tracing::trace!(level = self.level_index, from = ?self.phase, to = ?phase, "phase");
        self.phase = phase;
    }

    fn publish(&self) {
        if let Some(board) = &self.board {
            board.send_replace(self.view());
        }
    }

    pub fn view(&self) -> BoardView {
        let mut sprites = Vec::with_capacity(self.state.boxes().len() + 1);
        sprites.extend(self.state.iter_boxes().map(|(id, position)| Sprite {
            entity: EntityRef::Box(id),
            kind: EntityKind::Box,
            position,
            facing: None,
            in_motion: self.moving.contains(&EntityRef::Box(id)),
        }));
        sprites.push(Sprite {
            entity: EntityRef::Player,
            kind: EntityKind::Player,
            position: self.state.player(),
            facing: Some(self.facing),
            in_motion: self.moving.contains(&EntityRef::Player),
        });

        BoardView {
            level_index: self.level_index,
            game: self.state.clone(),
            phase: self.phase,
            sprites,
            moves: self.moves,
            pushes: self.pushes,
        }
    }
}
