//! Command sources feeding the session one input at a time.
use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::core::Direction;
use crate::levels::LevelRequest;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Move(Direction),
    /// A key that maps to nothing. Consumes no turn.
    NoOp,
    Reset,
    PreviousLevel,
    NextLevel,
    SelectLevel(LevelRequest),
    Quit,
}

#[async_trait]
pub trait CommandSource: Send {
    /// Waits for the next input. `None` means the source is closed.
    async fn next_input(&mut self) -> Option<Input>;

    /// Drops moves that arrived while the caller was busy, returning how
    /// many were discarded.
    fn discard_pending(&mut self) -> usize;
}

/// Reads inputs from a tokio channel. The session owns the receiver for its
/// lifetime; dropping it closes the subscription and senders start failing.
pub struct ChannelCommandSource {
    rx: mpsc::Receiver<Input>,
    held: VecDeque<Input>,
}

impl ChannelCommandSource {
    pub fn new(rx: mpsc::Receiver<Input>) -> Self {
        Self {
            rx,
            held: VecDeque::new(),
        }
    }

    pub fn channel(buffer: usize) -> (mpsc::Sender<Input>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl CommandSource for ChannelCommandSource {
    async fn next_input(&mut self) -> Option<Input> {
        if let Some(input) = self.held.pop_front() {
            return Some(input);
        }
        self.rx.recv().await
    }

    /// Drops queued moves. Level controls and quit are kept in order.
    fn discard_pending(&mut self) -> usize {
        let mut dropped = 0;
        while let Ok(input) = self.rx.try_recv() {
            match input {
                Input::Move(_) | Input::NoOp => dropped += 1,
                other => self.held.push_back(other),
            }
        }
        dropped
    }
}

/// Replays a fixed list of inputs, then closes.
#[derive(Clone, Debug, Default)]
pub struct ScriptedCommandSource {
    inputs: VecDeque<Input>,
}

impl ScriptedCommandSource {
    pub fn new(inputs: impl IntoIterator<Item = Input>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
        }
    }
}

#[async_trait]
impl CommandSource for ScriptedCommandSource {
    async fn next_input(&mut self) -> Option<Input> {
        self.inputs.pop_front()
    }

    fn discard_pending(&mut self) -> usize {
        0
    }
}
