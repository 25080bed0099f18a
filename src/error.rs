//! Error types for level loading, state mutation and progress persistence.
//!
//! The movement resolver and win detector are total and never fail; these
//! errors only come from untrusted data at the edges and from mutators called
//! with positions the resolver would never have produced.
use std::path::PathBuf;

use thiserror::Error;

use crate::core::Vec2;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Progress(#[from] ProgressError),
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level {index} does not exist (pack holds {count} levels)")]
    NotFound { index: usize, count: usize },

    #[error("level pack is empty")]
    EmptyPack,

    #[error("level bounds {width}x{height} must be positive")]
    InvalidBounds { width: i32, height: i32 },

    #[error("{what} at {position} lies outside the level bounds")]
    OutOfBounds { what: &'static str, position: Vec2 },

    #[error("{what} at {position} overlaps a wall")]
    OnWall { what: &'static str, position: Vec2 },

    #[error("two boxes share the cell {position}")]
    DuplicateBox { position: Vec2 },

    #[error("player at {position} stands on a box")]
    PlayerOnBox { position: Vec2 },

    #[error("level text has no player")]
    MissingPlayer,

    #[error("level text has a second player at {second} (first at {first})")]
    MultiplePlayers { first: Vec2, second: Vec2 },

    #[error("failed to read level pack {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode level pack")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("position {0} lies outside the level bounds")]
    OutOfBounds(Vec2),

    #[error("position {0} is a wall")]
    Wall(Vec2),

    #[error("position {0} already holds a box")]
    Occupied(Vec2),

    #[error("no box at {0}")]
    NoBoxAt(Vec2),
}

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("failed to access progress file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode or decode progress")]
    Serde(#[from] serde_json::Error),
}
