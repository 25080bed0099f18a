use std::collections::HashSet;

use serde::Deserialize;

use crate::core::bounds::BoundsOriginRoot;
use crate::core::models::Vec2;
use crate::error::LevelError;

pub const DEFAULT_WIDTH: i32 = 15;
pub const DEFAULT_HEIGHT: i32 = 10;

/// Immutable puzzle definition. A [`GameState`](crate::core::GameState) is
/// created from a fresh copy of the initial box and player positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    pub bounds: BoundsOriginRoot,
    pub walls: HashSet<Vec2>,
    pub targets: HashSet<Vec2>,
    pub boxes: Vec<Vec2>,
    pub player: Vec2,
}

/// Wire form of a level: lists of `[x, y]` pairs.
#[derive(Clone, Debug, Deserialize)]
pub struct LevelData {
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    #[serde(default)]
    pub walls: Vec<Vec2>,
    #[serde(default)]
    pub targets: Vec<Vec2>,
    #[serde(default)]
    pub boxes: Vec<Vec2>,
    pub player: Vec2,
}

fn default_width() -> i32 {
    DEFAULT_WIDTH
}

fn default_height() -> i32 {
    DEFAULT_HEIGHT
}

impl Level {
    /// Builds and validates a level. Malformed data is rejected here so the
    /// rules never see a level that breaks the state invariants.
    pub fn new(
        bounds: BoundsOriginRoot,
        walls: impl IntoIterator<Item = Vec2>,
        targets: impl IntoIterator<Item = Vec2>,
        boxes: impl IntoIterator<Item = Vec2>,
        player: Vec2,
    ) -> Result<Level, LevelError> {
        let level = Level {
            bounds,
            walls: walls.into_iter().collect(),
            targets: targets.into_iter().collect(),
            boxes: boxes.into_iter().collect(),
            player,
        };
        level.validate()?;
        Ok(level)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if self.bounds.width() <= 0 || self.bounds.height() <= 0 {
            return Err(LevelError::InvalidBounds {
                width: self.bounds.width(),
                height: self.bounds.height(),
            });
        }

        let check = |what: &'static str, position: Vec2| {
            if !self.bounds.contains(&position) {
                return Err(LevelError::OutOfBounds { what, position });
            }
            Ok(())
        };

        for &wall in &self.walls {
            check("wall", wall)?;
        }
        for &target in &self.targets {
            check("target", target)?;
        }

        check("player", self.player)?;
        if self.walls.contains(&self.player) {
            return Err(LevelError::OnWall {
                what: "player",
                position: self.player,
            });
        }

        let mut seen = HashSet::with_capacity(self.boxes.len());
        for &b in &self.boxes {
            check("box", b)?;
            if self.walls.contains(&b) {
                return Err(LevelError::OnWall {
                    what: "box",
                    position: b,
                });
            }
            if !seen.insert(b) {
                return Err(LevelError::DuplicateBox { position: b });
            }
        }
        if seen.contains(&self.player) {
            return Err(LevelError::PlayerOnBox {
                position: self.player,
            });
        }

        Ok(())
    }

    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    pub fn is_wall(&self, pos: &Vec2) -> bool {
        self.walls.contains(pos)
    }

    pub fn is_target(&self, pos: &Vec2) -> bool {
        self.targets.contains(pos)
    }
}

impl TryFrom<LevelData> for Level {
    type Error = LevelError;

    fn try_from(data: LevelData) -> Result<Self, Self::Error> {
        Level::new(
            BoundsOriginRoot::new(data.width, data.height),
            data.walls,
            data.targets,
            data.boxes,
            data.player,
        )
    }
}
