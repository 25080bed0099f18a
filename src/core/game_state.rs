use std::sync::Arc;

use crate::core::level::Level;
use crate::core::models::{BoxId, EntityKinds, MoveOutcome, Vec2};
use crate::error::StateError;

/// Mutable snapshot of one level in play: where the player and every box
/// currently are. Boxes live in an arena so a [`BoxId`] stays valid for the
/// lifetime of the state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    level: Arc<Level>,
    player: Vec2,
    boxes: Vec<Vec2>,
}

impl GameState {
    pub fn new(level: Arc<Level>) -> GameState {
        GameState {
            player: level.player,
            boxes: level.boxes.clone(),
            level,
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn player(&self) -> Vec2 {
        self.player
    }

    pub fn boxes(&self) -> &[Vec2] {
        &self.boxes
    }

    pub fn iter_boxes(&self) -> impl Iterator<Item = (BoxId, Vec2)> + '_ {
        self.boxes.iter().enumerate().map(|(i, &b)| (BoxId(i), b))
    }

    pub fn is_in_bounds(&self, pos: &Vec2) -> bool {
        self.level.bounds.contains(pos)
    }

    pub fn box_at(&self, pos: &Vec2) -> Option<BoxId> {
        self.boxes.iter().position(|b| b == pos).map(BoxId)
    }

    pub fn has_box_at(&self, pos: &Vec2) -> bool {
        self.boxes.contains(pos)
    }

    pub fn entity_kinds_at(&self, pos: &Vec2) -> EntityKinds {
        let mut kinds = EntityKinds::empty();
        if self.level.is_wall(pos) {
            kinds |= EntityKinds::WALL;
        }
        if self.level.is_target(pos) {
            kinds |= EntityKinds::TARGET;
        }
        if self.has_box_at(pos) {
            kinds |= EntityKinds::BOX;
        }
        if self.player == *pos {
            kinds |= EntityKinds::PLAYER;
        }
        kinds
    }

    /// Commits a player move decided by the resolver.
    pub fn move_player(&mut self, to: Vec2) -> Result<(), StateError> {
        self.check_walkable(&to)?;
        if self.has_box_at(&to) {
            return Err(StateError::Occupied(to));
        }
        self.player = to;
        Ok(())
    }

    /// Commits a box move decided by the resolver. Boxes move before the
    /// player on a push, since the player may not share a cell with a box.
    pub fn move_box(&mut self, from: Vec2, to: Vec2) -> Result<BoxId, StateError> {
        let id = self.box_at(&from).ok_or(StateError::NoBoxAt(from))?;
        self.check_walkable(&to)?;
        if self.has_box_at(&to) {
            return Err(StateError::Occupied(to));
        }
        self.boxes[id.0] = to;
        Ok(id)
    }

    /// Commits a resolved outcome. A push moves the box first.
    pub fn apply_outcome(&mut self, outcome: MoveOutcome) -> Result<(), StateError> {
        match outcome {
            MoveOutcome::Blocked => {}
            MoveOutcome::PlayerMoved { to, .. } => self.move_player(to)?,
            MoveOutcome::PlayerPushedBox {
                player_to,
                box_from,
                box_to,
                ..
            } => {
                self.move_box(box_from, box_to)?;
                self.move_player(player_to)?;
            }
        }
        Ok(())
    }

    fn check_walkable(&self, pos: &Vec2) -> Result<(), StateError> {
        if !self.is_in_bounds(pos) {
            return Err(StateError::OutOfBounds(*pos));
        }
        if self.level.is_wall(pos) {
            return Err(StateError::Wall(*pos));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::bounds::BoundsOriginRoot;

    fn corridor() -> GameState {
        let level = Level::new(
            BoundsOriginRoot::new(4, 1),
            [Vec2::new(3, 0)],
            [Vec2::new(2, 0)],
            [Vec2::new(1, 0), Vec2::new(2, 0)],
            Vec2::new(0, 0),
        )
        .unwrap();
        GameState::new(Arc::new(level))
    }

    #[test]
    fn entity_kinds_report_box_on_target() {
        let state = corridor();

        assert_eq!(
            state.entity_kinds_at(&Vec2::new(2, 0)),
            EntityKinds::BOX | EntityKinds::TARGET
        );
        assert_eq!(state.entity_kinds_at(&Vec2::new(0, 0)), EntityKinds::PLAYER);
        assert_eq!(state.entity_kinds_at(&Vec2::new(3, 0)), EntityKinds::WALL);
        assert!(state.entity_kinds_at(&Vec2::new(9, 9)).is_empty());
    }

    #[test]
    fn move_box_keeps_its_id() {
        let level = Level::new(
            BoundsOriginRoot::new(5, 1),
            [],
            [],
            [Vec2::new(1, 0), Vec2::new(3, 0)],
            Vec2::new(0, 0),
        )
        .unwrap();
        let mut state = GameState::new(Arc::new(level));

        let id = state.move_box(Vec2::new(3, 0), Vec2::new(4, 0)).unwrap();
        assert_eq!(id, BoxId(1));
        assert_eq!(state.box_at(&Vec2::new(4, 0)), Some(BoxId(1)));
        assert_eq!(
            state.move_box(Vec2::new(1, 0), Vec2::new(4, 0)),
            Err(StateError::Occupied(Vec2::new(4, 0)))
        );
        assert_eq!(
            state.move_player(Vec2::new(1, 0)),
            Err(StateError::Occupied(Vec2::new(1, 0)))
        );
    }

    #[test]
    fn mutators_reject_walls_and_bounds() {
        let mut state = corridor();

        assert_eq!(
            state.move_player(Vec2::new(3, 0)),
            Err(StateError::Wall(Vec2::new(3, 0)))
        );
        assert_eq!(
            state.move_player(Vec2::new(-1, 0)),
            Err(StateError::OutOfBounds(Vec2::new(-1, 0)))
        );
        assert_eq!(
            state.move_box(Vec2::new(0, 0), Vec2::new(1, 0)),
            Err(StateError::NoBoxAt(Vec2::new(0, 0)))
        );
        assert_eq!(state.player(), Vec2::new(0, 0));
    }

    #[test]
    fn fresh_state_copies_initial_positions() {
        let level = Arc::new(
            Level::new(
                BoundsOriginRoot::new(4, 2),
                [],
                [],
                [Vec2::new(1, 0)],
                Vec2::new(0, 0),
            )
            .unwrap(),
        );
        let mut state = GameState::new(level.clone());
        state.move_box(Vec2::new(1, 0), Vec2::new(2, 0)).unwrap();
        state.move_player(Vec2::new(1, 0)).unwrap();

        let fresh = GameState::new(level);
        assert_eq!(fresh.boxes(), &[Vec2::new(1, 0)]);
        assert_eq!(fresh.player(), Vec2::new(0, 0));
        assert_ne!(fresh, state);
    }

    #[test]
    fn apply_outcome_moves_box_before_player() {
        let level = Level::new(
            BoundsOriginRoot::new(3, 1),
            [],
            [],
            [Vec2::new(1, 0)],
            Vec2::new(0, 0),
        )
        .unwrap();
        let mut state = GameState::new(Arc::new(level));

        state
            .apply_outcome(MoveOutcome::PlayerPushedBox {
                player_from: Vec2::new(0, 0),
                player_to: Vec2::new(1, 0),
                box_from: Vec2::new(1, 0),
                box_to: Vec2::new(2, 0),
            })
            .unwrap();

        assert_eq!(state.player(), Vec2::new(1, 0));
        assert_eq!(state.boxes(), &[Vec2::new(2, 0)]);
    }

    #[test]
    fn apply_outcome_reports_stale_push() {
        let mut state = corridor();

        let result = state.apply_outcome(MoveOutcome::PlayerPushedBox {
            player_from: Vec2::new(0, 0),
            player_to: Vec2::new(1, 0),
            box_from: Vec2::new(1, 0),
            box_to: Vec2::new(2, 0),
        });

        assert_eq!(result, Err(StateError::Occupied(Vec2::new(2, 0))));
        assert_eq!(state.player(), Vec2::new(0, 0));
    }
}
