use crate::core::{Direction, GameState, MoveOutcome};

/// Decides what a single directional command does to `game` without
/// touching it. Pushes move at most one box, and a box can never leave the
/// level bounds, enter a wall, or land on another box.
pub fn resolve(game: &GameState, direction: Direction) -> MoveOutcome {
    let dir = direction.delta();
    let player = game.player();
    let next = player + dir;

    if !game.is_in_bounds(&next) || game.level().is_wall(&next) {
        return MoveOutcome::Blocked;
    }

    if !game.has_box_at(&next) {
        return MoveOutcome::PlayerMoved {
            from: player,
            to: next,
        };
    }

    let beyond = next + dir;
    if !game.is_in_bounds(&beyond) || game.level().is_wall(&beyond) || game.has_box_at(&beyond) {
        return MoveOutcome::Blocked;
    }

    MoveOutcome::PlayerPushedBox {
        player_from: player,
        player_to: next,
        box_from: next,
        box_to: beyond,
    }
}
