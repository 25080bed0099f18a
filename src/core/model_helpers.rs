use crate::core::GameState;

impl GameState {
    /// True once every box sits on a target. Extra empty targets do not
    /// matter, and a level without boxes is trivially won.
    pub fn is_won(&self) -> bool {
        self.boxes().iter().all(|b| self.level().is_target(b))
    }

    pub fn boxes_on_targets(&self) -> usize {
        self.boxes()
            .iter()
            .filter(|b| self.level().is_target(b))
            .count()
    }
}

/// Free-function form of [`GameState::is_won`].
pub fn is_win(game: &GameState) -> bool {
    game.is_won()
}
