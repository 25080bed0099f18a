mod bounds;
mod game_state;
mod level;
mod model_helpers;
mod models;
mod update;

pub use bounds::BoundsOriginRoot;
pub use game_state::GameState;
pub use level::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Level, LevelData};
pub use model_helpers::is_win;
pub use models::{BoxId, Direction, EntityKind, EntityKinds, EntityRef, MoveOutcome, Vec2};
pub use update::resolve;
