use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::animation::InstantAnimator;
use crate::console_interface::parse_level;
use crate::core::Direction::*;
use crate::core::{BoxId, EntityRef, MoveOutcome, Vec2};
use crate::game_loop::{GameLoop, LoopPhase, TurnReport};
use crate::test::test_util::{AnimationEvent, RecordingAnimator};

const PUSH_TO_WIN: &str = r#"
@$.
"#;

const PUSH_INTO_WALL: &str = r#"
@$#
"#;

fn game_loop(map: &str, animator: Arc<RecordingAnimator>) -> GameLoop {
    let level = Arc::new(parse_level(map).unwrap());
    GameLoop::new(1, level, animator)
}

#[tokio::test(start_paused = true)]
async fn push_waits_for_both_animations_before_applying() {
    let animator = Arc::new(RecordingAnimator::with_durations(
        Duration::from_millis(50),
        Duration::from_millis(200),
    ));
    let mut game = game_loop(PUSH_TO_WIN, animator.clone());
    let start = Instant::now();

    let report = game.submit(Some(Right)).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(200));
    assert_eq!(
        report,
        TurnReport::Moved {
            outcome: MoveOutcome::PlayerPushedBox {
                player_from: Vec2::new(0, 0),
                player_to: Vec2::new(1, 0),
                box_from: Vec2::new(1, 0),
                box_to: Vec2::new(2, 0),
            },
            completed: true,
        }
    );
    assert_eq!(
        animator.events(),
        vec![
            AnimationEvent::Started(EntityRef::Player, Vec2::new(0, 0), Vec2::new(1, 0)),
            AnimationEvent::Started(EntityRef::Box(BoxId(0)), Vec2::new(1, 0), Vec2::new(2, 0)),
            AnimationEvent::Finished(EntityRef::Player),
            AnimationEvent::Finished(EntityRef::Box(BoxId(0))),
        ]
    );
    assert_eq!(game.state().player(), Vec2::new(1, 0));
    assert_eq!(game.state().boxes(), &[Vec2::new(2, 0)]);
    assert_eq!(game.phase(), LoopPhase::Completed);
    assert_eq!((game.moves(), game.pushes()), (1, 1));
}

#[tokio::test(start_paused = true)]
async fn blocked_move_turns_player_without_animating() {
    let animator = Arc::new(RecordingAnimator::default());
    let mut game = game_loop(PUSH_INTO_WALL, animator.clone());
    let before = game.state().clone();
    assert_eq!(game.facing(), Down);

    let report = game.submit(Some(Right)).await.unwrap();

    assert_eq!(report, TurnReport::Blocked);
    assert_eq!(game.facing(), Right);
    assert_eq!(game.state(), &before);
    assert_eq!(game.phase(), LoopPhase::AwaitingCommand);
    assert!(animator.events().is_empty());
    assert_eq!(game.moves(), 0);
}

#[tokio::test]
async fn no_op_command_skips_the_resolver() {
    let animator = Arc::new(RecordingAnimator::default());
    let mut game = game_loop(PUSH_TO_WIN, animator.clone());

    let report = game.submit(None).await.unwrap();

    assert_eq!(report, TurnReport::Idle);
    assert_eq!(game.phase(), LoopPhase::AwaitingCommand);
    assert_eq!(game.facing(), Down);
    assert!(animator.events().is_empty());
}

#[tokio::test]
async fn completed_loop_ignores_further_commands() {
    let level = Arc::new(parse_level(PUSH_TO_WIN).unwrap());
    let mut game = GameLoop::new(1, level, Arc::new(InstantAnimator));

    assert!(game.submit(Some(Right)).await.unwrap().completed());
    let after_win = game.state().clone();

    assert_eq!(game.submit(Some(Left)).await.unwrap(), TurnReport::Finished);
    assert_eq!(game.state(), &after_win);
    assert_eq!(game.facing(), Right);
}

#[tokio::test]
async fn plain_step_animates_only_the_player() {
    let animator = Arc::new(RecordingAnimator::default());
    let mut game = game_loop(
        r#"
 @$.
"#,
        animator.clone(),
    );

    let report = game.submit(Some(Left)).await.unwrap();

    assert_eq!(
        report,
        TurnReport::Moved {
            outcome: MoveOutcome::PlayerMoved {
                from: Vec2::new(1, 0),
                to: Vec2::new(0, 0),
            },
            completed: false,
        }
    );
    assert_eq!(
        animator.events(),
        vec![
            AnimationEvent::Started(EntityRef::Player, Vec2::new(1, 0), Vec2::new(0, 0)),
            AnimationEvent::Finished(EntityRef::Player),
        ]
    );
    assert_eq!(game.phase(), LoopPhase::AwaitingCommand);
}

#[tokio::test(start_paused = true)]
async fn board_view_marks_entities_in_motion_while_animating() {
    let animator = Arc::new(RecordingAnimator::with_durations(
        Duration::from_millis(200),
        Duration::from_millis(200),
    ));
    let (tx, mut rx) = watch::channel(game_loop(PUSH_TO_WIN, animator.clone()).view());
    let mut game = game_loop(PUSH_TO_WIN, animator).with_board_channel(Arc::new(tx));
    rx.borrow_and_update();

    let turn = tokio::spawn(async move {
        game.submit(Some(Right)).await.unwrap();
        game
    });

    rx.changed().await.unwrap();
    let animating = rx.borrow_and_update().clone();
    assert_eq!(animating.phase, LoopPhase::Animating);
    assert!(animating.sprites.iter().all(|s| s.in_motion));
    assert_eq!(animating.player().unwrap().facing, Some(Right));

    let game = turn.await.unwrap();
    let settled = game.view();
    assert!(settled.is_completed());
    assert!(settled.sprites.iter().all(|s| !s.in_motion));
}
