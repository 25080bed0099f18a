//! Visual transitions awaited by the game loop.
//!
//! The loop only depends on the completion contract: each call to
//! [`Animator::animate`] resolves exactly once, after the transition is done.
//! Drawing is left to the host.
use std::time::Duration;

use async_trait::async_trait;

use crate::core::{EntityRef, Vec2};

pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(200);

#[async_trait]
pub trait Animator: Send + Sync {
    /// Moves `entity` from `from` to `to`. Returns when the transition has
    /// finished.
    async fn animate(&self, entity: EntityRef, from: Vec2, to: Vec2);
}

/// Completes every transition after a fixed duration.
#[derive(Clone, Debug)]
pub struct TimedAnimator {
    duration: Duration,
}

impl TimedAnimator {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Default for TimedAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_ANIMATION_DURATION)
    }
}

#[async_trait]
impl Animator for TimedAnimator {
    async fn animate(&self, entity: EntityRef, from: Vec2, to: Vec2) {
        tracing::trace!(?entity, %from, %to, duration_ms = self.duration.as_millis() as u64, "animating");
        tokio::time::sleep(self.duration).await;
    }
}

/// Completes immediately. Useful for headless play and replays.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstantAnimator;

#[async_trait]
impl Animator for InstantAnimator {
    async fn animate(&self, _entity: EntityRef, _from: Vec2, _to: Vec2) {}
}

#[cfg(test)]
mod test {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn timed_animator_waits_its_duration() {
        let animator = TimedAnimator::new(Duration::from_millis(200));
        let start = Instant::now();

        animator
            .animate(EntityRef::Player, Vec2::new(0, 0), Vec2::new(1, 0))
            .await;

        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}
