use std::time::Duration;

use shared::roulette::AnimationClock;
use shared::shared_draw::DrawOutcome;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};

use crate::observer::DrawObserver;

/// Plays a spin frame by frame, then counts down the reveal delay and
/// announces the winner. Returns the entry index the roulette stopped on.
pub async fn play_draw<O: DrawObserver>(
    clock: &mut AnimationClock,
    observer: &mut O,
    outcome: &DrawOutcome,
    frame_interval: Duration,
) -> Option<usize> {
    let mut frames = interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last = Instant::now();
    loop {
        frames.tick().await;
        let now = Instant::now();
        let update = clock.tick(now - last);
        last = now;

        for index in update.markers {
            observer.on_marker_passed(index);
        }
        if update.finished || !clock.is_spinning() {
            break;
        }
    }

    let landed = clock.index_at_marker();
    if landed != Some(outcome.winner_index) {
        tracing::error!(
            "❌ Roulette stopped on {:?} but the winner is entry {}",
            landed,
            outcome.winner_index
        );
    }

    reveal_countdown(observer, outcome.animation_plan.reveal_delay()).await;
    observer.on_winner_revealed(outcome);
    landed
}

async fn reveal_countdown<O: DrawObserver>(observer: &mut O, delay: Duration) {
    let mut left = delay;
    while !left.is_zero() {
        let seconds_left = left.as_secs() + u64::from(left.subsec_nanos() > 0);
        observer.on_reveal_countdown(seconds_left);

        // align to whole seconds so the last announcement is "1"
        let step = left - Duration::from_secs(seconds_left.saturating_sub(1));
        sleep(step).await;
        left -= step;
    }
}
