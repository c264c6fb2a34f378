use shared::shared_draw::DrawOutcome;

/// Presentation-side hooks. Every method defaults to doing nothing so a
/// listener only implements what it cares about.
pub trait DrawObserver {
    fn on_winner_selected(&mut self, _outcome: &DrawOutcome) {}

    fn on_session_completed(&mut self) {}

    fn on_validation_error(&mut self, _message: &str) {}

    /// An entry crossed the marker (tick sound)
    fn on_marker_passed(&mut self, _index: usize) {}

    fn on_reveal_countdown(&mut self, _seconds_left: u64) {}

    fn on_winner_revealed(&mut self, _outcome: &DrawOutcome) {}
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl DrawObserver for NoopObserver {}

/// Writes every event to the log; used by the CLI.
#[derive(Debug, Default)]
pub struct LogObserver {
    markers_passed: u64,
}

impl DrawObserver for LogObserver {
    fn on_winner_selected(&mut self, outcome: &DrawOutcome) {
        self.markers_passed = 0;
        tracing::info!(
            "🎡 Spinning towards entry #{} of {} ({:.1} units)",
            outcome.winner_index + 1,
            outcome.pool_size,
            outcome.animation_plan.target.distance()
        );
    }

    fn on_session_completed(&mut self) {
        tracing::info!("🏁 All prizes have been drawn");
    }

    fn on_validation_error(&mut self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn on_marker_passed(&mut self, _index: usize) {
        self.markers_passed += 1;
    }

    fn on_reveal_countdown(&mut self, seconds_left: u64) {
        tracing::info!("⏳ Revealing in {}...", seconds_left);
    }

    fn on_winner_revealed(&mut self, outcome: &DrawOutcome) {
        let prize = outcome
            .prize
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("no prize");
        tracing::info!(
            "🎉 {} wins {} after {} ticks",
            outcome.entry.name,
            prize,
            self.markers_passed
        );
    }
}
