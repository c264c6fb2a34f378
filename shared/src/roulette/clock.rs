use std::time::Duration;

use super::{AnimationPlan, Track};

/// Result of advancing the clock by one tick
#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    pub offset: f64,
    pub velocity: f64,
    /// Entry indices that passed the marker during this tick, in order
    pub markers: Vec<usize>,
    pub finished: bool,
}

/// Owns the roulette position. Whoever drives the frames calls [`tick`];
/// nothing else writes the offset.
///
/// Once a plan is attached the clock is position-locked: only the plan moves
/// the offset, and the lock holds after landing until [`release`] is called
/// for the next draw.
///
/// [`tick`]: AnimationClock::tick
/// [`release`]: AnimationClock::release
#[derive(Debug, Clone)]
pub struct AnimationClock {
    offset: f64,
    velocity: f64,
    track: Option<Track>,
    plan: Option<AnimationPlan>,
    elapsed: Duration,
    position_locked: bool,
}

impl AnimationClock {
    pub fn new(offset: f64) -> Self {
        Self {
            offset,
            velocity: 0.0,
            track: None,
            plan: None,
            elapsed: Duration::ZERO,
            position_locked: false,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_locked(&self) -> bool {
        self.position_locked
    }

    pub fn is_spinning(&self) -> bool {
        match &self.plan {
            Some(plan) => !plan.is_finished(self.elapsed),
            None => self.velocity > 0.0,
        }
    }

    /// Entry currently under the marker, if a track is known
    pub fn index_at_marker(&self) -> Option<usize> {
        self.track.map(|track| track.index_at(self.offset))
    }

    /// Unlocks the position and lets it roll freely at `velocity` until a
    /// target is attached.
    pub fn release(&mut self, track: Track, velocity: f64) {
        self.track = Some(track);
        self.plan = None;
        self.elapsed = Duration::ZERO;
        self.velocity = velocity;
        self.position_locked = false;
    }

    /// Attaches a spin plan and locks the position to it.
    pub fn lock_to(&mut self, plan: AnimationPlan) {
        self.offset = plan.target.start_offset;
        self.velocity = plan.velocity_at(Duration::ZERO);
        self.track = Some(plan.track);
        self.plan = Some(plan);
        self.elapsed = Duration::ZERO;
        self.position_locked = true;
    }

    pub fn tick(&mut self, delta: Duration) -> PositionUpdate {
        let previous = self.offset;
        let mut finished = false;

        match &self.plan {
            Some(plan) => {
                if !plan.is_finished(self.elapsed) {
                    self.elapsed += delta;
                    if plan.is_finished(self.elapsed) {
                        // land on the analytic target, never on an accumulated value
                        self.offset = plan.target.final_offset;
                        self.velocity = 0.0;
                        finished = true;
                    } else {
                        self.offset = plan.offset_at(self.elapsed);
                        self.velocity = plan.velocity_at(self.elapsed);
                    }
                }
            }
            None if !self.position_locked => {
                self.offset += self.velocity * delta.as_secs_f64();
            }
            None => {}
        }

        let markers = match self.track {
            Some(track) if self.offset != previous => track.markers_between(previous, self.offset),
            _ => Vec::new(),
        };

        PositionUpdate {
            offset: self.offset,
            velocity: self.velocity,
            markers,
            finished,
        }
    }
}
