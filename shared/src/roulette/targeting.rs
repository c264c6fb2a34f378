use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::easing::{spin_progress, spin_speed};
use super::{GeometryError, Layout, SpinSettings, Track};
use crate::constants::{MIN_DISTANCE_FACTOR, SMALL_POOL_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopTarget {
    pub winner_index: usize,
    pub start_offset: f64,
    /// Exact offset the spin ends on; the winner sits under the marker here
    pub final_offset: f64,
    pub min_spin_distance: f64,
    pub loops: u32,
}

impl StopTarget {
    pub fn distance(&self) -> f64 {
        self.final_offset - self.start_offset
    }
}

/// Computes where a spin starting at `current_offset` must stop so that
/// `winner_index` ends up under the marker.
///
/// The spin always travels forward by at least `min_spins` full loops and at
/// least `velocity × 0.75 × duration`, whichever is longer.
pub fn compute_stop_target<R: Rng + ?Sized>(
    winner_index: usize,
    pool_size: usize,
    layout: Layout,
    current_offset: f64,
    settings: &SpinSettings,
    rng: &mut R,
) -> Result<StopTarget, GeometryError> {
    let track = Track::new(layout, pool_size, settings)?;
    let stop = track.stop_position(winner_index)?;
    let cycle = track.cycle_length();

    let min_spin_distance = settings.initial_velocity(layout)
        * MIN_DISTANCE_FACTOR
        * settings.spin_duration().as_secs_f64();

    let mut loops = rng.gen_range(settings.min_spins..=settings.max_spins.max(settings.min_spins));
    if layout == Layout::Vertical && pool_size < SMALL_POOL_SIZE {
        loops *= SMALL_POOL_SIZE.div_ceil(pool_size) as u32;
    }

    // next forward position where the winner is under the marker
    let base = (current_offset / cycle).floor() * cycle;
    let mut first_stop = base + stop;
    if first_stop < current_offset {
        first_stop += cycle;
    }

    while first_stop + loops as f64 * cycle - current_offset < min_spin_distance {
        loops += 1;
    }
    let final_offset = first_stop + loops as f64 * cycle;

    if track.index_at(final_offset) != winner_index {
        return Err(GeometryError::Unresolved {
            index: winner_index,
            pool_size,
        });
    }

    Ok(StopTarget {
        winner_index,
        start_offset: current_offset,
        final_offset,
        min_spin_distance,
        loops,
    })
}

/// Everything the presentation layer needs to replay a spin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationPlan {
    pub track: Track,
    pub target: StopTarget,
    pub duration_ms: u32,
    pub reveal_delay_ms: u32,
}

impl AnimationPlan {
    pub fn new(track: Track, target: StopTarget, settings: &SpinSettings) -> Self {
        Self {
            track,
            target,
            duration_ms: settings.spin_duration_ms,
            reveal_delay_ms: settings.reveal_delay_ms,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms as u64)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms as u64)
    }

    fn normalized(&self, elapsed: Duration) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration().as_secs_f64()).min(1.0)
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration()
    }

    /// Offset along the eased curve. Ends exactly on `final_offset`.
    pub fn offset_at(&self, elapsed: Duration) -> f64 {
        if self.is_finished(elapsed) {
            return self.target.final_offset;
        }
        self.target.start_offset + self.target.distance() * spin_progress(self.normalized(elapsed))
    }

    /// Offset units per second at `elapsed`
    pub fn velocity_at(&self, elapsed: Duration) -> f64 {
        if self.is_finished(elapsed) {
            return 0.0;
        }
        self.target.distance() * spin_speed(self.normalized(elapsed)) / self.duration().as_secs_f64()
    }
}
