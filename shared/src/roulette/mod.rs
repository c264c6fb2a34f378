//! Roulette geometry and timing: where a spin has to stop, how it gets there,
//! and which entry sits under the marker at any offset.
//!
//! Offsets are pixels for the vertical list and degrees of clockwise rotation
//! for the wheel. Both only ever grow during a spin.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::{Validate, ValidationError};

use crate::constants::*;

pub mod clock;
pub mod easing;
pub mod targeting;
pub mod track;

pub use clock::{AnimationClock, PositionUpdate};
pub use targeting::{compute_stop_target, AnimationPlan, StopTarget};
pub use track::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Vertical,
    Wheel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    EmptyPool,
    IndexOutOfRange { index: usize, pool_size: usize },
    Unresolved { index: usize, pool_size: usize },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPool => write!(f, "Cannot target a spin on an empty pool"),
            Self::IndexOutOfRange { index, pool_size } => {
                write!(f, "Winner index {} is outside a pool of {}", index, pool_size)
            }
            Self::Unresolved { index, pool_size } => {
                write!(f, "Stop position for index {} of {} is ambiguous", index, pool_size)
            }
        }
    }
}

impl std::error::Error for GeometryError {}

/// Spin timing and roulette dimensions, passed explicitly to every call.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_spin_range"))]
pub struct SpinSettings {
    pub layout: Layout,
    #[validate(range(min = 500, max = 60000))]
    pub spin_duration_ms: u32,
    #[validate(range(max = 30000))]
    pub reveal_delay_ms: u32,
    #[validate(range(min = 1.0))]
    pub item_height: f64,
    #[validate(range(min = 0.0))]
    pub item_spacing: f64,
    #[validate(range(min = 1.0))]
    pub vertical_velocity: f64,
    #[validate(range(min = 1.0))]
    pub wheel_velocity: f64,
    #[validate(range(min = 1, max = 50))]
    pub min_spins: u32,
    #[validate(range(min = 1, max = 50))]
    pub max_spins: u32,
}

fn validate_spin_range(settings: &SpinSettings) -> Result<(), ValidationError> {
    if settings.min_spins > settings.max_spins {
        return Err(ValidationError::new("min_spins_above_max_spins"));
    }
    Ok(())
}

impl Default for SpinSettings {
    fn default() -> Self {
        Self {
            layout: Layout::Vertical,
            spin_duration_ms: DEFAULT_SPIN_DURATION_MS,
            reveal_delay_ms: DEFAULT_REVEAL_DELAY_MS,
            item_height: DEFAULT_ITEM_HEIGHT,
            item_spacing: DEFAULT_ITEM_SPACING,
            vertical_velocity: DEFAULT_VERTICAL_VELOCITY,
            wheel_velocity: DEFAULT_WHEEL_VELOCITY,
            min_spins: MIN_SPINS,
            max_spins: MAX_SPINS,
        }
    }
}

impl SpinSettings {
    pub fn item_pitch(&self) -> f64 {
        self.item_height + self.item_spacing
    }

    pub fn spin_duration(&self) -> Duration {
        Duration::from_millis(self.spin_duration_ms as u64)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms as u64)
    }

    /// Top speed of the spin in offset units per second
    pub fn initial_velocity(&self, layout: Layout) -> f64 {
        match layout {
            Layout::Vertical => self.vertical_velocity,
            Layout::Wheel => self.wheel_velocity,
        }
    }
}
