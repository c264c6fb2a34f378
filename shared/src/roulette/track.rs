use serde::{Deserialize, Serialize};

use super::{GeometryError, Layout, SpinSettings};
use crate::constants::*;

/// The looped strip (or wheel) of entries the marker runs over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub layout: Layout,
    pub pool_size: usize,
    pub item_pitch: f64,
}

impl Track {
    pub fn new(layout: Layout, pool_size: usize, settings: &SpinSettings) -> Result<Self, GeometryError> {
        if pool_size == 0 {
            return Err(GeometryError::EmptyPool);
        }
        Ok(Self {
            layout,
            pool_size,
            item_pitch: settings.item_pitch(),
        })
    }

    /// Offset covered by one full loop
    pub fn cycle_length(&self) -> f64 {
        match self.layout {
            Layout::Vertical => self.pool_size as f64 * self.item_pitch,
            Layout::Wheel => FULL_TURN_DEGREES,
        }
    }

    pub fn sector_angle(&self) -> f64 {
        FULL_TURN_DEGREES / self.pool_size as f64
    }

    /// Wheel angle at the middle of sector `index`, before any rotation
    pub fn sector_center(&self, index: usize) -> f64 {
        let sector = self.sector_angle();
        index as f64 * sector + WHEEL_START_ANGLE + sector / 2.0
    }

    /// Offset within `[0, cycle)` that puts `index` under the marker.
    pub fn stop_position(&self, index: usize) -> Result<f64, GeometryError> {
        if index >= self.pool_size {
            return Err(GeometryError::IndexOutOfRange {
                index,
                pool_size: self.pool_size,
            });
        }

        match self.layout {
            Layout::Vertical => Ok(index as f64 * self.item_pitch),
            Layout::Wheel => {
                let exact = (-self.sector_center(index)).rem_euclid(FULL_TURN_DEGREES);
                let mut rounded = (exact * WHEEL_ANGLE_PRECISION).round() / WHEEL_ANGLE_PRECISION;
                if rounded >= FULL_TURN_DEGREES {
                    rounded -= FULL_TURN_DEGREES;
                }

                if self.index_at(rounded) == index {
                    Ok(rounded)
                } else if self.index_at(exact) == index {
                    Ok(exact)
                } else {
                    Err(GeometryError::Unresolved {
                        index,
                        pool_size: self.pool_size,
                    })
                }
            }
        }
    }

    /// Unwrapped slot number at `offset`. Consecutive slots differ by one
    /// entry passing the marker.
    pub fn slot_at(&self, offset: f64) -> i64 {
        match self.layout {
            Layout::Vertical => (offset / self.item_pitch + 0.5).floor() as i64,
            Layout::Wheel => ((-WHEEL_START_ANGLE - offset) / self.sector_angle()).floor() as i64,
        }
    }

    /// Entry index under the marker at `offset`
    pub fn index_at(&self, offset: f64) -> usize {
        self.slot_at(offset).rem_euclid(self.pool_size as i64) as usize
    }

    /// Entries that crossed the marker moving from `from` to `to`, in order.
    pub fn markers_between(&self, from: f64, to: f64) -> Vec<usize> {
        let start = self.slot_at(from);
        let end = self.slot_at(to);
        let step = if end >= start { 1 } else { -1 };
        let n = self.pool_size as i64;

        (1..=(end - start).abs())
            .map(|i| (start + step * i).rem_euclid(n) as usize)
            .collect()
    }
}
