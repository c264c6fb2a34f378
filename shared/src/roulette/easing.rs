use crate::constants::CRUISE_FRACTION;

pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

// Normalized speed during the cruise phase. Chosen so the cubic tail starts
// at the same speed and the whole curve still ends at 1.0.
fn cruise_speed() -> f64 {
    1.0 / (CRUISE_FRACTION + (1.0 - CRUISE_FRACTION) / 3.0)
}

/// Share of the total distance covered at normalized time `t`.
///
/// Constant speed for the first 85% of the spin, then a cubic ease-out.
pub fn spin_progress(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let speed = cruise_speed();
    if t < CRUISE_FRACTION {
        return speed * t;
    }

    let tail = (t - CRUISE_FRACTION) / (1.0 - CRUISE_FRACTION);
    speed * CRUISE_FRACTION + speed * (1.0 - CRUISE_FRACTION) / 3.0 * ease_out_cubic(tail)
}

/// Derivative of [`spin_progress`] with respect to normalized time
pub fn spin_speed(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let speed = cruise_speed();
    if t < CRUISE_FRACTION {
        return speed;
    }

    let tail = (t - CRUISE_FRACTION) / (1.0 - CRUISE_FRACTION);
    speed * (1.0 - tail).powi(2)
}
