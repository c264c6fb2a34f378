// Animation defaults
pub const DEFAULT_SPIN_DURATION_MS: u32 = 6000;
pub const DEFAULT_REVEAL_DELAY_MS: u32 = 3000;
pub const DEFAULT_ITEM_HEIGHT: f64 = 64.0;
pub const DEFAULT_ITEM_SPACING: f64 = 8.0;
pub const DEFAULT_VERTICAL_VELOCITY: f64 = 2400.0; // px per second
pub const DEFAULT_WHEEL_VELOCITY: f64 = 1080.0;    // degrees per second
pub const MIN_SPINS: u32 = 3;     // Minimum number of full loops
pub const MAX_SPINS: u32 = 5;     // Maximum number of full loops
pub const FRAME_INTERVAL_MS: u64 = 16;

// Pools smaller than this get extra loops on the vertical list
pub const SMALL_POOL_SIZE: usize = 10;
// Share of the spin spent at full speed before the ease-out
pub const CRUISE_FRACTION: f64 = 0.85;
// Share of top speed × duration the spin must at least cover
pub const MIN_DISTANCE_FACTOR: f64 = 0.75;
// Wheel stop angles are rounded to 4 decimals
pub const WHEEL_ANGLE_PRECISION: f64 = 10_000.0;
pub const FULL_TURN_DEGREES: f64 = 360.0;
// Sector 0 starts at the top of the wheel
pub const WHEEL_START_ANGLE: f64 = -90.0;

pub const NO_ASSIGNMENTS_ERROR: &str = "Please assign at least one prize before drawing";
pub const NOT_ENOUGH_ENTRIES_ERROR: &str = "There are not enough entries for the assigned prizes";
pub const INVALID_PRIZE_ERROR: &str = "An assignment refers to a prize that no longer exists";
pub const DRAW_PENDING_ERROR: &str = "Please confirm the current winner before drawing again";
pub const SESSION_LOCKED_ERROR: &str = "Prize assignments cannot be changed while a draw is in progress";
