use chrono::Utc;

const MULTIPLIER: u64 = 9301;
const INCREMENT: u64 = 49297;
const MODULUS: u64 = 233280;

/// Small linear congruential generator used for reproducible draws.
///
/// Not suitable for anything adversarial: the whole state fits in 18 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Seeded from the string hash when given, otherwise from the wall clock.
    pub fn new(seed: Option<&str>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_time(),
        }
    }

    pub fn from_seed(seed: &str) -> Self {
        Self {
            state: hash_seed(seed) as u64,
        }
    }

    pub fn from_time() -> Self {
        Self {
            state: Utc::now().timestamp_millis().unsigned_abs() % MODULUS,
        }
    }

    /// Next value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * MULTIPLIER + INCREMENT) % MODULUS;
        self.state as f64 / MODULUS as f64
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn next_index(&mut self, len: usize) -> usize {
        let index = (self.next_f64() * len as f64).floor() as usize;
        index.min(len - 1)
    }
}

/// `hash * 31 + code unit` over the UTF-16 code units, wrapped to i32,
/// absolute value.
pub fn hash_seed(seed: &str) -> u32 {
    let hash = seed
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32));
    hash.unsigned_abs()
}
