use std::fmt;

use crate::seeded_rng::SeededRng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    InvalidCount(i32),
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCount(count) => write!(f, "Invalid selection count: {}", count),
        }
    }
}

impl std::error::Error for SelectionError {}

/// Draws `count` items from `pool` with equal weight, never picking the same
/// position twice. Asking for the whole pool (or more) returns it unchanged.
pub fn select_without_replacement<T: Clone>(
    pool: &[T],
    count: i32,
    rng: &mut SeededRng,
) -> Result<Vec<T>, SelectionError> {
    if count < 0 {
        return Err(SelectionError::InvalidCount(count));
    }

    let count = count as usize;
    if pool.is_empty() || count == 0 {
        return Ok(Vec::new());
    }
    if count >= pool.len() {
        return Ok(pool.to_vec());
    }

    let mut remaining = pool.to_vec();
    let mut selected = Vec::with_capacity(count);
    while selected.len() < count {
        let index = rng.next_index(remaining.len());
        selected.push(remaining.remove(index));
    }

    log::debug!("selected {} of {} candidates", selected.len(), pool.len());
    Ok(selected)
}
