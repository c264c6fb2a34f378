use validator::ValidationError;

use crate::shared_draw::{Prize, PrizeAssignment};

pub fn validate_assignment_count(count: i32) -> Result<(), ValidationError> {
    if count <= 0 {
        return Err(ValidationError::new("invalid_assignment_count"));
    }
    Ok(())
}

pub fn validate_assignment(assignment: &PrizeAssignment, prizes: &[Prize]) -> Result<(), ValidationError> {
    validate_assignment_count(assignment.count)?;
    if !prizes.iter().any(|p| p.id == assignment.prize_id) {
        return Err(ValidationError::new("orphaned_prize"));
    }
    Ok(())
}

/// Keeps only assignments with a positive count and an existing prize,
/// preserving their order.
pub fn purge_assignments(assignments: &[PrizeAssignment], prizes: &[Prize]) -> Vec<PrizeAssignment> {
    assignments
        .iter()
        .filter(|a| match validate_assignment(a, prizes) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("dropping assignment for prize {}: {}", a.prize_id, e.code);
                false
            }
        })
        .copied()
        .collect()
}

pub fn validate_pool_size(required: u32, available: usize) -> Result<(), ValidationError> {
    if required == 0 {
        return Err(ValidationError::new("no_assignments"));
    }
    if required as usize > available {
        return Err(ValidationError::new("not_enough_entries"));
    }
    Ok(())
}
