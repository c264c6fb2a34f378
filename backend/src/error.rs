use std::fmt;

use shared::constants::*;
use shared::prize_sequencer::SequencerError;
use shared::roulette::GeometryError;
use shared::selector::SelectionError;
use uuid::Uuid;

use crate::store::StoreError;

/// Configuration problems the user can fix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    NoAssignments,
    NotEnoughEntries { required: u32, available: usize },
    InvalidPrize(Uuid),
    InvalidCount(i32),
    DrawPending,
    UnknownWinner(Uuid),
    NothingToConfirm,
    SessionLocked,
    AssignmentOutOfRange { index: usize, len: usize },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAssignments => write!(f, "{}", NO_ASSIGNMENTS_ERROR),
            Self::NotEnoughEntries { required, available } => write!(
                f,
                "{} ({} needed, {} available)",
                NOT_ENOUGH_ENTRIES_ERROR, required, available
            ),
            Self::InvalidPrize(_) => write!(f, "{}", INVALID_PRIZE_ERROR),
            Self::InvalidCount(count) => write!(f, "Each prize needs at least one winner (got {})", count),
            Self::DrawPending => write!(f, "{}", DRAW_PENDING_ERROR),
            Self::UnknownWinner(id) => write!(f, "Winner {} is not waiting for confirmation", id),
            Self::NothingToConfirm => write!(f, "No winner has been drawn yet, spin first"),
            Self::SessionLocked => write!(f, "{}", SESSION_LOCKED_ERROR),
            Self::AssignmentOutOfRange { index, len } => {
                write!(f, "Assignment {} does not exist (only {} assigned)", index, len)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawError {
    Validation(ValidationIssue),
    Selection(SelectionError),
    Persistence(StoreError),
    Geometry(GeometryError),
}

impl DrawError {
    /// Selection and geometry failures mean the engine broke its own
    /// invariants; everything else is something the user can act on.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::Selection(_) | Self::Geometry(_))
    }
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(issue) => write!(f, "{}", issue),
            Self::Selection(e) => write!(f, "Selection error: {}", e),
            Self::Persistence(e) => write!(f, "Could not save the draw: {}", e),
            Self::Geometry(e) => write!(f, "Animation error: {}", e),
        }
    }
}

impl std::error::Error for DrawError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(_) => None,
            Self::Selection(e) => Some(e),
            Self::Persistence(e) => Some(e),
            Self::Geometry(e) => Some(e),
        }
    }
}

impl From<ValidationIssue> for DrawError {
    fn from(issue: ValidationIssue) -> Self {
        Self::Validation(issue)
    }
}

impl From<SelectionError> for DrawError {
    fn from(err: SelectionError) -> Self {
        Self::Selection(err)
    }
}

impl From<StoreError> for DrawError {
    fn from(err: StoreError) -> Self {
        Self::Persistence(err)
    }
}

impl From<GeometryError> for DrawError {
    fn from(err: GeometryError) -> Self {
        Self::Geometry(err)
    }
}

impl From<SequencerError> for DrawError {
    fn from(err: SequencerError) -> Self {
        match err {
            SequencerError::NotConfigured | SequencerError::Completed => {
                Self::Validation(ValidationIssue::NoAssignments)
            }
            SequencerError::DrawPending => Self::Validation(ValidationIssue::DrawPending),
            SequencerError::NoPendingDraw => Self::Validation(ValidationIssue::NothingToConfirm),
        }
    }
}
