use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared_draw::{Prize, PrizeAssignment, WinnerStatus};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    NotConfigured,
    AwaitingDraw { prize_index: usize, remaining: u32 },
    AwaitingConfirmation { prize_index: usize, remaining: u32 },
    Completed,
}

/// What a confirmation did to the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Same prize, possibly one fewer slot left
    Stay,
    /// Moved on to the assignment at this index
    NextPrize(usize),
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerError {
    NotConfigured,
    Completed,
    DrawPending,
    NoPendingDraw,
}

impl fmt::Display for SequencerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "No prizes have been assigned to this draw"),
            Self::Completed => write!(f, "All prizes have already been drawn"),
            Self::DrawPending => write!(f, "The current winner has not been confirmed yet"),
            Self::NoPendingDraw => write!(f, "There is no drawn winner waiting for confirmation"),
        }
    }
}

impl std::error::Error for SequencerError {}

/// Walks an ordered list of prize assignments, one confirmed winner at a time.
#[derive(Debug, Clone)]
pub struct PrizeSequencer {
    assignments: Vec<PrizeAssignment>,
    current_index: usize,
    confirmed_count: u32,
    awaiting_confirmation: bool,
    completed: bool,
}

impl PrizeSequencer {
    /// Assignments are expected to be purged already; a non-positive count is
    /// treated as an empty slot and skipped.
    pub fn new(assignments: Vec<PrizeAssignment>) -> Self {
        let assignments: Vec<_> = assignments.into_iter().filter(|a| a.count > 0).collect();
        Self {
            assignments,
            current_index: 0,
            confirmed_count: 0,
            awaiting_confirmation: false,
            completed: false,
        }
    }

    pub fn state(&self) -> SequencerState {
        if self.completed {
            return SequencerState::Completed;
        }
        if self.assignments.is_empty() {
            return SequencerState::NotConfigured;
        }

        let prize_index = self.current_index;
        let remaining = self.remaining();
        if self.awaiting_confirmation {
            SequencerState::AwaitingConfirmation { prize_index, remaining }
        } else {
            SequencerState::AwaitingDraw { prize_index, remaining }
        }
    }

    pub fn assignments(&self) -> &[PrizeAssignment] {
        &self.assignments
    }

    pub fn current_assignment(&self) -> Option<&PrizeAssignment> {
        if self.completed {
            return None;
        }
        self.assignments.get(self.current_index)
    }

    pub fn current_prize_id(&self) -> Option<Uuid> {
        self.current_assignment().map(|a| a.prize_id)
    }

    /// Open slots left for the active prize
    pub fn remaining(&self) -> u32 {
        self.current_assignment()
            .map(|a| a.count as u32 - self.confirmed_count)
            .unwrap_or(0)
    }

    pub fn winners_required(&self) -> u32 {
        self.assignments.iter().map(|a| a.count as u32).sum()
    }

    pub fn winners_confirmed(&self) -> u32 {
        let finished: u32 = self.assignments[..self.current_index.min(self.assignments.len())]
            .iter()
            .map(|a| a.count as u32)
            .sum();
        finished + self.confirmed_count
    }

    /// Marks that a winner has been drawn for the current slot.
    pub fn begin_draw(&mut self) -> Result<(), SequencerError> {
        match self.state() {
            SequencerState::NotConfigured => Err(SequencerError::NotConfigured),
            SequencerState::Completed => Err(SequencerError::Completed),
            SequencerState::AwaitingConfirmation { .. } => Err(SequencerError::DrawPending),
            SequencerState::AwaitingDraw { .. } => {
                self.awaiting_confirmation = true;
                Ok(())
            }
        }
    }

    /// Present consumes the slot; not present leaves it open for a redraw.
    pub fn confirm(&mut self, status: WinnerStatus) -> Result<Advance, SequencerError> {
        if !matches!(self.state(), SequencerState::AwaitingConfirmation { .. }) {
            return Err(SequencerError::NoPendingDraw);
        }
        self.awaiting_confirmation = false;

        if status == WinnerStatus::NotPresent {
            return Ok(Advance::Stay);
        }

        self.confirmed_count += 1;
        let count = self.assignments[self.current_index].count as u32;
        if self.confirmed_count < count {
            return Ok(Advance::Stay);
        }

        if self.current_index + 1 < self.assignments.len() {
            self.current_index += 1;
            self.confirmed_count = 0;
            log::debug!("advanced to prize assignment {}", self.current_index);
            Ok(Advance::NextPrize(self.current_index))
        } else {
            self.finish();
            Ok(Advance::Completed)
        }
    }

    /// Drops assignments whose prize no longer exists while keeping the
    /// pointer on the same (or next surviving) assignment. A draw pending for
    /// a dropped assignment is discarded. Returns how many were removed.
    pub fn retain_prizes(&mut self, prizes: &[Prize]) -> usize {
        if self.completed {
            return 0;
        }

        let before = self.assignments.len();
        let mut kept = Vec::with_capacity(before);
        let mut new_index = None;
        for (index, assignment) in self.assignments.iter().enumerate() {
            if !prizes.iter().any(|p| p.id == assignment.prize_id) {
                if index == self.current_index {
                    self.confirmed_count = 0;
                    self.awaiting_confirmation = false;
                }
                continue;
            }
            if index >= self.current_index && new_index.is_none() {
                new_index = Some(kept.len());
            }
            kept.push(*assignment);
        }

        let removed = before - kept.len();
        if removed == 0 {
            return 0;
        }

        self.assignments = kept;
        match new_index {
            Some(index) => self.current_index = index,
            None if self.assignments.is_empty() => {
                self.current_index = 0;
                self.confirmed_count = 0;
                self.awaiting_confirmation = false;
            }
            None => self.finish(),
        }
        log::info!("removed {} assignment(s) for deleted prizes", removed);
        removed
    }

    fn finish(&mut self) {
        self.assignments.clear();
        self.current_index = 0;
        self.confirmed_count = 0;
        self.awaiting_confirmation = false;
        self.completed = true;
    }
}
