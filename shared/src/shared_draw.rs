use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roulette::AnimationPlan;

/// A candidate that can be drawn
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: Uuid,
    pub name: String,
}

impl Entry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// A reward category that winners are assigned to
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Prize {
    pub id: Uuid,
    pub name: String,
}

impl Prize {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// "The next `count` winners drawn receive `prize_id`". Order matters.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PrizeAssignment {
    pub prize_id: Uuid,
    pub count: i32,
}

impl PrizeAssignment {
    pub fn new(prize_id: Uuid, count: i32) -> Self {
        Self { prize_id, count }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WinnerStatus {
    Present,
    NotPresent,
}

/// Historical record of one draw outcome
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Winner {
    pub id: Uuid,
    pub draw_id: Uuid,
    pub entry_id: Uuid,
    pub prize_id: Option<Uuid>,
    pub position: u32, // 1-based rank within the parent draw
    pub status: WinnerStatus,
}

/// A batch of winners created by a single selection call
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Draw {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub winners: Vec<Winner>,
}

// === API Types ===

/// What the presentation layer receives for every drawn winner
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DrawOutcome {
    pub winner: Winner,
    pub entry: Entry,
    pub prize: Option<Prize>,
    pub winner_index: usize,
    pub pool_size: usize,
    pub animation_plan: AnimationPlan,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    AwaitingDraw,
    AwaitingConfirmation,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionProgress {
    pub phase: SessionPhase,
    pub prize: Option<Prize>,
    pub remaining: u32,
    pub pool_size: usize,
    pub winners_confirmed: u32,
    pub winners_required: u32,
}

impl SessionProgress {
    pub fn idle() -> Self {
        Self {
            phase: SessionPhase::Idle,
            prize: None,
            remaining: 0,
            pool_size: 0,
            winners_confirmed: 0,
            winners_required: 0,
        }
    }
}
