use std::fmt;

use shared::shared_draw::{Draw, Entry, Prize, PrizeAssignment, Winner, WinnerStatus};
use strum::Display;
use uuid::Uuid;

pub mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StoreOperation {
    ListEntries,
    ListPrizes,
    LoadAssignments,
    SaveAssignments,
    CreateWinner,
    UpdateWinnerStatus,
    DeleteAllDraws,
    ListDraws,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub operation: StoreOperation,
    pub message: String,
}

impl StoreError {
    pub fn new(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.operation, self.message)
    }
}

impl std::error::Error for StoreError {}

/// Storage for entries, prizes, assignments and draw history. The session
/// only talks to persistence through this trait.
#[allow(async_fn_in_trait)]
pub trait DrawStore {
    /// All entries, optionally without anyone who already appears in a draw
    async fn list_available_entries(&self, exclude_previous_winners: bool) -> Result<Vec<Entry>, StoreError>;

    async fn list_prizes(&self) -> Result<Vec<Prize>, StoreError>;

    async fn load_assignments(&self) -> Result<Vec<PrizeAssignment>, StoreError>;

    async fn save_assignments(&self, assignments: &[PrizeAssignment]) -> Result<(), StoreError>;

    /// Records a new single-winner draw. The winner starts out present.
    async fn create_winner(&self, entry_id: Uuid, prize_id: Option<Uuid>, position: u32) -> Result<Winner, StoreError>;

    async fn update_winner_status(&self, winner_id: Uuid, status: WinnerStatus) -> Result<(), StoreError>;

    /// Returns the number of draws removed
    async fn delete_all_draws(&self) -> Result<u64, StoreError>;

    async fn list_draws(&self) -> Result<Vec<Draw>, StoreError>;
}
