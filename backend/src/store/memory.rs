use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use shared::shared_draw::{Draw, Entry, Prize, PrizeAssignment, Winner, WinnerStatus};
use uuid::Uuid;

use super::{DrawStore, StoreError, StoreOperation};

#[derive(Debug, Default)]
struct Tables {
    entries: Vec<Entry>,
    prizes: Vec<Prize>,
    assignments: Vec<PrizeAssignment>,
    draws: Vec<Draw>,
}

/// In-process store used by the CLI and the tests. Writes can be made to fail
/// on demand to exercise rollback paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: Mutex<HashSet<StoreOperation>>,
}

impl MemoryStore {
    pub fn new(entries: Vec<Entry>, prizes: Vec<Prize>, assignments: Vec<PrizeAssignment>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                entries,
                prizes,
                assignments,
                draws: Vec::new(),
            }),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Makes every call of `operation` fail until [`recover`](Self::recover).
    pub fn fail_on(&self, operation: StoreOperation) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(operation);
        }
    }

    pub fn recover(&self, operation: StoreOperation) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.remove(&operation);
        }
    }

    /// Prize deletion happens outside the draw engine; assignments are left
    /// dangling on purpose so the session has something to purge.
    pub fn remove_prize(&self, prize_id: Uuid) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.prizes.retain(|p| p.id != prize_id);
        }
    }

    pub fn add_entry(&self, entry: Entry) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.entries.push(entry);
        }
    }

    fn open(&self, operation: StoreOperation) -> Result<MutexGuard<'_, Tables>, StoreError> {
        let failing = self
            .failing
            .lock()
            .map_err(|_| StoreError::new(operation, "store lock poisoned"))?;
        if failing.contains(&operation) {
            log::error!("Simulated failure for {}", operation);
            return Err(StoreError::new(operation, "simulated failure"));
        }
        drop(failing);

        self.tables
            .lock()
            .map_err(|_| StoreError::new(operation, "store lock poisoned"))
    }
}

impl DrawStore for MemoryStore {
    async fn list_available_entries(&self, exclude_previous_winners: bool) -> Result<Vec<Entry>, StoreError> {
        let tables = self.open(StoreOperation::ListEntries)?;
        if !exclude_previous_winners {
            return Ok(tables.entries.clone());
        }

        let drawn: HashSet<Uuid> = tables
            .draws
            .iter()
            .flat_map(|d| d.winners.iter().map(|w| w.entry_id))
            .collect();
        Ok(tables
            .entries
            .iter()
            .filter(|e| !drawn.contains(&e.id))
            .cloned()
            .collect())
    }

    async fn list_prizes(&self) -> Result<Vec<Prize>, StoreError> {
        Ok(self.open(StoreOperation::ListPrizes)?.prizes.clone())
    }

    async fn load_assignments(&self) -> Result<Vec<PrizeAssignment>, StoreError> {
        Ok(self.open(StoreOperation::LoadAssignments)?.assignments.clone())
    }

    async fn save_assignments(&self, assignments: &[PrizeAssignment]) -> Result<(), StoreError> {
        let mut tables = self.open(StoreOperation::SaveAssignments)?;
        tables.assignments = assignments.to_vec();
        log::debug!("Saved {} prize assignment(s)", assignments.len());
        Ok(())
    }

    async fn create_winner(&self, entry_id: Uuid, prize_id: Option<Uuid>, position: u32) -> Result<Winner, StoreError> {
        let mut tables = self.open(StoreOperation::CreateWinner)?;
        if !tables.entries.iter().any(|e| e.id == entry_id) {
            return Err(StoreError::new(
                StoreOperation::CreateWinner,
                format!("unknown entry {}", entry_id),
            ));
        }

        let draw_id = Uuid::new_v4();
        let winner = Winner {
            id: Uuid::new_v4(),
            draw_id,
            entry_id,
            prize_id,
            position,
            status: WinnerStatus::Present,
        };
        tables.draws.push(Draw {
            id: draw_id,
            created_at: Utc::now(),
            winners: vec![winner.clone()],
        });
        Ok(winner)
    }

    async fn update_winner_status(&self, winner_id: Uuid, status: WinnerStatus) -> Result<(), StoreError> {
        let mut tables = self.open(StoreOperation::UpdateWinnerStatus)?;
        let winner = tables
            .draws
            .iter_mut()
            .flat_map(|d| d.winners.iter_mut())
            .find(|w| w.id == winner_id)
            .ok_or_else(|| {
                StoreError::new(
                    StoreOperation::UpdateWinnerStatus,
                    format!("unknown winner {}", winner_id),
                )
            })?;
        winner.status = status;
        Ok(())
    }

    async fn delete_all_draws(&self) -> Result<u64, StoreError> {
        let mut tables = self.open(StoreOperation::DeleteAllDraws)?;
        let deleted = tables.draws.len() as u64;
        tables.draws.clear();
        log::info!("Deleted {} draw(s)", deleted);
        Ok(deleted)
    }

    async fn list_draws(&self) -> Result<Vec<Draw>, StoreError> {
        Ok(self.open(StoreOperation::ListDraws)?.draws.clone())
    }
}
