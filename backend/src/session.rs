use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::prize_sequencer::{Advance, PrizeSequencer, SequencerState};
use shared::roulette::{compute_stop_target, AnimationClock, AnimationPlan, SpinSettings, Track};
use shared::seeded_rng::{hash_seed, SeededRng};
use shared::selector::select_without_replacement;
use shared::shared_draw::*;
use shared::validation::{purge_assignments, validate_assignment_count, validate_pool_size};
use uuid::Uuid;

use crate::error::{DrawError, ValidationIssue};
use crate::observer::DrawObserver;
use crate::store::DrawStore;

#[derive(Debug, Clone, Default)]
pub struct DrawOptions {
    /// Makes winner selection reproducible
    pub seed: Option<String>,
    pub exclude_previous_winners: bool,
}

#[derive(Debug, Clone)]
struct PendingWinner {
    winner: Winner,
    entry_id: Uuid,
}

#[derive(Debug, Clone)]
struct SessionState {
    pool: Vec<Entry>,
    prizes: Vec<Prize>,
    sequencer: PrizeSequencer,
    rng: SeededRng,
    pending: Option<PendingWinner>,
}

impl SessionState {
    fn prize(&self, prize_id: Option<Uuid>) -> Option<Prize> {
        prize_id.and_then(|id| self.prizes.iter().find(|p| p.id == id).cloned())
    }
}

/// Drives one draw from the first spin to the last prize.
///
/// Nothing in the in-memory state changes unless the matching store write
/// succeeded, so a failed call can simply be retried.
pub struct DrawSession<S, O> {
    store: S,
    observer: O,
    settings: SpinSettings,
    options: DrawOptions,
    state: Option<SessionState>,
    clock: AnimationClock,
    spin_rng: StdRng,
}

impl<S: DrawStore, O: DrawObserver> DrawSession<S, O> {
    pub fn new(store: S, observer: O, settings: SpinSettings, options: DrawOptions) -> Self {
        let spin_rng = match &options.seed {
            Some(seed) => StdRng::seed_from_u64(hash_seed(seed) as u64),
            None => StdRng::from_entropy(),
        };
        Self {
            store,
            observer,
            settings,
            options,
            state: None,
            clock: AnimationClock::new(0.0),
            spin_rng,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn settings(&self) -> &SpinSettings {
        &self.settings
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    /// Clock and observer together, for whoever runs the animation frames.
    pub fn animation_parts(&mut self) -> (&mut AnimationClock, &mut O) {
        (&mut self.clock, &mut self.observer)
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn available_pool(&self) -> &[Entry] {
        self.state.as_ref().map(|s| s.pool.as_slice()).unwrap_or(&[])
    }

    pub fn progress(&self) -> SessionProgress {
        let Some(state) = &self.state else {
            return SessionProgress::idle();
        };

        let phase = match state.sequencer.state() {
            SequencerState::AwaitingConfirmation { .. } => SessionPhase::AwaitingConfirmation,
            SequencerState::AwaitingDraw { .. } => SessionPhase::AwaitingDraw,
            SequencerState::NotConfigured | SequencerState::Completed => SessionPhase::Idle,
        };
        SessionProgress {
            phase,
            prize: state.prize(state.sequencer.current_prize_id()),
            remaining: state.sequencer.remaining(),
            pool_size: state.pool.len(),
            winners_confirmed: state.sequencer.winners_confirmed(),
            winners_required: state.sequencer.winners_required(),
        }
    }

    /// Opens a session when idle; a running session is left as it is.
    pub async fn start_or_continue_session(&mut self) -> Result<SessionProgress, DrawError> {
        if self.state.is_none() {
            let opened = self.open_session().await;
            let state = self.report(opened)?;
            tracing::info!(
                "Draw session started: {} entries, {} winner(s) to draw",
                state.pool.len(),
                state.sequencer.winners_required()
            );
            self.state = Some(state);
        }
        Ok(self.progress())
    }

    async fn open_session(&self) -> Result<SessionState, DrawError> {
        let prizes = self.store.list_prizes().await?;
        let stored = self.store.load_assignments().await?;
        let assignments = purge_assignments(&stored, &prizes);
        if assignments.len() != stored.len() {
            self.store.save_assignments(&assignments).await?;
        }

        let sequencer = PrizeSequencer::new(assignments);
        let pool = self
            .store
            .list_available_entries(self.options.exclude_previous_winners)
            .await?;

        let required = sequencer.winners_required();
        validate_pool_size(required, pool.len()).map_err(|e| {
            if e.code == "no_assignments" {
                ValidationIssue::NoAssignments
            } else {
                ValidationIssue::NotEnoughEntries {
                    required,
                    available: pool.len(),
                }
            }
        })?;

        Ok(SessionState {
            pool,
            prizes,
            sequencer,
            rng: SeededRng::new(self.options.seed.as_deref()),
            pending: None,
        })
    }

    /// Picks the next winner and works out where the roulette has to stop.
    /// The sequencer does not move until the winner is confirmed.
    pub async fn draw_next_winner(&mut self) -> Result<DrawOutcome, DrawError> {
        let result = self.try_draw().await;
        let outcome = self.report(result)?;

        tracing::info!(
            "Drew {} (entry {} of {})",
            outcome.entry.name,
            outcome.winner_index + 1,
            outcome.pool_size
        );
        self.observer.on_winner_selected(&outcome);
        Ok(outcome)
    }

    async fn try_draw(&mut self) -> Result<DrawOutcome, DrawError> {
        let opened = match self.state {
            Some(_) => None,
            None => Some(self.open_session().await?),
        };
        let Some(current) = opened.as_ref().or(self.state.as_ref()) else {
            return Err(ValidationIssue::NoAssignments.into());
        };

        // work on copies; commit only after the winner is stored
        let mut sequencer = current.sequencer.clone();
        let mut rng = current.rng.clone();
        let mut spin_rng = self.spin_rng.clone();
        sequencer.begin_draw()?;

        if current.pool.is_empty() {
            return Err(ValidationIssue::NotEnoughEntries {
                required: sequencer.remaining(),
                available: 0,
            }
            .into());
        }

        let entry = select_without_replacement(&current.pool, 1, &mut rng)?
            .into_iter()
            .next()
            .ok_or(ValidationIssue::NotEnoughEntries {
                required: sequencer.remaining(),
                available: current.pool.len(),
            })?;
        let winner_index = current
            .pool
            .iter()
            .position(|e| e.id == entry.id)
            .ok_or(ValidationIssue::UnknownWinner(entry.id))?;

        let pool_size = current.pool.len();
        let layout = self.settings.layout;
        let track = Track::new(layout, pool_size, &self.settings)?;
        let target = compute_stop_target(
            winner_index,
            pool_size,
            layout,
            self.clock.offset(),
            &self.settings,
            &mut spin_rng,
        )?;
        let plan = AnimationPlan::new(track, target, &self.settings);

        let prize_id = sequencer.current_prize_id();
        let prize = current.prize(prize_id);
        let winner = self.store.create_winner(entry.id, prize_id, 1).await?;

        if let Some(state) = opened {
            self.state = Some(state);
        }
        self.spin_rng = spin_rng;
        if let Some(state) = self.state.as_mut() {
            state.sequencer = sequencer;
            state.rng = rng;
            state.pending = Some(PendingWinner {
                winner: winner.clone(),
                entry_id: entry.id,
            });
        }

        self.clock.release(track, self.settings.initial_velocity(layout));
        self.clock.lock_to(plan.clone());

        Ok(DrawOutcome {
            winner,
            entry,
            prize,
            winner_index,
            pool_size,
            animation_plan: plan,
        })
    }

    /// The winner claims the prize: the slot is used up and the entry leaves
    /// the pool.
    pub async fn confirm_present(&mut self, winner_id: Uuid) -> Result<SessionProgress, DrawError> {
        let result = self.confirm(winner_id, WinnerStatus::Present).await;
        self.report(result)
    }

    /// The winner is not here: the entry still leaves the pool, but the same
    /// prize slot is drawn again.
    pub async fn confirm_absent(&mut self, winner_id: Uuid) -> Result<SessionProgress, DrawError> {
        let result = self.confirm(winner_id, WinnerStatus::NotPresent).await;
        self.report(result)
    }

    async fn confirm(&mut self, winner_id: Uuid, status: WinnerStatus) -> Result<SessionProgress, DrawError> {
        let state = self.state.as_ref().ok_or(ValidationIssue::NothingToConfirm)?;
        let pending = state.pending.as_ref().ok_or(ValidationIssue::NothingToConfirm)?;
        if pending.winner.id != winner_id {
            return Err(ValidationIssue::UnknownWinner(winner_id).into());
        }
        let entry_id = pending.entry_id;

        let mut sequencer = state.sequencer.clone();
        let advance = sequencer.confirm(status)?;

        self.store.update_winner_status(winner_id, status).await?;
        if advance == Advance::Completed {
            self.store.save_assignments(&[]).await?;
        }

        if let Some(state) = self.state.as_mut() {
            state.sequencer = sequencer;
            state.pool.retain(|e| e.id != entry_id);
            state.pending = None;
        }

        match advance {
            Advance::Completed => {
                tracing::info!("Draw session completed");
                self.state = None;
                self.observer.on_session_completed();
            }
            Advance::NextPrize(index) => tracing::info!("Moving on to prize assignment {}", index + 1),
            Advance::Stay if status == WinnerStatus::NotPresent => {
                tracing::info!("Winner {} not present, redrawing the same prize", winner_id)
            }
            Advance::Stay => {}
        }
        Ok(self.progress())
    }

    /// Wipes the draw history and goes back to idle. The next session starts
    /// from the full entry list.
    pub async fn reset_all_draws(&mut self) -> Result<u64, DrawError> {
        let result = self.store.delete_all_draws().await.map_err(DrawError::from);
        let deleted = self.report(result)?;

        self.state = None;
        self.clock = AnimationClock::new(self.clock.offset());
        tracing::info!("Reset draw history ({} draw(s) removed)", deleted);
        Ok(deleted)
    }

    pub async fn history(&self) -> Result<Vec<Draw>, DrawError> {
        Ok(self.store.list_draws().await?)
    }

    /// Replaces the prize assignments. Only allowed between sessions.
    pub async fn set_assignments(&mut self, assignments: Vec<PrizeAssignment>) -> Result<(), DrawError> {
        let result = self.try_set_assignments(assignments).await;
        self.report(result)
    }

    async fn try_set_assignments(&self, assignments: Vec<PrizeAssignment>) -> Result<(), DrawError> {
        if self.state.is_some() {
            return Err(ValidationIssue::SessionLocked.into());
        }

        let prizes = self.store.list_prizes().await?;
        for assignment in &assignments {
            if validate_assignment_count(assignment.count).is_err() {
                return Err(ValidationIssue::InvalidCount(assignment.count).into());
            }
            if !prizes.iter().any(|p| p.id == assignment.prize_id) {
                return Err(ValidationIssue::InvalidPrize(assignment.prize_id).into());
            }
        }
        Ok(self.store.save_assignments(&assignments).await?)
    }

    /// Moves the assignment at `from` to position `to` (drag-reorder).
    pub async fn reorder_assignment(&mut self, from: usize, to: usize) -> Result<Vec<PrizeAssignment>, DrawError> {
        let result = self.try_reorder(from, to).await;
        self.report(result)
    }

    async fn try_reorder(&self, from: usize, to: usize) -> Result<Vec<PrizeAssignment>, DrawError> {
        if self.state.is_some() {
            return Err(ValidationIssue::SessionLocked.into());
        }

        let mut assignments = self.store.load_assignments().await?;
        let len = assignments.len();
        for index in [from, to] {
            if index >= len {
                return Err(ValidationIssue::AssignmentOutOfRange { index, len }.into());
            }
        }

        let moved = assignments.remove(from);
        assignments.insert(to, moved);
        self.store.save_assignments(&assignments).await?;
        Ok(assignments)
    }

    /// Call whenever prizes were created, edited or deleted elsewhere.
    /// Purges assignments pointing at deleted prizes, in the store and in a
    /// running session. Returns how many assignments were dropped.
    pub async fn prizes_changed(&mut self) -> Result<usize, DrawError> {
        let result = self.purge_orphans().await;
        self.report(result)
    }

    async fn purge_orphans(&mut self) -> Result<usize, DrawError> {
        let prizes = self.store.list_prizes().await?;
        let stored = self.store.load_assignments().await?;
        let kept = purge_assignments(&stored, &prizes);
        let removed = stored.len() - kept.len();
        if removed > 0 {
            self.store.save_assignments(&kept).await?;
        }

        // a drawn winner whose prize is gone cannot be confirmed for another prize
        let voided = self
            .state
            .as_ref()
            .and_then(|s| s.pending.as_ref())
            .filter(|p| p.winner.prize_id.is_some_and(|id| !prizes.iter().any(|x| x.id == id)))
            .map(|p| p.winner.id);
        if let Some(winner_id) = voided {
            self.store
                .update_winner_status(winner_id, WinnerStatus::NotPresent)
                .await?;
            tracing::info!("Prize of winner {} was deleted, the draw is void", winner_id);
        }

        let mut finished = false;
        if let Some(state) = self.state.as_mut() {
            if voided.is_some() {
                state.pending = None;
            }
            state.sequencer.retain_prizes(&prizes);
            state.prizes = prizes;
            // nothing left to draw for
            finished = matches!(
                state.sequencer.state(),
                SequencerState::Completed | SequencerState::NotConfigured
            );
        }
        if finished {
            tracing::info!("No prize assignments left, ending draw session");
            self.state = None;
            self.observer.on_session_completed();
        }
        Ok(removed)
    }

    fn report<T>(&mut self, result: Result<T, DrawError>) -> Result<T, DrawError> {
        if let Err(err) = &result {
            match err {
                DrawError::Validation(issue) => {
                    tracing::warn!("Draw rejected: {}", issue);
                    self.observer.on_validation_error(&issue.to_string());
                }
                DrawError::Persistence(e) => tracing::warn!("Store failure, session unchanged: {}", e),
                e if e.is_invariant_violation() => tracing::error!("❌ Draw engine invariant broken: {}", e),
                _ => {}
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreOperation};
    use shared::roulette::Layout;

    #[derive(Debug, Default)]
    struct Recorder {
        selected: Vec<Uuid>,
        completed: usize,
        errors: Vec<String>,
    }

    impl DrawObserver for Recorder {
        fn on_winner_selected(&mut self, outcome: &DrawOutcome) {
            self.selected.push(outcome.entry.id);
        }

        fn on_session_completed(&mut self) {
            self.completed += 1;
        }

        fn on_validation_error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
    }

    fn entries(n: usize) -> Vec<Entry> {
        (1..=n).map(|i| Entry::new(format!("E{}", i))).collect()
    }

    fn session(
        entries: Vec<Entry>,
        prizes: Vec<Prize>,
        assignments: Vec<PrizeAssignment>,
        seed: &str,
    ) -> DrawSession<MemoryStore, Recorder> {
        let store = MemoryStore::new(entries, prizes, assignments);
        let options = DrawOptions {
            seed: Some(seed.to_string()),
            exclude_previous_winners: false,
        };
        DrawSession::new(store, Recorder::default(), SpinSettings::default(), options)
    }

    #[tokio::test]
    async fn test_seeded_scenario_runs_to_completion() {
        let pool = entries(5);
        let prize = Prize::new("PrizeX");
        let mut s = session(pool.clone(), vec![prize.clone()], vec![PrizeAssignment::new(prize.id, 2)], "test");

        let first = s.draw_next_winner().await.unwrap();
        assert_eq!(first.entry, pool[3]);
        assert_eq!(first.winner_index, 3);
        assert_eq!(first.prize, Some(prize.clone()));

        let progress = s.confirm_present(first.winner.id).await.unwrap();
        assert_eq!(progress.remaining, 1);
        assert_eq!(progress.pool_size, 4);

        let second = s.draw_next_winner().await.unwrap();
        assert_eq!(second.entry, pool[2]);
        assert_ne!(second.entry, first.entry);

        s.confirm_present(second.winner.id).await.unwrap();
        assert!(!s.is_active());
        assert_eq!(s.observer().completed, 1);
        assert!(s.store().load_assignments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_absent_keeps_prize_slot_and_consumes_entry() {
        let prize = Prize::new("A");
        let mut s = session(entries(3), vec![prize.clone()], vec![PrizeAssignment::new(prize.id, 1)], "absent");

        let outcome = s.draw_next_winner().await.unwrap();
        let progress = s.confirm_absent(outcome.winner.id).await.unwrap();
        assert_eq!(progress.phase, SessionPhase::AwaitingDraw);
        assert_eq!(progress.remaining, 1);
        assert_eq!(progress.prize, Some(prize));
        assert_eq!(progress.pool_size, 2);
        assert!(s.available_pool().iter().all(|e| e.id != outcome.entry.id));

        let draws = s.history().await.unwrap();
        assert_eq!(draws[0].winners[0].status, WinnerStatus::NotPresent);
    }

    #[tokio::test]
    async fn test_advances_between_prizes() {
        let a = Prize::new("A");
        let b = Prize::new("B");
        let assignments = vec![PrizeAssignment::new(a.id, 2), PrizeAssignment::new(b.id, 1)];
        let mut s = session(entries(6), vec![a.clone(), b.clone()], assignments, "advance");

        for _ in 0..2 {
            let outcome = s.draw_next_winner().await.unwrap();
            assert_eq!(outcome.prize.as_ref(), Some(&a));
            s.confirm_present(outcome.winner.id).await.unwrap();
        }
        let progress = s.progress();
        assert_eq!(progress.prize, Some(b.clone()));
        assert_eq!(progress.remaining, 1);
        assert_eq!(progress.winners_confirmed, 2);

        let last = s.draw_next_winner().await.unwrap();
        assert_eq!(last.prize, Some(b));
        s.confirm_present(last.winner.id).await.unwrap();
        assert_eq!(s.progress().phase, SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_no_assignments_is_validation_error() {
        let mut s = session(entries(3), Vec::new(), Vec::new(), "none");
        let err = s.draw_next_winner().await.unwrap_err();
        assert_eq!(err, DrawError::Validation(ValidationIssue::NoAssignments));
        assert_eq!(s.observer().errors.len(), 1);
        assert!(!s.is_active());
    }

    #[tokio::test]
    async fn test_not_enough_entries() {
        let prize = Prize::new("A");
        let mut s = session(entries(2), vec![prize.clone()], vec![PrizeAssignment::new(prize.id, 3)], "few");
        let err = s.start_or_continue_session().await.unwrap_err();
        assert_eq!(
            err,
            DrawError::Validation(ValidationIssue::NotEnoughEntries { required: 3, available: 2 })
        );
    }

    #[tokio::test]
    async fn test_orphaned_assignments_purged_on_start() {
        let prize = Prize::new("A");
        let ghost = Uuid::new_v4();
        let assignments = vec![PrizeAssignment::new(ghost, 1), PrizeAssignment::new(prize.id, 1)];
        let mut s = session(entries(2), vec![prize.clone()], assignments, "purge");

        let progress = s.start_or_continue_session().await.unwrap();
        assert_eq!(progress.winners_required, 1);
        assert_eq!(
            s.store().load_assignments().await.unwrap(),
            vec![PrizeAssignment::new(prize.id, 1)]
        );
    }

    #[tokio::test]
    async fn test_second_draw_rejected_until_confirmed() {
        let prize = Prize::new("A");
        let mut s = session(entries(4), vec![prize.clone()], vec![PrizeAssignment::new(prize.id, 2)], "guard");

        let outcome = s.draw_next_winner().await.unwrap();
        let err = s.draw_next_winner().await.unwrap_err();
        assert_eq!(err, DrawError::Validation(ValidationIssue::DrawPending));
        assert_eq!(s.available_pool().len(), 4);
        assert_eq!(s.observer().selected, vec![outcome.entry.id]);
    }

    #[tokio::test]
    async fn test_failed_winner_write_leaves_state_untouched() {
        let prize = Prize::new("A");
        let mut s = session(entries(5), vec![prize.clone()], vec![PrizeAssignment::new(prize.id, 2)], "test");
        s.start_or_continue_session().await.unwrap();

        s.store().fail_on(StoreOperation::CreateWinner);
        let err = s.draw_next_winner().await.unwrap_err();
        assert!(matches!(err, DrawError::Persistence(_)));
        assert_eq!(s.progress().phase, SessionPhase::AwaitingDraw);
        assert_eq!(s.available_pool().len(), 5);

        // the rng did not advance, so the retry draws what the first try would have
        s.store().recover(StoreOperation::CreateWinner);
        let outcome = s.draw_next_winner().await.unwrap();
        assert_eq!(outcome.winner_index, 3);
    }

    #[tokio::test]
    async fn test_failed_status_write_does_not_advance() {
        let prize = Prize::new("A");
        let mut s = session(entries(3), vec![prize.clone()], vec![PrizeAssignment::new(prize.id, 1)], "status");
        let outcome = s.draw_next_winner().await.unwrap();

        s.store().fail_on(StoreOperation::UpdateWinnerStatus);
        assert!(s.confirm_present(outcome.winner.id).await.is_err());
        assert!(s.is_active());
        assert_eq!(s.progress().phase, SessionPhase::AwaitingConfirmation);
        assert_eq!(s.available_pool().len(), 3);

        s.store().recover(StoreOperation::UpdateWinnerStatus);
        s.confirm_present(outcome.winner.id).await.unwrap();
        assert!(!s.is_active());
    }

    #[tokio::test]
    async fn test_confirm_unknown_winner() {
        let prize = Prize::new("A");
        let mut s = session(entries(3), vec![prize.clone()], vec![PrizeAssignment::new(prize.id, 1)], "unknown");
        s.draw_next_winner().await.unwrap();

        let stranger = Uuid::new_v4();
        let err = s.confirm_present(stranger).await.unwrap_err();
        assert_eq!(err, DrawError::Validation(ValidationIssue::UnknownWinner(stranger)));
    }

    #[tokio::test]
    async fn test_reset_restores_full_pool() {
        let prize = Prize::new("A");
        let pool = entries(4);
        let mut s = session(pool.clone(), vec![prize.clone()], vec![PrizeAssignment::new(prize.id, 3)], "reset");
        let outcome = s.draw_next_winner().await.unwrap();
        s.confirm_present(outcome.winner.id).await.unwrap();
        assert_eq!(s.available_pool().len(), 3);

        assert_eq!(s.reset_all_draws().await.unwrap(), 1);
        assert!(!s.is_active());
        assert!(!s.clock().is_locked());

        s.start_or_continue_session().await.unwrap();
        assert_eq!(s.available_pool(), pool.as_slice());
    }

    #[tokio::test]
    async fn test_exclude_previous_winners_shrinks_pool() {
        let prize = Prize::new("A");
        let store = MemoryStore::new(entries(4), vec![prize.clone()], vec![PrizeAssignment::new(prize.id, 1)]);
        let options = DrawOptions {
            seed: Some("exclude".into()),
            exclude_previous_winners: true,
        };
        let mut s = DrawSession::new(store, Recorder::default(), SpinSettings::default(), options);

        let outcome = s.draw_next_winner().await.unwrap();
        s.confirm_present(outcome.winner.id).await.unwrap();

        s.set_assignments(vec![PrizeAssignment::new(prize.id, 1)]).await.unwrap();
        s.start_or_continue_session().await.unwrap();
        assert_eq!(s.available_pool().len(), 3);
        assert!(s.available_pool().iter().all(|e| e.id != outcome.entry.id));
    }

    #[tokio::test]
    async fn test_assignments_locked_during_session() {
        let prize = Prize::new("A");
        let mut s = session(entries(3), vec![prize.clone()], vec![PrizeAssignment::new(prize.id, 1)], "lock");
        s.start_or_continue_session().await.unwrap();

        let err = s.set_assignments(vec![PrizeAssignment::new(prize.id, 2)]).await.unwrap_err();
        assert_eq!(err, DrawError::Validation(ValidationIssue::SessionLocked));
        let err = s.reorder_assignment(0, 0).await.unwrap_err();
        assert_eq!(err, DrawError::Validation(ValidationIssue::SessionLocked));
    }

    #[tokio::test]
    async fn test_set_assignments_validates() {
        let prize = Prize::new("A");
        let mut s = session(entries(3), vec![prize.clone()], Vec::new(), "set");

        let ghost = Uuid::new_v4();
        let err = s.set_assignments(vec![PrizeAssignment::new(ghost, 1)]).await.unwrap_err();
        assert_eq!(err, DrawError::Validation(ValidationIssue::InvalidPrize(ghost)));

        let err = s.set_assignments(vec![PrizeAssignment::new(prize.id, 0)]).await.unwrap_err();
        assert_eq!(err, DrawError::Validation(ValidationIssue::InvalidCount(0)));
    }

    #[tokio::test]
    async fn test_reorder_assignments() {
        let a = Prize::new("A");
        let b = Prize::new("B");
        let c = Prize::new("C");
        let assignments = vec![
            PrizeAssignment::new(a.id, 1),
            PrizeAssignment::new(b.id, 1),
            PrizeAssignment::new(c.id, 1),
        ];
        let mut s = session(entries(3), vec![a.clone(), b.clone(), c.clone()], assignments, "order");

        let reordered = s.reorder_assignment(2, 0).await.unwrap();
        let order: Vec<_> = reordered.iter().map(|x| x.prize_id).collect();
        assert_eq!(order, vec![c.id, a.id, b.id]);

        let err = s.reorder_assignment(0, 3).await.unwrap_err();
        assert_eq!(
            err,
            DrawError::Validation(ValidationIssue::AssignmentOutOfRange { index: 3, len: 3 })
        );
    }

    #[tokio::test]
    async fn test_deleted_prize_purged_from_running_session() {
        let a = Prize::new("A");
        let b = Prize::new("B");
        let assignments = vec![PrizeAssignment::new(a.id, 1), PrizeAssignment::new(b.id, 1)];
        let mut s = session(entries(4), vec![a.clone(), b.clone()], assignments, "deleted");
        s.start_or_continue_session().await.unwrap();

        s.store().remove_prize(a.id);
        assert_eq!(s.prizes_changed().await.unwrap(), 1);
        assert_eq!(s.progress().prize, Some(b.clone()));
        assert_eq!(
            s.store().load_assignments().await.unwrap(),
            vec![PrizeAssignment::new(b.id, 1)]
        );

        s.store().remove_prize(b.id);
        s.prizes_changed().await.unwrap();
        assert!(!s.is_active());
        assert_eq!(s.observer().completed, 1);
    }

    #[tokio::test]
    async fn test_deleting_prize_of_pending_winner_voids_the_draw() {
        let a = Prize::new("A");
        let b = Prize::new("B");
        let assignments = vec![PrizeAssignment::new(a.id, 1), PrizeAssignment::new(b.id, 1)];
        let mut s = session(entries(4), vec![a.clone(), b.clone()], assignments, "void");

        let voided = s.draw_next_winner().await.unwrap();
        assert_eq!(voided.prize, Some(a.clone()));

        s.store().remove_prize(a.id);
        s.prizes_changed().await.unwrap();
        let progress = s.progress();
        assert_eq!(progress.phase, SessionPhase::AwaitingDraw);
        assert_eq!(progress.prize, Some(b.clone()));
        assert_eq!(progress.remaining, 1);

        let err = s.confirm_present(voided.winner.id).await.unwrap_err();
        assert_eq!(err, DrawError::Validation(ValidationIssue::NothingToConfirm));
        assert!(s.is_active());

        let outcome = s.draw_next_winner().await.unwrap();
        assert_eq!(outcome.prize, Some(b.clone()));
        s.confirm_present(outcome.winner.id).await.unwrap();
        assert!(!s.is_active());

        let winners: Vec<Winner> = s.history().await.unwrap().into_iter().flat_map(|d| d.winners).collect();
        let first = winners.iter().find(|w| w.id == voided.winner.id).unwrap();
        assert_eq!(first.status, WinnerStatus::NotPresent);
        let for_b: Vec<_> = winners.iter().filter(|w| w.prize_id == Some(b.id)).collect();
        assert_eq!(for_b.len(), 1);
        assert_eq!(for_b[0].status, WinnerStatus::Present);
    }

    #[tokio::test]
    async fn test_deleting_every_prize_with_pending_winner_ends_session() {
        let a = Prize::new("A");
        let mut s = session(entries(3), vec![a.clone()], vec![PrizeAssignment::new(a.id, 1)], "void-all");
        let outcome = s.draw_next_winner().await.unwrap();

        s.store().remove_prize(a.id);
        s.prizes_changed().await.unwrap();
        assert!(!s.is_active());
        assert_eq!(s.observer().completed, 1);

        let draws = s.history().await.unwrap();
        assert_eq!(draws[0].winners[0].id, outcome.winner.id);
        assert_eq!(draws[0].winners[0].status, WinnerStatus::NotPresent);
    }

    #[tokio::test]
    async fn test_failed_void_keeps_pending_winner() {
        let a = Prize::new("A");
        let b = Prize::new("B");
        let assignments = vec![PrizeAssignment::new(a.id, 1), PrizeAssignment::new(b.id, 1)];
        let mut s = session(entries(4), vec![a.clone(), b.clone()], assignments, "void-fail");
        let outcome = s.draw_next_winner().await.unwrap();

        s.store().remove_prize(a.id);
        s.store().fail_on(StoreOperation::UpdateWinnerStatus);
        assert!(matches!(s.prizes_changed().await, Err(DrawError::Persistence(_))));
        assert_eq!(s.progress().phase, SessionPhase::AwaitingConfirmation);
        assert_eq!(s.progress().prize, Some(a));

        s.store().recover(StoreOperation::UpdateWinnerStatus);
        s.prizes_changed().await.unwrap();
        assert_eq!(s.progress().phase, SessionPhase::AwaitingDraw);
        assert_eq!(s.progress().prize, Some(b));
        assert!(s.confirm_present(outcome.winner.id).await.is_err());
    }

    #[tokio::test]
    async fn test_failed_completion_write_keeps_session_open() {
        let prize = Prize::new("A");
        let mut s = session(entries(3), vec![prize.clone()], vec![PrizeAssignment::new(prize.id, 1)], "complete");
        let outcome = s.draw_next_winner().await.unwrap();

        s.store().fail_on(StoreOperation::SaveAssignments);
        let err = s.confirm_present(outcome.winner.id).await.unwrap_err();
        assert!(matches!(err, DrawError::Persistence(_)));
        assert!(s.is_active());
        assert_eq!(s.progress().phase, SessionPhase::AwaitingConfirmation);
        assert_eq!(s.available_pool().len(), 3);
        assert_eq!(s.observer().completed, 0);
        assert_eq!(
            s.store().load_assignments().await.unwrap(),
            vec![PrizeAssignment::new(prize.id, 1)]
        );

        s.store().recover(StoreOperation::SaveAssignments);
        s.confirm_present(outcome.winner.id).await.unwrap();
        assert!(!s.is_active());
        assert_eq!(s.observer().completed, 1);
    }

    #[tokio::test]
    async fn test_failed_absent_write_keeps_entry() {
        let prize = Prize::new("A");
        let mut s = session(entries(3), vec![prize.clone()], vec![PrizeAssignment::new(prize.id, 1)], "absent-fail");
        let outcome = s.draw_next_winner().await.unwrap();

        s.store().fail_on(StoreOperation::UpdateWinnerStatus);
        assert!(s.confirm_absent(outcome.winner.id).await.is_err());
        assert_eq!(s.progress().phase, SessionPhase::AwaitingConfirmation);
        assert_eq!(s.available_pool().len(), 3);

        s.store().recover(StoreOperation::UpdateWinnerStatus);
        let progress = s.confirm_absent(outcome.winner.id).await.unwrap();
        assert_eq!(progress.phase, SessionPhase::AwaitingDraw);
        assert_eq!(progress.pool_size, 2);
    }

    #[tokio::test]
    async fn test_confirm_before_any_draw() {
        let prize = Prize::new("A");
        let mut s = session(entries(3), vec![prize.clone()], vec![PrizeAssignment::new(prize.id, 1)], "early");
        s.start_or_continue_session().await.unwrap();

        let err = s.confirm_present(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err, DrawError::Validation(ValidationIssue::NothingToConfirm));
    }

    #[tokio::test]
    async fn test_failed_winner_write_keeps_spin_sequence() {
        let prize = Prize::new("A");
        let assignments = vec![PrizeAssignment::new(prize.id, 1)];
        let mut failing = session(entries(5), vec![prize.clone()], assignments.clone(), "spins");
        let mut clean = session(entries(5), vec![prize.clone()], assignments, "spins");

        failing.store().fail_on(StoreOperation::CreateWinner);
        assert!(failing.draw_next_winner().await.is_err());
        failing.store().recover(StoreOperation::CreateWinner);

        let retried = failing.draw_next_winner().await.unwrap();
        let expected = clean.draw_next_winner().await.unwrap();
        assert_eq!(retried.winner_index, expected.winner_index);
        assert_eq!(retried.animation_plan.target, expected.animation_plan.target);
    }

    #[tokio::test]
    async fn test_animation_lands_on_drawn_entry() {
        let prize = Prize::new("A");
        for layout in [Layout::Vertical, Layout::Wheel] {
            let store = MemoryStore::new(entries(7), vec![prize.clone()], vec![PrizeAssignment::new(prize.id, 3)]);
            let settings = SpinSettings {
                layout,
                ..SpinSettings::default()
            };
            let options = DrawOptions {
                seed: Some("landing".into()),
                exclude_previous_winners: false,
            };
            let mut s = DrawSession::new(store, Recorder::default(), settings, options);

            for _ in 0..3 {
                let outcome = s.draw_next_winner().await.unwrap();
                let plan = &outcome.animation_plan;
                assert_eq!(plan.track.index_at(plan.target.final_offset), outcome.winner_index);
                assert!(s.clock().is_locked());
                assert_eq!(s.clock().offset(), plan.target.start_offset);

                let (clock, _) = s.animation_parts();
                clock.tick(plan.duration());
                assert_eq!(s.clock().index_at_marker(), Some(outcome.winner_index));
                s.confirm_present(outcome.winner.id).await.unwrap();
            }
        }
    }
}
