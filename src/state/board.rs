//! Cached enrollment boards with two-phase optimistic updates.

use std::collections::{HashMap, HashSet};

use dashmap::DashMap;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::dao::models::{EnrollmentEntity, EnrollmentPatch};

/// Unique identifier of a pending optimistic update.
pub type PlanId = Uuid;

/// Errors that can occur when planning an optimistic update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// The match board is not cached.
    UnknownBoard(Uuid),
    /// The enrollment is not part of the board.
    UnknownEnrollment(Uuid),
    /// Another update of the same enrollment has not been committed or rolled back yet.
    AlreadyPending(Uuid),
}

/// Errors that can occur when committing an optimistic update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// The match board is not cached anymore.
    UnknownBoard(Uuid),
    /// No pending update carries this id.
    UnknownPlan(PlanId),
}

/// Errors that can occur when rolling back an optimistic update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackError {
    /// The match board is not cached anymore.
    UnknownBoard(Uuid),
    /// No pending update carries this id.
    UnknownPlan(PlanId),
}

/// A tentative update that has been applied to the cache but not confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Unique identifier for this plan.
    pub id: PlanId,
    /// Match whose board was touched.
    pub match_id: Uuid,
    /// Value currently shown for the enrollment.
    pub tentative: EnrollmentEntity,
}

/// Snapshot of one cached board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// Enrollments in registration order, tentative values included.
    pub enrollments: Vec<EnrollmentEntity>,
    /// Incremented on every change of the board.
    pub version: usize,
    /// Number of updates waiting for the backend.
    pub pending: usize,
}

#[derive(Debug, Clone)]
struct PendingPatch {
    enrollment_id: Uuid,
    before: EnrollmentEntity,
}

#[derive(Debug, Clone, Default)]
struct Board {
    enrollments: IndexMap<Uuid, EnrollmentEntity>,
    version: usize,
    pending: HashMap<PlanId, PendingPatch>,
}

impl Board {
    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            enrollments: self.enrollments.values().cloned().collect(),
            version: self.version,
            pending: self.pending.len(),
        }
    }
}

/// Boards of every match that has been read recently, keyed by match id.
#[derive(Debug, Default)]
pub struct BoardLedger {
    boards: DashMap<Uuid, Board>,
}

impl BoardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached enrollments of a match with freshly fetched ones.
    ///
    /// Enrollments with a pending update keep their tentative value; pending updates of
    /// enrollments that disappeared are dropped.
    pub fn replace(&self, match_id: Uuid, enrollments: Vec<EnrollmentEntity>) -> BoardSnapshot {
        let mut board = self.boards.entry(match_id).or_default();
        let pending: HashSet<Uuid> = board.pending.values().map(|p| p.enrollment_id).collect();

        let mut next = IndexMap::with_capacity(enrollments.len());
        for enrollment in enrollments {
            let shown = if pending.contains(&enrollment.id) {
                board
                    .enrollments
                    .get(&enrollment.id)
                    .cloned()
                    .unwrap_or(enrollment)
            } else {
                enrollment
            };
            next.insert(shown.id, shown);
        }

        board
            .pending
            .retain(|_, patch| next.contains_key(&patch.enrollment_id));
        board.enrollments = next;
        board.version += 1;
        board.snapshot()
    }

    pub fn snapshot(&self, match_id: Uuid) -> Option<BoardSnapshot> {
        self.boards.get(&match_id).map(|board| board.snapshot())
    }

    /// Apply `patch` to the cached enrollment and remember its previous value.
    pub fn plan(
        &self,
        match_id: Uuid,
        enrollment_id: Uuid,
        patch: &EnrollmentPatch,
    ) -> Result<Plan, PlanError> {
        let mut board = self
            .boards
            .get_mut(&match_id)
            .ok_or(PlanError::UnknownBoard(match_id))?;

        if board
            .pending
            .values()
            .any(|pending| pending.enrollment_id == enrollment_id)
        {
            return Err(PlanError::AlreadyPending(enrollment_id));
        }

        let entry = board
            .enrollments
            .get_mut(&enrollment_id)
            .ok_or(PlanError::UnknownEnrollment(enrollment_id))?;
        let before = entry.clone();
        patch.apply_to(entry);
        let tentative = entry.clone();

        let id = Uuid::new_v4();
        board.pending.insert(
            id,
            PendingPatch {
                enrollment_id,
                before,
            },
        );
        board.version += 1;

        Ok(Plan {
            id,
            match_id,
            tentative,
        })
    }

    /// Replace the tentative value with the row confirmed by the backend.
    pub fn commit(
        &self,
        match_id: Uuid,
        plan_id: PlanId,
        confirmed: EnrollmentEntity,
    ) -> Result<(), CommitError> {
        let mut board = self
            .boards
            .get_mut(&match_id)
            .ok_or(CommitError::UnknownBoard(match_id))?;
        let pending = board
            .pending
            .remove(&plan_id)
            .ok_or(CommitError::UnknownPlan(plan_id))?;

        board.enrollments.insert(pending.enrollment_id, confirmed);
        board.version += 1;
        Ok(())
    }

    /// Restore the value the enrollment had before the plan, returning it.
    pub fn rollback(
        &self,
        match_id: Uuid,
        plan_id: PlanId,
    ) -> Result<EnrollmentEntity, RollbackError> {
        let mut board = self
            .boards
            .get_mut(&match_id)
            .ok_or(RollbackError::UnknownBoard(match_id))?;
        let pending = board
            .pending
            .remove(&plan_id)
            .ok_or(RollbackError::UnknownPlan(plan_id))?;

        board
            .enrollments
            .insert(pending.enrollment_id, pending.before.clone());
        board.version += 1;
        Ok(pending.before)
    }

    /// Forget the cached board of a match.
    pub fn invalidate(&self, match_id: Uuid) {
        self.boards.remove(&match_id);
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn enrollment(match_id: Uuid) -> EnrollmentEntity {
        EnrollmentEntity {
            id: Uuid::new_v4(),
            match_id,
            player_id: Uuid::new_v4(),
            paid: false,
            paid_at: None,
            is_present: false,
            team_assignment: None,
            is_excluded: false,
            created_at: datetime!(2026-01-01 0:00 UTC),
        }
    }

    fn paid() -> EnrollmentPatch {
        EnrollmentPatch {
            paid: Some(true),
            ..EnrollmentPatch::default()
        }
    }

    #[test]
    fn plan_applies_tentatively_and_rollback_restores() {
        let ledger = BoardLedger::new();
        let match_id = Uuid::new_v4();
        let original = enrollment(match_id);
        ledger.replace(match_id, vec![original.clone()]);

        let plan = ledger.plan(match_id, original.id, &paid()).unwrap();
        assert!(plan.tentative.paid);
        let snapshot = ledger.snapshot(match_id).unwrap();
        assert!(snapshot.enrollments[0].paid);
        assert_eq!(snapshot.pending, 1);

        let restored = ledger.rollback(match_id, plan.id).unwrap();
        assert_eq!(restored, original);
        let snapshot = ledger.snapshot(match_id).unwrap();
        assert_eq!(snapshot.enrollments, vec![original]);
        assert_eq!(snapshot.pending, 0);
    }

    #[test]
    fn commit_installs_the_confirmed_row() {
        let ledger = BoardLedger::new();
        let match_id = Uuid::new_v4();
        let original = enrollment(match_id);
        ledger.replace(match_id, vec![original.clone()]);

        let plan = ledger.plan(match_id, original.id, &paid()).unwrap();
        let mut confirmed = plan.tentative.clone();
        confirmed.paid_at = Some(datetime!(2026-01-02 10:00 UTC));
        ledger.commit(match_id, plan.id, confirmed.clone()).unwrap();

        assert_eq!(ledger.snapshot(match_id).unwrap().enrollments, vec![confirmed]);
        assert_eq!(
            ledger.rollback(match_id, plan.id),
            Err(RollbackError::UnknownPlan(plan.id))
        );
    }

    #[test]
    fn second_plan_on_the_same_enrollment_is_rejected() {
        let ledger = BoardLedger::new();
        let match_id = Uuid::new_v4();
        let first = enrollment(match_id);
        let second = enrollment(match_id);
        ledger.replace(match_id, vec![first.clone(), second.clone()]);

        ledger.plan(match_id, first.id, &paid()).unwrap();
        assert_eq!(
            ledger.plan(match_id, first.id, &paid()),
            Err(PlanError::AlreadyPending(first.id))
        );
        assert!(ledger.plan(match_id, second.id, &paid()).is_ok());
    }

    #[test]
    fn plan_needs_a_cached_board_and_enrollment() {
        let ledger = BoardLedger::new();
        let match_id = Uuid::new_v4();
        let missing = Uuid::new_v4();
        assert_eq!(
            ledger.plan(match_id, missing, &paid()),
            Err(PlanError::UnknownBoard(match_id))
        );

        ledger.replace(match_id, Vec::new());
        assert_eq!(
            ledger.plan(match_id, missing, &paid()),
            Err(PlanError::UnknownEnrollment(missing))
        );

        ledger.invalidate(match_id);
        assert!(ledger.snapshot(match_id).is_none());
    }

    #[test]
    fn replace_keeps_tentative_values_of_pending_updates() {
        let ledger = BoardLedger::new();
        let match_id = Uuid::new_v4();
        let kept = enrollment(match_id);
        let gone = enrollment(match_id);
        ledger.replace(match_id, vec![kept.clone(), gone.clone()]);

        let kept_plan = ledger.plan(match_id, kept.id, &paid()).unwrap();
        let gone_plan = ledger.plan(match_id, gone.id, &paid()).unwrap();

        let snapshot = ledger.replace(match_id, vec![kept.clone()]);
        assert_eq!(snapshot.enrollments.len(), 1);
        assert!(snapshot.enrollments[0].paid);
        assert_eq!(snapshot.pending, 1);

        assert_eq!(
            ledger.rollback(match_id, gone_plan.id),
            Err(RollbackError::UnknownPlan(gone_plan.id))
        );
        assert_eq!(ledger.rollback(match_id, kept_plan.id).unwrap(), kept);
    }
}
