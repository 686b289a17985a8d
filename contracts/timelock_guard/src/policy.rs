//! Time-lock, expiry and quorum policy.
//!
//! Everything here is derived from stored fields and the ledger clock; the
//! contract never persists a status.

use soroban_sdk::{Address, Env, Vec};

use crate::error::TimelockError;
use crate::storage;
use crate::types::{EngineConfig, Proposal, ProposalStatus, MAX_DELAY};

/// Maturation time for a delay requested at `now`.
pub fn maturation_time(now: u64, delay: u64, min_delay: u64) -> Result<u64, TimelockError> {
    if delay < min_delay || delay > MAX_DELAY {
        return Err(TimelockError::PolicyViolation);
    }
    now.checked_add(delay)
        .ok_or(TimelockError::PolicyViolation)
}

/// Execution window of a proposal: `[eta, deadline]`, both ends inclusive.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Timeline {
    pub eta: u64,
    pub deadline: u64,
}

impl Timeline {
    pub fn new(eta: u64, expiry_window: u64) -> Self {
        Self {
            eta,
            deadline: eta.saturating_add(expiry_window),
        }
    }

    pub fn of(proposal: &Proposal, config: &EngineConfig) -> Self {
        Self::new(proposal.eta, config.expiry_window)
    }

    pub fn is_matured(&self, now: u64) -> bool {
        now >= self.eta
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now > self.deadline
    }
}

/// Approvers whose approval on `proposal` still counts.
///
/// An approval counts only while its approver holds the same membership it
/// had when approving; removal (and any later re-addition) voids it.
pub fn active_approvals(env: &Env, proposal: &Proposal) -> Vec<Address> {
    let mut active = Vec::new(env);
    for approval in proposal.approvals.iter() {
        let counts = storage::get_approver_info(env, &approval.approver)
            .map(|info| info.epoch == approval.epoch)
            .unwrap_or(false);
        if counts {
            active.push_back(approval.approver);
        }
    }
    active
}

pub fn active_approval_count(env: &Env, proposal: &Proposal) -> u32 {
    active_approvals(env, proposal).len()
}

pub fn has_active_approval(env: &Env, proposal: &Proposal, approver: &Address) -> bool {
    active_approvals(env, proposal).contains(approver)
}

pub fn derive_status(
    proposal: &Proposal,
    approvals: u32,
    config: &EngineConfig,
    now: u64,
) -> ProposalStatus {
    if proposal.executed {
        return ProposalStatus::Executed;
    }
    if proposal.cancelled {
        return ProposalStatus::Cancelled;
    }

    let timeline = Timeline::of(proposal, config);
    if timeline.is_expired(now) {
        ProposalStatus::Expired
    } else if approvals < config.threshold {
        ProposalStatus::Pending
    } else if !timeline.is_matured(now) {
        ProposalStatus::Queued
    } else {
        ProposalStatus::Ready
    }
}

/// Check every execution precondition that depends on the proposal itself.
pub fn ensure_executable(
    proposal: &Proposal,
    approvals: u32,
    config: &EngineConfig,
    now: u64,
) -> Result<(), TimelockError> {
    if proposal.is_terminal() {
        return Err(TimelockError::AlreadyFinalized);
    }
    if approvals < config.threshold {
        return Err(TimelockError::QuorumNotReached);
    }

    let timeline = Timeline::of(proposal, config);
    if !timeline.is_matured(now) {
        return Err(TimelockError::NotYetMatured);
    }
    if timeline.is_expired(now) {
        return Err(TimelockError::Expired);
    }
    Ok(())
}

/// Threshold must stay satisfiable by the approver set.
pub fn ensure_quorum_feasible(approvers: u32, threshold: u32) -> Result<(), TimelockError> {
    if threshold == 0 || approvers == 0 || threshold > approvers {
        return Err(TimelockError::PolicyViolation);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maturation_respects_minimum_delay() {
        assert_eq!(maturation_time(1_000, 60, 60), Ok(1_060));
        assert_eq!(
            maturation_time(1_000, 59, 60),
            Err(TimelockError::PolicyViolation)
        );
    }

    #[test]
    fn maturation_rejects_oversized_delay() {
        assert_eq!(
            maturation_time(0, MAX_DELAY + 1, 0),
            Err(TimelockError::PolicyViolation)
        );
        assert_eq!(
            maturation_time(u64::MAX, 1, 0),
            Err(TimelockError::PolicyViolation)
        );
    }

    #[test]
    fn timeline_bounds_are_inclusive() {
        let timeline = Timeline::new(100, 50);
        assert!(!timeline.is_matured(99));
        assert!(timeline.is_matured(100));
        assert!(!timeline.is_expired(150));
        assert!(timeline.is_expired(151));
    }

    #[test]
    fn timeline_saturates_deadline() {
        let timeline = Timeline::new(u64::MAX - 1, 10);
        assert_eq!(timeline.deadline, u64::MAX);
        assert!(!timeline.is_expired(u64::MAX));
    }

    #[test]
    fn quorum_feasibility() {
        assert!(ensure_quorum_feasible(3, 2).is_ok());
        assert!(ensure_quorum_feasible(2, 2).is_ok());
        assert_eq!(
            ensure_quorum_feasible(1, 2),
            Err(TimelockError::PolicyViolation)
        );
        assert_eq!(
            ensure_quorum_feasible(3, 0),
            Err(TimelockError::PolicyViolation)
        );
        assert_eq!(
            ensure_quorum_feasible(0, 1),
            Err(TimelockError::PolicyViolation)
        );
    }
}
