//! Contract events consumed by indexers and notification services.
//!
//! Each proposal-scoped event carries the proposal id so consumers can order
//! and de-duplicate per identifier.

use soroban_sdk::{contractevent, Address, Bytes, BytesN, Env, String, Symbol};

#[contractevent(topics = ["Timelock", "INIT"])]
struct EngineInitialized {
    approvers_count: u32,
    threshold: u32,
    min_delay: u64,
    expiry_window: u64,
    guardian: Address,
}

#[contractevent(topics = ["Timelock", "ACT_PROP"])]
struct ActionProposed {
    proposal_id: BytesN<32>,
    proposer: Address,
    target: Address,
    function: Symbol,
    value: i128,
    eta: u64,
}

#[contractevent(topics = ["Timelock", "GOV_PROP"])]
struct GovernanceProposed {
    proposal_id: BytesN<32>,
    proposer: Address,
    payload: Bytes,
    eta: u64,
}

#[contractevent(topics = ["Timelock", "APPROVED"])]
struct ProposalApproved {
    proposal_id: BytesN<32>,
    approver: Address,
    approval_count: u32,
    threshold: u32,
}

#[contractevent(topics = ["Timelock", "QUORUM"])]
struct QuorumReached {
    proposal_id: BytesN<32>,
    approval_count: u32,
    eta: u64,
}

#[contractevent(topics = ["Timelock", "REVOKED"])]
struct ApprovalRevoked {
    proposal_id: BytesN<32>,
    approver: Address,
    approval_count: u32,
}

#[contractevent(topics = ["Timelock", "CANCELLED"])]
struct ProposalCancelled {
    proposal_id: BytesN<32>,
    cancelled_by: Address,
    reason: String,
}

#[contractevent(topics = ["Timelock", "EXECUTED"])]
struct ProposalExecuted {
    proposal_id: BytesN<32>,
    executor: Address,
    success: bool,
    result: Bytes,
}

#[contractevent(topics = ["Timelock", "APPR_ADD"])]
struct ApproverAdded {
    approver: Address,
    proposal_id: BytesN<32>,
    approvers_count: u32,
}

#[contractevent(topics = ["Timelock", "APPR_REM"])]
struct ApproverRemoved {
    approver: Address,
    proposal_id: BytesN<32>,
    approvers_count: u32,
}

#[contractevent(topics = ["Timelock", "THRESH_UPD"])]
struct ThresholdUpdated {
    old: u32,
    new: u32,
    proposal_id: BytesN<32>,
}

#[contractevent(topics = ["Timelock", "DELAY_UPD"])]
struct MinDelayUpdated {
    old: u64,
    new: u64,
    proposal_id: BytesN<32>,
}

#[contractevent(topics = ["Timelock", "GUARD_UPD"])]
struct GuardianUpdated {
    old: Address,
    new: Address,
    proposal_id: BytesN<32>,
}

#[contractevent(topics = ["Timelock", "PAUSED"])]
struct EnginePaused {
    guardian: Address,
    timestamp: u64,
}

#[contractevent(topics = ["Timelock", "RESUMED"])]
struct EngineResumed {
    guardian: Address,
    timestamp: u64,
}

pub fn emit_initialized(
    env: &Env,
    approvers_count: u32,
    threshold: u32,
    min_delay: u64,
    expiry_window: u64,
    guardian: &Address,
) {
    EngineInitialized {
        approvers_count,
        threshold,
        min_delay,
        expiry_window,
        guardian: guardian.clone(),
    }
    .publish(env);
}

pub fn emit_action_proposed(
    env: &Env,
    proposal_id: &BytesN<32>,
    proposer: &Address,
    target: &Address,
    function: &Symbol,
    value: i128,
    eta: u64,
) {
    ActionProposed {
        proposal_id: proposal_id.clone(),
        proposer: proposer.clone(),
        target: target.clone(),
        function: function.clone(),
        value,
        eta,
    }
    .publish(env);
}

pub fn emit_governance_proposed(
    env: &Env,
    proposal_id: &BytesN<32>,
    proposer: &Address,
    payload: &Bytes,
    eta: u64,
) {
    GovernanceProposed {
        proposal_id: proposal_id.clone(),
        proposer: proposer.clone(),
        payload: payload.clone(),
        eta,
    }
    .publish(env);
}

pub fn emit_approved(
    env: &Env,
    proposal_id: &BytesN<32>,
    approver: &Address,
    approval_count: u32,
    threshold: u32,
) {
    ProposalApproved {
        proposal_id: proposal_id.clone(),
        approver: approver.clone(),
        approval_count,
        threshold,
    }
    .publish(env);
}

pub fn emit_quorum_reached(env: &Env, proposal_id: &BytesN<32>, approval_count: u32, eta: u64) {
    QuorumReached {
        proposal_id: proposal_id.clone(),
        approval_count,
        eta,
    }
    .publish(env);
}

pub fn emit_revoked(env: &Env, proposal_id: &BytesN<32>, approver: &Address, approval_count: u32) {
    ApprovalRevoked {
        proposal_id: proposal_id.clone(),
        approver: approver.clone(),
        approval_count,
    }
    .publish(env);
}

pub fn emit_cancelled(env: &Env, proposal_id: &BytesN<32>, cancelled_by: &Address, reason: &String) {
    ProposalCancelled {
        proposal_id: proposal_id.clone(),
        cancelled_by: cancelled_by.clone(),
        reason: reason.clone(),
    }
    .publish(env);
}

pub fn emit_executed(env: &Env, proposal_id: &BytesN<32>, executor: &Address, result: &Bytes) {
    // Failed executions roll back with the call, so only successes are published.
    ProposalExecuted {
        proposal_id: proposal_id.clone(),
        executor: executor.clone(),
        success: true,
        result: result.clone(),
    }
    .publish(env);
}

pub fn emit_approver_added(
    env: &Env,
    approver: &Address,
    proposal_id: &BytesN<32>,
    approvers_count: u32,
) {
    ApproverAdded {
        approver: approver.clone(),
        proposal_id: proposal_id.clone(),
        approvers_count,
    }
    .publish(env);
}

pub fn emit_approver_removed(
    env: &Env,
    approver: &Address,
    proposal_id: &BytesN<32>,
    approvers_count: u32,
) {
    ApproverRemoved {
        approver: approver.clone(),
        proposal_id: proposal_id.clone(),
        approvers_count,
    }
    .publish(env);
}

pub fn emit_threshold_updated(env: &Env, old: u32, new: u32, proposal_id: &BytesN<32>) {
    ThresholdUpdated {
        old,
        new,
        proposal_id: proposal_id.clone(),
    }
    .publish(env);
}

pub fn emit_min_delay_updated(env: &Env, old: u64, new: u64, proposal_id: &BytesN<32>) {
    MinDelayUpdated {
        old,
        new,
        proposal_id: proposal_id.clone(),
    }
    .publish(env);
}

pub fn emit_guardian_updated(env: &Env, old: &Address, new: &Address, proposal_id: &BytesN<32>) {
    GuardianUpdated {
        old: old.clone(),
        new: new.clone(),
        proposal_id: proposal_id.clone(),
    }
    .publish(env);
}

pub fn emit_paused(env: &Env, guardian: &Address, timestamp: u64) {
    EnginePaused {
        guardian: guardian.clone(),
        timestamp,
    }
    .publish(env);
}

pub fn emit_resumed(env: &Env, guardian: &Address, timestamp: u64) {
    EngineResumed {
        guardian: guardian.clone(),
        timestamp,
    }
    .publish(env);
}
