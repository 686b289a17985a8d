#![no_std]

//! # Timelock Guard
//!
//! A Soroban smart contract that authorizes high-value actions only after a
//! quorum of approvers agrees AND a mandatory waiting period elapses. During
//! the wait an independent guardian may veto. Capturing one approver key is
//! not enough to act, and capturing a quorum is not enough to act instantly.
//!
//! ## Features
//! - M-of-N approval with per-approver revocation before maturation
//! - Per-proposal delay, never below the engine-wide minimum
//! - Bounded execution window after maturation
//! - Guardian veto and pause; the veto path ignores pause
//! - Self-governance: membership, threshold, minimum delay and guardian change
//!   only through proposals of the `Governance` kind
//! - Replay protection via nonce-derived identifiers and a single execution latch
//!
//! ## Execution guarantee
//! Either the requested effect happens exactly once and the proposal is
//! permanently terminal, or neither happens and the proposal is unchanged.

use soroban_sdk::{
    contract, contractimpl, log, xdr::ToXdr, Address, Bytes, BytesN, Env, String, Symbol, Val,
    Vec,
};

mod effects;
mod error;
mod events;
mod governance;
mod policy;
mod storage;
mod types;

pub use error::TimelockError;
pub use types::{
    ActionCall, Approval, ApproverInfo, EngineConfig, GovernanceAction, Proposal, ProposalKind,
    ProposalStatus, MAX_APPROVERS, MAX_DELAY, MAX_EXPIRY_WINDOW,
};

use policy::Timeline;

// ============================================================================
// Contract Implementation
// ============================================================================

#[contract]
pub struct TimelockGuard;

#[contractimpl]
impl TimelockGuard {
    // ========================================================================
    // Initialization
    // ========================================================================

    /// Initialize the engine with its approvers, quorum, time policy and guardian
    ///
    /// # Arguments
    /// * `approvers` - Initial approver set, unique, at most `MAX_APPROVERS`
    /// * `threshold` - Approvals required for execution (M-of-N)
    /// * `min_delay` - Smallest delay a proposal may request, in seconds
    /// * `expiry_window` - Seconds after maturation during which execution is valid
    /// * `guardian` - Emergency role allowed to cancel and pause
    /// * `asset` - Token moved by `Action` proposals that carry a value
    ///
    /// # Errors
    /// * `AlreadyInitialized` - Contract has already been initialized
    /// * `PolicyViolation` - Any of the bounds above is broken
    pub fn initialize(
        env: Env,
        approvers: Vec<Address>,
        threshold: u32,
        min_delay: u64,
        expiry_window: u64,
        guardian: Address,
        asset: Option<Address>,
    ) -> Result<(), TimelockError> {
        if storage::is_initialized(&env) {
            return Err(TimelockError::AlreadyInitialized);
        }

        if approvers.len() > MAX_APPROVERS {
            return Err(TimelockError::PolicyViolation);
        }
        policy::ensure_quorum_feasible(approvers.len(), threshold)?;
        if min_delay > MAX_DELAY {
            return Err(TimelockError::PolicyViolation);
        }
        if expiry_window == 0 || expiry_window > MAX_EXPIRY_WINDOW {
            return Err(TimelockError::PolicyViolation);
        }

        let mut unique: Vec<Address> = Vec::new(&env);
        for approver in approvers.iter() {
            if unique.contains(&approver) {
                return Err(TimelockError::PolicyViolation);
            }
            unique.push_back(approver);
        }

        let timestamp = env.ledger().timestamp();
        for approver in unique.iter() {
            approver.require_auth();

            let info = ApproverInfo {
                added_at: timestamp,
                epoch: 0,
            };
            storage::set_approver_info(&env, &approver, &info);
        }
        storage::set_approver_list(&env, &unique);

        let config = EngineConfig {
            threshold,
            min_delay,
            expiry_window,
            guardian: guardian.clone(),
            paused: false,
            asset,
            version: 0,
        };
        storage::set_config(&env, &config);
        storage::set_initialized(&env);

        events::emit_initialized(
            &env,
            unique.len(),
            threshold,
            min_delay,
            expiry_window,
            &guardian,
        );

        Ok(())
    }

    // ========================================================================
    // Proposal Submission
    // ========================================================================

    /// Propose a call to an external contract, optionally sending treasury funds
    ///
    /// The proposer must be a current approver and must authorize this call.
    /// Returns the new proposal identifier.
    ///
    /// # Errors
    /// * `Unauthorized` - Proposer is not an approver
    /// * `Paused` - Engine is paused
    /// * `PolicyViolation` - Delay out of bounds, negative value, value without a
    ///   configured asset, or the engine itself as target
    /// * `DuplicateAction` - Identifier collision
    pub fn propose_action(
        env: Env,
        proposer: Address,
        target: Address,
        function: Symbol,
        args: Vec<Val>,
        value: i128,
        delay: u64,
    ) -> Result<BytesN<32>, TimelockError> {
        let config = load_config(&env)?;

        if value < 0 || (value > 0 && config.asset.is_none()) {
            return Err(TimelockError::PolicyViolation);
        }
        // Reconfiguration goes through governance proposals only
        if target == env.current_contract_address() {
            return Err(TimelockError::PolicyViolation);
        }

        let call = ActionCall {
            target: target.clone(),
            function: function.clone(),
            args,
            value,
        };
        let proposal = submit(&env, &config, &proposer, ProposalKind::Action(call), delay)?;

        events::emit_action_proposed(
            &env,
            &proposal.id,
            &proposer,
            &target,
            &function,
            value,
            proposal.eta,
        );

        Ok(proposal.id)
    }

    /// Propose a change to the engine's own configuration
    ///
    /// `payload` uses the tag-byte encoding produced by `encode_governance`.
    /// Its shape is checked now; its effect on the configuration is checked
    /// again when it executes.
    pub fn propose_governance(
        env: Env,
        proposer: Address,
        payload: Bytes,
        delay: u64,
    ) -> Result<BytesN<32>, TimelockError> {
        let config = load_config(&env)?;

        governance::parse(&payload)?;

        let proposal = submit(
            &env,
            &config,
            &proposer,
            ProposalKind::Governance(payload.clone()),
            delay,
        )?;

        events::emit_governance_proposed(&env, &proposal.id, &proposer, &payload, proposal.eta);

        Ok(proposal.id)
    }

    // ========================================================================
    // Approval / Revocation
    // ========================================================================

    /// Approve a proposal
    ///
    /// # Errors
    /// * `Unauthorized` - Caller is not an approver
    /// * `Paused` - Engine is paused
    /// * `NotFound` - Proposal does not exist
    /// * `AlreadyFinalized` - Proposal was executed or cancelled
    /// * `Expired` - Proposal's execution window has closed
    /// * `DuplicateAction` - Caller already holds an approval on it
    pub fn approve(
        env: Env,
        approver: Address,
        proposal_id: BytesN<32>,
    ) -> Result<(), TimelockError> {
        let config = load_config(&env)?;

        approver.require_auth();
        let info = storage::get_approver_info(&env, &approver).ok_or(TimelockError::Unauthorized)?;

        if config.paused {
            return Err(TimelockError::Paused);
        }

        let mut proposal = load_open_proposal(&env, &proposal_id)?;

        let timestamp = env.ledger().timestamp();
        if Timeline::of(&proposal, &config).is_expired(timestamp) {
            return Err(TimelockError::Expired);
        }

        let active = policy::active_approvals(&env, &proposal);
        if active.contains(&approver) {
            return Err(TimelockError::DuplicateAction);
        }

        // A void approval from an earlier membership is replaced
        let mut approvals = without_approver(&env, &proposal.approvals, &approver);
        approvals.push_back(Approval {
            approver: approver.clone(),
            epoch: info.epoch,
            approved_at: timestamp,
        });
        proposal.approvals = approvals;
        storage::set_proposal(&env, &proposal);

        let before = active.len();
        let approval_count = before + 1;
        events::emit_approved(&env, &proposal_id, &approver, approval_count, config.threshold);
        if before < config.threshold && approval_count >= config.threshold {
            events::emit_quorum_reached(&env, &proposal_id, approval_count, proposal.eta);
        }

        Ok(())
    }

    /// Withdraw an approval before the proposal matures
    ///
    /// # Errors
    /// * `Unauthorized` - Caller is not an approver
    /// * `Paused` - Engine is paused
    /// * `NotFound` - Proposal does not exist
    /// * `AlreadyFinalized` - Proposal was executed or cancelled
    /// * `AlreadyMatured` - Maturation time has been reached
    /// * `NotApproved` - Caller holds no active approval on it
    pub fn revoke(
        env: Env,
        approver: Address,
        proposal_id: BytesN<32>,
    ) -> Result<(), TimelockError> {
        let config = load_config(&env)?;

        approver.require_auth();
        require_approver(&env, &approver)?;

        if config.paused {
            return Err(TimelockError::Paused);
        }

        let mut proposal = load_open_proposal(&env, &proposal_id)?;

        if Timeline::of(&proposal, &config).is_matured(env.ledger().timestamp()) {
            return Err(TimelockError::AlreadyMatured);
        }

        let active = policy::active_approvals(&env, &proposal);
        if !active.contains(&approver) {
            return Err(TimelockError::NotApproved);
        }

        proposal.approvals = without_approver(&env, &proposal.approvals, &approver);
        storage::set_proposal(&env, &proposal);

        events::emit_revoked(&env, &proposal_id, &approver, active.len() - 1);

        Ok(())
    }

    // ========================================================================
    // Cancellation (Veto)
    // ========================================================================

    /// Cancel a proposal before it matures
    ///
    /// Approvers and the guardian may cancel. The guardian may do so while the
    /// engine is paused.
    ///
    /// # Errors
    /// * `Unauthorized` - Caller is neither an approver nor the guardian
    /// * `Paused` - Engine is paused and caller is not the guardian
    /// * `NotFound` - Proposal does not exist
    /// * `AlreadyFinalized` - Proposal was executed or cancelled
    /// * `AlreadyMatured` - Maturation time has been reached
    pub fn cancel(
        env: Env,
        caller: Address,
        proposal_id: BytesN<32>,
        reason: String,
    ) -> Result<(), TimelockError> {
        let config = load_config(&env)?;

        caller.require_auth();

        let is_guardian = caller == config.guardian;
        if !is_guardian && !storage::is_approver(&env, &caller) {
            return Err(TimelockError::Unauthorized);
        }
        if config.paused && !is_guardian {
            return Err(TimelockError::Paused);
        }

        let mut proposal = load_open_proposal(&env, &proposal_id)?;

        let timestamp = env.ledger().timestamp();
        if Timeline::of(&proposal, &config).is_matured(timestamp) {
            return Err(TimelockError::AlreadyMatured);
        }

        proposal.cancelled = true;
        proposal.finalized_at = Some(timestamp);
        storage::set_proposal(&env, &proposal);

        events::emit_cancelled(&env, &proposal_id, &caller, &reason);
        log!(&env, "proposal cancelled", proposal_id, is_guardian);

        Ok(())
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Execute a matured proposal
    ///
    /// Anyone may execute once every condition holds. Returns the effect
    /// result: the XDR of the target's return value for `Action` proposals,
    /// the applied payload for `Governance` proposals.
    ///
    /// # Errors
    /// * `Paused` - Engine is paused
    /// * `DuplicateAction` - Another execution is in flight
    /// * `NotFound` - Proposal does not exist
    /// * `AlreadyFinalized` - Proposal was executed or cancelled
    /// * `QuorumNotReached` - Too few active approvals
    /// * `NotYetMatured` - Maturation time not reached
    /// * `Expired` - Execution window closed
    /// * `EffectFailed` - The target call or value transfer failed
    /// * `PolicyViolation` - The governance change would break configuration rules
    pub fn execute(
        env: Env,
        executor: Address,
        proposal_id: BytesN<32>,
    ) -> Result<Bytes, TimelockError> {
        let config = load_config(&env)?;

        executor.require_auth();

        if config.paused {
            return Err(TimelockError::Paused);
        }
        if storage::is_executing(&env) {
            return Err(TimelockError::DuplicateAction);
        }

        let mut proposal =
            storage::get_proposal(&env, &proposal_id).ok_or(TimelockError::NotFound)?;

        let timestamp = env.ledger().timestamp();
        let approvals = policy::active_approval_count(&env, &proposal);
        policy::ensure_executable(&proposal, approvals, &config, timestamp)?;

        // Finalize before the effect so a re-entrant call sees a terminal proposal
        storage::set_executing(&env, true);
        let snapshot = proposal.clone();
        proposal.executed = true;
        proposal.finalized_at = Some(timestamp);
        storage::set_proposal(&env, &proposal);

        let outcome = match &proposal.kind {
            ProposalKind::Action(call) => effects::perform(&env, call),
            ProposalKind::Governance(payload) => governance::dispatch(&env, &proposal_id, payload),
        };
        storage::set_executing(&env, false);

        match outcome {
            Ok(result) => {
                events::emit_executed(&env, &proposal_id, &executor, &result);
                log!(&env, "proposal executed", proposal_id);
                Ok(result)
            }
            Err(err) => {
                storage::set_proposal(&env, &snapshot);
                log!(&env, "proposal execution failed", proposal_id, err as u32);
                Err(err)
            }
        }
    }

    // ========================================================================
    // Pause Control
    // ========================================================================

    /// Block submission, approval, revocation and execution (guardian only)
    pub fn pause(env: Env, guardian: Address) -> Result<(), TimelockError> {
        set_paused(&env, &guardian, true)
    }

    /// Lift a pause (guardian only)
    pub fn resume(env: Env, guardian: Address) -> Result<(), TimelockError> {
        set_paused(&env, &guardian, false)
    }

    // ========================================================================
    // Query Functions
    // ========================================================================

    /// Get proposal details by ID, including void approvals
    pub fn get_proposal(env: Env, proposal_id: BytesN<32>) -> Result<Proposal, TimelockError> {
        load_config(&env)?;
        storage::get_proposal(&env, &proposal_id).ok_or(TimelockError::NotFound)
    }

    /// Get the derived lifecycle status of a proposal
    pub fn get_status(env: Env, proposal_id: BytesN<32>) -> Result<ProposalStatus, TimelockError> {
        let config = load_config(&env)?;
        let proposal = storage::get_proposal(&env, &proposal_id).ok_or(TimelockError::NotFound)?;
        let approvals = policy::active_approval_count(&env, &proposal);
        Ok(policy::derive_status(
            &proposal,
            approvals,
            &config,
            env.ledger().timestamp(),
        ))
    }

    /// Get the approvers whose approval currently counts
    pub fn get_approvals(
        env: Env,
        proposal_id: BytesN<32>,
    ) -> Result<Vec<Address>, TimelockError> {
        load_config(&env)?;
        let proposal = storage::get_proposal(&env, &proposal_id).ok_or(TimelockError::NotFound)?;
        Ok(policy::active_approvals(&env, &proposal))
    }

    pub fn get_approval_count(env: Env, proposal_id: BytesN<32>) -> Result<u32, TimelockError> {
        Ok(Self::get_approvals(env, proposal_id)?.len())
    }

    pub fn has_approved(
        env: Env,
        proposal_id: BytesN<32>,
        approver: Address,
    ) -> Result<bool, TimelockError> {
        load_config(&env)?;
        let proposal = storage::get_proposal(&env, &proposal_id).ok_or(TimelockError::NotFound)?;
        Ok(policy::has_active_approval(&env, &proposal, &approver))
    }

    /// Check if an address is a current approver
    pub fn is_approver(env: Env, address: Address) -> bool {
        if !storage::is_initialized(&env) {
            return false;
        }
        storage::is_approver(&env, &address)
    }

    pub fn get_approvers(env: Env) -> Result<Vec<Address>, TimelockError> {
        load_config(&env)?;
        Ok(storage::get_approver_list(&env))
    }

    pub fn get_threshold(env: Env) -> Result<u32, TimelockError> {
        Ok(load_config(&env)?.threshold)
    }

    pub fn get_min_delay(env: Env) -> Result<u64, TimelockError> {
        Ok(load_config(&env)?.min_delay)
    }

    pub fn get_expiry_window(env: Env) -> Result<u64, TimelockError> {
        Ok(load_config(&env)?.expiry_window)
    }

    pub fn get_guardian(env: Env) -> Result<Address, TimelockError> {
        Ok(load_config(&env)?.guardian)
    }

    pub fn is_paused(env: Env) -> Result<bool, TimelockError> {
        Ok(load_config(&env)?.paused)
    }

    /// Get the full engine configuration
    pub fn get_config(env: Env) -> Result<EngineConfig, TimelockError> {
        load_config(&env)
    }

    /// Nonce the next proposal will consume
    pub fn get_nonce(env: Env) -> Result<u64, TimelockError> {
        load_config(&env)?;
        Ok(storage::peek_nonce(&env))
    }

    /// Identifier a proposal with these parameters would receive at `nonce`
    pub fn compute_proposal_id(
        env: Env,
        proposer: Address,
        kind: ProposalKind,
        delay: u64,
        nonce: u64,
    ) -> BytesN<32> {
        derive_proposal_id(&env, &proposer, &kind, delay, nonce)
    }

    /// Encode a governance action into its tag-byte payload
    pub fn encode_governance(env: Env, action: GovernanceAction) -> Result<Bytes, TimelockError> {
        governance::encode(&env, &action)
    }
}

// ============================================================================
// Internal Helpers
// ============================================================================

fn load_config(env: &Env) -> Result<EngineConfig, TimelockError> {
    if !storage::is_initialized(env) {
        return Err(TimelockError::NotInitialized);
    }
    storage::get_config(env).ok_or(TimelockError::NotInitialized)
}

fn require_approver(env: &Env, address: &Address) -> Result<(), TimelockError> {
    if !storage::is_approver(env, address) {
        return Err(TimelockError::Unauthorized);
    }
    Ok(())
}

fn load_open_proposal(env: &Env, proposal_id: &BytesN<32>) -> Result<Proposal, TimelockError> {
    let proposal = storage::get_proposal(env, proposal_id).ok_or(TimelockError::NotFound)?;
    if proposal.is_terminal() {
        return Err(TimelockError::AlreadyFinalized);
    }
    Ok(proposal)
}

fn without_approver(env: &Env, approvals: &Vec<Approval>, approver: &Address) -> Vec<Approval> {
    let mut kept = Vec::new(env);
    for approval in approvals.iter() {
        if approval.approver != *approver {
            kept.push_back(approval);
        }
    }
    kept
}

fn derive_proposal_id(
    env: &Env,
    proposer: &Address,
    kind: &ProposalKind,
    delay: u64,
    nonce: u64,
) -> BytesN<32> {
    let preimage = (proposer.clone(), kind.clone(), delay, nonce).to_xdr(env);
    env.crypto().sha256(&preimage).to_bytes()
}

/// Shared submission path for both proposal kinds.
fn submit(
    env: &Env,
    config: &EngineConfig,
    proposer: &Address,
    kind: ProposalKind,
    delay: u64,
) -> Result<Proposal, TimelockError> {
    proposer.require_auth();
    require_approver(env, proposer)?;

    if config.paused {
        return Err(TimelockError::Paused);
    }

    let timestamp = env.ledger().timestamp();
    let eta = policy::maturation_time(timestamp, delay, config.min_delay)?;

    let nonce = storage::take_nonce(env);
    let id = derive_proposal_id(env, proposer, &kind, delay, nonce);
    if storage::proposal_exists(env, &id) {
        return Err(TimelockError::DuplicateAction);
    }

    let proposal = Proposal {
        id,
        proposer: proposer.clone(),
        kind,
        nonce,
        created_at: timestamp,
        eta,
        approvals: Vec::new(env),
        executed: false,
        cancelled: false,
        finalized_at: None,
    };
    storage::set_proposal(env, &proposal);

    Ok(proposal)
}

fn set_paused(env: &Env, guardian: &Address, paused: bool) -> Result<(), TimelockError> {
    let mut config = load_config(env)?;

    guardian.require_auth();
    if *guardian != config.guardian {
        return Err(TimelockError::Unauthorized);
    }
    if config.paused == paused {
        return Err(TimelockError::DuplicateAction);
    }

    config.paused = paused;
    config.version += 1;
    storage::set_config(env, &config);

    let timestamp = env.ledger().timestamp();
    if paused {
        events::emit_paused(env, guardian, timestamp);
    } else {
        events::emit_resumed(env, guardian, timestamp);
    }
    log!(env, "pause state changed", paused, config.version);

    Ok(())
}
