//! Storage keys and helpers for the Timelock Guard contract

use soroban_sdk::{contracttype, Address, BytesN, Env, Vec};

use crate::types::{ApproverInfo, EngineConfig, Proposal};

/// Storage keys for the timelock contract
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Boolean flag indicating contract initialization
    Initialized,
    /// Engine configuration (instance storage)
    Config,
    /// Next freshness value for proposal identifiers (instance storage)
    Nonce,
    /// Execution latch, held for the duration of one `execute` call (instance storage)
    Executing,
    /// Membership record of an approver (persistent storage)
    Approver(Address),
    /// Ordered list of approver addresses (persistent storage)
    ApproverList,
    /// A proposal with its recorded approvals (persistent storage)
    Proposal(BytesN<32>),
}

// ============================================================================
// Initialization Helpers
// ============================================================================

pub fn is_initialized(env: &Env) -> bool {
    env.storage()
        .instance()
        .get::<DataKey, bool>(&DataKey::Initialized)
        .unwrap_or(false)
}

pub fn set_initialized(env: &Env) {
    env.storage().instance().set(&DataKey::Initialized, &true);
}

// ============================================================================
// Configuration Helpers
// ============================================================================

/// Get the engine configuration.
///
/// Callers gate on [`is_initialized`] first; before initialization there is
/// no configuration to read.
pub fn get_config(env: &Env) -> Option<EngineConfig> {
    env.storage().instance().get(&DataKey::Config)
}

pub fn set_config(env: &Env, config: &EngineConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

/// Return the current nonce and advance the counter
pub fn take_nonce(env: &Env) -> u64 {
    let nonce = env
        .storage()
        .instance()
        .get::<DataKey, u64>(&DataKey::Nonce)
        .unwrap_or(0);
    env.storage().instance().set(&DataKey::Nonce, &(nonce + 1));
    nonce
}

pub fn peek_nonce(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get::<DataKey, u64>(&DataKey::Nonce)
        .unwrap_or(0)
}

pub fn is_executing(env: &Env) -> bool {
    env.storage()
        .instance()
        .get::<DataKey, bool>(&DataKey::Executing)
        .unwrap_or(false)
}

pub fn set_executing(env: &Env, executing: bool) {
    if executing {
        env.storage().instance().set(&DataKey::Executing, &true);
    } else {
        env.storage().instance().remove(&DataKey::Executing);
    }
}

// ============================================================================
// Approver Helpers
// ============================================================================

pub fn get_approver_list(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::ApproverList)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn set_approver_list(env: &Env, approvers: &Vec<Address>) {
    env.storage()
        .persistent()
        .set(&DataKey::ApproverList, approvers);
}

pub fn get_approver_info(env: &Env, address: &Address) -> Option<ApproverInfo> {
    env.storage()
        .persistent()
        .get(&DataKey::Approver(address.clone()))
}

pub fn set_approver_info(env: &Env, address: &Address, info: &ApproverInfo) {
    env.storage()
        .persistent()
        .set(&DataKey::Approver(address.clone()), info);
}

pub fn remove_approver_info(env: &Env, address: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::Approver(address.clone()));
}

pub fn is_approver(env: &Env, address: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Approver(address.clone()))
}

// ============================================================================
// Proposal Helpers
// ============================================================================

pub fn get_proposal(env: &Env, proposal_id: &BytesN<32>) -> Option<Proposal> {
    env.storage()
        .persistent()
        .get(&DataKey::Proposal(proposal_id.clone()))
}

pub fn set_proposal(env: &Env, proposal: &Proposal) {
    env.storage()
        .persistent()
        .set(&DataKey::Proposal(proposal.id.clone()), proposal);
}

pub fn proposal_exists(env: &Env, proposal_id: &BytesN<32>) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Proposal(proposal_id.clone()))
}
