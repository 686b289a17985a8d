//! Data types for the Timelock Guard contract

use soroban_sdk::{contracttype, Address, Bytes, BytesN, Symbol, Val, Vec};

/// Maximum number of approvers the engine will hold
pub const MAX_APPROVERS: u32 = 20;

/// Upper bound for the minimum delay and for any requested proposal delay (30 days)
pub const MAX_DELAY: u64 = 30 * 24 * 60 * 60;

/// Upper bound for the execution window after maturation (30 days)
pub const MAX_EXPIRY_WINDOW: u64 = 30 * 24 * 60 * 60;

/// Derived lifecycle position of a proposal.
///
/// Never stored. Recomputed from the proposal, the live configuration and the
/// ledger clock on every read, see [`crate::policy::derive_status`].
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ProposalStatus {
    /// Below quorum, still inside its execution deadline
    Pending = 0,
    /// Quorum reached, waiting for maturation
    Queued = 1,
    /// Quorum reached and inside the execution window
    Ready = 2,
    /// Execution window closed without execution
    Expired = 3,
    /// Executed successfully
    Executed = 4,
    /// Vetoed before maturation
    Cancelled = 5,
}

/// An external call requested by an `Action` proposal
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActionCall {
    /// Contract to invoke
    pub target: Address,
    /// Function name on the target
    pub function: Symbol,
    /// Arguments passed to the function as-is
    pub args: Vec<Val>,
    /// Amount of the treasury asset sent to the target before the call
    pub value: i128,
}

/// What a proposal does once executed
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProposalKind {
    /// External effect on another contract
    Action(ActionCall),
    /// Tag-encoded change to the engine's own configuration
    Governance(Bytes),
}

/// A single approval recorded on a proposal
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Approval {
    pub approver: Address,
    /// Membership epoch of the approver when the approval was given
    pub epoch: u32,
    pub approved_at: u64,
}

/// A time-locked proposal
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Proposal {
    /// Hash of proposer, kind, delay and nonce
    pub id: BytesN<32>,
    pub proposer: Address,
    pub kind: ProposalKind,
    /// Freshness counter value consumed by this proposal
    pub nonce: u64,
    pub created_at: u64,
    /// Maturation time, fixed at submission
    pub eta: u64,
    /// Recorded approvals, possibly including ones from since-removed approvers
    pub approvals: Vec<Approval>,
    pub executed: bool,
    pub cancelled: bool,
    /// Timestamp of execution or cancellation
    pub finalized_at: Option<u64>,
}

impl Proposal {
    pub fn is_terminal(&self) -> bool {
        self.executed || self.cancelled
    }
}

/// Membership record of an approver
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApproverInfo {
    pub added_at: u64,
    /// Configuration version at which this membership began
    pub epoch: u32,
}

/// Engine-wide configuration
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    /// Approvals required for execution
    pub threshold: u32,
    /// Smallest delay a new proposal may request
    pub min_delay: u64,
    /// Time after maturation during which execution remains valid
    pub expiry_window: u64,
    /// Emergency role: may cancel and pause
    pub guardian: Address,
    pub paused: bool,
    /// Token transferred by `Action` proposals carrying a value
    pub asset: Option<Address>,
    /// Bumped by every governance application and pause toggle
    pub version: u32,
}

/// Decoded governance payload
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GovernanceAction {
    AddApprover(Address),
    RemoveApprover(Address),
    SetThreshold(u32),
    SetMinDelay(u64),
    SetGuardian(Address),
}
