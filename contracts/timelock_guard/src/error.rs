//! Error types for the Timelock Guard contract

use soroban_sdk::contracterror;

/// Timelock engine errors
///
/// Every rejected call leaves contract state exactly as it was before the call.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum TimelockError {
    /// Contract has already been initialized
    AlreadyInitialized = 1,
    /// Contract has not been initialized
    NotInitialized = 2,
    /// Caller lacks the role required for this operation
    Unauthorized = 3,
    /// No proposal exists with the given identifier
    NotFound = 4,
    /// Proposal has already been executed or cancelled
    AlreadyFinalized = 5,
    /// Repeated approval, identifier collision, or execution already in flight
    DuplicateAction = 6,
    /// Delay, threshold, membership, or payload rules were broken
    PolicyViolation = 7,
    /// Proposal has not reached its maturation time
    NotYetMatured = 8,
    /// Proposal execution window has closed
    Expired = 9,
    /// Engine is paused
    Paused = 10,
    /// The invoked external effect reported failure
    EffectFailed = 11,
    /// Caller holds no active approval on this proposal
    NotApproved = 12,
    /// Proposal does not have enough active approvals
    QuorumNotReached = 13,
    /// Proposal has matured; revocation and cancellation are closed
    AlreadyMatured = 14,
}
