//! Governance payload codec and self-configuration dispatcher.
//!
//! Payload layout: one tag byte followed by a fixed-width argument.
//!
//! | tag | action           | argument                       |
//! |-----|------------------|--------------------------------|
//! | 1   | add approver     | 56-byte strkey (`G...`/`C...`) |
//! | 2   | remove approver  | 56-byte strkey                 |
//! | 3   | set threshold    | `u32`, big-endian              |
//! | 4   | set min delay    | `u64`, big-endian              |
//! | 5   | set guardian     | 56-byte strkey                 |
//!
//! A payload moves through [`parse`] (shape), [`validate`] (against the live
//! configuration) and [`Validated::apply`] (commit). Nothing is written until
//! `apply`, and `apply` re-checks quorum feasibility before each write.

use soroban_sdk::{log, Address, Bytes, BytesN, Env, Vec};

use crate::error::TimelockError;
use crate::events;
use crate::policy::ensure_quorum_feasible;
use crate::storage;
use crate::types::{ApproverInfo, EngineConfig, GovernanceAction, MAX_APPROVERS, MAX_DELAY};

pub const TAG_ADD_APPROVER: u8 = 1;
pub const TAG_REMOVE_APPROVER: u8 = 2;
pub const TAG_SET_THRESHOLD: u8 = 3;
pub const TAG_SET_MIN_DELAY: u8 = 4;
pub const TAG_SET_GUARDIAN: u8 = 5;

const STRKEY_LEN: usize = 56;

// Strkeys of the all-zero account and contract ids.
const ZERO_ACCOUNT: &[u8; STRKEY_LEN] = b"GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";
const ZERO_CONTRACT: &[u8; STRKEY_LEN] = b"CAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABSC4";

pub fn tag_of(action: &GovernanceAction) -> u8 {
    match action {
        GovernanceAction::AddApprover(_) => TAG_ADD_APPROVER,
        GovernanceAction::RemoveApprover(_) => TAG_REMOVE_APPROVER,
        GovernanceAction::SetThreshold(_) => TAG_SET_THRESHOLD,
        GovernanceAction::SetMinDelay(_) => TAG_SET_MIN_DELAY,
        GovernanceAction::SetGuardian(_) => TAG_SET_GUARDIAN,
    }
}

// ============================================================================
// Codec
// ============================================================================

pub fn encode(env: &Env, action: &GovernanceAction) -> Result<Bytes, TimelockError> {
    let mut payload = Bytes::new(env);
    payload.push_back(tag_of(action));
    match action {
        GovernanceAction::AddApprover(address)
        | GovernanceAction::RemoveApprover(address)
        | GovernanceAction::SetGuardian(address) => push_identity(&mut payload, address)?,
        GovernanceAction::SetThreshold(threshold) => {
            payload.extend_from_slice(&threshold.to_be_bytes())
        }
        GovernanceAction::SetMinDelay(delay) => payload.extend_from_slice(&delay.to_be_bytes()),
    }
    Ok(payload)
}

fn push_identity(payload: &mut Bytes, address: &Address) -> Result<(), TimelockError> {
    let strkey = address.to_string();
    if strkey.len() as usize != STRKEY_LEN {
        return Err(TimelockError::PolicyViolation);
    }
    let mut buf = [0u8; STRKEY_LEN];
    strkey.copy_into_slice(&mut buf);
    payload.extend_from_slice(&buf);
    Ok(())
}

/// Decode a payload, rejecting unknown tags and malformed arguments.
pub fn parse(payload: &Bytes) -> Result<GovernanceAction, TimelockError> {
    let tag = payload.first().ok_or(TimelockError::PolicyViolation)?;
    let body = payload.slice(1..);

    match tag {
        TAG_ADD_APPROVER => Ok(GovernanceAction::AddApprover(read_identity(&body)?)),
        TAG_REMOVE_APPROVER => Ok(GovernanceAction::RemoveApprover(read_identity(&body)?)),
        TAG_SET_THRESHOLD => Ok(GovernanceAction::SetThreshold(u32::from_be_bytes(
            read_fixed::<4>(&body)?,
        ))),
        TAG_SET_MIN_DELAY => Ok(GovernanceAction::SetMinDelay(u64::from_be_bytes(
            read_fixed::<8>(&body)?,
        ))),
        TAG_SET_GUARDIAN => Ok(GovernanceAction::SetGuardian(read_identity(&body)?)),
        _ => Err(TimelockError::PolicyViolation),
    }
}

fn read_fixed<const N: usize>(body: &Bytes) -> Result<[u8; N], TimelockError> {
    if body.len() as usize != N {
        return Err(TimelockError::PolicyViolation);
    }
    let mut buf = [0u8; N];
    body.copy_into_slice(&mut buf);
    Ok(buf)
}

fn read_identity(body: &Bytes) -> Result<Address, TimelockError> {
    let raw = read_fixed::<STRKEY_LEN>(body)?;
    if &raw == ZERO_ACCOUNT || &raw == ZERO_CONTRACT || !is_valid_strkey(&raw) {
        return Err(TimelockError::PolicyViolation);
    }
    Ok(Address::from_string_bytes(body))
}

// Decoded strkey: version byte, 32-byte key, little-endian CRC16 checksum.
const DECODED_LEN: usize = 35;
const VERSION_ACCOUNT: u8 = 6 << 3;
const VERSION_CONTRACT: u8 = 2 << 3;

/// Check version byte and checksum so the host never traps on a bad strkey.
fn is_valid_strkey(raw: &[u8; STRKEY_LEN]) -> bool {
    let decoded = match decode_base32(raw) {
        Some(decoded) => decoded,
        None => return false,
    };
    if !matches!(decoded[0], VERSION_ACCOUNT | VERSION_CONTRACT) {
        return false;
    }
    let (data, checksum) = decoded.split_at(DECODED_LEN - 2);
    crc16_xmodem(data) == u16::from_le_bytes([checksum[0], checksum[1]])
}

fn decode_base32(raw: &[u8; STRKEY_LEN]) -> Option<[u8; DECODED_LEN]> {
    let mut out = [0u8; DECODED_LEN];
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    let mut written = 0;
    for &c in raw.iter() {
        let value = match c {
            b'A'..=b'Z' => c - b'A',
            b'2'..=b'7' => c - b'2' + 26,
            _ => return None,
        };
        buffer = (buffer << 5) | value as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out[written] = (buffer >> bits) as u8;
            buffer &= (1 << bits) - 1;
            written += 1;
        }
    }
    Some(out)
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

// ============================================================================
// Dispatch
// ============================================================================

/// A governance action checked against the configuration it will modify.
pub struct Validated {
    action: GovernanceAction,
    config: EngineConfig,
    approvers: Vec<Address>,
}

/// Check `action` against the live configuration without writing anything.
pub fn validate(env: &Env, action: GovernanceAction) -> Result<Validated, TimelockError> {
    let config = storage::get_config(env).ok_or(TimelockError::NotInitialized)?;
    let approvers = storage::get_approver_list(env);

    match &action {
        GovernanceAction::AddApprover(address) => {
            if storage::is_approver(env, address) {
                return Err(TimelockError::PolicyViolation);
            }
            if approvers.len() >= MAX_APPROVERS {
                return Err(TimelockError::PolicyViolation);
            }
        }
        GovernanceAction::RemoveApprover(address) => {
            if !storage::is_approver(env, address) {
                return Err(TimelockError::PolicyViolation);
            }
            ensure_quorum_feasible(approvers.len() - 1, config.threshold)?;
        }
        GovernanceAction::SetThreshold(threshold) => {
            ensure_quorum_feasible(approvers.len(), *threshold)?;
        }
        GovernanceAction::SetMinDelay(delay) => {
            if *delay > MAX_DELAY {
                return Err(TimelockError::PolicyViolation);
            }
        }
        GovernanceAction::SetGuardian(_) => {}
    }

    Ok(Validated {
        action,
        config,
        approvers,
    })
}

impl Validated {
    /// Commit the action, bump the configuration version and emit its event.
    ///
    /// Returns the applied payload re-encoded, as the execution result.
    pub fn apply(self, env: &Env, proposal_id: &BytesN<32>) -> Result<Bytes, TimelockError> {
        let Validated {
            action,
            mut config,
            mut approvers,
        } = self;
        config.version += 1;

        match &action {
            GovernanceAction::AddApprover(address) => {
                approvers.push_back(address.clone());
                ensure_quorum_feasible(approvers.len(), config.threshold)?;

                let info = ApproverInfo {
                    added_at: env.ledger().timestamp(),
                    epoch: config.version,
                };
                storage::set_approver_info(env, address, &info);
                storage::set_approver_list(env, &approvers);
                events::emit_approver_added(env, address, proposal_id, approvers.len());
            }
            GovernanceAction::RemoveApprover(address) => {
                let mut remaining: Vec<Address> = Vec::new(env);
                for approver in approvers.iter() {
                    if approver != *address {
                        remaining.push_back(approver);
                    }
                }
                ensure_quorum_feasible(remaining.len(), config.threshold)?;

                storage::remove_approver_info(env, address);
                storage::set_approver_list(env, &remaining);
                events::emit_approver_removed(env, address, proposal_id, remaining.len());
            }
            GovernanceAction::SetThreshold(threshold) => {
                ensure_quorum_feasible(approvers.len(), *threshold)?;
                let old = config.threshold;
                config.threshold = *threshold;
                events::emit_threshold_updated(env, old, *threshold, proposal_id);
            }
            GovernanceAction::SetMinDelay(delay) => {
                let old = config.min_delay;
                config.min_delay = *delay;
                events::emit_min_delay_updated(env, old, *delay, proposal_id);
            }
            GovernanceAction::SetGuardian(guardian) => {
                let old = config.guardian.clone();
                config.guardian = guardian.clone();
                events::emit_guardian_updated(env, &old, guardian, proposal_id);
            }
        }

        storage::set_config(env, &config);
        log!(
            env,
            "governance applied",
            tag_of(&action) as u32,
            config.version
        );
        encode(env, &action)
    }
}

/// Parse, validate and apply a governance payload.
pub fn dispatch(
    env: &Env,
    proposal_id: &BytesN<32>,
    payload: &Bytes,
) -> Result<Bytes, TimelockError> {
    let action = parse(payload)?;
    validate(env, action)?.apply(env, proposal_id)
}
