//! Outbound calls made when an `Action` proposal executes.
//!
//! Targets are untrusted. Every call goes through `try_invoke_contract`, so a
//! trap or error in the target surfaces as [`TimelockError::EffectFailed`]
//! instead of aborting the engine.

use soroban_sdk::{log, vec, xdr::ToXdr, Bytes, Env, Error, IntoVal, Symbol, Val, Vec};

use crate::error::TimelockError;
use crate::storage;
use crate::types::ActionCall;

/// Send the attached value, then invoke the target.
///
/// Returns the XDR encoding of the target's return value.
pub fn perform(env: &Env, call: &ActionCall) -> Result<Bytes, TimelockError> {
    if call.value > 0 {
        transfer_value(env, call)?;
    }

    match env.try_invoke_contract::<Val, Error>(&call.target, &call.function, call.args.clone()) {
        Ok(Ok(result)) => Ok(result.to_xdr(env)),
        _ => {
            log!(env, "target call failed", call.target, call.function);
            Err(TimelockError::EffectFailed)
        }
    }
}

fn transfer_value(env: &Env, call: &ActionCall) -> Result<(), TimelockError> {
    let asset = storage::get_config(env)
        .and_then(|config| config.asset)
        .ok_or(TimelockError::PolicyViolation)?;

    let args: Vec<Val> = vec![
        env,
        env.current_contract_address().into_val(env),
        call.target.into_val(env),
        call.value.into_val(env),
    ];
    match env.try_invoke_contract::<Val, Error>(&asset, &Symbol::new(env, "transfer"), args) {
        Ok(Ok(_)) => Ok(()),
        _ => {
            log!(env, "value transfer failed", asset, call.value);
            Err(TimelockError::EffectFailed)
        }
    }
}
