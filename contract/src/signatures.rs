use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Storage};

use crate::{
    error::ContractError,
    operation::check_valid_operation_if_halted,
    state::{CONFIG, PENDING_OPERATIONS},
};

#[cw_serde]
pub struct Signature {
    pub relayer_coreum_address: Addr,
    pub signature: String,
}

pub fn add_signature(
    storage: &mut dyn Storage,
    operation_sequence: u64,
    operation_version: u64,
    sender: Addr,
    signature: String,
) -> Result<(), ContractError> {
    let mut pending_operation = PENDING_OPERATIONS
        .load(storage, operation_sequence)
        .map_err(|_| ContractError::PendingOperationNotFound {})?;

    // A signature over a stale version would not verify against the transaction
    // the quorum is going to assemble
    if operation_version != pending_operation.version {
        return Err(ContractError::OperationVersionMismatch {});
    }

    let config = CONFIG.load(storage)?;
    check_valid_operation_if_halted(storage, &config, &pending_operation.operation_type)?;

    if pending_operation
        .signatures
        .iter()
        .any(|s| s.relayer_coreum_address.eq(&sender))
    {
        return Err(ContractError::SignatureAlreadyProvided {});
    }

    pending_operation.signatures.push(Signature {
        relayer_coreum_address: sender,
        signature,
    });
    PENDING_OPERATIONS.save(storage, operation_sequence, &pending_operation)?;

    Ok(())
}
