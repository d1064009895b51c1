use std::collections::HashMap;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Api, Empty, Storage};

use crate::{
    address::validate_xrpl_address,
    error::ContractError,
    operation::bump_pending_operation_versions,
    state::{CONFIG, PENDING_ROTATE_KEYS},
};

#[cw_serde]
pub struct Relayer {
    pub coreum_address: Addr,
    pub xrpl_address: String,
    pub xrpl_pub_key: String,
}

pub fn validate_relayers(api: &dyn Api, relayers: &[Relayer]) -> Result<(), ContractError> {
    let mut map_xrpl_addresses = HashMap::new();
    let mut map_xrpl_pubkeys = HashMap::new();
    let mut map_coreum_addresses = HashMap::new();

    for relayer in relayers {
        api.addr_validate(relayer.coreum_address.as_ref())?;
        validate_xrpl_address(&relayer.xrpl_address)?;

        // If the map returns a value during insertion the key is duplicated
        if map_xrpl_addresses
            .insert(relayer.xrpl_address.to_owned(), Empty {})
            .is_some()
        {
            return Err(ContractError::DuplicatedRelayer {});
        };
        if map_xrpl_pubkeys
            .insert(relayer.xrpl_pub_key.to_owned(), Empty {})
            .is_some()
        {
            return Err(ContractError::DuplicatedRelayer {});
        };
        if map_coreum_addresses
            .insert(relayer.coreum_address.to_owned(), Empty {})
            .is_some()
        {
            return Err(ContractError::DuplicatedRelayer {});
        };
    }

    Ok(())
}

pub fn assert_relayer(storage: &dyn Storage, sender: &Addr) -> Result<(), ContractError> {
    let config = CONFIG.load(storage)?;

    if config.relayers.iter().any(|r| r.coreum_address.eq(sender)) {
        return Ok(());
    }

    Err(ContractError::UnauthorizedSender {})
}

pub fn handle_rotate_keys_confirmation(
    storage: &mut dyn Storage,
    new_relayers: Vec<Relayer>,
    new_evidence_threshold: u32,
    accepted: bool,
) -> Result<(), ContractError> {
    PENDING_ROTATE_KEYS.save(storage, &false)?;

    if accepted {
        let mut config = CONFIG.load(storage)?;
        config.relayers = new_relayers;
        config.evidence_threshold = new_evidence_threshold;
        CONFIG.save(storage, &config)?;

        // The signer set changed so every pending signature is stale
        bump_pending_operation_versions(storage)?;
    }

    // The bridge stays halted until the owner explicitly resumes it
    Ok(())
}
