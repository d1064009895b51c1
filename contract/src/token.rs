use cosmwasm_std::Uint128;

use crate::{
    contract::{validate_sending_precision, XRP_CURRENCY, XRP_ISSUER},
    error::ContractError,
    state::TokenState,
};

// Issuer+currency is the key we use to find an XRPL originated token
pub fn build_xrpl_token_key(issuer: &str, currency: &str) -> String {
    let mut key = issuer.to_owned();
    key.push_str(currency);
    key
}

// Helper to distinguish between the XRP token and other XRPL originated tokens
pub fn is_token_xrp(issuer: &str, currency: &str) -> bool {
    issuer == XRP_ISSUER && currency == XRP_CURRENCY
}

// Owner driven state changes are only allowed between enabled and disabled;
// processing and inactive are managed by the TrustSet confirmation flow
pub fn set_token_state(
    state: &mut TokenState,
    target_state: Option<TokenState>,
) -> Result<(), ContractError> {
    if let Some(target_state) = target_state {
        if (*state).eq(&TokenState::Inactive) || (*state).eq(&TokenState::Processing) {
            return Err(ContractError::TokenStateIsImmutable {});
        }
        if target_state.eq(&TokenState::Inactive) || target_state.eq(&TokenState::Processing) {
            return Err(ContractError::InvalidTargetTokenState {});
        }

        *state = target_state;
    }

    Ok(())
}

pub fn set_token_sending_precision(
    sending_precision: &mut i32,
    target_sending_precision: Option<i32>,
    decimals: u32,
) -> Result<(), ContractError> {
    if let Some(target_sending_precision) = target_sending_precision {
        validate_sending_precision(target_sending_precision, decimals)?;

        *sending_precision = target_sending_precision;
    }

    Ok(())
}

pub fn set_token_bridging_fee(
    bridging_fee: &mut Uint128,
    target_bridging_fee: Option<Uint128>,
) -> Result<(), ContractError> {
    if let Some(target_bridging_fee) = target_bridging_fee {
        *bridging_fee = target_bridging_fee;
    }

    Ok(())
}

pub fn set_token_max_holding_amount(
    current_bridged_amount: Uint128,
    max_holding_amount: &mut Uint128,
    target_max_holding_amount: Option<Uint128>,
) -> Result<(), ContractError> {
    if let Some(target_max_holding_amount) = target_max_holding_amount {
        // The cap can not go below what the bridge already holds
        if current_bridged_amount > target_max_holding_amount {
            return Err(ContractError::InvalidTargetMaxHoldingAmount {});
        }

        *max_holding_amount = target_max_holding_amount;
    }

    Ok(())
}
