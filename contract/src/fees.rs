use cosmwasm_std::{coin, Addr, Coin, Storage, Uint128};

use crate::{
    error::ContractError,
    state::{CONFIG, FEES_COLLECTED, FEE_REMAINDERS},
};

pub fn amount_after_bridge_fees(
    amount: Uint128,
    bridging_fee: Uint128,
) -> Result<Uint128, ContractError> {
    let amount_after_bridge_fees = amount
        .checked_sub(bridging_fee)
        .map_err(|_| ContractError::CannotCoverBridgingFees {})?;

    Ok(amount_after_bridge_fees)
}

/// Books the bridging fee plus the truncated dust for the current relayers and
/// returns the total amount collected.
pub fn handle_fee_collection(
    storage: &mut dyn Storage,
    bridging_fee: Uint128,
    token_denom: String,
    truncated_portion: Uint128,
) -> Result<Uint128, ContractError> {
    let fee_collected = bridging_fee.checked_add(truncated_portion)?;

    collect_fees(storage, coin(fee_collected.u128(), token_denom))?;

    Ok(fee_collected)
}

/// Splits a collected fee equally between the current relayers. Whatever does
/// not divide evenly is carried per denom and folded into the next collection.
pub fn collect_fees(storage: &mut dyn Storage, fee: Coin) -> Result<(), ContractError> {
    if fee.amount.is_zero() {
        return Ok(());
    }

    let relayers = CONFIG.load(storage)?.relayers;

    let remainder = FEE_REMAINDERS
        .may_load(storage, fee.denom.to_owned())?
        .unwrap_or_default();
    let to_split = fee.amount.checked_add(remainder)?;

    let share = to_split.u128() / relayers.len() as u128;
    let new_remainder = to_split.u128() % relayers.len() as u128;

    if share != 0 {
        for relayer in relayers.iter() {
            add_relayer_fee(
                storage,
                &relayer.coreum_address,
                coin(share, fee.denom.to_owned()),
            )?;
        }
    }

    FEE_REMAINDERS.save(storage, fee.denom, &Uint128::new(new_remainder))?;

    Ok(())
}

fn add_relayer_fee(
    storage: &mut dyn Storage,
    relayer: &Addr,
    fee: Coin,
) -> Result<(), ContractError> {
    let mut fees_collected = FEES_COLLECTED
        .may_load(storage, relayer.to_owned())?
        .unwrap_or_default();

    match fees_collected.iter_mut().find(|c| c.denom == fee.denom) {
        Some(coin) => coin.amount += fee.amount,
        None => fees_collected.push(fee),
    }

    FEES_COLLECTED.save(storage, relayer.to_owned(), &fees_collected)?;

    Ok(())
}

/// Removes the claimed amounts from the relayer's fee ledger, failing if any
/// requested coin exceeds what was collected for the relayer.
pub fn subtract_relayer_fees(
    storage: &mut dyn Storage,
    sender: &Addr,
    amounts: &[Coin],
) -> Result<(), ContractError> {
    let mut fees_collected = FEES_COLLECTED
        .may_load(storage, sender.to_owned())?
        .unwrap_or_default();

    for requested in amounts {
        match fees_collected
            .iter_mut()
            .find(|c| c.denom == requested.denom)
        {
            Some(collected) => {
                collected.amount = collected
                    .amount
                    .checked_sub(requested.amount)
                    .map_err(|_| ContractError::NotEnoughFeesToClaim {})?;
            }
            None => return Err(ContractError::NotEnoughFeesToClaim {}),
        }
    }

    fees_collected.retain(|c| !c.amount.is_zero());
    if fees_collected.is_empty() {
        FEES_COLLECTED.remove(storage, sender.to_owned());
    } else {
        FEES_COLLECTED.save(storage, sender.to_owned(), &fees_collected)?;
    }

    Ok(())
}
