use coreum_wasm_sdk::{assetft, core::CoreumMsg};
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{coin, Addr, Coin, CosmosMsg, Order, StdResult, Storage, Uint128};

use crate::{
    contract::{convert_amount_decimals, XRPL_TOKENS_DECIMALS},
    error::ContractError,
    evidence::{OperationResult, TransactionResult},
    relayer::{handle_rotate_keys_confirmation, Relayer},
    signatures::Signature,
    state::{
        coreum_tokens, xrpl_tokens, BridgeState, Config, PendingRefund, TokenState, CONFIG,
        PENDING_OPERATIONS, PENDING_REFUNDS, PENDING_ROTATE_KEYS, PENDING_TICKET_UPDATE,
    },
    tickets::{handle_ticket_allocation_confirmation, register_used_ticket, return_ticket},
    token::build_xrpl_token_key,
};

#[cw_serde]
pub struct Operation {
    // Unique id used to correlate refunds with the operation that created them.
    // The ticket/account sequence alone is not unique because invalid
    // transactions hand their sequence back to the pool.
    pub id: String,
    // Bumped every time a parameter feeding the canonical XRPL serialization
    // changes (base fee, signer set); a bump discards collected signatures
    pub version: u64,
    pub ticket_sequence: Option<u64>,
    pub account_sequence: Option<u64>,
    pub signatures: Vec<Signature>,
    pub operation_type: OperationType,
    // The base fee must travel with the operation so that relayers signing at
    // different times still serialize the exact same transaction
    pub xrpl_base_fee: u64,
}

impl Operation {
    pub fn operation_sequence(&self) -> u64 {
        self.ticket_sequence
            .unwrap_or_else(|| self.account_sequence.unwrap())
    }
}

#[cw_serde]
pub enum OperationType {
    AllocateTickets {
        number: u32,
    },
    TrustSet {
        issuer: String,
        currency: String,
        trust_set_limit_amount: Uint128,
    },
    RotateKeys {
        new_relayers: Vec<Relayer>,
        new_evidence_threshold: u32,
    },
    #[serde(rename = "coreum_to_xrpl_transfer")]
    CoreumToXRPLTransfer {
        issuer: String,
        currency: String,
        amount: Uint128,
        max_amount: Option<Uint128>,
        sender: Addr,
        recipient: String,
    },
}

impl OperationType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AllocateTickets { .. } => "allocate_tickets",
            Self::TrustSet { .. } => "trust_set",
            Self::RotateKeys { .. } => "rotate_keys",
            Self::CoreumToXRPLTransfer { .. } => "coreum_to_xrpl_transfer",
        }
    }
}

pub fn check_operation_exists(
    storage: &dyn Storage,
    operation_sequence: u64,
) -> Result<Operation, ContractError> {
    let operation = PENDING_OPERATIONS
        .load(storage, operation_sequence)
        .map_err(|_| ContractError::PendingOperationNotFound {})?;

    Ok(operation)
}

pub fn create_pending_operation(
    storage: &mut dyn Storage,
    timestamp: u64,
    ticket_sequence: Option<u64>,
    account_sequence: Option<u64>,
    operation_type: OperationType,
) -> Result<String, ContractError> {
    let config = CONFIG.load(storage)?;

    check_valid_operation_if_halted(storage, &config, &operation_type)?;

    let operation_sequence = ticket_sequence.unwrap_or_else(|| account_sequence.unwrap());

    let operation_unique_id = format!("{timestamp}-{operation_sequence}");
    let operation = Operation {
        id: operation_unique_id.to_owned(),
        version: 1,
        ticket_sequence,
        account_sequence,
        signatures: vec![],
        operation_type,
        xrpl_base_fee: config.xrpl_base_fee,
    };

    if PENDING_OPERATIONS.has(storage, operation_sequence) {
        return Err(ContractError::PendingOperationAlreadyExists {});
    }
    PENDING_OPERATIONS.save(storage, operation_sequence, &operation)?;

    Ok(operation_unique_id)
}

/// Applies the confirmed XRPL outcome of a pending operation and removes it
/// from the queue, settling the ticket it was holding.
pub fn handle_operation(
    storage: &mut dyn Storage,
    timestamp: u64,
    operation: &Operation,
    operation_result: &Option<OperationResult>,
    transaction_result: &TransactionResult,
    tx_hash: &Option<String>,
    messages: &mut Vec<CosmosMsg<CoreumMsg>>,
) -> Result<(), ContractError> {
    let operation_sequence = operation.operation_sequence();

    match &operation.operation_type {
        OperationType::AllocateTickets { number } => match operation_result {
            Some(OperationResult::TicketsAllocation { tickets }) => {
                handle_ticket_allocation_confirmation(
                    storage,
                    tickets.to_owned(),
                    *number,
                    transaction_result,
                )?;
            }
            None => return Err(ContractError::InvalidOperationResult {}),
        },
        OperationType::TrustSet {
            issuer, currency, ..
        } => {
            handle_trust_set_confirmation(storage, issuer, currency, transaction_result)?;
        }
        OperationType::RotateKeys {
            new_relayers,
            new_evidence_threshold,
        } => {
            handle_rotate_keys_confirmation(
                storage,
                new_relayers.to_owned(),
                new_evidence_threshold.to_owned(),
                transaction_result.eq(&TransactionResult::Accepted),
            )?;
        }
        OperationType::CoreumToXRPLTransfer {
            issuer,
            currency,
            amount,
            max_amount,
            sender,
            ..
        } => {
            handle_coreum_to_xrpl_transfer_confirmation(
                storage,
                transaction_result,
                tx_hash.to_owned(),
                operation.id.to_owned(),
                issuer,
                currency,
                max_amount.unwrap_or(*amount),
                sender.to_owned(),
                messages,
            )?;
        }
    }

    PENDING_OPERATIONS.remove(storage, operation_sequence);

    match transaction_result {
        // An invalid operation never consumed its ticket so it goes back to the pool
        TransactionResult::Invalid => {
            if let Some(ticket_sequence) = operation.ticket_sequence {
                return_ticket(storage, ticket_sequence)?;
            }
        }
        // Both accepted and rejected transactions burned the ticket on XRPL
        _ => {
            if operation.ticket_sequence.is_some() {
                register_used_ticket(storage, timestamp)?;
            }
        }
    }

    Ok(())
}

pub fn handle_trust_set_confirmation(
    storage: &mut dyn Storage,
    issuer: &str,
    currency: &str,
    transaction_result: &TransactionResult,
) -> Result<(), ContractError> {
    let key = build_xrpl_token_key(issuer, currency);

    let mut token = xrpl_tokens()
        .load(storage, key.to_owned())
        .map_err(|_| ContractError::TokenNotRegistered {})?;

    if transaction_result.eq(&TransactionResult::Accepted) {
        token.state = TokenState::Enabled;
    } else {
        token.state = TokenState::Inactive;
    }

    xrpl_tokens().save(storage, key, &token)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_coreum_to_xrpl_transfer_confirmation(
    storage: &mut dyn Storage,
    transaction_result: &TransactionResult,
    tx_hash: Option<String>,
    operation_id: String,
    issuer: &str,
    currency: &str,
    amount_sent: Uint128,
    sender: Addr,
    messages: &mut Vec<CosmosMsg<CoreumMsg>>,
) -> Result<(), ContractError> {
    let key = build_xrpl_token_key(issuer, currency);
    match xrpl_tokens().may_load(storage, key)? {
        Some(xrpl_token) => {
            if transaction_result.eq(&TransactionResult::Accepted) {
                // The wrapper only leaves the supply once XRPL delivered it
                let burn_msg = CosmosMsg::from(CoreumMsg::AssetFT(assetft::Msg::Burn {
                    coin: coin(amount_sent.u128(), xrpl_token.coreum_denom),
                }));
                messages.push(burn_msg);
            } else {
                store_pending_refund(
                    storage,
                    operation_id,
                    tx_hash,
                    sender,
                    coin(amount_sent.u128(), xrpl_token.coreum_denom),
                )?;
            }
        }
        None => {
            // A Coreum originated token stays locked in the contract on success;
            // on failure the locked amount becomes claimable by the sender again
            if transaction_result.ne(&TransactionResult::Accepted) {
                match coreum_tokens()
                    .idx
                    .xrpl_currency
                    .item(storage, currency.to_owned())?
                    .map(|(_, ct)| ct)
                {
                    Some(token) => {
                        let amount_to_send_back = convert_amount_decimals(
                            XRPL_TOKENS_DECIMALS,
                            token.decimals,
                            amount_sent,
                        )?;
                        store_pending_refund(
                            storage,
                            operation_id,
                            tx_hash,
                            sender,
                            coin(amount_to_send_back.u128(), token.denom),
                        )?;
                    }
                    // Only reachable if the multisig issued a token on its own
                    // on XRPL and relayers report an operation for it
                    None => return Err(ContractError::TokenNotRegistered {}),
                };
            }
        }
    }

    Ok(())
}

pub fn store_pending_refund(
    storage: &mut dyn Storage,
    operation_id: String,
    xrpl_tx_hash: Option<String>,
    receiver: Addr,
    coin: Coin,
) -> Result<(), ContractError> {
    let pending_refund = PendingRefund {
        address: receiver.to_owned(),
        xrpl_tx_hash,
        id: operation_id.to_owned(),
        coin,
    };

    PENDING_REFUNDS.save(storage, (receiver, operation_id), &pending_refund)?;

    Ok(())
}

pub fn remove_pending_refund(
    storage: &mut dyn Storage,
    sender: &Addr,
    pending_refund_id: String,
) -> Result<Coin, ContractError> {
    let pending_refund = PENDING_REFUNDS
        .load(storage, (sender.to_owned(), pending_refund_id.to_owned()))
        .map_err(|_| ContractError::PendingRefundNotFound {})?;

    PENDING_REFUNDS.remove(storage, (sender.to_owned(), pending_refund_id));

    Ok(pending_refund.coin)
}

/// Owner recovery path for an operation stuck on XRPL: the operation is
/// dropped as if it had an invalid result, returning its ticket to the pool
/// and booking a refund where funds were already debited.
pub fn cancel_pending_operation(
    storage: &mut dyn Storage,
    operation: &Operation,
) -> Result<(), ContractError> {
    match &operation.operation_type {
        OperationType::AllocateTickets { .. } => {
            PENDING_TICKET_UPDATE.save(storage, &false)?;
        }
        OperationType::RotateKeys { .. } => {
            PENDING_ROTATE_KEYS.save(storage, &false)?;
        }
        OperationType::TrustSet {
            issuer, currency, ..
        } => {
            handle_trust_set_confirmation(storage, issuer, currency, &TransactionResult::Invalid)?;
        }
        OperationType::CoreumToXRPLTransfer {
            issuer,
            currency,
            amount,
            max_amount,
            sender,
            ..
        } => {
            handle_coreum_to_xrpl_transfer_confirmation(
                storage,
                &TransactionResult::Invalid,
                None,
                operation.id.to_owned(),
                issuer,
                currency,
                max_amount.unwrap_or(*amount),
                sender.to_owned(),
                &mut vec![],
            )?;
        }
    }

    PENDING_OPERATIONS.remove(storage, operation.operation_sequence());

    if let Some(ticket_sequence) = operation.ticket_sequence {
        return_ticket(storage, ticket_sequence)?;
    }

    Ok(())
}

pub fn check_valid_operation_if_halted(
    storage: &dyn Storage,
    config: &Config,
    operation_type: &OperationType,
) -> Result<(), ContractError> {
    if config.bridge_state.eq(&BridgeState::Halted) {
        match &operation_type {
            // While halted, only the rotation being confirmed and ticket
            // allocations may make progress so the bridge can quiesce
            OperationType::RotateKeys { .. } => {
                if !PENDING_ROTATE_KEYS.load(storage)? {
                    return Err(ContractError::BridgeHalted {});
                }
            }
            OperationType::AllocateTickets { .. } => (),
            _ => return Err(ContractError::BridgeHalted {}),
        }
    }

    Ok(())
}

/// Invalidates every pending operation's collected signatures after a change
/// of a parameter that feeds the canonical XRPL serialization.
pub fn bump_pending_operation_versions(storage: &mut dyn Storage) -> Result<(), ContractError> {
    let config = CONFIG.load(storage)?;

    let operations: Vec<(u64, Operation)> = PENDING_OPERATIONS
        .range(storage, None, None, Order::Ascending)
        .collect::<StdResult<_>>()?;

    for (operation_sequence, mut operation) in operations {
        operation.version += 1;
        operation.signatures.clear();
        operation.xrpl_base_fee = config.xrpl_base_fee;
        PENDING_OPERATIONS.save(storage, operation_sequence, &operation)?;
    }

    Ok(())
}
