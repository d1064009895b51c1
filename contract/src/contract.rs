use crate::{
    address::validate_xrpl_address,
    error::ContractError,
    evidence::{handle_evidence, hash_bytes, Evidence, TransactionResult},
    fees::{amount_after_bridge_fees, handle_fee_collection, subtract_relayer_fees},
    msg::{
        AvailableTicketsResponse, CoreumTokenResponse, CoreumTokensResponse, ExecuteMsg,
        FeesCollectedResponse, InstantiateMsg, PendingOperationsResponse, PendingRefundsResponse,
        ProcessedTxResponse, ProhibitedXRPLRecipientsResponse, QueryMsg, TransactionEvidence,
        TransactionEvidenceResponse, TransactionEvidencesResponse, XRPLTokenResponse,
        XRPLTokensResponse, XRPLTransfer,
    },
    operation::{
        cancel_pending_operation, check_operation_exists, create_pending_operation,
        bump_pending_operation_versions, handle_operation, remove_pending_refund, OperationType,
    },
    relayer::{assert_relayer, validate_relayers, Relayer},
    signatures::add_signature,
    state::{
        coreum_tokens, xrpl_tokens, BridgeState, Config, ContractActions, CoreumToken, TokenState,
        XRPLToken, AVAILABLE_TICKETS, CONFIG, FEES_COLLECTED, PENDING_OPERATIONS,
        PENDING_REFUNDS, PENDING_ROTATE_KEYS, PENDING_TICKET_UPDATE, PROCESSED_TXS,
        PROHIBITED_XRPL_RECIPIENTS, TX_EVIDENCES, USED_TICKETS_COUNTER,
    },
    tickets::allocate_ticket,
    token::{
        build_xrpl_token_key, is_token_xrp, set_token_bridging_fee, set_token_max_holding_amount,
        set_token_sending_precision, set_token_state,
    },
};
use coreum_wasm_sdk::{
    assetft::{self, Msg::Issue, ParamsResponse, Query, BURNING, IBC, MINTING},
    core::{CoreumMsg, CoreumQueries, CoreumResult},
};
use cosmwasm_std::{
    coin, coins, entry_point, to_json_binary, Addr, Attribute, BankMsg, Binary, Coin, CosmosMsg,
    Deps, DepsMut, Env, MessageInfo, Order, Response, StdResult, Storage, Uint128,
};
use cw2::set_contract_version;
use cw_ownable::{assert_owner, get_ownership, initialize_owner, Action};
use cw_utils::one_coin;
use std::collections::VecDeque;

// version info for migration info
const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const MAX_PAGE_LIMIT: u32 = 250;

pub const MAX_RELAYERS: u32 = 32;
pub const MAX_TICKETS_PER_ALLOCATION: u32 = 250;

pub const XRP_SYMBOL: &str = "XRP";
pub const XRP_SUBUNIT: &str = "drop";
pub const XRP_DECIMALS: u32 = 6;
pub const XRP_DEFAULT_SENDING_PRECISION: i32 = 6;
pub const XRP_DEFAULT_MAX_HOLDING_AMOUNT: u128 =
    10u128.pow(16 - XRP_DEFAULT_SENDING_PRECISION as u32 + XRP_DECIMALS);
// XRP is not issued by any account; we key it under the reserved account zero
pub const XRP_ISSUER: &str = "rrrrrrrrrrrrrrrrrrrrrhoLvTp";
pub const XRP_CURRENCY: &str = "XRP";

const COREUM_CURRENCY_PREFIX: &str = "coreum";
const XRPL_DENOM_PREFIX: &str = "xrpl";
pub const XRPL_TOKENS_DECIMALS: u32 = 15;

const MIN_SENDING_PRECISION: i32 = -15;
const MAX_SENDING_PRECISION: i32 = 15;
const MAX_COREUM_TOKEN_DECIMALS: u32 = 20;

// XRPL reserved addresses that can never receive bridged funds
pub const INITIAL_PROHIBITED_XRPL_RECIPIENTS: [&str; 4] = [
    // Account zero
    "rrrrrrrrrrrrrrrrrrrrrhoLvTp",
    // Account one
    "rrrrrrrrrrrrrrrrrrrrBZbvji",
    // Reserved for the XRP Ledger name service
    "rrrrrrrrrrrrrrrrrNAMEtxvNvQ",
    // NaN address
    "rrrrrrrrrrrrrrrrrrrn5RM1rHd",
];

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> CoreumResult<ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    initialize_owner(
        deps.storage,
        deps.api,
        Some(deps.api.addr_validate(msg.owner.as_ref())?.as_ref()),
    )?;

    if msg.relayers.len() as u32 > MAX_RELAYERS {
        return Err(ContractError::TooManyRelayers {});
    }
    validate_relayers(deps.api, &msg.relayers)?;

    // We want to check that exactly the issue fee was sent, not more.
    check_issue_fee(&deps, &info)?;

    if msg.evidence_threshold == 0
        || msg.evidence_threshold as usize > msg.relayers.len()
    {
        return Err(ContractError::InvalidThreshold {});
    }

    // We need at least one ticket to be able to trigger the allocation that
    // refills the pool, and allocations can't be bigger than one TicketCreate allows
    if msg.used_ticket_sequence_threshold <= 1
        || msg.used_ticket_sequence_threshold > MAX_TICKETS_PER_ALLOCATION
    {
        return Err(ContractError::InvalidUsedTicketSequenceThreshold {});
    }

    validate_xrpl_address(&msg.bridge_xrpl_address)?;

    let config = Config {
        relayers: msg.relayers,
        evidence_threshold: msg.evidence_threshold,
        used_ticket_sequence_threshold: msg.used_ticket_sequence_threshold,
        trust_set_limit_amount: msg.trust_set_limit_amount,
        bridge_xrpl_address: msg.bridge_xrpl_address.to_owned(),
        bridge_state: BridgeState::Active,
        xrpl_base_fee: msg.xrpl_base_fee,
    };
    CONFIG.save(deps.storage, &config)?;

    AVAILABLE_TICKETS.save(deps.storage, &VecDeque::new())?;
    USED_TICKETS_COUNTER.save(deps.storage, &0)?;
    PENDING_TICKET_UPDATE.save(deps.storage, &false)?;
    PENDING_ROTATE_KEYS.save(deps.storage, &false)?;

    let mut prohibited_xrpl_recipients: Vec<String> = INITIAL_PROHIBITED_XRPL_RECIPIENTS
        .iter()
        .map(|a| a.to_string())
        .collect();
    prohibited_xrpl_recipients.push(msg.bridge_xrpl_address);
    PROHIBITED_XRPL_RECIPIENTS.save(deps.storage, &prohibited_xrpl_recipients)?;

    let xrp_issue_msg = CosmosMsg::from(CoreumMsg::AssetFT(Issue {
        symbol: XRP_SYMBOL.to_string(),
        subunit: XRP_SUBUNIT.to_string(),
        precision: XRP_DECIMALS,
        initial_amount: Uint128::zero(),
        description: None,
        features: Some(vec![MINTING, BURNING, IBC]),
        burn_rate: "0.0".to_string(),
        send_commission_rate: "0.0".to_string(),
        uri: None,
        uri_hash: None,
    }));

    let xrp_coreum_denom = format!("{}-{}", XRP_SUBUNIT, env.contract.address).to_lowercase();

    // XRP is enabled from the start because it does not need a trust line
    let token = XRPLToken {
        issuer: XRP_ISSUER.to_string(),
        currency: XRP_CURRENCY.to_string(),
        coreum_denom: xrp_coreum_denom,
        sending_precision: XRP_DEFAULT_SENDING_PRECISION,
        max_holding_amount: Uint128::new(XRP_DEFAULT_MAX_HOLDING_AMOUNT),
        state: TokenState::Enabled,
        bridging_fee: Uint128::zero(),
    };
    let key = build_xrpl_token_key(XRP_ISSUER, XRP_CURRENCY);
    xrpl_tokens().save(deps.storage, key, &token)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::Instantiation.as_str())
        .add_attribute("contract_name", CONTRACT_NAME)
        .add_attribute("contract_version", CONTRACT_VERSION)
        .add_attribute("owner", info.sender)
        .add_message(xrp_issue_msg))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> CoreumResult<ContractError> {
    match msg {
        ExecuteMsg::UpdateOwnership(action) => {
            update_ownership(deps.into_empty(), env, info, action)
        }
        ExecuteMsg::RegisterCoreumToken {
            denom,
            decimals,
            sending_precision,
            max_holding_amount,
            bridging_fee,
        } => register_coreum_token(
            deps.into_empty(),
            env,
            info.sender,
            denom,
            decimals,
            sending_precision,
            max_holding_amount,
            bridging_fee,
        ),
        ExecuteMsg::RegisterXRPLToken {
            issuer,
            currency,
            sending_precision,
            max_holding_amount,
            bridging_fee,
        } => register_xrpl_token(
            deps,
            env,
            info,
            issuer,
            currency,
            sending_precision,
            max_holding_amount,
            bridging_fee,
        ),
        ExecuteMsg::SaveEvidence { evidence } => save_evidence(deps, env, info.sender, evidence),
        ExecuteMsg::RecoverTickets {
            account_sequence,
            number_of_tickets,
        } => recover_tickets(
            deps.into_empty(),
            env,
            info.sender,
            account_sequence,
            number_of_tickets,
        ),
        ExecuteMsg::RecoverXRPLTokenRegistration { issuer, currency } => {
            recover_xrpl_token_registration(deps.into_empty(), env, info.sender, issuer, currency)
        }
        ExecuteMsg::SaveSignature {
            operation_sequence,
            operation_version,
            signature,
        } => save_signature(
            deps.into_empty(),
            info.sender,
            operation_sequence,
            operation_version,
            signature,
        ),
        ExecuteMsg::SendToXRPL {
            recipient,
            deliver_amount,
        } => send_to_xrpl(deps, env, info, recipient, deliver_amount),
        ExecuteMsg::MultiSendToXRPL { transfers } => {
            multi_send_to_xrpl(deps, env, info, transfers)
        }
        ExecuteMsg::UpdateXRPLToken {
            issuer,
            currency,
            state,
            sending_precision,
            bridging_fee,
            max_holding_amount,
        } => update_xrpl_token(
            deps,
            info.sender,
            issuer,
            currency,
            state,
            sending_precision,
            bridging_fee,
            max_holding_amount,
        ),
        ExecuteMsg::UpdateCoreumToken {
            denom,
            state,
            sending_precision,
            bridging_fee,
            max_holding_amount,
        } => update_coreum_token(
            deps,
            env,
            info.sender,
            denom,
            state,
            sending_precision,
            bridging_fee,
            max_holding_amount,
        ),
        ExecuteMsg::UpdateXRPLBaseFee { xrpl_base_fee } => {
            update_xrpl_base_fee(deps.into_empty(), info.sender, xrpl_base_fee)
        }
        ExecuteMsg::UpdateProhibitedXRPLRecipients {
            prohibited_xrpl_recipients,
        } => update_prohibited_xrpl_recipients(
            deps.into_empty(),
            info.sender,
            prohibited_xrpl_recipients,
        ),
        ExecuteMsg::ClaimRelayerFees { amounts } => {
            claim_relayer_fees(deps.into_empty(), info.sender, amounts)
        }
        ExecuteMsg::ClaimRefund { pending_refund_id } => {
            claim_refund(deps.into_empty(), info.sender, pending_refund_id)
        }
        ExecuteMsg::HaltBridge {} => halt_bridge(deps.into_empty(), info.sender),
        ExecuteMsg::ResumeBridge {} => resume_bridge(deps.into_empty(), info.sender),
        ExecuteMsg::RotateKeys {
            new_relayers,
            new_evidence_threshold,
        } => rotate_keys(deps, env, info.sender, new_relayers, new_evidence_threshold),
        ExecuteMsg::CancelPendingOperation { operation_sequence } => {
            cancel_operation(deps.into_empty(), info.sender, operation_sequence)
        }
    }
}

fn update_ownership(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    action: Action,
) -> CoreumResult<ContractError> {
    let ownership = cw_ownable::update_ownership(deps, &env.block, &info.sender, action)?;
    Ok(Response::new().add_attributes(ownership.into_attributes()))
}

#[allow(clippy::too_many_arguments)]
fn register_coreum_token(
    deps: DepsMut,
    env: Env,
    sender: Addr,
    denom: String,
    decimals: u32,
    sending_precision: i32,
    max_holding_amount: Uint128,
    bridging_fee: Uint128,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;
    assert_bridge_active(deps.as_ref().storage)?;

    if decimals == 0 || decimals > MAX_COREUM_TOKEN_DECIMALS {
        return Err(ContractError::InvalidDecimals {});
    }
    validate_sending_precision(sending_precision, decimals)?;

    if coreum_tokens().has(deps.storage, denom.to_owned()) {
        return Err(ContractError::CoreumTokenAlreadyRegistered { denom });
    }

    // We derive a deterministic currency hashing the denom, the decimals and the
    // current time, and encode it into the 40 character XRPL hexadecimal format
    let to_hash = format!("{}{}{}", denom, decimals, env.block.time.seconds()).into_bytes();
    let hex_string = hash_bytes(&to_hash).get(0..10).unwrap().to_lowercase();
    let xrpl_currency =
        convert_currency_to_xrpl_hexadecimal(format!("{}{}", COREUM_CURRENCY_PREFIX, hex_string));

    if coreum_tokens()
        .idx
        .xrpl_currency
        .item(deps.storage, xrpl_currency.to_owned())?
        .is_some()
    {
        return Err(ContractError::RegistrationFailure {});
    }

    let token = CoreumToken {
        denom: denom.to_owned(),
        decimals,
        xrpl_currency: xrpl_currency.to_owned(),
        sending_precision,
        max_holding_amount,
        // Coreum originated tokens need no trust line, they are usable immediately
        state: TokenState::Enabled,
        bridging_fee,
    };
    coreum_tokens().save(deps.storage, denom.to_owned(), &token)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::RegisterCoreumToken.as_str())
        .add_attribute("denom", denom)
        .add_attribute("decimals", decimals.to_string())
        .add_attribute("xrpl_currency_for_denom", xrpl_currency))
}

#[allow(clippy::too_many_arguments)]
fn register_xrpl_token(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    info: MessageInfo,
    issuer: String,
    currency: String,
    sending_precision: i32,
    max_holding_amount: Uint128,
    bridging_fee: Uint128,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &info.sender)?;
    assert_bridge_active(deps.storage)?;

    validate_xrpl_address(&issuer)?;
    validate_xrpl_currency(&currency)?;
    validate_sending_precision(sending_precision, XRPL_TOKENS_DECIMALS)?;

    // We want to check that exactly the issue fee was sent, not more.
    check_issue_fee(&deps, &info)?;

    let key = build_xrpl_token_key(&issuer, &currency);
    if xrpl_tokens().has(deps.storage, key.to_owned()) {
        return Err(ContractError::XRPLTokenAlreadyRegistered { issuer, currency });
    }

    // We derive a deterministic denom hashing the issuer, currency, decimals and
    // the current time
    let to_hash = format!(
        "{}{}{}{}",
        issuer,
        currency,
        XRPL_TOKENS_DECIMALS,
        env.block.time.seconds()
    )
    .into_bytes();
    let hex_string = hash_bytes(&to_hash).get(0..10).unwrap().to_lowercase();

    // Symbol and subunit we will use for the issued token on Coreum
    let symbol_and_subunit = format!("{}{}", XRPL_DENOM_PREFIX, hex_string);

    let issue_msg = CosmosMsg::from(CoreumMsg::AssetFT(Issue {
        symbol: symbol_and_subunit.to_uppercase(),
        subunit: symbol_and_subunit.to_owned(),
        precision: XRPL_TOKENS_DECIMALS,
        initial_amount: Uint128::zero(),
        description: None,
        features: Some(vec![MINTING, BURNING, IBC]),
        burn_rate: "0.0".to_string(),
        send_commission_rate: "0.0".to_string(),
        uri: None,
        uri_hash: None,
    }));

    // Denom that the token will have on Coreum
    let denom = format!("{}-{}", symbol_and_subunit, env.contract.address).to_lowercase();

    if xrpl_tokens()
        .idx
        .coreum_denom
        .item(deps.storage, denom.to_owned())?
        .is_some()
    {
        return Err(ContractError::RegistrationFailure {});
    };

    let token = XRPLToken {
        issuer: issuer.to_owned(),
        currency: currency.to_owned(),
        coreum_denom: denom.to_owned(),
        sending_precision,
        max_holding_amount,
        // Registered tokens wait for the TrustSet confirmation before enabling
        state: TokenState::Processing,
        bridging_fee,
    };
    xrpl_tokens().save(deps.storage, key, &token)?;

    // The TrustSet that allows the multisig account to hold the token is
    // enqueued right away
    let config = CONFIG.load(deps.storage)?;
    let ticket = allocate_ticket(deps.storage)?;
    create_pending_operation(
        deps.storage,
        env.block.time.seconds(),
        Some(ticket),
        None,
        OperationType::TrustSet {
            issuer: issuer.to_owned(),
            currency: currency.to_owned(),
            trust_set_limit_amount: config.trust_set_limit_amount,
        },
    )?;

    Ok(Response::new()
        .add_message(issue_msg)
        .add_attribute("action", ContractActions::RegisterXRPLToken.as_str())
        .add_attribute("issuer", issuer)
        .add_attribute("currency", currency)
        .add_attribute("denom", denom))
}

fn save_evidence(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    sender: Addr,
    evidence: Evidence,
) -> CoreumResult<ContractError> {
    evidence.validate()?;
    assert_relayer(deps.storage, &sender)?;

    let config = CONFIG.load(deps.storage)?;

    let mut response = Response::new()
        .add_attribute("action", ContractActions::SaveEvidence.as_str())
        .add_attribute("sender", sender.to_owned());

    match evidence.to_owned() {
        Evidence::XRPLToCoreumTransfer {
            tx_hash,
            issuer,
            currency,
            amount,
            recipient,
        } => {
            // New inbound transfers stop being accepted while the bridge halts;
            // relayers resubmit them once it resumes
            if config.bridge_state.eq(&BridgeState::Halted) {
                return Err(ContractError::BridgeHalted {});
            }

            let mut messages = vec![];
            if issuer.ne(&config.bridge_xrpl_address) {
                // An XRPL originated token being bridged to Coreum
                let key = build_xrpl_token_key(&issuer, &currency);
                let token = xrpl_tokens()
                    .load(deps.storage, key)
                    .map_err(|_| ContractError::TokenNotRegistered {})?;

                if token.state.ne(&TokenState::Enabled) {
                    return Err(ContractError::TokenDisabled {});
                }

                let decimals = if is_token_xrp(&token.issuer, &token.currency) {
                    XRP_DECIMALS
                } else {
                    XRPL_TOKENS_DECIMALS
                };

                // The cap counts everything the contract ever minted for the
                // token, including collected but unclaimed fees
                let bridged = deps
                    .querier
                    .query_supply(token.coreum_denom.to_owned())?
                    .amount;
                if bridged.checked_add(amount)? > token.max_holding_amount {
                    return Err(ContractError::MaximumBridgedAmountReached {});
                }

                let threshold_reached =
                    handle_evidence(deps.storage, sender, &evidence)?;

                response = response
                    .add_attribute("hash", tx_hash)
                    .add_attribute("issuer", issuer)
                    .add_attribute("currency", currency)
                    .add_attribute("amount", amount.to_string())
                    .add_attribute("recipient", recipient.to_string())
                    .add_attribute("threshold_reached", threshold_reached.to_string());

                if threshold_reached {
                    if recipient.eq(&env.contract.address) {
                        // The destination is not creditable; the evidence is
                        // settled with the funds kept locked on the XRPL side
                        response = response.add_attribute("transfer_rejected", "true");
                    } else {
                        let amount_after_fees =
                            amount_after_bridge_fees(amount, token.bridging_fee)?;
                        let (amount_to_send, truncated_portion) = truncate_amount(
                            token.sending_precision,
                            decimals,
                            amount_after_fees,
                        )?;
                        handle_fee_collection(
                            deps.storage,
                            token.bridging_fee,
                            token.coreum_denom.to_owned(),
                            truncated_portion,
                        )?;

                        // Mint the full inbound amount; the recipient share is
                        // forwarded and the fee share stays claimable
                        let mint_msg = CosmosMsg::from(CoreumMsg::AssetFT(assetft::Msg::Mint {
                            coin: coin(amount.u128(), token.coreum_denom.to_owned()),
                            recipient: None,
                        }));
                        let send_msg = CosmosMsg::Bank(BankMsg::Send {
                            to_address: recipient.to_string(),
                            amount: coins(amount_to_send.u128(), token.coreum_denom),
                        });
                        messages.push(mint_msg);
                        messages.push(send_msg);
                    }
                }
            } else {
                // A Coreum originated token coming back from XRPL
                let token = coreum_tokens()
                    .idx
                    .xrpl_currency
                    .item(deps.storage, currency.to_owned())?
                    .map(|(_, ct)| ct)
                    .ok_or(ContractError::TokenNotRegistered {})?;

                if token.state.ne(&TokenState::Enabled) {
                    return Err(ContractError::TokenDisabled {});
                }

                let threshold_reached =
                    handle_evidence(deps.storage, sender, &evidence)?;

                response = response
                    .add_attribute("hash", tx_hash)
                    .add_attribute("issuer", issuer)
                    .add_attribute("currency", currency)
                    .add_attribute("amount", amount.to_string())
                    .add_attribute("recipient", recipient.to_string())
                    .add_attribute("threshold_reached", threshold_reached.to_string());

                if threshold_reached {
                    if recipient.eq(&env.contract.address) {
                        response = response.add_attribute("transfer_rejected", "true");
                    } else {
                        // Amounts travel on XRPL in the 15 decimal representation
                        let amount_in_coreum = convert_amount_decimals(
                            XRPL_TOKENS_DECIMALS,
                            token.decimals,
                            amount,
                        )?;
                        let amount_after_fees =
                            amount_after_bridge_fees(amount_in_coreum, token.bridging_fee)?;
                        let (amount_to_send, truncated_portion) = truncate_amount(
                            token.sending_precision,
                            token.decimals,
                            amount_after_fees,
                        )?;
                        handle_fee_collection(
                            deps.storage,
                            token.bridging_fee,
                            token.denom.to_owned(),
                            truncated_portion,
                        )?;

                        // The original coins are locked in the contract, unlock them
                        let send_msg = CosmosMsg::Bank(BankMsg::Send {
                            to_address: recipient.to_string(),
                            amount: coins(amount_to_send.u128(), token.denom),
                        });
                        messages.push(send_msg);
                    }
                }
            }

            Ok(response.add_messages(messages))
        }
        Evidence::XRPLTransactionResult {
            tx_hash,
            account_sequence,
            ticket_sequence,
            transaction_result,
            operation_result,
        } => {
            let operation_sequence = ticket_sequence
                .unwrap_or_else(|| account_sequence.unwrap());
            let operation = check_operation_exists(deps.storage, operation_sequence)?;

            let threshold_reached = handle_evidence(deps.storage, sender, &evidence)?;

            let mut messages = vec![];
            if threshold_reached {
                handle_operation(
                    deps.storage,
                    env.block.time.seconds(),
                    &operation,
                    &operation_result,
                    &transaction_result,
                    &tx_hash,
                    &mut messages,
                )?;
            }

            response = response
                .add_attribute("operation_type", operation.operation_type.as_str())
                .add_attribute("operation_sequence", operation_sequence.to_string())
                .add_attribute("transaction_result", transaction_result.as_str())
                .add_attribute("threshold_reached", threshold_reached.to_string());
            if let Some(tx_hash) = tx_hash {
                response = response.add_attribute("hash", tx_hash);
            }

            Ok(response.add_messages(messages))
        }
    }
}

fn recover_tickets(
    deps: DepsMut,
    env: Env,
    sender: Addr,
    account_sequence: u64,
    number_of_tickets: Option<u32>,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;

    if PENDING_TICKET_UPDATE.load(deps.storage)? {
        return Err(ContractError::PendingTicketUpdate {});
    }

    let config = CONFIG.load(deps.storage)?;
    let number_to_allocate =
        number_of_tickets.unwrap_or(config.used_ticket_sequence_threshold);
    if number_to_allocate == 0 || number_to_allocate > MAX_TICKETS_PER_ALLOCATION {
        return Err(ContractError::InvalidTicketNumberToAllocate {});
    }

    PENDING_TICKET_UPDATE.save(deps.storage, &true)?;
    // The fallback after a rejected allocation: identified by account sequence
    // because there might not be a single usable ticket left
    create_pending_operation(
        deps.storage,
        env.block.time.seconds(),
        None,
        Some(account_sequence),
        OperationType::AllocateTickets {
            number: number_to_allocate,
        },
    )?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::RecoverTickets.as_str())
        .add_attribute("account_sequence", account_sequence.to_string())
        .add_attribute("number_of_tickets", number_to_allocate.to_string()))
}

fn recover_xrpl_token_registration(
    deps: DepsMut,
    env: Env,
    sender: Addr,
    issuer: String,
    currency: String,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;
    assert_bridge_active(deps.storage)?;

    let key = build_xrpl_token_key(&issuer, &currency);
    let mut token = xrpl_tokens()
        .load(deps.storage, key.to_owned())
        .map_err(|_| ContractError::TokenNotRegistered {})?;

    // Only tokens whose TrustSet was rejected can be retried
    if token.state.ne(&TokenState::Inactive) {
        return Err(ContractError::XRPLTokenNotInactive {});
    }

    token.state = TokenState::Processing;
    xrpl_tokens().save(deps.storage, key, &token)?;

    let config = CONFIG.load(deps.storage)?;
    let ticket = allocate_ticket(deps.storage)?;
    create_pending_operation(
        deps.storage,
        env.block.time.seconds(),
        Some(ticket),
        None,
        OperationType::TrustSet {
            issuer: issuer.to_owned(),
            currency: currency.to_owned(),
            trust_set_limit_amount: config.trust_set_limit_amount,
        },
    )?;

    Ok(Response::new()
        .add_attribute(
            "action",
            ContractActions::RecoverXRPLTokenRegistration.as_str(),
        )
        .add_attribute("issuer", issuer)
        .add_attribute("currency", currency))
}

fn save_signature(
    deps: DepsMut,
    sender: Addr,
    operation_sequence: u64,
    operation_version: u64,
    signature: String,
) -> CoreumResult<ContractError> {
    assert_relayer(deps.storage, &sender)?;

    add_signature(
        deps.storage,
        operation_sequence,
        operation_version,
        sender.to_owned(),
        signature.to_owned(),
    )?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::SaveSignature.as_str())
        .add_attribute("sender", sender)
        .add_attribute("operation_sequence", operation_sequence.to_string())
        .add_attribute("operation_version", operation_version.to_string())
        .add_attribute("signature", signature))
}

fn send_to_xrpl(
    mut deps: DepsMut<CoreumQueries>,
    env: Env,
    info: MessageInfo,
    recipient: String,
    deliver_amount: Option<Uint128>,
) -> CoreumResult<ContractError> {
    assert_bridge_active(deps.storage)?;

    let funds = one_coin(&info)?;

    let attributes = enqueue_xrpl_transfer(
        deps.branch(),
        &env,
        info.sender,
        funds,
        recipient,
        deliver_amount,
    )?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::SendToXRPL.as_str())
        .add_attributes(attributes))
}

fn multi_send_to_xrpl(
    mut deps: DepsMut<CoreumQueries>,
    env: Env,
    info: MessageInfo,
    transfers: Vec<XRPLTransfer>,
) -> CoreumResult<ContractError> {
    assert_bridge_active(deps.storage)?;

    let funds = one_coin(&info)?;

    // The attached funds must cover the batch exactly
    let mut total = Uint128::zero();
    for transfer in transfers.iter() {
        total = total.checked_add(transfer.amount)?;
    }
    if total.ne(&funds.amount) {
        return Err(ContractError::InvalidFundsAmount {});
    }

    let mut response =
        Response::new().add_attribute("action", ContractActions::MultiSendToXRPL.as_str());
    for transfer in transfers {
        if transfer.amount.is_zero() {
            return Err(ContractError::InvalidAmount {});
        }
        let attributes = enqueue_xrpl_transfer(
            deps.branch(),
            &env,
            info.sender.to_owned(),
            coin(transfer.amount.u128(), funds.denom.to_owned()),
            transfer.recipient,
            transfer.deliver_amount,
        )?;
        response = response.add_attributes(attributes);
    }

    Ok(response)
}

/// Shared path of send_to_xrpl and multi_send_to_xrpl: debits one coin from the
/// sender and enqueues the pending operation the relayers will sign.
fn enqueue_xrpl_transfer(
    deps: DepsMut<CoreumQueries>,
    env: &Env,
    sender: Addr,
    funds: Coin,
    recipient: String,
    deliver_amount: Option<Uint128>,
) -> Result<Vec<Attribute>, ContractError> {
    validate_xrpl_address(&recipient)?;

    let prohibited_xrpl_recipients = PROHIBITED_XRPL_RECIPIENTS.load(deps.storage)?;
    if prohibited_xrpl_recipients.contains(&recipient) {
        return Err(ContractError::ProhibitedRecipient {});
    }

    let issuer;
    let currency;
    let amount;
    let max_amount;

    match xrpl_tokens()
        .idx
        .coreum_denom
        .item(deps.storage, funds.denom.to_owned())?
        .map(|(_, t)| t)
    {
        // Sending back an XRPL originated token: the wrapper is burned once the
        // XRPL payment is accepted
        Some(token) => {
            if token.state.ne(&TokenState::Enabled) {
                return Err(ContractError::TokenDisabled {});
            }

            issuer = token.issuer.to_owned();
            currency = token.currency.to_owned();

            let amount_after_fees = amount_after_bridge_fees(funds.amount, token.bridging_fee)?;

            if is_token_xrp(&token.issuer, &token.currency) {
                // XRP payments deliver exactly the amount, SendMax does not apply
                if deliver_amount.is_some() {
                    return Err(ContractError::InvalidDeliverAmount {});
                }
                let (amount_truncated, truncated_portion) = truncate_amount(
                    token.sending_precision,
                    XRP_DECIMALS,
                    amount_after_fees,
                )?;
                amount = amount_truncated;
                max_amount = None;
                handle_fee_collection(
                    deps.storage,
                    token.bridging_fee,
                    token.coreum_denom,
                    truncated_portion,
                )?;
            } else {
                let (amount_truncated, truncated_portion) = truncate_amount(
                    token.sending_precision,
                    XRPL_TOKENS_DECIMALS,
                    amount_after_fees,
                )?;
                match deliver_amount {
                    // Senders of tokens with a transfer rate declare what must
                    // arrive; the rest of SendMax covers the issuer fee
                    Some(deliver_amount) => {
                        if deliver_amount.gt(&amount_truncated) {
                            return Err(ContractError::InvalidDeliverAmount {});
                        }
                        let (deliver_amount_truncated, _) = truncate_amount(
                            token.sending_precision,
                            XRPL_TOKENS_DECIMALS,
                            deliver_amount,
                        )?;
                        amount = deliver_amount_truncated;
                    }
                    None => {
                        amount = amount_truncated;
                    }
                }
                max_amount = Some(amount_truncated);
                handle_fee_collection(
                    deps.storage,
                    token.bridging_fee,
                    token.coreum_denom,
                    truncated_portion,
                )?;
            }
        }
        None => {
            // A Coreum originated token is locked in the contract and converted
            // to its 15 decimal XRPL representation
            let token = coreum_tokens()
                .may_load(deps.storage, funds.denom.to_owned())?
                .ok_or(ContractError::TokenNotRegistered {})?;

            if token.state.ne(&TokenState::Enabled) {
                return Err(ContractError::TokenDisabled {});
            }
            if deliver_amount.is_some() {
                return Err(ContractError::InvalidDeliverAmount {});
            }

            // The contract balance already contains the attached funds
            let bridged = deps
                .querier
                .query_balance(env.contract.address.to_owned(), funds.denom.to_owned())?
                .amount;
            if bridged.gt(&token.max_holding_amount) {
                return Err(ContractError::MaximumBridgedAmountReached {});
            }

            let amount_after_fees = amount_after_bridge_fees(funds.amount, token.bridging_fee)?;
            let (amount_truncated, truncated_portion) = truncate_amount(
                token.sending_precision,
                token.decimals,
                amount_after_fees,
            )?;
            let amount_in_xrpl = convert_amount_decimals(
                token.decimals,
                XRPL_TOKENS_DECIMALS,
                amount_truncated,
            )?;

            issuer = CONFIG.load(deps.storage)?.bridge_xrpl_address;
            currency = token.xrpl_currency.to_owned();
            amount = amount_in_xrpl;
            max_amount = Some(amount_in_xrpl);

            handle_fee_collection(
                deps.storage,
                token.bridging_fee,
                token.denom,
                truncated_portion,
            )?;
        }
    }

    let ticket = allocate_ticket(deps.storage)?;
    create_pending_operation(
        deps.storage,
        env.block.time.seconds(),
        Some(ticket),
        None,
        OperationType::CoreumToXRPLTransfer {
            issuer,
            currency,
            amount,
            max_amount,
            sender: sender.to_owned(),
            recipient: recipient.to_owned(),
        },
    )?;

    Ok(vec![
        Attribute::new("sender", sender),
        Attribute::new("recipient", recipient),
        Attribute::new("coin", funds.to_string()),
    ])
}

#[allow(clippy::too_many_arguments)]
fn update_xrpl_token(
    deps: DepsMut<CoreumQueries>,
    sender: Addr,
    issuer: String,
    currency: String,
    state: Option<TokenState>,
    sending_precision: Option<i32>,
    bridging_fee: Option<Uint128>,
    max_holding_amount: Option<Uint128>,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;

    let key = build_xrpl_token_key(&issuer, &currency);
    let mut token = xrpl_tokens()
        .load(deps.storage, key.to_owned())
        .map_err(|_| ContractError::TokenNotRegistered {})?;

    set_token_state(&mut token.state, state)?;
    let decimals = if is_token_xrp(&token.issuer, &token.currency) {
        XRP_DECIMALS
    } else {
        XRPL_TOKENS_DECIMALS
    };
    set_token_sending_precision(&mut token.sending_precision, sending_precision, decimals)?;
    set_token_bridging_fee(&mut token.bridging_fee, bridging_fee)?;

    let current_bridged_amount = deps
        .querier
        .query_supply(token.coreum_denom.to_owned())?
        .amount;
    set_token_max_holding_amount(
        current_bridged_amount,
        &mut token.max_holding_amount,
        max_holding_amount,
    )?;

    xrpl_tokens().save(deps.storage, key, &token)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::UpdateXRPLToken.as_str())
        .add_attribute("issuer", issuer)
        .add_attribute("currency", currency))
}

#[allow(clippy::too_many_arguments)]
fn update_coreum_token(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    sender: Addr,
    denom: String,
    state: Option<TokenState>,
    sending_precision: Option<i32>,
    bridging_fee: Option<Uint128>,
    max_holding_amount: Option<Uint128>,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;

    let mut token = coreum_tokens()
        .may_load(deps.storage, denom.to_owned())?
        .ok_or(ContractError::TokenNotRegistered {})?;

    set_token_state(&mut token.state, state)?;
    set_token_sending_precision(&mut token.sending_precision, sending_precision, token.decimals)?;
    set_token_bridging_fee(&mut token.bridging_fee, bridging_fee)?;

    // What the bridge holds of a Coreum originated token is its locked balance
    let current_bridged_amount = deps
        .querier
        .query_balance(env.contract.address, denom.to_owned())?
        .amount;
    set_token_max_holding_amount(
        current_bridged_amount,
        &mut token.max_holding_amount,
        max_holding_amount,
    )?;

    coreum_tokens().save(deps.storage, denom.to_owned(), &token)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::UpdateCoreumToken.as_str())
        .add_attribute("denom", denom))
}

fn update_xrpl_base_fee(
    deps: DepsMut,
    sender: Addr,
    xrpl_base_fee: u64,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;

    let mut config = CONFIG.load(deps.storage)?;
    config.xrpl_base_fee = xrpl_base_fee;
    CONFIG.save(deps.storage, &config)?;

    // Every pending operation serializes with the new fee, so collected
    // signatures are discarded and relayers sign again
    bump_pending_operation_versions(deps.storage)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::UpdateXRPLBaseFee.as_str())
        .add_attribute("xrpl_base_fee", xrpl_base_fee.to_string()))
}

fn update_prohibited_xrpl_recipients(
    deps: DepsMut,
    sender: Addr,
    prohibited_xrpl_recipients: Vec<String>,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;

    let config = CONFIG.load(deps.storage)?;

    // The reserved addresses and the bridge account are always prohibited
    let mut updated_prohibited_xrpl_recipients: Vec<String> =
        INITIAL_PROHIBITED_XRPL_RECIPIENTS
            .iter()
            .map(|a| a.to_string())
            .collect();
    updated_prohibited_xrpl_recipients.push(config.bridge_xrpl_address);
    for address in prohibited_xrpl_recipients {
        if !updated_prohibited_xrpl_recipients.contains(&address) {
            updated_prohibited_xrpl_recipients.push(address);
        }
    }

    PROHIBITED_XRPL_RECIPIENTS.save(deps.storage, &updated_prohibited_xrpl_recipients)?;

    Ok(Response::new().add_attribute(
        "action",
        ContractActions::UpdateProhibitedXRPLRecipients.as_str(),
    ))
}

fn claim_relayer_fees(
    deps: DepsMut,
    sender: Addr,
    amounts: Vec<Coin>,
) -> CoreumResult<ContractError> {
    if amounts.is_empty() {
        return Err(ContractError::NotEnoughFeesToClaim {});
    }

    subtract_relayer_fees(deps.storage, &sender, &amounts)?;

    let send_msg = BankMsg::Send {
        to_address: sender.to_string(),
        amount: amounts,
    };

    Ok(Response::new()
        .add_message(send_msg)
        .add_attribute("action", ContractActions::ClaimRelayerFees.as_str())
        .add_attribute("sender", sender))
}

fn claim_refund(
    deps: DepsMut,
    sender: Addr,
    pending_refund_id: String,
) -> CoreumResult<ContractError> {
    let refund_coin = remove_pending_refund(deps.storage, &sender, pending_refund_id)?;

    let send_msg = BankMsg::Send {
        to_address: sender.to_string(),
        amount: vec![refund_coin],
    };

    Ok(Response::new()
        .add_message(send_msg)
        .add_attribute("action", ContractActions::ClaimRefund.as_str())
        .add_attribute("sender", sender))
}

fn halt_bridge(deps: DepsMut, sender: Addr) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;

    let mut config = CONFIG.load(deps.storage)?;
    config.bridge_state = BridgeState::Halted;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("action", ContractActions::HaltBridge.as_str()))
}

fn resume_bridge(deps: DepsMut, sender: Addr) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;

    // The bridge can not resume before the new signer set is confirmed
    if PENDING_ROTATE_KEYS.load(deps.storage)? {
        return Err(ContractError::RotateKeysOngoing {});
    }

    let mut config = CONFIG.load(deps.storage)?;
    config.bridge_state = BridgeState::Active;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("action", ContractActions::ResumeBridge.as_str()))
}

fn rotate_keys(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    sender: Addr,
    new_relayers: Vec<Relayer>,
    new_evidence_threshold: u32,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;

    if PENDING_ROTATE_KEYS.load(deps.storage)? {
        return Err(ContractError::RotateKeysOngoing {});
    }

    if new_relayers.len() as u32 > MAX_RELAYERS {
        return Err(ContractError::TooManyRelayers {});
    }
    validate_relayers(deps.api, &new_relayers)?;

    if new_evidence_threshold == 0
        || new_evidence_threshold as usize > new_relayers.len()
    {
        return Err(ContractError::InvalidThreshold {});
    }

    // The bridge halts for the whole rotation and stays halted until the owner
    // resumes it after the confirmation
    let mut config = CONFIG.load(deps.storage)?;
    config.bridge_state = BridgeState::Halted;
    CONFIG.save(deps.storage, &config)?;
    PENDING_ROTATE_KEYS.save(deps.storage, &true)?;

    let ticket = allocate_ticket(deps.storage)?;
    create_pending_operation(
        deps.storage,
        env.block.time.seconds(),
        Some(ticket),
        None,
        OperationType::RotateKeys {
            new_relayers,
            new_evidence_threshold,
        },
    )?;

    Ok(Response::new().add_attribute("action", ContractActions::RotateKeys.as_str()))
}

fn cancel_operation(
    deps: DepsMut,
    sender: Addr,
    operation_sequence: u64,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &sender)?;

    let operation = check_operation_exists(deps.storage, operation_sequence)?;

    cancel_pending_operation(deps.storage, &operation)?;

    Ok(Response::new()
        .add_attribute("action", ContractActions::CancelPendingOperation.as_str())
        .add_attribute("operation_sequence", operation_sequence.to_string()))
}

// ********** Queries **********
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps<CoreumQueries>, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    let deps = deps.into_empty();
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Ownership {} => to_json_binary(&get_ownership(deps.storage)?),
        QueryMsg::XRPLTokens { offset, limit } => {
            to_json_binary(&query_xrpl_tokens(deps, offset, limit)?)
        }
        QueryMsg::CoreumTokens { offset, limit } => {
            to_json_binary(&query_coreum_tokens(deps, offset, limit)?)
        }
        QueryMsg::XRPLToken { issuer, currency } => {
            to_json_binary(&query_xrpl_token(deps, issuer, currency)?)
        }
        QueryMsg::CoreumToken { denom } => to_json_binary(&query_coreum_token(deps, denom)?),
        QueryMsg::PendingOperations { offset, limit } => {
            to_json_binary(&query_pending_operations(deps, offset, limit)?)
        }
        QueryMsg::AvailableTickets {} => to_json_binary(&query_available_tickets(deps)?),
        QueryMsg::FeesCollected { relayer_address } => {
            to_json_binary(&query_fees_collected(deps, relayer_address)?)
        }
        QueryMsg::PendingRefunds {
            address,
            offset,
            limit,
        } => to_json_binary(&query_pending_refunds(deps, address, offset, limit)?),
        QueryMsg::TransactionEvidences { offset, limit } => {
            to_json_binary(&query_transaction_evidences(deps, offset, limit)?)
        }
        QueryMsg::TransactionEvidence { hash } => {
            to_json_binary(&query_transaction_evidence(deps, hash)?)
        }
        QueryMsg::ProcessedTx { hash } => to_json_binary(&query_processed_tx(deps, hash)?),
        QueryMsg::ProhibitedXRPLRecipients {} => {
            to_json_binary(&query_prohibited_xrpl_recipients(deps)?)
        }
    }
}

fn query_config(deps: Deps) -> StdResult<Config> {
    CONFIG.load(deps.storage)
}

fn query_xrpl_tokens(
    deps: Deps,
    offset: Option<u64>,
    limit: Option<u32>,
) -> StdResult<XRPLTokensResponse> {
    let limit = limit.unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let offset = offset.unwrap_or(0);
    let tokens: Vec<XRPLToken> = xrpl_tokens()
        .range(deps.storage, None, None, Order::Ascending)
        .skip(offset as usize)
        .take(limit as usize)
        .filter_map(|v| v.ok())
        .map(|(_, v)| v)
        .collect();

    Ok(XRPLTokensResponse { tokens })
}

fn query_coreum_tokens(
    deps: Deps,
    offset: Option<u64>,
    limit: Option<u32>,
) -> StdResult<CoreumTokensResponse> {
    let limit = limit.unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let offset = offset.unwrap_or(0);
    let tokens: Vec<CoreumToken> = coreum_tokens()
        .range(deps.storage, None, None, Order::Ascending)
        .skip(offset as usize)
        .take(limit as usize)
        .filter_map(|v| v.ok())
        .map(|(_, v)| v)
        .collect();

    Ok(CoreumTokensResponse { tokens })
}

fn query_xrpl_token(deps: Deps, issuer: String, currency: String) -> StdResult<XRPLTokenResponse> {
    let token = xrpl_tokens().load(deps.storage, build_xrpl_token_key(&issuer, &currency))?;

    Ok(XRPLTokenResponse { token })
}

fn query_coreum_token(deps: Deps, denom: String) -> StdResult<CoreumTokenResponse> {
    let token = coreum_tokens().load(deps.storage, denom)?;

    Ok(CoreumTokenResponse { token })
}

fn query_pending_operations(
    deps: Deps,
    offset: Option<u64>,
    limit: Option<u32>,
) -> StdResult<PendingOperationsResponse> {
    let limit = limit.unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let offset = offset.unwrap_or(0);
    let operations = PENDING_OPERATIONS
        .range(deps.storage, None, None, Order::Ascending)
        .skip(offset as usize)
        .take(limit as usize)
        .filter_map(|v| v.ok())
        .map(|(_, v)| v)
        .collect();

    Ok(PendingOperationsResponse { operations })
}

fn query_available_tickets(deps: Deps) -> StdResult<AvailableTicketsResponse> {
    let tickets = AVAILABLE_TICKETS.load(deps.storage)?;

    Ok(AvailableTicketsResponse {
        tickets: tickets.into(),
    })
}

fn query_fees_collected(deps: Deps, relayer_address: Addr) -> StdResult<FeesCollectedResponse> {
    let fees_collected = FEES_COLLECTED
        .may_load(deps.storage, relayer_address)?
        .unwrap_or_default();

    Ok(FeesCollectedResponse { fees_collected })
}

fn query_pending_refunds(
    deps: Deps,
    address: Addr,
    offset: Option<u64>,
    limit: Option<u32>,
) -> StdResult<PendingRefundsResponse> {
    let limit = limit.unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let offset = offset.unwrap_or(0);
    let pending_refunds = PENDING_REFUNDS
        .prefix(address)
        .range(deps.storage, None, None, Order::Ascending)
        .skip(offset as usize)
        .take(limit as usize)
        .filter_map(|v| v.ok())
        .map(|(_, v)| v)
        .collect();

    Ok(PendingRefundsResponse { pending_refunds })
}

fn query_transaction_evidences(
    deps: Deps,
    offset: Option<u64>,
    limit: Option<u32>,
) -> StdResult<TransactionEvidencesResponse> {
    let limit = limit.unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let offset = offset.unwrap_or(0);
    let transaction_evidences = TX_EVIDENCES
        .range(deps.storage, None, None, Order::Ascending)
        .skip(offset as usize)
        .take(limit as usize)
        .filter_map(|v| v.ok())
        .map(|(hash, evidences)| TransactionEvidence {
            hash,
            relayer_addresses: evidences.relayers,
        })
        .collect();

    Ok(TransactionEvidencesResponse {
        transaction_evidences,
    })
}

fn query_transaction_evidence(deps: Deps, hash: String) -> StdResult<TransactionEvidenceResponse> {
    let evidences = TX_EVIDENCES.load(deps.storage, hash.to_owned())?;

    Ok(TransactionEvidenceResponse {
        transaction_evidence: TransactionEvidence {
            hash,
            relayer_addresses: evidences.relayers,
        },
    })
}

fn query_processed_tx(deps: Deps, hash: String) -> StdResult<ProcessedTxResponse> {
    Ok(ProcessedTxResponse {
        processed: PROCESSED_TXS.has(deps.storage, hash.to_lowercase()),
    })
}

fn query_prohibited_xrpl_recipients(deps: Deps) -> StdResult<ProhibitedXRPLRecipientsResponse> {
    let prohibited_xrpl_recipients = PROHIBITED_XRPL_RECIPIENTS.load(deps.storage)?;

    Ok(ProhibitedXRPLRecipientsResponse {
        prohibited_xrpl_recipients,
    })
}

// ********** Helpers **********

fn check_issue_fee(
    deps: &DepsMut<CoreumQueries>,
    info: &MessageInfo,
) -> Result<(), ContractError> {
    let query_params_res: ParamsResponse = deps
        .querier
        .query(&CoreumQueries::AssetFT(Query::Params {}).into())?;

    if query_params_res.params.issue_fee != one_coin(info)? {
        return Err(ContractError::InvalidFundsAmount {});
    }

    Ok(())
}

pub fn assert_bridge_active(storage: &dyn Storage) -> Result<(), ContractError> {
    let config = CONFIG.load(storage)?;
    if config.bridge_state.ne(&BridgeState::Active) {
        return Err(ContractError::BridgeHalted {});
    }

    Ok(())
}

pub fn validate_sending_precision(
    sending_precision: i32,
    decimals: u32,
) -> Result<(), ContractError> {
    // A negative precision truncates positions above the decimal point
    if !(MIN_SENDING_PRECISION..=MAX_SENDING_PRECISION).contains(&sending_precision) {
        return Err(ContractError::InvalidSendingPrecision {});
    }

    if sending_precision > decimals as i32 {
        return Err(ContractError::InvalidSendingPrecision {});
    }
    Ok(())
}

pub fn validate_xrpl_currency(currency: &str) -> Result<(), ContractError> {
    match currency.len() {
        // Standard currency codes are 3 ascii characters; "XRP" itself can not be issued
        3 => {
            if !currency.chars().all(|c| c.is_ascii_alphanumeric()) || currency == XRP_CURRENCY {
                return Err(ContractError::InvalidXRPLCurrency {});
            }
        }
        // Nonstandard currency codes are 160 bits in hexadecimal
        40 => {
            if hex::decode(currency).is_err() {
                return Err(ContractError::InvalidXRPLCurrency {});
            }
        }
        _ => return Err(ContractError::InvalidXRPLCurrency {}),
    }

    Ok(())
}

/// Zeroes out every decimal digit of the amount beyond the sending precision,
/// returning the truncated amount and the dust that was removed.
pub fn truncate_amount(
    sending_precision: i32,
    decimals: u32,
    amount: Uint128,
) -> Result<(Uint128, Uint128), ContractError> {
    // Digits to zero out counted from the least significant position
    let exponent = decimals as i32 - sending_precision;
    if exponent <= 0 {
        // Sending precision equals the decimals, nothing to truncate
        return Ok((amount, Uint128::zero()));
    }

    let factor = Uint128::new(10u128.pow(exponent as u32));
    let truncated_portion = amount.checked_rem(factor)?;
    let truncated_amount = amount.checked_sub(truncated_portion)?;

    if truncated_amount.is_zero() {
        return Err(ContractError::AmountSentIsZeroAfterTruncation {});
    }

    Ok((truncated_amount, truncated_portion))
}

/// Rescales an amount between two fixed decimal representations, truncating
/// digits that do not fit in the target representation.
pub fn convert_amount_decimals(
    from_decimals: u32,
    to_decimals: u32,
    amount: Uint128,
) -> Result<Uint128, ContractError> {
    if from_decimals == to_decimals {
        return Ok(amount);
    }

    let converted_amount = if to_decimals > from_decimals {
        amount.checked_mul(Uint128::new(10u128.pow(to_decimals - from_decimals)))?
    } else {
        amount.checked_div(Uint128::new(10u128.pow(from_decimals - to_decimals)))?
    };

    Ok(converted_amount)
}

pub fn convert_currency_to_xrpl_hexadecimal(currency: String) -> String {
    // Pad the ascii currency with zeroes to the full 160 bit representation
    format!("{:0<40}", hex::encode(currency)).to_uppercase()
}
