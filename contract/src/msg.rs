use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Coin, Uint128};
use cw_ownable::{cw_ownable_execute, cw_ownable_query};

use crate::{
    evidence::Evidence,
    operation::Operation,
    relayer::Relayer,
    state::{Config, CoreumToken, PendingRefund, TokenState, XRPLToken},
};

#[cw_serde]
pub struct InstantiateMsg {
    pub owner: Addr,
    // Relayers allowed to attest XRPL events and sign XRPL transactions
    pub relayers: Vec<Relayer>,
    // How many relayer attestations confirm an evidence
    pub evidence_threshold: u32,
    // Consumed tickets that trigger a new ticket allocation
    pub used_ticket_sequence_threshold: u32,
    pub trust_set_limit_amount: Uint128,
    pub bridge_xrpl_address: String,
    pub xrpl_base_fee: u64,
}

#[cw_serde]
pub struct XRPLTransfer {
    pub recipient: String,
    pub deliver_amount: Option<Uint128>,
    pub amount: Uint128,
}

#[cw_ownable_execute]
#[cw_serde]
pub enum ExecuteMsg {
    RegisterCoreumToken {
        denom: String,
        decimals: u32,
        sending_precision: i32,
        max_holding_amount: Uint128,
        bridging_fee: Uint128,
    },
    #[serde(rename = "register_xrpl_token")]
    RegisterXRPLToken {
        issuer: String,
        currency: String,
        sending_precision: i32,
        max_holding_amount: Uint128,
        bridging_fee: Uint128,
    },
    SaveEvidence {
        evidence: Evidence,
    },
    RecoverTickets {
        account_sequence: u64,
        number_of_tickets: Option<u32>,
    },
    #[serde(rename = "recover_xrpl_token_registration")]
    RecoverXRPLTokenRegistration {
        issuer: String,
        currency: String,
    },
    SaveSignature {
        operation_sequence: u64,
        operation_version: u64,
        signature: String,
    },
    #[serde(rename = "send_to_xrpl")]
    SendToXRPL {
        recipient: String,
        deliver_amount: Option<Uint128>,
    },
    #[serde(rename = "multi_send_to_xrpl")]
    MultiSendToXRPL {
        transfers: Vec<XRPLTransfer>,
    },
    #[serde(rename = "update_xrpl_token")]
    UpdateXRPLToken {
        issuer: String,
        currency: String,
        state: Option<TokenState>,
        sending_precision: Option<i32>,
        bridging_fee: Option<Uint128>,
        max_holding_amount: Option<Uint128>,
    },
    UpdateCoreumToken {
        denom: String,
        state: Option<TokenState>,
        sending_precision: Option<i32>,
        bridging_fee: Option<Uint128>,
        max_holding_amount: Option<Uint128>,
    },
    #[serde(rename = "update_xrpl_base_fee")]
    UpdateXRPLBaseFee {
        xrpl_base_fee: u64,
    },
    #[serde(rename = "update_prohibited_xrpl_recipients")]
    UpdateProhibitedXRPLRecipients {
        prohibited_xrpl_recipients: Vec<String>,
    },
    ClaimRelayerFees {
        amounts: Vec<Coin>,
    },
    ClaimRefund {
        pending_refund_id: String,
    },
    HaltBridge {},
    ResumeBridge {},
    RotateKeys {
        new_relayers: Vec<Relayer>,
        new_evidence_threshold: u32,
    },
    CancelPendingOperation {
        operation_sequence: u64,
    },
}

#[cw_ownable_query]
#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},
    #[returns(XRPLTokensResponse)]
    #[serde(rename = "xrpl_tokens")]
    XRPLTokens {
        offset: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(CoreumTokensResponse)]
    CoreumTokens {
        offset: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(XRPLTokenResponse)]
    #[serde(rename = "xrpl_token")]
    XRPLToken { issuer: String, currency: String },
    #[returns(CoreumTokenResponse)]
    CoreumToken { denom: String },
    #[returns(PendingOperationsResponse)]
    PendingOperations {
        offset: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(AvailableTicketsResponse)]
    AvailableTickets {},
    #[returns(FeesCollectedResponse)]
    FeesCollected { relayer_address: Addr },
    #[returns(PendingRefundsResponse)]
    PendingRefunds {
        address: Addr,
        offset: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(TransactionEvidencesResponse)]
    TransactionEvidences {
        offset: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(TransactionEvidenceResponse)]
    TransactionEvidence { hash: String },
    #[returns(ProcessedTxResponse)]
    ProcessedTx { hash: String },
    #[returns(ProhibitedXRPLRecipientsResponse)]
    #[serde(rename = "prohibited_xrpl_recipients")]
    ProhibitedXRPLRecipients {},
}

#[cw_serde]
pub struct XRPLTokensResponse {
    pub tokens: Vec<XRPLToken>,
}

#[cw_serde]
pub struct XRPLTokenResponse {
    pub token: XRPLToken,
}

#[cw_serde]
pub struct CoreumTokensResponse {
    pub tokens: Vec<CoreumToken>,
}

#[cw_serde]
pub struct CoreumTokenResponse {
    pub token: CoreumToken,
}

#[cw_serde]
pub struct PendingOperationsResponse {
    pub operations: Vec<Operation>,
}

#[cw_serde]
pub struct AvailableTicketsResponse {
    pub tickets: Vec<u64>,
}

#[cw_serde]
pub struct FeesCollectedResponse {
    pub fees_collected: Vec<Coin>,
}

#[cw_serde]
pub struct PendingRefundsResponse {
    pub pending_refunds: Vec<PendingRefund>,
}

#[cw_serde]
pub struct TransactionEvidence {
    pub hash: String,
    pub relayer_addresses: Vec<Addr>,
}

#[cw_serde]
pub struct TransactionEvidencesResponse {
    pub transaction_evidences: Vec<TransactionEvidence>,
}

#[cw_serde]
pub struct TransactionEvidenceResponse {
    pub transaction_evidence: TransactionEvidence,
}

#[cw_serde]
pub struct ProcessedTxResponse {
    pub processed: bool,
}

#[cw_serde]
pub struct ProhibitedXRPLRecipientsResponse {
    pub prohibited_xrpl_recipients: Vec<String>,
}
