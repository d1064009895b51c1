use std::collections::VecDeque;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Coin, Empty, Uint128};
use cw_storage_plus::{Index, IndexList, IndexedMap, Item, Map, UniqueIndex};

use crate::{evidence::Evidences, operation::Operation, relayer::Relayer};

/// Top level storage key. Values must not conflict.
/// Each key is only one byte long to ensure we use the smallest possible storage keys.
#[repr(u8)]
pub enum TopKey {
    Config = b'c',
    XRPLTokens = b'1',
    CoreumTokens = b'2',
    UsedTicketsCounter = b'3',
    AvailableTickets = b'4',
    PendingTicketUpdate = b'5',
    PendingOperations = b'6',
    TxEvidences = b'7',
    ProcessedTxs = b'8',
    FeesCollected = b'9',
    FeeRemainders = b'a',
    PendingRefunds = b'b',
    PendingRotateKeys = b'd',
    ProhibitedXRPLRecipients = b'e',
}

impl TopKey {
    const fn as_str(&self) -> &str {
        let array_ref = unsafe { std::mem::transmute::<_, &[u8; 1]>(self) };
        match core::str::from_utf8(array_ref) {
            Ok(a) => a,
            Err(_) => panic!("Non-utf8 enum value found. Use a-z, A-Z and 0-9"),
        }
    }
}

#[cw_serde]
pub enum BridgeState {
    Active,
    Halted,
}

#[cw_serde]
pub enum TokenState {
    // Registered but the TrustSet transaction has not been confirmed on XRPL yet
    Processing,
    // TrustSet was rejected by XRPL; the token can be retried by the owner
    Inactive,
    Enabled,
    Disabled,
}

#[cw_serde]
pub struct Config {
    pub relayers: Vec<Relayer>,
    pub evidence_threshold: u32,
    pub used_ticket_sequence_threshold: u32,
    pub trust_set_limit_amount: Uint128,
    pub bridge_xrpl_address: String,
    pub bridge_state: BridgeState,
    pub xrpl_base_fee: u64,
}

#[cw_serde]
pub struct XRPLToken {
    pub issuer: String,
    pub currency: String,
    pub coreum_denom: String,
    pub sending_precision: i32,
    pub max_holding_amount: Uint128,
    pub state: TokenState,
    pub bridging_fee: Uint128,
}

#[cw_serde]
pub struct CoreumToken {
    pub denom: String,
    pub decimals: u32,
    pub xrpl_currency: String,
    pub sending_precision: i32,
    pub max_holding_amount: Uint128,
    pub state: TokenState,
    pub bridging_fee: Uint128,
}

#[cw_serde]
pub struct PendingRefund {
    pub address: Addr,
    pub id: String,
    pub xrpl_tx_hash: Option<String>,
    pub coin: Coin,
}

pub struct XRPLTokensIndexes<'a> {
    // Lookup of the XRPL originated token that a Coreum denom represents
    pub coreum_denom: UniqueIndex<'a, String, XRPLToken, String>,
}

impl<'a> IndexList<XRPLToken> for XRPLTokensIndexes<'a> {
    fn get_indexes(&'_ self) -> Box<dyn Iterator<Item = &'_ dyn Index<XRPLToken>> + '_> {
        let v: Vec<&dyn Index<XRPLToken>> = vec![&self.coreum_denom];
        Box::new(v.into_iter())
    }
}

pub struct CoreumTokensIndexes<'a> {
    // Lookup of the Coreum originated token that an XRPL currency represents
    pub xrpl_currency: UniqueIndex<'a, String, CoreumToken, String>,
}

impl<'a> IndexList<CoreumToken> for CoreumTokensIndexes<'a> {
    fn get_indexes(&'_ self) -> Box<dyn Iterator<Item = &'_ dyn Index<CoreumToken>> + '_> {
        let v: Vec<&dyn Index<CoreumToken>> = vec![&self.xrpl_currency];
        Box::new(v.into_iter())
    }
}

// Tokens registered from the XRPL side - key is issuer+currency
pub fn xrpl_tokens<'a>() -> IndexedMap<'a, String, XRPLToken, XRPLTokensIndexes<'a>> {
    let indexes = XRPLTokensIndexes {
        coreum_denom: UniqueIndex::new(
            |token| token.coreum_denom.to_owned(),
            "xrpl_tokens__coreum_denom",
        ),
    };
    IndexedMap::new(TopKey::XRPLTokens.as_str(), indexes)
}

// Tokens registered from the Coreum side - key is the denom on the Coreum chain
pub fn coreum_tokens<'a>() -> IndexedMap<'a, String, CoreumToken, CoreumTokensIndexes<'a>> {
    let indexes = CoreumTokensIndexes {
        xrpl_currency: UniqueIndex::new(
            |token| token.xrpl_currency.to_owned(),
            "coreum_tokens__xrpl_currency",
        ),
    };
    IndexedMap::new(TopKey::CoreumTokens.as_str(), indexes)
}

pub const CONFIG: Item<Config> = Item::new(TopKey::Config.as_str());
// Tickets the multisig account has allocated for the contract to use, in allocation order
pub const AVAILABLE_TICKETS: Item<VecDeque<u64>> = Item::new(TopKey::AvailableTickets.as_str());
pub const USED_TICKETS_COUNTER: Item<u32> = Item::new(TopKey::UsedTicketsCounter.as_str());
// Flag to know if we already triggered a ticket allocation that has not been confirmed
pub const PENDING_TICKET_UPDATE: Item<bool> = Item::new(TopKey::PendingTicketUpdate.as_str());
// Operations that are waiting for signatures and the XRPL confirmation, keyed by
// ticket sequence or account sequence (exactly one of the two per operation)
pub const PENDING_OPERATIONS: Map<u64, Operation> = Map::new(TopKey::PendingOperations.as_str());
// Evidence votes keyed by the deterministic hash of the evidence payload
pub const TX_EVIDENCES: Map<String, Evidences> = Map::new(TopKey::TxEvidences.as_str());
// XRPL transaction hashes whose effect was already applied
pub const PROCESSED_TXS: Map<String, Empty> = Map::new(TopKey::ProcessedTxs.as_str());
// Per relayer claimable fees
pub const FEES_COLLECTED: Map<Addr, Vec<Coin>> = Map::new(TopKey::FeesCollected.as_str());
// Amounts per denom that did not divide evenly between relayers, carried to the next collection
pub const FEE_REMAINDERS: Map<String, Uint128> = Map::new(TopKey::FeeRemainders.as_str());
pub const PENDING_REFUNDS: Map<(Addr, String), PendingRefund> =
    Map::new(TopKey::PendingRefunds.as_str());
pub const PENDING_ROTATE_KEYS: Item<bool> = Item::new(TopKey::PendingRotateKeys.as_str());
pub const PROHIBITED_XRPL_RECIPIENTS: Item<Vec<String>> =
    Item::new(TopKey::ProhibitedXRPLRecipients.as_str());

pub enum ContractActions {
    Instantiation,
    RegisterCoreumToken,
    RegisterXRPLToken,
    SaveEvidence,
    RecoverTickets,
    RecoverXRPLTokenRegistration,
    SaveSignature,
    SendToXRPL,
    MultiSendToXRPL,
    UpdateXRPLToken,
    UpdateCoreumToken,
    UpdateXRPLBaseFee,
    ClaimRelayerFees,
    ClaimRefund,
    HaltBridge,
    ResumeBridge,
    RotateKeys,
    UpdateProhibitedXRPLRecipients,
    CancelPendingOperation,
}

impl ContractActions {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Instantiation => "bridge_instantiation",
            Self::RegisterCoreumToken => "register_coreum_token",
            Self::RegisterXRPLToken => "register_xrpl_token",
            Self::SaveEvidence => "save_evidence",
            Self::RecoverTickets => "recover_tickets",
            Self::RecoverXRPLTokenRegistration => "recover_xrpl_token_registration",
            Self::SaveSignature => "save_signature",
            Self::SendToXRPL => "send_to_xrpl",
            Self::MultiSendToXRPL => "multi_send_to_xrpl",
            Self::UpdateXRPLToken => "update_xrpl_token",
            Self::UpdateCoreumToken => "update_coreum_token",
            Self::UpdateXRPLBaseFee => "update_xrpl_base_fee",
            Self::ClaimRelayerFees => "claim_relayer_fees",
            Self::ClaimRefund => "claim_refund",
            Self::HaltBridge => "halt_bridge",
            Self::ResumeBridge => "resume_bridge",
            Self::RotateKeys => "rotate_keys",
            Self::UpdateProhibitedXRPLRecipients => "update_prohibited_xrpl_recipients",
            Self::CancelPendingOperation => "cancel_pending_operation",
        }
    }
}
