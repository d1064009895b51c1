use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Empty, Storage, Uint128};
use sha2::{Digest, Sha256};

use crate::{
    error::ContractError,
    state::{CONFIG, PROCESSED_TXS, TX_EVIDENCES},
};

#[cw_serde]
pub enum Evidence {
    #[serde(rename = "xrpl_to_coreum_transfer")]
    XRPLToCoreumTransfer {
        tx_hash: String,
        issuer: String,
        currency: String,
        amount: Uint128,
        recipient: Addr,
    },
    #[serde(rename = "xrpl_transaction_result")]
    XRPLTransactionResult {
        tx_hash: Option<String>,
        account_sequence: Option<u64>,
        ticket_sequence: Option<u64>,
        transaction_result: TransactionResult,
        operation_result: Option<OperationResult>,
    },
}

#[cw_serde]
pub enum OperationResult {
    TicketsAllocation { tickets: Option<Vec<u64>> },
}

#[cw_serde]
pub enum TransactionResult {
    Accepted,
    Rejected,
    // The transaction was never included in a validated ledger, so its ticket was not consumed
    Invalid,
}

impl TransactionResult {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Invalid => "invalid",
        }
    }
}

#[cw_serde]
pub struct Evidences {
    pub relayers: Vec<Addr>,
}

impl Evidence {
    pub fn get_hash(&self) -> String {
        match self {
            Evidence::XRPLToCoreumTransfer {
                tx_hash,
                issuer,
                currency,
                amount,
                recipient,
            } => {
                let to_hash = format!(
                    "{}{}{}{}{}{}",
                    tx_hash, issuer, currency, amount, recipient, "xrpl_to_coreum_transfer"
                )
                .into_bytes();
                hash_bytes(&to_hash)
            }
            Evidence::XRPLTransactionResult {
                tx_hash,
                account_sequence,
                ticket_sequence,
                transaction_result,
                operation_result,
            } => {
                let tickets = match operation_result {
                    Some(OperationResult::TicketsAllocation { tickets }) => tickets.to_owned(),
                    None => None,
                };
                let to_hash = format!(
                    "{:?}{:?}{:?}{}{:?}{}",
                    tx_hash,
                    account_sequence,
                    ticket_sequence,
                    transaction_result.as_str(),
                    tickets,
                    "xrpl_transaction_result"
                )
                .into_bytes();
                hash_bytes(&to_hash)
            }
        }
    }

    pub fn get_tx_hash(&self) -> Option<String> {
        match self {
            Evidence::XRPLToCoreumTransfer { tx_hash, .. } => Some(tx_hash.to_owned()),
            Evidence::XRPLTransactionResult { tx_hash, .. } => tx_hash.to_owned(),
        }
    }

    pub fn validate(&self) -> Result<(), ContractError> {
        match self {
            Evidence::XRPLToCoreumTransfer {
                tx_hash, amount, ..
            } => {
                if tx_hash.is_empty() {
                    return Err(ContractError::InvalidTransactionResultEvidence {});
                }
                if amount.is_zero() {
                    return Err(ContractError::InvalidAmount {});
                }
                Ok(())
            }
            Evidence::XRPLTransactionResult {
                tx_hash,
                account_sequence,
                ticket_sequence,
                transaction_result,
                ..
            } => {
                // Exactly one of account sequence and ticket sequence identifies the operation
                if account_sequence.is_some() == ticket_sequence.is_some() {
                    return Err(ContractError::InvalidTransactionResultEvidence {});
                }
                match transaction_result {
                    // An invalid transaction never made it into a ledger and has no hash
                    TransactionResult::Invalid => {
                        if tx_hash.is_some() {
                            return Err(ContractError::InvalidFailedTransactionResultEvidence {});
                        }
                    }
                    _ => {
                        if tx_hash.is_none() {
                            return Err(
                                ContractError::InvalidSuccessfulTransactionResultEvidence {},
                            );
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let output = hasher.finalize();
    hex::encode(output)
}

/// Registers one relayer vote for the evidence and reports whether the evidence
/// just reached the threshold. Confirmation keys on the payload hash so that
/// diverging observations can never be merged into one quorum.
pub fn handle_evidence(
    storage: &mut dyn Storage,
    sender: Addr,
    evidence: &Evidence,
) -> Result<bool, ContractError> {
    if let Some(tx_hash) = evidence.get_tx_hash() {
        if PROCESSED_TXS.has(storage, tx_hash.to_lowercase()) {
            return Err(ContractError::OperationAlreadyExecuted {});
        }
    }

    let mut evidences = match TX_EVIDENCES.may_load(storage, evidence.get_hash())? {
        Some(stored_evidences) => {
            if stored_evidences.relayers.contains(&sender) {
                return Err(ContractError::EvidenceAlreadyProvided {});
            }
            stored_evidences
        }
        None => Evidences { relayers: vec![] },
    };
    evidences.relayers.push(sender);

    let config = CONFIG.load(storage)?;

    // Only votes from currently listed relayers count towards the threshold so
    // that attesters removed by a keys rotation can not tip a quorum
    let valid_votes = evidences
        .relayers
        .iter()
        .filter(|voter| {
            config
                .relayers
                .iter()
                .any(|relayer| relayer.coreum_address.eq(*voter))
        })
        .count();

    if valid_votes >= config.evidence_threshold as usize {
        if let Some(tx_hash) = evidence.get_tx_hash() {
            PROCESSED_TXS.save(storage, tx_hash.to_lowercase(), &Empty {})?;
        }
        TX_EVIDENCES.remove(storage, evidence.get_hash());
        return Ok(true);
    }

    TX_EVIDENCES.save(storage, evidence.get_hash(), &evidences)?;

    Ok(false)
}
