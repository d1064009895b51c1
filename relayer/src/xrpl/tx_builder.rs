use bs58::Alphabet;
use serde_json::{json, Value};

use xrpl_bridge::{
    operation::{Operation, OperationType},
    state::Config,
    token::is_token_xrp,
};

use crate::error::{Error, Result};
use crate::xrpl::codec::amount_to_xrpl_value;

const XRPL_ISSUED_DECIMALS: u32 = 15;

// TrustSet tfSetNoRipple
const TRUST_SET_FLAGS: u64 = 0x0002_0000;

// AccountSet asf flags used when bootstrapping the multisig account
pub const ASF_DISABLE_MASTER: u32 = 4;
pub const ASF_DEFAULT_RIPPLE: u32 = 8;
pub const ASF_DISALLOW_INCOMING_TRUSTLINE: u32 = 15;

/// One collected signature ready to be placed into the Signers array.
#[derive(Debug, Clone)]
pub struct TxSigner {
    pub account: String,
    pub signing_pub_key: String,
    pub txn_signature: String,
}

/// A multisigned transaction pays the base fee once per possible signer plus
/// once for itself.
pub fn multisig_fee(xrpl_base_fee: u64, number_of_signers: usize) -> u64 {
    xrpl_base_fee * (1 + number_of_signers as u64)
}

/// Shapes the canonical transaction JSON for a pending operation. Every
/// relayer must produce exactly this object for signatures to be compatible,
/// which is why everything variable is taken from the operation and config.
pub fn build_operation_tx(operation: &Operation, config: &Config) -> Result<Value> {
    let mut tx = match &operation.operation_type {
        OperationType::AllocateTickets { number } => json!({
            "TransactionType": "TicketCreate",
            "TicketCount": number,
        }),
        OperationType::TrustSet {
            issuer,
            currency,
            trust_set_limit_amount,
        } => json!({
            "TransactionType": "TrustSet",
            "LimitAmount": {
                "currency": currency,
                "issuer": issuer,
                "value": amount_to_xrpl_value(*trust_set_limit_amount, XRPL_ISSUED_DECIMALS),
            },
            "Flags": TRUST_SET_FLAGS,
        }),
        OperationType::RotateKeys {
            new_relayers,
            new_evidence_threshold,
        } => {
            let mut entries: Vec<&str> =
                new_relayers.iter().map(|r| r.xrpl_address.as_str()).collect();
            sort_accounts(&mut entries)?;
            let signer_entries: Vec<Value> = entries
                .iter()
                .map(|account| {
                    json!({ "SignerEntry": { "Account": account, "SignerWeight": 1 } })
                })
                .collect();
            json!({
                "TransactionType": "SignerListSet",
                "SignerQuorum": new_evidence_threshold,
                "SignerEntries": signer_entries,
            })
        }
        OperationType::CoreumToXRPLTransfer {
            issuer,
            currency,
            amount,
            max_amount,
            recipient,
            ..
        } => {
            let mut payment = json!({
                "TransactionType": "Payment",
                "Destination": recipient,
            });
            if is_token_xrp(issuer, currency) {
                // XRP amounts are plain drops
                payment["Amount"] = json!(amount.to_string());
            } else {
                payment["Amount"] = json!({
                    "currency": currency,
                    "issuer": issuer,
                    "value": amount_to_xrpl_value(*amount, XRPL_ISSUED_DECIMALS),
                });
                if let Some(max_amount) = max_amount {
                    payment["SendMax"] = json!({
                        "currency": currency,
                        "issuer": issuer,
                        "value": amount_to_xrpl_value(*max_amount, XRPL_ISSUED_DECIMALS),
                    });
                }
            }
            payment
        }
    };

    tx["Account"] = json!(config.bridge_xrpl_address);
    tx["Fee"] = json!(multisig_fee(operation.xrpl_base_fee, config.relayers.len()).to_string());
    // Multisigned transactions leave the single-signature key empty
    tx["SigningPubKey"] = json!("");

    match operation.ticket_sequence {
        Some(ticket_sequence) => {
            // A ticketed transaction carries sequence zero
            tx["Sequence"] = json!(0);
            tx["TicketSequence"] = json!(ticket_sequence);
        }
        None => {
            tx["Sequence"] = json!(operation.account_sequence.unwrap_or_default());
        }
    }

    Ok(tx)
}

/// AccountSet used when bootstrapping the multisig account (DefaultRipple,
/// DisallowIncomingTrustline, finally DisableMaster).
pub fn build_account_set(account: &str, sequence: u64, xrpl_base_fee: u64, set_flag: u32) -> Value {
    json!({
        "TransactionType": "AccountSet",
        "Account": account,
        "Sequence": sequence,
        "Fee": xrpl_base_fee.to_string(),
        "SetFlag": set_flag,
    })
}

/// Inserts the collected signatures, sorted by the canonical XRPL rule
/// (numerically ascending account ids), and returns the submittable JSON.
pub fn assemble_multisigned(tx_json: &Value, mut signers: Vec<TxSigner>) -> Result<Value> {
    let mut keyed: Vec<([u8; 20], TxSigner)> = signers
        .drain(..)
        .map(|signer| Ok((account_id(&signer.account)?, signer)))
        .collect::<Result<_>>()?;
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));

    let signer_array: Vec<Value> = keyed
        .into_iter()
        .map(|(_, signer)| {
            json!({
                "Signer": {
                    "Account": signer.account,
                    "SigningPubKey": signer.signing_pub_key,
                    "TxnSignature": signer.txn_signature,
                }
            })
        })
        .collect();

    let mut tx = tx_json.to_owned();
    tx["Signers"] = json!(signer_array);

    Ok(tx)
}

/// Decodes the 160 bit account id out of a classic address.
pub fn account_id(address: &str) -> Result<[u8; 20]> {
    let data = bs58::decode(address)
        .with_alphabet(Alphabet::RIPPLE)
        .into_vec()
        .map_err(|_| Error::Codec(format!("invalid XRPL address: {address}")))?;

    if data.len() != 25 || data[0] != 0 {
        return Err(Error::Codec(format!("invalid XRPL address: {address}")));
    }

    let mut id = [0u8; 20];
    id.copy_from_slice(&data[1..21]);
    Ok(id)
}

fn sort_accounts(accounts: &mut [&str]) -> Result<()> {
    let mut failed = None;
    accounts.sort_by_key(|account| match account_id(account) {
        Ok(id) => id,
        Err(_) => {
            failed = Some(account.to_string());
            [0u8; 20]
        }
    });
    match failed {
        Some(address) => Err(Error::Codec(format!("invalid XRPL address: {address}"))),
        None => Ok(()),
    }
}
