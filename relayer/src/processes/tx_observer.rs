use std::sync::Arc;

use cosmwasm_std::{Addr, Uint128};
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info, warn};

use xrpl_bridge::{
    contract::{XRPL_TOKENS_DECIMALS, XRP_CURRENCY, XRP_ISSUER},
    evidence::{Evidence, OperationResult, TransactionResult},
};

use crate::coreum::ContractClient;
use crate::error::Result;
use crate::xrpl::codec::{decode_recipient_memo, xrpl_value_to_amount};
use crate::xrpl::types::{Amount, TransactionEntry};

const TX_RESULT_SUCCESS: &str = "tesSUCCESS";

/// Turns scanned XRPL transactions into contract evidences.
///
/// Two kinds of transactions matter: payments into the multisig account
/// (deposits towards Coreum) and transactions sent by the multisig account
/// itself (outcomes of pending operations). Everything else is ignored.
pub struct TxObserver<C> {
    contract: Arc<C>,
    bridge_xrpl_address: String,
    incoming: Mutex<mpsc::Receiver<TransactionEntry>>,
}

impl<C: ContractClient> TxObserver<C> {
    pub fn new(
        contract: Arc<C>,
        bridge_xrpl_address: impl Into<String>,
        incoming: mpsc::Receiver<TransactionEntry>,
    ) -> Self {
        Self {
            contract,
            bridge_xrpl_address: bridge_xrpl_address.into(),
            incoming: Mutex::new(incoming),
        }
    }

    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut incoming = self.incoming.lock().await;
        loop {
            tokio::select! {
                _ = shutdown.changed() => return Ok(()),
                entry = incoming.recv() => match entry {
                    None => return Ok(()),
                    Some(entry) => self.process_transaction(entry).await?,
                }
            }
        }
    }

    async fn process_transaction(&self, entry: TransactionEntry) -> Result<()> {
        let Some(evidence) = classify_transaction(&entry, &self.bridge_xrpl_address) else {
            return Ok(());
        };

        match self.contract.save_evidence(evidence).await {
            Ok(()) => {
                info!(hash = ?entry.tx.hash, "evidence submitted");
                Ok(())
            }
            // Benign: another relayer already confirmed it or we rescanned
            Err(err)
                if err.is_operation_already_executed()
                    || err.is_evidence_already_provided()
                    || err.is_pending_operation_not_found() =>
            {
                debug!(hash = ?entry.tx.hash, %err, "evidence skipped");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

/// Maps one validated XRPL transaction to the evidence it proves, if any.
/// Deterministic over the transaction content so that every relayer produces
/// the same payload hash.
pub fn classify_transaction(
    entry: &TransactionEntry,
    bridge_xrpl_address: &str,
) -> Option<Evidence> {
    if !entry.validated {
        return None;
    }
    let tx = &entry.tx;

    if tx.account == bridge_xrpl_address {
        // An outcome of a transaction the bridge itself submitted. Only tes
        // and tec class results make it into validated ledgers; tec burned
        // the ticket just like success did.
        let transaction_result = if entry.meta.transaction_result == TX_RESULT_SUCCESS {
            TransactionResult::Accepted
        } else if entry.meta.transaction_result.starts_with("tec") {
            TransactionResult::Rejected
        } else {
            return None;
        };

        let tx_hash = tx.hash.to_owned()?;

        let operation_result = if tx.transaction_type == "TicketCreate" {
            let tickets = match transaction_result {
                TransactionResult::Accepted => Some(entry.meta.created_tickets()),
                _ => None,
            };
            Some(OperationResult::TicketsAllocation { tickets })
        } else {
            None
        };

        return Some(Evidence::XRPLTransactionResult {
            tx_hash: Some(tx_hash),
            account_sequence: match tx.ticket_sequence {
                Some(_) => None,
                None => tx.sequence,
            },
            ticket_sequence: tx.ticket_sequence,
            transaction_result,
            operation_result,
        });
    }

    if tx.transaction_type == "Payment" && tx.destination.as_deref() == Some(bridge_xrpl_address) {
        if entry.meta.transaction_result != TX_RESULT_SUCCESS {
            return None;
        }

        // A transfer without a readable recipient memo is dropped with no
        // balance effect; the funds stay on the multisig account
        let memo_data = tx
            .memos
            .as_ref()?
            .iter()
            .find_map(|m| m.memo.memo_data.as_deref())?;
        let Some(recipient) = decode_recipient_memo(memo_data) else {
            warn!(hash = ?tx.hash, "payment with malformed recipient memo discarded");
            return None;
        };

        // Partial payments deliver less than the nominal amount; only the
        // delivered amount from the metadata credits the recipient
        let delivered = entry.meta.delivered_amount.as_ref().or(tx.amount.as_ref())?;
        let (issuer, currency, amount) = match delivered {
            Amount::Drops(drops) => (
                XRP_ISSUER.to_string(),
                XRP_CURRENCY.to_string(),
                Uint128::new(drops.parse().ok()?),
            ),
            Amount::Issued {
                currency,
                issuer,
                value,
            } => (
                issuer.to_owned(),
                currency.to_owned(),
                xrpl_value_to_amount(value, XRPL_TOKENS_DECIMALS).ok()?,
            ),
        };
        if amount.is_zero() {
            return None;
        }

        return Some(Evidence::XRPLToCoreumTransfer {
            tx_hash: tx.hash.to_owned()?,
            issuer,
            currency,
            amount,
            recipient: Addr::unchecked(recipient),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xrpl::codec::encode_recipient_memo;
    use serde_json::json;

    const BRIDGE: &str = "rBridgeAccountAAAAAAAAAAAAAAAAAAAA";
    const RECIPIENT: &str = "core1qqql6zm8qrp20avx4vyk4lvxlhh5l3quuqqqqqq";

    fn payment_entry(memo_data: Option<String>, delivered: serde_json::Value) -> TransactionEntry {
        let mut tx = json!({
            "TransactionType": "Payment",
            "Account": "rSenderAAAAAAAAAAAAAAAAAAAAAAAAAA",
            "Destination": BRIDGE,
            "Amount": "99999",
            "hash": "ABCDEF0123456789",
        });
        if let Some(memo_data) = memo_data {
            tx["Memos"] = json!([{ "Memo": { "MemoData": memo_data } }]);
        }
        serde_json::from_value(json!({
            "tx": tx,
            "meta": {
                "TransactionResult": "tesSUCCESS",
                "delivered_amount": delivered,
            },
            "validated": true,
        }))
        .unwrap()
    }

    #[test]
    fn classifies_partial_payment_by_delivered_amount() {
        let entry = payment_entry(
            Some(encode_recipient_memo(RECIPIENT)),
            json!({ "currency": "RCP", "issuer": "rIssuer", "value": "1.00000111" }),
        );

        let evidence = classify_transaction(&entry, BRIDGE).unwrap();
        match evidence {
            Evidence::XRPLToCoreumTransfer {
                amount, recipient, ..
            } => {
                // The delivered amount, not the nominal 99999, is credited
                assert_eq!(amount, Uint128::new(1_000_001_110_000_000));
                assert_eq!(recipient, Addr::unchecked(RECIPIENT));
            }
            other => panic!("unexpected evidence: {other:?}"),
        }
    }

    #[test]
    fn discards_payment_without_memo() {
        let entry = payment_entry(None, json!("12345"));
        assert!(classify_transaction(&entry, BRIDGE).is_none());

        let entry = payment_entry(Some("ZZZZ".to_string()), json!("12345"));
        assert!(classify_transaction(&entry, BRIDGE).is_none());
    }

    #[test]
    fn classifies_bridge_originated_ticket_create() {
        let entry: TransactionEntry = serde_json::from_value(json!({
            "tx": {
                "TransactionType": "TicketCreate",
                "Account": BRIDGE,
                "Sequence": 1,
                "hash": "FEEDBEEF",
            },
            "meta": {
                "TransactionResult": "tesSUCCESS",
                "AffectedNodes": [
                    {"CreatedNode": {"LedgerEntryType": "Ticket", "NewFields": {"TicketSequence": 3}}},
                    {"CreatedNode": {"LedgerEntryType": "Ticket", "NewFields": {"TicketSequence": 5}}}
                ]
            },
            "validated": true,
        }))
        .unwrap();

        let evidence = classify_transaction(&entry, BRIDGE).unwrap();
        match evidence {
            Evidence::XRPLTransactionResult {
                account_sequence,
                ticket_sequence,
                transaction_result,
                operation_result,
                ..
            } => {
                assert_eq!(account_sequence, Some(1));
                assert_eq!(ticket_sequence, None);
                assert_eq!(transaction_result, TransactionResult::Accepted);
                assert_eq!(
                    operation_result,
                    Some(OperationResult::TicketsAllocation {
                        tickets: Some(vec![3, 5])
                    })
                );
            }
            other => panic!("unexpected evidence: {other:?}"),
        }
    }

    #[test]
    fn rejected_outcome_keeps_ticket_correlation() {
        let entry: TransactionEntry = serde_json::from_value(json!({
            "tx": {
                "TransactionType": "Payment",
                "Account": BRIDGE,
                "Destination": "rSomeoneAAAAAAAAAAAAAAAAAAAAAAAAA",
                "Sequence": 0,
                "TicketSequence": 42,
                "hash": "CAFE",
            },
            "meta": { "TransactionResult": "tecPATH_DRY" },
            "validated": true,
        }))
        .unwrap();

        let evidence = classify_transaction(&entry, BRIDGE).unwrap();
        match evidence {
            Evidence::XRPLTransactionResult {
                ticket_sequence,
                account_sequence,
                transaction_result,
                ..
            } => {
                assert_eq!(ticket_sequence, Some(42));
                assert_eq!(account_sequence, None);
                assert_eq!(transaction_result, TransactionResult::Rejected);
            }
            other => panic!("unexpected evidence: {other:?}"),
        }
    }

    #[test]
    fn ignores_unvalidated_and_foreign_transactions() {
        let mut entry = payment_entry(Some(encode_recipient_memo(RECIPIENT)), json!("12345"));
        entry.validated = false;
        assert!(classify_transaction(&entry, BRIDGE).is_none());

        let entry = payment_entry(Some(encode_recipient_memo(RECIPIENT)), json!("12345"));
        assert!(classify_transaction(&entry, "rOtherBridgeAAAAAAAAAAAAAAAAAAAA").is_none());
    }
}
