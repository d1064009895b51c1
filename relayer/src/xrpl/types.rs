use serde::Deserialize;
use serde_json::Value;

/// An issued currency amount or a drops amount, as XRPL serializes them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Drops(String),
    Issued {
        currency: String,
        issuer: String,
        value: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Memo {
    #[serde(rename = "MemoData")]
    pub memo_data: Option<String>,
    #[serde(rename = "MemoType")]
    pub memo_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemoWrapper {
    #[serde(rename = "Memo")]
    pub memo: Memo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XrplTransaction {
    #[serde(rename = "TransactionType")]
    pub transaction_type: String,
    #[serde(rename = "Account")]
    pub account: String,
    #[serde(rename = "Destination")]
    pub destination: Option<String>,
    #[serde(rename = "Amount")]
    pub amount: Option<Amount>,
    #[serde(rename = "Sequence")]
    pub sequence: Option<u64>,
    #[serde(rename = "TicketSequence")]
    pub ticket_sequence: Option<u64>,
    #[serde(rename = "Memos")]
    pub memos: Option<Vec<MemoWrapper>>,
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionMetadata {
    #[serde(rename = "TransactionResult")]
    pub transaction_result: String,
    // Partial payments may deliver less than the nominal amount; only this
    // field is trustworthy for crediting
    #[serde(rename = "delivered_amount")]
    pub delivered_amount: Option<Amount>,
    #[serde(rename = "AffectedNodes", default)]
    pub affected_nodes: Vec<Value>,
}

impl TransactionMetadata {
    /// Tickets created by a TicketCreate transaction, read from the metadata.
    pub fn created_tickets(&self) -> Vec<u64> {
        let mut tickets = vec![];
        for node in &self.affected_nodes {
            let Some(created) = node.get("CreatedNode") else {
                continue;
            };
            if created.get("LedgerEntryType").and_then(Value::as_str) != Some("Ticket") {
                continue;
            }
            if let Some(sequence) = created
                .pointer("/NewFields/TicketSequence")
                .and_then(Value::as_u64)
            {
                tickets.push(sequence);
            }
        }
        tickets.sort_unstable();
        tickets
    }
}

/// One entry of an account_tx page.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionEntry {
    pub tx: XrplTransaction,
    pub meta: TransactionMetadata,
    pub validated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountTxResponse {
    pub account: String,
    pub transactions: Vec<TransactionEntry>,
    pub marker: Option<Value>,
    #[serde(rename = "ledger_index_max")]
    pub ledger_index_max: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerState {
    pub complete_ledgers: String,
    pub validated_ledger: Option<ValidatedLedger>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidatedLedger {
    pub seq: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerStateResponse {
    pub state: ServerState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountData {
    #[serde(rename = "Account")]
    pub account: String,
    // XRP balance in drops
    #[serde(rename = "Balance")]
    pub balance: String,
    #[serde(rename = "Sequence")]
    pub sequence: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfoResponse {
    pub account_data: AccountData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrustLine {
    pub currency: String,
    pub account: String,
    pub balance: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountLinesResponse {
    pub lines: Vec<TrustLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub engine_result: String,
    pub engine_result_message: Option<String>,
    pub tx_json: Option<Value>,
}
