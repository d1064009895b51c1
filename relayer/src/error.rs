use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("xrpl rpc transport error: {0}")]
    Rpc(#[from] reqwest::Error),

    #[error("xrpl rpc error response: {0}")]
    RpcResponse(String),

    #[error("xrpl submission failed: {0}")]
    Submission(String),

    #[error("contract error: {0}")]
    Contract(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(
        "xrpl node history starts at ledger {earliest_available} but the scan was requested from ledger {requested}"
    )]
    LedgerHistoryGap {
        requested: u32,
        earliest_available: u32,
    },

    #[error("channel closed")]
    ChannelClosed,
}

// The contract surfaces its typed errors as strings through the host chain;
// these predicates let processes tell benign races from real failures.
impl Error {
    fn contract_error_contains(&self, name: &str) -> bool {
        matches!(self, Error::Contract(message) if message.contains(name))
    }

    pub fn is_operation_already_executed(&self) -> bool {
        self.contract_error_contains("OperationAlreadyExecuted")
    }

    pub fn is_evidence_already_provided(&self) -> bool {
        self.contract_error_contains("EvidenceAlreadyProvided")
    }

    pub fn is_signature_already_provided(&self) -> bool {
        self.contract_error_contains("SignatureAlreadyProvided")
    }

    pub fn is_operation_version_mismatch(&self) -> bool {
        self.contract_error_contains("OperationVersionMismatch")
    }

    pub fn is_pending_operation_not_found(&self) -> bool {
        self.contract_error_contains("PendingOperationNotFound")
    }

    pub fn is_bridge_halted(&self) -> bool {
        self.contract_error_contains("BridgeHalted")
    }
}
