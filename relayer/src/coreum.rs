use async_trait::async_trait;
use cosmwasm_std::Coin;

use xrpl_bridge::{
    evidence::Evidence,
    operation::Operation,
    state::{Config, CoreumToken, XRPLToken},
};

use crate::error::Result;

/// Interface to the bridge contract on Coreum. The concrete implementation
/// wraps the chain's gRPC client and transaction broadcaster, which live
/// outside of this crate; the processes only depend on this trait.
#[async_trait]
pub trait ContractClient: Send + Sync + 'static {
    async fn config(&self) -> Result<Config>;

    async fn pending_operations(&self) -> Result<Vec<Operation>>;

    async fn available_tickets(&self) -> Result<Vec<u64>>;

    async fn xrpl_tokens(&self) -> Result<Vec<XRPLToken>>;

    async fn coreum_tokens(&self) -> Result<Vec<CoreumToken>>;

    async fn fees_collected(&self, relayer_address: &str) -> Result<Vec<Coin>>;

    async fn save_evidence(&self, evidence: Evidence) -> Result<()>;

    async fn save_signature(
        &self,
        operation_sequence: u64,
        operation_version: u64,
        signature: String,
    ) -> Result<()>;
}
