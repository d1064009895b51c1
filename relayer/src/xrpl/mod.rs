pub mod codec;
pub mod rpc;
pub mod scanner;
pub mod tx_builder;
pub mod types;

use serde_json::Value;

use crate::error::Result;

/// Signer over the canonical XRPL multisigning serialization. The keyring and
/// the binary codec backing it are external to this crate.
pub trait XrplSigner: Send + Sync + 'static {
    /// The signer's XRPL account, included in the Signer entry.
    fn account(&self) -> &str;

    /// Hex encoded public key matching the account.
    fn public_key(&self) -> &str;

    /// Produces the hex encoded TxnSignature for the transaction JSON.
    fn sign(&self, tx_json: &Value) -> Result<String>;
}
