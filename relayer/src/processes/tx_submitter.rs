use std::sync::Arc;
use std::time::Duration;

use cosmwasm_std::Addr;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use xrpl_bridge::{operation::OperationType, state::Config};

use crate::coreum::ContractClient;
use crate::error::{Error, Result};
use crate::processes::sign_operation;
use crate::xrpl::rpc::XrplRpcClient;
use crate::xrpl::tx_builder::{assemble_multisigned, build_operation_tx, TxSigner};
use crate::xrpl::XrplSigner;

// Engine results that mean another relayer's transaction already consumed the
// sequence or ticket; the loser of the race just moves on.
const RACE_LOST_RESULTS: [&str; 2] = ["tefNO_TICKET", "tefPAST_SEQ"];

/// Polls the contract's signing queue: signs what still needs this relayer's
/// signature and broadcasts every operation that reached the signature quorum.
pub struct XrplTxSubmitter<C, S> {
    contract: Arc<C>,
    rpc: Arc<XrplRpcClient>,
    signer: Arc<S>,
    relayer_coreum_address: Addr,
    repeat_delay: Duration,
}

impl<C: ContractClient, S: XrplSigner> XrplTxSubmitter<C, S> {
    pub fn new(
        contract: Arc<C>,
        rpc: Arc<XrplRpcClient>,
        signer: Arc<S>,
        relayer_coreum_address: Addr,
        repeat_delay: Duration,
    ) -> Self {
        Self {
            contract,
            rpc,
            signer,
            relayer_coreum_address,
            repeat_delay,
        }
    }

    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        loop {
            self.iteration().await?;

            tokio::select! {
                _ = shutdown.changed() => return Ok(()),
                _ = tokio::time::sleep(self.repeat_delay) => {}
            }
        }
    }

    async fn iteration(&self) -> Result<()> {
        let config = self.contract.config().await?;
        let operations = self.contract.pending_operations().await?;

        for operation in operations {
            // Transfer operations are fed into the signing queue by the
            // dedicated Coreum to XRPL process
            if !matches!(
                operation.operation_type,
                OperationType::CoreumToXRPLTransfer { .. }
            ) {
                sign_operation(
                    self.contract.as_ref(),
                    self.signer.as_ref(),
                    &self.relayer_coreum_address,
                    &config,
                    &operation,
                )
                .await?;
            }

            if operation.signatures.len() >= config.evidence_threshold as usize {
                self.submit(&config, &operation).await?;
            }
        }

        Ok(())
    }

    async fn submit(
        &self,
        config: &Config,
        operation: &xrpl_bridge::operation::Operation,
    ) -> Result<()> {
        let tx_json = build_operation_tx(operation, config)?;

        // Signatures map back to the signer set through the contract config;
        // anything left over from before a rotation is unusable
        let signers: Vec<TxSigner> = operation
            .signatures
            .iter()
            .filter_map(|signature| {
                config
                    .relayers
                    .iter()
                    .find(|relayer| relayer.coreum_address == signature.relayer_coreum_address)
                    .map(|relayer| TxSigner {
                        account: relayer.xrpl_address.to_owned(),
                        signing_pub_key: relayer.xrpl_pub_key.to_owned(),
                        txn_signature: signature.signature.to_owned(),
                    })
            })
            .collect();

        if signers.len() < config.evidence_threshold as usize {
            debug!(
                operation_sequence = operation.operation_sequence(),
                "not enough signatures from current relayers yet"
            );
            return Ok(());
        }

        let multisigned = assemble_multisigned(&tx_json, signers)?;
        let response = self.rpc.submit_multisigned(multisigned).await?;

        let engine_result = response.engine_result.as_str();
        if engine_result == "tesSUCCESS" || engine_result == "terQUEUED" {
            info!(
                operation_sequence = operation.operation_sequence(),
                engine_result, "multisigned transaction submitted"
            );
        } else if RACE_LOST_RESULTS.contains(&engine_result) {
            // The winner's transaction consumed the ticket; the observer will
            // report its outcome
            debug!(
                operation_sequence = operation.operation_sequence(),
                engine_result, "lost the submission race"
            );
        } else if engine_result.starts_with("tem") {
            // A malformed transaction means our shaping disagrees with XRPL
            return Err(Error::Submission(format!(
                "{}: {}",
                engine_result,
                response.engine_result_message.unwrap_or_default()
            )));
        } else {
            warn!(
                operation_sequence = operation.operation_sequence(),
                engine_result, "unexpected submission result"
            );
        }

        Ok(())
    }
}
