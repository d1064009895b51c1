use std::sync::Arc;
use std::time::Duration;

use cosmwasm_std::Addr;
use tokio::sync::watch;

use xrpl_bridge::operation::OperationType;

use crate::coreum::ContractClient;
use crate::error::Result;
use crate::processes::sign_operation;
use crate::xrpl::XrplSigner;

/// Watches the contract for Coreum to XRPL transfer operations and feeds the
/// signing queue with this relayer's signature for each of them.
pub struct CoreumToXrplProcess<C, S> {
    contract: Arc<C>,
    signer: Arc<S>,
    relayer_coreum_address: Addr,
    repeat_delay: Duration,
}

impl<C: ContractClient, S: XrplSigner> CoreumToXrplProcess<C, S> {
    pub fn new(
        contract: Arc<C>,
        signer: Arc<S>,
        relayer_coreum_address: Addr,
        repeat_delay: Duration,
    ) -> Self {
        Self {
            contract,
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

        for operation in operations
            .iter()
            .filter(|op| matches!(op.operation_type, OperationType::CoreumToXRPLTransfer { .. }))
        {
            sign_operation(
                self.contract.as_ref(),
                self.signer.as_ref(),
                &self.relayer_coreum_address,
                &config,
                operation,
            )
            .await?;
        }

        Ok(())
    }
}
