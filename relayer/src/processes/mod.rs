pub mod coreum_to_xrpl;
pub mod metrics_collector;
pub mod supervisor;
pub mod tx_observer;
pub mod tx_submitter;

use std::sync::Arc;

use cosmwasm_std::Addr;
use tokio::sync::mpsc;
use tracing::{debug, info};

use xrpl_bridge::{operation::Operation, state::Config};

use crate::config::RelayerConfig;
use crate::coreum::ContractClient;
use crate::error::Result;
use crate::metrics::BridgeMetrics;
use crate::xrpl::rpc::XrplRpcClient;
use crate::xrpl::scanner::AccountScanner;
use crate::xrpl::tx_builder::build_operation_tx;
use crate::xrpl::XrplSigner;

use self::coreum_to_xrpl::CoreumToXrplProcess;
use self::metrics_collector::PeriodicMetricsCollector;
use self::supervisor::Supervisor;
use self::tx_observer::TxObserver;
use self::tx_submitter::XrplTxSubmitter;

const SCANNER_CHANNEL_CAPACITY: usize = 1024;

/// Signs one pending operation with this relayer's key and saves the
/// signature in the contract, unless this relayer already signed the current
/// version. Contract races (someone else confirming, a version bump between
/// query and submission) are benign and skipped.
pub(crate) async fn sign_operation<C: ContractClient, S: XrplSigner>(
    contract: &C,
    signer: &S,
    relayer_coreum_address: &Addr,
    config: &Config,
    operation: &Operation,
) -> Result<()> {
    if operation
        .signatures
        .iter()
        .any(|s| s.relayer_coreum_address == *relayer_coreum_address)
    {
        return Ok(());
    }

    let tx_json = build_operation_tx(operation, config)?;
    let signature = signer.sign(&tx_json)?;

    match contract
        .save_signature(operation.operation_sequence(), operation.version, signature)
        .await
    {
        Ok(()) => {
            info!(
                operation_sequence = operation.operation_sequence(),
                version = operation.version,
                "signature saved"
            );
            Ok(())
        }
        Err(err)
            if err.is_signature_already_provided()
                || err.is_operation_version_mismatch()
                || err.is_pending_operation_not_found()
                || err.is_bridge_halted() =>
        {
            debug!(
                operation_sequence = operation.operation_sequence(),
                %err,
                "signature skipped"
            );
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Wires the four relayer processes to one supervised group:
/// the account scanner feeding the observer, the transaction submitter, the
/// Coreum to XRPL signer and the periodic metrics collector.
pub struct RelayerRuntime<C, S> {
    pub relayer_config: RelayerConfig,
    pub contract: Arc<C>,
    pub rpc: Arc<XrplRpcClient>,
    pub signer: Arc<S>,
    pub relayer_coreum_address: Addr,
    pub metrics: Arc<BridgeMetrics>,
}

impl<C: ContractClient, S: XrplSigner> RelayerRuntime<C, S> {
    pub async fn run(self) -> anyhow::Result<()> {
        // The multisig account everything revolves around comes from the
        // contract, not from local configuration
        let contract_config = self.contract.config().await?;
        let bridge_xrpl_address = contract_config.bridge_xrpl_address;

        let scanner_config = &self.relayer_config.xrpl.scanner;
        let scanner = Arc::new(AccountScanner::new(
            self.rpc.clone(),
            bridge_xrpl_address.to_owned(),
            scanner_config.retry_delay(),
            scanner_config.recent_scan_window,
        ));

        let (entries_tx, entries_rx) = mpsc::channel(SCANNER_CHANNEL_CAPACITY);
        let observer = Arc::new(TxObserver::new(
            self.contract.clone(),
            bridge_xrpl_address.to_owned(),
            entries_rx,
        ));
        let submitter = Arc::new(XrplTxSubmitter::new(
            self.contract.clone(),
            self.rpc.clone(),
            self.signer.clone(),
            self.relayer_coreum_address.to_owned(),
            self.relayer_config.processes.xrpl_tx_submitter.repeat_delay(),
        ));
        let coreum_to_xrpl = Arc::new(CoreumToXrplProcess::new(
            self.contract.clone(),
            self.signer.clone(),
            self.relayer_coreum_address.to_owned(),
            self.relayer_config
                .processes
                .coreum_to_xrpl_process
                .repeat_delay(),
        ));
        let collector_config = &self.relayer_config.metrics.periodic_collector;
        let collector = Arc::new(PeriodicMetricsCollector::new(
            self.contract.clone(),
            self.rpc.clone(),
            self.metrics.clone(),
            bridge_xrpl_address,
            collector_config.repeat_delay(),
            collector_config.float_truncation_precision,
        ));

        let mut supervisor = Supervisor::new(
            self.relayer_config.processes.exit_on_error,
            scanner_config.retry_delay(),
        );
        let shutdown = supervisor.shutdown_receiver();

        supervisor.spawn("xrpl_account_scanner", true, {
            let scanner = scanner.clone();
            let entries_tx = entries_tx.clone();
            let shutdown = shutdown.clone();
            move || {
                let scanner = scanner.clone();
                let entries_tx = entries_tx.clone();
                let shutdown = shutdown.clone();
                async move { scanner.scan_recent(entries_tx, shutdown).await }
            }
        });
        supervisor.spawn("xrpl_tx_observer", true, {
            let observer = observer.clone();
            let shutdown = shutdown.clone();
            move || {
                let observer = observer.clone();
                let shutdown = shutdown.clone();
                async move { observer.run(shutdown).await }
            }
        });
        supervisor.spawn("xrpl_tx_submitter", true, {
            let submitter = submitter.clone();
            let shutdown = shutdown.clone();
            move || {
                let submitter = submitter.clone();
                let shutdown = shutdown.clone();
                async move { submitter.run(shutdown).await }
            }
        });
        supervisor.spawn("coreum_to_xrpl_process", true, {
            let coreum_to_xrpl = coreum_to_xrpl.clone();
            let shutdown = shutdown.clone();
            move || {
                let coreum_to_xrpl = coreum_to_xrpl.clone();
                let shutdown = shutdown.clone();
                async move { coreum_to_xrpl.run(shutdown).await }
            }
        });
        supervisor.spawn("metrics_periodic_collector", true, {
            let collector = collector.clone();
            move || {
                let collector = collector.clone();
                let shutdown = shutdown.clone();
                async move { collector.run(shutdown).await }
            }
        });

        supervisor.run().await
    }
}
