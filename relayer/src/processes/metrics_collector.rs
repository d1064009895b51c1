use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::warn;

use crate::coreum::ContractClient;
use crate::error::Result;
use crate::metrics::BridgeMetrics;
use crate::xrpl::rpc::XrplRpcClient;

const DROPS_PER_XRP: f64 = 1_000_000.0;

/// Periodically samples the contract and the XRPL account into the
/// Prometheus gauges. A failed sample only logs; the next tick retries.
pub struct PeriodicMetricsCollector<C> {
    contract: Arc<C>,
    rpc: Arc<XrplRpcClient>,
    metrics: Arc<BridgeMetrics>,
    bridge_xrpl_address: String,
    repeat_delay: Duration,
    float_truncation_precision: u32,
}

impl<C: ContractClient> PeriodicMetricsCollector<C> {
    pub fn new(
        contract: Arc<C>,
        rpc: Arc<XrplRpcClient>,
        metrics: Arc<BridgeMetrics>,
        bridge_xrpl_address: impl Into<String>,
        repeat_delay: Duration,
        float_truncation_precision: u32,
    ) -> Self {
        Self {
            contract,
            rpc,
            metrics,
            bridge_xrpl_address: bridge_xrpl_address.into(),
            repeat_delay,
            float_truncation_precision,
        }
    }

    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        loop {
            if let Err(err) = self.collect().await {
                warn!(%err, "metrics collection failed");
            }

            tokio::select! {
                _ = shutdown.changed() => return Ok(()),
                _ = tokio::time::sleep(self.repeat_delay) => {}
            }
        }
    }

    async fn collect(&self) -> Result<()> {
        let config = self.contract.config().await?;
        self.metrics.relayers_total.set(config.relayers.len() as i64);
        self.metrics.xrpl_base_fee.set(config.xrpl_base_fee as i64);

        let operations = self.contract.pending_operations().await?;
        self.metrics
            .pending_operations_total
            .set(operations.len() as i64);

        let tickets = self.contract.available_tickets().await?;
        self.metrics
            .available_tickets_total
            .set(tickets.len() as i64);

        let account_info = self.rpc.account_info(&self.bridge_xrpl_address).await?;
        if let Ok(drops) = account_info.account_data.balance.parse::<f64>() {
            self.metrics
                .bridge_xrp_balance
                .set(self.truncate(drops / DROPS_PER_XRP));
        }

        let lines = self.rpc.account_lines(&self.bridge_xrpl_address).await?;
        for line in lines.lines {
            if let Ok(balance) = line.balance.parse::<f64>() {
                self.metrics
                    .bridge_token_balance
                    .with_label_values(&[line.currency.as_str()])
                    // Trust line balances are negative from the holder's side
                    .set(self.truncate(balance.abs()));
            }
        }

        Ok(())
    }

    fn truncate(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.float_truncation_precision as i32);
        (value * factor).trunc() / factor
    }
}
