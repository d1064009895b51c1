use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::xrpl::rpc::{earliest_complete_ledger, XrplRpcClient};
use crate::xrpl::types::TransactionEntry;

/// Scans the multisig account's transaction history and feeds every validated
/// transaction into a channel for the observer to classify.
///
/// Two modes: `scan_full` catches up from a given ledger index to the current
/// validated ledger once; `scan_recent` repeats a sliding window of the last
/// configured ledgers forever. Deduplication is left to the contract, whose
/// idempotence errors the observer treats as benign.
pub struct AccountScanner {
    rpc: Arc<XrplRpcClient>,
    account: String,
    retry_delay: std::time::Duration,
    recent_scan_window: u32,
}

impl AccountScanner {
    pub fn new(
        rpc: Arc<XrplRpcClient>,
        account: impl Into<String>,
        retry_delay: std::time::Duration,
        recent_scan_window: u32,
    ) -> Self {
        Self {
            rpc,
            account: account.into(),
            retry_delay,
            recent_scan_window,
        }
    }

    /// Catch-up scan from `from_ledger` to the node's current validated
    /// ledger. Fails fast when the node's history no longer reaches back to
    /// the requested ledger; guessing there would silently drop transfers.
    pub async fn scan_full(
        &self,
        from_ledger: u32,
        tx: mpsc::Sender<TransactionEntry>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let server_state = self.rpc.server_state().await?;
        if let Some(earliest_available) =
            earliest_complete_ledger(&server_state.state.complete_ledgers)
        {
            if from_ledger < earliest_available {
                return Err(Error::LedgerHistoryGap {
                    requested: from_ledger,
                    earliest_available,
                });
            }
        } else {
            return Err(Error::RpcResponse(format!(
                "node has no complete ledgers: {}",
                server_state.state.complete_ledgers
            )));
        }

        info!(account = %self.account, from_ledger, "starting full history scan");
        self.scan_range(from_ledger as i64, -1, &tx, &mut shutdown)
            .await
    }

    /// Endless scan repeating the window of the most recent validated ledgers.
    pub async fn scan_recent(
        &self,
        tx: mpsc::Sender<TransactionEntry>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        info!(account = %self.account, window = self.recent_scan_window, "starting recent scan");
        loop {
            if *shutdown.borrow() {
                return Ok(());
            }

            let window_start = match self.rpc.server_state().await {
                Ok(server_state) => match server_state.state.validated_ledger {
                    Some(validated) => {
                        validated.seq.saturating_sub(self.recent_scan_window) as i64
                    }
                    None => {
                        warn!("node has no validated ledger yet");
                        -1
                    }
                },
                Err(err) => {
                    warn!(%err, "server_state failed, retrying");
                    -1
                }
            };

            if window_start >= 0 {
                if let Err(err) = self.scan_range(window_start, -1, &tx, &mut shutdown).await {
                    match err {
                        Error::ChannelClosed => return Err(Error::ChannelClosed),
                        // Transient RPC failures only delay the next iteration
                        err => warn!(%err, "recent scan iteration failed, retrying"),
                    }
                }
            }

            tokio::select! {
                _ = shutdown.changed() => return Ok(()),
                _ = tokio::time::sleep(self.retry_delay) => {}
            }
        }
    }

    async fn scan_range(
        &self,
        ledger_index_min: i64,
        ledger_index_max: i64,
        tx: &mpsc::Sender<TransactionEntry>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<()> {
        let mut marker = None;
        loop {
            if *shutdown.borrow() {
                return Ok(());
            }

            let page = self
                .rpc
                .account_tx(&self.account, ledger_index_min, ledger_index_max, marker)
                .await?;

            debug!(
                transactions = page.transactions.len(),
                has_marker = page.marker.is_some(),
                "scanned account_tx page"
            );

            for entry in page.transactions {
                if !entry.validated {
                    continue;
                }
                if tx.send(entry).await.is_err() {
                    return Err(Error::ChannelClosed);
                }
            }

            match page.marker {
                Some(next) => marker = Some(next),
                None => return Ok(()),
            }
        }
    }
}
