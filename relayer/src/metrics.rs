use prometheus::{Gauge, GaugeVec, IntGauge, Opts, Registry};

/// Bridge gauges exposed through Prometheus, sampled by the periodic
/// collector process.
pub struct BridgeMetrics {
    /// Relayers in the current contract config
    pub relayers_total: IntGauge,
    /// XRPL base fee the contract currently serializes operations with
    pub xrpl_base_fee: IntGauge,
    /// Operations waiting for signatures or XRPL confirmation
    pub pending_operations_total: IntGauge,
    /// Free tickets left in the contract's pool
    pub available_tickets_total: IntGauge,
    /// XRP held by the bridge multisig account
    pub bridge_xrp_balance: Gauge,
    /// Issued token balances held by the bridge multisig account, per currency
    pub bridge_token_balance: GaugeVec,
}

impl BridgeMetrics {
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let relayers_total = IntGauge::new(
            "bridge_relayers_total",
            "Number of relayers in the contract config.",
        )?;
        registry.register(Box::new(relayers_total.clone()))?;

        let xrpl_base_fee = IntGauge::new(
            "bridge_xrpl_base_fee",
            "XRPL base fee used for operation serialization.",
        )?;
        registry.register(Box::new(xrpl_base_fee.clone()))?;

        let pending_operations_total = IntGauge::new(
            "bridge_pending_operations_total",
            "Number of operations pending signatures or confirmation.",
        )?;
        registry.register(Box::new(pending_operations_total.clone()))?;

        let available_tickets_total = IntGauge::new(
            "bridge_available_tickets_total",
            "Number of free tickets in the contract's pool.",
        )?;
        registry.register(Box::new(available_tickets_total.clone()))?;

        let bridge_xrp_balance = Gauge::new(
            "bridge_xrp_balance",
            "XRP balance of the bridge multisig account.",
        )?;
        registry.register(Box::new(bridge_xrp_balance.clone()))?;

        let bridge_token_balance = GaugeVec::new(
            Opts::new(
                "bridge_token_balance",
                "Issued token balance of the bridge multisig account.",
            ),
            &["currency"],
        )?;
        registry.register(Box::new(bridge_token_balance.clone()))?;

        Ok(Self {
            relayers_total,
            xrpl_base_fee,
            pending_operations_total,
            available_tickets_total,
            bridge_xrp_balance,
            bridge_token_balance,
        })
    }
}
