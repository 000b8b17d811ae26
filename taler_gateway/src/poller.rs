use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use chrono::Utc;
use log::*;
use taler_merchant::MerchantConnection;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    config::{AssetConfig, GatewayConfig, DEFAULT_INSTANCE},
    data_objects::{InvoiceId, OrderIntent, SettlementRecord, POLLED_STATES},
    errors::GatewayError,
    traits::{InvoiceLedger, MerchantOrders},
};

const STOPPED: u8 = 0;
const RUNNING: u8 = 1;
const STOPPING: u8 = 2;

/// Lifecycle of the settlement poller task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Stopped,
    Running,
    Stopping,
}

/// Handle to a running settlement poller: exposes its lifecycle state and cooperative shutdown.
pub struct PollerHandle {
    state: Arc<AtomicU8>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollerHandle {
    pub fn state(&self) -> PollerState {
        match self.state.load(Ordering::SeqCst) {
            RUNNING => PollerState::Running,
            STOPPING => PollerState::Stopping,
            _ => PollerState::Stopped,
        }
    }

    /// A token that is cancelled when the poller shuts down. Hosts can tie outstanding work to it.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cooperative shutdown: no new invoice checks are started, in-flight work is not drained, and the task is
    /// joined before this returns.
    pub async fn shutdown(self) {
        self.state.store(STOPPING, Ordering::SeqCst);
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!("🔎️ Settlement poller did not shut down cleanly: {e}");
        }
    }
}

/// The background settlement detector: one task per process, sweeping every configured asset on a fixed interval.
///
/// The poller holds no state of its own. De-duplication is answered by the host's recorded-payment list on every
/// sweep, so the poller can crash, restart or be redeployed at any point without double-settling an order. Errors
/// never terminate the loop: per-invoice failures are logged and skipped, per-asset failures are retried on the
/// next cycle.
pub struct SettlementPoller<L, M> {
    ledger: L,
    merchant: M,
    assets: Vec<AssetConfig>,
    interval: std::time::Duration,
}

impl<L, M> SettlementPoller<L, M>
where
    L: InvoiceLedger + 'static,
    M: MerchantOrders + 'static,
{
    pub fn new(ledger: L, merchant: M, config: &GatewayConfig) -> Self {
        Self { ledger, merchant, assets: config.assets.clone(), interval: config.poll_interval }
    }

    /// Starts the poller task. Returns `None` when no assets are configured; the component is then a no-op for the
    /// process lifetime. Do not await the handle's task directly; use [`PollerHandle::shutdown`].
    pub fn start(self) -> Option<PollerHandle> {
        if self.assets.is_empty() {
            info!("🔎️ No Taler assets are configured. The settlement poller will not start.");
            return None;
        }
        let cancel = CancellationToken::new();
        let state = Arc::new(AtomicU8::new(RUNNING));
        let handle = tokio::spawn({
            let cancel = cancel.clone();
            let state = state.clone();
            async move {
                info!("🔎️ Settlement poller started for {} asset(s)", self.assets.len());
                let mut timer = tokio::time::interval(self.interval);
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = timer.tick() => {},
                    }
                    self.sweep(&cancel).await;
                }
                state.store(STOPPED, Ordering::SeqCst);
                info!("🔎️ Settlement poller stopped");
            }
        });
        Some(PollerHandle { state, cancel, handle })
    }

    /// One full pass over all configured assets. Asset-level failures (e.g. the ledger being unreachable) are
    /// logged and left for the next cycle.
    pub(crate) async fn sweep(&self, cancel: &CancellationToken) {
        for asset in &self.assets {
            if cancel.is_cancelled() {
                return;
            }
            if let Err(e) = self.sweep_asset(asset, cancel).await {
                warn!("🔎️ Sweep for {} failed: {e}. Retrying on the next cycle.", asset.asset_code);
            }
        }
    }

    async fn sweep_asset(&self, asset: &AssetConfig, cancel: &CancellationToken) -> Result<(), GatewayError> {
        let method_id = asset.method_id();
        let invoices = self.ledger.invoices_in_states(&method_id, &POLLED_STATES).await?;
        trace!("🔎️ {} invoice(s) awaiting {}", invoices.len(), asset.asset_code);
        for invoice in invoices {
            if cancel.is_cancelled() {
                return Ok(());
            }
            if let Err(e) = self.settle_if_paid(asset, &method_id, &invoice).await {
                warn!("🔎️ Could not check invoice {invoice} for {}: {e}", asset.asset_code);
            }
        }
        Ok(())
    }

    /// Checks a single invoice's remote order and records a settlement on first-seen paid. Returns without side
    /// effects for prompts that are missing, deactivated, unparseable, or already settled.
    async fn settle_if_paid(
        &self,
        asset: &AssetConfig,
        method_id: &str,
        invoice: &InvoiceId,
    ) -> Result<(), GatewayError> {
        let prompt = match self.ledger.payment_prompt(invoice, method_id).await? {
            Some(prompt) if prompt.activated => prompt,
            _ => return Ok(()),
        };
        let intent: OrderIntent = match serde_json::from_value(prompt.detail) {
            Ok(intent) => intent,
            Err(e) => {
                debug!("🔎️ Invoice {invoice} has no readable order intent for {method_id}: {e}. Skipping.");
                return Ok(());
            },
        };
        // The host's payment list is authoritative; this check is the sole double-settle guard.
        let payments = self.ledger.recorded_payments(invoice).await?;
        if payments.iter().any(|p| p.id == intent.order_id) {
            trace!("🔎️ Order {} is already settled locally", intent.order_id);
            return Ok(());
        }
        let conn = connection_for(&intent, asset);
        let status = self.merchant.order_status(&conn, &intent.order_id).await?;
        if !status.paid {
            return Ok(());
        }
        let settlement = SettlementRecord::from_intent(&intent, Utc::now());
        self.ledger.record_settlement(invoice, &settlement).await?;
        self.ledger.invoice_needs_update(invoice).await;
        info!("🔎️ Invoice {invoice} settled by order {} ({}:{})", intent.order_id, intent.asset_code, intent.amount);
        Ok(())
    }
}

/// The connection used for a status poll: the intent's own base URL and instance when it carries them, the asset's
/// configured values otherwise. The API token always comes from the process-lifetime config snapshot.
fn connection_for(intent: &OrderIntent, asset: &AssetConfig) -> MerchantConnection {
    let base_url = if intent.merchant_base_url.trim().is_empty() {
        asset.merchant.base_url.clone()
    } else {
        intent.merchant_base_url.clone()
    };
    let instance = if intent.merchant_instance.trim().is_empty() {
        if asset.merchant.instance.trim().is_empty() {
            DEFAULT_INSTANCE.to_string()
        } else {
            asset.merchant.instance.clone()
        }
    } else {
        intent.merchant_instance.clone()
    };
    MerchantConnection::new(base_url, instance, asset.merchant.api_token.clone())
}
