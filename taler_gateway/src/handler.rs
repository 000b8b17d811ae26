use log::*;
use serde_json::Value;
use taler_merchant::{rewrite_public_pay_uri, MerchantConnection};
use tmg_common::TalerAmount;

use crate::{
    config::{AssetConfig, DEFAULT_INSTANCE},
    data_objects::{InvoiceId, OrderIntent, PaymentDetail},
    errors::{map_backend_error, GatewayError},
    traits::{InvoiceLedger, MerchantOrders},
};

/// Currency metadata the host fixes before fetching exchange rates for a prompt.
#[derive(Debug, Clone)]
pub struct CurrencyInfo {
    pub code: String,
    pub divisibility: u32,
    pub display_name: String,
    pub symbol: String,
}

/// The payment-method contract this gateway exposes to its host: the three prompt lifecycle hooks plus
/// checkout-link extraction.
#[allow(async_fn_in_trait)]
pub trait PaymentMethodHandler {
    fn method_id(&self) -> String;

    /// Pre-rate-fetch hook: fixes the currency code and divisibility the prompt is denominated in.
    fn currency_info(&self) -> CurrencyInfo;

    /// Prompt-configuration hook, invoked once per invoice when this payment option is activated. Creates the
    /// remote order and returns the [`OrderIntent`] the host embeds in the prompt. Failures here fail the checkout
    /// attempt synchronously; the host shows the payment method as unavailable.
    async fn configure_prompt<L: InvoiceLedger>(
        &self,
        ledger: &L,
        invoice: &InvoiceId,
    ) -> Result<OrderIntent, GatewayError>;

    /// Detail-blob parsing hook: deserializes a stored prompt or payment detail.
    fn parse_detail(&self, detail: &Value) -> Result<PaymentDetail, GatewayError>;

    /// The wallet URI to render as the checkout QR code / payment link.
    fn checkout_link(&self, detail: &PaymentDetail) -> String;
}

/// A Taler-denominated payment method for one configured asset.
#[derive(Clone)]
pub struct TalerPaymentMethod<M: MerchantOrders> {
    config: AssetConfig,
    merchant: M,
}

impl<M: MerchantOrders> TalerPaymentMethod<M> {
    pub fn new(config: AssetConfig, merchant: M) -> Self {
        Self { config, merchant }
    }

    /// The connection used for order creation. Fails before any remote call when no base URL is configured;
    /// an unset instance id falls back to the backend's default instance.
    fn order_connection(&self) -> Result<MerchantConnection, GatewayError> {
        if self.config.merchant.base_url.trim().is_empty() {
            return Err(GatewayError::ConfigurationMissing(format!(
                "no merchant base URL configured for {}",
                self.config.asset_code
            )));
        }
        let mut conn = self.config.merchant.clone();
        if conn.instance.trim().is_empty() {
            conn.instance = DEFAULT_INSTANCE.to_string();
        }
        Ok(conn)
    }
}

impl<M: MerchantOrders> PaymentMethodHandler for TalerPaymentMethod<M> {
    fn method_id(&self) -> String {
        self.config.method_id()
    }

    fn currency_info(&self) -> CurrencyInfo {
        CurrencyInfo {
            code: self.config.asset_code.clone(),
            divisibility: self.config.divisibility,
            display_name: self.config.display_name.clone(),
            symbol: self.config.symbol.clone(),
        }
    }

    async fn configure_prompt<L: InvoiceLedger>(
        &self,
        ledger: &L,
        invoice: &InvoiceId,
    ) -> Result<OrderIntent, GatewayError> {
        let conn = self.order_connection()?;
        let due = ledger.due_amount(invoice, &self.method_id()).await?;
        let amount = TalerAmount::new(self.config.asset_code.clone(), due).rounded(self.config.divisibility);
        let order_id = new_order_id(&self.config.asset_code);
        let summary = format!("Invoice {invoice}");
        let confirmed = self
            .merchant
            .create_order(&conn, &order_id, &summary, &amount)
            .await
            .map_err(|e| map_backend_error(&conn.instance, e))?;
        // A freshly created order must come back with a pay URI; its absence is a hard failure, not retried.
        let status =
            self.merchant.order_status(&conn, &confirmed).await.map_err(|e| map_backend_error(&conn.instance, e))?;
        let pay_uri = status
            .pay_uri
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| GatewayError::MissingPayUri(confirmed.clone()))?;
        let pay_uri = rewrite_public_pay_uri(&pay_uri, self.config.public_base_url.as_deref());
        debug!("🪙️ Prompt configured for invoice {invoice}: order {confirmed} over {amount}");
        Ok(OrderIntent {
            order_id: confirmed,
            pay_uri,
            asset_code: self.config.asset_code.clone(),
            amount: amount.value,
            merchant_base_url: conn.base_url,
            merchant_instance: conn.instance,
        })
    }

    fn parse_detail(&self, detail: &Value) -> Result<PaymentDetail, GatewayError> {
        serde_json::from_value(detail.clone()).map_err(|e| GatewayError::InvalidDetail(e.to_string()))
    }

    fn checkout_link(&self, detail: &PaymentDetail) -> String {
        detail.pay_uri().to_string()
    }
}

/// A globally unique order id: a random 128-bit token with the asset code as suffix, so the same invoice can carry
/// one order per asset without collisions.
pub(crate) fn new_order_id(asset_code: &str) -> String {
    format!("{:032x}-{asset_code}", rand::random::<u128>())
}
