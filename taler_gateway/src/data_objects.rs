use std::fmt::Display;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

//--------------------------------------      InvoiceId      ---------------------------------------------------------

/// Opaque identifier of a host-tracked invoice. The gateway never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceId(pub String);

impl Display for InvoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S: Into<String>> From<S> for InvoiceId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

//--------------------------------------     InvoiceState    ---------------------------------------------------------

/// The host's invoice lifecycle states the gateway cares about. Only `New` and `Processing` invoices are polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceState {
    New,
    Processing,
    Settled,
    Expired,
}

/// The states a settlement sweep scans.
pub const POLLED_STATES: [InvoiceState; 2] = [InvoiceState::New, InvoiceState::Processing];

//--------------------------------------    PaymentPrompt    ---------------------------------------------------------

/// A host invoice's payment prompt for one payment method, with its opaque detail blob.
#[derive(Debug, Clone)]
pub struct PaymentPrompt {
    pub activated: bool,
    pub detail: Value,
}

//--------------------------------------   RecordedPayment   ---------------------------------------------------------

/// A payment the host has already recorded against an invoice. The id is the order id, which makes this list the
/// authoritative de-duplication source for the poller.
#[derive(Debug, Clone)]
pub struct RecordedPayment {
    pub id: String,
    pub amount: Decimal,
    pub currency: String,
}

//--------------------------------------      OrderIntent    ---------------------------------------------------------

/// The gateway's record of a remote order created for one invoice/asset pair. Created once when the payment option
/// is activated, embedded in the invoice's payment prompt, and immutable thereafter; the poller only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub order_id: String,
    pub pay_uri: String,
    pub asset_code: String,
    pub amount: Decimal,
    pub merchant_base_url: String,
    pub merchant_instance: String,
}

//--------------------------------------   SettlementRecord  ---------------------------------------------------------

/// The local record of a backend-confirmed payment, created exactly once per order id when the poller first
/// observes the order as paid. Immutable once written; ownership passes to the host's payment ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub order_id: String,
    pub asset_code: String,
    pub amount: Decimal,
    pub pay_uri: String,
    pub merchant_base_url: String,
    pub merchant_instance: String,
    pub settled_at: DateTime<Utc>,
}

impl SettlementRecord {
    pub fn from_intent(intent: &OrderIntent, settled_at: DateTime<Utc>) -> Self {
        Self {
            order_id: intent.order_id.clone(),
            asset_code: intent.asset_code.clone(),
            amount: intent.amount,
            pay_uri: intent.pay_uri.clone(),
            merchant_base_url: intent.merchant_base_url.clone(),
            merchant_instance: intent.merchant_instance.clone(),
            settled_at,
        }
    }
}

//--------------------------------------    PaymentDetail    ---------------------------------------------------------

/// A parsed detail blob: either an [`OrderIntent`] (from a payment prompt) or a [`SettlementRecord`] (from a
/// recorded payment). A settlement carries every intent field plus `settled_at`, so it must be tried first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentDetail {
    Settlement(SettlementRecord),
    Intent(OrderIntent),
}

impl PaymentDetail {
    /// The wallet pay URI, for QR/link rendering at checkout.
    pub fn pay_uri(&self) -> &str {
        match self {
            Self::Settlement(s) => &s.pay_uri,
            Self::Intent(i) => &i.pay_uri,
        }
    }

    pub fn order_id(&self) -> &str {
        match self {
            Self::Settlement(s) => &s.order_id,
            Self::Intent(i) => &i.order_id,
        }
    }
}
