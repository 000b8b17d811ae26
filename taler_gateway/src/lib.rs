//! Taler Merchant Gateway engine.
//!
//! This crate lets an invoicing host accept payments denominated in Taler-issued assets by delegating order
//! creation and settlement tracking to a merchant backend over HTTP. It is host-agnostic: the invoice and payment
//! ledger stay with the host behind the [`traits::InvoiceLedger`] seam, and the merchant backend is reached through
//! [`traits::MerchantOrders`] (implemented by [`taler_merchant::MerchantApi`]).
//!
//! The engine has three moving parts:
//! 1. Configuration ([`mod@config`]): an immutable per-asset snapshot built once at startup. Credentials and URLs are
//!    never re-read mid-process, so provisioning and polling can never observe inconsistent settings.
//! 2. The payment-method handler ([`TalerPaymentMethod`]): invoked synchronously during checkout to create a remote
//!    order, normalize its pay URI and embed an [`OrderIntent`] in the invoice's payment prompt.
//! 3. The settlement poller ([`SettlementPoller`]): one background task that scans prompted invoices, checks remote
//!    order status, and records a settlement exactly once per order id when the backend first reports it paid.

pub mod config;
pub mod data_objects;
mod errors;
mod handler;
mod poller;
mod provisioning;
pub mod traits;

#[cfg(test)]
mod test_utils;

pub use config::{AssetConfig, GatewayConfig};
pub use data_objects::{
    InvoiceId,
    InvoiceState,
    OrderIntent,
    PaymentDetail,
    PaymentPrompt,
    RecordedPayment,
    SettlementRecord,
};
pub use errors::{GatewayError, LedgerError};
pub use handler::{CurrencyInfo, PaymentMethodHandler, TalerPaymentMethod};
pub use poller::{PollerHandle, PollerState, SettlementPoller};
pub use provisioning::provision_instance;
