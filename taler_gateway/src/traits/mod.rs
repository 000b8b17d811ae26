//! Trait seams between the gateway and its collaborators.
//!
//! The gateway owns no persistent state: invoices and payments live with the host behind [`InvoiceLedger`], and the
//! merchant backend is reached through [`MerchantOrders`] for the order flow and [`InstanceAdmin`] for one-time
//! provisioning. All seams are implemented by real collaborators in production and by in-memory fakes in tests.

mod instance_admin;
mod invoice_ledger;
mod merchant_orders;

pub use instance_admin::InstanceAdmin;
pub use invoice_ledger::InvoiceLedger;
pub use merchant_orders::MerchantOrders;
