use std::future::Future;

use rust_decimal::Decimal;

use crate::{
    data_objects::{InvoiceId, InvoiceState, PaymentPrompt, RecordedPayment, SettlementRecord},
    errors::LedgerError,
};

/// The host's invoice and payment ledger, as consumed by this gateway.
///
/// The host owns the invoice state machine and payment persistence; the gateway only queries it and hands over
/// settlement records. Implementations must answer [`Self::recorded_payments`] from authoritative storage, not a
/// cache: that list is the sole de-duplication mechanism, and the poller may restart at any time with no memory of
/// prior sweeps.
///
/// Methods are declared as `impl Future + Send` rather than `async fn` so the settlement poller can be spawned onto
/// a multi-threaded runtime; implementations can still use `async fn`.
pub trait InvoiceLedger: Clone + Send + Sync {
    /// Lists the invoices in any of the given lifecycle states whose payment prompt for the given payment-method id
    /// is being monitored.
    fn invoices_in_states(
        &self,
        method_id: &str,
        states: &[InvoiceState],
    ) -> impl Future<Output = Result<Vec<InvoiceId>, LedgerError>> + Send;

    /// The invoice's payment prompt for the given payment-method id, if one was configured.
    fn payment_prompt(
        &self,
        invoice: &InvoiceId,
        method_id: &str,
    ) -> impl Future<Output = Result<Option<PaymentPrompt>, LedgerError>> + Send;

    /// All payments already recorded against the invoice.
    fn recorded_payments(
        &self,
        invoice: &InvoiceId,
    ) -> impl Future<Output = Result<Vec<RecordedPayment>, LedgerError>> + Send;

    /// Records a settled payment against the invoice. The settlement record doubles as the opaque payment detail
    /// blob the host stores alongside it.
    fn record_settlement(
        &self,
        invoice: &InvoiceId,
        settlement: &SettlementRecord,
    ) -> impl Future<Output = Result<(), LedgerError>> + Send;

    /// Signals the host that the invoice needs a status re-evaluation.
    fn invoice_needs_update(&self, invoice: &InvoiceId) -> impl Future<Output = ()> + Send;

    /// The invoice's computed due amount for the given payment method's prompt.
    fn due_amount(
        &self,
        invoice: &InvoiceId,
        method_id: &str,
    ) -> impl Future<Output = Result<Decimal, LedgerError>> + Send;
}
