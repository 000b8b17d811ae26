//! In-memory fakes for the gateway's trait seams.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use rust_decimal::Decimal;
use serde_json::Value;
use taler_merchant::{BackendInfo, MerchantApiError, MerchantConnection, OrderStatus};
use tmg_common::{Secret, TalerAmount};

use crate::{
    data_objects::{InvoiceId, InvoiceState, PaymentPrompt, RecordedPayment, SettlementRecord},
    errors::LedgerError,
    traits::{InstanceAdmin, InvoiceLedger, MerchantOrders},
};

//--------------------------------------     MemoryLedger    ---------------------------------------------------------

#[derive(Debug)]
struct InvoiceRecord {
    state: InvoiceState,
    method_id: String,
    due: Decimal,
    prompt: Option<PaymentPrompt>,
    payments: Vec<RecordedPayment>,
    update_signals: u32,
}

/// An in-memory stand-in for the host's invoice/payment ledger.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    invoices: Arc<Mutex<HashMap<String, InvoiceRecord>>>,
}

impl MemoryLedger {
    pub fn add_invoice(&self, id: &str, state: InvoiceState, method_id: &str, due: Decimal) {
        let record = InvoiceRecord {
            state,
            method_id: method_id.to_string(),
            due,
            prompt: None,
            payments: Vec::new(),
            update_signals: 0,
        };
        self.invoices.lock().unwrap().insert(id.to_string(), record);
    }

    pub fn attach_prompt(&self, id: &str, detail: Value) {
        if let Some(record) = self.invoices.lock().unwrap().get_mut(id) {
            record.prompt = Some(PaymentPrompt { activated: true, detail });
        }
    }

    pub fn deactivate_prompt(&self, id: &str) {
        if let Some(record) = self.invoices.lock().unwrap().get_mut(id) {
            if let Some(prompt) = record.prompt.as_mut() {
                prompt.activated = false;
            }
        }
    }

    pub fn record_payment(&self, id: &str, order_id: &str, amount: Decimal, currency: &str) {
        if let Some(record) = self.invoices.lock().unwrap().get_mut(id) {
            record.payments.push(RecordedPayment {
                id: order_id.to_string(),
                amount,
                currency: currency.to_string(),
            });
        }
    }

    pub fn payments(&self, id: &str) -> Vec<RecordedPayment> {
        self.invoices.lock().unwrap().get(id).map(|r| r.payments.clone()).unwrap_or_default()
    }

    pub fn update_signals(&self, id: &str) -> u32 {
        self.invoices.lock().unwrap().get(id).map(|r| r.update_signals).unwrap_or_default()
    }
}

impl InvoiceLedger for MemoryLedger {
    async fn invoices_in_states(
        &self,
        method_id: &str,
        states: &[InvoiceState],
    ) -> Result<Vec<InvoiceId>, LedgerError> {
        let invoices = self.invoices.lock().unwrap();
        let mut ids: Vec<InvoiceId> = invoices
            .iter()
            .filter(|(_, r)| r.method_id == method_id && states.contains(&r.state))
            .map(|(id, _)| InvoiceId(id.clone()))
            .collect();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(ids)
    }

    async fn payment_prompt(
        &self,
        invoice: &InvoiceId,
        method_id: &str,
    ) -> Result<Option<PaymentPrompt>, LedgerError> {
        let invoices = self.invoices.lock().unwrap();
        let record = invoices.get(&invoice.0).ok_or_else(|| LedgerError::new(format!("no invoice {invoice}")))?;
        if record.method_id != method_id {
            return Ok(None);
        }
        Ok(record.prompt.clone())
    }

    async fn recorded_payments(&self, invoice: &InvoiceId) -> Result<Vec<RecordedPayment>, LedgerError> {
        Ok(self.payments(&invoice.0))
    }

    async fn record_settlement(&self, invoice: &InvoiceId, settlement: &SettlementRecord) -> Result<(), LedgerError> {
        let mut invoices = self.invoices.lock().unwrap();
        let record =
            invoices.get_mut(&invoice.0).ok_or_else(|| LedgerError::new(format!("no invoice {invoice}")))?;
        record.payments.push(RecordedPayment {
            id: settlement.order_id.clone(),
            amount: settlement.amount,
            currency: settlement.asset_code.clone(),
        });
        Ok(())
    }

    async fn invoice_needs_update(&self, invoice: &InvoiceId) {
        if let Some(record) = self.invoices.lock().unwrap().get_mut(&invoice.0) {
            record.update_signals += 1;
        }
    }

    async fn due_amount(&self, invoice: &InvoiceId, _method_id: &str) -> Result<Decimal, LedgerError> {
        let invoices = self.invoices.lock().unwrap();
        invoices.get(&invoice.0).map(|r| r.due).ok_or_else(|| LedgerError::new(format!("no invoice {invoice}")))
    }
}

//--------------------------------------   ScriptedMerchant  ---------------------------------------------------------

#[derive(Default)]
struct MerchantScript {
    orders: HashMap<String, OrderStatus>,
    created: Vec<(String, String, TalerAmount)>,
    create_error: Option<(u16, Option<u32>, String)>,
    status_failures: Vec<String>,
    suppress_pay_uris: bool,
}

/// A scriptable stand-in for the merchant backend's order API.
#[derive(Clone, Default)]
pub struct ScriptedMerchant {
    script: Arc<Mutex<MerchantScript>>,
}

impl ScriptedMerchant {
    /// Makes the next `create_order` calls fail with the given HTTP status and backend error code.
    pub fn fail_create(&self, status: u16, code: Option<u32>, message: &str) {
        self.script.lock().unwrap().create_error = Some((status, code, message.to_string()));
    }

    /// Makes status polls for the given order fail with a transport error.
    pub fn fail_status_for(&self, order_id: &str) {
        self.script.lock().unwrap().status_failures.push(order_id.to_string());
    }

    /// Created orders report no pay URI, mimicking a misbehaving backend.
    pub fn suppress_pay_uris(&self) {
        self.script.lock().unwrap().suppress_pay_uris = true;
    }

    pub fn set_paid(&self, order_id: &str, paid: bool) {
        if let Some(status) = self.script.lock().unwrap().orders.get_mut(order_id) {
            status.paid = paid;
        }
    }

    /// Every order created so far, as `(order_id, summary, amount)`.
    pub fn created_orders(&self) -> Vec<(String, String, TalerAmount)> {
        self.script.lock().unwrap().created.clone()
    }
}

impl MerchantOrders for ScriptedMerchant {
    async fn create_order(
        &self,
        conn: &MerchantConnection,
        order_id: &str,
        summary: &str,
        amount: &TalerAmount,
    ) -> Result<String, MerchantApiError> {
        let mut script = self.script.lock().unwrap();
        if let Some((status, code, message)) = script.create_error.clone() {
            return Err(MerchantApiError::QueryError {
                operation: "create_order",
                status,
                uri: format!("{}/private/orders", conn.base_url),
                code,
                message,
            });
        }
        let pay_uri = if script.suppress_pay_uris {
            None
        } else {
            Some(format!("taler+http://merchant/instances/{}/pay?oid={order_id}", conn.instance))
        };
        let status = OrderStatus { order_id: order_id.to_string(), paid: false, pay_uri, amount: Some(amount.clone()) };
        script.orders.insert(order_id.to_string(), status);
        script.created.push((order_id.to_string(), summary.to_string(), amount.clone()));
        Ok(order_id.to_string())
    }

    async fn order_status(&self, conn: &MerchantConnection, order_id: &str) -> Result<OrderStatus, MerchantApiError> {
        let script = self.script.lock().unwrap();
        if script.status_failures.iter().any(|id| id == order_id) {
            return Err(MerchantApiError::RequestError("scripted backend outage".to_string()));
        }
        script.orders.get(order_id).cloned().ok_or_else(|| MerchantApiError::QueryError {
            operation: "get_order_status",
            status: 404,
            uri: format!("{}/private/orders/{order_id}", conn.base_url),
            code: Some(2000),
            message: "unknown order".to_string(),
        })
    }
}

//--------------------------------------    ScriptedAdmin    ---------------------------------------------------------

#[derive(Default)]
struct AdminScript {
    self_provisioning: bool,
    created: Vec<String>,
    minted: Vec<(String, String)>,
    create_error: Option<(u16, String)>,
}

/// A scriptable stand-in for the merchant backend's provisioning surface.
#[derive(Clone, Default)]
pub struct ScriptedAdmin {
    script: Arc<Mutex<AdminScript>>,
}

impl ScriptedAdmin {
    pub fn allow_self_provisioning(&self) {
        self.script.lock().unwrap().self_provisioning = true;
    }

    /// Makes the next `create_instance` calls fail with the given HTTP status.
    pub fn fail_create(&self, status: u16, message: &str) {
        self.script.lock().unwrap().create_error = Some((status, message.to_string()));
    }

    pub fn created_instances(&self) -> Vec<String> {
        self.script.lock().unwrap().created.clone()
    }

    /// Every token minted so far, as `(instance, scope)`.
    pub fn minted_tokens(&self) -> Vec<(String, String)> {
        self.script.lock().unwrap().minted.clone()
    }
}

impl InstanceAdmin for ScriptedAdmin {
    async fn backend_info(&self, _base_url: &str) -> BackendInfo {
        BackendInfo { self_provisioning: self.script.lock().unwrap().self_provisioning }
    }

    async fn create_instance(
        &self,
        base_url: &str,
        instance: &str,
        _password: &Secret<String>,
    ) -> Result<(), MerchantApiError> {
        let mut script = self.script.lock().unwrap();
        if let Some((status, message)) = script.create_error.clone() {
            return Err(MerchantApiError::QueryError {
                operation: "create_instance",
                status,
                uri: format!("{base_url}/management/instances"),
                code: None,
                message,
            });
        }
        script.created.push(instance.to_string());
        Ok(())
    }

    async fn create_token(
        &self,
        _base_url: &str,
        instance: &str,
        _password: &Secret<String>,
        scope: &str,
    ) -> Result<Secret<String>, MerchantApiError> {
        self.script.lock().unwrap().minted.push((instance.to_string(), scope.to_string()));
        Ok(Secret::from(format!("tok-{instance}")))
    }
}
