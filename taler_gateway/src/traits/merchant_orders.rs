use std::future::Future;

use taler_merchant::{MerchantApi, MerchantApiError, MerchantConnection, OrderStatus};
use tmg_common::TalerAmount;

/// The slice of the merchant backend the gateway's order flow needs: order creation and status reads.
/// [`MerchantApi`] implements it over HTTP; tests script it in memory. Futures are `Send` so callers can drive
/// the order flow from a spawned task.
pub trait MerchantOrders: Clone + Send + Sync {
    /// Creates a remote order and returns the backend's confirmed order id.
    fn create_order(
        &self,
        conn: &MerchantConnection,
        order_id: &str,
        summary: &str,
        amount: &TalerAmount,
    ) -> impl Future<Output = Result<String, MerchantApiError>> + Send;

    /// Fetches the current remote state of an order. Never cached.
    fn order_status(
        &self,
        conn: &MerchantConnection,
        order_id: &str,
    ) -> impl Future<Output = Result<OrderStatus, MerchantApiError>> + Send;
}

impl MerchantOrders for MerchantApi {
    async fn create_order(
        &self,
        conn: &MerchantConnection,
        order_id: &str,
        summary: &str,
        amount: &TalerAmount,
    ) -> Result<String, MerchantApiError> {
        MerchantApi::create_order(self, conn, order_id, summary, amount).await
    }

    async fn order_status(&self, conn: &MerchantConnection, order_id: &str) -> Result<OrderStatus, MerchantApiError> {
        self.get_order_status(conn, order_id).await
    }
}
