use std::future::Future;

use taler_merchant::{BackendInfo, MerchantApi, MerchantApiError};
use tmg_common::Secret;

/// The slice of the merchant backend used for one-time instance provisioning. Split from
/// [`super::MerchantOrders`] because it authenticates with the operator's password rather than an instance token.
pub trait InstanceAdmin: Clone + Send + Sync {
    /// The backend's advertised capabilities. Degrades to defaults when the backend cannot be probed.
    fn backend_info(&self, base_url: &str) -> impl Future<Output = BackendInfo> + Send;

    /// Creates a merchant instance. An already-existing instance is a success.
    fn create_instance(
        &self,
        base_url: &str,
        instance: &str,
        password: &Secret<String>,
    ) -> impl Future<Output = Result<(), MerchantApiError>> + Send;

    /// Mints a non-expiring access token of the given scope for the instance.
    fn create_token(
        &self,
        base_url: &str,
        instance: &str,
        password: &Secret<String>,
        scope: &str,
    ) -> impl Future<Output = Result<Secret<String>, MerchantApiError>> + Send;
}

impl InstanceAdmin for MerchantApi {
    async fn backend_info(&self, base_url: &str) -> BackendInfo {
        self.get_config(base_url).await
    }

    async fn create_instance(
        &self,
        base_url: &str,
        instance: &str,
        password: &Secret<String>,
    ) -> Result<(), MerchantApiError> {
        MerchantApi::create_instance(self, base_url, instance, password).await
    }

    async fn create_token(
        &self,
        base_url: &str,
        instance: &str,
        password: &Secret<String>,
        scope: &str,
    ) -> Result<Secret<String>, MerchantApiError> {
        MerchantApi::create_token(self, base_url, instance, password, scope).await
    }
}
