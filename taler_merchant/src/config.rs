use tmg_common::Secret;

/// Connection parameters for one merchant backend instance.
///
/// The base URL may either front a single instance directly (its path ends in `/instances/{id}`) or expose the
/// multi-instance root; [`crate::MerchantApi`] resolves private paths for both layouts at call time.
#[derive(Debug, Clone, Default)]
pub struct MerchantConnection {
    pub base_url: String,
    pub instance: String,
    pub api_token: Secret<String>,
}

impl MerchantConnection {
    pub fn new<S: Into<String>, I: Into<String>>(base_url: S, instance: I, api_token: Secret<String>) -> Self {
        Self { base_url: base_url.into(), instance: instance.into(), api_token }
    }
}
