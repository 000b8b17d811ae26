use taler_merchant::MerchantApiError;
use thiserror::Error;

/// An error reported by the host's invoice/payment ledger.
#[derive(Debug, Clone, Error)]
#[error("Invoice ledger error: {0}")]
pub struct LedgerError(pub String);

impl LedgerError {
    pub fn new<S: Into<String>>(msg: S) -> Self {
        Self(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Taler payment method is not configured: {0}")]
    ConfigurationMissing(String),
    #[error(
        "Merchant instance '{0}' has not been initialized. Create the instance on the merchant backend (or run \
         instance provisioning) before accepting payments."
    )]
    InstanceNotInitialized(String),
    #[error(
        "Merchant instance '{0}' has no active bank account. Add a payto wire account before accepting payments."
    )]
    NoActiveBankAccount(String),
    #[error(
        "The exchange is refusing payments due to legal or KYC limits. This must be resolved with the exchange \
         operator and is not retried automatically."
    )]
    KycRestricted,
    #[error("The merchant backend returned no pay URI for freshly created order {0}")]
    MissingPayUri(String),
    #[error("Could not parse the stored payment detail: {0}")]
    InvalidDetail(String),
    #[error("{0}")]
    Ledger(#[from] LedgerError),
    #[error("Taler payment method is unavailable: {0}")]
    Unavailable(#[from] MerchantApiError),
}

/// Maps known backend error codes onto actionable operator guidance. The structured `code` field is preferred;
/// substring matching against the error body is only a fallback for non-JSON bodies. 2513 (legal/KYC limit) is
/// checked before the 2500 class so it is never misreported as a missing bank account.
pub(crate) fn map_backend_error(instance: &str, e: MerchantApiError) -> GatewayError {
    match e.backend_code() {
        Some(2513) => GatewayError::KycRestricted,
        Some(code) if (2000..2100).contains(&code) => GatewayError::InstanceNotInitialized(instance.to_string()),
        Some(code) if (2500..2600).contains(&code) => GatewayError::NoActiveBankAccount(instance.to_string()),
        None if e.mentions("merchant instance") => GatewayError::InstanceNotInitialized(instance.to_string()),
        _ => GatewayError::Unavailable(e),
    }
}
