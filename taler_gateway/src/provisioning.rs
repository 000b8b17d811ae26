use log::*;
use tmg_common::Secret;

use crate::{config::DEFAULT_INSTANCE, errors::GatewayError, traits::InstanceAdmin};

/// Self-provisions a merchant instance for an operator: verifies the backend allows self-provisioning, creates the
/// instance (an already-existing instance is a no-op), and mints a non-expiring `readwrite` access token for it.
///
/// The returned token is what operators put into the asset's API-token configuration. This is a one-time setup
/// step; the running gateway only ever uses the configured token snapshot.
pub async fn provision_instance<A: InstanceAdmin>(
    api: &A,
    base_url: &str,
    instance: &str,
    password: &Secret<String>,
) -> Result<Secret<String>, GatewayError> {
    if base_url.trim().is_empty() {
        return Err(GatewayError::ConfigurationMissing("no merchant base URL configured".to_string()));
    }
    let instance = if instance.trim().is_empty() { DEFAULT_INSTANCE } else { instance };
    let info = api.backend_info(base_url).await;
    if !info.self_provisioning {
        return Err(GatewayError::ConfigurationMissing(format!(
            "the merchant backend at {base_url} does not allow self-provisioning; ask its operator to create \
             instance '{instance}'"
        )));
    }
    api.create_instance(base_url, instance, password).await?;
    let token = api.create_token(base_url, instance, password, "readwrite").await?;
    info!("🪙️ Instance '{instance}' provisioned at {base_url}");
    Ok(token)
}
