use std::{env, time::Duration};

use log::*;
use taler_merchant::MerchantConnection;
use tmg_common::Secret;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);
pub const DEFAULT_INSTANCE: &str = "default";
const DEFAULT_DIVISIBILITY: u32 = 2;

/// The immutable configuration for one enabled asset. One of these exists per asset for the process lifetime;
/// changing credentials or URLs requires a restart, so provisioning and polling can never disagree about them.
#[derive(Debug, Clone, Default)]
pub struct AssetConfig {
    pub asset_code: String,
    pub display_name: String,
    /// Number of decimal places the asset is divisible to. Due amounts are rounded to this scale.
    pub divisibility: u32,
    pub symbol: String,
    pub merchant: MerchantConnection,
    /// Public-facing merchant endpoint checkout pay URIs are rebased onto, when it differs from the backend's
    /// internally reachable base URL.
    pub public_base_url: Option<String>,
}

impl AssetConfig {
    /// The payment-method id this asset is registered under with the host.
    pub fn method_id(&self) -> String {
        format!("{}-Taler", self.asset_code)
    }

    /// Reads one asset's configuration from `TMG_TALER_{CODE}_*` environment variables.
    pub fn from_env_or_default(code: &str) -> Self {
        let code = code.trim().to_uppercase();
        let var = |suffix: &str| env::var(format!("TMG_TALER_{code}_{suffix}")).ok();
        let base_url = var("MERCHANT_URL").unwrap_or_else(|| {
            error!(
                "🪛️ TMG_TALER_{code}_MERCHANT_URL is not set. The {code} payment method will be unavailable until \
                 it is configured."
            );
            String::default()
        });
        let instance = var("INSTANCE").filter(|s| !s.trim().is_empty()).unwrap_or_else(|| {
            debug!("🪛️ TMG_TALER_{code}_INSTANCE not set, using '{DEFAULT_INSTANCE}'");
            DEFAULT_INSTANCE.to_string()
        });
        let api_token = Secret::new(var("API_TOKEN").unwrap_or_else(|| {
            warn!("🪛️ TMG_TALER_{code}_API_TOKEN is not set. Private backend calls will be rejected with 401.");
            String::default()
        }));
        let public_base_url = var("PUBLIC_URL").filter(|s| !s.trim().is_empty());
        let divisibility = var("DIVISIBILITY")
            .map(|s| {
                s.parse::<u32>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ '{s}' is not a valid value for TMG_TALER_{code}_DIVISIBILITY. {e}. Using \
                         {DEFAULT_DIVISIBILITY} instead."
                    );
                    DEFAULT_DIVISIBILITY
                })
            })
            .unwrap_or(DEFAULT_DIVISIBILITY);
        let display_name = var("NAME").filter(|s| !s.trim().is_empty()).unwrap_or_else(|| code.clone());
        let symbol = var("SYMBOL").filter(|s| !s.trim().is_empty()).unwrap_or_else(|| code.clone());
        Self {
            asset_code: code,
            display_name,
            divisibility,
            symbol,
            merchant: MerchantConnection::new(base_url, instance, api_token),
            public_base_url,
        }
    }
}

/// The gateway's startup snapshot: the enabled assets and the settlement poll interval.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub assets: Vec<AssetConfig>,
    pub poll_interval: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { assets: Vec::new(), poll_interval: DEFAULT_POLL_INTERVAL }
    }
}

impl GatewayConfig {
    /// Builds the configuration snapshot from the environment. `TMG_TALER_ASSETS` is a comma-separated list of
    /// asset codes; each code is expanded via [`AssetConfig::from_env_or_default`]. With no assets configured the
    /// gateway is a no-op for the process lifetime.
    pub fn from_env_or_default() -> Self {
        let assets = match env::var("TMG_TALER_ASSETS") {
            Ok(list) => list
                .split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(AssetConfig::from_env_or_default)
                .collect(),
            Err(_) => {
                info!("🪛️ TMG_TALER_ASSETS is not set. No Taler payment methods will be offered.");
                Vec::new()
            },
        };
        let poll_interval = env::var("TMG_TALER_POLL_INTERVAL_SECS")
            .ok()
            .map(|s| {
                s.parse::<u64>().map(Duration::from_secs).unwrap_or_else(|e| {
                    error!(
                        "🪛️ '{s}' is not a valid value for TMG_TALER_POLL_INTERVAL_SECS. {e}. Using the default of \
                         {}s instead.",
                        DEFAULT_POLL_INTERVAL.as_secs()
                    );
                    DEFAULT_POLL_INTERVAL
                })
            })
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        Self { assets, poll_interval }
    }

    pub fn asset(&self, code: &str) -> Option<&AssetConfig> {
        self.assets.iter().find(|a| a.asset_code == code)
    }
}
