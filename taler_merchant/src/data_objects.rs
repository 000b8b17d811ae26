use serde::{Deserialize, Serialize};
use serde_json::Value;
use tmg_common::TalerAmount;

//--------------------------------------   AssetDescriptor   ---------------------------------------------------------

/// A currency the backend knows about, as advertised by its `/config` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub code: String,
    pub name: String,
    pub divisibility: u32,
    pub symbol: String,
}

impl AssetDescriptor {
    /// Builds a descriptor from one entry of the `/config` `currencies` map. Missing fields fall back to the
    /// currency code (name, symbol) and two decimal places (divisibility).
    pub fn from_config_entry(code: &str, entry: &Value) -> Self {
        Self {
            code: code.to_string(),
            name: entry["name"].as_str().unwrap_or(code).to_string(),
            divisibility: entry["fraction"].as_u64().unwrap_or(2) as u32,
            symbol: entry["symbol"].as_str().unwrap_or(code).to_string(),
        }
    }
}

//--------------------------------------     BackendInfo     ---------------------------------------------------------

/// The subset of the backend's `/config` response this gateway cares about.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendInfo {
    pub self_provisioning: bool,
}

//--------------------------------------     OrderStatus     ---------------------------------------------------------

/// The remote state of one order, fetched fresh on every poll and never cached.
#[derive(Debug, Clone)]
pub struct OrderStatus {
    pub order_id: String,
    pub paid: bool,
    pub pay_uri: Option<String>,
    pub amount: Option<TalerAmount>,
}

impl OrderStatus {
    /// Reads an order-status response body. An order counts as paid if either the explicit `paid` boolean is true or
    /// the `order_status` string equals "paid" (case-insensitive); either signal suffices. The amount is the single
    /// `CURRENCY:VALUE` string; if it lacks a colon, both amount and currency are left unset.
    pub fn from_json(order_id: &str, body: &Value) -> Self {
        let paid = body["paid"].as_bool() == Some(true)
            || body["order_status"].as_str().map(|s| s.eq_ignore_ascii_case("paid")).unwrap_or(false);
        let pay_uri = body["taler_pay_uri"].as_str().map(String::from);
        let amount = body["amount"].as_str().and_then(|s| s.parse::<TalerAmount>().ok());
        Self { order_id: order_id.to_string(), paid, pay_uri, amount }
    }
}

//--------------------------------------     WireAccount     ---------------------------------------------------------

/// A payto-URI wire account registered on an instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireAccount {
    pub payto_uri: String,
    #[serde(default)]
    pub h_wire: Option<String>,
    #[serde(default)]
    pub active: bool,
}
