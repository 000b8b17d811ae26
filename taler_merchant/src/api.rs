use std::sync::Arc;

use log::*;
use reqwest::{header::AUTHORIZATION, Client, Method, StatusCode};
use serde_json::{json, Value};
use tmg_common::{Secret, TalerAmount};

use crate::{
    config::MerchantConnection,
    data_objects::{AssetDescriptor, BackendInfo, OrderStatus, WireAccount},
    paths::candidate_private_urls,
    MerchantApiError,
};

// Instance-creation defaults. The backend interprets these as microsecond durations.
const DEFAULT_PAY_DELAY_US: i64 = 15 * 60 * 1_000_000;
const DEFAULT_REFUND_DELAY_US: i64 = 7 * 24 * 60 * 60 * 1_000_000;
const DEFAULT_WIRE_TRANSFER_DELAY_US: i64 = 60 * 60 * 1_000_000;

/// Stateless client for the merchant backend's REST API.
///
/// Every method takes the target base URL (or a [`MerchantConnection`]) explicitly, so one client instance serves
/// all configured assets. Private calls carry a bearer token; calls against instance-private paths transparently
/// retry the alternate URL layout when the first candidate 404s.
#[derive(Clone)]
pub struct MerchantApi {
    client: Arc<Client>,
}

enum AuthScheme<'a> {
    None,
    Bearer(&'a Secret<String>),
    Basic { user: &'a str, password: &'a Secret<String> },
}

impl MerchantApi {
    pub fn new() -> Result<Self, MerchantApiError> {
        let client = Client::builder().build().map_err(|e| MerchantApiError::Initialization(e.to_string()))?;
        Ok(Self { client: Arc::new(client) })
    }

    async fn request(
        &self,
        operation: &'static str,
        method: Method,
        url: &str,
        auth: &AuthScheme<'_>,
        body: Option<&Value>,
    ) -> Result<Value, MerchantApiError> {
        trace!("🛒️ {operation}: {method} {url}");
        let mut req = self.client.request(method, url);
        match auth {
            AuthScheme::None => {},
            AuthScheme::Bearer(token) => {
                if let Some(value) = bearer_header_value(token.reveal()) {
                    req = req.header(AUTHORIZATION, value);
                }
            },
            AuthScheme::Basic { user, password } => {
                req = req.basic_auth(user, Some(password.reveal().as_str()));
            },
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let response = req.send().await.map_err(|e| MerchantApiError::RequestError(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(Value::Null);
            }
            let text = response.text().await.map_err(|e| MerchantApiError::RequestError(e.to_string()))?;
            if text.trim().is_empty() {
                Ok(Value::Null)
            } else {
                serde_json::from_str(&text).map_err(|e| MerchantApiError::JsonError(e.to_string()))
            }
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(MerchantApiError::query_error(operation, status.as_u16(), url, &text))
        }
    }

    /// Runtime capability probe: try the primary URL, and on 404 retry the alternate layout. Any other rejection is
    /// definitive and is returned as-is.
    async fn request_with_fallback(
        &self,
        operation: &'static str,
        method: Method,
        primary: &str,
        alternate: &str,
        auth: &AuthScheme<'_>,
        body: Option<&Value>,
    ) -> Result<Value, MerchantApiError> {
        match self.request(operation, method.clone(), primary, auth, body).await {
            Err(e) if e.status() == Some(404) && primary != alternate => {
                debug!("🛒️ {operation}: {primary} not found, retrying the alternate path layout");
                self.request(operation, method, alternate, auth, body).await
            },
            other => other,
        }
    }

    /// Discovers the currencies the backend is configured for. Discovery failures are logged and degrade to an
    /// empty list; they must never take checkout down.
    pub async fn get_currencies(&self, base_url: &str) -> Vec<AssetDescriptor> {
        let url = config_url(base_url);
        match self.request("get_currencies", Method::GET, &url, &AuthScheme::None, None).await {
            Ok(body) => body["currencies"]
                .as_object()
                .map(|map| map.iter().map(|(code, entry)| AssetDescriptor::from_config_entry(code, entry)).collect())
                .unwrap_or_default(),
            Err(e) => {
                warn!("🛒️ Could not discover currencies at {url}: {e}");
                Vec::new()
            },
        }
    }

    /// Probes the backend's `/config` endpoint. Degrades to defaults (no self-provisioning) on any failure.
    pub async fn get_config(&self, base_url: &str) -> BackendInfo {
        let url = config_url(base_url);
        match self.request("get_config", Method::GET, &url, &AuthScheme::None, None).await {
            Ok(body) => BackendInfo { self_provisioning: body["have_self_provisioning"].as_bool().unwrap_or(false) },
            Err(e) => {
                warn!("🛒️ Could not probe backend config at {url}: {e}");
                BackendInfo::default()
            },
        }
    }

    /// Creates a merchant instance with token auth and the default delay constants. A 409 on either the management
    /// path or the legacy path means the instance already exists and is treated as success.
    pub async fn create_instance(
        &self,
        base_url: &str,
        instance: &str,
        password: &Secret<String>,
    ) -> Result<(), MerchantApiError> {
        let base = base_url.trim_end_matches('/');
        let primary = format!("{base}/management/instances");
        let legacy = format!("{base}/instances");
        let payload = instance_payload(instance, password);
        let result = self
            .request_with_fallback("create_instance", Method::POST, &primary, &legacy, &AuthScheme::None, Some(&payload))
            .await;
        match result {
            Ok(_) => {
                info!("🛒️ Created merchant instance '{instance}'");
                Ok(())
            },
            Err(e) if e.status() == Some(409) => {
                debug!("🛒️ Merchant instance '{instance}' already exists. Nothing to do.");
                Ok(())
            },
            Err(e) => Err(e),
        }
    }

    /// Mints a non-expiring, non-refreshable access token of the given scope, authenticating with Basic auth as
    /// `{instance}:{password}`.
    pub async fn create_token(
        &self,
        base_url: &str,
        instance: &str,
        password: &Secret<String>,
        scope: &str,
    ) -> Result<Secret<String>, MerchantApiError> {
        let [primary, alternate] = candidate_private_urls(base_url, instance, "token")?;
        let body = json!({ "scope": scope, "duration": { "d_us": "forever" }, "refreshable": false });
        let auth = AuthScheme::Basic { user: instance, password };
        let response =
            self.request_with_fallback("create_token", Method::POST, &primary, &alternate, &auth, Some(&body)).await?;
        match response["access_token"].as_str() {
            Some(token) => {
                info!("🛒️ Minted a '{scope}' access token for instance '{instance}'");
                Ok(Secret::from(token))
            },
            None => Err(MerchantApiError::MissingField("create_token", "access_token")),
        }
    }

    /// Creates a remote order and returns the backend's echoed order id, falling back to the caller-supplied id if
    /// none is echoed.
    pub async fn create_order(
        &self,
        conn: &MerchantConnection,
        order_id: &str,
        summary: &str,
        amount: &TalerAmount,
    ) -> Result<String, MerchantApiError> {
        let [primary, alternate] = candidate_private_urls(&conn.base_url, &conn.instance, "orders")?;
        let body = json!({ "order": { "order_id": order_id, "summary": summary, "amount": amount.to_string() } });
        let auth = AuthScheme::Bearer(&conn.api_token);
        let response =
            self.request_with_fallback("create_order", Method::POST, &primary, &alternate, &auth, Some(&body)).await?;
        let confirmed = response["order_id"].as_str().unwrap_or(order_id).to_string();
        info!("🛒️ Created order {confirmed} over {amount}");
        Ok(confirmed)
    }

    /// Fetches the remote state of one order. The result is transient and must not be cached.
    pub async fn get_order_status(
        &self,
        conn: &MerchantConnection,
        order_id: &str,
    ) -> Result<OrderStatus, MerchantApiError> {
        let op = format!("orders/{order_id}");
        let [primary, alternate] = candidate_private_urls(&conn.base_url, &conn.instance, &op)?;
        let auth = AuthScheme::Bearer(&conn.api_token);
        let response =
            self.request_with_fallback("get_order_status", Method::GET, &primary, &alternate, &auth, None).await?;
        let status = OrderStatus::from_json(order_id, &response);
        debug!("🛒️ Order {order_id} is {}", if status.paid { "paid" } else { "not paid yet" });
        Ok(status)
    }

    /// Lists the payto wire accounts registered on the instance.
    pub async fn get_bank_accounts(&self, conn: &MerchantConnection) -> Result<Vec<WireAccount>, MerchantApiError> {
        let [primary, alternate] = candidate_private_urls(&conn.base_url, &conn.instance, "accounts")?;
        let auth = AuthScheme::Bearer(&conn.api_token);
        let response =
            self.request_with_fallback("get_bank_accounts", Method::GET, &primary, &alternate, &auth, None).await?;
        serde_json::from_value(response["accounts"].clone()).map_err(|e| MerchantApiError::JsonError(e.to_string()))
    }

    /// Registers a payto wire account on the instance.
    pub async fn add_bank_account(
        &self,
        conn: &MerchantConnection,
        payto_uri: &str,
    ) -> Result<(), MerchantApiError> {
        let [primary, alternate] = candidate_private_urls(&conn.base_url, &conn.instance, "accounts")?;
        let body = json!({ "payto_uri": payto_uri });
        let auth = AuthScheme::Bearer(&conn.api_token);
        self.request_with_fallback("add_bank_account", Method::POST, &primary, &alternate, &auth, Some(&body)).await?;
        info!("🛒️ Added wire account to instance '{}'", conn.instance);
        Ok(())
    }

    /// Removes a wire account from the instance, identified by its wire hash.
    pub async fn delete_bank_account(
        &self,
        conn: &MerchantConnection,
        h_wire: &str,
    ) -> Result<(), MerchantApiError> {
        let op = format!("accounts/{h_wire}");
        let [primary, alternate] = candidate_private_urls(&conn.base_url, &conn.instance, &op)?;
        let auth = AuthScheme::Bearer(&conn.api_token);
        self.request_with_fallback("delete_bank_account", Method::DELETE, &primary, &alternate, &auth, None).await?;
        info!("🛒️ Removed wire account {h_wire} from instance '{}'", conn.instance);
        Ok(())
    }
}

fn config_url(base_url: &str) -> String {
    format!("{}/config", base_url.trim_end_matches('/'))
}

/// Formats the `Authorization` header for a private call. Pre-formed header values (already starting with
/// `Bearer `) pass through unchanged; blank tokens yield no header at all, surfacing as a backend 401.
fn bearer_header_value(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        None
    } else if token.starts_with("Bearer ") {
        Some(token.to_string())
    } else {
        Some(format!("Bearer {token}"))
    }
}

fn instance_payload(instance: &str, password: &Secret<String>) -> Value {
    json!({
        "id": instance,
        "name": instance,
        "auth": { "method": "token", "token": format!("secret-token:{}", password.reveal()) },
        "address": {},
        // Placeholder jurisdiction; operators refine this through the backend's own admin surface.
        "jurisdiction": {},
        "use_stefan": true,
        "default_wire_fee_amortization": 1,
        "default_pay_delay": { "d_us": DEFAULT_PAY_DELAY_US },
        "default_refund_delay": { "d_us": DEFAULT_REFUND_DELAY_US },
        "default_wire_transfer_delay": { "d_us": DEFAULT_WIRE_TRANSFER_DELAY_US },
    })
}
