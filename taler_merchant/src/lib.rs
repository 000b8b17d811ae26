//! Typed access to a GNU Taler merchant backend.
//!
//! The backend owns orders, instances and wire accounts; this crate only translates typed operations into
//! authenticated HTTP calls against it, and normalizes the pay URIs it reports into wallet-openable `taler://`
//! URIs. It holds no state beyond a shared HTTP client, so a single [`MerchantApi`] can serve any number of
//! configured assets and instances.

mod api;
mod config;
mod error;
mod paths;
mod pay_uri;

mod data_objects;

pub use api::MerchantApi;
pub use config::MerchantConnection;
pub use data_objects::{AssetDescriptor, BackendInfo, OrderStatus, WireAccount};
pub use error::MerchantApiError;
pub use pay_uri::{normalize_to_wallet_pay_uri, rewrite_public_pay_uri};
