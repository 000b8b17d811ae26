use url::Url;

use crate::MerchantApiError;

/// True if the base URL fronts a single merchant instance directly, i.e. the second-to-last path segment is
/// literally `instances` (e.g. `https://h/instances/default`).
fn is_instance_scoped(base: &Url) -> bool {
    let segments: Vec<&str> =
        base.path_segments().map(|s| s.filter(|p| !p.is_empty()).collect()).unwrap_or_default();
    segments.len() >= 2 && segments[segments.len() - 2] == "instances"
}

/// Resolves the two candidate private URLs for an operation, in priority order.
///
/// Instance-scoped bases build `{base}/private/{op}` first; multi-instance roots build
/// `{base}/instances/{instance}/private/{op}` first. The second candidate is always the other layout rooted at the
/// same host, so deployments that front a single instance and deployments exposing the multi-instance root are both
/// handled with a single fallback probe.
pub(crate) fn candidate_private_urls(
    base_url: &str,
    instance: &str,
    op: &str,
) -> Result<[String; 2], MerchantApiError> {
    let url = Url::parse(base_url)
        .map_err(|e| MerchantApiError::InvalidBaseUrl(base_url.to_string(), e.to_string()))?;
    let base = base_url.trim_end_matches('/');
    if is_instance_scoped(&url) {
        let origin = url.origin().ascii_serialization();
        Ok([format!("{base}/private/{op}"), format!("{origin}/instances/{instance}/private/{op}")])
    } else {
        Ok([format!("{base}/instances/{instance}/private/{op}"), format!("{base}/private/{op}")])
    }
}
