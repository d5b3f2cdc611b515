//! Origin Resolver for Pagefreeze.
//!
//! Derives the canonical `scheme://host[:port]` origin of a navigated URL by
//! structural parsing. Path, query and fragment never influence the result,
//! and default ports are elided (`https://a.com:443` == `https://a.com`).

use url::Url;

use crate::types::errors::OriginError;
use crate::types::origin::Origin;

/// Resolves the origin of `url`.
///
/// # Errors
/// - [`OriginError::InvalidUrl`] if `url` cannot be parsed.
/// - [`OriginError::OpaqueOrigin`] for URLs without a tuple origin
///   (`about:blank`, `data:`, `javascript:`, ...). Such pages have no stable
///   identity to key a preference on.
pub fn resolve(url: &str) -> Result<Origin, OriginError> {
    let parsed = Url::parse(url.trim()).map_err(|e| OriginError::InvalidUrl(format!("{}: {}", url, e)))?;
    let origin = parsed.origin();
    if !origin.is_tuple() {
        return Err(OriginError::OpaqueOrigin(url.to_string()));
    }
    Ok(Origin::from_serialized(origin.ascii_serialization()))
}

/// Resolves the origin of `url`, logging and discarding failures.
///
/// Callers treat `None` as "cannot determine freeze applicability".
pub fn resolve_or_log(url: &str) -> Option<Origin> {
    match resolve(url) {
        Ok(origin) => Some(origin),
        Err(e) => {
            tracing::debug!(error = %e, "origin could not be resolved");
            None
        }
    }
}
