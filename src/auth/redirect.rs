//! Helpers for redirect URLs during authentication flows.
//!
//! Redirect targets always come from the client (a query parameter, a form
//! field or an HTMX header), so they are sanitised to same-origin paths
//! before being echoed back in a Location or HX-Redirect header.

use axum::{extract::Request, http::Uri};
use tracing::{error, warn};

use crate::endpoints;

/// A redirect target is safe if it is an absolute path on this origin and
/// does not point back at the log-in page itself.
fn is_safe_redirect_target(target: &str) -> bool {
    if !target.starts_with('/') || target.starts_with("//") {
        return false;
    }

    let path = target
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(target);

    path != endpoints::LOG_IN_VIEW
}

/// Sanitise a raw redirect URL from a query parameter or form field.
///
/// Returns `None` for URLs with a scheme or authority (off-origin) and for
/// targets that fail [is_safe_redirect_target].
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_target(path_and_query).then(|| path_and_query.to_owned())
}

/// Sanitise the HX-Current-URL header value.
///
/// Unlike [normalize_redirect_url] the header carries a full URL, so the
/// scheme and authority are stripped rather than rejected.
fn normalize_hx_current_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_target(path_and_query).then(|| path_and_query.to_owned())
}

/// Build the URL of the log-in page with a `redirect_url` query parameter
/// pointing back at the page the request came from.
///
/// For `/api` routes the target is taken from the HTMX headers, since the
/// request URI of an API call is not a page the user can return to.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let redirect_target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request)?
    } else {
        redirect_target_from_request_uri(request)?
    };

    build_log_in_redirect_url_from_target(&redirect_target)
}

pub(super) fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN_VIEW, param)),
        Err(error) => {
            error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

fn redirect_target_from_request_uri(request: &Request) -> Option<String> {
    let path_and_query = request.uri().path_and_query()?.as_str();
    normalize_redirect_url(path_and_query)
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .map(|header| header.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if !hx_request {
        warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let current_url = match headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    {
        Some(value) => value,
        None => {
            warn!("Missing HX-Current-URL header for /api request.");
            return None;
        }
    };

    let redirect_url = normalize_hx_current_url(current_url);
    if redirect_url.is_none() {
        warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}

#[cfg(test)]
mod tests {
    use crate::endpoints;

    use super::{normalize_hx_current_url, normalize_redirect_url};

    #[test]
    fn accepts_same_origin_paths() {
        assert_eq!(
            normalize_redirect_url("/transactions"),
            Some("/transactions".to_owned())
        );
        assert_eq!(
            normalize_redirect_url("/reports?year=2024"),
            Some("/reports?year=2024".to_owned())
        );
    }

    #[test]
    fn rejects_off_origin_urls() {
        assert_eq!(normalize_redirect_url("https://evil.example.com/"), None);
        assert_eq!(normalize_redirect_url("//evil.example.com/"), None);
    }

    #[test]
    fn rejects_redirect_loops_to_log_in() {
        assert_eq!(normalize_redirect_url(endpoints::LOG_IN_VIEW), None);
        assert_eq!(
            normalize_redirect_url(&format!("{}?redirect_url=/dashboard", endpoints::LOG_IN_VIEW)),
            None
        );
    }

    #[test]
    fn hx_current_url_strips_origin() {
        assert_eq!(
            normalize_hx_current_url("https://flowtrack.example.com/transactions?page=2"),
            Some("/transactions?page=2".to_owned())
        );
    }
}
