//! Outcome of a single origin policy evaluation.

use axum::http::{header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderMap, HeaderValue};

/// What to do with `Access-Control-Allow-Origin` for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Leave the header alone (filter inert or not a cross-origin request).
    Skip,
    /// Echo the request's origin verbatim.
    Allow(HeaderValue),
    /// Set the header to an empty value.
    Deny,
}

impl Decision {
    /// Write or override the allow-origin header on `headers`.
    pub fn apply(&self, headers: &mut HeaderMap) {
        match self {
            Decision::Skip => {}
            Decision::Allow(origin) => {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            }
            Decision::Deny => {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(""));
            }
        }
    }

    /// Stable label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Decision::Skip => "skipped",
            Decision::Allow(_) => "allowed",
            Decision::Deny => "denied",
        }
    }

    /// Header value this decision writes, if any.
    pub fn header_value(&self) -> Option<&str> {
        match self {
            Decision::Skip => None,
            Decision::Allow(origin) => origin.to_str().ok(),
            Decision::Deny => Some(""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides_existing_header() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

        Decision::Allow(HeaderValue::from_static("http://a.com")).apply(&mut headers);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "http://a.com");

        Decision::Deny.apply(&mut headers);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "");
        assert_eq!(headers.get_all(ACCESS_CONTROL_ALLOW_ORIGIN).iter().count(), 1);
    }

    #[test]
    fn test_skip_leaves_headers_untouched() {
        let mut headers = HeaderMap::new();
        Decision::Skip.apply(&mut headers);
        assert!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
