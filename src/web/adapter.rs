//! Request adapter and `http` crate bindings.

use std::borrow::Cow;
use std::collections::HashMap;

use http::header::{HeaderName, HeaderValue, HOST, LOCATION};
use http::uri::Scheme;
use http::{Request, Response, StatusCode};

use crate::config::RedirectStatus;
use crate::error::Error;
use crate::filter::Redirect;

use super::{PolicyResponse, TransportSignals};

/// Request extension recording whether the connection was made over TLS.
///
/// A TLS acceptor inserts this into each request's extensions. Requests
/// without it fall back to the scheme of the request URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecureConnection(pub bool);

/// Framework-neutral view of an inbound request.
///
/// `RequestAdapter` owns the few signals the filter reads: the full URL, the
/// transport security flag and the request headers. Framework integrations
/// build one from their own request type; `From<&http::Request<B>>` is
/// provided.
///
/// # Examples
///
/// ```
/// use secure_transport::web::{RequestAdapter, TransportSignals};
///
/// let mut adapter = RequestAdapter::new("http://example.com/");
/// adapter.add_header("X-Forwarded-Proto", "https");
///
/// assert!(!adapter.is_secure());
/// assert_eq!(adapter.header("x-forwarded-proto"), Some("https"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    /// Full request URL
    url: String,
    /// Transport-level TLS flag
    secure: bool,
    /// Request headers keyed by lowercase name (first value wins)
    headers: HashMap<String, String>,
}

impl RequestAdapter {
    /// Creates an adapter for a non-TLS request with no headers.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            secure: false,
            headers: HashMap::new(),
        }
    }

    /// Sets the transport-level TLS flag.
    pub fn set_secure(&mut self, secure: bool) {
        self.secure = secure;
    }

    /// Adds a header. Later values for the same name are ignored.
    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .entry(name.as_ref().to_ascii_lowercase())
            .or_insert_with(|| value.into());
    }
}

impl TransportSignals for RequestAdapter {
    fn url(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.url)
    }

    fn is_secure(&self) -> bool {
        self.secure
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

impl<B> From<&Request<B>> for RequestAdapter {
    fn from(request: &Request<B>) -> Self {
        let uri = request.uri();
        let secure = request
            .extensions()
            .get::<SecureConnection>()
            .map(|conn| conn.0)
            .unwrap_or_else(|| uri.scheme() == Some(&Scheme::HTTPS));

        // Server-side URIs are usually origin-form; rebuild the absolute URL.
        let url = if uri.scheme().is_some() && uri.authority().is_some() {
            uri.to_string()
        } else {
            let host = request
                .headers()
                .get(HOST)
                .and_then(|value| value.to_str().ok())
                .or_else(|| uri.authority().map(|authority| authority.as_str()));
            let path = uri.path_and_query().map_or("/", |pq| pq.as_str());
            let scheme = if secure { "https" } else { "http" };

            match host {
                Some(host) => format!("{}://{}{}", scheme, host, path),
                None => path.to_string(),
            }
        };

        let mut adapter = RequestAdapter::new(url);
        adapter.set_secure(secure);
        for (name, value) in request.headers() {
            if let Ok(value) = value.to_str() {
                adapter.add_header(name.as_str(), value);
            }
        }
        adapter
    }
}

impl From<RedirectStatus> for StatusCode {
    fn from(status: RedirectStatus) -> Self {
        match status {
            RedirectStatus::Permanent => StatusCode::MOVED_PERMANENTLY,
            RedirectStatus::Found => StatusCode::FOUND,
        }
    }
}

impl<B: Default> PolicyResponse for Response<B> {
    fn has_header(&self, name: &str) -> bool {
        self.headers().contains_key(name)
    }

    fn set_header(&mut self, name: &'static str, value: &str) {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) else {
            tracing::warn!(header = name, "dropping header with invalid name or value");
            return;
        };
        self.headers_mut().insert(name, value);
    }

    fn redirect(redirect: &Redirect) -> Result<Self, Error> {
        let location = HeaderValue::from_str(&redirect.location)
            .map_err(|_| Error::InvalidHeaderValue { header: "location" })?;

        let mut response = Response::new(B::default());
        *response.status_mut() = redirect.status.into();
        response.headers_mut().insert(LOCATION, location);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_adapter_new() {
        let adapter = RequestAdapter::new("http://example.com/");
        assert_eq!(adapter.url(), "http://example.com/");
        assert!(!adapter.is_secure());
        assert!(adapter.header("x-forwarded-proto").is_none());
    }

    #[test]
    fn request_adapter_header_lookup_ignores_name_case() {
        let mut adapter = RequestAdapter::new("http://example.com/");
        adapter.add_header("X-Forwarded-Proto", "https");

        assert_eq!(adapter.header("x-forwarded-proto"), Some("https"));
        assert_eq!(adapter.header("X-FORWARDED-PROTO"), Some("https"));
    }

    #[test]
    fn request_adapter_keeps_first_header_value() {
        let mut adapter = RequestAdapter::new("http://example.com/");
        adapter.add_header("X-Forwarded-Proto", "https");
        adapter.add_header("x-forwarded-proto", "http");

        assert_eq!(adapter.header("x-forwarded-proto"), Some("https"));
        assert_eq!(adapter.headers.len(), 1);
    }

    #[test]
    fn from_http_request_rebuilds_url_from_host_header() {
        let request = Request::builder()
            .uri("/path?q=1")
            .header("host", "example.com:8080")
            .body(())
            .unwrap();

        let adapter = RequestAdapter::from(&request);

        assert_eq!(adapter.url(), "http://example.com:8080/path?q=1");
        assert!(!adapter.is_secure());
    }

    #[test]
    fn from_http_request_uses_absolute_uri() {
        let request = Request::builder()
            .uri("https://example.com/secure")
            .body(())
            .unwrap();

        let adapter = RequestAdapter::from(&request);

        assert_eq!(adapter.url(), "https://example.com/secure");
        assert!(adapter.is_secure());
    }

    #[test]
    fn from_http_request_honours_secure_connection_extension() {
        let mut request = Request::builder()
            .uri("/")
            .header("host", "example.com")
            .body(())
            .unwrap();
        request.extensions_mut().insert(SecureConnection(true));

        let adapter = RequestAdapter::from(&request);

        assert!(adapter.is_secure());
        assert_eq!(adapter.url(), "https://example.com/");
    }

    #[test]
    fn from_http_request_without_host_keeps_path() {
        let request = Request::builder().uri("/only").body(()).unwrap();

        let adapter = RequestAdapter::from(&request);

        assert_eq!(adapter.url(), "/only");
    }

    #[test]
    fn from_http_request_copies_headers() {
        let request = Request::builder()
            .uri("/")
            .header("host", "example.com")
            .header("x-forwarded-proto", "https")
            .body(())
            .unwrap();

        let adapter = RequestAdapter::from(&request);

        assert_eq!(adapter.header("X-Forwarded-Proto"), Some("https"));
    }

    #[test]
    fn http_response_redirect_sets_status_and_location() {
        let redirect = Redirect {
            location: "https://example.com/".to_string(),
            status: RedirectStatus::Found,
        };

        let response = Response::<String>::redirect(&redirect).unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "https://example.com/");
        assert!(response.body().is_empty());
    }

    #[test]
    fn http_response_redirect_rejects_invalid_location() {
        let redirect = Redirect {
            location: "https://example.com/\n".to_string(),
            status: RedirectStatus::Permanent,
        };

        let result = Response::<String>::redirect(&redirect);

        assert!(matches!(result, Err(Error::InvalidHeaderValue { .. })));
    }

    #[test]
    fn http_response_header_names_are_case_insensitive() {
        let mut response = Response::new(String::new());
        response.set_header("Strict-Transport-Security", "max-age=1");

        assert!(response.has_header("strict-transport-security"));
        assert!(response.has_header("Strict-Transport-Security"));
    }
}
