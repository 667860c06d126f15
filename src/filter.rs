use std::sync::Arc;

use url::{Host, Url};

use crate::config::{PolicyConfig, RedirectStatus};
use crate::error::Error;
use crate::web::{HostApp, PolicyResponse, TransportSignals};

/// Response header carrying the HSTS policy.
pub const STRICT_TRANSPORT_SECURITY: &str = "Strict-Transport-Security";

/// Request header set by TLS-terminating proxies.
pub const X_FORWARDED_PROTO: &str = "X-Forwarded-Proto";

/// A redirect the filter wants issued instead of normal dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Target URL for the `Location` header
    pub location: String,
    /// Status code to redirect with
    pub status: RedirectStatus,
}

/// Outcome of the pre-request evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Let the request reach the application unchanged
    Proceed,
    /// Short-circuit dispatch with a redirect
    Redirect(Redirect),
}

impl Decision {
    /// Returns the redirect, if one was decided.
    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            Decision::Proceed => None,
            Decision::Redirect(redirect) => Some(redirect),
        }
    }
}

/// The secure-transport policy filter.
///
/// `SecureTransport` is a stateless filter around an immutable
/// [`PolicyConfig`]. It is cheap to clone and safe to share between any
/// number of concurrently handled requests.
///
/// It can be bound to a host eagerly with [`with_app`](Self::with_app), or
/// built first with [`new`](Self::new) and attached later through
/// [`init_app`](Self::init_app) for hosts with multi-phase startup.
///
/// # Examples
///
/// ```
/// use secure_transport::web::RequestAdapter;
/// use secure_transport::{Decision, PolicyConfig, RedirectStatus, SecureTransport};
///
/// let filter = SecureTransport::new(PolicyConfig::default());
/// let request = RequestAdapter::new("http://example.com/path");
///
/// let decision = filter.before_request(&request, false).unwrap();
/// let redirect = decision.redirect().expect("plain http is upgraded");
///
/// assert_eq!(redirect.location, "https://example.com/path");
/// assert_eq!(redirect.status, RedirectStatus::Found);
/// ```
#[derive(Debug, Clone)]
pub struct SecureTransport {
    config: Arc<PolicyConfig>,
    hsts: Arc<str>,
}

impl SecureTransport {
    /// Creates a filter that is not yet attached to any host.
    pub fn new(config: PolicyConfig) -> Self {
        let hsts = Arc::from(config.hsts_header());
        Self {
            config: Arc::new(config),
            hsts,
        }
    }

    /// Creates a filter and attaches it to `app` in one step.
    pub fn with_app<A>(app: &mut A, config: PolicyConfig) -> Self
    where
        A: HostApp,
        A::Request: TransportSignals,
        A::Response: PolicyResponse,
    {
        let filter = Self::new(config);
        filter.init_app(app);
        filter
    }

    /// Registers the pre-request and post-response hooks on `app`.
    pub fn init_app<A>(&self, app: &mut A)
    where
        A: HostApp,
        A::Request: TransportSignals,
        A::Response: PolicyResponse,
    {
        let pre = self.clone();
        app.before_request(Box::new(move |request, debug| {
            pre.redirect_to_secure(request, debug)
        }));

        let post = self.clone();
        app.after_request(Box::new(move |request, mut response| {
            post.after_response(request.is_secure(), &mut response);
            response
        }));

        tracing::debug!(
            max_age = self.config.max_age,
            include_subdomains = self.config.include_subdomains,
            permanent_redirect = self.config.permanent_redirect,
            force_www = self.config.force_www,
            "secure transport filter attached"
        );
    }

    /// Returns the configuration this filter enforces.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Returns the `Strict-Transport-Security` value emitted on secure responses.
    pub fn hsts_header(&self) -> &str {
        &self.hsts
    }

    /// Decides whether `request` must be redirected before dispatch.
    ///
    /// The `www.` rewrite applies whenever `force_www` is set. The upgrade to
    /// `https://` only applies when the request is not already treated as
    /// secure (see [`is_effectively_secure`]) and the URL literally starts
    /// with `http://`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] or [`Error::InvalidHost`] when `force_www`
    /// is enabled and the request URL cannot be parsed or has no host.
    pub fn before_request(
        &self,
        request: &impl TransportSignals,
        debug: bool,
    ) -> Result<Decision, Error> {
        let original = request.url();
        let mut location = original.to_string();
        let mut modified = false;

        if self.config.force_www {
            if let Some(rewritten) = prefix_www(&original)? {
                location = rewritten;
                modified = true;
            }
        }

        if !is_effectively_secure(request, debug) && location.starts_with("http://") {
            location = location.replacen("http://", "https://", 1);
            modified = true;
        }

        if !modified {
            return Ok(Decision::Proceed);
        }

        let status = self.config.redirect_status();
        tracing::debug!(from = %original, to = %location, %status, "redirecting to secure location");

        Ok(Decision::Redirect(Redirect { location, status }))
    }

    /// Pre-request hook body: turns a redirect decision into a host response.
    ///
    /// Returns `Ok(None)` when the request should proceed.
    ///
    /// # Errors
    ///
    /// Propagates URL errors from [`before_request`](Self::before_request) and
    /// failures building the redirect response.
    pub fn redirect_to_secure<R: PolicyResponse>(
        &self,
        request: &impl TransportSignals,
        debug: bool,
    ) -> Result<Option<R>, Error> {
        match self.before_request(request, debug)? {
            Decision::Proceed => Ok(None),
            Decision::Redirect(redirect) => R::redirect(&redirect).map(Some),
        }
    }

    /// Adds the HSTS header to a response for a transport-secure request.
    ///
    /// An existing `Strict-Transport-Security` header is never overwritten.
    /// Only the transport flag counts here; debug mode does not.
    pub fn after_response(&self, secure: bool, response: &mut impl PolicyResponse) {
        if !secure || response.has_header(STRICT_TRANSPORT_SECURITY) {
            return;
        }

        tracing::trace!(value = %self.hsts, "setting strict-transport-security");
        response.set_header(STRICT_TRANSPORT_SECURITY, &self.hsts);
    }
}

/// Returns whether the request is treated as already secure.
///
/// True when the transport reports TLS, the host runs in debug mode, or a
/// proxy forwarded the request with `X-Forwarded-Proto: https` (exact,
/// case-sensitive value; a missing header counts as `http`).
pub fn is_effectively_secure(request: &impl TransportSignals, debug: bool) -> bool {
    request.is_secure()
        || debug
        || request.header(X_FORWARDED_PROTO).unwrap_or("http") == "https"
}

/// Prepends `www.` to the URL host, leaving the rest of the URL text as is.
///
/// `None` when the host already starts with `www.` or is an IP literal.
fn prefix_www(raw: &str) -> Result<Option<String>, Error> {
    let url = Url::parse(raw).map_err(|e| Error::invalid_url(raw, e))?;

    let host = match url.host() {
        Some(Host::Domain(host)) => host,
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => return Ok(None),
        None => {
            return Err(Error::InvalidHost {
                url: raw.to_string(),
            })
        }
    };

    if host.starts_with("www.") {
        return Ok(None);
    }

    let offset = host_offset(raw).ok_or_else(|| Error::InvalidHost {
        url: raw.to_string(),
    })?;

    let mut rewritten = String::with_capacity(raw.len() + 4);
    rewritten.push_str(&raw[..offset]);
    rewritten.push_str("www.");
    rewritten.push_str(&raw[offset..]);
    Ok(Some(rewritten))
}

/// Byte offset where the host starts in the raw URL text.
fn host_offset(raw: &str) -> Option<usize> {
    let after_scheme = raw.find(':')? + 1;
    let authority_start = raw[after_scheme..]
        .find(|c: char| c != '/' && c != '\\')
        .map(|i| after_scheme + i)?;
    let authority_end = raw[authority_start..]
        .find(|c: char| matches!(c, '/' | '\\' | '?' | '#'))
        .map_or(raw.len(), |i| authority_start + i);

    // Skip user info
    Some(
        raw[authority_start..authority_end]
            .rfind('@')
            .map_or(authority_start, |at| authority_start + at + 1),
    )
}
