//! Tower middleware applying the filter to `http` services.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use http::{Request, Response, StatusCode};
use tower::{Layer, Service};

use crate::filter::{Decision, SecureTransport};

use super::{PolicyResponse, RequestAdapter, TransportSignals};

/// Layer that wraps a service in [`SecureTransportService`].
///
/// # Examples
///
/// ```
/// use secure_transport::web::SecureTransportLayer;
/// use secure_transport::{PolicyConfig, SecureTransport};
///
/// let filter = SecureTransport::new(PolicyConfig::default().with_include_subdomains(true));
/// let layer = SecureTransportLayer::new(filter).debug(cfg!(debug_assertions));
/// # let _ = layer;
/// ```
#[derive(Debug, Clone)]
pub struct SecureTransportLayer {
    filter: SecureTransport,
    debug: bool,
}

impl SecureTransportLayer {
    /// Creates a layer with debug mode off.
    pub fn new(filter: SecureTransport) -> Self {
        Self {
            filter,
            debug: false,
        }
    }

    /// Sets the host debug flag. In debug mode plain HTTP is not upgraded.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl<S> Layer<S> for SecureTransportLayer {
    type Service = SecureTransportService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecureTransportService {
            inner,
            filter: self.filter.clone(),
            debug: self.debug,
        }
    }
}

/// Service redirecting insecure requests and adding HSTS to secure responses.
///
/// Requests whose URL the filter cannot work with are answered with
/// `400 Bad Request` without reaching the inner service.
#[derive(Debug, Clone)]
pub struct SecureTransportService<S> {
    inner: S,
    filter: SecureTransport,
    debug: bool,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for SecureTransportService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ResBody: Default + Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // Take the instance driven to readiness; dropping it on an early
        // answer releases whatever poll_ready reserved.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let signals = RequestAdapter::from(&req);
        let secure = signals.is_secure();

        let early = match self.filter.before_request(&signals, self.debug) {
            Ok(Decision::Proceed) => None,
            Ok(Decision::Redirect(redirect)) => Some(
                Response::<ResBody>::redirect(&redirect).unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "cannot encode redirect location");
                    bad_request()
                }),
            ),
            Err(err) => {
                tracing::warn!(error = %err, "rejecting request with unusable URL");
                Some(bad_request())
            }
        };

        if let Some(mut response) = early {
            self.filter.after_response(secure, &mut response);
            return Box::pin(async move { Ok(response) });
        }

        let filter = self.filter.clone();
        let future = inner.call(req);

        Box::pin(async move {
            let mut response = future.await?;
            filter.after_response(secure, &mut response);
            Ok(response)
        })
    }
}

fn bad_request<B: Default>() -> Response<B> {
    let mut response = Response::new(B::default());
    *response.status_mut() = StatusCode::BAD_REQUEST;
    response
}
