//! Boundary traits between host frameworks and the filter.
//!
//! The filter never touches framework types directly. A host exposes the
//! request signals it needs through [`TransportSignals`] and lets the filter
//! write to its responses through [`PolicyResponse`].

use std::borrow::Cow;

use crate::error::Error;
use crate::filter::Redirect;

/// The request signals the filter inspects.
///
/// # Examples
///
/// ```
/// use std::borrow::Cow;
/// use secure_transport::web::TransportSignals;
///
/// // Example framework-specific implementation
/// struct MyFrameworkRequest {
///     url: String,
///     tls: bool,
///     forwarded_proto: Option<String>,
/// }
///
/// impl TransportSignals for MyFrameworkRequest {
///     fn url(&self) -> Cow<'_, str> {
///         Cow::Borrowed(&self.url)
///     }
///
///     fn is_secure(&self) -> bool {
///         self.tls
///     }
///
///     fn header(&self, name: &str) -> Option<&str> {
///         if name.eq_ignore_ascii_case("x-forwarded-proto") {
///             self.forwarded_proto.as_deref()
///         } else {
///             None
///         }
///     }
/// }
/// ```
pub trait TransportSignals {
    /// The full request URL, including scheme and host.
    fn url(&self) -> Cow<'_, str>;

    /// Whether the connection itself was made over TLS.
    fn is_secure(&self) -> bool;

    /// Looks up a request header. Names are matched case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;
}

/// A host response the filter can inspect and modify.
pub trait PolicyResponse: Sized {
    /// Whether a header with this name is already present.
    fn has_header(&self, name: &str) -> bool;

    /// Sets a header, replacing any existing value.
    fn set_header(&mut self, name: &'static str, value: &str);

    /// Builds a redirect response with a `Location` header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeaderValue`] if the location cannot be encoded
    /// as a header value.
    fn redirect(redirect: &Redirect) -> Result<Self, Error>;
}
