//! Secure-transport policy middleware.
//!
//! This crate enforces HTTPS for a web application with two hooks around
//! each request:
//! - **Pre-request**: redirect plain HTTP (and, optionally, bare hosts) to
//!   the secure `www.` URL
//! - **Post-response**: attach a `Strict-Transport-Security` header to
//!   responses served over TLS
//!
//! TLS termination, certificates and proxying stay with the host. The filter
//! only reads the signals they leave behind (the transport TLS flag and the
//! `X-Forwarded-Proto` header).
//!
//! # Core Types
//!
//! - [`PolicyConfig`]: Immutable policy settings created at startup
//! - [`SecureTransport`]: The filter, holding a shared `PolicyConfig`
//! - [`Decision`]: Outcome of the pre-request evaluation
//! - [`web::HostApp`]: The hook registration points a host provides
//! - [`web::SecureTransportLayer`]: Tower middleware for `http` services
//!
//! # Examples
//!
//! ```
//! use secure_transport::web::RequestAdapter;
//! use secure_transport::{PolicyConfig, SecureTransport};
//!
//! let filter = SecureTransport::new(
//!     PolicyConfig::default()
//!         .with_include_subdomains(true)
//!         .with_permanent_redirect(true),
//! );
//!
//! // Plain HTTP is redirected
//! let request = RequestAdapter::new("http://example.com/login");
//! let decision = filter.before_request(&request, false).unwrap();
//! assert_eq!(decision.redirect().unwrap().location, "https://example.com/login");
//!
//! // Secure responses carry the policy
//! let mut response = http::Response::new(String::new());
//! filter.after_response(true, &mut response);
//! assert_eq!(
//!     response.headers()["strict-transport-security"],
//!     "max-age=31536000; includeSubDomains"
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod filter;
pub mod web;

pub use config::{PolicyConfig, RedirectStatus, YEAR_IN_SECS};
pub use error::Error;
pub use filter::{
    is_effectively_secure, Decision, Redirect, SecureTransport, STRICT_TRANSPORT_SECURITY,
    X_FORWARDED_PROTO,
};
