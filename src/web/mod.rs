//! Web framework integration surface.
//!
//! This module is the boundary between host frameworks and the filter. It
//! handles:
//! - Reading the request signals the filter needs (URL, TLS flag, headers)
//! - Writing redirects and headers back into host responses
//! - Registering the filter on a host's before/after request hooks
//!
//! # Design Principles
//!
//! 1. **Core Stays Framework-Free**: [`SecureTransport`](crate::SecureTransport)
//!    only sees the [`TransportSignals`] and [`PolicyResponse`] traits.
//!
//! 2. **Explicit Context**: No globals, no ambient request state. The request,
//!    the response and the debug flag are passed as values.
//!
//! 3. **Two Hook Points**: Hosts offer a pre-request hook that may answer
//!    early and a post-response hook that finalizes the response.
//!
//! # Integration Model
//!
//! Hosts with hook systems implement [`HostApp`] and call
//! [`SecureTransport::init_app`](crate::SecureTransport::init_app).
//! Tower-based stacks wrap their service in [`SecureTransportLayer`].
//!
//! ```ignore
//! let filter = SecureTransport::new(config.transport.clone());
//! let app = Router::new()
//!     .route("/", get(index))
//!     .layer(SecureTransportLayer::new(filter).debug(config.debug));
//! ```

mod adapter;
mod extract;
mod layer;
mod middleware;

pub use adapter::{RequestAdapter, SecureConnection};
pub use extract::{PolicyResponse, TransportSignals};
pub use layer::{SecureTransportLayer, SecureTransportService};
pub use middleware::{HookRegistry, HostApp, PostResponseHook, PreRequestHook};
