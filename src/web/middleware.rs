//! Host hook registration points.
//!
//! A host framework exposes two extension points to the filter:
//! - a pre-request hook, run before routing, that may short-circuit dispatch
//!   by returning a response
//! - a post-response hook, run after the handler, that receives the response
//!   and returns the one sent to the client
//!
//! [`HostApp`] names these points. [`HookRegistry`] is a ready-made host that
//! stores hooks and drives them around a handler.
//!
//! # Dispatch Flow
//!
//! ```text
//! Request
//!   ↓
//! pre-request hooks (first response wins, errors propagate)
//!   ↓
//! handler (skipped when a pre hook answered)
//!   ↓
//! post-response hooks, in registration order
//!   ↓
//! Response
//! ```

use std::fmt;

use crate::error::Error;

/// A pre-request hook. Receives the request and the host debug flag.
pub type PreRequestHook<Req, Resp> =
    Box<dyn Fn(&Req, bool) -> Result<Option<Resp>, Error> + Send + Sync>;

/// A post-response hook. Receives the request and the outgoing response.
pub type PostResponseHook<Req, Resp> = Box<dyn Fn(&Req, Resp) -> Resp + Send + Sync>;

/// A host application offering before/after request hooks.
pub trait HostApp {
    /// The host's request type
    type Request;
    /// The host's response type
    type Response;

    /// Registers a hook run before the request is dispatched.
    fn before_request(&mut self, hook: PreRequestHook<Self::Request, Self::Response>);

    /// Registers a hook run after the handler produced a response.
    fn after_request(&mut self, hook: PostResponseHook<Self::Request, Self::Response>);
}

/// A minimal host that stores hooks and runs them around a handler.
///
/// # Examples
///
/// ```
/// use secure_transport::web::{HookRegistry, RequestAdapter};
/// use secure_transport::{PolicyConfig, SecureTransport};
///
/// let mut app: HookRegistry<RequestAdapter, http::Response<String>> = HookRegistry::new();
/// SecureTransport::with_app(&mut app, PolicyConfig::default());
///
/// let request = RequestAdapter::new("http://example.com/");
/// let response = app
///     .dispatch(&request, false, |_| http::Response::new("hello".to_string()))
///     .unwrap();
///
/// assert_eq!(response.status(), 302);
/// assert_eq!(response.headers()["location"], "https://example.com/");
/// ```
pub struct HookRegistry<Req, Resp> {
    pre: Vec<PreRequestHook<Req, Resp>>,
    post: Vec<PostResponseHook<Req, Resp>>,
}

impl<Req, Resp> HookRegistry<Req, Resp> {
    /// Creates a registry with no hooks.
    pub fn new() -> Self {
        Self {
            pre: Vec::new(),
            post: Vec::new(),
        }
    }

    /// Runs the hooks and `handler` for one request.
    ///
    /// Post-response hooks also run on responses produced by a pre-request
    /// hook.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a pre-request hook. The handler is
    /// not called in that case.
    pub fn dispatch<F>(&self, request: &Req, debug: bool, handler: F) -> Result<Resp, Error>
    where
        F: FnOnce(&Req) -> Resp,
    {
        let mut early = None;
        for hook in &self.pre {
            if let Some(response) = hook(request, debug)? {
                early = Some(response);
                break;
            }
        }

        let response = match early {
            Some(response) => response,
            None => handler(request),
        };

        Ok(self
            .post
            .iter()
            .fold(response, |response, hook| hook(request, response)))
    }

    /// Returns the number of registered pre-request hooks.
    pub fn pre_request_count(&self) -> usize {
        self.pre.len()
    }

    /// Returns the number of registered post-response hooks.
    pub fn post_response_count(&self) -> usize {
        self.post.len()
    }
}

impl<Req, Resp> Default for HookRegistry<Req, Resp> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Resp> fmt::Debug for HookRegistry<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("pre", &self.pre.len())
            .field("post", &self.post.len())
            .finish()
    }
}

impl<Req, Resp> HostApp for HookRegistry<Req, Resp> {
    type Request = Req;
    type Response = Resp;

    fn before_request(&mut self, hook: PreRequestHook<Req, Resp>) {
        self.pre.push(hook);
    }

    fn after_request(&mut self, hook: PostResponseHook<Req, Resp>) {
        self.post.push(hook);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Registry = HookRegistry<String, Vec<&'static str>>;

    #[test]
    fn dispatch_without_hooks_calls_handler() {
        let app = Registry::new();

        let response = app.dispatch(&"req".to_string(), false, |_| vec!["handler"]);

        assert_eq!(response.unwrap(), vec!["handler"]);
    }

    #[test]
    fn pre_hook_short_circuits_handler() {
        let mut app = Registry::new();
        app.before_request(Box::new(|_, _| Ok(Some(vec!["early"]))));

        let response = app
            .dispatch(&"req".to_string(), false, |_| vec!["handler"])
            .unwrap();

        assert_eq!(response, vec!["early"]);
    }

    #[test]
    fn pre_hook_receives_debug_flag() {
        let mut app = Registry::new();
        app.before_request(Box::new(|_, debug| {
            Ok(debug.then(|| vec!["debug"]))
        }));

        let normal = app.dispatch(&"req".to_string(), false, |_| vec!["handler"]);
        let debug = app.dispatch(&"req".to_string(), true, |_| vec!["handler"]);

        assert_eq!(normal.unwrap(), vec!["handler"]);
        assert_eq!(debug.unwrap(), vec!["debug"]);
    }

    #[test]
    fn post_hooks_run_in_order_after_short_circuit() {
        let mut app = Registry::new();
        app.before_request(Box::new(|_, _| Ok(Some(vec!["early"]))));
        app.after_request(Box::new(|_, mut resp| {
            resp.push("first");
            resp
        }));
        app.after_request(Box::new(|_, mut resp| {
            resp.push("second");
            resp
        }));

        let response = app
            .dispatch(&"req".to_string(), false, |_| vec!["handler"])
            .unwrap();

        assert_eq!(response, vec!["early", "first", "second"]);
    }

    #[test]
    fn pre_hook_error_skips_handler() {
        let mut app = Registry::new();
        app.before_request(Box::new(|req: &String, _| {
            Err(Error::InvalidHost { url: req.clone() })
        }));

        let mut called = false;
        let result = app.dispatch(&"req".to_string(), false, |_| {
            called = true;
            vec!["handler"]
        });

        assert!(result.is_err());
        assert!(!called);
    }

    #[test]
    fn registry_counts_hooks() {
        let mut app = Registry::default();
        app.after_request(Box::new(|_, resp| resp));

        assert_eq!(app.pre_request_count(), 0);
        assert_eq!(app.post_response_count(), 1);
        assert_eq!(format!("{:?}", app), "HookRegistry { pre: 0, post: 1 }");
    }
}
