use std::fmt;

use serde::{Deserialize, Serialize};

/// One year in seconds, the default HSTS `max-age`.
pub const YEAR_IN_SECS: u64 = 31_536_000;

/// HTTP status used when redirecting to the secure URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectStatus {
    /// 301 Moved Permanently
    Permanent,
    /// 302 Found
    Found,
}

impl RedirectStatus {
    /// Returns the numeric status code.
    pub fn code(self) -> u16 {
        match self {
            RedirectStatus::Permanent => 301,
            RedirectStatus::Found => 302,
        }
    }
}

impl fmt::Display for RedirectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Transport policy configuration.
///
/// Created once at startup and never mutated afterwards. Builder-style
/// setters consume `self`, so a finished value can be shared freely between
/// request-handling threads.
///
/// The struct deserializes with defaults for every missing field, which lets
/// a host application embed it as a section of its own configuration file.
///
/// # Examples
///
/// ```
/// use secure_transport::{PolicyConfig, RedirectStatus, YEAR_IN_SECS};
///
/// let config = PolicyConfig::default()
///     .with_include_subdomains(true)
///     .with_permanent_redirect(true);
///
/// assert_eq!(config.max_age, YEAR_IN_SECS);
/// assert_eq!(config.hsts_header(), "max-age=31536000; includeSubDomains");
/// assert_eq!(config.redirect_status(), RedirectStatus::Permanent);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Seconds browsers should remember to use HTTPS
    pub max_age: u64,
    /// Whether the policy extends to subdomains
    pub include_subdomains: bool,
    /// Redirect with 301 instead of 302
    pub permanent_redirect: bool,
    /// Redirect bare hosts to their `www.` equivalent
    pub force_www: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_age: YEAR_IN_SECS,
            include_subdomains: false,
            permanent_redirect: false,
            force_www: false,
        }
    }
}

impl PolicyConfig {
    /// Sets the HSTS `max-age` in seconds.
    pub fn with_max_age(mut self, max_age: u64) -> Self {
        self.max_age = max_age;
        self
    }

    /// Sets whether `includeSubDomains` is emitted.
    pub fn with_include_subdomains(mut self, include_subdomains: bool) -> Self {
        self.include_subdomains = include_subdomains;
        self
    }

    /// Sets whether redirects are permanent (301) or temporary (302).
    pub fn with_permanent_redirect(mut self, permanent_redirect: bool) -> Self {
        self.permanent_redirect = permanent_redirect;
        self
    }

    /// Sets whether bare hosts are redirected to `www.`.
    pub fn with_force_www(mut self, force_www: bool) -> Self {
        self.force_www = force_www;
        self
    }

    /// Returns the `Strict-Transport-Security` header value for this policy.
    pub fn hsts_header(&self) -> String {
        let mut policy = format!("max-age={}", self.max_age);

        if self.include_subdomains {
            policy.push_str("; includeSubDomains");
        }

        policy
    }

    /// Returns the status code redirects are issued with.
    pub fn redirect_status(&self) -> RedirectStatus {
        if self.permanent_redirect {
            RedirectStatus::Permanent
        } else {
            RedirectStatus::Found
        }
    }
}
