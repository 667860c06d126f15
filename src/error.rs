use std::fmt;

/// Errors that can occur while evaluating the transport policy.
///
/// The filter itself has no failure states. These variants only surface
/// problems with input the host framework handed over (a request URL that
/// does not parse, a host that cannot carry a `www.` prefix, a location that
/// is not a valid header value).
#[derive(Debug)]
pub enum Error {
    /// The request URL could not be parsed
    InvalidUrl {
        /// The URL as received from the host framework
        url: String,
        /// The underlying parse failure
        source: url::ParseError,
    },
    /// The request URL has no host that can be rewritten
    InvalidHost {
        /// The URL as received from the host framework
        url: String,
    },
    /// A computed value cannot be used as an HTTP header value
    InvalidHeaderValue {
        /// Name of the header being written
        header: &'static str,
    },
}

impl Error {
    pub(crate) fn invalid_url(url: &str, source: url::ParseError) -> Self {
        Error::InvalidUrl {
            url: url.to_string(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidUrl { url, source } => {
                write!(f, "Invalid request URL '{}': {}", url, source)
            }
            Error::InvalidHost { url } => write!(f, "Request URL '{}' has no rewritable host", url),
            Error::InvalidHeaderValue { header } => {
                write!(f, "Invalid value for header '{}'", header)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidUrl { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn invalid_url_display_includes_url() {
        let err = Error::invalid_url("not a url", url::ParseError::RelativeUrlWithoutBase);
        let out = err.to_string();

        assert!(out.contains("not a url"));
        assert!(err.source().is_some());
    }

    #[test]
    fn invalid_header_value_names_header() {
        let err = Error::InvalidHeaderValue {
            header: "strict-transport-security",
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for header 'strict-transport-security'"
        );
        assert!(err.source().is_none());
    }
}
