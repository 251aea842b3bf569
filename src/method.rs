//! HTTP method as a typed enum.
//!
//! Covers the RFC 9110 standard methods — the only ones a route table can
//! meaningfully bind. Requests arriving with any other verb are rejected at
//! the server level with `405 Method Not Allowed` before they ever reach a
//! handler.

use std::fmt;
use std::str::FromStr;

/// A standard HTTP method (RFC 9110 §9).
///
/// `Ord` is derived so allowed-method lists (the `allow` header on a 405)
/// come out in a stable order regardless of registration order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Trace   => "TRACE",
        }
    }

    /// Converts from the `http` crate's method type at the hyper boundary.
    ///
    /// Returns `None` for extension methods (WebDAV verbs, `PURGE`, …) —
    /// the server answers those with a 405 itself.
    pub(crate) fn from_http(method: &http::Method) -> Option<Self> {
        method.as_str().parse().ok()
    }
}

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONNECT" => Ok(Self::Connect),
            "DELETE"  => Ok(Self::Delete),
            "GET"     => Ok(Self::Get),
            "HEAD"    => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "PATCH"   => Ok(Self::Patch),
            "POST"    => Ok(Self::Post),
            "PUT"     => Ok(Self::Put),
            "TRACE"   => Ok(Self::Trace),
            _         => Err(()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip() {
        for m in [
            Method::Connect,
            Method::Delete,
            Method::Get,
            Method::Head,
            Method::Options,
            Method::Patch,
            Method::Post,
            Method::Put,
            Method::Trace,
        ] {
            assert_eq!(m.as_str().parse(), Ok(m));
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert_eq!("get".parse::<Method>(), Err(()));
        assert_eq!("Get".parse::<Method>(), Err(()));
    }

    #[test]
    fn extension_methods_do_not_convert() {
        let purge = http::Method::from_bytes(b"PURGE").unwrap();
        assert_eq!(Method::from_http(&purge), None);
        assert_eq!(Method::from_http(&http::Method::GET), Some(Method::Get));
    }
}
