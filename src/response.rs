//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Handlers build a [`Response`] and return it; the server converts it into
//! the hyper representation at the connection boundary. Bodies are [`Bytes`]
//! — bring your own serializer.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values, used by [`ResponseBuilder::bytes`] and by the
/// static file path to label assets by extension.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Css,         // text/css
    Csv,         // text/csv
    Html,        // text/html; charset=utf-8
    Icon,        // image/x-icon
    JavaScript,  // text/javascript
    Jpeg,        // image/jpeg
    Json,        // application/json
    OctetStream, // application/octet-stream  (binary / unknown)
    Pdf,         // application/pdf
    Png,         // image/png
    Svg,         // image/svg+xml
    Text,        // text/plain; charset=utf-8
    Xml,         // application/xml
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Css         => "text/css",
            Self::Csv         => "text/csv",
            Self::Html        => "text/html; charset=utf-8",
            Self::Icon        => "image/x-icon",
            Self::JavaScript  => "text/javascript",
            Self::Jpeg        => "image/jpeg",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Pdf         => "application/pdf",
            Self::Png         => "image/png",
            Self::Svg         => "image/svg+xml",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }

    /// Maps a file extension (without the dot, any case) to a content type.
    /// Unknown extensions are served as raw bytes.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "css"          => Self::Css,
            "csv"          => Self::Csv,
            "htm" | "html" => Self::Html,
            "ico"          => Self::Icon,
            "js" | "mjs"   => Self::JavaScript,
            "jpeg" | "jpg" => Self::Jpeg,
            "json"         => Self::Json,
            "pdf"          => Self::Pdf,
            "png"          => Self::Png,
            "svg"          => Self::Svg,
            "txt"          => Self::Text,
            "xml"          => Self::Xml,
            _              => Self::OctetStream,
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK)
///
/// ```rust
/// use http::StatusCode;
/// use plinth::Response;
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::html("<h1>hello</h1>");
/// Response::status(StatusCode::NO_CONTENT);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use http::StatusCode;
/// use plinth::{ContentType, Response};
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec());
///
/// Response::builder()
///     .bytes(ContentType::Xml, b"<ok/>".to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Response {
    /// `200 OK` — `application/json`.
    ///
    /// Pass bytes from your serializer directly:
    /// - serde_json: `serde_json::to_vec(&val)?`
    /// - hand-built: `format!(r#"{{"id":{id}}}"#).into_bytes()`
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::with_content_type(ContentType::Json, body.into())
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_content_type(ContentType::Text, Bytes::from(body.into().into_bytes()))
    }

    /// `200 OK` — `text/html; charset=utf-8`. The shape a rendered template
    /// comes back in.
    pub fn html(body: impl Into<String>) -> Self {
        Self::with_content_type(ContentType::Html, Bytes::from(body.into().into_bytes()))
    }

    /// Response with no body.
    pub fn status(status: StatusCode) -> Self {
        Self { status, headers: Vec::new(), body: Bytes::new() }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: StatusCode::OK }
    }

    pub(crate) fn with_content_type(content_type: ContentType, body: Bytes) -> Self {
        Self {
            status: StatusCode::OK,
            headers: vec![("content-type".to_owned(), content_type.as_str().to_owned())],
            body,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Case-insensitive header lookup. First match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets a header, replacing any existing value under the same
    /// (case-insensitive) name. This is the hook middleware `after` uses to
    /// inject cross-cutting headers.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    /// Converts into the hyper-facing representation.
    ///
    /// Header names/values that are not valid HTTP are dropped with a
    /// warning rather than failing the whole response.
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut out = http::Response::builder().status(self.status);
        if let Some(headers) = out.headers_mut() {
            for (name, value) in &self.headers {
                match (
                    http::HeaderName::from_bytes(name.as_bytes()),
                    http::HeaderValue::from_str(value),
                ) {
                    (Ok(name), Ok(value)) => {
                        headers.append(name, value);
                    }
                    _ => tracing::warn!(header = %name, "dropping malformed response header"),
                }
            }
        }
        // Status is always valid here, so the builder cannot fail.
        out.body(Full::new(self.body))
            .unwrap_or_else(|_| http::Response::new(Full::new(Bytes::new())))
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`], obtained via [`Response::builder`].
///
/// Defaults to `200 OK`; terminated by a typed body method, so what goes out
/// is always labelled.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.finish(ContentType::Json, body.into())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(ContentType::Text, Bytes::from(body.into().into_bytes()))
    }

    /// Terminate with an HTML body (`text/html; charset=utf-8`).
    pub fn html(self, body: impl Into<String>) -> Response {
        self.finish(ContentType::Html, Bytes::from(body.into().into_bytes()))
    }

    /// Terminate with a typed body — XML, images, binary, whatever.
    pub fn bytes(self, content_type: ContentType, body: impl Into<Bytes>) -> Response {
        self.finish(content_type, body.into())
    }

    /// Terminate with no body (`204 No Content`, redirects, …).
    pub fn no_body(self) -> Response {
        Response { status: self.status, headers: self.headers, body: Bytes::new() }
    }

    fn finish(self, content_type: ContentType, body: Bytes) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.as_str().to_owned())];
        headers.extend(self.headers);
        Response { status: self.status, headers, body }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implemented for [`Response`] itself, strings, and [`StatusCode`], so the
/// common handler shapes need no wrapping. Implement it on your own types to
/// return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

/// Return a status directly from a handler: `return StatusCode::NOT_FOUND`.
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response {
        Response::status(self)
    }
}
