//! Middleware layer.
//!
//! Middleware intercepts requests before routing and responses after it,
//! and is the right place for cross-cutting concerns: CORS headers,
//! request-id injection, authentication-header inspection.
//!
//! Hooks are synchronous and header-level by design. `before` runs in
//! registration order and may short-circuit routing by returning a
//! response. `after` runs in reverse registration order on every response
//! the server sends — routed, short-circuited, or error-mapped — so a
//! header stamped there is never missing from an error page.
//!
//! ```rust
//! use plinth::middleware::Middleware;
//! use plinth::{Request, Response};
//!
//! struct ServerHeader;
//!
//! impl Middleware for ServerHeader {
//!     fn after(&self, resp: &mut Response) {
//!         resp.set_header("server", "plinth");
//!     }
//! }
//! ```

use crate::request::Request;
use crate::response::Response;

/// A before/after hook pair around routing. Both methods default to
/// doing nothing, so implementors override only the side they need.
pub trait Middleware: Send + Sync + 'static {
    /// Runs before routing. Returning `Some` skips routing and sends that
    /// response instead.
    fn before(&self, _req: &mut Request) -> Option<Response> {
        None
    }

    /// Runs after the response is produced, reverse registration order.
    fn after(&self, _resp: &mut Response) {}
}
