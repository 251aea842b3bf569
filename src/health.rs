//! Built-in Kubernetes health-check handlers.
//!
//! Kubernetes asks two questions. plinth answers them.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Register them on a route group:
//!
//! ```rust,no_run
//! use plinth::{Blueprint, Method, health};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut ops = Blueprint::new("ops");
//! ops.route(Method::Get, "/healthz", health::liveness)?
//!     .route(Method::Get, "/readyz", health::readiness)?;
//! # Ok(())
//! # }
//! ```
//!
//! Override `readiness` with a custom handler if you need to gate on
//! dependency availability (database connections, downstream services, etc.):
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use plinth::{Request, Response};
//!
//! async fn readiness(_req: Request) -> Response {
//!     if dependencies_are_healthy().await {
//!         Response::text("ready")
//!     } else {
//!         Response::status(StatusCode::SERVICE_UNAVAILABLE)
//!     }
//! }
//!
//! async fn dependencies_are_healthy() -> bool { true }
//! ```

use crate::{Request, Response};

/// Kubernetes liveness probe handler.
///
/// Always returns `200 OK` with body `"ok"`. If the process can respond to
/// HTTP at all, it is alive — this handler intentionally has no dependencies.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Kubernetes readiness probe handler (default implementation).
///
/// Returns `200 OK` with body `"ready"`. Replace this with your own handler
/// if your application needs a warm-up period or must verify dependency health
/// before accepting traffic.
pub async fn readiness(_req: Request) -> Response {
    Response::text("ready")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;

    #[tokio::test]
    async fn probe_bodies_are_stable() {
        // Probe configs match on these exact bodies; changing them is a
        // breaking change for deployments.
        let resp = liveness(Request::new(Method::Get, "/healthz")).await;
        assert_eq!(resp.body(), b"ok");

        let resp = readiness(Request::new(Method::Get, "/readyz")).await;
        assert_eq!(resp.body(), b"ready");
    }
}
