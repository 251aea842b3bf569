//! HTTP server, request pipeline, graceful shutdown.
//!
//! # Request pipeline
//!
//! Per request, in order: middleware `before` hooks (registration order,
//! may short-circuit) → route dispatch → on a `GET` route miss, the static
//! mounts → error mapping (404 / 405 / 403 / 500) → middleware `after`
//! hooks (reverse order) → access log line. Handlers never see a failure
//! they did not produce themselves; every registry error becomes a plain
//! status response here.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before SIGKILL. On the
//! first SIGTERM or Ctrl-C the server stops accepting, lets every in-flight
//! connection finish, then returns from [`Server::serve`] so `main` exits
//! cleanly. Set the grace period longer than your slowest request.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::{DispatchError, Error};
use crate::method::Method;
use crate::middleware::Middleware;
use crate::registry::Registry;
use crate::request::Request;
use crate::response::Response;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use plinth::Server;
    /// let server = Server::bind("0.0.0.0:3000");
    /// ```
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr, middleware: Vec::new() }
    }

    /// Adds a middleware. Hooks run in the order middleware was added on the
    /// way in, reverse order on the way out.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Starts accepting connections and dispatching them through `registry`.
    ///
    /// Refuses a registry that has not been finalized — a table that can
    /// still change underneath concurrent requests is not something this
    /// server will serve.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, registry: Registry) -> Result<(), Error> {
        if !registry.is_serving() {
            return Err(Error::NotFinalized);
        }

        let listener = TcpListener::bind(self.addr).await?;

        // Arc so the table and the middleware stack are shared across
        // concurrent connection tasks without copying.
        let registry = Arc::new(registry);
        let middleware: Arc<[Arc<dyn Middleware>]> = self.middleware.into();

        info!(addr = %self.addr, "plinth listening");

        // JoinSet tracks every spawned connection task so graceful shutdown
        // can wait for them all.
        let mut tasks = tokio::task::JoinSet::new();

        // Futures must not move in memory after the first poll; `tokio::pin!`
        // pins the shutdown future on the stack so the loop can re-poll it.
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // `biased` checks arms top-to-bottom: a SIGTERM stops new
                // accepts immediately, even with connections queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let registry = Arc::clone(&registry);
                    let middleware = Arc::clone(&middleware);
                    // TokioIo adapts tokio's AsyncRead/AsyncWrite to hyper's
                    // IO traits.
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection, not once
                        // per connection.
                        let svc = service_fn(move |req| {
                            let registry = Arc::clone(&registry);
                            let middleware = Arc::clone(&middleware);
                            async move { handle(registry, middleware, req).await }
                        });

                        // `auto::Builder` speaks HTTP/1.1 and HTTP/2 alike —
                        // whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished tasks so the JoinSet stays bounded on
                // long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Drain every in-flight connection before returning.
        while tasks.join_next().await.is_some() {}

        info!("plinth stopped");
        Ok(())
    }
}

// ── Request pipeline ──────────────────────────────────────────────────────────

/// Core hot path: one wire request in, one wire response out.
///
/// The error type is [`Infallible`] — every failure is handled internally
/// and turned into a status response, so hyper never sees an error.
async fn handle(
    registry: Arc<Registry>,
    middleware: Arc<[Arc<dyn Middleware>]>,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let wire_method = req.method().as_str().to_owned();
    let path = req.uri().path().to_owned();

    let mut response = build_response(&registry, &middleware, req, &path).await;

    // Every response leaves through the `after` hooks, error pages included.
    run_after(&middleware, &mut response);

    info!(
        method = %wire_method,
        path = %path,
        status = response.status_code().as_u16(),
        latency = ?started.elapsed(),
        "request"
    );

    Ok(response.into_http())
}

async fn build_response(
    registry: &Registry,
    middleware: &[Arc<dyn Middleware>],
    req: hyper::Request<hyper::body::Incoming>,
    path: &str,
) -> Response {
    // Extension verbs (WebDAV, PURGE, …) are not routable here; refuse them
    // before the middleware stack runs.
    let Some(method) = Method::from_http(req.method()) else {
        return Response::status(StatusCode::METHOD_NOT_ALLOWED);
    };

    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("failed to read request body: {e}");
            return Response::status(StatusCode::BAD_REQUEST);
        }
    };

    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_owned(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    let mut request = Request::from_parts(method, path.to_owned(), headers, body);

    for mw in middleware {
        if let Some(early) = mw.before(&mut request) {
            return early;
        }
    }

    match registry.dispatch(request).await {
        Ok(response) => response,
        // A GET miss falls through to the static mounts before giving up.
        Err(DispatchError::NotFound) if method == Method::Get => {
            match registry.serve_static(path).await {
                Ok(response) => response,
                Err(err) => error_response(err),
            }
        }
        Err(err) => error_response(err),
    }
}

/// Applies `after` hooks in reverse registration order.
fn run_after(middleware: &[Arc<dyn Middleware>], response: &mut Response) {
    for mw in middleware.iter().rev() {
        mw.after(response);
    }
}

/// Maps a lookup failure to the status the client should see.
fn error_response(err: DispatchError) -> Response {
    match err {
        DispatchError::NotFound => Response::status(StatusCode::NOT_FOUND),
        DispatchError::MethodNotAllowed { allowed } => {
            let allow = allowed
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Response::builder()
                .status(StatusCode::METHOD_NOT_ALLOWED)
                .header("allow", &allow)
                .no_body()
        }
        DispatchError::Forbidden { path } => {
            warn!(path = %path, "rejected path escaping its asset directory");
            Response::status(StatusCode::FORBIDDEN)
        }
        DispatchError::Io(e) => {
            error!("static file read failed: {e}");
            Response::status(StatusCode::INTERNAL_SERVER_ERROR)
        }
        // `serve` refuses registries that are still building, so dispatch
        // cannot report this once the loop is running; mapped anyway to keep
        // the match total.
        DispatchError::NotFinalized => Response::status(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** (sent by `kubectl` and the
/// Kubernetes control plane) and **SIGINT** (Ctrl-C, for local dev).
/// On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // `pending()` never resolves — on non-Unix the SIGTERM arm is
    // effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_not_allowed_carries_the_allow_header() {
        let resp = error_response(DispatchError::MethodNotAllowed {
            allowed: vec![Method::Get, Method::Post, Method::Put],
        });
        assert_eq!(resp.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.header("allow"), Some("GET, POST, PUT"));
        assert!(resp.body().is_empty());
    }

    #[test]
    fn lookup_failures_map_to_client_statuses() {
        let resp = error_response(DispatchError::NotFound);
        assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);

        let resp = error_response(DispatchError::Forbidden { path: "/../x".into() });
        assert_eq!(resp.status_code(), StatusCode::FORBIDDEN);

        let io = std::io::Error::other("disk gone");
        let resp = error_response(DispatchError::Io(io));
        assert_eq!(resp.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn after_hooks_run_in_reverse_registration_order() {
        struct Stamp(&'static str);
        impl Middleware for Stamp {
            fn after(&self, resp: &mut Response) {
                let prev = resp.header("x-order").unwrap_or("").to_owned();
                resp.set_header("x-order", format!("{prev}{}", self.0));
            }
        }

        let stack: Vec<Arc<dyn Middleware>> = vec![Arc::new(Stamp("a")), Arc::new(Stamp("b"))];
        let mut resp = Response::text("ok");
        run_after(&stack, &mut resp);
        // Added a then b; applied b then a.
        assert_eq!(resp.header("x-order"), Some("ba"));
    }

    #[tokio::test]
    async fn serve_refuses_a_building_registry() {
        let registry = Registry::new();
        let err = Server::bind("127.0.0.1:0").serve(registry).await.unwrap_err();
        assert!(matches!(err, Error::NotFinalized));
    }
}
