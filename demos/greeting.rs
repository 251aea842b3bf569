//! Minimal plinth example — one JSON endpoint, health checks, CORS.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example greeting
//!
//! Try:
//!   curl http://localhost:3000/greeting
//!   curl -i -X POST http://localhost:3000/greeting    # 405, allow: GET
//!   curl -i -X OPTIONS http://localhost:3000/greeting # preflight, from middleware
//!   curl http://localhost:3000/healthz

use http::StatusCode;
use plinth::middleware::Middleware;
use plinth::{Blueprint, Method, Registry, Request, Response, Server, health};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut api = Blueprint::new("api");
    api.route(Method::Get, "/greeting", greeting)?;

    // Separate group for the probes — mounted alongside `api` at the root,
    // which is fine as long as no (method, path) pair collides.
    let mut ops = Blueprint::new("ops");
    ops.route(Method::Get, "/healthz", health::liveness)?
        .route(Method::Get, "/readyz", health::readiness)?;

    let mut registry = Registry::new();
    registry.mount(api, "")?;
    registry.mount(ops, "")?;
    registry.finalize()?;

    let addr = std::env::var("PLINTH_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_owned());
    Server::bind(&addr).with(Cors).serve(registry).await?;
    Ok(())
}

// GET /greeting
//
// The greeting text is configuration, not code — override it with
// GREETING=... at launch.
async fn greeting(_req: Request) -> Response {
    let text = std::env::var("GREETING").unwrap_or_else(|_| "Hello from Flask!".to_owned());
    Response::json(format!(r#"{{"greeting": "{text}"}}"#).into_bytes())
}

/// Wide-open CORS: answers preflights before routing and stamps the origin
/// header on every outgoing response, error pages included.
struct Cors;

impl Middleware for Cors {
    fn before(&self, req: &mut Request) -> Option<Response> {
        (req.method() == Method::Options).then(|| {
            Response::builder()
                .status(StatusCode::NO_CONTENT)
                .header("access-control-allow-origin", "*")
                .header("access-control-allow-methods", "GET, OPTIONS")
                .header("access-control-allow-headers", "content-type")
                .no_body()
        })
    }

    fn after(&self, resp: &mut Response) {
        resp.set_header("access-control-allow-origin", "*");
    }
}
