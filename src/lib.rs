//! # plinth
//!
//! A minimal HTTP framework for composing services out of named route
//! groups, behind a reverse proxy. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! nginx handles TLS, rate limiting, slow clients, and body-size limits.
//! plinth does not — by design. The proxy does proxy things. The framework
//! does framework things. Every feature plinth skips is one nginx already
//! ships, tested at scale, at no cost to you.
//!
//! What nginx / ingress already owns — plinth intentionally ignores:
//!
//! - **Body-size limits** — `client_max_body_size` in nginx
//! - **Rate limiting** — `limit_req` / ingress-nginx annotations
//! - **Slow-client protection** — nginx timeout and buffer settings
//! - **TLS termination** — nginx SSL / k8s ingress
//!
//! What's left for plinth — the only part that changes between applications:
//!
//! - Group mounting — declare routes on a [`Blueprint`], mount it under a
//!   prefix, and every cross-group conflict is rejected before the first
//!   request, naming both offenders
//! - Exact-match dispatch — one hash lookup, and a 404 is never confused
//!   with a 405
//! - Per-group static assets and [`liquid`] templates, with directory
//!   escapes refused
//! - Async I/O — tokio + hyper, HTTP/1.1 and HTTP/2
//! - Graceful shutdown — SIGTERM / Ctrl-C, drains in-flight requests
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use plinth::{Blueprint, Method, Registry, Request, Response, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut api = Blueprint::new("api");
//!     api.route(Method::Get, "/greeting", greeting)?;
//!
//!     // Declare everything, then freeze: after finalize() the table is
//!     // immutable and shared lock-free across connections.
//!     let mut registry = Registry::new();
//!     registry.mount(api, "/api_v1")?;
//!     registry.finalize()?;
//!
//!     Server::bind("0.0.0.0:3000").serve(registry).await?;
//!     Ok(())
//! }
//!
//! async fn greeting(_req: Request) -> Response {
//!     // plinth sends bytes — it doesn't care how you build them:
//!     //   serde_json::to_vec(&user).unwrap()
//!     //   format!(r#"{{"id":"{id}"}}"#).into_bytes()
//!     Response::json(br#"{"greeting": "Hello from plinth!"}"#.to_vec())
//! }
//! ```

mod blueprint;
mod error;
mod handler;
mod method;
mod paths;
mod registry;
mod request;
mod response;
mod server;
mod static_files;
mod templates;

pub mod health;
pub mod middleware;

pub use blueprint::Blueprint;
pub use error::{BlueprintError, DispatchError, Error, MountError, TemplateError};
pub use handler::Handler;
pub use method::Method;
pub use registry::Registry;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response};
pub use server::Server;
pub use templates::Templates;

// Templates take `liquid::Object` globals; re-exported so callers need no
// separate liquid dependency to build them.
pub use liquid;
