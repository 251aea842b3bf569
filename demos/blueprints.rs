//! Route groups in practice — a JSON API under a versioned prefix and a
//! browser client at the root, each declared as its own blueprint.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example blueprints
//!
//! Try:
//!   curl http://localhost:3000/api_v1/greeting
//!   curl http://localhost:3000/                      # rendered template
//!   curl http://localhost:3000/client/static/style.css
//!   curl -i --path-as-is http://localhost:3000/client/static/../../Cargo.toml  # 403

use http::StatusCode;
use plinth::{Blueprint, Method, Registry, Request, Response, Server, Templates, liquid};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut api = Blueprint::new("api");
    api.route(Method::Get, "/greeting", greeting)?;

    // The client group owns the page, its stylesheet and its script. The
    // static URL prefix is group-local: mounted at the root it serves under
    // /client/static, mounted at /app it would serve under /app/client/static.
    let mut client = Blueprint::new("client");
    let templates = client.templates("demos/client/templates")?;
    client
        .route(Method::Get, "/", move |req| index(req, templates.clone()))?
        .static_assets("demos/client/static", "/client/static")?;

    let mut registry = Registry::new();
    registry.mount(api, "/api_v1")?;
    registry.mount(client, "")?;
    registry.finalize()?;

    let addr = std::env::var("PLINTH_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_owned());
    Server::bind(&addr).serve(registry).await?;
    Ok(())
}

// GET /api_v1/greeting — the blueprint declares /greeting; the mount
// supplies the version prefix.
async fn greeting(_req: Request) -> Response {
    let text = std::env::var("GREETING").unwrap_or_else(|_| "Hello from Flask!".to_owned());
    Response::json(format!(r#"{{"greeting": "{text}"}}"#).into_bytes())
}

// GET /
async fn index(_req: Request, templates: Templates) -> Response {
    let globals = liquid::object!({ "title": "plinth client" });
    match templates.render("index.html", &globals).await {
        Ok(html) => Response::html(html),
        Err(e) => {
            tracing::error!("template render failed: {e}");
            Response::status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
