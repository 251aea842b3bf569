//! The top-level router: mounts route groups, rejects conflicts, dispatches.
//!
//! One hash lookup per request — `path → (method → handler)` — which also
//! makes "unknown path" and "unsupported method" different answers, the way
//! HTTP wants them (404 vs 405).
//!
//! # Lifecycle
//!
//! A registry is **building** until [`finalize`](Registry::finalize) is
//! called, and **serving** afterwards; the transition is one-way.
//! Mounting happens only while building, dispatch only while serving, and
//! both misuses are hard errors rather than silent surprises. Every route
//! conflict is caught at mount time, named after both offending groups —
//! a table that finalizes cleanly cannot produce an ambiguous match later.
//!
//! Once serving, the table is immutable: share it across connection tasks
//! behind an `Arc` with no further locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::blueprint::Blueprint;
use crate::error::{DispatchError, MountError};
use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::paths;
use crate::request::Request;
use crate::response::Response;
use crate::static_files::StaticAssets;

struct RouteEntry {
    handler: BoxedHandler,
    group: String,
}

#[derive(Default)]
struct Table {
    /// resolved path → method → handler. Built at mount time, frozen at
    /// finalize.
    routes: HashMap<String, HashMap<Method, RouteEntry>>,
    /// Static associations in mount order — first match wins.
    statics: Vec<StaticAssets>,
    /// Names of mounted groups, for registration-identity checks.
    groups: Vec<String>,
}

impl Table {
    fn route_count(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }
}

enum State {
    Building(Table),
    Serving(Table),
}

/// The application's routing table.
///
/// ```rust,no_run
/// use plinth::{Blueprint, Method, Registry, Request, Response};
///
/// # async fn greeting(_: Request) -> Response { Response::text("") }
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut api = Blueprint::new("api");
/// api.route(Method::Get, "/greeting", greeting)?;
///
/// let mut registry = Registry::new();
/// registry.mount(api, "/api_v1")?;
/// registry.finalize()?;
/// // registry now answers GET /api_v1/greeting
/// # Ok(())
/// # }
/// ```
pub struct Registry {
    state: State,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            state: State::Building(Table::default()),
        }
    }

    /// Mounts a group under `prefix`, resolving every group-local path to
    /// `prefix + path` (exactly one `/` at the seam).
    ///
    /// Fails — leaving the table untouched — if any resolved (method, path)
    /// collides with an already-mounted group, if a group with the same name
    /// is already mounted, or if the registry is already serving. Prefix
    /// handling: `""` and `"/"` both mean the root; a trailing `/` is
    /// trimmed; a missing leading `/` is added.
    pub fn mount(&mut self, blueprint: Blueprint, prefix: &str) -> Result<(), MountError> {
        let table = match &mut self.state {
            State::Building(table) => table,
            State::Serving(_) => return Err(MountError::Finalized),
        };

        if table.groups.iter().any(|g| g == blueprint.name()) {
            return Err(MountError::GroupAlreadyMounted {
                name: blueprint.name().to_owned(),
            });
        }

        let prefix = paths::normalize_prefix(prefix);
        let (name, routes, static_assets) = blueprint.into_parts();

        // Check every resolved path before inserting any, so a rejected
        // mount cannot leave the table half-populated.
        for route in &routes {
            let resolved = paths::join(&prefix, &route.path);
            if let Some(entry) = table
                .routes
                .get(&resolved)
                .and_then(|methods| methods.get(&route.method))
            {
                return Err(MountError::RouteConflict {
                    method: route.method,
                    path: resolved,
                    first: entry.group.clone(),
                    second: name,
                });
            }
        }

        let route_count = routes.len();
        for route in routes {
            let resolved = paths::join(&prefix, &route.path);
            table.routes.entry(resolved).or_default().insert(
                route.method,
                RouteEntry {
                    handler: route.handler,
                    group: name.clone(),
                },
            );
        }
        if let Some(assets) = static_assets {
            let assets = assets.mounted_under(&prefix);
            tracing::debug!(group = %name, url_prefix = %assets.url_prefix(), "static assets mounted");
            table.statics.push(assets);
        }

        tracing::debug!(group = %name, prefix = %prefix, routes = route_count, "group mounted");
        table.groups.push(name);
        Ok(())
    }

    /// Freezes the table and switches to the serving phase. One-way: calling
    /// it twice is an error, as is mounting afterwards.
    pub fn finalize(&mut self) -> Result<(), MountError> {
        match std::mem::replace(&mut self.state, State::Serving(Table::default())) {
            State::Building(table) => {
                tracing::info!(
                    groups = table.groups.len(),
                    routes = table.route_count(),
                    static_mounts = table.statics.len(),
                    "routing table finalized"
                );
                self.state = State::Serving(table);
                Ok(())
            }
            State::Serving(table) => {
                self.state = State::Serving(table);
                Err(MountError::Finalized)
            }
        }
    }

    /// True once [`finalize`](Registry::finalize) has run.
    pub fn is_serving(&self) -> bool {
        matches!(self.state, State::Serving(_))
    }

    /// Routes a request to its handler and returns the handler's response,
    /// untouched.
    ///
    /// Misses are typed: [`DispatchError::NotFound`] when the path is
    /// unknown under every method, [`DispatchError::MethodNotAllowed`]
    /// (with the sorted allowed set) when the path exists under others.
    /// Matching is byte-exact — no percent-decoding, no slash folding.
    pub async fn dispatch(&self, req: Request) -> Result<Response, DispatchError> {
        let handler = self.lookup(req.method(), req.path())?;
        Ok(handler.call(req).await)
    }

    /// Serves a file from the first mounted static association whose URL
    /// prefix matches `path` (mount order; no fallthrough to later groups).
    pub async fn serve_static(&self, path: &str) -> Result<Response, DispatchError> {
        let State::Serving(table) = &self.state else {
            return Err(DispatchError::NotFinalized);
        };
        match table.statics.iter().find(|assets| assets.matches(path)) {
            Some(assets) => assets.load(path).await,
            None => Err(DispatchError::NotFound),
        }
    }

    fn lookup(&self, method: Method, path: &str) -> Result<BoxedHandler, DispatchError> {
        let State::Serving(table) = &self.state else {
            return Err(DispatchError::NotFinalized);
        };
        let methods = table.routes.get(path).ok_or(DispatchError::NotFound)?;
        match methods.get(&method) {
            Some(entry) => Ok(Arc::clone(&entry.handler)),
            None => {
                let mut allowed: Vec<Method> = methods.keys().copied().collect();
                allowed.sort();
                Err(DispatchError::MethodNotAllowed { allowed })
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn hello(_req: Request) -> Response {
        Response::text("hello")
    }

    async fn goodbye(_req: Request) -> Response {
        Response::text("goodbye")
    }

    fn group(name: &str, method: Method, path: &str) -> Blueprint {
        let mut bp = Blueprint::new(name);
        bp.route(method, path, hello).unwrap();
        bp
    }

    #[test]
    fn conflict_names_both_groups() {
        let mut registry = Registry::new();
        registry.mount(group("first", Method::Get, "/greeting"), "/api").unwrap();

        let err = registry
            .mount(group("second", Method::Get, "/greeting"), "/api")
            .unwrap_err();
        match err {
            MountError::RouteConflict { method, path, first, second } => {
                assert_eq!(method, Method::Get);
                assert_eq!(path, "/api/greeting");
                assert_eq!(first, "first");
                assert_eq!(second, "second");
            }
            other => panic!("expected RouteConflict, got {other:?}"),
        }
    }

    #[test]
    fn same_local_path_under_different_prefixes_is_fine() {
        let mut registry = Registry::new();
        registry.mount(group("v1", Method::Get, "/greeting"), "/api_v1").unwrap();
        registry.mount(group("v2", Method::Get, "/greeting"), "/api_v2").unwrap();
        registry.finalize().unwrap();
    }

    #[test]
    fn rejected_mount_leaves_the_table_untouched() {
        let mut registry = Registry::new();
        registry.mount(group("first", Method::Get, "/b"), "").unwrap();

        // Second group: "/a" would be new, "/b" conflicts. Nothing of it
        // may land in the table.
        let mut second = Blueprint::new("second");
        second.route(Method::Get, "/a", hello).unwrap();
        second.route(Method::Get, "/b", hello).unwrap();
        assert!(registry.mount(second, "").is_err());

        registry.finalize().unwrap();
        let err = futures_block(registry.dispatch(Request::new(Method::Get, "/a"))).unwrap_err();
        assert!(matches!(err, DispatchError::NotFound));
    }

    #[test]
    fn duplicate_group_name_is_rejected() {
        let mut registry = Registry::new();
        registry.mount(group("api", Method::Get, "/a"), "").unwrap();
        let err = registry.mount(group("api", Method::Get, "/b"), "/v2").unwrap_err();
        assert!(matches!(err, MountError::GroupAlreadyMounted { name } if name == "api"));
    }

    #[tokio::test]
    async fn prefix_resolution_end_to_end() {
        let mut registry = Registry::new();
        registry.mount(group("api", Method::Get, "/greeting"), "/api_v1").unwrap();
        registry.finalize().unwrap();

        let resp = registry
            .dispatch(Request::new(Method::Get, "/api_v1/greeting"))
            .await
            .unwrap();
        assert_eq!(resp.body(), b"hello");

        // The unprefixed local path is not routable.
        let err = registry
            .dispatch(Request::new(Method::Get, "/greeting"))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::NotFound));
    }

    #[tokio::test]
    async fn not_found_vs_method_not_allowed() {
        let mut registry = Registry::new();
        let mut bp = Blueprint::new("api");
        bp.route(Method::Get, "/greeting", hello).unwrap();
        bp.route(Method::Put, "/greeting", goodbye).unwrap();
        registry.mount(bp, "").unwrap();
        registry.finalize().unwrap();

        let err = registry
            .dispatch(Request::new(Method::Get, "/unknown"))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::NotFound));

        let err = registry
            .dispatch(Request::new(Method::Post, "/greeting"))
            .await
            .unwrap_err();
        match err {
            DispatchError::MethodNotAllowed { allowed } => {
                // Sorted, not registration order.
                assert_eq!(allowed, vec![Method::Get, Method::Put]);
            }
            other => panic!("expected MethodNotAllowed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn state_machine_is_enforced_both_ways() {
        let mut registry = Registry::new();
        registry.mount(group("api", Method::Get, "/a"), "").unwrap();

        let err = registry
            .dispatch(Request::new(Method::Get, "/a"))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::NotFinalized));
        assert!(matches!(
            registry.serve_static("/x").await.unwrap_err(),
            DispatchError::NotFinalized
        ));

        registry.finalize().unwrap();

        let err = registry.mount(group("late", Method::Get, "/b"), "").unwrap_err();
        assert!(matches!(err, MountError::Finalized));
        assert!(matches!(registry.finalize().unwrap_err(), MountError::Finalized));

        // The earlier mount still serves.
        registry.dispatch(Request::new(Method::Get, "/a")).await.unwrap();
    }

    #[tokio::test]
    async fn first_matching_static_mount_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("app.js"), b"first").unwrap();
        std::fs::write(second.path().join("app.js"), b"second").unwrap();

        let mut a = Blueprint::new("a");
        a.static_assets(first.path(), "/assets").unwrap();
        let mut b = Blueprint::new("b");
        b.static_assets(second.path(), "/assets").unwrap();

        let mut registry = Registry::new();
        registry.mount(a, "").unwrap();
        registry.mount(b, "").unwrap();
        registry.finalize().unwrap();

        let resp = registry.serve_static("/assets/app.js").await.unwrap();
        assert_eq!(resp.body(), b"first");
    }

    #[tokio::test]
    async fn static_mount_prefix_is_rebased_under_the_mount() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), b"body{}").unwrap();

        let mut client = Blueprint::new("client");
        client.static_assets(dir.path(), "/static").unwrap();

        let mut registry = Registry::new();
        registry.mount(client, "/app").unwrap();
        registry.finalize().unwrap();

        let resp = registry.serve_static("/app/static/style.css").await.unwrap();
        assert_eq!(resp.header("content-type"), Some("text/css"));
        assert!(matches!(
            registry.serve_static("/static/style.css").await.unwrap_err(),
            DispatchError::NotFound
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_dispatch_agrees_on_every_answer() {
        let mut registry = Registry::new();
        let mut bp = Blueprint::new("api");
        bp.route(Method::Get, "/greeting", hello).unwrap();
        registry.mount(bp, "/api_v1").unwrap();
        registry.finalize().unwrap();

        let registry = Arc::new(registry);
        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..64 {
            let registry = Arc::clone(&registry);
            tasks.spawn(async move {
                if i % 2 == 0 {
                    let resp = registry
                        .dispatch(Request::new(Method::Get, "/api_v1/greeting"))
                        .await
                        .unwrap();
                    assert_eq!(resp.body(), b"hello");
                } else {
                    let err = registry
                        .dispatch(Request::new(Method::Post, "/api_v1/greeting"))
                        .await
                        .unwrap_err();
                    assert!(matches!(err, DispatchError::MethodNotAllowed { .. }));
                }
            });
        }
        while let Some(res) = tasks.join_next().await {
            res.unwrap();
        }
    }

    /// Minimal block_on for the one sync test that needs a future driven.
    fn futures_block<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(fut)
    }
}
