//! Route groups: named, reusable bundles of path→handler bindings.
//!
//! A [`Blueprint`] is purely declarative — it does no I/O and knows nothing
//! about servers or prefixes. You declare routes (and, optionally, a static
//! asset directory and a template directory), then hand the group to a
//! [`Registry`](crate::Registry), which decides where in the URL space it
//! lives. The same group definition can be mounted at `/`, `/api_v1`, or
//! wherever the next deployment wants it.

use std::path::PathBuf;

use crate::error::BlueprintError;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::paths;
use crate::static_files::StaticAssets;
use crate::templates::Templates;

/// One declared binding: method + group-local path + handler.
pub(crate) struct Route {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) handler: BoxedHandler,
}

/// A named group of routes, mountable under any prefix.
///
/// Paths are local to the group: register `/greeting` and let the mount
/// prefix decide whether it serves at `/greeting` or `/api_v1/greeting`.
///
/// ```rust,no_run
/// use plinth::{Blueprint, Method, Request, Response};
///
/// # async fn greeting(_: Request) -> Response { Response::text("") }
/// # fn main() -> Result<(), plinth::BlueprintError> {
/// let mut api = Blueprint::new("api");
/// api.route(Method::Get, "/greeting", greeting)?;
/// # Ok(())
/// # }
/// ```
pub struct Blueprint {
    name: String,
    routes: Vec<Route>,
    static_assets: Option<StaticAssets>,
    templates: Option<Templates>,
}

impl Blueprint {
    /// A new, empty group. The name is registration identity and shows up in
    /// conflict diagnostics; it plays no part in routing.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routes: Vec::new(),
            static_assets: None,
            templates: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a handler for a method + group-local path.
    ///
    /// Local paths are normalized to start with `/`; nothing else is
    /// rewritten — `/x` and `/x/` are distinct routes. Registering the same
    /// (method, path) pair twice is a configuration error.
    ///
    /// Returns `&mut Self`, so declarations chain:
    ///
    /// ```rust,no_run
    /// # use plinth::{Blueprint, Method, Request, Response};
    /// # async fn list(_: Request) -> Response { Response::text("") }
    /// # async fn create(_: Request) -> Response { Response::text("") }
    /// # fn main() -> Result<(), plinth::BlueprintError> {
    /// let mut api = Blueprint::new("api");
    /// api.route(Method::Get, "/users", list)?
    ///    .route(Method::Post, "/users", create)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn route(
        &mut self,
        method: Method,
        path: &str,
        handler: impl Handler,
    ) -> Result<&mut Self, BlueprintError> {
        let path = paths::normalize_local(path);
        if self.routes.iter().any(|r| r.method == method && r.path == path) {
            return Err(BlueprintError::DuplicateRoute {
                group: self.name.clone(),
                method,
                path,
            });
        }
        self.routes.push(Route {
            method,
            path,
            handler: handler.into_boxed(),
        });
        Ok(self)
    }

    /// Associates a static asset directory, served under `url_prefix`.
    ///
    /// The prefix is group-local and gets rebased under the mount prefix,
    /// exactly like route paths. At most one association per group; a second
    /// call is a configuration error.
    pub fn static_assets(
        &mut self,
        dir: impl Into<PathBuf>,
        url_prefix: &str,
    ) -> Result<&mut Self, BlueprintError> {
        if self.static_assets.is_some() {
            return Err(BlueprintError::StaticAssetsAlreadySet {
                group: self.name.clone(),
            });
        }
        self.static_assets = Some(StaticAssets::new(dir, url_prefix));
        Ok(self)
    }

    /// Associates a template directory and returns the rendering handle.
    ///
    /// The handle is cheap to clone; move a clone into whichever handlers
    /// render. The directory must exist, and a group gets at most one —
    /// both checked here, so a bad setup dies before the listener starts.
    ///
    /// ```rust,no_run
    /// use plinth::{Blueprint, Method, Response, liquid};
    ///
    /// # fn main() -> Result<(), plinth::BlueprintError> {
    /// let mut client = Blueprint::new("client");
    /// let templates = client.templates("client/templates")?;
    /// client.route(Method::Get, "/", move |_req| {
    ///     let templates = templates.clone();
    ///     async move {
    ///         match templates.render("index.html", &liquid::object!({})).await {
    ///             Ok(html) => Response::html(html),
    ///             Err(e) => {
    ///                 tracing::error!("render failed: {e}");
    ///                 Response::status(http::StatusCode::INTERNAL_SERVER_ERROR)
    ///             }
    ///         }
    ///     }
    /// })?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn templates(&mut self, dir: impl Into<PathBuf>) -> Result<Templates, BlueprintError> {
        if self.templates.is_some() {
            return Err(BlueprintError::TemplatesAlreadySet {
                group: self.name.clone(),
            });
        }
        let templates = Templates::new(dir)?;
        self.templates = Some(templates.clone());
        Ok(templates)
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Route>, Option<StaticAssets>) {
        (self.name, self.routes, self.static_assets)
    }
}

/// Handlers are opaque; everything else prints.
impl std::fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blueprint")
            .field("name", &self.name)
            .field("routes", &self.routes.len())
            .field("static_assets", &self.static_assets)
            .field("templates", &self.templates.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::response::Response;

    async fn ok(_req: Request) -> Response {
        Response::text("ok")
    }

    #[test]
    fn duplicate_route_is_rejected() {
        let mut bp = Blueprint::new("api");
        bp.route(Method::Get, "/greeting", ok).unwrap();
        let err = bp.route(Method::Get, "/greeting", ok).unwrap_err();
        assert!(matches!(
            err,
            BlueprintError::DuplicateRoute { group, method: Method::Get, path }
                if group == "api" && path == "/greeting"
        ));
    }

    #[test]
    fn normalization_catches_disguised_duplicates() {
        let mut bp = Blueprint::new("api");
        bp.route(Method::Get, "greeting", ok).unwrap();
        // "greeting" and "/greeting" are the same route after normalization.
        assert!(bp.route(Method::Get, "/greeting", ok).is_err());
    }

    #[test]
    fn trailing_slash_is_a_different_route() {
        let mut bp = Blueprint::new("api");
        bp.route(Method::Get, "/x", ok).unwrap();
        bp.route(Method::Get, "/x/", ok).unwrap();
        // Same path, different method is fine too.
        bp.route(Method::Post, "/x", ok).unwrap();
    }

    #[test]
    fn one_static_association_per_group() {
        let mut bp = Blueprint::new("client");
        bp.static_assets("client/static", "/client/static").unwrap();
        let err = bp.static_assets("other", "/other").unwrap_err();
        assert!(matches!(err, BlueprintError::StaticAssetsAlreadySet { .. }));
    }

    #[test]
    fn one_template_association_per_group() {
        let dir = tempfile::tempdir().unwrap();
        let mut bp = Blueprint::new("client");
        bp.templates(dir.path()).unwrap();
        let err = bp.templates(dir.path()).unwrap_err();
        assert!(matches!(err, BlueprintError::TemplatesAlreadySet { .. }));
    }
}
