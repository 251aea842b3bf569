//! Error taxonomy.
//!
//! Two families, with different fates:
//!
//! - **Configuration-time** ([`BlueprintError`], [`MountError`]) — raised
//!   while the routing table is being declared. These are fatal: propagate
//!   them out of `main` and let startup abort. A process that boots with a
//!   broken table serves broken traffic.
//! - **Request-time** ([`DispatchError`]) — raised while serving. The server
//!   recovers these into structured responses (404, 405, 403, 500); they are
//!   never allowed to crash a connection task.

use std::path::PathBuf;

use thiserror::Error;

use crate::method::Method;

/// Errors raised while declaring routes and assets on a
/// [`Blueprint`](crate::Blueprint).
#[derive(Debug, Error)]
pub enum BlueprintError {
    /// The (method, path) pair is already bound in this group.
    #[error("duplicate route in group `{group}`: {method} {path} is already registered")]
    DuplicateRoute {
        group: String,
        method: Method,
        path: String,
    },

    /// The group already has a static asset directory associated.
    #[error("group `{group}` already serves static assets; only one directory per group")]
    StaticAssetsAlreadySet { group: String },

    /// The group already has a template directory associated.
    #[error("group `{group}` already has a template directory; only one per group")]
    TemplatesAlreadySet { group: String },

    /// The template directory could not be opened at registration time.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Errors raised while mounting groups into a [`Registry`](crate::Registry).
#[derive(Debug, Error)]
pub enum MountError {
    /// Two mounted groups resolve the same (method, path) pair.
    ///
    /// Reported at mount time, naming both groups, so a misconfigured table
    /// can never reach the serving phase.
    #[error(
        "route conflict: {method} {path} is registered by both `{first}` and `{second}`"
    )]
    RouteConflict {
        method: Method,
        path: String,
        first: String,
        second: String,
    },

    /// A group with this name is already mounted.
    ///
    /// Names are registration identity; mounting the same name twice is
    /// almost always a copy-paste error, so it is rejected outright.
    #[error("a group named `{name}` is already mounted")]
    GroupAlreadyMounted { name: String },

    /// `mount` or `finalize` was called after the registry was finalized.
    #[error("registry is already serving; mounts are only allowed before finalize()")]
    Finalized,
}

/// Request-time lookup failures, recovered into responses by the server.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// `dispatch` or `serve_static` was called on a registry that has not
    /// been finalized yet.
    #[error("registry is still building; call finalize() before dispatching")]
    NotFinalized,

    /// No route is registered under this path, for any method.
    #[error("no route matches the requested path")]
    NotFound,

    /// The path exists, but not under this method.
    ///
    /// Distinct from [`DispatchError::NotFound`] on purpose: "unknown path"
    /// and "unsupported method" are different answers in HTTP, and `allowed`
    /// (sorted) lets the host emit an `allow` header.
    #[error("method not allowed for this path")]
    MethodNotAllowed { allowed: Vec<Method> },

    /// The static request path tried to escape its asset directory.
    #[error("forbidden path: `{path}`")]
    Forbidden { path: String },

    /// The static file exists but could not be read.
    #[error("static file read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the template rendering path.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The configured template directory does not exist.
    #[error("template directory not found: {}", dir.display())]
    DirNotFound { dir: PathBuf },

    /// No template file with this name in the directory.
    #[error("template not found: `{name}`")]
    NotFound { name: String },

    /// The template name tried to escape the template directory.
    #[error("forbidden template name: `{name}`")]
    Forbidden { name: String },

    /// Parse or render failure from the template engine.
    #[error("template engine: {0}")]
    Engine(#[from] liquid::Error),

    /// The template file could not be read.
    #[error("template read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// The error type returned by [`Server::serve`](crate::Server::serve).
///
/// Routing misses are not errors — they become 404/405 responses. This type
/// surfaces infrastructure failures: binding the port, or being handed a
/// registry that was never finalized.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The registry passed to `serve` is still in its building phase.
    #[error("registry is still building: call finalize() before serve()")]
    NotFinalized,
}
