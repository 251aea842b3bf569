//! Handler trait and type erasure.
//!
//! A [`Blueprint`](crate::Blueprint) has to hold handlers of *different*
//! concrete types in one collection, so registration erases them behind a
//! trait object:
//!
//! ```text
//! async fn greeting(req: Request) -> Response      ← what you write
//!     → Handler::into_boxed (blanket impl)
//!     → Arc<dyn ErasedHandler>                     ← what the table stores
//!     → handler.call(req) at dispatch              ← one vtable hop,
//!                                                    one Arc clone
//! ```
//!
//! The per-request cost is an atomic increment and a virtual call — noise
//! next to the network I/O around it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future resolving to a [`Response`].
///
/// Pinned because the runtime polls it in place; `Send + 'static` so tokio
/// may move it across worker threads.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` only because it leaks into
/// the signature of [`Handler::into_boxed`]; there is nothing useful an
/// external crate can do with it.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler, shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// Never implemented by hand — any function (or closure) shaped
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// satisfies it through the blanket impl. The trait is sealed so the erasure
/// machinery stays an implementation detail.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a concrete handler `F` into the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
