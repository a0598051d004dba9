//! Route collections mountable by the application assembler.

pub mod system;

use axum::handler::Handler;
use axum::http::Method;
use axum::routing::{self, MethodRouter};
use utoipa::openapi::{OpenApi, OpenApiBuilder};

pub use system::SystemRoutes;

/// A single endpoint: method, path relative to the mount prefix, and handler.
pub struct Route {
    /// HTTP method served.
    pub method: Method,
    /// Path relative to the mount prefix, starting with `/`.
    pub path: &'static str,
    /// Handler wired for `method`.
    pub handler: MethodRouter,
}

impl Route {
    /// GET endpoint.
    pub fn get<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self {
            method: Method::GET,
            path,
            handler: routing::get(handler),
        }
    }

    /// POST endpoint.
    pub fn post<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self {
            method: Method::POST,
            path,
            handler: routing::post(handler),
        }
    }
}

/// A named group of endpoints that can be mounted under a path prefix.
pub trait RouteCollection: Send + Sync {
    /// Name used in the route table and logs.
    fn name(&self) -> &'static str;

    /// Endpoints in this collection, paths relative to the mount prefix.
    fn routes(&self) -> Vec<Route>;

    /// API documentation for the endpoints, paths relative to the mount prefix.
    fn openapi(&self) -> OpenApi {
        OpenApiBuilder::new().build()
    }
}

/// Collections mounted by [`crate::app::create_app`], in mount order.
pub fn default_collections() -> Vec<Box<dyn RouteCollection>> {
    vec![Box::new(SystemRoutes)]
}
