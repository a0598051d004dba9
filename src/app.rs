//! Application assembly: metadata, CORS and route mounting.

use std::fmt;

use axum::http::Method;
use axum::routing::{self, MethodRouter};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};
use utoipa::openapi::{Info, OpenApi, OpenApiBuilder};

use crate::config::{get_settings, Settings};
use crate::cors::CorsPolicy;
use crate::error::ConfigError;
use crate::routes::{default_collections, RouteCollection};

/// Prefix every route collection is mounted under.
pub const API_PREFIX: &str = "/api";

/// Path serving the OpenAPI document.
pub const OPENAPI_PATH: &str = "/openapi.json";

/// One mounted endpoint in an application's route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Name of the collection that contributed the route.
    pub collection: &'static str,
    /// HTTP method.
    pub method: Method,
    /// Full path including the mount prefix.
    pub path: String,
}

/// An assembled web application, ready to be served.
pub struct Application {
    title: String,
    version: String,
    cors: CorsPolicy,
    routes: Vec<RouteEntry>,
    openapi: OpenApi,
    router: Router,
}

impl Application {
    /// Display name.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Display version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// CORS policy attached to the router.
    pub fn cors(&self) -> &CorsPolicy {
        &self.cors
    }

    /// Mounted routes, in mount order.
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// OpenAPI document describing the mounted routes.
    pub fn openapi(&self) -> &OpenApi {
        &self.openapi
    }

    /// OpenAPI document rendered as pretty-printed JSON.
    pub fn openapi_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(&self.openapi)?)
    }

    /// A handle to the router, e.g. for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Consume the application and return its router for serving.
    pub fn into_router(self) -> Router {
        self.router
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("title", &self.title)
            .field("version", &self.version)
            .field("cors", &self.cors)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

/// Build the application from the process settings and the default route
/// collections.
///
/// Fails only if the settings cannot be loaded.
pub fn create_app() -> Result<Application, ConfigError> {
    let settings = get_settings()?;
    Ok(assemble(settings, &default_collections()))
}

/// Build an application from explicit settings and an ordered list of route
/// collections, all mounted under [`API_PREFIX`].
///
/// A route whose method and path are already mounted is skipped; the first
/// collection to claim it wins.
pub fn assemble(settings: &Settings, collections: &[Box<dyn RouteCollection>]) -> Application {
    let cors = CorsPolicy::from_settings(settings);
    debug!(origins = ?cors.allowed_origins, "CORS allow-list");

    let mut table: Vec<RouteEntry> = Vec::new();
    let mut mounted: Vec<(String, MethodRouter)> = Vec::new();
    let mut openapi = OpenApiBuilder::new()
        .info(Info::new(settings.api_title.clone(), settings.api_version.clone()))
        .build();

    for collection in collections {
        let name = collection.name();

        for route in collection.routes() {
            let path = format!("{API_PREFIX}{}", route.path);

            if table
                .iter()
                .any(|entry| entry.path == path && entry.method == route.method)
            {
                warn!(
                    collection = name,
                    method = %route.method,
                    path = %path,
                    "Route already mounted, skipping"
                );
                continue;
            }

            table.push(RouteEntry {
                collection: name,
                method: route.method,
                path: path.clone(),
            });

            match mounted.iter_mut().find(|(p, _)| *p == path) {
                Some((_, existing)) => {
                    let current = std::mem::replace(existing, MethodRouter::new());
                    *existing = current.merge(route.handler);
                }
                None => mounted.push((path, route.handler)),
            }
        }

        openapi = openapi.nest(API_PREFIX, collection.openapi());
        debug!(collection = name, prefix = API_PREFIX, "Mounted route collection");
    }

    let doc = openapi.clone();
    let router = mounted
        .into_iter()
        .fold(Router::new(), |router, (path, handler)| router.route(&path, handler))
        .route(
            OPENAPI_PATH,
            routing::get(move || {
                let doc = doc.clone();
                async move { Json(doc) }
            }),
        )
        .layer(cors.layer())
        .layer(TraceLayer::new_for_http());

    Application {
        title: settings.api_title.clone(),
        version: settings.api_version.clone(),
        cors,
        routes: table,
        openapi,
        router,
    }
}
