//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Bind each route to its required capability (privilege gate route layer)
//! - Wire up middleware (request ID, tracing, metrics, timeout, body limit)
//! - JSON error bodies for unknown routes, wrong methods and layer rejections
//! - Serve on a listener until the shutdown broadcast fires

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::access::AccessResolver;
use crate::auth::{capability, privilege_gate, PrivilegeGate};
use crate::config::ApiConfig;
use crate::http::handlers::{comments, grants, todolists, todos};
use crate::http::{request, response};
use crate::observability::metrics;
use crate::store::TodoStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    pub access: AccessResolver,
}

impl AppState {
    pub fn new(config: &ApiConfig, store: Arc<dyn TodoStore>) -> Self {
        let access = AccessResolver::new(store.clone(), config.access);
        Self { store, access }
    }
}

/// HTTP server for the todo API.
pub struct HttpServer {
    router: Router,
    config: ApiConfig,
}

impl HttpServer {
    /// Create a new HTTP server over the given store.
    pub fn new(config: ApiConfig, store: Arc<dyn TodoStore>) -> Self {
        let state = AppState::new(&config, store);
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ApiConfig, state: AppState) -> Router {
        let settings = Arc::new(config.auth.clone());
        let gate = |required: &'static str| {
            middleware::from_fn_with_state(PrivilegeGate::new(settings.clone(), required), privilege_gate)
        };

        let api = Router::new()
            .route(
                "/todolists",
                post(todolists::create_todo_list).route_layer(gate(capability::TODOLIST_CREATE)),
            )
            .route(
                "/todolists",
                get(todolists::list_todo_lists).route_layer(gate(capability::TODOLIST_READ)),
            )
            .route(
                "/todolists/{id}",
                get(todolists::get_todo_list).route_layer(gate(capability::TODOLIST_READ)),
            )
            .route(
                "/todolists/{id}",
                delete(todolists::delete_todo_list).route_layer(gate(capability::TODOLIST_DELETE)),
            )
            .route(
                "/todolists/{id}/todos",
                post(todolists::create_todo).route_layer(gate(capability::TODOLIST_CREATE)),
            )
            .route(
                "/todolists/{id}/access",
                get(grants::list_grants)
                    .post(grants::grant_access)
                    .route_layer(gate(capability::TODOLIST_SHARE)),
            )
            .route(
                "/todolists/{id}/access/{user_id}",
                delete(grants::revoke_access).route_layer(gate(capability::TODOLIST_SHARE)),
            )
            .route(
                "/todos/{id}",
                get(todos::get_todo).route_layer(gate(capability::TODOLIST_READ)),
            )
            .route(
                "/todos/{id}",
                patch(todos::update_todo).route_layer(gate(capability::TODO_UPDATE)),
            )
            .route(
                "/todos/{id}",
                delete(todos::delete_todo).route_layer(gate(capability::TODO_DELETE)),
            )
            .route(
                "/todos/{id}/comments",
                post(todos::create_comment).route_layer(gate(capability::TODOLIST_COMMENT)),
            )
            .route(
                "/comments/{id}",
                delete(comments::delete_comment).route_layer(gate(capability::COMMENT_DELETE)),
            )
            .method_not_allowed_fallback(response::method_not_allowed)
            .route_layer(middleware::from_fn(metrics::track_metrics))
            .with_state(state);

        let router = if config.listener.base_path.is_empty() {
            api
        } else {
            Router::new().nest(&config.listener.base_path, api)
        };

        router
            .fallback(response::not_found)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::map_response(response::error_body_for_layer_rejections))
            .layer(TraceLayer::new_for_http().make_span_with(request::make_request_span))
            .layer(request::propagate_request_id_layer())
            .layer(request::set_request_id_layer())
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            base_path = %self.config.listener.base_path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
