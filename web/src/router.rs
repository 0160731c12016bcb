use crate::{controller::health_check_controller, live, params, AppState};
use axum::http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::{
    routing::{delete, get, post},
    Router,
};
use log::*;
use tower_http::cors::CorsLayer;

use crate::controller::{
    connection_controller, connection_request_controller, live_token_controller,
    notification_controller, user_controller,
};

use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Connect Platform API"
        ),
        paths(
            connection_request_controller::create,
            connection_request_controller::index,
            connection_request_controller::accept,
            connection_request_controller::reject,
            connection_controller::index,
            connection_controller::delete,
            notification_controller::index,
            notification_controller::mark_read,
            notification_controller::mark_all_read,
            user_controller::search,
            live_token_controller::create,
            health_check_controller::health_check,
        ),
        components(
            schemas(
                domain::connection_requests::Model,
                domain::connections::Model,
                domain::notifications::Model,
                domain::users::Model,
                domain::status::RequestStatus,
                domain::connection_request::Direction,
                domain::jwt::Jwt,
                params::connection_request::CreateParams,
                params::connection_request::MemberIdParam,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "connect_platform", description = "Professional connection platform API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our bearer token authentication requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state);

    Router::new()
        .merge(connection_request_routes(app_state.clone()))
        .merge(connection_routes(app_state.clone()))
        .merge(notification_routes(app_state.clone()))
        .merge(user_routes(app_state.clone()))
        .merge(live_token_routes(app_state.clone()))
        .merge(live_routes(app_state))
        .merge(health_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .layer(cors)
}

fn connection_request_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/connection_requests",
            post(connection_request_controller::create),
        )
        .route(
            "/connection_requests",
            get(connection_request_controller::index),
        )
        .route(
            "/connection_requests/{id}/accept",
            post(connection_request_controller::accept),
        )
        .route(
            "/connection_requests/{id}/reject",
            post(connection_request_controller::reject),
        )
        .with_state(app_state)
}

fn connection_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/connections", get(connection_controller::index))
        .route("/connections/{id}", delete(connection_controller::delete))
        .with_state(app_state)
}

fn notification_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/notifications", get(notification_controller::index))
        .route(
            "/notifications/{id}/mark_read",
            post(notification_controller::mark_read),
        )
        .route(
            "/notifications/mark_all_read",
            post(notification_controller::mark_all_read),
        )
        .with_state(app_state)
}

fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/users/search", get(user_controller::search))
        .with_state(app_state)
}

fn live_token_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/live_tokens", post(live_token_controller::create))
        .with_state(app_state)
}

// The WebSocket endpoint authenticates via a query-string token, not the
// Authorization header, so it sits outside the extractor-guarded routes.
fn live_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/notifications/ws", get(live::handler::live_handler))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn cors_layer(app_state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring unparseable CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-version"),
        ])
        .allow_origin(origins)
}
