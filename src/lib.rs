//! Portal tier of the blood-donation platform.
//!
//! Sits between the browser and the platform's REST backend: lists are fetched
//! once per page into baselines, filtered locally, and returned as display
//! models; mutations are validated here before a single backend call.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::{from_fn, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod backend;
pub mod config;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod filter;
pub mod models;
pub mod registration;
pub mod routes;
pub mod session;
pub mod status;
pub mod validation;
pub mod views;

use backend::BackendClient;
use config::Config;
use fetcher::BaselineStore;
use models::{BloodBank, BloodRequest, ContactMessage, Donor, Event};
use session::Session;

/// Event forms may carry an image.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// One baseline store per list page.
pub struct Baselines {
    pub donors: BaselineStore<Donor>,
    pub blood_banks: BaselineStore<BloodBank>,
    pub events: BaselineStore<Event>,
    pub requests: BaselineStore<BloodRequest>,
    pub messages: BaselineStore<ContactMessage>,
}

impl Default for Baselines {
    fn default() -> Self {
        Self {
            donors: BaselineStore::new("donors"),
            blood_banks: BaselineStore::new("blood banks"),
            events: BaselineStore::new("events"),
            requests: BaselineStore::new("blood requests"),
            messages: BaselineStore::new("contact messages"),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub backend: BackendClient,
    pub baselines: Arc<Baselines>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, error::AppError> {
        let backend = BackendClient::new(config.backend_url.as_str(), config.backend_timeout)?;
        Ok(Self {
            backend,
            baselines: Arc::new(Baselines::default()),
            config: Arc::new(config),
        })
    }
}

/// The full router without rate limiting; the binary adds the governor layer
/// since it needs the peer address from the connection.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.config.allowed_origins.clone())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/donors", get(routes::donors::list_donors))
        .route("/api/donors/export", get(routes::donors::export_donors))
        .route("/api/blood-banks", get(routes::blood_banks::list_blood_banks))
        .route("/api/blood-banks/{id}/stock", get(routes::blood_banks::blood_bank_stock))
        .route(
            "/api/events",
            get(routes::events::list_events)
                .post(routes::events::create_event)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/events/mine", get(routes::events::my_events))
        .route("/api/events/registered", get(routes::events::registered_events))
        .route(
            "/api/events/{id}",
            get(routes::events::get_event)
                .put(routes::events::update_event)
                .delete(routes::events::delete_event)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/events/{id}/registration", post(routes::events::toggle_registration))
        .route("/api/events/{id}/registrations", get(routes::events::event_registrations))
        .route("/api/admin/events", get(routes::events::admin_events))
        .route("/api/admin/events/{id}/approve", put(routes::events::approve_event))
        .route("/api/admin/events/{id}/reject", put(routes::events::reject_event))
        .route(
            "/api/blood-requests",
            get(routes::blood_requests::list_requests).post(routes::blood_requests::create_request),
        )
        .route("/api/contact", post(routes::contact::submit_message))
        .route("/api/contact/mine", get(routes::contact::my_messages))
        .route("/api/admin/messages", get(routes::contact::list_messages))
        .route("/api/admin/messages/export", get(routes::contact::export_messages))
        .route(
            "/api/admin/messages/{id}",
            put(routes::contact::update_message).delete(routes::contact::delete_message),
        )
        .route("/api/admin/messages/{id}/read", put(routes::contact::mark_read))
        .route("/api/admin/messages/{id}/notes", post(routes::contact::add_note))
        .route("/api/admin/messages/{id}/response", post(routes::contact::respond))
        .fallback_service(static_files)
        .layer(from_fn(require_session))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

/// Admin endpoints need some credential before anything is fetched; the
/// backend decides whether it is sufficient.
async fn require_session(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path();
    if req.method() == Method::OPTIONS || !path.starts_with("/api/admin/") {
        return next.run(req).await;
    }

    if Session::from_headers(req.headers()).is_authenticated() {
        return next.run(req).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": "Please log in to continue." })),
    )
        .into_response()
}

async fn health_check() -> &'static str {
    "OK"
}
