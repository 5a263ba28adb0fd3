//! Routes mapping HTTP requests onto pipeline request kinds.

use std::any::Any;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{header, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any as AnyOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};
use webterm_core::{Envelope, Pipeline, GENERIC_ERROR};

use crate::error::ServerError;
use crate::host::Caller;
use crate::settings::ServerSettings;
use crate::wire::{
    parse_body, parse_required_body, CommandsResponse, CompleteResponse, InputBody, JobQuery,
    UploadBody,
};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub settings: Arc<ServerSettings>,
}

/// Builds the terminal's router with tracing, panic, body limit and
/// optional CORS layers.
pub fn router(pipeline: Pipeline, settings: ServerSettings) -> Router {
    let display_exceptions = pipeline.services().settings().display_exceptions;
    let body_limit = settings.max_request_body_size;
    let cors = settings.enable_cors.then(|| cors_layer(&settings.allow_origins));
    let base_path = settings.normalized_base_path();

    let state = AppState {
        pipeline,
        settings: Arc::new(settings),
    };

    let api = Router::new()
        .route("/api/initialize", post(initialize))
        .route("/api/request", post(request))
        .route("/api/job", post(job))
        .route("/api/commands", get(commands))
        .route("/api/complete", post(complete))
        .route("/api/upload", post(upload))
        .with_state(state);

    let mut app = if base_path.is_empty() {
        api
    } else {
        Router::new().nest(&base_path, api)
    };

    app = app
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CatchPanicLayer::custom(move |payload| {
            panic_response(payload, display_exceptions)
        }));
    if let Some(cors) = cors {
        app = app.layer(cors);
    }
    app.layer(TraceLayer::new_for_http())
}

async fn initialize(State(state): State<AppState>, Caller(host): Caller) -> Json<Envelope> {
    Json(state.pipeline.initialize(&host))
}

async fn request(
    State(state): State<AppState>,
    Caller(host): Caller,
    body: Bytes,
) -> Result<Json<Envelope>, ServerError> {
    let body: InputBody = parse_body(&body)?;
    let execution = state.pipeline.execute(&body.input, host).await;
    debug!(
        target: "webterm",
        stage = %execution.stage,
        status = execution.status.map(|s| s.status),
        "command request"
    );
    Ok(Json(execution.envelope))
}

async fn job(
    State(state): State<AppState>,
    Caller(host): Caller,
    Query(query): Query<JobQuery>,
    body: Bytes,
) -> Result<Json<Envelope>, ServerError> {
    let key = query
        .key
        .filter(|key| !key.is_empty())
        .ok_or(ServerError::MissingParameter("key"))?;
    let body: InputBody = parse_body(&body)?;

    let execution = state.pipeline.run_job(&key, &body.input, host).await;
    if let Err(err) = &execution.outcome {
        debug!(target: "webterm", key = %key, error = %err, "job request failed");
    }
    Ok(Json(execution.envelope))
}

async fn commands(State(state): State<AppState>, Caller(host): Caller) -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: state.pipeline.help_entries(&host),
    })
}

async fn complete(
    State(state): State<AppState>,
    Caller(host): Caller,
    body: Bytes,
) -> Result<Json<CompleteResponse>, ServerError> {
    let body: InputBody = parse_body(&body)?;
    Ok(Json(CompleteResponse {
        matches: state.pipeline.complete(&body.input, &host),
    }))
}

async fn upload(
    State(state): State<AppState>,
    Caller(host): Caller,
    body: Bytes,
) -> Result<Json<Envelope>, ServerError> {
    let body: UploadBody = parse_required_body(&body)?;
    let file = body.into_upload()?;
    Ok(Json(state.pipeline.upload(file, host).await))
}

fn cors_layer(allow_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    target: "webterm",
                    origin = %origin,
                    error = %err,
                    "ignoring invalid CORS origin"
                );
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(AnyOrigin)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

fn panic_response(payload: Box<dyn Any + Send + 'static>, display_exceptions: bool) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    };
    error!(target: "webterm", message = %detail, "request handler panicked");

    let text = if display_exceptions {
        format!("request handler panicked: {detail}")
    } else {
        GENERIC_ERROR.to_string()
    };
    ServerError::Internal(text).into_response()
}
