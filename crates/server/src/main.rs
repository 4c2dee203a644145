// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod config;
mod session;


use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, Query, State as AxumState},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use clap::Parser;
use complaint_desk_api::{
    ApiError, AppendNoteRequest, AttemptStore, ChangePasswordRequest, ComplaintInfo,
    ComplaintReport, ComplaintRequest, CreateFirstAdminRequest, CreateUserRequest,
    DashboardResponse, DeleteResponse, InMemoryAttemptStore, ListComplaintsQuery,
    ListComplaintsResponse, ListLogsResponse, ListUsersResponse, LoginRequest, LoginResponse,
    MessageResponse, ResetPasswordRequest, SetStatusRequest, UpdateUserRequest, UserInfo,
    WhoAmIResponse,
};
use complaint_desk_domain::{MAX_ATTACHMENT_BYTES, MAX_ATTACHMENTS};
use complaint_desk_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::{Args, ServerConfig};
use crate::session::SessionUser;

/// Largest accepted request body: five maximum-size attachments after
/// base64 expansion, plus the rest of the complaint.
const MAX_REQUEST_BODY_BYTES: usize =
    MAX_ATTACHMENTS * MAX_ATTACHMENT_BYTES.div_ceil(3) * 4 + 1024 * 1024;

/// How often expired sessions and stale login records are purged.
const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3600);

/// Application state shared across handlers.
///
/// Locks are always taken persistence first, then the attempt store.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// Failed-login records.
    attempts: Arc<Mutex<Box<dyn AttemptStore>>>,
    /// Session, throttle and time zone settings.
    config: ServerConfig,
}

/// Query parameters for the activity log.
#[derive(Debug, Deserialize)]
struct LogsQuery {
    /// Maximum number of entries, clamped to 100.
    limit: Option<usize>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
    /// Seconds for the `Retry-After` header, if any.
    retry_after: Option<i64>,
}

impl HttpError {
    const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            retry_after: None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        let mut response: Response = (self.status, body).into_response();
        if let Some(seconds) = self.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited {
                retry_after_seconds,
            } => {
                return Self {
                    status: StatusCode::TOO_MANY_REQUESTS,
                    message: err.to_string(),
                    retry_after: Some(*retry_after_seconds),
                };
            }
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidInput { .. } | ApiError::PasswordPolicyViolation { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

// ========================================================================
// Authentication
// ========================================================================

/// Handler for POST `/auth/login`.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let mut attempts = app_state.attempts.lock().await;
    let response: LoginResponse = complaint_desk_api::login(
        &mut persistence,
        &mut **attempts,
        &app_state.config.auth,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/auth/logout`.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, token): SessionUser,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse =
        complaint_desk_api::logout(&mut persistence, &user, &token, OffsetDateTime::now_utc())?;
    Ok(Json(response))
}

/// Handler for GET `/auth/me`.
async fn handle_whoami(
    SessionUser(user, _): SessionUser,
) -> Result<Json<WhoAmIResponse>, HttpError> {
    Ok(Json(complaint_desk_api::whoami(&user)?))
}

/// Handler for POST `/auth/password`.
async fn handle_change_password(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let mut attempts = app_state.attempts.lock().await;
    let response: MessageResponse = complaint_desk_api::change_password(
        &mut persistence,
        &mut **attempts,
        &app_state.config.auth.throttle,
        &user,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/bootstrap/admin`.
async fn handle_create_first_admin(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateFirstAdminRequest>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: UserInfo =
        complaint_desk_api::create_first_admin(&mut persistence, &req, OffsetDateTime::now_utc())?;
    info!(username = %response.username, "First administrator bootstrapped");
    Ok(Json(response))
}

// ========================================================================
// Users
// ========================================================================

/// Handler for GET `/users`.
async fn handle_list_users(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
) -> Result<Json<ListUsersResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(complaint_desk_api::list_users(&mut persistence, &user)?))
}

/// Handler for POST `/users`.
async fn handle_create_user(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: UserInfo =
        complaint_desk_api::create_user(&mut persistence, &user, &req, OffsetDateTime::now_utc())?;
    Ok(Json(response))
}

/// Handler for PUT `/users/{id}`.
async fn handle_update_user(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: UserInfo = complaint_desk_api::update_user(
        &mut persistence,
        &user,
        user_id,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for DELETE `/users/{id}`.
async fn handle_delete_user(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Path(user_id): Path<i64>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse = complaint_desk_api::delete_user(
        &mut persistence,
        &user,
        user_id,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/users/{id}/password`.
async fn handle_reset_password(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Path(user_id): Path<i64>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse = complaint_desk_api::reset_password(
        &mut persistence,
        &user,
        user_id,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

// ========================================================================
// Complaints
// ========================================================================

/// Handler for GET `/complaints`.
async fn handle_list_complaints(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Query(query): Query<ListComplaintsQuery>,
) -> Result<Json<ListComplaintsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListComplaintsResponse =
        complaint_desk_api::list_complaints(&mut persistence, &user, &query)?;
    Ok(Json(response))
}

/// Handler for POST `/complaints`.
async fn handle_create_complaint(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Json(req): Json<ComplaintRequest>,
) -> Result<Json<ComplaintInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ComplaintInfo = complaint_desk_api::create_complaint(
        &mut persistence,
        &user,
        &req,
        app_state.config.time_zone,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for GET `/complaints/{id}`.
async fn handle_get_complaint(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Path(complaint_id): Path<i64>,
) -> Result<Json<ComplaintInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(complaint_desk_api::get_complaint(
        &mut persistence,
        &user,
        complaint_id,
    )?))
}

/// Handler for PUT `/complaints/{id}`.
async fn handle_update_complaint(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Path(complaint_id): Path<i64>,
    Json(req): Json<ComplaintRequest>,
) -> Result<Json<ComplaintInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ComplaintInfo = complaint_desk_api::update_complaint(
        &mut persistence,
        &user,
        complaint_id,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for DELETE `/complaints/{id}`.
///
/// Always answers 200; `deleted` tells whether anything was removed.
async fn handle_delete_complaint(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Path(complaint_id): Path<i64>,
) -> Result<Json<DeleteResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: DeleteResponse = complaint_desk_api::delete_complaint(
        &mut persistence,
        &user,
        complaint_id,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/complaints/{id}/status`.
async fn handle_set_status(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Path(complaint_id): Path<i64>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<ComplaintInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ComplaintInfo = complaint_desk_api::set_status(
        &mut persistence,
        &user,
        complaint_id,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for POST `/complaints/{id}/notes`.
async fn handle_append_note(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Path(complaint_id): Path<i64>,
    Json(req): Json<AppendNoteRequest>,
) -> Result<Json<ComplaintInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ComplaintInfo = complaint_desk_api::append_note(
        &mut persistence,
        &user,
        complaint_id,
        &req,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for DELETE `/complaints/{id}/notes/{note_id}`.
async fn handle_retract_note(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Path((complaint_id, note_id)): Path<(i64, i64)>,
) -> Result<Json<ComplaintInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ComplaintInfo = complaint_desk_api::retract_note(
        &mut persistence,
        &user,
        complaint_id,
        note_id,
        OffsetDateTime::now_utc(),
    )?;
    Ok(Json(response))
}

/// Handler for GET `/complaints/{id}/report`.
async fn handle_complaint_report(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_, _): SessionUser,
    Path(complaint_id): Path<i64>,
) -> Result<Json<ComplaintReport>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(complaint_desk_api::complaint_report(
        &mut persistence,
        complaint_id,
    )?))
}

/// Handler for GET `/complaints/export.csv`.
async fn handle_export_csv(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_, _): SessionUser,
    Query(query): Query<ListComplaintsQuery>,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let csv: String =
        complaint_desk_api::export_complaints_csv(&mut persistence, &query)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"complaints.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

// ========================================================================
// Dashboard and activity log
// ========================================================================

/// Handler for GET `/dashboard`.
async fn handle_dashboard(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_, _): SessionUser,
) -> Result<Json<DashboardResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(complaint_desk_api::dashboard(&mut persistence)?))
}

/// Handler for GET `/logs`.
async fn handle_list_logs(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Query(query): Query<LogsQuery>,
) -> Result<Json<ListLogsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListLogsResponse =
        complaint_desk_api::list_logs(&mut persistence, &user, query.limit)?;
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/me", get(handle_whoami))
        .route("/auth/password", post(handle_change_password))
        .route("/bootstrap/admin", post(handle_create_first_admin))
        .route("/users", get(handle_list_users).post(handle_create_user))
        .route(
            "/users/{id}",
            put(handle_update_user).delete(handle_delete_user),
        )
        .route("/users/{id}/password", post(handle_reset_password))
        .route(
            "/complaints",
            get(handle_list_complaints).post(handle_create_complaint),
        )
        .route("/complaints/export.csv", get(handle_export_csv))
        .route(
            "/complaints/{id}",
            get(handle_get_complaint)
                .put(handle_update_complaint)
                .delete(handle_delete_complaint),
        )
        .route("/complaints/{id}/status", post(handle_set_status))
        .route("/complaints/{id}/notes", post(handle_append_note))
        .route(
            "/complaints/{id}/notes/{note_id}",
            delete(handle_retract_note),
        )
        .route("/complaints/{id}/report", get(handle_complaint_report))
        .route("/dashboard", get(handle_dashboard))
        .route("/logs", get(handle_list_logs))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .with_state(app_state)
}

/// Removes expired sessions and stale failed-login records.
async fn sweep_expired(app_state: &AppState, now: OffsetDateTime) {
    {
        let mut persistence = app_state.persistence.lock().await;
        match persistence.delete_expired_sessions(now) {
            Ok(0) => {}
            Ok(removed) => info!(removed, "Expired sessions removed"),
            Err(e) => error!(error = %e, "Failed to remove expired sessions"),
        }
    }

    let mut attempts = app_state.attempts.lock().await;
    match app_state
        .config
        .auth
        .throttle
        .purge_expired(&mut **attempts, now)
    {
        Ok(0) => {}
        Ok(removed) => info!(removed, "Stale login attempt records removed"),
        Err(e) => error!(error = %e, "Failed to remove stale login attempt records"),
    }
}

/// Runs [`sweep_expired`] on a fixed interval.
async fn run_sweeper(app_state: AppState) {
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        sweep_expired(&app_state, OffsetDateTime::now_utc()).await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Complaint Desk server");

    let config: ServerConfig = args.server_config()?;

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        warn!("Using in-memory database; all data is lost on exit");
        Persistence::new_in_memory()?
    };

    let attempts: Box<dyn AttemptStore> = match (&args.database, args.persistent_throttle) {
        (Some(db_path), true) => {
            info!("Login throttle records stored in the database");
            Box::new(Persistence::new_with_file(db_path)?)
        }
        _ => Box::new(InMemoryAttemptStore::new()),
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        attempts: Arc::new(Mutex::new(attempts)),
        config,
    };

    tokio::spawn(run_sweeper(app_state.clone()));

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
