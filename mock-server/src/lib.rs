use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{request_id::PropagateRequestIdLayer, trace::TraceLayer};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

/// Server behavior switches. The default server accepts anonymous requests.
#[derive(Clone, Debug, Default)]
pub struct AppOptions {
    /// When set, every `/api/v1` request must carry `Authorization: Bearer <token>`.
    pub required_token: Option<String>,
}

#[derive(Default)]
pub struct Users {
    last_id: i64,
    rows: BTreeMap<i64, User>,
}

pub type Db = Arc<RwLock<Users>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    options: Arc<AppOptions>,
}

/// Error answered in the `{"error": {...}}` envelope the client expects.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: serde_json::Value,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: json!({}),
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    fn not_found(id: i64) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", "User not found")
            .with_details(json!({ "user_id": id }))
    }

    /// `field` names the input that collided, echoed with its value.
    fn conflict(message: &str, field: &str, value: &str) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message).with_details(json!({ field: value }))
    }

    fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message)
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Unauthorized")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let code = if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY {
            "VALIDATION_ERROR"
        } else {
            "BAD_REQUEST"
        };
        Self::new(rejection.status(), code, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code,
                "message": self.message,
                "details": self.details,
            }
        });
        (self.status, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    app_with(AppOptions::default())
}

pub fn app_with(options: AppOptions) -> Router {
    let state = AppState {
        db: Db::default(),
        options: Arc::new(options),
    };
    let api = Router::new()
        .route("/api/v1/users", get(list_users).post(create_user))
        .route(
            "/api/v1/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, options: AppOptions) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(options)).await
}

async fn require_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = state.options.required_token.as_deref() {
        let presented = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(expected) {
            tracing::warn!("rejecting request without a valid bearer token");
            return Err(ApiError::unauthorized());
        }
    }
    Ok(next.run(req).await)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_users(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Json<Vec<User>> {
    let users = state.db.read().await;
    Json(users.rows.values().skip(q.skip).take(q.limit).cloned().collect())
}

async fn create_user(
    State(state): State<AppState>,
    input: Result<Json<CreateUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(input) = input?;
    validate_email(&input.email)?;
    validate_username(&input.username)?;
    validate_password(&input.password)?;
    if let Some(name) = &input.full_name {
        validate_full_name(name)?;
    }

    let mut users = state.db.write().await;
    if users.rows.values().any(|u| u.email == input.email) {
        return Err(ApiError::conflict("Email already registered", "email", &input.email));
    }
    if users.rows.values().any(|u| u.username == input.username) {
        return Err(ApiError::conflict("Username already taken", "username", &input.username));
    }

    users.last_id += 1;
    let now = Utc::now();
    let user = User {
        id: users.last_id,
        email: input.email,
        username: input.username,
        full_name: input.full_name,
        is_active: true,
        is_superuser: false,
        created_at: now,
        updated_at: now,
    };
    users.rows.insert(user.id, user.clone());
    tracing::info!(user_id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let users = state.db.read().await;
    users
        .rows
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(id))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: Result<Json<UpdateUser>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(input) = input?;
    let mut users = state.db.write().await;
    if !users.rows.contains_key(&id) {
        return Err(ApiError::not_found(id));
    }

    if let Some(email) = &input.email {
        validate_email(email)?;
        if users.rows.values().any(|u| u.id != id && &u.email == email) {
            return Err(ApiError::conflict("Email already in use", "email", email));
        }
    }
    if let Some(username) = &input.username {
        validate_username(username)?;
        if users.rows.values().any(|u| u.id != id && &u.username == username) {
            return Err(ApiError::conflict("Username already taken", "username", username));
        }
    }
    if let Some(password) = &input.password {
        validate_password(password)?;
    }
    if let Some(name) = &input.full_name {
        validate_full_name(name)?;
    }

    let user = users.rows.get_mut(&id).ok_or_else(|| ApiError::not_found(id))?;
    if let Some(email) = input.email {
        user.email = email;
    }
    if let Some(username) = input.username {
        user.username = username;
    }
    if let Some(name) = input.full_name {
        user.full_name = Some(name);
    }
    user.updated_at = Utc::now();
    tracing::info!(user_id = id, "user updated");
    Ok(Json(user.clone()))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let mut users = state.db.write().await;
    users.rows.remove(&id).ok_or_else(|| ApiError::not_found(id))?;
    tracing::info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ApiError::validation("value is not a valid email address")),
    }
}

fn validate_username(username: &str) -> Result<(), ApiError> {
    let len = username.chars().count();
    if (3..=50).contains(&len) {
        Ok(())
    } else {
        Err(ApiError::validation("username must be between 3 and 50 characters"))
    }
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= 8 {
        Ok(())
    } else {
        Err(ApiError::validation("password must be at least 8 characters"))
    }
}

fn validate_full_name(name: &str) -> Result<(), ApiError> {
    if name.chars().count() <= 100 {
        Ok(())
    } else {
        Err(ApiError::validation("full name must be at most 100 characters"))
    }
}
