//! Typed calls for the user resource.
//!
//! # Design
//! Each operation is split into a pure `build_*` function that produces the
//! `HttpRequest` and an async method that sends it through `HttpClient`.
//! Nothing here inspects status codes; success and failure semantics come
//! from the client's interceptors.

use crate::client::HttpClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{ListParams, User, UserCreate, UserUpdate};

pub const USERS_PATH: &str = "/api/v1/users";

pub fn build_list_users(params: Option<ListParams>) -> HttpRequest {
    let mut req = HttpRequest::new(HttpMethod::Get, USERS_PATH);
    req.query = params.map(ListParams::to_query).unwrap_or_default();
    req
}

pub fn build_get_user(id: i64) -> HttpRequest {
    HttpRequest::new(HttpMethod::Get, format!("{USERS_PATH}/{id}"))
}

pub fn build_create_user(input: &UserCreate) -> Result<HttpRequest, ApiError> {
    let mut req = HttpRequest::new(HttpMethod::Post, USERS_PATH);
    req.body = Some(to_json(input)?);
    Ok(req)
}

pub fn build_update_user(id: i64, input: &UserUpdate) -> Result<HttpRequest, ApiError> {
    let mut req = HttpRequest::new(HttpMethod::Put, format!("{USERS_PATH}/{id}"));
    req.body = Some(to_json(input)?);
    Ok(req)
}

pub fn build_delete_user(id: i64) -> HttpRequest {
    HttpRequest::new(HttpMethod::Delete, format!("{USERS_PATH}/{id}"))
}

fn to_json<T: serde::Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Client for `/api/v1/users`.
#[derive(Clone)]
pub struct UsersApi {
    http: HttpClient,
}

impl UsersApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Users in server order. `skip`/`limit` are passed through untouched.
    pub async fn list(&self, params: Option<ListParams>) -> Result<Vec<User>, ApiError> {
        self.http.request(build_list_users(params)).await
    }

    pub async fn get(&self, id: i64) -> Result<User, ApiError> {
        self.http.request(build_get_user(id)).await
    }

    pub async fn create(&self, input: &UserCreate) -> Result<User, ApiError> {
        self.http.request(build_create_user(input)?).await
    }

    pub async fn update(&self, id: i64, input: &UserUpdate) -> Result<User, ApiError> {
        self.http.request(build_update_user(id, input)?).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.http.request(build_delete_user(id)).await
    }
}
