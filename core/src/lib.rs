//! Async client core for the user-management service.
//!
//! # Overview
//! Layers, leaf first:
//! - `types`: the user entity and its create/update payloads.
//! - `client`: one shared `HttpClient` with request and response interceptors
//!   (bearer token, `X-Request-ID`, error classification and notices).
//! - `api`: one call per CRUD verb on `/api/v1/users`.
//! - `store`: observable state holders (`AppStore`, `UserStore`) whose actions
//!   call the API and reconcile the local collection.
//! - `router`: the path-to-view table.
//!
//! # Design
//! - Nothing is global. Build an `HttpClient` from a `ClientConfig`, hand it
//!   to `UsersApi`, and hand that to `UserStore`.
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`);
//!   the `Transport` trait is the only place that touches the network.
//! - Failures are classified once into `ApiError` and matched downstream.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod notify;
pub mod router;
pub mod store;
pub mod transport;
pub mod types;

pub use api::UsersApi;
pub use auth::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use client::HttpClient;
pub use config::ClientConfig;
pub use error::{ApiError, StorageError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notify::{ChannelNotifier, LogNotifier, Notice, NoticeLevel, Notifier};
pub use router::{Navigator, RouteTable, View};
pub use store::{AppStore, BusyCounter, UserStore};
pub use transport::{Transport, UreqTransport};
pub use types::{ListParams, User, UserCreate, UserUpdate};
