//! Verify request building and error classification against JSON test
//! vectors stored in `test-vectors/`.
//!
//! Comparing parsed JSON (not raw strings) avoids false negatives from
//! field-ordering differences.

mod common;

use std::sync::Arc;

use common::ScriptedTransport;
use user_admin_core::api::{
    build_create_user, build_delete_user, build_get_user, build_list_users, build_update_user,
};
use user_admin_core::{
    ApiError, ChannelNotifier, ClientConfig, HttpClient, HttpMethod, HttpRequest, ListParams,
    MemoryTokenStore, UserCreate, UserUpdate,
};

const BASE_URL: &str = "http://localhost:8000";

fn client() -> HttpClient {
    let (notifier, _rx) = ChannelNotifier::new();
    HttpClient::new(
        ClientConfig::with_base_url(BASE_URL),
        ScriptedTransport::new(),
        Arc::new(MemoryTokenStore::new()),
        Arc::new(notifier),
    )
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn build(case: &serde_json::Value) -> HttpRequest {
    let id = || case["id"].as_i64().unwrap();
    match case["op"].as_str().unwrap() {
        "list" => {
            let params = case.get("params").map(|p| ListParams {
                skip: p["skip"].as_u64().map(|v| v as u32),
                limit: p["limit"].as_u64().map(|v| v as u32),
            });
            build_list_users(params)
        }
        "get" => build_get_user(id()),
        "create" => {
            let input: UserCreate = serde_json::from_value(case["input"].clone()).unwrap();
            build_create_user(&input).unwrap()
        }
        "update" => {
            let input: UserUpdate = serde_json::from_value(case["input"].clone()).unwrap();
            build_update_user(id(), &input).unwrap()
        }
        "delete" => build_delete_user(id()),
        other => panic!("unknown op: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected_request"];

        let (req, request_id) = c.prepare(build(case)).unwrap();

        let method = parse_method(expected["method"].as_str().unwrap());
        assert_eq!(req.method, method, "{name}: method");
        let url = format!("{BASE_URL}{}", expected["path"].as_str().unwrap());
        assert_eq!(req.url, url, "{name}: url");

        let expected_query: Vec<(String, String)> =
            serde_json::from_value(expected["query"].clone()).unwrap();
        assert_eq!(req.query, expected_query, "{name}: query");

        assert_eq!(req.header("content-type"), Some("application/json"), "{name}: content-type");
        assert_eq!(req.header("x-request-id"), Some(request_id.as_str()), "{name}: request id");
        assert!(req.header("authorization").is_none(), "{name}: no token stored");

        match &req.body {
            Some(body) => {
                let body: serde_json::Value = serde_json::from_str(body).unwrap();
                assert_eq!(body, expected["body"], "{name}: body");
            }
            None => assert!(expected["body"].is_null(), "{name}: body should be absent"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error messages
// ---------------------------------------------------------------------------

#[test]
fn error_message_test_vectors() {
    let raw = include_str!("../../test-vectors/error_messages.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let body = case["body"].as_str().unwrap();
        let message = case["message"].as_str().unwrap().to_string();

        let err = ApiError::from_status(status, body);
        let expected = match case["kind"].as_str().unwrap() {
            "client" => ApiError::Client { status, message },
            "server" => ApiError::Server { status, message },
            other => panic!("unknown kind: {other}"),
        };
        assert_eq!(err, expected, "{name}");
    }
}
