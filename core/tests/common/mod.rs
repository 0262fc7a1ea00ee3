#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc::UnboundedReceiver, Semaphore};
use user_admin_core::{
    ChannelNotifier, ClientConfig, HttpClient, HttpRequest, HttpResponse, MemoryTokenStore, Notice,
    Transport, TransportError, UserStore, UsersApi,
};

/// Transport that answers from a queue of canned replies and records every
/// request it sees. A gated transport holds each request until the test adds
/// a permit, so state can be inspected mid-flight.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    seen: Mutex<Vec<HttpRequest>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gated() -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let transport = Self {
            gate: Some(gate.clone()),
            ..Self::default()
        };
        (Arc::new(transport), gate)
    }

    pub fn reply(&self, status: u16, body: serde_json::Value) {
        let body = if body.is_null() { String::new() } else { body.to_string() };
        self.reply_raw(status, &body);
    }

    pub fn reply_raw(&self, status: u16, body: &str) {
        self.replies.lock().push_back(Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }));
    }

    pub fn fail(&self, message: &str) {
        self.replies
            .lock()
            .push_back(Err(TransportError(message.to_string())));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().clone()
    }

    pub async fn wait_for_requests(&self, n: usize) {
        while self.seen.lock().len() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let request_id = request.header("x-request-id").map(str::to_string);
        self.seen.lock().push(request);
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| TransportError(e.to_string()))?
                .forget();
        }
        let mut reply = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted reply".to_string())));
        if let (Ok(response), Some(id)) = (&mut reply, request_id) {
            response.headers.push(("x-request-id".to_string(), id));
        }
        reply
    }
}

pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub tokens: Arc<MemoryTokenStore>,
    pub notices: UnboundedReceiver<Notice>,
    pub store: Arc<UserStore>,
}

impl Harness {
    pub fn new(transport: Arc<ScriptedTransport>) -> Self {
        let tokens = Arc::new(MemoryTokenStore::new());
        let (notifier, notices) = ChannelNotifier::new();
        let notifier = Arc::new(notifier);
        let http = HttpClient::new(
            ClientConfig::default(),
            transport.clone(),
            tokens.clone(),
            notifier.clone(),
        );
        let store = Arc::new(UserStore::new(UsersApi::new(http), notifier));
        Self {
            transport,
            tokens,
            notices,
            store,
        }
    }

    /// Every notice emitted so far.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        let mut out = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            out.push(notice);
        }
        out
    }
}

pub const T: &str = "2024-01-01T00:00:00Z";

pub fn user_json(id: i64, username: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "email": format!("{username}@example.com"),
        "username": username,
        "full_name": null,
        "is_active": true,
        "is_superuser": false,
        "created_at": T,
        "updated_at": T,
    })
}

/// Start the mock server on an ephemeral port in a background thread and
/// return its base URL.
pub fn spawn_mock_server(options: mock_server::AppOptions) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, options).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}
