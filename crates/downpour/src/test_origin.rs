//! In-process HTTP origin for exercising connectors end to end.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// What the origin answers to every request
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub last_modified: Option<String>,
    /// Stream the body without a Content-Length
    pub chunked: bool,
}

impl Reply {
    pub fn ok(body: &[u8]) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_vec(),
            last_modified: None,
            chunked: false,
        }
    }

    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            body: Vec::new(),
            last_modified: None,
            chunked: false,
        }
    }

    pub fn with_last_modified(mut self, value: impl Into<String>) -> Self {
        self.last_modified = Some(value.into());
        self
    }

    pub fn chunked(mut self) -> Self {
        self.chunked = true;
        self
    }
}

struct OriginState {
    reply: Reply,
    requests: Vec<HeaderMap>,
}

type SharedState = Arc<Mutex<OriginState>>;

pub struct TestOrigin {
    addr: SocketAddr,
    state: SharedState,
    task: JoinHandle<()>,
}

impl TestOrigin {
    pub async fn start(reply: Reply) -> Self {
        let state = Arc::new(Mutex::new(OriginState {
            reply,
            requests: Vec::new(),
        }));
        let app = Router::new().fallback(serve).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state, task }
    }

    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{path}", self.addr)).unwrap()
    }

    pub fn set_reply(&self, reply: Reply) {
        self.state.lock().reply = reply;
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    /// Headers of the most recent request
    pub fn last_request(&self) -> HeaderMap {
        self.state.lock().requests.last().cloned().unwrap_or_default()
    }
}

impl Drop for TestOrigin {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let reply = {
        let mut state = state.lock();
        state.requests.push(headers);
        state.reply.clone()
    };

    let mut builder = Response::builder().status(reply.status);
    if let Some(last_modified) = &reply.last_modified {
        builder = builder.header(header::LAST_MODIFIED, last_modified);
    }

    let body = if reply.chunked {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> =
            reply.body.chunks(3).map(|c| Ok(c.to_vec())).collect();
        Body::from_stream(futures::stream::iter(chunks))
    } else {
        Body::from(reply.body)
    };
    builder.body(body).unwrap()
}
