//! 测试用的模拟图片 API 服务。

use axum::extract::{Multipart, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::api::{ImageApi, ImageMetadata};
use crate::config::FrontendConfig;
use crate::error::ClientError;
use crate::upload::SelectedFile;

/// 返回固定结果并统计调用次数的 `ImageApi`。
pub struct FakeApi {
    upload: Result<String, ClientError>,
    metadata: Result<ImageMetadata, ClientError>,
    upload_calls: AtomicUsize,
    metadata_calls: AtomicUsize,
}

impl FakeApi {
    fn new(
        upload: Result<String, ClientError>,
        metadata: Result<ImageMetadata, ClientError>,
    ) -> Self {
        Self {
            upload,
            metadata,
            upload_calls: AtomicUsize::new(0),
            metadata_calls: AtomicUsize::new(0),
        }
    }

    pub fn upload_succeeds(id: &str) -> Self {
        Self::new(Ok(id.to_string()), Err(ClientError::MissingId))
    }

    pub fn upload_fails(err: ClientError) -> Self {
        Self::new(Err(err), Err(ClientError::MissingId))
    }

    pub fn with_metadata(result: Result<ImageMetadata, ClientError>) -> Self {
        Self::new(Err(ClientError::MissingId), result)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }
}

impl ImageApi for FakeApi {
    async fn upload(&self, _file: &SelectedFile) -> Result<String, ClientError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.upload.clone()
    }

    async fn metadata(&self, _id: &str) -> Result<ImageMetadata, ClientError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.metadata.clone()
    }
}

#[derive(Clone, Debug)]
pub enum MockBody {
    Json(Value),
    Text(String),
}

#[derive(Clone, Debug)]
pub struct MockReply {
    status: u16,
    body: MockBody,
}

impl MockReply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: MockBody::Json(body),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: MockBody::Text(body.to_string()),
        }
    }
}

impl IntoResponse for MockReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self.body {
            MockBody::Json(body) => (status, Json(body)).into_response(),
            MockBody::Text(body) => (status, body).into_response(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReceivedUpload {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
struct MockState {
    upload_reply: MockReply,
    metadata_reply: MockReply,
    uploads: Arc<Mutex<Vec<ReceivedUpload>>>,
    metadata_requests: Arc<Mutex<Vec<String>>>,
}

/// 在 `127.0.0.1` 临时端口上运行的图片 API 替身。
pub struct MockBackend {
    base_url: String,
    state: MockState,
}

impl MockBackend {
    pub async fn start(upload_reply: MockReply, metadata_reply: MockReply) -> Self {
        let state = MockState {
            upload_reply,
            metadata_reply,
            uploads: Arc::new(Mutex::new(Vec::new())),
            metadata_requests: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/images", post(mock_upload))
            .route("/images/{id}", get(mock_metadata))
            .with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}/"),
            state,
        }
    }

    pub fn config(&self) -> FrontendConfig {
        FrontendConfig::new(&self.base_url)
    }

    pub async fn uploads(&self) -> Vec<ReceivedUpload> {
        self.state.uploads.lock().await.clone()
    }

    pub async fn metadata_requests(&self) -> Vec<String> {
        self.state.metadata_requests.lock().await.clone()
    }
}

async fn mock_upload(State(state): State<MockState>, mut multipart: Multipart) -> MockReply {
    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        state.uploads.lock().await.push(ReceivedUpload {
            field: field_name,
            file_name,
            content_type,
            bytes,
        });
    }
    state.upload_reply.clone()
}

async fn mock_metadata(State(state): State<MockState>, uri: Uri) -> MockReply {
    state
        .metadata_requests
        .lock()
        .await
        .push(uri.path().to_string());
    state.metadata_reply.clone()
}
