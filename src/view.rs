//! 查看页控制器：解析图片 id、加载元数据并生成预览信息。

use axum::extract::{Extension, RawQuery};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;
use tracing::{debug, error, warn};
use url::form_urlencoded;

use crate::api::{ApiUrls, HttpImageApi, ImageApi, ImageMetadata};
use crate::config::{EMBEDDED_PREVIEW_SIZE, PREVIEW_SIZES, VIEW_FALLBACK_PAGE};
use crate::error::ClientError;
use crate::format::format_bytes;
use crate::pages::render_view_page;

pub const NO_ID_MESSAGE: &str = "No image id provided.";
pub const NOT_FOUND_MESSAGE: &str = "Image not found";
pub const LOAD_FAILED_MESSAGE: &str = "Could not load image";
pub const PREVIEW_UNAVAILABLE: &str = "Preview unavailable";
const UNTITLED: &str = "Untitled";
const UNKNOWN_TYPE: &str = "Unknown";

/// 按查询参数 `id`、路径首段的顺序解析图片 id。
pub fn resolve_image_id(query_id: Option<&str>, path: &str) -> Option<String> {
    if let Some(id) = query_id.filter(|id| !id.is_empty()) {
        return Some(id.to_string());
    }

    let segment = path.trim_start_matches('/').split('/').next()?;
    if segment.is_empty() || segment == VIEW_FALLBACK_PAGE {
        return None;
    }
    let decoded = urlencoding::decode(segment)
        .map(|value| value.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    Some(decoded)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewLink {
    pub size: u32,
    pub href: String,
}

impl PreviewLink {
    pub fn label(&self) -> String {
        format!("{}px", self.size)
    }
}

/// 加载成功后渲染所需的全部数据。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageView {
    pub id: String,
    pub file_name: String,
    pub content_type: String,
    pub size: String,
    pub uploaded_at: Option<String>,
    pub download_url: String,
    pub preview_links: Vec<PreviewLink>,
    /// 内嵌预览图地址；加载失败时由浏览器脚本替换为回退文本。
    pub preview_src: String,
}

impl ImageView {
    pub fn new(urls: &ApiUrls, id: &str, metadata: ImageMetadata) -> Self {
        let preview_links = PREVIEW_SIZES
            .iter()
            .map(|&size| PreviewLink {
                size,
                href: urls.preview(id, size),
            })
            .collect();
        Self {
            id: id.to_string(),
            file_name: non_empty_or(metadata.original_filename, UNTITLED),
            content_type: non_empty_or(metadata.content_type, UNKNOWN_TYPE),
            size: format_bytes(metadata.size_bytes),
            uploaded_at: metadata.created_at.filter(|value| !value.is_empty()),
            download_url: urls.original_file(id),
            preview_links,
            preview_src: urls.preview(id, EMBEDDED_PREVIEW_SIZE),
        }
    }
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewErrorKind {
    MissingId,
    NotFound,
    Unavailable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewError {
    pub kind: ViewErrorKind,
    pub message: String,
}

impl ViewError {
    fn missing_id() -> Self {
        Self {
            kind: ViewErrorKind::MissingId,
            message: NO_ID_MESSAGE.to_string(),
        }
    }

    fn from_client(err: &ClientError) -> Self {
        match err {
            ClientError::Status { status, detail } => Self {
                kind: if *status == 404 {
                    ViewErrorKind::NotFound
                } else {
                    ViewErrorKind::Unavailable
                },
                message: detail
                    .clone()
                    .unwrap_or_else(|| NOT_FOUND_MESSAGE.to_string()),
            },
            ClientError::Transport(_) | ClientError::Decode(_) | ClientError::MissingId => Self {
                kind: ViewErrorKind::Unavailable,
                message: LOAD_FAILED_MESSAGE.to_string(),
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ViewErrorKind::MissingId => StatusCode::BAD_REQUEST,
            ViewErrorKind::NotFound => StatusCode::NOT_FOUND,
            ViewErrorKind::Unavailable => StatusCode::BAD_GATEWAY,
        }
    }
}

/// 查看页生命周期：`NoId → Error`，`Loading → Loaded | Error`。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewState {
    NoId,
    Loading { id: String },
    Loaded(Box<ImageView>),
    Error(ViewError),
}

pub struct ViewController {
    urls: ApiUrls,
    state: ViewState,
}

impl ViewController {
    pub fn new(urls: ApiUrls, image_id: Option<String>) -> Self {
        let state = match image_id {
            Some(id) => ViewState::Loading { id },
            None => ViewState::NoId,
        };
        Self { urls, state }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// 执行一次加载；终止状态下不再发起请求。
    pub async fn load<A: ImageApi>(&mut self, api: &A) -> &ViewState {
        let next = match &self.state {
            ViewState::NoId => {
                warn!("view page requested without image id");
                ViewState::Error(ViewError::missing_id())
            }
            ViewState::Loading { id } => match api.metadata(id).await {
                Ok(metadata) => {
                    debug!(id, "image metadata loaded");
                    ViewState::Loaded(Box::new(ImageView::new(&self.urls, id, metadata)))
                }
                Err(err) => {
                    error!(id, error = %err, "failed to load image metadata");
                    ViewState::Error(ViewError::from_client(&err))
                }
            },
            ViewState::Loaded(_) | ViewState::Error(_) => return &self.state,
        };
        self.state = next;
        &self.state
    }

    pub fn status_code(&self) -> StatusCode {
        match &self.state {
            ViewState::Error(err) => err.status_code(),
            ViewState::NoId | ViewState::Loading { .. } | ViewState::Loaded(_) => StatusCode::OK,
        }
    }
}

/// 取查询串中第一个 `id` 参数；重复或无法解码的参数不会导致请求被拒绝。
pub fn query_image_id(query: Option<&str>) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
}

/// 查看页：`/image.html?id=…` 或 `/{id}`。
pub async fn view_page(
    Extension(api): Extension<Arc<HttpImageApi>>,
    RawQuery(query): RawQuery,
    uri: Uri,
) -> Response {
    let query_id = query_image_id(query.as_deref());
    let image_id = resolve_image_id(query_id.as_deref(), uri.path());
    let mut controller = ViewController::new(api.urls().clone(), image_id);
    controller.load(api.as_ref()).await;
    (
        controller.status_code(),
        Html(render_view_page(controller.state())),
    )
        .into_response()
}
