//! 上传页控制器：文件选择、提交状态与单次上传请求。

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{Extension, Multipart};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{HttpImageApi, ImageApi, view_path};
use crate::config::UPLOAD_FIELD_NAME;
use crate::error::ClientError;
use crate::pages::render_upload_page;

pub const NO_FILE_LABEL: &str = "No file selected";
pub const UPLOADING_STATUS: &str = "Uploading...";
pub const UPLOAD_FAILED: &str = "Upload failed";
pub const MISSING_ID_STATUS: &str = "Missing image id in response";
pub const UPLOAD_UNAVAILABLE: &str = "Could not upload the file";
pub const FILE_TOO_LARGE: &str = "File is too large";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// 用户选择的本地文件。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: &str, content_type: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.to_string(),
            content_type: content_type.filter(|value| !value.is_empty()),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// 状态栏文本，`is_error` 决定显示颜色。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusLine {
    pub message: String,
    pub is_error: bool,
}

impl StatusLine {
    fn info(message: &str) -> Self {
        Self {
            message: message.to_string(),
            is_error: false,
        }
    }

    fn error(message: String) -> Self {
        Self {
            message,
            is_error: true,
        }
    }
}

/// 提交的结果。
#[derive(Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    /// 未选择文件，未发出请求。
    Skipped,
    /// 上传成功，跳转到查看页。
    Navigate(String),
    /// 上传失败，状态栏已更新。
    Failed,
}

#[derive(Debug, Default)]
pub struct UploadController {
    selected: Option<SelectedFile>,
    submitting: bool,
    status: StatusLine,
}

impl UploadController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn file_label(&self) -> &str {
        self.selected
            .as_ref()
            .map_or(NO_FILE_LABEL, |file| file.name.as_str())
    }

    /// 仅在已选择文件且没有进行中的上传时可提交。
    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && !self.submitting
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    /// 文件对话框选择：只取第一个文件，空列表保持原选择。
    pub fn select_files(&mut self, files: impl IntoIterator<Item = SelectedFile>) {
        let Some(file) = files.into_iter().next() else {
            return;
        };
        self.selected = Some(file);
        self.status = StatusLine::default();
    }

    /// 上传表单本身无法读取时，直接以错误状态结束本次提交。
    pub fn reject_form(&mut self, message: &str) {
        self.submitting = false;
        self.status = StatusLine::error(message.to_string());
    }

    /// 发起一次上传；未选择文件时不做任何事。
    pub async fn submit<A: ImageApi>(&mut self, api: &A) -> UploadOutcome {
        let Some(file) = self.begin_submit() else {
            return UploadOutcome::Skipped;
        };
        let result = api.upload(&file).await;
        self.finish_submit(&file, result)
    }

    fn begin_submit(&mut self) -> Option<SelectedFile> {
        if !self.can_submit() {
            return None;
        }
        self.submitting = true;
        self.status = StatusLine::info(UPLOADING_STATUS);
        self.selected.clone()
    }

    fn finish_submit(
        &mut self,
        file: &SelectedFile,
        result: Result<String, ClientError>,
    ) -> UploadOutcome {
        match result {
            Ok(id) => {
                info!(id, name = %file.name, size = file.size(), "image uploaded");
                UploadOutcome::Navigate(view_path(&id))
            }
            Err(err) => {
                warn!(name = %file.name, error = %err, "upload failed");
                self.submitting = false;
                self.status = StatusLine::error(upload_failure_message(&err));
                UploadOutcome::Failed
            }
        }
    }
}

/// 上传失败时展示给用户的文本。
pub fn upload_failure_message(err: &ClientError) -> String {
    match err {
        ClientError::Status {
            detail: Some(detail),
            ..
        } => detail.clone(),
        ClientError::Status { detail: None, .. } => UPLOAD_FAILED.to_string(),
        ClientError::MissingId => MISSING_ID_STATUS.to_string(),
        ClientError::Transport(_) | ClientError::Decode(_) => UPLOAD_UNAVAILABLE.to_string(),
    }
}

/// 上传页。
pub async fn upload_page() -> Html<String> {
    Html(render_upload_page(&UploadController::new()))
}

/// 上传表单提交：转发到图片 API，成功后 303 跳转到查看页。
/// 表单读取失败（包括超出大小限制）时重新渲染上传页并在状态栏提示。
pub async fn submit_upload(
    Extension(api): Extension<Arc<HttpImageApi>>,
    multipart: Multipart,
) -> Response {
    let mut controller = UploadController::new();
    match read_selected_files(multipart).await {
        Ok(files) => {
            controller.select_files(files);
            respond_to_submit(&mut controller, api.as_ref()).await
        }
        Err(err) => {
            warn!(status = %err.status(), error = %err.body_text(), "invalid upload form");
            controller.reject_form(form_failure_message(&err));
            Html(render_upload_page(&controller)).into_response()
        }
    }
}

fn form_failure_message(err: &MultipartError) -> &'static str {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        FILE_TOO_LARGE
    } else {
        UPLOAD_FAILED
    }
}

async fn respond_to_submit<A: ImageApi>(controller: &mut UploadController, api: &A) -> Response {
    match controller.submit(api).await {
        UploadOutcome::Navigate(path) => Redirect::to(&path).into_response(),
        UploadOutcome::Skipped | UploadOutcome::Failed => {
            Html(render_upload_page(controller)).into_response()
        }
    }
}

/// 读取 `file` 字段；浏览器在未选择文件时会提交空文件名，这类字段被忽略。
async fn read_selected_files(mut multipart: Multipart) -> Result<Vec<SelectedFile>, MultipartError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }
        let Some(name) = field.file_name().map(str::to_string).filter(|n| !n.is_empty()) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        files.push(SelectedFile::new(&name, content_type, bytes));
        break;
    }
    Ok(files)
}
