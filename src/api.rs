//! 外部图片 API 的 HTTP 契约：地址构造、数据类型与 reqwest 客户端。

use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use std::future::Future;
use tracing::debug;

use crate::config::{FrontendConfig, UPLOAD_FIELD_NAME};
use crate::error::ClientError;
use crate::upload::SelectedFile;

/// 图片元数据（只读快照）。
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ImageMetadata {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// 页面控制器依赖的图片 API 操作。
pub trait ImageApi {
    /// 上传单个文件，返回后端分配的图片 id。
    fn upload(
        &self,
        file: &SelectedFile,
    ) -> impl Future<Output = Result<String, ClientError>> + Send;

    /// 获取图片元数据。
    fn metadata(&self, id: &str)
    -> impl Future<Output = Result<ImageMetadata, ClientError>> + Send;
}

/// 对单个路径段做百分号编码。
pub fn escape_segment(segment: &str) -> Cow<'_, str> {
    urlencoding::encode(segment)
}

/// 上传成功后跳转的查看页路径。
pub fn view_path(id: &str) -> String {
    format!("/{}", escape_segment(id))
}

/// 基于配置的 API 地址构造器。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiUrls {
    base: String,
}

impl ApiUrls {
    pub fn new(config: &FrontendConfig) -> Self {
        Self {
            base: config.api_base_url().to_string(),
        }
    }

    pub fn images(&self) -> String {
        format!("{}/images", self.base)
    }

    pub fn image(&self, id: &str) -> String {
        format!("{}/images/{}", self.base, escape_segment(id))
    }

    pub fn original_file(&self, id: &str) -> String {
        format!("{}/file", self.image(id))
    }

    pub fn preview(&self, id: &str, size: u32) -> String {
        format!("{}/preview/{size}", self.image(id))
    }
}

/// 基于 reqwest 的图片 API 客户端。
#[derive(Clone, Debug)]
pub struct HttpImageApi {
    client: reqwest::Client,
    urls: ApiUrls,
}

impl HttpImageApi {
    pub fn new(config: &FrontendConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            urls: ApiUrls::new(config),
        })
    }

    pub fn urls(&self) -> &ApiUrls {
        &self.urls
    }
}

impl ImageApi for HttpImageApi {
    async fn upload(&self, file: &SelectedFile) -> Result<String, ClientError> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(file.content_type())?;
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);
        let url = self.urls.images();
        debug!(url, name = %file.name, size = file.size(), "upload image");

        let response = self.client.post(&url).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let payload: Value = response.json().await?;
        image_id_from_payload(&payload).ok_or(ClientError::MissingId)
    }

    async fn metadata(&self, id: &str) -> Result<ImageMetadata, ClientError> {
        let url = self.urls.image(id);
        debug!(url, "fetch image metadata");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(response.json::<ImageMetadata>().await?)
    }
}

/// 非 2xx 响应转换为错误，尽量读取 `detail` 字段。
async fn status_error(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let detail = match response.bytes().await {
        Ok(body) => detail_from_body(&body),
        Err(_) => None,
    };
    ClientError::Status { status, detail }
}

/// 从错误响应体中提取非空字符串 `detail`。
pub fn detail_from_body(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("detail")
        .and_then(Value::as_str)
        .filter(|detail| !detail.is_empty())
        .map(str::to_string)
}

fn image_id_from_payload(payload: &Value) -> Option<String> {
    match payload.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
