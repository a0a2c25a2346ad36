//! 图片 API 调用错误与页面处理器错误。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::error::Error;
use std::fmt;

/// 调用外部图片 API 时可能出现的错误。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// 网络层失败（连接、读取响应体）。
    Transport(String),
    /// 非 2xx 响应，`detail` 为响应体中的字符串字段。
    Status { status: u16, detail: Option<String> },
    /// 成功响应中缺少图片 id。
    MissingId,
    /// 成功响应体无法解析。
    Decode(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "request failed: {msg}"),
            ClientError::Status {
                status,
                detail: Some(detail),
            } => write!(f, "image api returned {status}: {detail}"),
            ClientError::Status {
                status,
                detail: None,
            } => write!(f, "image api returned {status}"),
            ClientError::MissingId => f.write_str("missing image id in response"),
            ClientError::Decode(msg) => write!(f, "invalid response body: {msg}"),
        }
    }
}

impl Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(error_chain(&err))
        } else {
            ClientError::Transport(error_chain(&err))
        }
    }
}

/// 把错误及其 `source` 链拼成一行，底层原因（如连接被拒绝）不会丢失。
fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

pub enum PageError {
    NotFound(String),
    Internal(String),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            PageError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}
