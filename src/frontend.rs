//! 嵌入式静态资源（样式与页面脚本）。

use axum::body::Body as AxumBody;
use axum::extract::Path;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;

use crate::error::PageError;

#[derive(RustEmbed)]
#[folder = "frontend/assets"]
/// 嵌入式前端资源。
pub struct FrontendAssets;

/// `/assets/{*path}` 处理器。
pub async fn serve_asset(Path(path): Path<String>) -> Result<Response, PageError> {
    load_embedded_asset(path.trim_start_matches('/'))?
        .ok_or_else(|| PageError::NotFound("not found".into()))
}

/// 加载指定路径的嵌入式资源。
fn load_embedded_asset(path: &str) -> Result<Option<Response>, PageError> {
    let Some(asset) = FrontendAssets::get(path) else {
        return Ok(None);
    };
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.essence_str())
            .map_err(|_| PageError::Internal("invalid mime type".into()))?,
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=300"),
    );
    Ok(Some(
        (headers, AxumBody::from(asset.data.into_owned())).into_response(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn serves_embedded_script_with_mime_type() {
        let response = serve_asset(Path("upload.js".to_string()))
            .await
            .unwrap_or_else(|_| panic!("asset missing"));
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        assert!(matches!(
            content_type,
            Some("application/javascript" | "text/javascript")
        ));
    }

    fn script(name: &str) -> String {
        let asset = FrontendAssets::get(name).unwrap_or_else(|| panic!("{name} missing"));
        String::from_utf8_lossy(&asset.data).into_owned()
    }

    #[test]
    fn upload_script_binds_drag_and_drop() {
        let source = script("upload.js");
        for event in ["\"dragover\"", "\"dragleave\"", "\"drop\"", "\"change\"", "\"submit\""] {
            assert!(source.contains(event), "upload.js does not handle {event}");
        }
        assert!(source.contains("is-dragging"));
        assert!(source.contains("window.addEventListener(\"drop\""));
    }

    #[test]
    fn view_script_switches_to_fallback_on_error() {
        let source = script("view.js");
        assert!(source.contains("getElementById(\"previewImage\")"));
        assert!(source.contains("getElementById(\"previewFallback\")"));
        assert!(source.contains("addEventListener(\"error\""));
        assert!(source.contains("dataset.fallback"));
    }

    #[tokio::test]
    async fn unknown_asset_is_not_found() {
        let result = serve_asset(Path("missing.css".to_string())).await;
        assert!(matches!(result, Err(PageError::NotFound(_))));
    }
}
