//! 上传页与查看页的 HTML 渲染（纯函数）。

use html_escaper::Escape;
use std::fmt::{self, Display, Formatter, Write};

use crate::upload::UploadController;
use crate::view::{ImageView, PREVIEW_UNAVAILABLE, ViewError, ViewState};

const UPLOAD_SCRIPT: &str = "/assets/upload.js";
const VIEW_SCRIPT: &str = "/assets/view.js";

/// 以 HTML 转义方式输出的文本。
struct Escaped<'a>(&'a str);

impl Display for Escaped<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.escape(f, false)
    }
}

fn layout(title: &str, content: &str, script: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="/assets/style.css">
</head>
<body>
    <main class="page">
{content}
    </main>
    <script src="{script}" defer></script>
</body>
</html>
"#,
        title = Escaped(title),
    )
}

/// 根据控制器状态渲染上传页。
pub fn render_upload_page(controller: &UploadController) -> String {
    let status = controller.status();
    let content = format!(
        r#"        <section class="card">
            <h1>Upload an image</h1>
            <form id="uploadForm" action="/upload" method="post" enctype="multipart/form-data">
                <div id="dropZone" class="dropzone" tabindex="0">
                    <input id="fileInput" type="file" name="file" accept="image/*" hidden>
                    <p class="dropzone__hint">Drag and drop an image here</p>
                    <button type="button" id="selectButton" class="btn btn--ghost">Choose file</button>
                    <p id="fileName" class="dropzone__file">{file_name}</p>
                </div>
                <button type="submit" id="uploadButton" class="btn"{disabled}>Upload</button>
                <p id="statusText" class="status{status_class}" role="status">{status}</p>
            </form>
        </section>"#,
        file_name = Escaped(controller.file_label()),
        disabled = if controller.can_submit() {
            ""
        } else {
            " disabled"
        },
        status_class = if status.is_error {
            " status--error"
        } else {
            ""
        },
        status = Escaped(status.message.as_str()),
    );
    layout("Upload an image", &content, UPLOAD_SCRIPT)
}

/// 根据查看页状态渲染；错误状态隐藏图片区域。
pub fn render_view_page(state: &ViewState) -> String {
    let content = match state {
        ViewState::NoId | ViewState::Loading { .. } => {
            r#"        <section class="card"><p class="status">Loading&hellip;</p></section>"#
                .to_string()
        }
        ViewState::Loaded(view) => render_image_section(view),
        ViewState::Error(err) => render_error_section(err),
    };
    let title = match state {
        ViewState::Loaded(view) => view.file_name.as_str(),
        _ => "Image",
    };
    layout(title, &content, VIEW_SCRIPT)
}

fn render_image_section(view: &ImageView) -> String {
    let mut links = String::new();
    for link in &view.preview_links {
        let _ = write!(
            links,
            r#"
                <a class="btn btn--ghost" href="{}" target="_blank" rel="noopener">{}</a>"#,
            Escaped(link.href.as_str()),
            Escaped(link.label().as_str()),
        );
    }
    let uploaded = view
        .uploaded_at
        .as_deref()
        .map(|value| {
            format!(
                r#"
                <dt>Uploaded</dt><dd id="uploadedAt">{}</dd>"#,
                Escaped(value)
            )
        })
        .unwrap_or_default();

    format!(
        r#"        <section id="imageSection" class="card">
            <h1 id="fileName">{file_name}</h1>
            <dl class="meta">
                <dt>Type</dt><dd id="contentType">{content_type}</dd>
                <dt>Size</dt><dd id="fileSize">{size}</dd>{uploaded}
            </dl>
            <figure class="preview">
                <img id="previewImage" src="{preview_src}" alt="Preview of {file_name}" data-fallback="{fallback}">
                <figcaption id="previewFallback"></figcaption>
            </figure>
            <div id="previewLinks" class="links">{links}
            </div>
            <div class="actions">
                <a id="downloadOriginal" class="btn" href="{download}">Download original</a>
                <a class="btn btn--ghost" href="/">Upload another</a>
            </div>
        </section>"#,
        file_name = Escaped(view.file_name.as_str()),
        content_type = Escaped(view.content_type.as_str()),
        size = Escaped(view.size.as_str()),
        preview_src = Escaped(view.preview_src.as_str()),
        fallback = PREVIEW_UNAVAILABLE,
        download = Escaped(view.download_url.as_str()),
    )
}

fn render_error_section(err: &ViewError) -> String {
    format!(
        r#"        <section id="errorSection" class="card card--error">
            <h1>Something went wrong</h1>
            <p id="errorText">{}</p>
            <a class="btn" href="/">Back to upload</a>
        </section>"#,
        Escaped(err.message.as_str())
    )
}
