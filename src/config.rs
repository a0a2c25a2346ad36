//! CLI arguments, environment configuration and frontend constants.

use clap::Parser;
use shadow_rs::formatcp;

use crate::build;

const VERSION_INFO: &str = formatcp!(
    r#"{}\ncommit_hash: {}\nbuild_time: {}\nbuild_env: {},{}"#,
    build::PKG_VERSION,
    build::SHORT_COMMIT,
    build::BUILD_TIME,
    build::RUST_VERSION,
    build::RUST_CHANNEL
);

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 50 * 1024 * 1024;
/// Multipart field the image API reads the upload from.
pub const UPLOAD_FIELD_NAME: &str = "file";
/// Static page name that never counts as an image id.
pub const VIEW_FALLBACK_PAGE: &str = "image.html";
pub const PREVIEW_SIZES: [u32; 3] = [256, 512, 1024];
pub const EMBEDDED_PREVIEW_SIZE: u32 = 512;

/// CLI arguments and environment configuration for the frontend server.
#[derive(Parser, Debug)]
#[command(name = "image-frontend", version = VERSION_INFO, about = "Image hosting web frontend")]
pub struct Args {
    #[arg(
        long,
        env = "IMAGE_FRONTEND_API_BASE_URL",
        default_value = DEFAULT_API_BASE_URL,
        help = "Base URL of the image API"
    )]
    pub api_base_url: String,
    #[arg(
        short = 'b',
        long,
        env = "IMAGE_FRONTEND_BIND",
        default_value = "0.0.0.0",
        help = "Bind address"
    )]
    pub host: String,
    #[arg(
        short = 'p',
        long,
        env = "IMAGE_FRONTEND_PORT",
        default_value_t = DEFAULT_HTTP_PORT,
        help = "HTTP port"
    )]
    pub port: u16,
    #[arg(
        long,
        env = "IMAGE_FRONTEND_MAX_UPLOAD_SIZE",
        default_value_t = DEFAULT_MAX_UPLOAD_SIZE,
        help = "Max request body size accepted by the upload form in bytes"
    )]
    pub max_upload_size: usize,
}

/// Runtime configuration shared read-only by every page controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrontendConfig {
    api_base_url: String,
}

impl FrontendConfig {
    pub fn new(api_base_url: &str) -> Self {
        Self {
            api_base_url: normalize_base_url(api_base_url),
        }
    }

    pub fn from_args(args: &Args) -> Self {
        Self::new(&args.api_base_url)
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

/// Strips one trailing `/`; blank input falls back to the default endpoint.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_API_BASE_URL.to_string();
    }
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}
