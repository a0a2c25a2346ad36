//! 字节数的人类可读格式化。

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// 缺失字节数时显示的占位符。
pub const SIZE_PLACEHOLDER: &str = "\u{2014}";

/// 按 1024 进制选择最大单位；缩放值 ≥ 10 时不保留小数，否则保留一位。
/// 恰好落在中点的值向上取整。
pub fn format_bytes(bytes: Option<u64>) -> String {
    let Some(bytes) = bytes else {
        return SIZE_PLACEHOLDER.to_string();
    };

    let mut exponent = 0;
    let mut threshold: u64 = 1024;
    while exponent < UNITS.len() - 1 && bytes >= threshold {
        exponent += 1;
        threshold = threshold.saturating_mul(1024);
    }

    let size = bytes as f64 / 1024f64.powi(exponent as i32);
    if size >= 10.0 {
        format!("{:.0} {}", size.round(), UNITS[exponent])
    } else {
        format!("{:.1} {}", (size * 10.0).round() / 10.0, UNITS[exponent])
    }
}
