// Version information for img-to-pinyin

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "paddleocr-chinese",
    "line-reconstruction",
    "pinyin-diacritical",
    "pinyin-numerical",
    "translate-en",
    "translate-vi",
    "clipboard-capture",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("img-to-pinyin {}", VERSION_NUMBER)
}

/// Get full version info for API responses
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "features": FEATURES,
    })
}
