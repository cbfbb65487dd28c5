use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static SHARE_LINK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/(.+?)/").expect("share link pattern to be valid"));

/// Rewrite a Google Drive share link into a direct content link.
///
/// `https://drive.google.com/file/d/<id>/view` becomes
/// `https://drive.google.com/uc?id=<id>`. Input that doesn't look like a share
/// link is returned as is.
pub fn convert_drive_link(url: &str) -> String {
    match SHARE_LINK_ID.captures(url).and_then(|caps| caps.get(1)) {
        Some(id) => format!("https://drive.google.com/uc?id={}", id.as_str()),
        None => url.to_string(),
    }
}

/// Same as [`convert_drive_link`], passing non-string values through.
pub fn convert_drive_link_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(convert_drive_link(s)),
        other => other.clone(),
    }
}
