//! 提交结果模型

use serde::Deserialize;

use crate::infrastructure::ObjectUrl;

/// base64 PNG 的 data URI 前缀
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// 可直接展示的图片引用
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageRef {
    /// 本地登记的二进制图片，必须显式释放
    Transient(ObjectUrl),
    /// 远程地址（响应 JSON 的 imageUrl）
    Remote(String),
    /// data URI（响应 JSON 的 image）
    Inline(String),
}

impl ImageRef {
    /// 作为 img src / href 使用的字符串
    pub fn as_src(&self) -> &str {
        match self {
            ImageRef::Transient(url) => url.as_str(),
            ImageRef::Remote(url) | ImageRef::Inline(url) => url,
        }
    }

    pub fn transient(&self) -> Option<&ObjectUrl> {
        match self {
            ImageRef::Transient(url) => Some(url),
            _ => None,
        }
    }

    pub fn inline_png(base64_payload: &str) -> Self {
        ImageRef::Inline(format!("{}{}", PNG_DATA_URI_PREFIX, base64_payload))
    }
}

/// 一次提交的结果，每次提交替换上一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    DisplayableImage(ImageRef),
    Error(String),
}

impl SubmissionResult {
    pub fn image(&self) -> Option<&ImageRef> {
        match self {
            SubmissionResult::DisplayableImage(image) => Some(image),
            SubmissionResult::Error(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SubmissionResult::Error(message) => Some(message),
            SubmissionResult::DisplayableImage(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SubmissionResult::Error(_))
    }
}

/// 非图片响应的 JSON 结构
///
/// 字段可能缺失、为空或不是字符串，统一按"没有"处理
#[derive(Debug, Default, Deserialize)]
pub struct ReportPayload {
    #[serde(rename = "imageUrl", default, deserialize_with = "lenient_string")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: Option<String>,
}

// 非空字符串才算有值
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}
