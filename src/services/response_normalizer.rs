//! 响应归一化 - 业务能力层
//!
//! 把 webhook 的成功响应转换成可展示的图片引用：
//! 1. content-type 含 `image` → 登记为临时句柄
//! 2. 否则按 JSON 解析，`imageUrl` 优先，其次 `image`（base64 PNG）
//! 3. 都没有 → `NoImageInResponse`

use tracing::{debug, warn};

use crate::clients::WebhookResponse;
use crate::error::ApiError;
use crate::infrastructure::ObjectUrlRegistry;
use crate::models::submission::{ImageRef, ReportPayload};

/// 归一化成功响应
///
/// # 参数
/// - `response`: 已确认为 2xx 的响应
/// - `registry`: 二进制图片登记表
///
/// # 返回
/// 可展示的图片引用；二进制图片返回的句柄需要调用方释放
pub fn normalize(
    response: WebhookResponse,
    registry: &ObjectUrlRegistry,
) -> Result<ImageRef, ApiError> {
    if response.content_type.contains("image") {
        debug!("收到二进制图片 ({} bytes)", response.body.len());
        let url = registry.create(response.body, response.content_type);
        return Ok(ImageRef::Transient(url));
    }

    let payload: ReportPayload = serde_json::from_slice(&response.body)
        .map_err(|e| ApiError::JsonParseFailed { source: Box::new(e) })?;

    if let Some(url) = payload.image_url {
        debug!("响应包含 imageUrl: {}", url);
        return Ok(ImageRef::Remote(url));
    }

    if let Some(image) = payload.image {
        debug!("响应包含 base64 图片 ({} chars)", image.len());
        return Ok(ImageRef::inline_png(&image));
    }

    warn!("⚠️ 响应 JSON 中既没有 imageUrl 也没有 image");
    Err(ApiError::NoImageInResponse {
        content_type: response.content_type,
    })
}
