//! 提交流程 - 流程层
//!
//! 核心职责：把一份表单变成一个 `SubmissionResult`
//!
//! 流程顺序：
//! 1. 组装 multipart → 发送一次请求
//! 2. 非 2xx → 失败
//! 3. 按 content-type 归一化为图片引用
//!
//! 任何失败都折叠为同一条用户提示，内部原因只写日志

use tracing::{error, info};

use crate::clients::{SubmissionPayload, WebhookClient};
use crate::error::{ApiError, GENERIC_FAILURE_MESSAGE};
use crate::infrastructure::{LoadingFlag, ObjectUrlRegistry};
use crate::models::form::FormState;
use crate::models::submission::{ImageRef, SubmissionResult};
use crate::services::response_normalizer;

/// 提交编排器
///
/// - 不重试、不设置额外超时、不排队
/// - 调用期间加载标志为 true，任何退出路径都会复位
#[derive(Debug, Clone)]
pub struct SubmissionOrchestrator {
    client: WebhookClient,
    registry: ObjectUrlRegistry,
    loading: LoadingFlag,
}

impl SubmissionOrchestrator {
    pub fn new(client: WebhookClient, registry: ObjectUrlRegistry) -> Self {
        Self {
            client,
            registry,
            loading: LoadingFlag::new(),
        }
    }

    pub fn registry(&self) -> &ObjectUrlRegistry {
        &self.registry
    }

    /// 加载标志的共享句柄，克隆后可在提交进行中观察
    pub fn loading_flag(&self) -> &LoadingFlag {
        &self.loading
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// 提交表单
    ///
    /// # 参数
    /// - `form`: 已通过校验的表单
    ///
    /// # 返回
    /// 成功为可展示图片，失败为统一提示
    pub async fn submit(&self, form: &FormState) -> SubmissionResult {
        let _loading = self.loading.begin();

        match self.try_submit(form).await {
            Ok(image) => {
                info!("✓ 鉴定报告已生成");
                SubmissionResult::DisplayableImage(image)
            }
            Err(e) => {
                error!("❌ 提交失败: {}", e);
                SubmissionResult::Error(GENERIC_FAILURE_MESSAGE.to_string())
            }
        }
    }

    async fn try_submit(&self, form: &FormState) -> Result<ImageRef, ApiError> {
        let payload = SubmissionPayload::from(form);
        info!("🚀 正在提交至 {}", self.client.endpoint());

        let response = self.client.post_intake(payload).await?;

        if !response.is_success() {
            return Err(ApiError::BadStatus {
                endpoint: self.client.endpoint().to_string(),
                status: response.status,
            });
        }

        response_normalizer::normalize(response, &self.registry)
    }
}
