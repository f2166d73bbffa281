/// 车辆鉴定 webhook 客户端
///
/// 封装与 webhook 的全部 HTTP 交互：multipart 提交和报告下载
use crate::config::Config;
use crate::error::{ApiError, AppResult};
use crate::models::form::{DocumentFile, DocumentSlot, FormState};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use tracing::debug;

/// 一次提交的 multipart 内容
///
/// 文本字段和文件按提交顺序排列，没选的文件不出现
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub text_fields: Vec<(&'static str, String)>,
    pub files: Vec<(DocumentSlot, DocumentFile)>,
}

impl From<&FormState> for SubmissionPayload {
    fn from(state: &FormState) -> Self {
        let text_fields = vec![
            ("current_mileage", state.mileage.clone()),
            ("accident_desc", state.accident_description.clone()),
            ("is_flooded", state.flood_status.as_form_value().to_string()),
            ("issue_details", state.condition_notes.clone()),
        ];

        let files = [DocumentSlot::RegistrationGap, DocumentSlot::RegistrationEul]
            .into_iter()
            .filter_map(|slot| state.document(slot).map(|doc| (slot, doc.clone())))
            .collect();

        Self { text_fields, files }
    }
}

impl SubmissionPayload {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.text_fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }

    /// 所有字段名，按提交顺序
    pub fn field_names(&self) -> Vec<&'static str> {
        self.text_fields
            .iter()
            .map(|(name, _)| *name)
            .chain(self.files.iter().map(|(slot, _)| slot.field_name()))
            .collect()
    }

    pub fn total_file_bytes(&self) -> usize {
        self.files.iter().map(|(_, doc)| doc.len()).sum()
    }

    /// 转换为 reqwest 的 multipart 表单
    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for (name, value) in self.text_fields {
            form = form.text(name, value);
        }
        for (slot, doc) in self.files {
            let part = Part::bytes(doc.bytes)
                .file_name(doc.file_name)
                .mime_str(&doc.mime_type)?;
            form = form.part(slot.field_name(), part);
        }
        Ok(form)
    }
}

/// webhook 的原始响应
#[derive(Debug, Clone)]
pub struct WebhookResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl WebhookResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// webhook 客户端
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    endpoint: String,
    bypass_header_name: String,
    bypass_header_value: String,
}

impl WebhookClient {
    /// 创建新的 webhook 客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            endpoint: config.webhook_url.clone(),
            bypass_header_name: config.bypass_header_name.clone(),
            bypass_header_value: config.bypass_header_value.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 提交 intake
    ///
    /// 只发一次请求，不重试。非 2xx 状态码也原样返回，由调用方判断
    ///
    /// # 参数
    /// - `payload`: multipart 内容
    ///
    /// # 返回
    /// 状态码、content-type 和完整响应体
    pub async fn post_intake(&self, payload: SubmissionPayload) -> Result<WebhookResponse, ApiError> {
        debug!(
            "提交 Payload: 字段 {:?} | 文件 {} bytes",
            payload.field_names(),
            payload.total_file_bytes()
        );

        let form = payload.into_form().map_err(|e| self.request_failed(e))?;

        let response = self
            .http
            .post(&self.endpoint)
            .header(self.bypass_header_name.as_str(), self.bypass_header_value.as_str())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.request_failed(e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.request_failed(e))?
            .to_vec();

        debug!(
            "webhook 响应: status={} content-type={} body={} bytes",
            status,
            content_type,
            body.len()
        );

        Ok(WebhookResponse {
            status,
            content_type,
            body,
        })
    }

    /// 下载远程报告图片
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let request_failed = |e: reqwest::Error| ApiError::RequestFailed {
            endpoint: url.to_string(),
            source: Box::new(e),
        };

        let response = self
            .http
            .get(url)
            .header(self.bypass_header_name.as_str(), self.bypass_header_value.as_str())
            .send()
            .await
            .map_err(request_failed)?;

        if !response.status().is_success() {
            return Err(ApiError::BadStatus {
                endpoint: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.bytes().await.map_err(request_failed)?.to_vec())
    }

    fn request_failed(&self, err: reqwest::Error) -> ApiError {
        ApiError::RequestFailed {
            endpoint: self.endpoint.clone(),
            source: Box::new(err),
        }
    }
}
