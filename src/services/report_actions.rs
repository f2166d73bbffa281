//! 报告展示动作 - 业务能力层
//!
//! 下载、打印、分享三个动作都只依赖"当前是否有图片引用"，
//! 没有图片时全部返回 None。`ReportSaver` 负责把下载目标真正落盘。

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::clients::WebhookClient;
use crate::error::{ApiError, AppError, AppResult};
use crate::infrastructure::ObjectUrlRegistry;
use crate::models::submission::ImageRef;

pub const REPORT_FILE_PREFIX: &str = "Cartells_Appraisal_Report_";
pub const PRINT_TITLE: &str = "Cartells 감정 리포트";
pub const SHARE_TITLE: &str = "Cartells 차량 감정 리포트";
pub const SHARE_TEXT: &str = "AI 기반 차량 정밀 감정 결과입니다.";
pub const DISCLAIMER: &str = "본 리포트는 AI 분석 결과이며, 실제 차량 상태와 다를 수 있습니다.";

/// 下载目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub href: String,
    pub file_name: String,
}

/// 分享内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// 结果视图上的动作
#[derive(Debug, Clone, Copy)]
pub struct ReportView<'a> {
    image: Option<&'a ImageRef>,
    share_supported: bool,
}

impl<'a> ReportView<'a> {
    pub fn new(image: Option<&'a ImageRef>, share_supported: bool) -> Self {
        Self {
            image,
            share_supported,
        }
    }

    pub fn image(&self) -> Option<&'a ImageRef> {
        self.image
    }

    pub fn download(&self) -> Option<DownloadTarget> {
        self.download_at(Utc::now())
    }

    /// 文件名为 `Cartells_Appraisal_Report_<毫秒时间戳>.png`
    pub fn download_at(&self, now: DateTime<Utc>) -> Option<DownloadTarget> {
        self.image.map(|image| DownloadTarget {
            href: image.as_src().to_string(),
            file_name: format!("{}{}.png", REPORT_FILE_PREFIX, now.timestamp_millis()),
        })
    }

    /// 打印用 HTML，图片加载完成后自动调起打印
    pub fn print_document(&self) -> Option<String> {
        self.image.map(|image| render_print_document(image.as_src()))
    }

    /// 平台不支持分享时返回 None
    pub fn share(&self) -> Option<SharePayload> {
        if !self.share_supported {
            return None;
        }
        self.image.map(|image| SharePayload {
            title: SHARE_TITLE.to_string(),
            text: SHARE_TEXT.to_string(),
            url: image.as_src().to_string(),
        })
    }
}

/// 生成打印页面，图片下方附免责声明
pub fn render_print_document(src: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>{title}</title>
    <style>
      * {{ margin: 0; padding: 0; box-sizing: border-box; }}
      body {{ display: flex; flex-direction: column; justify-content: center; align-items: center; min-height: 100vh; background: #fff; }}
      img {{ max-width: 100%; max-height: 95vh; object-fit: contain; }}
      .disclaimer {{ margin-top: 8px; font-size: 11px; color: #888; }}
      @media print {{
        body {{ margin: 0; }}
        img {{ width: 100%; height: auto; }}
      }}
    </style>
  </head>
  <body>
    <img src="{src}" onload="setTimeout(()=>{{window.print();window.close();}},300)" />
    <p class="disclaimer">{disclaimer}</p>
  </body>
</html>
"#,
        title = PRINT_TITLE,
        src = escape_attribute(src),
        disclaimer = DISCLAIMER
    )
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 解码 `data:<mime>;base64,<payload>`
pub fn decode_data_uri(uri: &str) -> AppResult<Vec<u8>> {
    let payload = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or_else(|| {
            AppError::Api(ApiError::InvalidInlineImage {
                source: format!("不是 base64 data URI: {}", crate::utils::logging::truncate_text(uri, 40)).into(),
            })
        })?;

    Ok(STANDARD.decode(payload)?)
}

/// 报告落盘
pub struct ReportSaver {
    registry: ObjectUrlRegistry,
    client: WebhookClient,
    report_dir: PathBuf,
}

impl ReportSaver {
    pub fn new(registry: ObjectUrlRegistry, client: WebhookClient, report_dir: impl AsRef<Path>) -> Self {
        Self {
            registry,
            client,
            report_dir: report_dir.as_ref().to_path_buf(),
        }
    }

    /// 取得图片字节
    ///
    /// - 临时句柄：从登记表读取（句柄已释放则报错）
    /// - data URI：base64 解码
    /// - 远程地址：GET 下载一次
    pub async fn resolve_bytes(&self, image: &ImageRef) -> AppResult<Vec<u8>> {
        match image {
            ImageRef::Transient(url) => self
                .registry
                .get(url)
                .map(|blob| blob.bytes.as_ref().clone())
                .ok_or_else(|| {
                    AppError::Other(format!("临时图片 {} 已被释放", url))
                }),
            ImageRef::Inline(uri) => decode_data_uri(uri),
            ImageRef::Remote(url) => Ok(self.client.fetch_bytes(url).await?),
        }
    }

    /// 保存报告图片
    ///
    /// # 返回
    /// 写入的文件路径
    pub async fn save(&self, target: &DownloadTarget, image: &ImageRef) -> AppResult<PathBuf> {
        let bytes = self.resolve_bytes(image).await?;
        let path = self.report_dir.join(&target.file_name);
        self.write(&path, &bytes).await?;
        info!("✓ 报告已保存: {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// 在报告旁边写入打印页面，图片按相对文件名引用
    pub async fn save_print_view(&self, target: &DownloadTarget) -> AppResult<PathBuf> {
        let html = render_print_document(&target.file_name);
        let path = self
            .report_dir
            .join(&target.file_name)
            .with_extension("html");
        self.write(&path, html.as_bytes()).await?;
        debug!("打印页面已生成: {}", path.display());
        Ok(path)
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.report_dir)
            .await
            .map_err(|e| AppError::file_write_failed(self.report_dir.display().to_string(), e))?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))
    }
}
