use crate::error::{AppError, AppResult, ConfigError};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 车辆鉴定 webhook 地址（固定端点）
    pub webhook_url: String,
    /// 绕过 ngrok 浏览器警告页的请求头名
    pub bypass_header_name: String,
    /// 绕过请求头的值
    pub bypass_header_value: String,
    /// 待提交的 intake TOML 文件目录
    pub intake_folder: String,
    /// 报告保存目录
    pub report_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 当前平台是否支持分享
    pub share_supported: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_url:
                "https://addie-unwatching-nonresonantly.ngrok-free.dev/webhook-test/cartells-check"
                    .to_string(),
            bypass_header_name: "ngrok-skip-browser-warning".to_string(),
            bypass_header_value: "69420".to_string(),
            intake_folder: "intake_toml".to_string(),
            report_dir: "reports".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            share_supported: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            webhook_url: std::env::var("WEBHOOK_URL").unwrap_or(default.webhook_url),
            bypass_header_name: std::env::var("BYPASS_HEADER_NAME").unwrap_or(default.bypass_header_name),
            bypass_header_value: std::env::var("BYPASS_HEADER_VALUE").unwrap_or(default.bypass_header_value),
            intake_folder: std::env::var("INTAKE_FOLDER").unwrap_or(default.intake_folder),
            report_dir: std::env::var("REPORT_DIR").unwrap_or(default.report_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            share_supported: std::env::var("SHARE_SUPPORTED").ok().and_then(|v| v.parse().ok()).unwrap_or(default.share_supported),
        }
    }

    /// 校验配置
    ///
    /// webhook 地址必须能解析且协议为 http/https
    pub fn validate(&self) -> AppResult<()> {
        let url = reqwest::Url::parse(&self.webhook_url).map_err(|e| {
            AppError::Config(ConfigError::InvalidUrl {
                var_name: "WEBHOOK_URL".to_string(),
                value: self.webhook_url.clone(),
                reason: e.to_string(),
            })
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(ConfigError::InvalidUrl {
                var_name: "WEBHOOK_URL".to_string(),
                value: self.webhook_url.clone(),
                reason: format!("不支持的协议: {}", url.scheme()),
            }));
        }

        if self.bypass_header_name.trim().is_empty() {
            return Err(AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: "BYPASS_HEADER_NAME".to_string(),
                value: self.bypass_header_name.clone(),
                expected_type: "非空请求头名".to_string(),
            }));
        }

        Ok(())
    }
}
