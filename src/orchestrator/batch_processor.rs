//! 批量 intake 处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责 intake 的批量提交和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：日志文件、webhook 客户端、临时图片登记表
//! 2. **批量加载**：扫描并加载所有待提交的 intake（`Vec<IntakeFile>`）
//! 3. **逐个提交**：同一时间只有一个提交在进行
//! 4. **全局统计**：汇总所有 intake 的处理结果

use crate::clients::WebhookClient;
use crate::config::Config;
use crate::infrastructure::ObjectUrlRegistry;
use crate::models::IntakeFile;
use crate::orchestrator::intake_processor;
use crate::services::ReportSaver;
use crate::utils::logging;
use crate::workflow::SubmissionOrchestrator;
use anyhow::Result;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: SubmissionOrchestrator,
    saver: ReportSaver,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        logging::log_startup(&config);

        let client = WebhookClient::new(&config)?;
        let registry = ObjectUrlRegistry::new();
        let saver = ReportSaver::new(registry.clone(), client.clone(), &config.report_dir);
        let orchestrator = SubmissionOrchestrator::new(client, registry);

        Ok(Self {
            config,
            orchestrator,
            saver,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        let intakes = self.load_intakes().await?;

        if intakes.is_empty() {
            warn!("⚠️ 没有找到待提交的TOML文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        logging::log_intakes_loaded(intakes.len());

        let stats = self.process_all_intakes(&intakes).await;

        let leaked = self.orchestrator.registry().live_count();
        if leaked > 0 {
            warn!("⚠️ 仍有 {} 个临时图片未释放", leaked);
        }

        logging::print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    /// 加载 intake
    async fn load_intakes(&self) -> Result<Vec<IntakeFile>> {
        info!("\n📁 正在扫描待提交的 intake...");
        crate::models::load_all_intake_files(&self.config.intake_folder).await
    }

    /// 逐个处理 intake
    async fn process_all_intakes(&self, intakes: &[IntakeFile]) -> ProcessingStats {
        let mut stats = ProcessingStats {
            total: intakes.len(),
            ..Default::default()
        };

        for (idx, intake) in intakes.iter().enumerate() {
            let intake_index = idx + 1;
            logging::log_intake_start(intake_index, stats.total, &intake.display_name());

            match intake_processor::process_intake(
                &self.orchestrator,
                &self.saver,
                intake,
                intake_index,
                &self.config,
            )
            .await
            {
                Ok(true) => stats.success += 1,
                Ok(false) => stats.failed += 1,
                Err(e) => {
                    error!("[intake {}] ❌ 处理过程中发生错误: {:#}", intake_index, e);
                    stats.failed += 1;
                }
            }
        }

        stats
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}
