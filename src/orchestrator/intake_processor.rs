//! 单个 intake 处理器 - 编排层
//!
//! 填表 → 前进到第 2 步 → 提交（期间输出加载进度）→ 保存报告 → 关闭结果视图

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::{DocumentSlot, IntakeFile};
use crate::services::{LoadingProgress, ReportSaver, LOADING_STEP_INTERVAL};
use crate::utils::logging::truncate_text;
use crate::workflow::{IntakeSession, SubmissionOrchestrator};

/// 处理单个 intake
///
/// # 参数
/// - `orchestrator`: 共享的提交编排器
/// - `saver`: 报告落盘
/// - `intake`: intake 文件内容
/// - `intake_index`: 序号（仅用于日志）
/// - `config`: 配置
///
/// # 返回
/// 报告成功生成并保存返回 true；表单不完整或提交失败返回 false
pub async fn process_intake(
    orchestrator: &SubmissionOrchestrator,
    saver: &ReportSaver,
    intake: &IntakeFile,
    intake_index: usize,
    config: &Config,
) -> Result<bool> {
    let mut session = IntakeSession::new(orchestrator.clone());

    let fields = intake
        .form_fields()
        .await
        .with_context(|| format!("无法读取 {} 的证件", intake.display_name()))?;
    for field in fields {
        session.set_field(field);
    }

    if !session.next() {
        warn!(
            "[intake {}] ⚠️ 缺少必填证件 {}，跳过",
            intake_index,
            DocumentSlot::RegistrationGap.label()
        );
        return Ok(false);
    }
    if !session.form().can_submit() {
        warn!(
            "[intake {}] ⚠️ 里程或泡水情况未填写，跳过 (里程: '{}')",
            intake_index,
            session.form().state().mileage
        );
        return Ok(false);
    }

    let started = Instant::now();
    let failed = {
        let submit = session.submit();
        tokio::pin!(submit);
        let mut ticker = tokio::time::interval(LOADING_STEP_INTERVAL);
        let mut last_step = None;

        loop {
            tokio::select! {
                outcome = &mut submit => break outcome.map(|result| result.is_error()),
                _ = ticker.tick() => {
                    let progress = LoadingProgress::at(started.elapsed());
                    if last_step != Some(progress.step()) {
                        last_step = Some(progress.step());
                        info!(
                            "[intake {}] ⏳ {} {} ({}%)",
                            intake_index,
                            progress.counter(),
                            progress.message(),
                            progress.percent()
                        );
                    }
                }
            }
        }
    }?;

    if failed {
        error!(
            "[intake {}] ❌ {}",
            intake_index,
            session.error_message().unwrap_or_default()
        );
        return Ok(false);
    }

    info!(
        "[intake {}] ✓ 报告已生成，耗时 {:.1}s",
        intake_index,
        started.elapsed().as_secs_f64()
    );

    let view = session.report_view(config.share_supported);
    if let (Some(target), Some(image)) = (view.download(), view.image()) {
        saver.save(&target, image).await?;
        saver.save_print_view(&target).await?;
    }
    if let Some(share) = view.share() {
        info!(
            "[intake {}] 📤 分享: {} | {} | {}",
            intake_index,
            share.title,
            share.text,
            truncate_text(&share.url, 80)
        );
    }

    session.dismiss_result();
    Ok(true)
}
