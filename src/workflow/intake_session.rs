//! intake 会话
//!
//! 唯一持有表单、当前结果和结果视图状态的对象，所有修改都经过这里的方法

use tracing::{debug, info, warn};

use crate::error::{AppResult, FormError};
use crate::models::form::FormField;
use crate::models::submission::SubmissionResult;
use crate::services::{FormController, ReportView};
use crate::workflow::submission_flow::SubmissionOrchestrator;

/// intake 会话
///
/// 临时图片句柄在以下时机释放，且只释放一次：
/// - 下一次提交开始时
/// - 关闭结果视图时
/// - 会话被 drop 时
#[derive(Debug)]
pub struct IntakeSession {
    form: FormController,
    orchestrator: SubmissionOrchestrator,
    result: Option<SubmissionResult>,
    show_result: bool,
    error_message: Option<String>,
}

impl IntakeSession {
    pub fn new(orchestrator: SubmissionOrchestrator) -> Self {
        Self {
            form: FormController::new(),
            orchestrator,
            result: None,
            show_result: false,
            error_message: None,
        }
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn set_field(&mut self, field: FormField) {
        self.form.set_field(field);
    }

    pub fn next(&mut self) -> bool {
        self.form.next()
    }

    pub fn prev(&mut self) -> bool {
        self.form.prev()
    }

    pub fn is_loading(&self) -> bool {
        self.orchestrator.is_loading()
    }

    pub fn result(&self) -> Option<&SubmissionResult> {
        self.result.as_ref()
    }

    pub fn is_result_visible(&self) -> bool {
        self.show_result
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// 当前结果视图的动作
    pub fn report_view(&self, share_supported: bool) -> ReportView<'_> {
        ReportView::new(
            self.result.as_ref().and_then(SubmissionResult::image),
            share_supported,
        )
    }

    /// 提交当前表单
    ///
    /// `&mut self` 保证同一会话同时只有一个提交在进行
    ///
    /// # 返回
    /// 表单未满足提交条件时返回错误且不发请求
    pub async fn submit(&mut self) -> AppResult<&SubmissionResult> {
        if !self.form.can_submit() {
            warn!("⚠️ 表单尚未完成，拒绝提交");
            return Err(FormError::NotReady {
                current: self.form.current_step(),
            }
            .into());
        }

        self.release_result();
        self.show_result = false;
        self.error_message = None;

        let outcome = self.orchestrator.submit(self.form.state()).await;
        match &outcome {
            SubmissionResult::DisplayableImage(image) => {
                debug!("展示报告: {}", image.as_src());
                self.show_result = true;
            }
            SubmissionResult::Error(message) => {
                self.show_result = false;
                self.error_message = Some(message.clone());
            }
        }

        let stored: &SubmissionResult = self.result.insert(outcome);
        Ok(stored)
    }

    /// 关闭结果视图并释放临时句柄
    pub fn dismiss_result(&mut self) {
        self.show_result = false;
        self.release_result();
    }

    fn release_result(&mut self) {
        if let Some(result) = self.result.take() {
            if let Some(url) = result.image().and_then(|image| image.transient()) {
                self.orchestrator.registry().revoke(url);
                info!("已释放上一份报告的临时图片");
            }
        }
    }
}

impl Drop for IntakeSession {
    fn drop(&mut self) {
        self.release_result();
    }
}
