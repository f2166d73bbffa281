//! 加载进度提示
//!
//! 提交等待期间依次展示的四条状态信息，每 2.5 秒前进一条，停在最后一条

use std::time::Duration;

/// 每条信息的展示时长
pub const LOADING_STEP_INTERVAL: Duration = Duration::from_millis(2500);

pub const LOADING_MESSAGES: [&str; 4] = [
    "등록원부를 분석하고 있습니다",
    "AI가 사고 이력을 대조 중입니다",
    "차량 가치를 정밀 산정 중입니다",
    "리포트를 생성하고 있습니다",
];

/// 某一时刻的进度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingProgress {
    step: usize,
}

impl LoadingProgress {
    /// 根据已等待时长计算进度
    pub fn at(elapsed: Duration) -> Self {
        let step = (elapsed.as_millis() / LOADING_STEP_INTERVAL.as_millis()) as usize;
        Self {
            step: step.min(LOADING_MESSAGES.len() - 1),
        }
    }

    /// 从 0 开始的步骤
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn message(&self) -> &'static str {
        LOADING_MESSAGES[self.step]
    }

    /// 进度百分比
    pub fn percent(&self) -> u8 {
        ((self.step + 1) * 100 / LOADING_MESSAGES.len()) as u8
    }

    /// 形如 `02 / 04` 的计数
    pub fn counter(&self) -> String {
        format!("{:02} / {:02}", self.step + 1, LOADING_MESSAGES.len())
    }

    pub fn is_last(&self) -> bool {
        self.step == LOADING_MESSAGES.len() - 1
    }
}
