//! # Cartells Intake
//!
//! 车辆鉴定（차량 감정）intake 提交核心：两步表单、multipart 提交、报告展示
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源，只暴露能力
//! - `ObjectUrlRegistry` - 二进制报告图片的临时句柄
//! - `LoadingFlag` - 提交期间的加载标志
//!
//! ### ② 客户端层（Clients）
//! - `WebhookClient` - 唯一的 HTTP 出口，负责 multipart 提交和报告下载
//!
//! ### ③ 业务能力层（Services）
//! - `FormController` - 字段写入、步骤校验与切换
//! - `response_normalizer` - 响应 → 图片引用
//! - `ReportView` / `ReportSaver` - 下载、打印、分享
//! - `LoadingProgress` - 等待期间的状态信息
//!
//! ### ④ 流程层（Workflow）
//! - `SubmissionOrchestrator` - 一次提交 → 一个 `SubmissionResult`
//! - `IntakeSession` - 表单与结果的唯一状态持有者
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 扫描 intake 目录并逐个提交
//! - `orchestrator/intake_processor` - 单个 intake 的完整处理

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, GENERIC_FAILURE_MESSAGE};
pub use models::{FormField, FormState, ImageRef, IntakeFile, Step, SubmissionResult};
pub use orchestrator::App;
pub use workflow::{IntakeSession, SubmissionOrchestrator};
