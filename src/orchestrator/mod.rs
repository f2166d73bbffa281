//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量提交和流程调度，只做调度和统计，不做具体业务判断。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量 intake 处理器
//! - 管理应用生命周期（初始化、运行）
//! - 加载 intake 文件（Vec<IntakeFile>）
//! - 持有 webhook 客户端和临时图片登记表
//! - 输出全局统计信息
//!
//! ### `intake_processor` - 单个 intake 处理器
//! - 用一个 IntakeSession 完成填表、提交、保存、关闭
//! - 提交期间输出加载进度
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<IntakeFile>)
//!     ↓
//! intake_processor (处理单个 IntakeFile)
//!     ↓
//! workflow::IntakeSession / SubmissionOrchestrator
//!     ↓
//! services (表单控制 / 响应归一化 / 报告动作)
//!     ↓
//! clients + infrastructure (webhook / 临时图片登记表 / 加载标志)
//! ```

pub mod batch_processor;
pub mod intake_processor;

pub use batch_processor::{App, ProcessingStats};
pub use intake_processor::process_intake;
