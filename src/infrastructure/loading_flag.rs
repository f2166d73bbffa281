//! 加载状态标志
//!
//! 提交期间为 true。通过 guard 置位，guard 被 drop 时清除，
//! 成功、解析失败、网络失败等所有退出路径都会复位。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// 置位并返回 guard
    pub fn begin(&self) -> LoadingGuard {
        self.0.store(true, Ordering::SeqCst);
        LoadingGuard(Arc::clone(&self.0))
    }

    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// drop 时清除加载标志
#[derive(Debug)]
pub struct LoadingGuard(Arc<AtomicBool>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
