//! 临时图片引用登记表
//!
//! webhook 直接返回二进制图片时，字节登记在这里并换成一个
//! `blob:cartells/<uuid>` 句柄。句柄必须显式释放，且只释放一次。

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};
use uuid::Uuid;

const OBJECT_URL_SCHEME: &str = "blob:cartells/";

/// 临时图片句柄
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 登记的二进制内容
#[derive(Debug, Clone)]
pub struct Blob {
    pub mime_type: String,
    pub bytes: Arc<Vec<u8>>,
}

/// 进程内共享的句柄登记表
#[derive(Debug, Clone, Default)]
pub struct ObjectUrlRegistry {
    blobs: Arc<Mutex<HashMap<ObjectUrl, Blob>>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ObjectUrl, Blob>> {
        // 持锁期间不会 panic，中毒后数据仍然一致
        self.blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 登记字节并返回新句柄，每次调用都是不同的句柄
    pub fn create(&self, bytes: Vec<u8>, mime_type: impl Into<String>) -> ObjectUrl {
        let url = ObjectUrl(format!("{}{}", OBJECT_URL_SCHEME, Uuid::new_v4()));
        let blob = Blob {
            mime_type: mime_type.into(),
            bytes: Arc::new(bytes),
        };
        debug!("登记临时图片 {} ({} bytes)", url, blob.bytes.len());
        self.lock().insert(url.clone(), blob);
        url
    }

    /// 释放句柄
    ///
    /// # 返回
    /// 第一次释放返回 true，重复释放返回 false 并记录警告
    pub fn revoke(&self, url: &ObjectUrl) -> bool {
        match self.lock().remove(url) {
            Some(_) => {
                debug!("已释放临时图片 {}", url);
                true
            }
            None => {
                warn!("⚠️ 临时图片 {} 已被释放或不存在", url);
                false
            }
        }
    }

    pub fn get(&self, url: &ObjectUrl) -> Option<Blob> {
        self.lock().get(url).cloned()
    }

    pub fn is_live(&self, url: &ObjectUrl) -> bool {
        self.lock().contains_key(url)
    }

    /// 当前未释放的句柄数量
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }
}
