//! 基础设施层（Infrastructure）
//!
//! 持有进程内的稀缺资源，只暴露能力：
//! - `ObjectUrlRegistry`：临时图片句柄的登记与释放
//! - `LoadingFlag`：唯一的加载标志

pub mod loading_flag;
pub mod object_url;

pub use loading_flag::{LoadingFlag, LoadingGuard};
pub use object_url::{Blob, ObjectUrl, ObjectUrlRegistry};
