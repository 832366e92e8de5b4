//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义 crate 级的 `AppError`，供上层调用方（界面外壳、脚本）统一处理。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `AtlasError` 与 `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，便于跨进程传递。

use serde::Serialize;

use crate::atlas::{AtlasError, ExportError, SliceError};

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图集处理流水线错误（加载 / 切片 / 导出）
    #[error("{0}")]
    Atlas(#[from] AtlasError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SliceError> for AppError {
    fn from(error: SliceError) -> Self {
        Self::Atlas(error.into())
    }
}

impl From<ExportError> for AppError {
    fn from(error: ExportError) -> Self {
        Self::Atlas(error.into())
    }
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
