//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 切片与导出各自拥有独立的错误枚举（`SliceError` / `ExportError`），
//! 便于单独测试两个核心组件；`AtlasError` 汇总整条链路的所有错误来源，
//! 调用侧可以按分支匹配，也可以通过 `code()` / `stage()` 拿到稳定标识。

/// 网格切片错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SliceError {
    /// 帧宽/帧高不是正整数（或超出 `u32` 范围）。
    #[error("帧尺寸无效：{frame_width}x{frame_height}（宽高都必须 ≥ 1）")]
    InvalidFrameSize { frame_width: i64, frame_height: i64 },
}

/// 图集导出错误。
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("图片编码失败：{0}")]
    EncodingFailed(String),

    #[error("创建图集目录失败：{0}")]
    DirectoryCreateFailed(String),

    #[error("写入图集文件失败：{0}")]
    WriteFailed(String),
}

/// 图集处理统一错误类型。
///
/// 该类型会在 crate 顶层被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("尚未加载图片")]
    NoImageLoaded,

    #[error(transparent)]
    Slice(#[from] SliceError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl AtlasError {
    /// 稳定的错误码，供调用方做分支处理。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "invalid_format",
            Self::Decode(_) => "decode_failed",
            Self::FileSystem(_) => "file_system",
            Self::ResourceLimit(_) => "resource_limit",
            Self::NoImageLoaded => "no_image_loaded",
            Self::Slice(SliceError::InvalidFrameSize { .. }) => "invalid_frame_size",
            Self::Export(ExportError::EncodingFailed(_)) => "encoding_failed",
            Self::Export(ExportError::DirectoryCreateFailed(_)) => "directory_create_failed",
            Self::Export(ExportError::WriteFailed(_)) => "write_failed",
        }
    }

    /// 出错所在阶段：`load` / `slice` / `export`。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) | Self::Decode(_) | Self::FileSystem(_) | Self::NoImageLoaded => {
                "load"
            }
            Self::ResourceLimit(_) | Self::Slice(_) => "slice",
            Self::Export(_) => "export",
        }
    }
}

/// 面向调用方的结构化错误，可直接序列化后跨进程传递。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AtlasCommandError {
    pub code: &'static str,
    pub stage: &'static str,
    pub message: String,
}

impl From<AtlasError> for AtlasCommandError {
    fn from(error: AtlasError) -> Self {
        Self {
            code: error.code(),
            stage: error.stage(),
            message: error.to_string(),
        }
    }
}
