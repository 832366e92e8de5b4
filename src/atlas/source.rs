//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `ImageSource` 表示外部来源语义
//! - `RawImageData` 表示已加载但未检查尺寸的字节
//! - `SourceImage` 表示当前要切片的图片，作为显式参数在各调用之间传递

use serde::Serialize;

/// 图片输入来源。
pub enum ImageSource {
    /// 本地文件路径来源。
    FilePath(String),
    /// Base64（支持 Data URL 与纯 Base64 字符串）。
    Base64(String),
    /// 已在内存中的原始字节（例如拖拽或粘贴得到的数据）。
    Bytes(Vec<u8>),
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}

/// 整张源图的像素尺寸。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// 已加载的源图片。
///
/// 保存原始字节与 header 中读出的尺寸；完整解码推迟到预览或导出阶段。
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    bytes: Vec<u8>,
    dimensions: ImageDimensions,
    source_hint: &'static str,
}

impl SourceImage {
    pub(crate) fn new(raw: RawImageData, dimensions: ImageDimensions) -> Self {
        Self {
            bytes: raw.bytes,
            dimensions,
            source_hint: raw.source_hint,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn dimensions(&self) -> ImageDimensions {
        self.dimensions
    }

    pub fn source_hint(&self) -> &'static str {
        self.source_hint
    }
}
