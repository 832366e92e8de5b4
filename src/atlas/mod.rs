//! # 图集模块（atlas）
//!
//! ## 设计思路
//!
//! 该模块将“图片加载校验 → 网格切片 → 描述文档 → 编码写盘”按职责拆分为多个子模块，
//! 避免单文件膨胀与耦合。
//!
//! - `service`：承载可注入状态（`AtlasServiceState`），外部界面只和它打交道
//! - `handler`：编排整条处理流水线
//! - `loader`：负责文件/Base64/内存字节加载与安全校验
//! - `pipeline`：负责尺寸检查、解码与 PNG 重新编码
//! - `slicer`：纯函数网格切片
//! - `document`：图集 plist 文档
//! - `exporter`：图集包目录与文件写入
//! - `overlay`：预览网格线
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! 外部界面（选图 / 输入帧宽高 / 选择保存位置）
//!    ↓
//! service.rs（状态持有、服务入口）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ loader.rs + pipeline.rs（加载 → SourceImage）
//!    ├─ slicer.rs（SourceImage 尺寸 + 帧尺寸 → SliceResult）
//!    ├─ overlay.rs（预览）
//!    └─ exporter.rs + document.rs（foo.atlas/foo.png + foo.atlas/foo.plist）
//!    ↓
//! 返回 AtlasError / AtlasCommandError 给调用方
//! ```

mod config;
mod document;
mod error;
mod exporter;
mod handler;
mod loader;
mod overlay;
mod pipeline;
mod service;
mod slicer;
mod source;

pub use config::{load_config_from_path, save_config_to_path, AtlasConfig, CompressionProfile};
pub use document::{
    format_rect, format_size, frame_name, AtlasDocument, AtlasMetadata, FrameRecord, PlistValue,
    ATLAS_FORMAT_VERSION,
};
pub use error::{AtlasCommandError, AtlasError, ExportError, SliceError};
pub use exporter::{AtlasExporter, AtlasPackage};
pub use handler::AtlasAdvancedConfig;
pub use overlay::render_overlay;
pub use service::AtlasServiceState;
pub use slicer::{frame_count, slice, Frame, FrameSize, SliceResult};
pub use source::{ImageDimensions, ImageSource, SourceImage};

/// 内部核心编排器，外部通过 `AtlasServiceState` 使用。
pub(crate) use handler::AtlasHandler;
