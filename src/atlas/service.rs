//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! 使用 `AtlasServiceState` 作为外部界面（窗口、文件选择器等）持有的服务状态，
//! 替代“当前已加载图片”这类全局可变状态：图片由调用方持有并在每次请求时显式传入。
//!
//! ## 实现思路
//!
//! 对外仅暴露少量稳定 API：
//! - `load_source`：加载图片
//! - `request_slice`：切片（无图片或帧尺寸非法时返回错误）
//! - `request_export` / `request_export_in_background`：导出图集包
//! - `request_preview`：带网格线的预览
//! - 压缩档位与高级配置的读写

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;

use super::config::load_config_from_path;
use super::{
    AtlasAdvancedConfig, AtlasConfig, AtlasError, AtlasHandler, AtlasPackage, CompressionProfile,
    ImageSource, SliceResult, SourceImage,
};

/// 图集服务状态。
pub struct AtlasServiceState {
    handler: Arc<AtlasHandler>,
}

impl AtlasServiceState {
    /// 使用默认配置创建服务状态。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use sprite_framer::atlas::{AtlasServiceState, ImageSource};
    ///
    /// let service = AtlasServiceState::new();
    /// let image = service.load_source(ImageSource::FilePath("sheet.png".into()))?;
    /// let slices = service.request_slice(Some(&image), 32, 32)?;
    /// service.request_export(Some(&image), &slices, "out/sheet.atlas")?;
    /// # Ok::<(), sprite_framer::atlas::AtlasError>(())
    /// ```
    pub fn new() -> Self {
        Self::with_config(AtlasConfig::default())
    }

    pub fn with_config(config: AtlasConfig) -> Self {
        Self {
            handler: Arc::new(AtlasHandler::new(config)),
        }
    }

    /// 从 JSON 配置文件创建；文件缺失或损坏时使用默认配置。
    pub fn from_config_file(config_path: &Path) -> Self {
        Self::with_config(load_config_from_path(config_path))
    }

    pub fn config(&self) -> Result<AtlasConfig, AtlasError> {
        self.handler.config_snapshot()
    }

    pub fn load_source(&self, source: ImageSource) -> Result<SourceImage, AtlasError> {
        self.handler.load(source)
    }

    /// 切片请求。
    pub fn request_slice(
        &self,
        image: Option<&SourceImage>,
        frame_width: i64,
        frame_height: i64,
    ) -> Result<SliceResult, AtlasError> {
        self.handler.slice_image(image, frame_width, frame_height)
    }

    /// 导出请求：在调用线程上同步执行。
    pub fn request_export(
        &self,
        image: Option<&SourceImage>,
        result: &SliceResult,
        destination: impl AsRef<Path>,
    ) -> Result<AtlasPackage, AtlasError> {
        self.handler.export_image(image, result, destination.as_ref())
    }

    /// 导出请求：放到阻塞线程池执行，避免卡住界面线程。
    pub async fn request_export_in_background(
        &self,
        image: SourceImage,
        result: SliceResult,
        destination: PathBuf,
    ) -> Result<AtlasPackage, AtlasError> {
        let handler = Arc::clone(&self.handler);
        tokio::task::spawn_blocking(move || handler.export_image(Some(&image), &result, &destination))
            .await
            .map_err(|e| AtlasError::FileSystem(format!("导出线程执行失败：{}", e)))?
    }

    /// 预览请求：`show_grid` 控制是否叠加网格线。
    pub fn request_preview(
        &self,
        image: Option<&SourceImage>,
        frame_width: i64,
        frame_height: i64,
        show_grid: bool,
    ) -> Result<RgbaImage, AtlasError> {
        self.handler
            .preview(image, frame_width, frame_height, show_grid)
    }

    /// 按字符串切换 PNG 压缩档位。
    pub fn set_compression_profile(&self, profile: &str) -> Result<(), AtlasError> {
        let profile = CompressionProfile::from_str(profile)?;
        self.handler.set_compression_profile(profile)
    }

    pub fn get_compression_profile(&self) -> Result<String, AtlasError> {
        Ok(self.handler.get_compression_profile()?.as_str().to_string())
    }

    pub fn set_advanced_config(&self, config: AtlasAdvancedConfig) -> Result<(), AtlasError> {
        self.handler.set_advanced_config(config)
    }

    pub fn get_advanced_config(&self) -> Result<AtlasAdvancedConfig, AtlasError> {
        self.handler.get_advanced_config()
    }
}

impl Default for AtlasServiceState {
    fn default() -> Self {
        Self::new()
    }
}
