//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `AtlasHandler` 只负责流程编排与配置管理，不持有“当前图片”之类的隐式状态：
//! 图片以 `SourceImage` 显式传入每一次调用。处理链路固定为：
//! 1. 读取配置快照
//! 2. 按来源加载原始字节并检查尺寸
//! 3. 网格切片（含帧数上限）
//! 4. 编码 + 写入图集包
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<AtlasConfig>>` 支持运行时调整。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 记录 `load/slice/export` 阶段耗时，便于性能诊断。

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use super::overlay::render_overlay;
use super::pipeline::decode_source;
use super::slicer::{self, FrameSize, SliceResult};
use super::{
    AtlasConfig, AtlasError, AtlasExporter, AtlasPackage, CompressionProfile, ImageSource,
    SourceImage,
};

/// 可由调用方整体读写的高级配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasAdvancedConfig {
    pub max_file_size: u64,
    pub max_decoded_bytes: u64,
    pub max_frames: u64,
    pub package_extension: String,
    pub grid_color: [u8; 4],
}

/// 图集处理器。
pub struct AtlasHandler {
    pub(super) config: Arc<RwLock<AtlasConfig>>,
}

impl AtlasHandler {
    pub fn new(config: AtlasConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// 获取配置快照。
    pub(crate) fn config_snapshot(&self) -> Result<AtlasConfig, AtlasError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| AtlasError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    pub fn set_compression_profile(&self, profile: CompressionProfile) -> Result<(), AtlasError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| AtlasError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.compression = profile;

        log::info!("⚙️ 已切换 PNG 压缩档位：{}", profile.as_str());
        Ok(())
    }

    pub fn get_compression_profile(&self) -> Result<CompressionProfile, AtlasError> {
        Ok(self.config_snapshot()?.compression)
    }

    /// 设置体积上限、帧数上限、包扩展名与网格颜色。
    pub fn set_advanced_config(&self, advanced: AtlasAdvancedConfig) -> Result<(), AtlasError> {
        if advanced.max_file_size < 1024 * 1024 {
            return Err(AtlasError::InvalidFormat("max_file_size 不能小于 1MB".to_string()));
        }
        if advanced.max_decoded_bytes < 8 * 1024 * 1024 {
            return Err(AtlasError::InvalidFormat("max_decoded_bytes 不能小于 8MB".to_string()));
        }
        if !(1..=1_000_000).contains(&advanced.max_frames) {
            return Err(AtlasError::InvalidFormat("max_frames 必须在 1~1000000 之间".to_string()));
        }
        let extension = advanced.package_extension.trim().trim_start_matches('.');
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AtlasError::InvalidFormat(format!(
                "package_extension 只能包含字母和数字：{}",
                advanced.package_extension
            )));
        }

        let mut config = self
            .config
            .write()
            .map_err(|_| AtlasError::ResourceLimit("配置写入锁已中毒".to_string()))?;

        config.max_file_size = advanced.max_file_size;
        config.max_decoded_bytes = advanced.max_decoded_bytes;
        config.max_frames = advanced.max_frames;
        config.package_extension = extension.to_string();
        config.grid_color = advanced.grid_color;

        Ok(())
    }

    pub fn get_advanced_config(&self) -> Result<AtlasAdvancedConfig, AtlasError> {
        let config = self.config_snapshot()?;
        Ok(AtlasAdvancedConfig {
            max_file_size: config.max_file_size,
            max_decoded_bytes: config.max_decoded_bytes,
            max_frames: config.max_frames,
            package_extension: config.package_extension,
            grid_color: config.grid_color,
        })
    }

    /// 按来源加载图片，得到可切片的 `SourceImage`。
    pub fn load(&self, source: ImageSource) -> Result<SourceImage, AtlasError> {
        let config = self.config_snapshot()?;
        let load_start = Instant::now();

        let raw = match source {
            ImageSource::FilePath(path) => self.load_from_file(&path, &config)?,
            ImageSource::Base64(data) => self.load_from_base64(&data, &config)?,
            ImageSource::Bytes(bytes) => self.load_from_bytes(bytes, &config)?,
        };
        let image = self.inspect_source(raw, &config)?;

        log::debug!("⏱️ load={}ms", load_start.elapsed().as_millis());
        Ok(image)
    }

    /// 对已加载图片执行网格切片。
    pub fn slice_image(
        &self,
        image: Option<&SourceImage>,
        frame_width: i64,
        frame_height: i64,
    ) -> Result<SliceResult, AtlasError> {
        let image = image.ok_or(AtlasError::NoImageLoaded)?;
        let config = self.config_snapshot()?;
        let dimensions = image.dimensions();
        let frame_size = FrameSize::new(frame_width, frame_height);

        let count = slicer::frame_count(dimensions, frame_size)?;
        if count > config.max_frames {
            return Err(AtlasError::ResourceLimit(format!(
                "帧数过多：{}（限制：{}）",
                count, config.max_frames
            )));
        }

        let slice_start = Instant::now();
        let result = slicer::slice(dimensions, frame_size)?;

        log::debug!(
            "✂️ 切片完成 - {}x{} 帧尺寸 {}x{} 网格 {}x{} 共 {} 帧 slice={}ms",
            dimensions.width,
            dimensions.height,
            frame_width,
            frame_height,
            result.columns(),
            result.rows(),
            result.frames().len(),
            slice_start.elapsed().as_millis()
        );

        Ok(result)
    }

    /// 将已加载图片与切片结果导出为图集包。
    ///
    /// 目标路径缺少包扩展名时自动补上。
    pub fn export_image(
        &self,
        image: Option<&SourceImage>,
        result: &SliceResult,
        destination: &Path,
    ) -> Result<AtlasPackage, AtlasError> {
        let image = image.ok_or(AtlasError::NoImageLoaded)?;
        let config = self.config_snapshot()?;

        if image.dimensions() != result.dimensions() {
            return Err(AtlasError::InvalidFormat(format!(
                "切片结果尺寸 {}x{} 与当前图片 {}x{} 不一致",
                result.dimensions().width,
                result.dimensions().height,
                image.dimensions().width,
                image.dimensions().height
            )));
        }

        let destination = with_package_extension(destination, &config.package_extension);
        let total_start = Instant::now();
        let package = AtlasExporter::new(config.compression).export(image.bytes(), result, &destination)?;

        log::info!(
            "✅ 图集处理完成 - 来源: {} total={}ms",
            image.source_hint(),
            total_start.elapsed().as_millis()
        );

        Ok(package)
    }

    /// 生成带网格线的预览图；`show_grid` 为 false 时返回原图副本。
    pub fn preview(
        &self,
        image: Option<&SourceImage>,
        frame_width: i64,
        frame_height: i64,
        show_grid: bool,
    ) -> Result<RgbaImage, AtlasError> {
        let result = self.slice_image(image, frame_width, frame_height)?;
        let image = image.ok_or(AtlasError::NoImageLoaded)?;
        let config = self.config_snapshot()?;

        let decoded = decode_source(image)?;
        if !show_grid {
            return Ok(decoded.to_rgba8());
        }
        Ok(render_overlay(&decoded, &result, Rgba(config.grid_color)))
    }
}

/// 目标路径扩展名不是包扩展名时追加之（`foo` → `foo.atlas`）。
pub(crate) fn with_package_extension(destination: &Path, extension: &str) -> PathBuf {
    let matches = destination
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
    if matches {
        return destination.to_path_buf();
    }

    let mut name = destination.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat};
    use std::io::Cursor;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255])
        });
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    fn unique_temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock error")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("sprite-framer-handler-test-{nanos}"));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn advanced() -> AtlasAdvancedConfig {
        AtlasAdvancedConfig {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_bytes: 160 * 1024 * 1024,
            max_frames: 100_000,
            package_extension: "atlas".to_string(),
            grid_color: [204, 204, 204, 255],
        }
    }

    #[test]
    fn slice_without_image_reports_no_image_loaded() {
        let handler = AtlasHandler::new(AtlasConfig::default());
        let result = handler.slice_image(None, 16, 16);
        assert!(matches!(result, Err(AtlasError::NoImageLoaded)));
    }

    #[test]
    fn slice_enforces_frame_limit() {
        let config = AtlasConfig {
            max_frames: 10,
            ..AtlasConfig::default()
        };
        let handler = AtlasHandler::new(config);
        let image = handler
            .load(ImageSource::Bytes(create_png_bytes(64, 64)))
            .expect("load should succeed");

        assert!(handler.slice_image(Some(&image), 32, 32).is_ok());
        let result = handler.slice_image(Some(&image), 8, 8);
        assert!(matches!(result, Err(AtlasError::ResourceLimit(_))));
    }

    #[test]
    fn export_rejects_mismatched_slice_result() {
        let handler = AtlasHandler::new(AtlasConfig::default());
        let small = handler
            .load(ImageSource::Bytes(create_png_bytes(16, 16)))
            .expect("load small");
        let large = handler
            .load(ImageSource::Bytes(create_png_bytes(32, 32)))
            .expect("load large");
        let result = handler.slice_image(Some(&large), 16, 16).expect("slice");

        let err = handler
            .export_image(Some(&small), &result, Path::new("/tmp/never.atlas"))
            .expect_err("export should fail");
        assert!(matches!(err, AtlasError::InvalidFormat(_)));
    }

    #[test]
    fn export_appends_package_extension() {
        let dir = unique_temp_dir();
        let handler = AtlasHandler::new(AtlasConfig::default());
        let image = handler
            .load(ImageSource::Bytes(create_png_bytes(32, 16)))
            .expect("load should succeed");
        let result = handler.slice_image(Some(&image), 16, 16).expect("slice");

        let package = handler
            .export_image(Some(&image), &result, &dir.join("walk"))
            .expect("export should succeed");

        assert_eq!(package.directory, dir.join("walk.atlas"));
        assert!(dir.join("walk.atlas").join("walk.png").is_file());
        assert!(dir.join("walk.atlas").join("walk.plist").is_file());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn package_extension_is_only_appended_when_missing() {
        assert_eq!(
            with_package_extension(Path::new("out/foo.atlas"), "atlas"),
            PathBuf::from("out/foo.atlas")
        );
        assert_eq!(
            with_package_extension(Path::new("out/foo.ATLAS"), "atlas"),
            PathBuf::from("out/foo.ATLAS")
        );
        assert_eq!(
            with_package_extension(Path::new("out/foo.png"), "atlas"),
            PathBuf::from("out/foo.png.atlas")
        );
    }

    #[test]
    fn preview_toggles_grid() {
        let handler = AtlasHandler::new(AtlasConfig::default());
        let image = handler
            .load(ImageSource::Bytes(create_png_bytes(8, 8)))
            .expect("load should succeed");
        let grid = Rgba(AtlasConfig::default().grid_color);

        let with_grid = handler.preview(Some(&image), 4, 4, true).expect("preview");
        let without_grid = handler.preview(Some(&image), 4, 4, false).expect("preview");

        assert_eq!(*with_grid.get_pixel(4, 1), grid);
        assert_ne!(*without_grid.get_pixel(4, 1), grid);
    }

    #[test]
    fn compression_profile_roundtrip() {
        let handler = AtlasHandler::new(AtlasConfig::default());
        handler
            .set_compression_profile(CompressionProfile::Smallest)
            .expect("set profile");
        assert_eq!(
            handler.get_compression_profile().expect("get profile"),
            CompressionProfile::Smallest
        );
    }

    #[test]
    fn advanced_config_rejects_invalid_values() {
        let handler = AtlasHandler::new(AtlasConfig::default());

        let too_small = AtlasAdvancedConfig {
            max_decoded_bytes: 1024,
            ..advanced()
        };
        assert!(matches!(handler.set_advanced_config(too_small), Err(AtlasError::InvalidFormat(_))));

        let no_frames = AtlasAdvancedConfig {
            max_frames: 0,
            ..advanced()
        };
        assert!(matches!(handler.set_advanced_config(no_frames), Err(AtlasError::InvalidFormat(_))));

        let bad_extension = AtlasAdvancedConfig {
            package_extension: "at/las".to_string(),
            ..advanced()
        };
        assert!(matches!(
            handler.set_advanced_config(bad_extension),
            Err(AtlasError::InvalidFormat(_))
        ));
    }

    #[test]
    fn advanced_config_accepts_valid_values() {
        let handler = AtlasHandler::new(AtlasConfig::default());
        handler
            .set_advanced_config(AtlasAdvancedConfig {
                max_frames: 64,
                package_extension: ".sheet".to_string(),
                grid_color: [0, 255, 0, 255],
                ..advanced()
            })
            .expect("advanced config should be accepted");

        let stored = handler.get_advanced_config().expect("read advanced config");
        assert_eq!(stored.max_frames, 64);
        assert_eq!(stored.package_extension, "sheet");
        assert_eq!(stored.grid_color, [0, 255, 0, 255]);
    }
}
