//! # 图集导出模块
//!
//! ## 设计思路
//!
//! 一次导出产出一个“包”目录：`<name>.atlas/<name>.png` + `<name>.atlas/<name>.plist`。
//! 导出不是事务性的：目录先被整体删除再重建，随后先写图片、后写 plist，
//! 保证任何失败都不会留下引用缺失图片的 plist。
//!
//! ## 步骤
//!
//! 1. 编码 PNG（失败时不触碰磁盘上已有的包）
//! 2. 删除已存在的目标（尽力而为，错误只记日志）
//! 3. 非递归创建目标目录
//! 4. 构建并序列化 `AtlasDocument`
//! 5. 写图片，再写 plist

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use super::document::AtlasDocument;
use super::pipeline::encode_png;
use super::slicer::SliceResult;
use super::{CompressionProfile, ExportError};

/// 由目标路径推导出的包内文件路径。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtlasPackage {
    pub directory: PathBuf,
    pub name: String,
    pub texture_path: PathBuf,
    pub metadata_path: PathBuf,
}

impl AtlasPackage {
    /// 以目标目录的文件名（去掉扩展名）作为包内文件的基础名。
    pub fn from_destination(destination: &Path) -> Result<Self, ExportError> {
        let name = destination
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .filter(|stem| !stem.is_empty() && stem != "." && stem != "..")
            .ok_or_else(|| {
                ExportError::DirectoryCreateFailed(format!(
                    "无法从目标路径推导包名：{}",
                    destination.display()
                ))
            })?;

        Ok(Self {
            directory: destination.to_path_buf(),
            texture_path: destination.join(format!("{name}.png")),
            metadata_path: destination.join(format!("{name}.plist")),
            name,
        })
    }

    /// 纹理文件名（不含路径），写入 plist 的 `realTextureFileName`。
    pub fn texture_file_name(&self) -> String {
        format!("{}.png", self.name)
    }
}

/// 图集导出器。
#[derive(Debug, Clone, Copy)]
pub struct AtlasExporter {
    compression: CompressionProfile,
}

impl Default for AtlasExporter {
    fn default() -> Self {
        Self::new(CompressionProfile::Balanced)
    }
}

impl AtlasExporter {
    pub fn new(compression: CompressionProfile) -> Self {
        Self { compression }
    }

    /// 将源图片与切片结果写成图集包。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use sprite_framer::atlas::{slice, AtlasExporter, FrameSize, ImageDimensions};
    /// use std::path::Path;
    ///
    /// let png = std::fs::read("sheet.png")?;
    /// let result = slice(ImageDimensions::new(128, 64), FrameSize::new(32, 32))?;
    /// AtlasExporter::default().export(&png, &result, Path::new("out/sheet.atlas"))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn export(
        &self,
        image: &[u8],
        result: &SliceResult,
        destination: &Path,
    ) -> Result<AtlasPackage, ExportError> {
        let package = AtlasPackage::from_destination(destination)?;

        let encode_start = Instant::now();
        let png = encode_png(image, self.compression)?;
        let encode_elapsed = encode_start.elapsed();

        remove_existing(&package.directory);

        fs::create_dir(&package.directory).map_err(|e| {
            ExportError::DirectoryCreateFailed(format!("{}：{}", package.directory.display(), e))
        })?;

        let document = AtlasDocument::build(result, &package.texture_file_name());
        let plist = document.to_xml();

        let write_start = Instant::now();
        fs::write(&package.texture_path, &png).map_err(|e| {
            ExportError::WriteFailed(format!("{}：{}", package.texture_path.display(), e))
        })?;
        fs::write(&package.metadata_path, plist).map_err(|e| {
            ExportError::WriteFailed(format!("{}：{}", package.metadata_path.display(), e))
        })?;

        log::info!(
            "✅ 图集导出完成 - {} 帧数: {} encode={}ms write={}ms",
            package.directory.display(),
            document.frames.len(),
            encode_elapsed.as_millis(),
            write_start.elapsed().as_millis()
        );

        Ok(package)
    }
}

/// 删除已存在的目标；失败只记录日志，不中断导出。
/// 不跟随符号链接：悬空链接同样按普通文件删除。
fn remove_existing(path: &Path) {
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return;
    };
    let removal = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match removal {
        Ok(()) => log::debug!("🧹 已删除旧图集包：{}", path.display()),
        Err(err) => log::warn!("⚠️ 删除旧图集包失败，继续导出：{} ({})", path.display(), err),
    }
}
