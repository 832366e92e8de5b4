//! # 解码与编码流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 尺寸 → 图像 → PNG”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先读取 header 尺寸做检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素 / 内存上限快速拒绝
//! 3. 需要像素时再完整解码
//! 4. 以无损 PNG 重新编码，压缩参数来自配置档位

use image::codecs::png::PngEncoder;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;

use super::source::{ImageDimensions, RawImageData, SourceImage};
use super::{AtlasConfig, AtlasError, AtlasHandler, CompressionProfile, ExportError};

impl AtlasHandler {
    /// 检查 header 尺寸与资源上限，生成可切片的 `SourceImage`。
    pub(crate) fn inspect_source(
        &self,
        raw: RawImageData,
        config: &AtlasConfig,
    ) -> Result<SourceImage, AtlasError> {
        let (width, height) = inspect_dimensions_from_memory(&raw.bytes)?;
        validate_pixel_limits(config, width, height)?;
        validate_decoded_memory_limits(config, width, height)?;

        log::info!(
            "✅ 图片加载成功 - 来源: {} 尺寸: {}x{} 体积: {}KB",
            raw.source_hint,
            width,
            height,
            raw.bytes.len() / 1024
        );

        Ok(SourceImage::new(raw, ImageDimensions::new(width, height)))
    }
}

/// 仅通过内存中的图片头信息读取宽高。
fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), AtlasError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AtlasError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| AtlasError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
}

/// 校验像素数量是否超过配置上限。
fn validate_pixel_limits(config: &AtlasConfig, width: u32, height: u32) -> Result<(), AtlasError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| AtlasError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > config.max_decoded_pixels {
        return Err(AtlasError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}

fn validate_decoded_memory_limits(
    config: &AtlasConfig,
    width: u32,
    height: u32,
) -> Result<(), AtlasError> {
    let estimated = (width as u64)
        .checked_mul(height as u64)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| AtlasError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

    if estimated > config.max_decoded_bytes {
        return Err(AtlasError::ResourceLimit(format!(
            "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
            estimated as f64 / 1024.0 / 1024.0,
            config.max_decoded_bytes as f64 / 1024.0 / 1024.0
        )));
    }

    Ok(())
}

/// 完整解码源图片，供预览叠加网格使用。
pub(crate) fn decode_source(image: &SourceImage) -> Result<DynamicImage, AtlasError> {
    image::load_from_memory(image.bytes())
        .map_err(|e| AtlasError::Decode(format!("图片解码失败：{}", e)))
}

/// 将任意可解码的图片字节重新编码为 PNG。
pub(crate) fn encode_png(bytes: &[u8], profile: CompressionProfile) -> Result<Vec<u8>, ExportError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ExportError::EncodingFailed(format!("源图片无法解码：{}", e)))?;
    let (width, height) = decoded.dimensions();

    // PNG 不支持浮点像素，先无损扩展为 16 位 RGBA。
    let encodable = match decoded {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            DynamicImage::ImageRgba16(decoded.to_rgba16())
        }
        other => other,
    };

    let (compression, filter) = profile.png_settings();
    let mut out = Vec::new();
    encodable
        .write_with_encoder(PngEncoder::new_with_quality(&mut out, compression, filter))
        .map_err(|e| ExportError::EncodingFailed(format!("PNG 编码失败：{}", e)))?;

    log::debug!(
        "🧩 PNG 编码完成 - {}x{} profile={} 输出={}KB",
        width,
        height,
        profile.as_str(),
        out.len() / 1024
    );

    Ok(out)
}
