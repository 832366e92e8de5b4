//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（本地文件 / Base64 / 内存字节）的原始字节加载，
//! 并在“尽可能早”的阶段执行输入校验：体积上限、文件签名。
//! 目标是尽快失败，减少不必要的内存与 CPU 消耗。

use base64::{Engine as _, engine::general_purpose};
use std::path::Path;

use super::source::RawImageData;
use super::{AtlasConfig, AtlasError, AtlasHandler};

impl AtlasHandler {
    /// 从本地路径加载图片原始字节。
    pub(super) fn load_from_file(
        &self,
        path: &str,
        config: &AtlasConfig,
    ) -> Result<RawImageData, AtlasError> {
        log::info!("📁 开始读取本地图片 - 路径: {}", path);

        let file_path = Path::new(path);
        if !file_path.exists() {
            return Err(AtlasError::FileSystem(format!("文件不存在：{}", path)));
        }

        let metadata = std::fs::metadata(file_path)
            .map_err(|e| AtlasError::FileSystem(format!("无法读取文件信息：{}", e)))?;

        if metadata.len() > config.max_file_size {
            return Err(AtlasError::ResourceLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                metadata.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        let bytes = std::fs::read(file_path)
            .map_err(|e| AtlasError::FileSystem(format!("无法读取图片文件：{}", e)))?;
        Self::validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            source_hint: "file",
        })
    }

    /// 从 Base64 字符串加载图片原始字节。
    pub(super) fn load_from_base64(
        &self,
        data: &str,
        config: &AtlasConfig,
    ) -> Result<RawImageData, AtlasError> {
        log::info!("📝 开始处理 base64 图片");

        let bytes = Self::parse_base64_with_limit(data, config.max_file_size)?;
        Self::validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            source_hint: "base64",
        })
    }

    /// 接收已在内存中的图片字节。
    pub(super) fn load_from_bytes(
        &self,
        bytes: Vec<u8>,
        config: &AtlasConfig,
    ) -> Result<RawImageData, AtlasError> {
        if bytes.len() as u64 > config.max_file_size {
            return Err(AtlasError::ResourceLimit(format!(
                "图片数据过大：{:.2} MB（限制：{:.2} MB）",
                bytes.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        Self::validate_image_signature(&bytes)?;

        Ok(RawImageData {
            bytes,
            source_hint: "bytes",
        })
    }

    /// 去掉 Data URL 前缀，只保留 Base64 正文。
    fn strip_data_url_prefix(data: &str) -> &str {
        let trimmed = data.trim();
        if trimmed.starts_with("data:") {
            if let Some((_, payload)) = trimmed.split_once(',') {
                return payload;
            }
        }
        trimmed
    }

    /// 由 Base64 长度估算解码后的字节数上界。
    fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, AtlasError> {
        let len = base64_data.len() as u64;
        len.checked_add(3)
            .map(|padded| padded / 4 * 3)
            .ok_or_else(|| AtlasError::ResourceLimit("Base64 长度溢出".to_string()))
    }

    fn parse_base64_with_limit(data: &str, max_file_size: u64) -> Result<Vec<u8>, AtlasError> {
        let payload = Self::strip_data_url_prefix(data);
        if payload.is_empty() {
            return Err(AtlasError::InvalidFormat("Base64 内容为空".to_string()));
        }

        let upper_bound = Self::estimate_base64_decoded_upper_bound_len(payload)?;
        if upper_bound > max_file_size {
            return Err(AtlasError::ResourceLimit(format!(
                "Base64 数据过大：约 {:.2} MB（限制：{:.2} MB）",
                upper_bound as f64 / 1024.0 / 1024.0,
                max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| AtlasError::InvalidFormat(format!("Base64 解码失败：{}", e)))
    }

    /// 通过文件签名（magic bytes）校验输入是否为图片。
    fn validate_image_signature(bytes: &[u8]) -> Result<(), AtlasError> {
        if bytes.is_empty() {
            return Err(AtlasError::InvalidFormat("图片内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| AtlasError::InvalidFormat("无法识别图片类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(AtlasError::InvalidFormat(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(())
    }
}
