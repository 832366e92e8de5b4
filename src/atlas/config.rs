//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `AtlasConfig`：输入体积与像素上限、帧数上限、
//! 图集包扩展名、PNG 压缩档位以及预览网格线颜色。
//! 压缩档位（fastest / balanced / smallest）作为高层语义，映射到 PNG 编码参数。
//!
//! ## 实现思路
//!
//! - `Default` 提供可直接用于生产的配置。
//! - `CompressionProfile` 负责档位字符串解析与反向输出。
//! - 配置可序列化为 JSON，由调用方决定存放位置；文件损坏时回退默认值。

use std::fs;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType};
use serde::{Deserialize, Serialize};

use super::AtlasError;

/// 图集处理配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// 读取原始字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 单次切片允许产生的最大帧数。
    pub max_frames: u64,
    /// 图集包目录扩展名（不含点）。
    pub package_extension: String,
    /// PNG 压缩档位。
    pub compression: CompressionProfile,
    /// 预览网格线颜色（RGBA）。
    pub grid_color: [u8; 4],
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            max_frames: 100_000,
            package_extension: "atlas".to_string(),
            compression: CompressionProfile::Balanced,
            grid_color: [204, 204, 204, 255],
        }
    }
}

/// PNG 压缩档位。
///
/// - `Fastest`：优先导出速度
/// - `Balanced`：体积与速度平衡
/// - `Smallest`：尽量压缩体积
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionProfile {
    Fastest,
    Balanced,
    Smallest,
}

impl CompressionProfile {
    /// 从外部字符串解析档位（忽略大小写与首尾空白）。
    pub fn from_str(profile: &str) -> Result<Self, AtlasError> {
        match profile.trim().to_lowercase().as_str() {
            "fastest" => Ok(Self::Fastest),
            "balanced" => Ok(Self::Balanced),
            "smallest" => Ok(Self::Smallest),
            other => Err(AtlasError::InvalidFormat(format!(
                "未知压缩档位：{}（可选：fastest / balanced / smallest）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fastest => "fastest",
            Self::Balanced => "balanced",
            Self::Smallest => "smallest",
        }
    }

    /// 档位对应的 PNG 编码参数。
    pub(crate) fn png_settings(self) -> (CompressionType, FilterType) {
        match self {
            Self::Fastest => (CompressionType::Fast, FilterType::NoFilter),
            Self::Balanced => (CompressionType::Default, FilterType::Adaptive),
            Self::Smallest => (CompressionType::Best, FilterType::Adaptive),
        }
    }
}

/// 从 JSON 文件读取配置。
///
/// 文件不存在、无法读取或内容非法时回退为默认配置。
pub fn load_config_from_path(config_path: &Path) -> AtlasConfig {
    if config_path.exists() {
        match fs::read_to_string(config_path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => return config,
                Err(err) => log::warn!("⚠️ 配置文件解析失败，使用默认配置：{}", err),
            },
            Err(err) => log::warn!("⚠️ 配置文件读取失败，使用默认配置：{}", err),
        }
    }
    AtlasConfig::default()
}

/// 将配置写入 JSON 文件。
pub fn save_config_to_path(config_path: &Path, config: &AtlasConfig) -> Result<(), AtlasError> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| AtlasError::InvalidFormat(format!("序列化配置失败：{}", e)))?;
    fs::write(config_path, content)
        .map_err(|e| AtlasError::FileSystem(format!("写入配置文件失败：{}", e)))?;
    Ok(())
}
