//! # 图集描述文档模块
//!
//! ## 设计思路
//!
//! `AtlasDocument` 是导出产物中的元数据部分：帧名（三位补零的序号）到帧几何信息的映射，
//! 外加顶层 `metadata`（格式版本、整图尺寸、纹理文件名）。
//!
//! 几何字段沿用 `{a,b}` / `{{a,b},{c,d}}` 的字符串写法，这是下游引擎解析 plist
//! 图集时约定的固定格式，必须逐字符一致。
//!
//! ## 实现思路
//!
//! - 文档先转换为通用的 `PlistValue` 树，再由 `to_xml` 写成 XML property list。
//! - 字典保持插入顺序；帧记录与 metadata 字段按字母序插入，帧按行优先序号插入。

use std::fmt::Write as _;

use serde::Serialize;

use super::slicer::SliceResult;

/// 当前输出的图集 plist 格式版本。
pub const ATLAS_FORMAT_VERSION: i64 = 3;

const PLIST_HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" ",
    "\"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
    "<plist version=\"1.0\">\n",
);

/// `{a,b}`
pub fn format_size(a: impl std::fmt::Display, b: impl std::fmt::Display) -> String {
    format!("{{{},{}}}", a, b)
}

/// `{{x,y},{w,h}}`
pub fn format_rect(
    x: impl std::fmt::Display,
    y: impl std::fmt::Display,
    width: impl std::fmt::Display,
    height: impl std::fmt::Display,
) -> String {
    format!("{{{},{}}}", format_size(x, y), format_size(width, height))
}

/// 帧名：三位补零序号，超过 999 时自然扩展位数。
pub fn frame_name(index: usize) -> String {
    format!("{:03}", index)
}

/// 单帧记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    pub name: String,
    pub sprite_offset: String,
    pub sprite_size: String,
    pub sprite_source_size: String,
    pub texture_rect: String,
}

/// 顶层元数据。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasMetadata {
    pub format: i64,
    pub real_texture_file_name: String,
    pub size: String,
}

/// 图集描述文档，每次导出创建一次。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtlasDocument {
    pub frames: Vec<FrameRecord>,
    pub metadata: AtlasMetadata,
}

impl AtlasDocument {
    /// 由切片结果与纹理文件名（不含路径）构建文档。
    pub fn build(result: &SliceResult, texture_file_name: &str) -> Self {
        let frame_size = result.frame_size();
        let sprite_size = format_size(frame_size.frame_width, frame_size.frame_height);

        let frames = result
            .frames()
            .iter()
            .enumerate()
            .map(|(index, frame)| FrameRecord {
                name: frame_name(index),
                sprite_offset: format_size(0, 0),
                sprite_size: sprite_size.clone(),
                sprite_source_size: sprite_size.clone(),
                texture_rect: format_rect(frame.x, frame.y, frame.width, frame.height),
            })
            .collect();

        let dimensions = result.dimensions();
        Self {
            frames,
            metadata: AtlasMetadata {
                format: ATLAS_FORMAT_VERSION,
                real_texture_file_name: texture_file_name.to_string(),
                size: format_size(dimensions.width, dimensions.height),
            },
        }
    }

    /// 转换为 plist 值树：根字典只有 `frames` 与 `metadata` 两个键。
    pub fn to_plist(&self) -> PlistValue {
        let frames = self
            .frames
            .iter()
            .map(|record| {
                let fields = vec![
                    ("spriteOffset".to_string(), PlistValue::String(record.sprite_offset.clone())),
                    ("spriteSize".to_string(), PlistValue::String(record.sprite_size.clone())),
                    (
                        "spriteSourceSize".to_string(),
                        PlistValue::String(record.sprite_source_size.clone()),
                    ),
                    ("textureRect".to_string(), PlistValue::String(record.texture_rect.clone())),
                ];
                (record.name.clone(), PlistValue::Dictionary(fields))
            })
            .collect();

        let metadata = vec![
            ("format".to_string(), PlistValue::Integer(self.metadata.format)),
            (
                "realTextureFileName".to_string(),
                PlistValue::String(self.metadata.real_texture_file_name.clone()),
            ),
            ("size".to_string(), PlistValue::String(self.metadata.size.clone())),
        ];

        PlistValue::Dictionary(vec![
            ("frames".to_string(), PlistValue::Dictionary(frames)),
            ("metadata".to_string(), PlistValue::Dictionary(metadata)),
        ])
    }

    /// 序列化为 XML property list 文本。
    pub fn to_xml(&self) -> String {
        self.to_plist().to_xml()
    }
}

/// plist 值（只覆盖图集文档用到的类型）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlistValue {
    String(String),
    Integer(i64),
    /// 保持插入顺序的字典。
    Dictionary(Vec<(String, PlistValue)>),
}

impl PlistValue {
    /// 按 Apple XML plist 1.0 格式输出完整文档（制表符缩进）。
    pub fn to_xml(&self) -> String {
        let mut out = String::from(PLIST_HEADER);
        self.write_xml(&mut out, 0);
        out.push_str("</plist>\n");
        out
    }

    fn write_xml(&self, out: &mut String, depth: usize) {
        let indent = "\t".repeat(depth);
        match self {
            Self::String(value) => {
                let _ = writeln!(out, "{indent}<string>{}</string>", escape_xml(value));
            }
            Self::Integer(value) => {
                let _ = writeln!(out, "{indent}<integer>{value}</integer>");
            }
            Self::Dictionary(entries) if entries.is_empty() => {
                let _ = writeln!(out, "{indent}<dict/>");
            }
            Self::Dictionary(entries) => {
                let _ = writeln!(out, "{indent}<dict>");
                for (key, value) in entries {
                    let _ = writeln!(out, "{indent}\t<key>{}</key>", escape_xml(key));
                    value.write_xml(out, depth + 1);
                }
                let _ = writeln!(out, "{indent}</dict>");
            }
        }
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
