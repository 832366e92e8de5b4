//! # 精灵图切帧工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │        外部界面（窗口 / 文件选择 / 实时预览）             │
//! │   提供：图片、帧宽、帧高、目标路径（*.atlas）             │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ Result<T, AtlasError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            核心库 (Rust)                         │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  └─ atlas ────── 加载 · 切片 · 预览 · 导出                │
//! │      ├─ slicer       行优先网格切片（纯函数）             │
//! │      ├─ document     图集 plist（format 3）               │
//! │      └─ exporter     foo.atlas/{foo.png, foo.plist}       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`atlas`] | 图片加载校验、网格切片、网格预览、图集包导出 |

pub mod atlas;
pub mod error;
