//! # 网格预览叠加
//!
//! 纯函数：复制源图并在帧边界处画 1 像素网格线，仅用于人工检查切片效果，
//! 与导出逻辑完全无关。

use image::{DynamicImage, Rgba, RgbaImage};

use super::slicer::SliceResult;

/// 在源图副本上绘制切片网格线。
///
/// 竖线位于 `x = fw, 2fw, …`（< 图宽），横线位于 `y = fh, 2fh, …`（< 图高）。
/// 网格按切片结果中的整图尺寸计算，超出实际像素范围的部分被忽略。
pub fn render_overlay(image: &DynamicImage, result: &SliceResult, color: Rgba<u8>) -> RgbaImage {
    let mut canvas = image.to_rgba8();
    let (canvas_width, canvas_height) = canvas.dimensions();

    let dimensions = result.dimensions();
    let frame_size = result.frame_size();
    let step_x = frame_size.frame_width.max(1) as usize;
    let step_y = frame_size.frame_height.max(1) as usize;
    let grid_width = dimensions.width.min(canvas_width);
    let grid_height = dimensions.height.min(canvas_height);

    for x in (0..grid_width).step_by(step_x).skip(1) {
        for y in 0..grid_height {
            canvas.put_pixel(x, y, color);
        }
    }

    for y in (0..grid_height).step_by(step_y).skip(1) {
        for x in 0..grid_width {
            canvas.put_pixel(x, y, color);
        }
    }

    canvas
}
