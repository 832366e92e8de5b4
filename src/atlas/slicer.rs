//! # 网格切片模块
//!
//! ## 设计思路
//!
//! 纯计算：给定整图尺寸与帧尺寸，按行优先顺序（先第 0 行从左到右，再第 1 行……）
//! 生成覆盖整图的帧矩形序列。不做任何 I/O，相同输入永远得到相同输出。
//!
//! ## 边界约定
//!
//! 当整图尺寸不是帧尺寸的整数倍时，最后一列/行的帧**不会**被裁剪到图片边界，
//! 其名义宽高始终等于帧宽高。需要界内几何的调用方须自行裁剪。

use serde::Serialize;

use super::source::ImageDimensions;
use super::SliceError;

/// 用户请求的帧尺寸（原始输入，允许为非正数以便统一拒绝）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FrameSize {
    pub frame_width: i64,
    pub frame_height: i64,
}

impl FrameSize {
    pub fn new(frame_width: i64, frame_height: i64) -> Self {
        Self {
            frame_width,
            frame_height,
        }
    }

    /// 校验并转换为 `u32` 宽高。
    fn validated(self) -> Result<(u32, u32), SliceError> {
        let invalid = || SliceError::InvalidFrameSize {
            frame_width: self.frame_width,
            frame_height: self.frame_height,
        };

        let width = u32::try_from(self.frame_width).map_err(|_| invalid())?;
        let height = u32::try_from(self.frame_height).map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok((width, height))
    }
}

/// 单帧矩形（像素坐标，原点左上角）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Frame {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// 一次切片请求的结果，创建后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliceResult {
    dimensions: ImageDimensions,
    frame_size: FrameSize,
    frames: Vec<Frame>,
}

impl SliceResult {
    pub fn dimensions(&self) -> ImageDimensions {
        self.dimensions
    }

    pub fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// 网格列数（最后一列可能超出图片边界）。
    pub fn columns(&self) -> u32 {
        self.dimensions
            .width
            .div_ceil(self.frame_size.frame_width as u32)
    }

    /// 网格行数。
    pub fn rows(&self) -> u32 {
        self.dimensions
            .height
            .div_ceil(self.frame_size.frame_height as u32)
    }
}

/// 计算切片将产生的帧数，不分配帧序列。
pub fn frame_count(dimensions: ImageDimensions, frame_size: FrameSize) -> Result<u64, SliceError> {
    let (frame_width, frame_height) = frame_size.validated()?;
    let columns = dimensions.width.div_ceil(frame_width) as u64;
    let rows = dimensions.height.div_ceil(frame_height) as u64;
    Ok(columns * rows)
}

/// 按行优先顺序将整图切成等大的帧。
///
/// # 示例
/// ```rust
/// use sprite_framer::atlas::{slice, FrameSize, ImageDimensions};
///
/// let result = slice(ImageDimensions::new(100, 50), FrameSize::new(40, 50))?;
/// assert_eq!(result.frames().len(), 3);
/// assert_eq!(result.frames()[2].x, 80);
/// assert_eq!(result.frames()[2].width, 40);
/// # Ok::<(), sprite_framer::atlas::SliceError>(())
/// ```
pub fn slice(dimensions: ImageDimensions, frame_size: FrameSize) -> Result<SliceResult, SliceError> {
    let (frame_width, frame_height) = frame_size.validated()?;

    let capacity = dimensions.width.div_ceil(frame_width) as usize
        * dimensions.height.div_ceil(frame_height) as usize;
    let mut frames = Vec::with_capacity(capacity);

    for y in (0..dimensions.height).step_by(frame_height as usize) {
        for x in (0..dimensions.width).step_by(frame_width as usize) {
            frames.push(Frame {
                x,
                y,
                width: frame_width,
                height: frame_height,
            });
        }
    }

    Ok(SliceResult {
        dimensions,
        frame_size,
        frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn slices_partial_last_column_without_clipping() {
        let result = slice(ImageDimensions::new(100, 50), FrameSize::new(40, 50))
            .expect("slice should succeed");

        let expected = [(0, 0), (40, 0), (80, 0)];
        assert_eq!(result.frames().len(), expected.len());
        for (frame, (x, y)) in result.frames().iter().zip(expected) {
            assert_eq!((frame.x, frame.y, frame.width, frame.height), (x, y, 40, 50));
        }
        assert_eq!(result.columns(), 3);
        assert_eq!(result.rows(), 1);
    }

    #[test]
    fn exact_division_produces_full_grid() {
        let result = slice(ImageDimensions::new(64, 32), FrameSize::new(16, 16))
            .expect("slice should succeed");

        assert_eq!(result.frames().len(), 8);
        assert_eq!(result.frames()[4], Frame { x: 0, y: 16, width: 16, height: 16 });
        assert_eq!(result.frames()[7], Frame { x: 48, y: 16, width: 16, height: 16 });
    }

    #[test]
    fn frame_larger_than_image_yields_single_frame() {
        let result = slice(ImageDimensions::new(10, 10), FrameSize::new(32, 32))
            .expect("slice should succeed");
        assert_eq!(result.frames(), &[Frame { x: 0, y: 0, width: 32, height: 32 }]);
    }

    #[test]
    fn rejects_zero_and_negative_frame_sizes() {
        let dims = ImageDimensions::new(100, 100);
        for (w, h) in [(0, 10), (10, 0), (-1, 10), (10, -5), (0, 0)] {
            let err = slice(dims, FrameSize::new(w, h)).expect_err("slice should fail");
            assert_eq!(
                err,
                SliceError::InvalidFrameSize {
                    frame_width: w,
                    frame_height: h
                }
            );
        }
    }

    #[test]
    fn rejects_frame_size_beyond_u32() {
        let result = slice(
            ImageDimensions::new(100, 100),
            FrameSize::new(i64::from(u32::MAX) + 1, 10),
        );
        assert!(matches!(result, Err(SliceError::InvalidFrameSize { .. })));
    }

    #[test]
    fn frame_count_matches_slice() {
        let dims = ImageDimensions::new(257, 129);
        let size = FrameSize::new(32, 64);
        let count = frame_count(dims, size).expect("count should succeed");
        let result = slice(dims, size).expect("slice should succeed");
        assert_eq!(count, result.frames().len() as u64);
        assert_eq!(count, 9 * 3);
    }

    proptest! {
        #[test]
        fn frame_count_is_product_of_ceilings(
            width in 1u32..600,
            height in 1u32..600,
            fw in 1i64..200,
            fh in 1i64..200,
        ) {
            let result = slice(ImageDimensions::new(width, height), FrameSize::new(fw, fh)).unwrap();
            let expected = width.div_ceil(fw as u32) as usize * height.div_ceil(fh as u32) as usize;
            prop_assert_eq!(result.frames().len(), expected);
        }

        #[test]
        fn frames_are_row_major(
            width in 1u32..400,
            height in 1u32..400,
            fw in 1i64..100,
            fh in 1i64..100,
        ) {
            let result = slice(ImageDimensions::new(width, height), FrameSize::new(fw, fh)).unwrap();
            for pair in result.frames().windows(2) {
                let (prev, next) = (pair[0], pair[1]);
                prop_assert!(next.y >= prev.y);
                if next.y == prev.y {
                    prop_assert_eq!(next.x, prev.x + fw as u32);
                } else {
                    prop_assert_eq!(next.x, 0);
                    prop_assert_eq!(next.y, prev.y + fh as u32);
                }
            }
            for frame in result.frames() {
                prop_assert!(frame.x < width && frame.y < height);
                prop_assert_eq!((frame.width, frame.height), (fw as u32, fh as u32));
            }
        }

        #[test]
        fn slicing_is_deterministic(
            width in 1u32..300,
            height in 1u32..300,
            fw in 1i64..64,
            fh in 1i64..64,
        ) {
            let dims = ImageDimensions::new(width, height);
            let size = FrameSize::new(fw, fh);
            prop_assert_eq!(slice(dims, size).unwrap(), slice(dims, size).unwrap());
        }

        #[test]
        fn non_positive_sizes_always_fail(fw in -50i64..=0, fh in -50i64..50) {
            let result = slice(ImageDimensions::new(64, 64), FrameSize::new(fw, fh));
            prop_assert!(
                matches!(result, Err(SliceError::InvalidFrameSize { .. })),
                "expected InvalidFrameSize"
            );
        }
    }
}
