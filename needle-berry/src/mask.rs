//! 掩码门限化与前景坐标提取.
//!
//! 我们使用行优先编码存储二维图像, 其中行是 "Height" (垂直方向, y),
//! 列是 "Width" (水平方向, x). 本模块输出的坐标一律为 `(h, w)` 格式,
//! 且按行优先顺序排列.

use crate::consts::FOREGROUND_VALUE;
use crate::spec::Binarize;
use crate::Idx2d;
use ndarray::{Array, ArrayBase, ArrayView2, ArrayView3, Axis, Data, DataMut, Dimension};
use num::Float;

/// 原地二值化: 小于 `threshold` 的像素置 0, 其余置 1.
pub fn binarize_inplace<T, S, D>(arr: &mut ArrayBase<S, D>, threshold: T)
where
    T: Float,
    S: DataMut<Elem = T>,
    D: Dimension,
{
    arr.mapv_inplace(|v| if v < threshold { T::zero() } else { T::one() });
}

/// 获得低于 `threshold` 的像素掩码 (`true` 表示被遮挡).
pub fn below_threshold<T, S, D>(arr: &ArrayBase<S, D>, threshold: T) -> Array<bool, D>
where
    T: Float,
    S: Data<Elem = T>,
    D: Dimension,
{
    arr.mapv(|v| v < threshold)
}

/// 像素是否为前景.
#[inline]
pub(crate) fn is_foreground<T: Float>(v: T, binarize: Binarize, threshold: T) -> bool {
    match binarize {
        Binarize::Literal => v.to_f64() == Some(FOREGROUND_VALUE),
        Binarize::Threshold => v >= threshold,
    }
}

/// 按 `binarize` 规则提取二维掩码的全部前景坐标 `(h, w)`.
///
/// `Binarize::Literal` 时 `threshold` 不参与计算.
pub fn foreground_points<T: Float>(
    arr: ArrayView2<T>,
    binarize: Binarize,
    threshold: T,
) -> Vec<Idx2d> {
    arr.indexed_iter()
        .filter(|(_, &v)| is_foreground(v, binarize, threshold))
        .map(|(pos, _)| pos)
        .collect()
}

/// 提取三维掩码 (最后一维为类别通道) 中第 `channel` 个通道上值为 `1` 的坐标 `(h, w)`.
///
/// 如果 `channel` 越界, 程序 panic.
pub fn channel_points<T: Float>(arr: ArrayView3<T>, channel: usize) -> Vec<Idx2d> {
    foreground_points(arr.index_axis(Axis(2), channel), Binarize::Literal, T::one())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array3};

    #[test]
    fn test_binarize_inplace() {
        let mut a = arr2(&[[0.1, 0.5], [0.49, 0.9]]);
        binarize_inplace(&mut a, 0.5);
        assert_eq!(a, arr2(&[[0.0, 1.0], [0.0, 1.0]]));
    }

    #[test]
    fn test_below_threshold() {
        let a = arr2(&[[0.1_f32, 0.5], [0.49, 0.9]]);
        assert_eq!(
            below_threshold(&a, 0.5),
            arr2(&[[true, false], [true, false]])
        );
    }

    #[test]
    fn test_foreground_literal_ignores_threshold() {
        let a = arr2(&[[0.9, 1.0], [1.0, 0.7]]);
        assert_eq!(
            foreground_points(a.view(), Binarize::Literal, 0.5),
            vec![(0, 1), (1, 0)]
        );
        assert_eq!(
            foreground_points(a.view(), Binarize::Threshold, 0.8),
            vec![(0, 0), (0, 1), (1, 0)]
        );
    }

    #[test]
    fn test_row_major_order_on_transposed_view() {
        let a = arr2(&[[1.0, 0.0], [1.0, 1.0]]);
        // 转置后逻辑顺序仍然是行优先
        assert_eq!(
            foreground_points(a.t(), Binarize::Literal, 0.5),
            vec![(0, 0), (0, 1), (1, 1)]
        );
    }

    #[test]
    fn test_channel_points() {
        let mut a = Array3::<f64>::zeros((3, 3, 2));
        a[(0, 2, 0)] = 1.0;
        a[(1, 1, 1)] = 1.0;
        a[(2, 0, 1)] = 1.0;
        assert_eq!(channel_points(a.view(), 1), vec![(1, 1), (2, 0)]);
        assert_eq!(channel_points(a.view(), 0), vec![(0, 2)]);
    }
}
