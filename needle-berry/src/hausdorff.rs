//! 预测与真值前景之间的 Hausdorff 距离.

use crate::consts::FOREGROUND_CHANNEL;
use crate::geom;
use crate::mask::{channel_points, foreground_points};
use crate::spec::{EvalSpec, PixelSpacing};
use crate::Idx2d;
use ndarray::{ArrayView2, ArrayView3};
use num::Float;

/// 三维 (最后一维为类别通道) 预测与真值之间的 Hausdorff 距离 (物理单位).
///
/// 取两者第 1 个通道上值为 1 的像素作为点集 `X` (预测) 和 `Y` (真值), 返回
/// `max(max_y min_x d(x, y), max_x min_y d(x, y))`.
///
/// 任一点集为空时返回 NaN. 复杂度为 `O(|X| * |Y|)`, 只适合稀疏前景.
pub fn hausdorff_distance<T: Float>(
    pred: ArrayView3<T>,
    mask: ArrayView3<T>,
    spacing: PixelSpacing,
) -> f64 {
    let x = channel_points(pred, FOREGROUND_CHANNEL);
    let y = channel_points(mask, FOREGROUND_CHANNEL);
    points_hausdorff(&x, &y, spacing)
}

/// 同 [`hausdorff_distance`], 但输入为二维掩码, 前景按 `spec` 的规则提取.
pub fn hausdorff_distance_2d<T: Float>(
    pred: ArrayView2<T>,
    mask: ArrayView2<T>,
    spec: &EvalSpec,
) -> f64 {
    let threshold = T::from(spec.threshold()).unwrap_or_else(T::one);
    let x = foreground_points(pred, spec.binarize(), threshold);
    let y = foreground_points(mask, spec.binarize(), threshold);
    points_hausdorff(&x, &y, spec.spacing())
}

/// 两组 `(h, w)` 像素点之间的 Hausdorff 距离 (物理单位).
pub fn points_hausdorff(x: &[Idx2d], y: &[Idx2d], spacing: PixelSpacing) -> f64 {
    if x.is_empty() {
        log::debug!("empty prediction, hausdorff distance is undefined");
        return f64::NAN;
    }
    let scale = (spacing.row(), spacing.col());
    geom::hausdorff(&geom::to_physical(x, scale), &geom::to_physical(y, scale))
}
