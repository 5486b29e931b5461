//! 物理距离与双向最近点距离 (Hausdorff 距离).
//!
//! 所有点集以 `f64` 二元组表示, 分量顺序由调用者决定, 但 `scale`
//! 必须与点的分量顺序一致: 对 `(h, w)` 点应传入 `(row, col)` 分辨率,
//! 对 `(x, y)` 点应传入 `(col, row)` 分辨率.

use crate::{Idx2d, Idx2dF};
use ordered_float::OrderedFloat;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// 计算 `a`, `b` 两点的物理欧几里得距离: `|(a - b) ⊙ scale|`.
#[inline]
pub fn physical_distance((a0, a1): Idx2dF, (b0, b1): Idx2dF, (s0, s1): Idx2dF) -> f64 {
    let (d0, d1) = ((a0 - b0) * s0, (a1 - b1) * s1);
    (d0 * d0 + d1 * d1).sqrt()
}

/// 将像素索引转换为物理坐标. 输出与输入分量顺序相同.
pub fn to_physical(points: &[Idx2d], (s0, s1): Idx2dF) -> Vec<Idx2dF> {
    points
        .iter()
        .map(|&(p0, p1)| (p0 as f64 * s0, p1 as f64 * s1))
        .collect()
}

/// 将浮点坐标逐分量缩放为物理坐标.
pub fn scale_points(points: &[Idx2dF], (s0, s1): Idx2dF) -> Vec<Idx2dF> {
    points.iter().map(|&(p0, p1)| (p0 * s0, p1 * s1)).collect()
}

#[inline]
fn squared((a0, a1): Idx2dF, (b0, b1): Idx2dF) -> f64 {
    (a0 - b0).powi(2) + (a1 - b1).powi(2)
}

/// 点 `p` 到点集 `set` 的最近距离. `set` 为空时返回 `+inf`.
///
/// 坐标应当已经是物理坐标.
pub fn nearest_distance(p: Idx2dF, set: &[Idx2dF]) -> f64 {
    set.iter()
        .map(|&q| OrderedFloat(squared(p, q)))
        .min()
        .map_or(f64::INFINITY, |d| d.0.sqrt())
}

/// 有向 Hausdorff 距离: `max_{p ∈ from} min_{q ∈ to} |p - q|`.
///
/// `from` 为空时返回 `-inf`, `to` 为空 (且 `from` 非空) 时返回 `+inf`.
/// 坐标应当已经是物理坐标. 复杂度为 `O(|from| * |to|)`.
pub fn directed_hausdorff(from: &[Idx2dF], to: &[Idx2dF]) -> f64 {
    #[cfg(feature = "rayon")]
    let it = from.par_iter();
    #[cfg(not(feature = "rayon"))]
    let it = from.iter();

    it.map(|&p| OrderedFloat(nearest_distance(p, to)))
        .max()
        .map_or(f64::NEG_INFINITY, |d| d.0)
}

/// 双向 Hausdorff 距离: `max(directed(y → x), directed(x → y))`.
///
/// 任一点集为空时返回 NaN. 对单个离群点敏感 (非分位数版本).
pub fn hausdorff(x: &[Idx2dF], y: &[Idx2dF]) -> f64 {
    if x.is_empty() || y.is_empty() {
        return f64::NAN;
    }
    let d1 = directed_hausdorff(y, x);
    let d2 = directed_hausdorff(x, y);
    d1.max(d2)
}
