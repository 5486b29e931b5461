//! 诊断可视化旁路.
//!
//! 指标计算只通过 [`PlotSink`] 输出诊断图元, 不依赖任何显示工具包.
//! 所有坐标均为 `(x, y)` 像素坐标, 其中 `x` 为列, `y` 为行.
//!
//! # 注意
//!
//! 基于 OpenCV 的窗口展示需要 `plot` feature.

mod record;

pub use record::{PlotCommand, Recorder};

use crate::Idx2dF;
use ndarray::ArrayView2;

cfg_if::cfg_if! {
    if #[cfg(feature = "plot")] {
        mod highgui;

        pub use highgui::OpenCvSink;
    }
}

/// 图元颜色.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Colour {
    /// 预测直线.
    Red,
    /// 真值直线, 或 y 方向残差.
    Yellow,
    /// 正交投影残差, 或最近中心点.
    Green,
    /// 图像中心.
    White,
}

/// 诊断图元的接收方. 实现者不应该 panic.
///
/// 每个 `show` 之前的所有图元属于同一张图.
pub trait PlotSink {
    /// 是否真正需要图元. 返回 `false` 时, 调用方可以跳过图元的准备工作.
    fn enabled(&self) -> bool {
        true
    }

    /// 底图.
    fn image(&mut self, label: &str, img: ArrayView2<f64>);

    /// 折线.
    fn polyline(&mut self, label: &str, xs: &[f64], ys: &[f64], colour: Colour);

    /// 线段 `from -> to`.
    fn segment(&mut self, from: Idx2dF, to: Idx2dF, colour: Colour);

    /// 十字标记.
    fn marker(&mut self, at: Idx2dF, colour: Colour);

    /// 将 `values` 分为 `bins` 个等宽桶的直方图, 单独成图.
    fn histogram(&mut self, title: &str, values: &[f64], bins: usize);

    /// 结束当前图并展示.
    fn show(&mut self);
}

/// 丢弃所有图元.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullSink;

impl PlotSink for NullSink {
    #[inline]
    fn enabled(&self) -> bool {
        false
    }

    fn image(&mut self, _: &str, _: ArrayView2<f64>) {}

    fn polyline(&mut self, _: &str, _: &[f64], _: &[f64], _: Colour) {}

    fn segment(&mut self, _: Idx2dF, _: Idx2dF, _: Colour) {}

    fn marker(&mut self, _: Idx2dF, _: Colour) {}

    fn histogram(&mut self, _: &str, _: &[f64], _: usize) {}

    fn show(&mut self) {}
}

/// 等宽直方图计数. 忽略非有限值.
///
/// 所有有限值相等时全部落入第一个桶. `bins` 为 0 时返回空数组.
pub fn histogram_counts(values: &[f64], bins: usize) -> Vec<usize> {
    let mut counts = vec![0; bins];
    if bins == 0 {
        return counts;
    }
    let finite = || values.iter().copied().filter(|v| v.is_finite());
    let (lo, hi) = finite().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let width = (hi - lo) / bins as f64;
    for v in finite() {
        let idx = if width > 0.0 {
            (((v - lo) / width) as usize).min(bins - 1)
        } else {
            0
        };
        counts[idx] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::histogram_counts;

    #[test]
    fn test_histogram_counts() {
        let v = [0.0, 0.1, 0.5, 0.9, 1.0, f64::NAN];
        assert_eq!(histogram_counts(&v, 2), vec![2, 3]);
        assert_eq!(histogram_counts(&v, 0), Vec::<usize>::new());
        assert_eq!(histogram_counts(&[3.0, 3.0], 4), vec![2, 0, 0, 0]);
        assert_eq!(histogram_counts(&[], 3), vec![0, 0, 0]);
    }
}
