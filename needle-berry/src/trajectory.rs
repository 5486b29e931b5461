//! 穿刺针轨迹误差.
//!
//! 分别对预测和真值的前景像素拟合直线, 比较两条直线:
//!
//! 1. 与 x 轴所张角度之差 (单位: 度);
//! 2. 直线上离图像中心最近的采样点到中心的距离之差 (单位: 像素, 不乘分辨率);
//! 3. 两条直线采样曲线之间的 Hausdorff 距离 (物理单位).

use crate::error::{FitError, MetricError, MetricResult};
use crate::fitting::{fit_points, LineFit};
use crate::geom;
use crate::mask::foreground_points;
use crate::plot::{Colour, NullSink, PlotSink};
use crate::spec::{EvalSpec, GroundTruthPolicy};
use itertools::{izip, Itertools};
use ndarray::ArrayView2;
use num::Float;
use ordered_float::OrderedFloat;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 轨迹误差三元组. 各项均为 `预测 - 真值`. 无法计算时全部为 NaN.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trajectory {
    /// 角度误差 (单位: 度).
    pub angle: f64,

    /// 中心距离误差 (单位: 像素).
    pub centre: f64,

    /// 两条拟合直线之间的 Hausdorff 距离 (物理单位).
    pub hausdorff: f64,
}

impl Trajectory {
    /// 无法计算的结果, 三项都是 NaN.
    #[inline]
    pub const fn undefined() -> Self {
        Self {
            angle: f64::NAN,
            centre: f64::NAN,
            hausdorff: f64::NAN,
        }
    }

    /// 是否存在无法计算的项.
    #[inline]
    pub fn is_undefined(&self) -> bool {
        self.angle.is_nan() || self.centre.is_nan() || self.hausdorff.is_nan()
    }

    /// `(angle, centre, hausdorff)`.
    #[inline]
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.angle, self.centre, self.hausdorff)
    }
}

/// 一条拟合直线在采样后的形态.
struct SampledLine {
    xs: Vec<f64>,
    ys: Vec<f64>,
    angle: f64,
    /// 离中心最近的采样点索引.
    nearest: usize,
    /// 该采样点到中心的像素距离.
    centre_dist: f64,
}

impl SampledLine {
    fn new(line: LineFit, spec: &EvalSpec) -> Self {
        let sampling = spec.sampling();
        let (cx, cy) = sampling.centre();
        let (xs, ys) = line.sample(sampling);
        let nearest = nearest_to_centre(&xs, &ys, (cx, cy)).unwrap_or(0);
        let centre_dist = ((xs[nearest] - cx).powi(2) + (ys[nearest] - cy).powi(2)).sqrt();
        Self {
            xs,
            ys,
            angle: line.angle_deg(sampling),
            nearest,
            centre_dist,
        }
    }

    /// 按分辨率缩放后的 `(x, y)` 采样点.
    fn physical(&self, spec: &EvalSpec) -> Vec<(f64, f64)> {
        let xy: Vec<_> = izip!(self.xs.iter().copied(), self.ys.iter().copied()).collect();
        geom::scale_points(&xy, spec.spacing().xy())
    }

    #[inline]
    fn nearest_point(&self) -> (f64, f64) {
        (self.xs[self.nearest], self.ys[self.nearest])
    }
}

/// 计算轨迹误差.
///
/// - 预测侧拟合失败: 输出诊断日志, 返回 `Ok(Trajectory::undefined())`;
/// - 真值侧拟合失败: 由 `spec.gt_policy()` 决定返回 `Err` 或全 NaN 结果.
///
/// 预测与真值使用相同的前景提取规则 (`spec.binarize()`).
#[inline]
pub fn trajectory_error<T: Float>(
    pred: ArrayView2<T>,
    mask: ArrayView2<T>,
    spec: &EvalSpec,
) -> MetricResult<Trajectory> {
    trajectory_error_with(pred, mask, spec, &mut NullSink)
}

/// 同 [`trajectory_error`], 但同时向 `sink` 输出诊断图元: 预测图, 预测直线 (红),
/// 真值直线 (黄), 两条直线上离中心最近的点 (绿) 与图像中心 (白).
///
/// `sink` 不影响返回值.
pub fn trajectory_error_with<T, S>(
    pred: ArrayView2<T>,
    mask: ArrayView2<T>,
    spec: &EvalSpec,
    sink: &mut S,
) -> MetricResult<Trajectory>
where
    T: Float,
    S: PlotSink + ?Sized,
{
    let threshold = T::from(spec.threshold()).unwrap_or_else(T::one);

    let pred_line = match fit_points(&foreground_points(pred, spec.binarize(), threshold)) {
        Ok(l) => l,
        Err(e) => {
            log::warn!("trajectory error is undefined, prediction fit failed: {e}");
            return Ok(Trajectory::undefined());
        }
    };
    let gt_line = match fit_points(&foreground_points(mask, spec.binarize(), threshold)) {
        Ok(l) => l,
        Err(e) => return gt_fit_failed(e, spec.gt_policy()),
    };

    let p = SampledLine::new(pred_line, spec);
    let g = SampledLine::new(gt_line, spec);

    let traj = Trajectory {
        angle: p.angle - g.angle,
        centre: p.centre_dist - g.centre_dist,
        hausdorff: geom::hausdorff(&p.physical(spec), &g.physical(spec)),
    };
    log::debug!(
        "trajectory: angle {:.4}° (pred {:.4}°, gt {:.4}°), centre {:.4}, hausdorff {:.4}",
        traj.angle,
        p.angle,
        g.angle,
        traj.centre,
        traj.hausdorff
    );

    if sink.enabled() {
        sink.image("prediction", pred.mapv(|v| v.to_f64().unwrap_or(f64::NAN)).view());
        sink.polyline("prediction", &p.xs, &p.ys, Colour::Red);
        sink.polyline("ground truth", &g.xs, &g.ys, Colour::Yellow);
        sink.marker(g.nearest_point(), Colour::Green);
        sink.marker(p.nearest_point(), Colour::Green);
        sink.marker(spec.sampling().centre(), Colour::White);
        sink.show();
    }
    Ok(traj)
}

fn gt_fit_failed(e: FitError, policy: GroundTruthPolicy) -> MetricResult<Trajectory> {
    match policy {
        GroundTruthPolicy::Fatal => Err(MetricError::GroundTruthFit(e)),
        GroundTruthPolicy::Undefined => {
            log::warn!("trajectory error is undefined, ground truth fit failed: {e}");
            Ok(Trajectory::undefined())
        }
    }
}

/// 采样点 `([x], [y])` 中离 `(cx, cy)` 最近的点的索引.
///
/// 有多个最近点时返回第一个. 没有采样点时返回 `None`.
pub fn nearest_to_centre(xs: &[f64], ys: &[f64], (cx, cy): (f64, f64)) -> Option<usize> {
    izip!(xs, ys)
        .map(|(&x, &y)| OrderedFloat((x - cx).powi(2) + (y - cy).powi(2)))
        .position_min()
}
