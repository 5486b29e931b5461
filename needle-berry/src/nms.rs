//! 穿刺针形态学评分 (Needle Morphology Score, NMS).
//!
//! 以最小二乘法拟合穿过前景像素的直线, 然后把每个前景点在 y 方向上的残差
//! 投影到直线的法方向上, 得到该点到直线的真实垂直偏差 (物理单位).
//! NMS 被定义为所有前景点垂直偏差平方的平均值. 笔直的针得分为 0.

use crate::error::FitError;
use crate::fitting::{fit_points, LineFit};
use crate::mask::foreground_points;
use crate::plot::{Colour, NullSink, PlotSink};
use crate::spec::EvalSpec;
use crate::Idx2dF;
use itertools::izip;
use ndarray::ArrayView2;
use num::Float;

/// 诊断图中最多展示的残差向量条数.
const DIAG_VECTORS: usize = 10;

/// 诊断直方图的桶数.
const DIAG_BINS: usize = 20;

/// NMS 的完整中间结果.
///
/// 所有向量均为 `(x, y)` 格式. 残差与投影已按像素分辨率缩放 (物理单位),
/// 前景点坐标保留像素单位.
#[derive(Clone, Debug)]
pub struct NmsReport {
    line: LineFit,
    points: Vec<Idx2dF>,
    residual: Vec<Idx2dF>,
    parallel: Vec<Idx2dF>,
    orthogonal: Vec<Idx2dF>,
    distance: Vec<f64>,
}

impl NmsReport {
    /// 拟合出的直线.
    #[inline]
    pub fn line(&self) -> LineFit {
        self.line
    }

    /// 前景点个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 是否没有前景点. 成功构建的报告一定非空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 前景点像素坐标.
    #[inline]
    pub fn points(&self) -> &[Idx2dF] {
        &self.points
    }

    /// y 方向残差向量 `(0, y - ŷ)`, 物理单位.
    #[inline]
    pub fn residual(&self) -> &[Idx2dF] {
        &self.residual
    }

    /// 残差在直线方向上的投影.
    #[inline]
    pub fn parallel(&self) -> &[Idx2dF] {
        &self.parallel
    }

    /// 残差在直线法方向上的投影 (残差减去平行投影).
    #[inline]
    pub fn orthogonal(&self) -> &[Idx2dF] {
        &self.orthogonal
    }

    /// 各点到直线的垂直距离, 即 `|orthogonal|`.
    #[inline]
    pub fn distance(&self) -> &[f64] {
        &self.distance
    }

    /// NMS: 垂直距离平方的平均值.
    pub fn score(&self) -> f64 {
        self.distance.iter().map(|d| d * d).sum::<f64>() / self.len() as f64
    }

    /// 正交投影各分量平方和的平均值: `mean(ox²) + mean(oy²)`.
    ///
    /// 代数上恒等于 [`NmsReport::score`], 可用作自检.
    pub fn component_score(&self) -> f64 {
        let (sx, sy) = self
            .orthogonal
            .iter()
            .fold((0.0, 0.0), |(sx, sy), &(ox, oy)| (sx + ox * ox, sy + oy * oy));
        let n = self.len() as f64;
        sx / n + sy / n
    }

    /// 正交投影 x 分量平方的平均值.
    fn x_score(&self) -> f64 {
        self.orthogonal.iter().map(|o| o.0 * o.0).sum::<f64>() / self.len() as f64
    }

    /// 正交投影 y 分量平方的平均值.
    fn y_score(&self) -> f64 {
        self.orthogonal.iter().map(|o| o.1 * o.1).sum::<f64>() / self.len() as f64
    }
}

/// 计算 NMS 的全部中间结果.
///
/// 前景提取方式由 `spec.binarize()` 决定. 拟合失败 (无前景点或法方程奇异)
/// 时返回 `Err`.
pub fn nms_report<T: Float>(pred: ArrayView2<T>, spec: &EvalSpec) -> Result<NmsReport, FitError> {
    let threshold = T::from(spec.threshold()).unwrap_or_else(T::one);
    let raw = foreground_points(pred, spec.binarize(), threshold);
    let line = fit_points(&raw)?;

    let (sx, sy) = spec.spacing().xy();
    let (ux, uy) = line.direction(spec.spacing());

    let n = raw.len();
    let mut points = Vec::with_capacity(n);
    let mut residual = Vec::with_capacity(n);
    let mut parallel = Vec::with_capacity(n);
    let mut orthogonal = Vec::with_capacity(n);
    let mut distance = Vec::with_capacity(n);

    for &(h, w) in raw.iter() {
        let (x, y) = (w as f64, h as f64);
        let (ex, ey) = (0.0 * sx, (y - line.eval(x)) * sy);
        let along = ux * ex + uy * ey;
        let (px, py) = (along * ux, along * uy);
        let (ox, oy) = (ex - px, ey - py);

        points.push((x, y));
        residual.push((ex, ey));
        parallel.push((px, py));
        orthogonal.push((ox, oy));
        distance.push((ox * ox + oy * oy).sqrt());
    }

    Ok(NmsReport {
        line,
        points,
        residual,
        parallel,
        orthogonal,
        distance,
    })
}

/// 计算 NMS. 拟合失败时输出诊断日志并返回 NaN.
#[inline]
pub fn nms<T: Float>(pred: ArrayView2<T>, spec: &EvalSpec) -> f64 {
    nms_with(pred, spec, &mut NullSink)
}

/// 同 [`nms`], 但同时向 `sink` 输出诊断图元: 前景图, 拟合直线, 部分 y 方向残差 (黄) 与
/// 正交残差 (绿), 以及垂直距离和两个正交分量的直方图.
///
/// `sink` 不影响返回值.
pub fn nms_with<T, S>(pred: ArrayView2<T>, spec: &EvalSpec, sink: &mut S) -> f64
where
    T: Float,
    S: PlotSink + ?Sized,
{
    let report = match nms_report(pred, spec) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("NMS is undefined: {e}");
            return f64::NAN;
        }
    };

    let score = report.score();
    debug_assert!(
        (report.component_score() - score).abs() <= 1e-8 * score.max(1.0),
        "正交投影分量与垂直距离不一致"
    );

    if sink.enabled() {
        render(pred, spec, &report, score, sink);
    }
    score
}

fn render<T, S>(pred: ArrayView2<T>, spec: &EvalSpec, report: &NmsReport, score: f64, sink: &mut S)
where
    T: Float,
    S: PlotSink + ?Sized,
{
    sink.image("prediction", pred.mapv(|v| v.to_f64().unwrap_or(f64::NAN)).view());

    let (xs, ys) = report.line().sample(spec.sampling());
    sink.polyline("fit", &xs, &ys, Colour::Red);

    let stride = (report.len() / DIAG_VECTORS).max(1);
    for (&(x, y), &(ex, ey), &(ox, oy)) in izip!(
        report.points().iter().step_by(stride),
        report.residual().iter().step_by(stride),
        report.orthogonal().iter().step_by(stride)
    ) {
        sink.segment((x - ex, y - ey), (x, y), Colour::Yellow);
        sink.segment((x - ox, y - oy), (x, y), Colour::Green);
    }

    sink.histogram(&format!("Proj error: {score}"), report.distance(), DIAG_BINS);
    let ox: Vec<f64> = report.orthogonal().iter().map(|o| o.0).collect();
    sink.histogram(&format!("x error: {}", report.x_score()), &ox, DIAG_BINS);
    let oy: Vec<f64> = report.orthogonal().iter().map(|o| o.1).collect();
    sink.histogram(&format!("y error: {}", report.y_score()), &oy, DIAG_BINS);
    sink.show();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{PlotCommand, Recorder};
    use crate::spec::{Binarize, PixelSpacing};
    use ndarray::Array2;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-8
    }

    /// 在 `(h, w)` 图像上画 `y = b0 + b1 x` (逐列取整), 可附加逐列偏移.
    fn draw_line(shape: (usize, usize), b0: f64, b1: f64, jitter: &[i64]) -> Array2<f64> {
        let mut img = Array2::zeros(shape);
        for x in 0..shape.1 {
            let j = if jitter.is_empty() { 0 } else { jitter[x % jitter.len()] };
            let y = (b0 + b1 * x as f64).round() as i64 + j;
            if (0..shape.0 as i64).contains(&y) {
                img[(y as usize, x)] = 1.0;
            }
        }
        img
    }

    #[test]
    fn test_straight_needle_scores_zero() {
        let img = draw_line((64, 64), 10.0, 0.5, &[]);
        // 逐列取整后仍精确落在 y = 10 + x / 2 上的只有偶数列, 故只取偶数列.
        let img = {
            let mut only_even = img.clone();
            for x in (1..64).step_by(2) {
                only_even.column_mut(x).fill(0.0);
            }
            only_even
        };
        let spec = EvalSpec::new(0.5, PixelSpacing::new(0.3, 0.7));
        assert!(f64_eq(nms(img.view(), &spec), 0.0));
    }

    #[test]
    fn test_horizontal_needle() {
        let img = draw_line((32, 32), 16.0, 0.0, &[]);
        assert!(f64_eq(nms(img.view(), &EvalSpec::default()), 0.0));
    }

    #[test]
    fn test_perpendicular_distance_matches_geometry() {
        // 每列上下各偏离 y = x 一个像素, 拟合结果为 y = x.
        let mut img = Array2::<f64>::zeros((8, 8));
        for (h, w) in [(2, 1), (0, 1), (5, 4), (3, 4)] {
            img[(h, w)] = 1.0;
        }
        let r = nms_report(img.view(), &EvalSpec::default()).unwrap();
        assert!(f64_eq(r.line().slope(), 1.0));
        assert!(f64_eq(r.line().intercept(), 0.0));
        // y 方向偏离 1, 到 y = x 的垂直距离为 1 / sqrt(2)
        for &d in r.distance() {
            assert!(f64_eq(d, std::f64::consts::FRAC_1_SQRT_2));
        }
        assert!(f64_eq(r.score(), 0.5));
    }

    #[test]
    fn test_component_identity() {
        let jitter = [0, 1, -1, 2, 0, -2, 1];
        let img = draw_line((128, 128), 20.0, 0.37, &jitter);
        for spacing in [
            PixelSpacing::default(),
            PixelSpacing::new(0.2, 0.9),
            PixelSpacing::new(3.0, 0.5),
        ] {
            let r = nms_report(img.view(), &EvalSpec::new(0.5, spacing)).unwrap();
            assert!(r.score() > 0.0);
            assert!((r.component_score() - r.score()).abs() < 1e-9 * r.score());
            // 平行分量 + 正交分量 = 残差
            for (&(ex, ey), &(px, py), &(ox, oy)) in izip!(r.residual(), r.parallel(), r.orthogonal()) {
                assert!(f64_eq(px + ox, ex));
                assert!(f64_eq(py + oy, ey));
            }
        }
    }

    #[test]
    fn test_singular_is_nan() {
        let mut img = Array2::<f64>::zeros((16, 16));
        img.column_mut(7).fill(1.0);
        assert!(nms(img.view(), &EvalSpec::default()).is_nan());
        assert!(nms(Array2::<f64>::zeros((4, 4)).view(), &EvalSpec::default()).is_nan());
    }

    #[test]
    fn test_literal_vs_threshold() {
        let mut img = draw_line((32, 32), 4.0, 0.0, &[]);
        // 另一条不等于 1.0 的高置信度直线
        img.row_mut(20).fill(0.9);
        let literal = EvalSpec::default();
        let thresh = literal.with_binarize(Binarize::Threshold);
        assert!(f64_eq(nms(img.view(), &literal), 0.0));
        // 两条平行线: 拟合出中线 y = 12, 每点偏差 8.
        assert!(f64_eq(nms(img.view(), &thresh), 64.0));
    }

    #[test]
    fn test_sink_does_not_change_score() {
        let img = draw_line((64, 64), 5.0, 0.8, &[0, 1, 0, -1]);
        let spec = EvalSpec::new(0.5, PixelSpacing::new(0.5, 0.5));
        let mut rec = Recorder::new();
        let a = nms_with(img.view(), &spec, &mut rec);
        let b = nms(img.view(), &spec);
        assert_eq!(a, b);
        assert_eq!(rec.figures(), 1);
        assert!(matches!(rec.commands()[0], PlotCommand::Image { shape: (64, 64), .. }));
        let hists = rec
            .commands()
            .iter()
            .filter(|c| matches!(c, PlotCommand::Histogram { .. }))
            .count();
        assert_eq!(hists, 3);
    }
}
