//! 直线拟合.
//!
//! 给定一系列点 `(x, y)`, 以普通最小二乘法拟合 `y = β₀ + β₁x`.
//! 形态学评分与轨迹误差都基于该模块.

mod line;

use crate::error::FitError;
use crate::spec::{LineSampling, PixelSpacing};
use crate::{Idx2d, Idx2dF};
use ndarray::ArrayView1;

/// 拟合出的直线 `y = intercept + slope * x`. 坐标单位为像素.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineFit {
    intercept: f64,
    slope: f64,
}

impl LineFit {
    /// 直接以截距和斜率构建.
    #[inline]
    pub fn new(intercept: f64, slope: f64) -> Self {
        Self { intercept, slope }
    }

    /// 截距 `β₀`.
    #[inline]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// 斜率 `β₁`.
    #[inline]
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// 求直线在 `x` 处的值.
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// 按 `sampling` 在直线上采样, 返回 `([x], [y])`.
    pub fn sample(&self, sampling: &LineSampling) -> (Vec<f64>, Vec<f64>) {
        let xs = sampling.xs();
        let ys = xs.iter().map(|&x| self.eval(x)).collect();
        (xs, ys)
    }

    /// 直线在物理坐标下的单位方向向量 `(x, y)`.
    ///
    /// 由直线上 `x = 0` 与 `x = 1` 两点之差按像素分辨率缩放后归一化得到.
    pub fn direction(&self, spacing: PixelSpacing) -> Idx2dF {
        let (sx, sy) = spacing.xy();
        let (dx, dy) = ((1.0 - 0.0) * sx, (self.eval(1.0) - self.eval(0.0)) * sy);
        let norm = (dx * dx + dy * dy).sqrt();
        (dx / norm, dy / norm)
    }

    /// 直线相对于 x 轴所张的角度 (单位: 度), 以 `sampling` 区间的首尾两点计算:
    /// `atan(Δx / Δy)`.
    ///
    /// 水平直线 (`Δy == 0`) 的角度为 `±90°`, 符号跟随 `Δy` 的符号位.
    pub fn angle_deg(&self, sampling: &LineSampling) -> f64 {
        let (x0, x1) = (sampling.start(), sampling.end());
        let dy = self.eval(x1) - self.eval(x0);
        ((x1 - x0) / dy).atan().to_degrees()
    }
}

/// 对 `([x], [y])` 做最小二乘直线拟合.
///
/// 法方程矩阵 `XᵗX` 奇异时返回 `Err(FitError::Singular)`, 没有点时返回
/// `Err(FitError::Empty)`. 如果 `x` 与 `y` 长度不一致, 程序 panic.
pub fn fit_line<'a>(x: ArrayView1<'a, f64>, y: ArrayView1<'a, f64>) -> Result<LineFit, FitError> {
    line::LineImp::new(x, y).fit()
}

/// 对一组 `(h, w)` 像素坐标做最小二乘直线拟合. 其中 `x = w`, `y = h`.
pub fn fit_points(points: &[Idx2d]) -> Result<LineFit, FitError> {
    let (x, y) = points_xy(points);
    fit_line(x.view(), y.view())
}

/// `[(h, w)]` -> `([x], [y])`, 即 `([w], [h])`.
pub(crate) fn points_xy(points: &[Idx2d]) -> (ndarray::Array1<f64>, ndarray::Array1<f64>) {
    let x = points.iter().map(|&(_, w)| w as f64).collect();
    let y = points.iter().map(|&(h, _)| h as f64).collect();
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::sampling;
    use ndarray::arr1;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-8
    }

    #[test]
    fn test_fit_exact_line() {
        let x = arr1(&[0.0, 1.0, 2.0, 3.0, 10.0]);
        let y = x.mapv(|v| 3.0 - 0.5 * v);
        let l = fit_line(x.view(), y.view()).unwrap();
        assert!(f64_eq(l.intercept(), 3.0));
        assert!(f64_eq(l.slope(), -0.5));
    }

    #[test]
    fn test_fit_noisy_line() {
        // y = 1 + 2x 上下对称扰动, 最小二乘解不变
        let x = arr1(&[0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
        let y = arr1(&[0.5, 1.5, 2.5, 3.5, 4.5, 5.5]);
        let l = fit_line(x.view(), y.view()).unwrap();
        assert!(f64_eq(l.intercept(), 1.0));
        assert!(f64_eq(l.slope(), 2.0));
    }

    #[test]
    fn test_fit_line_borrowed_views() {
        // x 取自二维数组的一列, y 是独立数组的切片.
        let grid = ndarray::Array2::from_shape_fn((4, 2), |(i, j)| (i + j) as f64);
        let y = arr1(&[-1.0, 1.0, 3.0, 5.0, 7.0]);
        let l = fit_line(grid.column(0), y.slice(ndarray::s![1..])).unwrap();
        assert!(f64_eq(l.intercept(), 1.0));
        assert!(f64_eq(l.slope(), 2.0));
    }

    #[test]
    fn test_fit_singular() {
        // 竖直线
        let pts = [(3, 7), (4, 7), (5, 7), (100, 7)];
        assert_eq!(fit_points(&pts), Err(FitError::Singular(4)));
        // 单点
        assert_eq!(fit_points(&[(9, 9)]), Err(FitError::Singular(1)));
        // 重复点
        assert_eq!(fit_points(&[(9, 9), (9, 9)]), Err(FitError::Singular(2)));
        assert_eq!(fit_points(&[]), Err(FitError::Empty));
    }

    #[test]
    fn test_fit_points_axes() {
        // h = 256 的水平线: y 恒为 256, 斜率为 0.
        let pts: Vec<_> = (0..512).map(|w| (256, w)).collect();
        let l = fit_points(&pts).unwrap();
        assert!(f64_eq(l.slope(), 0.0));
        assert!(f64_eq(l.intercept(), 256.0));
    }

    #[test]
    fn test_direction_and_angle() {
        let l = LineFit::new(0.0, 1.0);
        let (dx, dy) = l.direction(PixelSpacing::default());
        assert!(f64_eq(dx, std::f64::consts::FRAC_1_SQRT_2));
        assert!(f64_eq(dy, std::f64::consts::FRAC_1_SQRT_2));

        // 各向异性分辨率会改变物理方向
        let (dx, dy) = l.direction(PixelSpacing::new(3.0, 4.0));
        assert!(f64_eq(dx, 0.8));
        assert!(f64_eq(dy, 0.6));

        let s = LineSampling::default();
        assert!(f64_eq(l.angle_deg(&s), 45.0));
        assert!(f64_eq(LineFit::new(10.0, -1.0).angle_deg(&s), -45.0));
        assert!(f64_eq(LineFit::new(256.0, 0.0).angle_deg(&s), 90.0));
    }

    #[test]
    fn test_sample() {
        let (xs, ys) = LineFit::new(1.0, 2.0).sample(&LineSampling::default());
        assert_eq!(xs.len(), sampling::POINTS);
        assert_eq!(ys[0], 1.0);
        assert_eq!(ys[511], 1.0 + 2.0 * 511.0);
    }
}
