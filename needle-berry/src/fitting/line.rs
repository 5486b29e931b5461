//! 最小二乘直线.

use super::LineFit;
use crate::error::FitError;
use ndarray::{Array1, Array2, ArrayView1};

pub(crate) struct LineImp<'a> {
    x: ArrayView1<'a, f64>,
    y: ArrayView1<'a, f64>,
}

impl<'a> LineImp<'a> {
    pub fn new(x: ArrayView1<'a, f64>, y: ArrayView1<'a, f64>) -> Self {
        assert_eq!(x.len(), y.len(), "x 值和 y 值必须一一对应");
        Self { x, y }
    }

    /// 解法方程 `(XᵗX) β = Xᵗ y`.
    pub fn fit(&self) -> Result<LineFit, FitError> {
        if self.x.is_empty() {
            return Err(FitError::Empty);
        }
        let design = self.design();
        let normal = design.t().dot(&design);
        let moment = design.t().dot(&self.y);

        let beta = solve(&normal, &moment).ok_or(FitError::Singular(self.x.len()))?;
        debug_assert_eq!(beta.len(), 2);
        Ok(LineFit::new(beta[0], beta[1]))
    }

    /// 设计矩阵 `[1, x]`, shape: `(m, 2)`.
    fn design(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.x.len(), 2), |(m, n)| match n {
            0 => 1.0,
            _ => self.x[m],
        })
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "lapack")] {
        /// 借助 LAPACK 求逆后左乘. 矩阵奇异 (或结果非有限) 时返回 `None`.
        fn solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
            use ndarray_linalg::Inverse;

            let beta = a.inv().ok()?.dot(b);
            beta.iter().all(|v| v.is_finite()).then_some(beta)
        }
    } else {
        /// 2x2 方程组的克莱姆法则闭式解. 行列式为 0 (或非有限) 时返回 `None`.
        ///
        /// 像素坐标为整数, 法方程各项在 `2^53` 以内都能精确表示,
        /// 因此共线 (同一 x) 的点集行列式精确为 0.
        fn solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
            debug_assert_eq!(a.dim(), (2, 2));
            let (a00, a01, a10, a11) = (a[(0, 0)], a[(0, 1)], a[(1, 0)], a[(1, 1)]);
            let det = a00 * a11 - a01 * a10;
            if det == 0.0 || !det.is_finite() {
                return None;
            }
            Some(ndarray::arr1(&[
                (a11 * b[0] - a01 * b[1]) / det,
                (a00 * b[1] - a10 * b[0]) / det,
            ]))
        }
    }
}
