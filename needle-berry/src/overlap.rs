//! 重叠类指标: Dice 损失与平均熵.

use crate::consts::{DICE_EPS, SIGNIFICANCE_FLOOR};
use itertools::izip;
use ndarray::{ArrayBase, Data, Dimension};
use num::Float;

/// Dice 损失: `1 - 2 Σ(pred · mask) / (Σpred + Σmask + ε)`.
///
/// 值域为 `[0, 1]`, 0 代表完全重合. 两个输入同时全零时结果为 1 (而不是 NaN).
/// `pred` 可以是连续值. 如果两个输入形状不一致, 程序 panic.
pub fn dice_loss<T, S1, S2, D>(pred: &ArrayBase<S1, D>, mask: &ArrayBase<S2, D>) -> T
where
    T: Float,
    S1: Data<Elem = T>,
    S2: Data<Elem = T>,
    D: Dimension,
{
    assert_eq!(pred.shape(), mask.shape(), "预测和真值形状不一致");
    let numer = izip!(pred.iter(), mask.iter()).fold(T::zero(), |acc, (&p, &m)| acc + p * m);
    let two = T::one() + T::one();
    let eps = T::from(DICE_EPS).unwrap_or_else(T::epsilon);
    let denom = pred.sum() + mask.sum() + eps;
    T::one() - two * numer / denom
}

/// 平均熵: `Σentropy / |{p : pred[p] > 1e-3 或 entropy[p] > 1e-3}|`.
///
/// 分母只统计预测或熵值不可忽略的像素. 若没有任何像素满足条件, 结果为 NaN 或 inf
/// (由调用者处理). 如果两个输入形状不一致, 程序 panic.
pub fn mean_entropy<T, S1, S2, D>(pred: &ArrayBase<S1, D>, entropy: &ArrayBase<S2, D>) -> T
where
    T: Float,
    S1: Data<Elem = T>,
    S2: Data<Elem = T>,
    D: Dimension,
{
    assert_eq!(pred.shape(), entropy.shape(), "预测和熵形状不一致");
    let floor = T::from(SIGNIFICANCE_FLOOR).unwrap_or_else(T::epsilon);
    let count = izip!(pred.iter(), entropy.iter())
        .filter(|(&p, &e)| p > floor || e > floor)
        .count();
    let count = T::from(count).unwrap_or_else(T::infinity);
    entropy.sum() / count
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2, Array3};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-8
    }

    #[test]
    fn test_dice_identical() {
        let mut a = Array2::<f64>::zeros((8, 8));
        a.column_mut(3).fill(1.0);
        // 平滑项使结果只在 ε / Σ 的量级上接近 0.
        let d = dice_loss(&a, &a);
        assert!(d >= 0.0 && d < DICE_EPS);
        assert!(f64_eq(d, 1.0 - 16.0 / (16.0 + DICE_EPS)));
    }

    #[test]
    fn test_dice_disjoint() {
        let mut a = Array2::<f32>::zeros((8, 8));
        let mut b = Array2::<f32>::zeros((8, 8));
        a.row_mut(0).fill(1.0);
        b.row_mut(7).fill(1.0);
        assert_eq!(dice_loss(&a, &b), 1.0);
    }

    #[test]
    fn test_dice_all_zero() {
        let a = Array3::<f64>::zeros((4, 4, 2));
        let d = dice_loss(&a, &a);
        assert!(!d.is_nan());
        assert_eq!(d, 1.0);
    }

    #[test]
    fn test_dice_soft() {
        let p = arr2(&[[0.5, 0.5], [0.0, 0.0]]);
        let m = arr2(&[[1.0, 0.0], [0.0, 0.0]]);
        // 1 - 2 * 0.5 / (1 + 1 + eps)
        assert!(f64_eq(dice_loss(&p, &m), 1.0 - 1.0 / (2.0 + DICE_EPS)));
    }

    #[test]
    fn test_mean_entropy() {
        let p = arr2(&[[0.9, 0.0], [0.0, 0.0]]);
        let e = arr2(&[[0.2, 0.4], [0.0, 0.0005]]);
        // 计入分母的像素: (0, 0), (0, 1)
        assert!(f64_eq(mean_entropy(&p, &e), 0.6005 / 2.0));
    }

    #[test]
    fn test_mean_entropy_empty() {
        let z = Array2::<f64>::zeros((3, 3));
        assert!(mean_entropy(&z, &z).is_nan());
    }
}
