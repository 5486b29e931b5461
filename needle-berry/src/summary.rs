//! 单个样本的全部指标, 以及忽略 NaN 的汇总统计.

use crate::error::MetricResult;
use crate::hausdorff::hausdorff_distance_2d;
use crate::nms::nms;
use crate::overlap::dice_loss;
use crate::spec::EvalSpec;
use crate::trajectory::{trajectory_error, Trajectory};
use ndarray::ArrayView2;
use num::Float;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 一对二维预测 / 真值掩码上的全部指标.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SampleMetrics {
    /// Dice 损失.
    pub dice: f64,

    /// 前景之间的 Hausdorff 距离.
    pub hausdorff: f64,

    /// 预测的 NMS.
    pub nms: f64,

    /// 轨迹误差.
    pub trajectory: Trajectory,
}

/// 计算一对掩码的全部指标.
///
/// Dice 在原始数值上计算; 其余指标按 `spec` 提取前景.
/// 只有真值拟合失败 (且策略为 `Fatal`) 时返回错误.
pub fn evaluate_pair<T: Float>(
    pred: ArrayView2<T>,
    mask: ArrayView2<T>,
    spec: &EvalSpec,
) -> MetricResult<SampleMetrics> {
    let dice = dice_loss(&pred, &mask).to_f64().unwrap_or(f64::NAN);
    let hausdorff = hausdorff_distance_2d(pred, mask, spec);
    let nms = nms(pred, spec);
    let trajectory = trajectory_error(pred, mask, spec)?;
    Ok(SampleMetrics {
        dice,
        hausdorff,
        nms,
        trajectory,
    })
}

/// 忽略 NaN 的均值, 同时记录被忽略的个数.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NanMean {
    sum: f64,
    count: usize,
    nan: usize,
}

impl NanMean {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一个值.
    pub fn push(&mut self, v: f64) {
        if v.is_nan() {
            self.nan += 1;
        } else {
            self.sum += v;
            self.count += 1;
        }
    }

    /// 均值. 没有任何非 NaN 值时为 NaN.
    pub fn mean(&self) -> f64 {
        match self.count {
            0 => f64::NAN,
            n => self.sum / n as f64,
        }
    }

    /// 参与均值计算的个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// 被忽略的 NaN 个数.
    #[inline]
    pub fn nan_count(&self) -> usize {
        self.nan
    }
}

impl Extend<f64> for NanMean {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        iter.into_iter().for_each(|v| self.push(v));
    }
}

impl FromIterator<f64> for NanMean {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut m = Self::new();
        m.extend(iter);
        m
    }
}

impl fmt::Display for NanMean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} (n = {}, nan = {})", self.mean(), self.count, self.nan)
    }
}

/// 一批结果的汇总.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Summary {
    /// Dice 损失.
    pub dice: NanMean,

    /// Hausdorff 距离.
    pub hausdorff: NanMean,

    /// NMS.
    pub nms: NanMean,

    /// 轨迹角度误差的绝对值.
    pub angle: NanMean,

    /// 轨迹中心距离误差的绝对值.
    pub centre: NanMean,

    /// 轨迹 Hausdorff 距离.
    pub line_hausdorff: NanMean,

    /// 返回错误 (真值拟合失败) 的样本数.
    pub failed: usize,
}

impl Summary {
    /// 加入一个样本的结果.
    pub fn push(&mut self, r: &MetricResult<SampleMetrics>) {
        let m = match r {
            Ok(m) => m,
            Err(_) => {
                self.failed += 1;
                return;
            }
        };
        self.dice.push(m.dice);
        self.hausdorff.push(m.hausdorff);
        self.nms.push(m.nms);
        self.angle.push(m.trajectory.angle.abs());
        self.centre.push(m.trajectory.centre.abs());
        self.line_hausdorff.push(m.trajectory.hausdorff);
    }

    /// 样本总数 (含失败样本).
    pub fn total(&self) -> usize {
        self.dice.count() + self.dice.nan_count() + self.failed
    }
}

impl<'a> FromIterator<&'a MetricResult<SampleMetrics>> for Summary {
    fn from_iter<I: IntoIterator<Item = &'a MetricResult<SampleMetrics>>>(iter: I) -> Self {
        let mut s = Self::default();
        iter.into_iter().for_each(|r| s.push(r));
        s
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "samples: {} (failed: {})", self.total(), self.failed)?;
        writeln!(f, "dice:           {}", self.dice)?;
        writeln!(f, "hausdorff:      {}", self.hausdorff)?;
        writeln!(f, "nms:            {}", self.nms)?;
        writeln!(f, "|angle|:        {}", self.angle)?;
        writeln!(f, "|centre|:       {}", self.centre)?;
        write!(f, "line hausdorff: {}", self.line_hausdorff)
    }
}
