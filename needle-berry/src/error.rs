//! 运行时错误.

use thiserror::Error;

/// 直线拟合错误.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FitError {
    /// 没有任何前景点.
    #[error("no foreground points to fit")]
    Empty,

    /// 法方程矩阵 `XᵗX` 不可逆. 参数为参与拟合的点数.
    ///
    /// 常见于所有点共享同一个 x (竖直线), 或只有一个点.
    #[error("normal matrix is singular ({0} points)")]
    Singular(usize),
}

/// 指标计算错误. 退化输入 (空前景, 预测侧拟合失败) 不会产生错误, 而是返回 NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MetricError {
    /// 真值直线拟合失败, 且策略为 [`GroundTruthPolicy::Fatal`](crate::GroundTruthPolicy::Fatal).
    #[error("ground truth line fit failed: {0}")]
    GroundTruthFit(#[source] FitError),
}

/// 评估参数不合法. 由 `try_new` 系列构造函数以及反序列化返回.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// 分辨率不是有限正数.
    #[error("pixel spacing must be finite and positive, got ({row}, {col})")]
    Spacing {
        /// 行方向分辨率.
        row: f64,
        /// 列方向分辨率.
        col: f64,
    },

    /// 门限不在 `[0, 1]` 内.
    #[error("threshold must lie in [0, 1], got {0}")]
    Threshold(f64),

    /// 采样区间为空或不是有限数.
    #[error("sampling range [{start}, {end}] is empty")]
    SamplingRange {
        /// 区间起点.
        start: f64,
        /// 区间终点.
        end: f64,
    },

    /// 采样点少于两个.
    #[error("at least 2 sampling points required, got {0}")]
    SamplingPoints(usize),

    /// 图像中心不是有限数.
    #[error("sampling centre must be finite, got {0:?}")]
    SamplingCentre((f64, f64)),
}

/// 指标计算结果.
pub type MetricResult<T> = Result<T, MetricError>;
