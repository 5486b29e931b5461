//! 评估参数.
//!
//! 所有参数对象都是只读的值对象, 在构建时检查合法性. `new` 对非法参数直接 panic,
//! `try_new` 返回 [`ConfigError`]. 反序列化同样经过 `try_new`, 非法配置无法绕过检查.
//! 若要修改参数, 你应该创建新的实例.

use crate::consts::sampling;
use crate::error::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 像素在垂直 (行) 和水平 (列) 方向的分辨率 (单位: 毫米).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "raw::PixelSpacing")
)]
pub struct PixelSpacing {
    row: f64,
    col: f64,
}

impl PixelSpacing {
    /// 以行方向分辨率 `row` 和列方向分辨率 `col` 构建.
    ///
    /// 两者必须严格为正且有限, 否则程序 panic.
    pub fn new(row: f64, col: f64) -> Self {
        Self::try_new(row, col).unwrap_or_else(|e| panic!("{e}"))
    }

    /// 同 [`PixelSpacing::new`], 但以 `Err` 代替 panic.
    pub fn try_new(row: f64, col: f64) -> Result<Self, ConfigError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if positive(row) && positive(col) {
            Ok(Self { row, col })
        } else {
            Err(ConfigError::Spacing { row, col })
        }
    }

    /// 两个方向分辨率相同.
    #[inline]
    pub fn isotropic(v: f64) -> Self {
        Self::new(v, v)
    }

    /// 行 (y) 方向分辨率.
    #[inline]
    pub fn row(&self) -> f64 {
        self.row
    }

    /// 列 (x) 方向分辨率.
    #[inline]
    pub fn col(&self) -> f64 {
        self.col
    }

    /// 以 `(x, y)` 顺序返回, 便于直接与平面直角坐标相乘.
    #[inline]
    pub fn xy(&self) -> (f64, f64) {
        (self.col, self.row)
    }
}

impl Default for PixelSpacing {
    fn default() -> Self {
        Self { row: 1.0, col: 1.0 }
    }
}

/// 从浮点掩码中提取前景坐标的方式.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Binarize {
    /// 不使用门限, 只有精确等于 `1.0` 的像素是前景.
    ///
    /// 这是已有评估结果所对应的行为: 历史实现中的二值化语句实际上没有生效.
    #[default]
    Literal,

    /// 大于等于门限的像素是前景.
    Threshold,
}

/// 轨迹误差中, 真值直线拟合失败 (奇异) 时的处理方式.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GroundTruthPolicy {
    /// 视为数据错误, 返回 `Err`.
    #[default]
    Fatal,

    /// 与预测侧一致, 退化为全 NaN 结果.
    Undefined,
}

/// 拟合直线的采样规则: 在 `[start, end]` 上等距取 `points` 个 x,
/// 同时给出用于计算中心距离的图像中心 `centre` (`(x, y)`, 单位: 像素).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "raw::LineSampling")
)]
pub struct LineSampling {
    start: f64,
    end: f64,
    points: usize,
    centre: (f64, f64),
}

impl LineSampling {
    /// 构建采样规则. 要求 `start < end` 且 `points >= 2`, 否则程序 panic.
    pub fn new(start: f64, end: f64, points: usize, centre: (f64, f64)) -> Self {
        Self::try_new(start, end, points, centre).unwrap_or_else(|e| panic!("{e}"))
    }

    /// 同 [`LineSampling::new`], 但以 `Err` 代替 panic.
    pub fn try_new(
        start: f64,
        end: f64,
        points: usize,
        centre: (f64, f64),
    ) -> Result<Self, ConfigError> {
        if !(start.is_finite() && end.is_finite() && start < end) {
            return Err(ConfigError::SamplingRange { start, end });
        }
        if points < 2 {
            return Err(ConfigError::SamplingPoints(points));
        }
        if !(centre.0.is_finite() && centre.1.is_finite()) {
            return Err(ConfigError::SamplingCentre(centre));
        }
        Ok(Self {
            start,
            end,
            points,
            centre,
        })
    }

    /// 为 `(h, w)` 大小的图像构建默认规则: x 取遍所有列, 中心为图像几何中心.
    pub fn for_shape((h, w): (usize, usize)) -> Self {
        assert!(h >= 1 && w >= 2);
        let (hf, wf) = ((h - 1) as f64, (w - 1) as f64);
        Self::new(0.0, wf, w, (wf / 2.0, hf / 2.0))
    }

    /// 区间起点.
    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// 区间终点.
    #[inline]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// 采样点个数.
    #[inline]
    pub fn points(&self) -> usize {
        self.points
    }

    /// 图像中心 `(x, y)`.
    #[inline]
    pub fn centre(&self) -> (f64, f64) {
        self.centre
    }

    /// 所有采样 x. 首尾端点一定被选取.
    pub fn xs(&self) -> Vec<f64> {
        let step = (self.end - self.start) / (self.points - 1) as f64;
        let mut xs: Vec<f64> = (0..self.points)
            .map(|i| self.start + step * i as f64)
            .collect();
        // 避免累积误差影响终点
        if let Some(last) = xs.last_mut() {
            *last = self.end;
        }
        xs
    }
}

impl Default for LineSampling {
    fn default() -> Self {
        Self {
            start: sampling::X_START,
            end: sampling::X_END,
            points: sampling::POINTS,
            centre: sampling::CENTRE,
        }
    }
}

/// 评估参数合集.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "raw::EvalSpec")
)]
pub struct EvalSpec {
    /// 二值化门限, `[0, 1]`.
    threshold: f64,

    /// 像素分辨率.
    spacing: PixelSpacing,

    /// 前景提取方式.
    binarize: Binarize,

    /// 真值拟合失败时的策略.
    gt_policy: GroundTruthPolicy,

    /// 直线采样规则.
    sampling: LineSampling,
}

impl EvalSpec {
    /// 以门限 `threshold` 和像素分辨率 `spacing` 构建, 其它参数取默认值.
    ///
    /// `threshold` 不在 `[0, 1]` 内时程序 panic.
    pub fn new(threshold: f64, spacing: PixelSpacing) -> Self {
        Self::try_new(threshold, spacing).unwrap_or_else(|e| panic!("{e}"))
    }

    /// 同 [`EvalSpec::new`], 但以 `Err` 代替 panic.
    pub fn try_new(threshold: f64, spacing: PixelSpacing) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Threshold(threshold));
        }
        Ok(Self {
            threshold,
            spacing,
            binarize: Binarize::default(),
            gt_policy: GroundTruthPolicy::default(),
            sampling: LineSampling::default(),
        })
    }

    /// 替换前景提取方式.
    #[inline]
    pub fn with_binarize(mut self, binarize: Binarize) -> Self {
        self.binarize = binarize;
        self
    }

    /// 替换真值拟合失败策略.
    #[inline]
    pub fn with_gt_policy(mut self, gt_policy: GroundTruthPolicy) -> Self {
        self.gt_policy = gt_policy;
        self
    }

    /// 替换直线采样规则.
    #[inline]
    pub fn with_sampling(mut self, sampling: LineSampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// 二值化门限.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// 像素分辨率.
    #[inline]
    pub fn spacing(&self) -> PixelSpacing {
        self.spacing
    }

    /// 前景提取方式.
    #[inline]
    pub fn binarize(&self) -> Binarize {
        self.binarize
    }

    /// 真值拟合失败策略.
    #[inline]
    pub fn gt_policy(&self) -> GroundTruthPolicy {
        self.gt_policy
    }

    /// 直线采样规则.
    #[inline]
    pub fn sampling(&self) -> &LineSampling {
        &self.sampling
    }
}

impl Default for EvalSpec {
    /// 门限 0.5, 分辨率 `(1.0, 1.0)`.
    fn default() -> Self {
        Self::new(0.5, PixelSpacing::default())
    }
}

/// 反序列化的中间形态. 字段与对外类型一一对应, 转换时重新走一遍合法性检查.
#[cfg(feature = "serde")]
mod raw {
    use super::{Binarize, ConfigError, GroundTruthPolicy};
    use serde::Deserialize;

    #[derive(Deserialize)]
    pub(super) struct PixelSpacing {
        row: f64,
        col: f64,
    }

    impl TryFrom<PixelSpacing> for super::PixelSpacing {
        type Error = ConfigError;

        fn try_from(r: PixelSpacing) -> Result<Self, Self::Error> {
            Self::try_new(r.row, r.col)
        }
    }

    #[derive(Deserialize)]
    pub(super) struct LineSampling {
        start: f64,
        end: f64,
        points: usize,
        centre: (f64, f64),
    }

    impl TryFrom<LineSampling> for super::LineSampling {
        type Error = ConfigError;

        fn try_from(r: LineSampling) -> Result<Self, Self::Error> {
            Self::try_new(r.start, r.end, r.points, r.centre)
        }
    }

    // 嵌套字段在各自的反序列化中已经检查过.
    #[derive(Deserialize)]
    pub(super) struct EvalSpec {
        threshold: f64,
        spacing: super::PixelSpacing,
        binarize: Binarize,
        gt_policy: GroundTruthPolicy,
        sampling: super::LineSampling,
    }

    impl TryFrom<EvalSpec> for super::EvalSpec {
        type Error = ConfigError;

        fn try_from(r: EvalSpec) -> Result<Self, Self::Error> {
            Ok(Self::try_new(r.threshold, r.spacing)?
                .with_binarize(r.binarize)
                .with_gt_policy(r.gt_policy)
                .with_sampling(r.sampling))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EvalSpec, LineSampling, PixelSpacing};
    use crate::error::ConfigError;

    #[test]
    #[should_panic]
    fn test_spacing_non_positive() {
        PixelSpacing::new(0.0, 1.0);
    }

    #[test]
    #[should_panic]
    fn test_threshold_out_of_range() {
        EvalSpec::new(1.5, PixelSpacing::default());
    }

    #[test]
    fn test_try_new_rejects() {
        assert_eq!(
            PixelSpacing::try_new(-2.0, 1.0),
            Err(ConfigError::Spacing { row: -2.0, col: 1.0 })
        );
        assert!(PixelSpacing::try_new(1.0, f64::NAN).is_err());
        assert_eq!(
            EvalSpec::try_new(7.0, PixelSpacing::default()),
            Err(ConfigError::Threshold(7.0))
        );
        assert!(EvalSpec::try_new(f64::NAN, PixelSpacing::default()).is_err());
        assert_eq!(
            LineSampling::try_new(0.0, 511.0, 0, (255.5, 255.5)),
            Err(ConfigError::SamplingPoints(0))
        );
        assert!(LineSampling::try_new(3.0, 3.0, 4, (0.0, 0.0)).is_err());
        assert!(LineSampling::try_new(0.0, 1.0, 2, (f64::INFINITY, 0.0)).is_err());
        assert!(EvalSpec::try_new(1.0, PixelSpacing::isotropic(0.5)).is_ok());
    }

    #[test]
    fn test_default_sampling() {
        let s = LineSampling::default();
        let xs = s.xs();
        assert_eq!(xs.len(), 512);
        assert_eq!(xs[0], 0.0);
        assert_eq!(xs[1], 1.0);
        assert_eq!(xs[511], 511.0);
        assert_eq!(s.centre(), (255.5, 255.5));
    }

    #[test]
    fn test_sampling_for_shape() {
        assert_eq!(LineSampling::for_shape((512, 512)), LineSampling::default());

        let s = LineSampling::for_shape((5, 9));
        assert_eq!(s.xs(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(s.centre(), (4.0, 2.0));
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;

        #[test]
        fn test_serde_default_spec() {
            let spec = EvalSpec::default();
            let json = serde_json::to_string(&spec).unwrap();
            let back: EvalSpec = serde_json::from_str(&json).unwrap();
            assert_eq!(back, spec);
        }

        #[test]
        fn test_serde_rejects_zero_points() {
            let mut v = serde_json::to_value(EvalSpec::default()).unwrap();
            v["sampling"]["points"] = 0.into();
            let err = serde_json::from_value::<EvalSpec>(v).unwrap_err();
            assert!(err.to_string().contains("sampling points"));
        }

        #[test]
        fn test_serde_rejects_threshold() {
            let mut v = serde_json::to_value(EvalSpec::default()).unwrap();
            v["threshold"] = 7.0.into();
            assert!(serde_json::from_value::<EvalSpec>(v).is_err());
        }

        #[test]
        fn test_serde_rejects_spacing() {
            let mut v = serde_json::to_value(EvalSpec::default()).unwrap();
            v["spacing"]["row"] = (-2.0).into();
            assert!(serde_json::from_value::<EvalSpec>(v).is_err());
            assert!(serde_json::from_str::<PixelSpacing>(r#"{"row":-2.0,"col":1.0}"#).is_err());
            let ok: PixelSpacing = serde_json::from_str(r#"{"row":0.5,"col":0.25}"#).unwrap();
            assert_eq!(ok, PixelSpacing::new(0.5, 0.25));
        }
    }
}
