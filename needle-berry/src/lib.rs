#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供穿刺针分割结果 (二维概率图 / 掩码) 的评估指标.
//!
//! 该 crate 只提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 所有指标都是纯函数, 不修改输入. 诊断图通过 [`plot::PlotSink`] 旁路输出,
//!   不影响返回值.
//! 2. 退化输入 (空前景, 拟合奇异) 返回 NaN, 不会 panic. 非法配置 (阈值不在
//!   `[0, 1]`, 分辨率非正) 在 `new` 时直接 panic, `try_new` 与反序列化则返回 [`ConfigError`].
//! 3. 下游求平均时需要跳过 NaN, 见 [`summary::NanMean`].
//!
//! # 指标
//!
//! ### Dice 损失与平均熵 ✅
//!
//! 任意维度, 任意浮点类型.
//!
//! 实现位于 `needle-berry/src/overlap.rs`.
//!
//! ### Hausdorff 距离 ✅
//!
//! 三维 (类别通道在最后一维) 输入取第 1 通道; 二维输入按 [`Binarize`] 规则提取前景.
//!
//! 实现位于 `needle-berry/src/hausdorff.rs`, 点集运算位于 `needle-berry/src/geom.rs`.
//!
//! ### NMS (归一化均方垂直距离) ✅
//!
//! 对预测前景像素做最小二乘直线拟合, 求各像素到直线的垂直距离平方的均值.
//!
//! 实现位于 `needle-berry/src/nms.rs`.
//!
//! ### 轨迹误差 ✅
//!
//! 比较预测与真值拟合直线的角度, 中心距离, 以及两条直线的 Hausdorff 距离.
//!
//! 实现位于 `needle-berry/src/trajectory.rs`.
//!
//! # 坐标约定
//!
//! 掩码索引为 `(h, w)`. 拟合时 `x = w`, `y = h`, 即图像坐标系 (y 轴向下).
//! 分辨率 [`PixelSpacing`] 的 `row` 作用于 `h` / `y`, `col` 作用于 `w` / `x`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 高精度通用索引 / 向量.
pub type Idx2dF = (f64, f64);

pub mod consts;

pub mod spec;
pub use spec::{Binarize, EvalSpec, GroundTruthPolicy, LineSampling, PixelSpacing};

pub mod error;
pub use error::{ConfigError, FitError, MetricError, MetricResult};

pub mod mask;

pub mod geom;

pub mod fitting;

mod overlap;
pub use overlap::{dice_loss, mean_entropy};

mod hausdorff;
pub use hausdorff::{hausdorff_distance, hausdorff_distance_2d, points_hausdorff};

pub mod plot;

mod nms;
pub use nms::{nms, nms_report, nms_with, NmsReport};

mod trajectory;
pub use trajectory::{nearest_to_centre, trajectory_error, trajectory_error_with, Trajectory};

pub mod summary;

pub mod prelude;
