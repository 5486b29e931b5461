//! 通用常量.

/// Dice 分母上的平滑项, 防止两个输入同时全零时除零.
pub const DICE_EPS: f64 = 1e-6;

/// 预测值或熵值超过该下限时, 像素才被计入平均熵的分母.
pub const SIGNIFICANCE_FLOOR: f64 = 1e-3;

/// 三维 (带类别通道) 掩码中, 前景类别所在的通道索引.
pub const FOREGROUND_CHANNEL: usize = 1;

/// 未经二值化的掩码中, 被视为前景的精确像素值.
pub const FOREGROUND_VALUE: f64 = 1.0;

/// 轨迹采样相关的默认值. 对应 512 x 512 的图像.
pub mod sampling {
    /// 拟合直线采样区间起点 (x, 单位: 像素).
    pub const X_START: f64 = 0.0;

    /// 拟合直线采样区间终点 (x, 单位: 像素, 闭区间).
    pub const X_END: f64 = 511.0;

    /// 拟合直线上的采样点个数.
    pub const POINTS: usize = 512;

    /// 图像中心 `(x, y)`.
    pub const CENTRE: (f64, f64) = (255.5, 255.5);
}
