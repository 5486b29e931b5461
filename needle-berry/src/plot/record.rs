//! 记录图元, 便于无界面环境下检查诊断输出.

use super::{histogram_counts, Colour, PlotSink};
use crate::Idx2dF;
use itertools::izip;
use ndarray::ArrayView2;

/// 一条被记录的图元.
#[derive(Clone, Debug, PartialEq)]
pub enum PlotCommand {
    /// 底图, 只记录形状.
    Image {
        /// 标签.
        label: String,
        /// `(h, w)`.
        shape: (usize, usize),
    },

    /// 折线.
    Polyline {
        /// 标签.
        label: String,
        /// `(x, y)` 点.
        points: Vec<Idx2dF>,
        /// 颜色.
        colour: Colour,
    },

    /// 线段.
    Segment {
        /// 起点.
        from: Idx2dF,
        /// 终点.
        to: Idx2dF,
        /// 颜色.
        colour: Colour,
    },

    /// 标记.
    Marker {
        /// 位置.
        at: Idx2dF,
        /// 颜色.
        colour: Colour,
    },

    /// 直方图, 只记录每个桶的计数.
    Histogram {
        /// 标题.
        title: String,
        /// 各桶计数.
        counts: Vec<usize>,
    },

    /// 一张图结束.
    Show,
}

/// 按顺序记录所有图元.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    commands: Vec<PlotCommand>,
}

impl Recorder {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有已记录的图元.
    #[inline]
    pub fn commands(&self) -> &[PlotCommand] {
        &self.commands
    }

    /// 已展示的图的个数.
    pub fn figures(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PlotCommand::Show))
            .count()
    }

    /// 清空记录.
    #[inline]
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl PlotSink for Recorder {
    fn image(&mut self, label: &str, img: ArrayView2<f64>) {
        self.commands.push(PlotCommand::Image {
            label: label.to_string(),
            shape: img.dim(),
        });
    }

    fn polyline(&mut self, label: &str, xs: &[f64], ys: &[f64], colour: Colour) {
        self.commands.push(PlotCommand::Polyline {
            label: label.to_string(),
            points: izip!(xs.iter().copied(), ys.iter().copied()).collect(),
            colour,
        });
    }

    fn segment(&mut self, from: Idx2dF, to: Idx2dF, colour: Colour) {
        self.commands
            .push(PlotCommand::Segment { from, to, colour });
    }

    fn marker(&mut self, at: Idx2dF, colour: Colour) {
        self.commands.push(PlotCommand::Marker { at, colour });
    }

    fn histogram(&mut self, title: &str, values: &[f64], bins: usize) {
        self.commands.push(PlotCommand::Histogram {
            title: title.to_string(),
            counts: histogram_counts(values, bins),
        });
    }

    fn show(&mut self) {
        self.commands.push(PlotCommand::Show);
    }
}
