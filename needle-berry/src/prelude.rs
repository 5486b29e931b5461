//! 🪡欢迎光临🩺
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx2dF};

pub use crate::spec::{Binarize, EvalSpec, GroundTruthPolicy, LineSampling, PixelSpacing};

pub use crate::error::{ConfigError, FitError, MetricError, MetricResult};

pub use crate::{dice_loss, hausdorff_distance, hausdorff_distance_2d, mean_entropy};
pub use crate::{nms, nms_report, nms_with, NmsReport};
pub use crate::{trajectory_error, trajectory_error_with, Trajectory};

pub use crate::summary::{evaluate_pair, NanMean, SampleMetrics, Summary};

pub use crate::plot::{NullSink, PlotSink, Recorder};

#[cfg(feature = "plot")]
pub use crate::plot::OpenCvSink;
