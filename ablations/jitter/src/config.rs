//! 实验配置. 所有项都可以由环境变量覆盖.

use log::LevelFilter;
use needle_berry::{Binarize, EvalSpec, LineSampling, PixelSpacing};
use std::env;
use std::str::FromStr;

/// 实验配置.
#[derive(Clone, Debug)]
pub struct Config {
    /// 每个扰动等级的样本数. `$JITTER_SAMPLES`, 默认 64.
    pub samples: usize,

    /// 正方形图像边长. `$JITTER_SIZE`, 默认 512.
    pub size: usize,

    /// 随机种子. `$JITTER_SEED`, 默认 42.
    pub seed: u64,

    /// 真值针的最大倾斜角 (度). `$JITTER_MAX_TILT`, 默认 30.
    pub max_tilt: f64,

    /// 真值针的最大竖直偏移 (像素). `$JITTER_MAX_OFFSET`, 默认 32.
    pub max_offset: f64,

    /// 各向同性像素分辨率. `$JITTER_SPACING`, 默认 1.
    pub spacing: f64,

    /// 是否按阈值提取前景. `$JITTER_THRESHOLD`, 默认 `false`.
    pub threshold_mode: bool,

    /// 日志等级. `$JITTER_LOG`, 默认 `info`.
    pub log_level: LevelFilter,
}

impl Config {
    /// 从环境变量读取, 缺失或无法解析的项使用默认值.
    pub fn from_env() -> Self {
        Self {
            samples: var_or("JITTER_SAMPLES", 64),
            size: var_or("JITTER_SIZE", 512),
            seed: var_or("JITTER_SEED", 42),
            max_tilt: var_or("JITTER_MAX_TILT", 30.0),
            max_offset: var_or("JITTER_MAX_OFFSET", 32.0),
            spacing: var_or("JITTER_SPACING", 1.0),
            threshold_mode: var_or("JITTER_THRESHOLD", false),
            log_level: var_or("JITTER_LOG", LevelFilter::Info),
        }
    }

    /// 对应的评估配置.
    pub fn eval_spec(&self) -> EvalSpec {
        let binarize = if self.threshold_mode {
            Binarize::Threshold
        } else {
            Binarize::Literal
        };
        EvalSpec::new(0.5, PixelSpacing::isotropic(self.spacing))
            .with_binarize(binarize)
            .with_sampling(LineSampling::for_shape((self.size, self.size)))
    }
}

fn var_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(v) => v.parse().unwrap_or_else(|_| {
            eprintln!("cannot parse ${key}={v}, using default");
            default
        }),
        Err(_) => default,
    }
}
