//! 基于 OpenCV `highgui` 的窗口展示, 主要用于调试.
//!
//! # 注意
//!
//! 需要 `plot` feature.

use super::{histogram_counts, Colour, PlotSink};
use crate::Idx2dF;
use ndarray::ArrayView2;
use opencv::core::{Mat, Point, Rect, Scalar, Vec3b, CV_8UC3};
use opencv::highgui::{imshow, wait_key};
use opencv::imgproc::{self, LINE_8, MARKER_CROSS};
use opencv::prelude::{MatTrait, MatTraitConst};

/// 直方图画布的边长 (像素).
const HIST_CANVAS: i32 = 256;

/// 将图元绘制到 OpenCV 画布上, 在 `show` 时弹出窗口并等待一次用户按键.
///
/// 绘制失败只会记录日志, 不会 panic.
pub struct OpenCvSink {
    window: String,
    canvas: Option<Mat>,
    histograms: Vec<Mat>,
}

impl OpenCvSink {
    /// 以窗口名 `window` 初始化.
    pub fn new(window: impl Into<String>) -> Self {
        Self {
            window: window.into(),
            canvas: None,
            histograms: vec![],
        }
    }

    fn bgr(colour: Colour) -> Scalar {
        match colour {
            Colour::Red => Scalar::new(0.0, 0.0, 255.0, 0.0),
            Colour::Yellow => Scalar::new(0.0, 255.0, 255.0, 0.0),
            Colour::Green => Scalar::new(0.0, 255.0, 0.0, 0.0),
            Colour::White => Scalar::new(255.0, 255.0, 255.0, 0.0),
        }
    }

    #[inline]
    fn point((x, y): Idx2dF) -> Point {
        Point::new(x.round() as i32, y.round() as i32)
    }

    /// 将 `img` 线性拉伸到 `[0, 255]` 灰度后铺成三通道.
    fn gray_canvas(img: ArrayView2<f64>) -> opencv::Result<Mat> {
        let (h, w) = img.dim();
        let mut mat =
            Mat::new_rows_cols_with_default(h as i32, w as i32, CV_8UC3, Scalar::all(0.0))?;
        let (lo, hi) = img
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = if hi > lo { hi - lo } else { 1.0 };
        for ((i, j), &v) in img.indexed_iter() {
            let g = if v.is_finite() {
                ((v - lo) / range * 255.0) as u8
            } else {
                0
            };
            *mat.at_2d_mut::<Vec3b>(i as i32, j as i32)? = Vec3b::from([g, g, g]);
        }
        Ok(mat)
    }

    fn histogram_canvas(title: &str, counts: &[usize]) -> opencv::Result<Mat> {
        let mut mat = Mat::new_rows_cols_with_default(
            HIST_CANVAS,
            HIST_CANVAS,
            CV_8UC3,
            Scalar::all(0.0),
        )?;
        let peak = counts.iter().copied().max().unwrap_or(0).max(1);
        let bar_w = (HIST_CANVAS / counts.len().max(1) as i32).max(1);
        let white = Self::bgr(Colour::White);
        for (k, &c) in counts.iter().enumerate() {
            let bar_h = (c as f64 / peak as f64 * (HIST_CANVAS - 24) as f64) as i32;
            let rect = Rect::new(k as i32 * bar_w, HIST_CANVAS - bar_h, bar_w - 1, bar_h);
            imgproc::rectangle(&mut mat, rect, white, -1, LINE_8, 0)?;
        }
        imgproc::put_text(
            &mut mat,
            title,
            Point::new(4, 16),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.4,
            Self::bgr(Colour::Green),
            1,
            LINE_8,
            false,
        )?;
        Ok(mat)
    }

    /// 在底图上绘制. 没有底图时忽略.
    fn draw<F>(&mut self, op: F)
    where
        F: FnOnce(&mut Mat) -> opencv::Result<()>,
    {
        if let Some(canvas) = self.canvas.as_mut() {
            if let Err(e) = op(canvas) {
                log::error!("opencv drawing failed: {e}");
            }
        }
    }

    fn try_show(&mut self) -> opencv::Result<()> {
        if let Some(canvas) = self.canvas.take() {
            imshow(&self.window, &canvas)?;
        }
        for (k, hist) in std::mem::take(&mut self.histograms).iter().enumerate() {
            imshow(&format!("{} #{}", self.window, k + 1), hist)?;
        }
        wait_key(0)?;
        Ok(())
    }
}

impl PlotSink for OpenCvSink {
    fn image(&mut self, label: &str, img: ArrayView2<f64>) {
        match Self::gray_canvas(img) {
            Ok(mat) => self.canvas = Some(mat),
            Err(e) => log::error!("cannot build canvas `{label}`: {e}"),
        }
    }

    fn polyline(&mut self, _: &str, xs: &[f64], ys: &[f64], colour: Colour) {
        let pts: Vec<Point> = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| Self::point((x, y)))
            .collect();
        self.draw(|m| {
            for w in pts.windows(2) {
                imgproc::line(m, w[0], w[1], Self::bgr(colour), 1, LINE_8, 0)?;
            }
            Ok(())
        });
    }

    fn segment(&mut self, from: Idx2dF, to: Idx2dF, colour: Colour) {
        let (a, b) = (Self::point(from), Self::point(to));
        self.draw(|m| imgproc::line(m, a, b, Self::bgr(colour), 1, LINE_8, 0));
    }

    fn marker(&mut self, at: Idx2dF, colour: Colour) {
        let p = Self::point(at);
        self.draw(|m| imgproc::draw_marker(m, p, Self::bgr(colour), MARKER_CROSS, 9, 1, LINE_8));
    }

    fn histogram(&mut self, title: &str, values: &[f64], bins: usize) {
        match Self::histogram_canvas(title, &histogram_counts(values, bins)) {
            Ok(mat) => self.histograms.push(mat),
            Err(e) => log::error!("cannot build histogram `{title}`: {e}"),
        }
    }

    fn show(&mut self) {
        if let Err(e) = self.try_show() {
            log::error!("cannot show figure: {e}");
        }
    }
}
