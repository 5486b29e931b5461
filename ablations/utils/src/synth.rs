//! 合成穿刺针掩码.
//!
//! 针是一条 (可能带抖动的) 单像素宽直线, 沿 x 方向贯穿整张图像.
//! 坐标约定与 `needle-berry` 一致: 掩码索引为 `(h, w)`, `x = w`, `y = h`.

use ndarray::Array2;
use needle_berry::Idx2d;
use rand::Rng;

/// 一根合成针的几何参数.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Needle {
    /// 与 x 轴的夹角 (单位: 度), y 轴向下.
    pub tilt: f64,

    /// 针在图像中心列处相对中心行的竖直偏移 (单位: 像素).
    pub offset: f64,
}

impl Needle {
    /// 穿过图像中心的水平针.
    pub const HORIZONTAL: Self = Self {
        tilt: 0.0,
        offset: 0.0,
    };

    /// 在 `tilt ∈ [-max_tilt, max_tilt]`, `offset ∈ [-max_offset, max_offset]` 内均匀随机.
    pub fn random<R: Rng>(rng: &mut R, max_tilt: f64, max_offset: f64) -> Self {
        Self {
            tilt: symmetric(rng, max_tilt),
            offset: symmetric(rng, max_offset),
        }
    }

    /// 在自身基础上叠加扰动.
    pub fn perturbed(&self, p: &Perturbation) -> Self {
        Self {
            tilt: self.tilt + p.tilt,
            offset: self.offset + p.offset,
        }
    }

    /// 列 `w` 处针的 (连续) 行坐标.
    pub fn row_at(&self, w: f64, (h, wid): Idx2d) -> f64 {
        let (cx, cy) = ((wid as f64 - 1.0) / 2.0, (h as f64 - 1.0) / 2.0);
        cy + self.offset + self.tilt.to_radians().tan() * (w - cx)
    }

    /// 光栅化为 `shape` 大小的掩码, 前景为 `1.0`.
    ///
    /// 每一列的行坐标叠加 `[-jitter, jitter]` 内的均匀噪声后四舍五入.
    /// 落在图像外的列被丢弃.
    pub fn rasterize<R: Rng>(&self, shape: Idx2d, jitter: f64, rng: &mut R) -> Array2<f64> {
        let mut mask = Array2::zeros(shape);
        for w in 0..shape.1 {
            let row = (self.row_at(w as f64, shape) + symmetric(rng, jitter)).round();
            if row >= 0.0 && row < shape.0 as f64 {
                mask[(row as usize, w)] = 1.0;
            }
        }
        mask
    }
}

/// 预测相对真值的扰动.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Perturbation {
    /// 逐列行坐标的均匀噪声幅度 (单位: 像素).
    pub jitter: f64,

    /// 额外倾斜 (单位: 度).
    pub tilt: f64,

    /// 额外竖直偏移 (单位: 像素).
    pub offset: f64,
}

/// 生成一对 `(预测, 真值)` 掩码. 真值不带抖动.
pub fn needle_pair<R: Rng>(
    gt: &Needle,
    p: &Perturbation,
    shape: Idx2d,
    rng: &mut R,
) -> (Array2<f64>, Array2<f64>) {
    let mask = gt.rasterize(shape, 0.0, rng);
    let pred = gt.perturbed(p).rasterize(shape, p.jitter, rng);
    (pred, mask)
}

/// `[-amp, amp]` 内的均匀随机数. `amp` 为 0 时不消耗随机数.
fn symmetric<R: Rng>(rng: &mut R, amp: f64) -> f64 {
    if amp > 0.0 {
        rng.random_range(-amp..=amp)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_horizontal() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = Needle::HORIZONTAL.rasterize((9, 16), 0.0, &mut rng);
        assert_eq!(m.sum(), 16.0);
        // 中心行 4.0.
        assert!(m.row(4).iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_clipped() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = Needle {
            tilt: 45.0,
            offset: 0.0,
        };
        // 45° 的针在 8 x 32 的图像里只剩中间 8 列左右.
        let m = n.rasterize((8, 32), 0.0, &mut rng);
        assert!(m.sum() <= 9.0 && m.sum() >= 7.0);
    }

    #[test]
    fn test_pair_is_reproducible() {
        let gt = Needle::random(&mut StdRng::seed_from_u64(1), 20.0, 10.0);
        let p = Perturbation {
            jitter: 1.5,
            tilt: 2.0,
            offset: 3.0,
        };
        let a = needle_pair(&gt, &p, (64, 64), &mut StdRng::seed_from_u64(2));
        let b = needle_pair(&gt, &p, (64, 64), &mut StdRng::seed_from_u64(2));
        assert_eq!(a, b);
        assert!(gt.tilt.abs() <= 20.0 && gt.offset.abs() <= 10.0);
    }
}
