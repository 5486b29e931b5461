//! 实验结果.

use needle_berry::summary::{NanMean, Summary};
use std::io::{self, Write};
use std::time::Duration;
use utils::synth::Perturbation;

/// 一个扰动等级下的结果.
pub struct Level {
    perturbation: Perturbation,
    summary: Summary,
    elapsed: Duration,
}

impl Level {
    pub fn new(perturbation: Perturbation, summary: Summary, elapsed: Duration) -> Self {
        Self {
            perturbation,
            summary,
            elapsed,
        }
    }
}

/// 将一组实验的结果写进 `w` 中.
fn describe_into<W: Write>(name: &str, levels: &[Level], w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn mean_to_display(m: &NanMean) -> String {
        match m.count() {
            0 => "/".to_string(),
            _ => format!("{:.4}", m.mean()),
        }
    }

    writeln!(w, "Sweep `{name}`:")?;
    writeln!(
        w,
        "{S4}{:>8} {:>8} {:>8} | {:>8} {:>9} {:>8} {:>8} {:>8} {:>9} | {:>4} {:>4} | {:>8}",
        "jitter", "tilt", "offset", "dice", "hausdorff", "nms", "|angle|", "|centre|", "line hd",
        "nan", "err", "ms"
    )?;
    for l in levels {
        let (p, s) = (&l.perturbation, &l.summary);
        writeln!(
            w,
            "{S4}{:>8.2} {:>8.2} {:>8.2} | {:>8} {:>9} {:>8} {:>8} {:>8} {:>9} | {:>4} {:>4} | {:>8}",
            p.jitter,
            p.tilt,
            p.offset,
            mean_to_display(&s.dice),
            mean_to_display(&s.hausdorff),
            mean_to_display(&s.nms),
            mean_to_display(&s.angle),
            mean_to_display(&s.centre),
            mean_to_display(&s.line_hausdorff),
            s.angle.nan_count(),
            s.failed,
            l.elapsed.as_millis()
        )?;
    }
    Ok(())
}

/// 消融实验最终结果.
pub struct AblationResult {
    data: Vec<(&'static str, Vec<Level>)>,
}

impl AblationResult {
    pub fn from_iter<I: IntoIterator<Item = (&'static str, Vec<Level>)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 分析运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(2048);

        for (key, levels) in self.data.iter() {
            if let Err(e) = describe_into(key, levels, &mut buf) {
                log::error!("cannot describe sweep `{key}`: {e}");
            }
            print!("{}", String::from_utf8_lossy(&buf));
            buf.clear();

            utils::sep();
        }
    }
}
