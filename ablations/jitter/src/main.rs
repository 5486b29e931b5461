//! 合成穿刺针扰动实验: 逐项加大抖动, 倾斜和偏移, 观察各指标的变化.

mod config;
mod result;
mod runner;

fn main() -> Result<(), log::SetLoggerError> {
    let config = config::Config::from_env();
    simple_logger::SimpleLogger::new()
        .with_level(config.log_level)
        .init()?;
    log::info!("{config:?}, {} cpus", utils::cpus());

    runner::run(&config).analyze();
    Ok(())
}
