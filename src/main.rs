mod augmentation;
mod codec;
mod command;
mod error;
mod sprite;

use colored::Colorize;
use std::process;
use std::time::Instant;

/// 转换毫秒为秒
const SECOND_CONSTANT: f64 = 1000.00;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let start_time = Instant::now();

    if let Err(err) = command::args_handle() {
        log::error!("{err}");
        eprintln!("{}", "Aborted".red().bold());
        process::exit(1);
    }

    let second = start_time.elapsed().as_millis() as f64 / SECOND_CONSTANT;
    println!("Total time: {}s", second);
    println!("{}", "Complete all work".green());
}
