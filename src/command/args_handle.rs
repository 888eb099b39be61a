use crate::augmentation::{AugmentConfig, Augmentation, PrefixPair};
use crate::error::Result;
use crate::sprite::{SpriteConfig, SpriteJob};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

#[derive(clap::ValueEnum, Clone, Debug)]
enum Compression {
    Default,
    Fast,
    Best,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 把序列帧拼接为精灵图，不带子命令时默认执行
    Glue(GlueArgs),
    /// 为数据集生成随机缩放旋转的副本
    Augment(AugmentArgs),
}

#[derive(clap::Args, Debug, Default)]
struct GlueArgs {
    #[arg(short = 'i', long, help = "帧图片所在目录，默认 ../src/images")]
    images_dir: Option<PathBuf>,

    #[arg(short = 'n', long, help = "每组帧数，默认 24")]
    count: Option<usize>,

    #[arg(
        long,
        requires = "output",
        help = "帧文件名前缀，不传时拼接绿、红、蓝三组烟花"
    )]
    input: Option<String>,

    #[arg(short = 'o', long, requires = "input", help = "精灵图输出路径，扩展名决定格式")]
    output: Option<PathBuf>,

    #[arg(short = 'c', long, help = "png 压缩等级，default、fast、best，默认 default")]
    compression: Option<Compression>,
}

#[derive(clap::Args, Debug)]
struct AugmentArgs {
    #[arg(short = 'r', long, help = "扫描的根目录，默认当前工作路径")]
    root: Option<PathBuf>,

    #[arg(short = 's', long, help = "随机种子，传入后结果可复现")]
    seed: Option<u64>,

    #[arg(
        short = 'f',
        long,
        help = "只处理这个源前缀，例如 output/pause0，不传时处理全部 11 组"
    )]
    file: Option<String>,

    #[arg(long, default_value = "output2/pause", help = "新前缀，配合 --file 使用")]
    name: String,

    #[arg(short = 'c', long, help = "png 压缩等级，default、fast、best，默认 default")]
    compression: Option<Compression>,
}

/// 处理命令行参数
pub fn args_handle() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Commands::Augment(args)) => augment_handle(args),
        Some(Commands::Glue(args)) => glue_handle(args),
        None => glue_handle(GlueArgs::default()),
    }
}

fn glue_handle(args: GlueArgs) -> Result<()> {
    let defaults = SpriteConfig::default();
    let config = SpriteConfig {
        images_dir: args.images_dir.unwrap_or(defaults.images_dir),
        count: args.count.unwrap_or(defaults.count),
        compression: png_compression(args.compression),
    };

    let jobs = match (args.input, args.output) {
        (Some(input), Some(output)) => vec![SpriteJob::new(input, output)],
        _ => SpriteJob::presets(),
    };

    // 每张精灵图独立完成，前一张失败不会写后面的
    for job in &jobs {
        let (width, height) = config.build(job)?;
        println!(
            "{} {} {}x{}",
            "Saved".green(),
            job.output.display(),
            width,
            height
        );
    }
    Ok(())
}

fn augment_handle(args: AugmentArgs) -> Result<()> {
    let config = augment_config(&args);
    let report = Augmentation::new(&config, augment_rng(args.seed)).run()?;
    println!(
        "{} {} groups, {} sources, {} files written",
        "Augmented".green(),
        report.groups,
        report.sources,
        report.written
    );
    Ok(())
}

/// 根据参数生成增强配置，传入 `--file` 时只处理这一对前缀
fn augment_config(args: &AugmentArgs) -> AugmentConfig {
    let mut config = AugmentConfig {
        compression: png_compression(args.compression.clone()),
        ..AugmentConfig::default()
    };
    if let Some(root) = &args.root {
        config.root = root.clone();
    }
    if let Some(file) = &args.file {
        config.prefixes = vec![PrefixPair::new(file.as_str(), args.name.as_str())];
    }
    config
}

/// 有种子时可复现，否则取系统随机源
fn augment_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// 设置压缩等级
fn png_compression(compression: Option<Compression>) -> png::Compression {
    match compression {
        Some(Compression::Fast) => png::Compression::Fast,
        Some(Compression::Best) => png::Compression::Best,
        _ => png::Compression::Default,
    }
}
