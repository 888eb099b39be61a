use super::random::{random, random_scale};
use super::transform::{resize_height, rotate};
use crate::codec::{self, FormatTag};
use crate::error::{Error, Result};
use image::RgbaImage;
use png::Compression;
use rand::Rng;
use rgb::RGBA8;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// 数据集里的按钮分组
pub const GROUPS: [&str; 11] = [
    "pause",
    "play",
    "stop",
    "io",
    "forwardstep",
    "backwardstep",
    "next",
    "open",
    "prev",
    "forwardrewind",
    "backwardrewind",
];

/// 源前缀与新前缀
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrefixPair {
    /// 匹配源文件的路径前缀，例如 `dataset/pause0`
    pub file: String,
    /// 生成文件的路径前缀，例如 `dataset/pause`
    pub name: String,
}

impl PrefixPair {
    pub fn new(file: impl Into<String>, name: impl Into<String>) -> PrefixPair {
        PrefixPair {
            file: file.into(),
            name: name.into(),
        }
    }

    pub fn group(group: &str, sequence: &str) -> PrefixPair {
        PrefixPair::new(
            format!("dataset/{group}{sequence}"),
            format!("dataset/{group}"),
        )
    }
}

#[derive(Clone, Debug)]
pub struct AugmentConfig {
    /// 扫描的根目录，前缀都相对于它
    pub root: PathBuf,
    pub prefixes: Vec<PrefixPair>,
    /// 每个源文件生成的副本数
    pub variants: u32,
    /// 高度缩放倍率区间
    pub scale_range: (f64, f64),
    /// 旋转角度区间，单位度
    pub angle_range: (f64, f64),
    /// 旋转后露出部分的填充色
    pub fill: RGBA8,
    pub compression: Compression,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        AugmentConfig {
            root: PathBuf::from("."),
            prefixes: GROUPS
                .iter()
                .map(|group| PrefixPair::group(group, "0"))
                .collect(),
            variants: 4,
            scale_range: (1.1, 1.3),
            angle_range: (-3.0, 3.0),
            fill: RGBA8::new(255, 255, 255, 255),
            compression: Compression::Default,
        }
    }
}

/// 一次增强的统计
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AugmentReport {
    pub groups: usize,
    pub sources: usize,
    pub written: usize,
}

/// 匹配到的源文件
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Match {
    pub path: PathBuf,
    /// 相对路径去掉前缀后剩下的部分
    pub suffix: String,
}

pub struct Augmentation<'a, R> {
    config: &'a AugmentConfig,
    rng: R,
    report: AugmentReport,
}

impl<'a, R: Rng> Augmentation<'a, R> {
    pub fn new(config: &'a AugmentConfig, rng: R) -> Augmentation<'a, R> {
        Augmentation {
            config,
            rng,
            report: AugmentReport::default(),
        }
    }

    /// 遍历根目录，收集相对路径以 `prefix` 开头的文件
    pub fn find_matches(&self, prefix: &str) -> Result<Vec<Match>> {
        let prefix = clean(prefix);
        let root = &self.config.root;
        let mut matches = vec![];

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_dir() {
                continue;
            }
            let relative = relative_path(root, entry.path());
            if let Some(suffix) = relative.strip_prefix(&prefix) {
                log::info!("{} matched", relative);
                matches.push(Match {
                    path: entry.into_path(),
                    suffix: suffix.to_string(),
                });
            }
        }

        Ok(matches)
    }

    /// 第一步：宽度不变，高度随机缩放
    pub fn resize_variant(&mut self, image: &RgbaImage) -> RgbaImage {
        let (from, to) = self.config.scale_range;
        let height = random_scale(&mut self.rng, image.height(), from, to);
        resize_height(image, height)
    }

    /// 第二步：随机小角度旋转
    pub fn rotate_variant(&mut self, image: &RgbaImage) -> RgbaImage {
        let (from, to) = self.config.angle_range;
        let degrees = random(&mut self.rng, from, to);
        rotate(image, degrees, self.config.fill)
    }

    fn augment_file(&mut self, source: &Match, pair: &PrefixPair) -> Result<()> {
        let (image, tag) = codec::load(&source.path)?;

        for index in 1..=self.config.variants {
            let resized = self.resize_variant(&image);
            let variant = self.rotate_variant(&resized);
            let path = self.variant_path(pair, index, &source.suffix);
            self.write(&variant, tag, &path)?;
        }

        self.report.sources += 1;
        Ok(())
    }

    fn variant_path(&self, pair: &PrefixPair, index: u32, suffix: &str) -> PathBuf {
        self.config
            .root
            .join(clean(&format!("{}{}{}", pair.name, index, suffix)))
    }

    fn write(&mut self, image: &RgbaImage, tag: FormatTag, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
        }
        codec::save_file(image, tag, path, self.config.compression)?;
        log::debug!("wrote {} ({})", path.display(), tag.as_str());
        self.report.written += 1;
        Ok(())
    }

    /// 依次处理所有前缀，任何错误都会中止整个任务
    pub fn run(&mut self) -> Result<AugmentReport> {
        let config = self.config;
        for pair in &config.prefixes {
            check_prefix(&pair.file)?;
            check_prefix(&pair.name)?;
            // 先收集完再写，避免新生成的文件被再次匹配
            let matches = self.find_matches(&pair.file)?;
            for source in &matches {
                self.augment_file(source, pair)?;
            }
            self.report.groups += 1;
        }
        Ok(self.report)
    }
}

/// 规整路径：去掉 `.` 和多余分隔符，处理 `..`，统一用 `/` 连接，保留开头的根
fn clean(path: &str) -> String {
    let rooted = path.starts_with(['/', '\\']);
    let mut parts: Vec<&str> = vec![];
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                // 根目录之上没有 `..`
                _ if rooted => {}
                _ => parts.push(part),
            },
            _ => parts.push(part),
        }
    }
    match (rooted, parts.is_empty()) {
        (true, _) => format!("/{}", parts.join("/")),
        (false, true) => ".".to_string(),
        (false, false) => parts.join("/"),
    }
}

/// 前缀都相对于根目录，绝对路径直接拒绝
fn check_prefix(prefix: &str) -> Result<()> {
    if clean(prefix).starts_with('/') || Path::new(prefix).is_absolute() {
        return Err(Error::AbsolutePrefix(prefix.to_string()));
    }
    Ok(())
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn write_source(root: &Path, relative: &str, tag: FormatTag) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let image = RgbaImage::from_fn(20, 30, |x, y| Rgba([x as u8 * 10, y as u8 * 8, 90, 255]));
        codec::save_file(&image, tag, &path, Compression::Fast).unwrap();
    }

    fn config(root: &Path, prefixes: Vec<PrefixPair>) -> AugmentConfig {
        AugmentConfig {
            root: root.to_path_buf(),
            prefixes,
            compression: Compression::Fast,
            ..AugmentConfig::default()
        }
    }

    #[test]
    fn clean_normalizes_separators() {
        assert_eq!(clean("./dataset//pause0"), "dataset/pause0");
        assert_eq!(clean("dataset/x/../pause0/"), "dataset/pause0");
        assert_eq!(clean("../src/images"), "../src/images");
        assert_eq!(clean("./"), ".");
    }

    #[test]
    fn clean_keeps_the_root() {
        assert_eq!(clean("/abs/out"), "/abs/out");
        assert_eq!(clean("//abs/./x/../out"), "/abs/out");
        assert_eq!(clean("/../x"), "/x");
        assert_eq!(clean("/"), "/");
    }

    #[test]
    fn absolute_prefixes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_source(dir.path(), "dataset/pause0.png", FormatTag::Png);

        let absolute_name = config(
            dir.path(),
            vec![PrefixPair::new("dataset/pause0", "/abs/out")],
        );
        match Augmentation::new(&absolute_name, StdRng::seed_from_u64(1)).run() {
            Err(Error::AbsolutePrefix(prefix)) => assert_eq!(prefix, "/abs/out"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!dir.path().join("abs").exists());

        let absolute_file = config(dir.path(), vec![PrefixPair::new("/abs/x", "dataset/x")]);
        assert!(matches!(
            Augmentation::new(&absolute_file, StdRng::seed_from_u64(1)).run(),
            Err(Error::AbsolutePrefix(_))
        ));
    }

    #[test]
    fn default_config_covers_every_group() {
        let config = AugmentConfig::default();
        assert_eq!(config.prefixes.len(), 11);
        assert_eq!(config.prefixes[0], PrefixPair::new("dataset/pause0", "dataset/pause"));
        assert_eq!(
            config.prefixes[10],
            PrefixPair::new("dataset/backwardrewind0", "dataset/backwardrewind")
        );
    }

    #[test]
    fn matches_by_relative_prefix() {
        let dir = tempfile::tempdir().unwrap();
        write_source(dir.path(), "dataset/pause0.png", FormatTag::Png);
        write_source(dir.path(), "dataset/pause0_b.png", FormatTag::Png);
        write_source(dir.path(), "dataset/pause1.png", FormatTag::Png);
        write_source(dir.path(), "other/pause0.png", FormatTag::Png);

        let config = config(dir.path(), vec![]);
        let augmentation = Augmentation::new(&config, StdRng::seed_from_u64(1));
        let suffixes: Vec<String> = augmentation
            .find_matches("./dataset/pause0")
            .unwrap()
            .into_iter()
            .map(|found| found.suffix)
            .collect();

        assert_eq!(suffixes, vec![".png".to_string(), "_b.png".to_string()]);
    }

    #[test]
    fn writes_four_variants_per_source() {
        let dir = tempfile::tempdir().unwrap();
        write_source(dir.path(), "dataset/play0.png", FormatTag::Png);
        write_source(dir.path(), "dataset/stop1.png", FormatTag::Png);

        let config = config(dir.path(), vec![PrefixPair::group("play", "0")]);
        let report = Augmentation::new(&config, StdRng::seed_from_u64(5))
            .run()
            .unwrap();

        assert_eq!(
            report,
            AugmentReport {
                groups: 1,
                sources: 1,
                written: 4
            }
        );
        let mut names: Vec<String> = fs::read_dir(dir.path().join("dataset"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["play0.png", "play1.png", "play2.png", "play3.png", "play4.png", "stop1.png"]
        );
    }

    #[test]
    fn variants_keep_source_format() {
        let dir = tempfile::tempdir().unwrap();
        // 扩展名是 jpg，内容是 png
        write_source(dir.path(), "dataset/io0.jpg", FormatTag::Png);
        write_source(dir.path(), "dataset/open0.jpg", FormatTag::Jpeg);

        let config = config(
            dir.path(),
            vec![PrefixPair::group("io", "0"), PrefixPair::group("open", "0")],
        );
        Augmentation::new(&config, StdRng::seed_from_u64(9))
            .run()
            .unwrap();

        let (_, tag) = codec::load(&dir.path().join("dataset/io3.jpg")).unwrap();
        assert_eq!(tag, FormatTag::Png);
        let (_, tag) = codec::load(&dir.path().join("dataset/open2.jpg")).unwrap();
        assert_eq!(tag, FormatTag::Jpeg);
    }

    #[test]
    fn suffix_may_descend_into_directories() {
        let dir = tempfile::tempdir().unwrap();
        write_source(dir.path(), "dataset/next0/frame.png", FormatTag::Png);

        let config = config(dir.path(), vec![PrefixPair::group("next", "0")]);
        Augmentation::new(&config, StdRng::seed_from_u64(2))
            .run()
            .unwrap();

        for index in 1..=4 {
            assert!(dir
                .path()
                .join(format!("dataset/next{index}/frame.png"))
                .is_file());
        }
    }

    #[test]
    fn resized_variant_height_in_direct_or_inverted_range() {
        let config = AugmentConfig::default();
        let mut augmentation = Augmentation::new(&config, StdRng::seed_from_u64(17));
        let source = RgbaImage::from_pixel(40, 100, Rgba([1, 2, 3, 255]));

        for _ in 0..50 {
            let (width, height) = augmentation.resize_variant(&source).dimensions();
            assert_eq!(width, 40);
            let inverted = (76..=90).contains(&height);
            let direct = (110..=130).contains(&height);
            assert!(inverted || direct, "height {height}");
        }
    }

    #[test]
    fn rotated_variant_grows_at_most_a_few_pixels() {
        let config = AugmentConfig::default();
        let mut augmentation = Augmentation::new(&config, StdRng::seed_from_u64(23));
        let source = RgbaImage::from_pixel(40, 100, Rgba([1, 2, 3, 255]));

        for _ in 0..20 {
            let (width, height) = augmentation.rotate_variant(&source).dimensions();
            assert!((40..=46).contains(&width), "width {width}");
            assert!((100..=103).contains(&height), "height {height}");
        }
    }

    #[test]
    fn corrupt_source_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("dataset")).unwrap();
        fs::write(dir.path().join("dataset/prev0.png"), b"not a png").unwrap();

        let config = config(dir.path(), vec![PrefixPair::group("prev", "0")]);
        let result = Augmentation::new(&config, StdRng::seed_from_u64(4)).run();

        assert!(matches!(result, Err(Error::Decode { .. })));
        assert!(!dir.path().join("dataset/prev1.png").exists());
    }
}
