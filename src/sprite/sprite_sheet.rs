use super::glue;
use crate::codec::{self, FormatTag};
use crate::error::{Error, Result};
use image::RgbaImage;
use png::Compression;
use std::path::PathBuf;

/// 每组爆炸动画的帧数
pub const FRAME_COUNT: usize = 24;

/// 一次精灵图拼接任务
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpriteJob {
    /// 帧文件名前缀，相对于帧目录，例如 `green_explosion/green_explosion_`
    pub input_prefix: String,
    /// 精灵图输出路径，扩展名决定编码格式
    pub output: PathBuf,
}

impl SpriteJob {
    pub fn new(input_prefix: impl Into<String>, output: impl Into<PathBuf>) -> SpriteJob {
        SpriteJob {
            input_prefix: input_prefix.into(),
            output: output.into(),
        }
    }

    /// 绿、红、蓝三组烟花
    pub fn presets() -> Vec<SpriteJob> {
        vec![
            SpriteJob::new("green_explosion/green_explosion_", "firework_green.png"),
            SpriteJob::new("red_explosion/red_snakeplosion_", "firework_red.png"),
            SpriteJob::new("blue_explosion/bluspark_", "firework_blue.png"),
        ]
    }
}

#[derive(Clone, Debug)]
pub struct SpriteConfig {
    /// 帧图片所在目录
    pub images_dir: PathBuf,
    pub count: usize,
    pub compression: Compression,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        SpriteConfig {
            images_dir: PathBuf::from("../src/images"),
            count: FRAME_COUNT,
            compression: Compression::Default,
        }
    }
}

impl SpriteConfig {
    /// 第 `index` 帧的路径，`index` 从 1 开始，补零到 5 位
    pub fn frame_path(&self, prefix: &str, index: usize) -> PathBuf {
        self.images_dir.join(format!("{prefix}{index:05}.png"))
    }

    /// 按顺序加载全部帧，任意一帧失败立即返回
    pub fn load_frames(&self, prefix: &str) -> Result<Vec<RgbaImage>> {
        (1..=self.count)
            .map(|index| {
                let path = self.frame_path(prefix, index);
                codec::load(&path)
                    .map(|(image, _)| image)
                    .map_err(|source| Error::FrameLoad {
                        index,
                        path,
                        source: Box::new(source),
                    })
            })
            .collect()
    }

    /// 加载、拼接并保存一张精灵图，返回精灵图尺寸。
    ///
    /// 所有帧都加载成功后才会创建输出文件。
    pub fn build(&self, job: &SpriteJob) -> Result<(u32, u32)> {
        // 先确认输出格式，避免加载完所有帧才发现不支持
        FormatTag::from_path(&job.output)?;
        let frames = self.load_frames(&job.input_prefix)?;
        if let Some(first) = frames.first() {
            log::info!(
                "{}: frame size {}x{}",
                job.input_prefix,
                first.width(),
                first.height()
            );
        }

        let sprite = glue(&frames)?;
        codec::save_path(&sprite, &job.output, self.compression)?;
        log::info!(
            "{} -> {} ({}x{})",
            job.input_prefix,
            job.output.display(),
            sprite.width(),
            sprite.height()
        );
        Ok(sprite.dimensions())
    }
}
