use crate::error::{Error, Result};
use image::RgbaImage;
use std::thread;

/// 每个像素的字节数
const CHANNELS: usize = 4;

/// 把序列帧横向拼接为一张精灵图。
///
/// 所有帧必须和第一帧尺寸相同，第 `i` 帧占据 `[i * W, (i + 1) * W)` 列。
/// 每帧由一个线程复制，各线程只写自己的列区间，互不重叠，因此不需要锁。
pub fn glue(frames: &[RgbaImage]) -> Result<RgbaImage> {
    let first = frames.first().ok_or(Error::EmptySequence)?;
    let (width, height) = first.dimensions();

    for (index, frame) in frames.iter().enumerate() {
        if frame.dimensions() != (width, height) {
            return Err(Error::FrameSizeMismatch {
                index,
                expected: (width, height),
                found: frame.dimensions(),
            });
        }
    }

    let sprite_width = u32::try_from(frames.len())
        .ok()
        .and_then(|count| count.checked_mul(width))
        .ok_or(Error::SpriteTooLarge {
            count: frames.len(),
            width,
        })?;

    let mut sprite = RgbaImage::new(sprite_width, height);
    if width == 0 || height == 0 {
        return Ok(sprite);
    }

    let segment = width as usize * CHANNELS;
    let row_len = sprite_width as usize * CHANNELS;

    // 按帧切分画布：每一行切成 frames.len() 段，第 i 段归第 i 帧
    let mut columns: Vec<Vec<&mut [u8]>> = frames
        .iter()
        .map(|_| Vec::with_capacity(height as usize))
        .collect();
    for row in sprite.chunks_mut(row_len) {
        for (column, part) in columns.iter_mut().zip(row.chunks_mut(segment)) {
            column.push(part);
        }
    }

    thread::scope(|scope| {
        let workers: Vec<_> = frames
            .iter()
            .zip(columns)
            .map(|(frame, rows)| scope.spawn(move || copy_frame(frame, rows)))
            .collect();

        // 全部 join 完再汇报，避免未 join 的线程在 scope 结束时再次 panic
        workers
            .into_iter()
            .enumerate()
            .map(|(index, worker)| worker.join().map_err(|_| Error::Worker(index)))
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<Result<()>>()
    })?;

    Ok(sprite)
}

fn copy_frame(frame: &RgbaImage, rows: Vec<&mut [u8]>) {
    let source = frame.as_raw();
    let segment = frame.width() as usize * CHANNELS;
    for (y, row) in rows.into_iter().enumerate() {
        let start = y * segment;
        row.copy_from_slice(&source[start..start + segment]);
    }
}
