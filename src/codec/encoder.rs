use super::FormatTag;
use crate::error::{Error, Result};
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageReader, RgbImage, RgbaImage};
use png::Compression;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 解码图像文件，同时返回识别出的格式。
///
/// 优先按文件内容识别格式，识别不了时退回到扩展名。
pub fn load(path: &Path) -> Result<(RgbaImage, FormatTag)> {
    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|err| Error::io(path, err))?;

    let tag = match reader.format() {
        Some(format) => FormatTag::from_image_format(format)?,
        None => FormatTag::from_path(path)?,
    };

    let image = reader.decode().map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    Ok((image.into_rgba8(), tag))
}

/// 按格式编码写入
pub fn save<W: Write>(
    image: &RgbaImage,
    tag: FormatTag,
    writer: W,
    compression: Compression,
) -> Result<()> {
    match tag {
        FormatTag::Png => {
            let mut encoder = png::Encoder::new(writer, image.width(), image.height());
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_compression(compression);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(image.as_raw())?;
            writer.finish()?;
        }
        FormatTag::Jpeg => {
            // jpeg 没有透明通道，默认质量 75
            let rgb: RgbImage = image.convert();
            JpegEncoder::new(writer).encode_image(&rgb)?;
        }
    }
    Ok(())
}

/// 创建文件并写入，失败时已创建的文件保留
pub fn save_file(
    image: &RgbaImage,
    tag: FormatTag,
    path: &Path,
    compression: Compression,
) -> Result<()> {
    let file = File::create(path).map_err(|err| Error::io(path, err))?;
    let mut writer = BufWriter::new(file);
    save(image, tag, &mut writer, compression)?;
    writer.flush().map_err(|err| Error::io(path, err))
}

/// 按扩展名选择格式写入：png 无损，jpg/jpeg 默认质量，其他格式报错
pub fn save_path(image: &RgbaImage, path: &Path, compression: Compression) -> Result<()> {
    let tag = FormatTag::from_path(path)?;
    save_file(image, tag, path, compression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker() -> RgbaImage {
        RgbaImage::from_fn(6, 4, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 128])
            }
        })
    }

    #[test]
    fn png_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        let image = checker();

        save_file(&image, FormatTag::Png, &path, Compression::Fast).unwrap();
        let (decoded, tag) = load(&path).unwrap();

        assert_eq!(tag, FormatTag::Png);
        assert_eq!(decoded, image);
    }

    #[test]
    fn jpeg_keeps_geometry_and_tag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.jpg");

        save_file(&checker(), FormatTag::Jpeg, &path, Compression::Default).unwrap();
        let (decoded, tag) = load(&path).unwrap();

        assert_eq!(tag, FormatTag::Jpeg);
        assert_eq!(decoded.dimensions(), (6, 4));
    }

    #[test]
    fn content_wins_over_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mislabelled.jpg");
        save_file(&checker(), FormatTag::Png, &path, Compression::Fast).unwrap();

        let (_, tag) = load(&path).unwrap();
        assert_eq!(tag, FormatTag::Png);
    }

    #[test]
    fn save_path_follows_extension() {
        let dir = tempfile::tempdir().unwrap();

        let png_path = dir.path().join("sheet.png");
        save_path(&checker(), &png_path, Compression::Fast).unwrap();
        assert_eq!(load(&png_path).unwrap().1, FormatTag::Png);

        let jpeg_path = dir.path().join("sheet.jpeg");
        save_path(&checker(), &jpeg_path, Compression::Default).unwrap();
        assert_eq!(load(&jpeg_path).unwrap().1, FormatTag::Jpeg);
    }

    #[test]
    fn save_path_rejects_unknown_extension_without_creating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.bmp");

        match save_path(&checker(), &path, Compression::Default) {
            Err(Error::UnsupportedFormat(tag)) => assert_eq!(tag, "bmp"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        match load(&dir.path().join("nope.png")) {
            Err(Error::Io { .. }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        match load(&path) {
            Err(Error::Decode { .. }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }
}
