use crate::error::{Error, Result};
use image::ImageFormat;
use std::ffi::OsStr;
use std::path::Path;
use std::str::FromStr;

/// 图像的编码格式，只支持 png 和 jpeg
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FormatTag {
    Png,
    Jpeg,
}

impl FormatTag {
    /// 根据文件扩展名确定格式
    pub fn from_path(path: &Path) -> Result<FormatTag> {
        match path.extension().and_then(OsStr::to_str) {
            Some(extension) => extension.parse(),
            None => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// 解码器识别出的格式
    pub fn from_image_format(format: ImageFormat) -> Result<FormatTag> {
        match format {
            ImageFormat::Png => Ok(FormatTag::Png),
            ImageFormat::Jpeg => Ok(FormatTag::Jpeg),
            other => Err(Error::UnsupportedFormat(
                other
                    .extensions_str()
                    .first()
                    .copied()
                    .unwrap_or("unknown")
                    .to_string(),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatTag::Png => "png",
            FormatTag::Jpeg => "jpeg",
        }
    }
}

impl FromStr for FormatTag {
    type Err = Error;

    fn from_str(tag: &str) -> Result<FormatTag> {
        if tag.eq_ignore_ascii_case("png") {
            Ok(FormatTag::Png)
        } else if tag.eq_ignore_ascii_case("jpg") || tag.eq_ignore_ascii_case("jpeg") {
            Ok(FormatTag::Jpeg)
        } else {
            Err(Error::UnsupportedFormat(tag.to_string()))
        }
    }
}
