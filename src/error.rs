use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// 打开或创建文件失败
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 遍历目录失败
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// 图像数据损坏或无法识别
    #[error("decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("encode: {0}")]
    Encode(#[from] image::ImageError),

    #[error("png encode: {0}")]
    PngEncode(#[from] png::EncodingError),

    /// 增强前缀必须相对于根目录
    #[error("prefix {0:?} is absolute, expected a path relative to the scan root")]
    AbsolutePrefix(String),

    /// 不支持的编码格式
    #[error("unsupported format: {0:?}")]
    UnsupportedFormat(String),

    /// 拼接时没有任何帧
    #[error("empty frame sequence")]
    EmptySequence,

    /// 帧尺寸与第一帧不一致
    #[error("frame {index} is {}x{}, expected {}x{}", found.0, found.1, expected.0, expected.1)]
    FrameSizeMismatch {
        index: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("sprite of {count} frames x {width}px overflows")]
    SpriteTooLarge { count: usize, width: u32 },

    /// 序列帧加载失败，`index` 从 1 开始
    #[error("frame {index:05} ({}): {source}", path.display())]
    FrameLoad {
        index: usize,
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// 拼接线程异常退出
    #[error("glue worker for frame {0} panicked")]
    Worker(usize),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
