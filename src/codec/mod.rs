mod encoder;
mod format;

pub use encoder::{load, save_file, save_path};
pub use format::FormatTag;
