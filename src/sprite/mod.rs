mod glue;
mod sprite_sheet;

pub use glue::glue;
pub use sprite_sheet::{SpriteConfig, SpriteJob};
