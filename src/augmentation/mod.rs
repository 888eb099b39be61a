mod augmentation;
mod random;
mod transform;

pub use augmentation::{AugmentConfig, Augmentation, PrefixPair};
