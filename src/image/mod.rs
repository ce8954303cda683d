//! Source images, variation references and the providers that create them.

mod provider;
pub mod providers;
mod types;

pub use provider::{request_variations, VariationProvider};
pub use types::{
    GeneratedImage, ImageFormat, ImageRef, SourceImage, VariationCount, VariationSize,
};
