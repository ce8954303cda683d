#![warn(missing_docs)]
//! Emotegen - style-preserving emote variations via AI image APIs.
//!
//! Upload one or more source emotes, pick how many variations you want
//! (1-5) and an output size, and every emote is sent to an image-variation
//! service once. Each upload ends up with exactly one [`VariationResult`]:
//! its variations, or a classified failure that never affects the others.
//!
//! # Quick Start
//!
//! ```no_run
//! use emotegen::{InputCollector, OpenAiVariationProvider, VariationCount, VariationSize};
//!
//! #[tokio::main]
//! async fn main() -> emotegen::Result<()> {
//!     let provider = OpenAiVariationProvider::builder().build()?;
//!
//!     let mut collector = InputCollector::new()
//!         .with_count(VariationCount::new(3)?)
//!         .with_size(VariationSize::Medium);
//!     collector.add_path("smile.png")?;
//!
//!     let batch = collector.submit()?;
//!     for entry in &batch.run(&provider).await {
//!         println!("{}: {:?}", entry.name, entry.result);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `openai`: OpenAI dall-e-2 variations provider
//! - `cli`: Command-line interface (`emotegen generate`)

mod error;

pub mod batch;
pub mod download;
pub mod image;
pub mod input;
pub mod render;
pub mod result;

#[cfg(test)]
mod test_support;

// Re-export error types at crate root
pub use error::{EmoteError, Result, BILLING_GUIDANCE, NO_INPUT_WARNING};

pub use batch::VariationBatch;
pub use image::{
    request_variations, GeneratedImage, ImageFormat, ImageRef, SourceImage, VariationCount,
    VariationProvider, VariationSize,
};
pub use input::InputCollector;
pub use result::{FailureKind, ResultEntry, ResultSet, VariationResult};

#[cfg(feature = "openai")]
pub use image::providers::{OpenAiVariationProvider, OpenAiVariationProviderBuilder, ResponseFormat};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{EmoteError, Result};
    pub use crate::image::{SourceImage, VariationCount, VariationProvider, VariationSize};
    pub use crate::input::InputCollector;
    pub use crate::result::{FailureKind, ResultSet, VariationResult};

    #[cfg(feature = "openai")]
    pub use crate::image::providers::OpenAiVariationProvider;
}
