//! Basic variation example.
//!
//! Run with: `cargo run --example generate_variations -- smile.png`
//!
//! Requires `OPENAI_API_KEY` environment variable.

use emotegen::{request_variations, SourceImage, VariationCount, VariationSize};
use emotegen::{OpenAiVariationProvider, VariationProvider, VariationResult};

#[tokio::main]
async fn main() -> emotegen::Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "emote.png".into());
    let provider = OpenAiVariationProvider::builder().build()?;
    let source = SourceImage::from_path(&path)?;

    let result = request_variations(
        &provider,
        &source,
        VariationCount::new(2)?,
        VariationSize::Small,
    )
    .await;

    match result {
        VariationResult::Success { images } => {
            for (i, image) in images.iter().enumerate() {
                let fetched = provider.fetch(image).await?;
                let file = format!("{}-{}.{}", source.stem(), i + 1, fetched.format.extension());
                fetched.save(&file)?;
                println!("Saved {file}");
            }
        }
        VariationResult::Failure { kind, message } => {
            eprintln!("{kind}: {message}");
        }
    }

    Ok(())
}
