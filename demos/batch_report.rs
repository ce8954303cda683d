//! Runs a whole batch and prints a report, continuing past failed emotes.
//!
//! Run with: `cargo run --example batch_report -- a.png b.jpg c.png`
//!
//! Requires `OPENAI_API_KEY` environment variable.

use emotegen::render::render_text;
use emotegen::{InputCollector, OpenAiVariationProvider, VariationCount, VariationSize};

#[tokio::main]
async fn main() -> emotegen::Result<()> {
    let provider = OpenAiVariationProvider::builder().build()?;

    let mut collector = InputCollector::new()
        .with_count(VariationCount::new(3)?)
        .with_size(VariationSize::Medium);
    for path in std::env::args().skip(1) {
        collector.add_path(path)?;
    }

    // Fails with a warning if no paths were given
    let batch = collector.submit()?;
    let results = batch.run(&provider).await;

    println!("{}", render_text(&results));
    Ok(())
}
