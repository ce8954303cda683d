//! CLI for emotegen - AI emote variations.

use clap::{Args, Parser, Subcommand, ValueEnum};
use emotegen::download::save_results;
use emotegen::render::{render_html, render_json, render_text};
use emotegen::{
    EmoteError, InputCollector, OpenAiVariationProvider, ResponseFormat, VariationCount,
    VariationSize,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "emotegen")]
#[command(about = "Generate style-preserving variations of your emotes (OpenAI dall-e-2)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate variations for one or more emotes
    Generate(GenerateArgs),

    /// List supported output sizes
    Sizes,
}

#[derive(Args)]
struct GenerateArgs {
    /// Source emotes (PNG or JPEG)
    files: Vec<PathBuf>,

    /// Variations per emote
    #[arg(short = 'n', long, default_value_t = VariationCount::DEFAULT,
          value_parser = clap::value_parser!(u8).range(1..=5))]
    count: u8,

    /// Output emote size
    #[arg(short, long, value_enum, default_value = "256x256")]
    size: SizeArg,

    /// OpenAI API key (defaults to OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Override the API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Ask for inline base64 images instead of hosted URLs
    #[arg(long)]
    b64: bool,

    /// Emotes processed at once (1-5)
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Download every variation into this directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write an HTML grid of the results to this file
    #[arg(long)]
    html: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SizeArg {
    #[value(name = "256x256")]
    Small,
    #[value(name = "512x512")]
    Medium,
    #[value(name = "1024x1024")]
    Large,
}

impl From<SizeArg> for VariationSize {
    fn from(arg: SizeArg) -> Self {
        match arg {
            SizeArg::Small => VariationSize::Small,
            SizeArg::Medium => VariationSize::Medium,
            SizeArg::Large => VariationSize::Large,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("emotegen=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            generate(args, cli.json).await?;
        }
        Commands::Sizes => {
            list_sizes(cli.json)?;
        }
    }

    Ok(())
}

/// Collects uploads, skipping any that cannot be read or are not PNG/JPEG.
fn collect_inputs(args: &GenerateArgs) -> anyhow::Result<InputCollector> {
    let mut collector = InputCollector::new()
        .with_count(VariationCount::new(args.count)?)
        .with_size(args.size.into());

    for path in &args.files {
        match collector.add_path(path) {
            Ok(_) => {}
            Err(e @ (EmoteError::UnsupportedEncoding(_) | EmoteError::Io(_))) => {
                tracing::warn!(path = %path.display(), "skipping upload: {e}");
                eprintln!("warning: skipping {}: {e}", path.display());
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(collector)
}

async fn generate(args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    let collector = collect_inputs(&args)?;

    // Empty batches stop here, before a key is even needed
    let batch = match collector.submit() {
        Ok(batch) => batch,
        Err(EmoteError::NoInput) => {
            eprintln!("warning: {}", emotegen::NO_INPUT_WARNING);
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    let mut builder = OpenAiVariationProvider::builder()
        .timeout(Duration::from_secs(args.timeout))
        .response_format(if args.b64 {
            ResponseFormat::B64Json
        } else {
            ResponseFormat::Url
        });
    if let Some(key) = &args.api_key {
        builder = builder.api_key(key);
    }
    if let Some(url) = &args.base_url {
        builder = builder.base_url(url);
    }
    let provider = builder.build()?;

    if !json_output {
        eprintln!(
            "Creating {} variation(s) of {} emote(s) at {}...",
            batch.count(),
            batch.len(),
            batch.size()
        );
    }

    let results = if args.concurrency > 1 {
        batch.run_concurrent(&provider, args.concurrency).await
    } else {
        batch.run(&provider).await
    };

    if let Some(dir) = &args.output_dir {
        let report = save_results(&provider, &results, dir).await?;
        if !json_output {
            eprintln!(
                "Saved {} file(s) to {} ({} failed)",
                report.saved.len(),
                dir.display(),
                report.failed
            );
        }
    }

    if let Some(path) = &args.html {
        std::fs::write(path, render_html(&results, batch.count(), batch.size()))?;
        if !json_output {
            eprintln!("Wrote grid to {}", path.display());
        }
    }

    if json_output {
        println!("{}", render_json(&results, batch.count(), batch.size())?);
    } else {
        println!("{}", render_text(&results));
    }

    Ok(())
}

fn list_sizes(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(&VariationSize::ALL)?);
    } else {
        println!("Supported sizes:\n");
        for size in VariationSize::ALL {
            let default = if size == VariationSize::default() {
                " (default)"
            } else {
                ""
            };
            println!("  {}{}", size, default);
        }
    }
    Ok(())
}
