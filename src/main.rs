use std::path::PathBuf;
use std::sync::Arc;

use captcha_ocr::config::{self, Config};
use captcha_ocr::source::source_from_arg;
use captcha_ocr::{Corpus, DecodeOptions, Decoder, OutputMode};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "captcha-ocr-server")]
#[command(about = "Glyph-fingerprint solver for six-letter distorted captchas")]
#[command(version)]
pub struct Cli {
    /// Directory holding A.json .. Z.json fingerprint files
    #[arg(long, global = true, env = "CAPTCHA_CORPUS_DIR")]
    pub corpus_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the solver over HTTP
    Serve(ServeArgs),

    /// Solve a single captcha from a file path or URL and print the solution
    Solve(SolveArgs),
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Highest luminance treated as ink
    #[arg(long, env = "CAPTCHA_THRESHOLD", default_value = "1")]
    pub threshold: u8,

    /// string, per-slot-map or raw-per-slot-map
    #[arg(long, env = "CAPTCHA_OUTPUT_MODE", default_value = "string")]
    pub output_mode: OutputMode,
}

impl From<&DecodeArgs> for DecodeOptions {
    fn from(args: &DecodeArgs) -> Self {
        Self {
            threshold: args.threshold,
            output_mode: args.output_mode,
        }
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long, env = "CAPTCHA_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "CAPTCHA_PORT", default_value = "9393")]
    pub port: u16,

    /// Maximum upload size in bytes (default: 1MB)
    #[arg(long, env = "CAPTCHA_MAX_FILE_SIZE", default_value = "1048576")]
    pub max_file_size: usize,

    #[command(flatten)]
    pub decode: DecodeArgs,
}

#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Image path or http(s) URL
    pub source: String,

    #[command(flatten)]
    pub decode: DecodeArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let corpus_dir = cli.corpus_dir.unwrap_or_else(config::default_corpus_dir);

    match cli.command {
        Commands::Serve(args) => {
            let config = Config {
                host: args.host,
                port: args.port,
                max_file_size: args.max_file_size,
                corpus_dir,
                defaults: DecodeOptions::from(&args.decode),
            };

            tracing::info!("Starting captcha-ocr-server v{}", env!("CARGO_PKG_VERSION"));
            tracing::info!("Binding to {}:{}", config.host, config.port);

            captcha_ocr::server::run(config).await
        }
        Commands::Solve(args) => {
            let options = DecodeOptions::from(&args.decode);
            let source = source_from_arg(&args.source);

            let solution = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
                let decoder = Decoder::new(Arc::new(Corpus::load(&corpus_dir)?));
                tracing::info!("Solving {}", source.describe());
                let image = source.load()?;
                Ok(decoder.solve(&image, &options)?)
            })
            .await??;

            println!("{}", serde_json::to_string(&solution)?);
            Ok(())
        }
    }
}
