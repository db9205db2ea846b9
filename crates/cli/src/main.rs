//! Binary entry point for the subtitle translator.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use srt_translate_core::translate::deepl::DeeplTranslator;
use srt_translate_core::translate::google::GoogleTranslator;
use srt_translate_core::translate::openai::OpenAiTranslator;
use srt_translate_core::translate::retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
use srt_translate_core::translate::{process_file, RetryPolicy, Translator};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Translation service used for every caption.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    /// Google Translate web endpoint, no key needed.
    Google,
    /// DeepL API, key in `DEEPL_API_KEY`.
    Deepl,
    /// OpenAI chat completions, key in `OPENAI_API_KEY`.
    Openai,
}

/// Command line options for the binary.
#[derive(Parser)]
#[command(about = "Translate an SRT subtitle file into another language")]
struct Cli {
    /// Path to the SRT file to translate.
    input: PathBuf,

    /// Target language code, e.g. `nl`.
    language: String,

    /// Translation backend.
    #[arg(long, value_enum, default_value_t = Backend::Google)]
    backend: Backend,

    /// Where to write the result. Defaults to `<stem>.<language>.<ext>`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Backend calls per caption line before giving up.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..))]
    max_attempts: u32,

    /// Seconds to wait between two attempts.
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY.as_secs_f64())]
    retry_delay: f64,

    /// Enable verbose debug and trace logs.
    #[arg(long)]
    debug: bool,
}

fn build_translator(backend: Backend) -> Result<Box<dyn Translator>> {
    Ok(match backend {
        Backend::Google => Box::new(GoogleTranslator::new()),
        Backend::Deepl => Box::new(DeeplTranslator::new().context("DEEPL_API_KEY is not set")?),
        Backend::Openai => Box::new(OpenAiTranslator::new().context("OPENAI_API_KEY is not set")?),
    })
}

/// Application entry point which parses CLI args and performs actions.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.debug {
        EnvFilter::default()
            .add_directive("srt_translate=trace".parse()?)
            .add_directive("srt_translate_core=trace".parse()?)
            .add_directive("info".parse()?)
    } else {
        EnvFilter::default()
            .add_directive("srt_translate=info".parse()?)
            .add_directive("srt_translate_core=info".parse()?)
            .add_directive("warn".parse()?)
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let delay = Duration::try_from_secs_f64(cli.retry_delay)
        .map_err(|_| anyhow!("invalid --retry-delay {}", cli.retry_delay))?;
    let policy = RetryPolicy {
        max_attempts: cli.max_attempts,
        delay,
    };
    let mut translator = build_translator(cli.backend)?;
    debug!("using {} backend with {:?}", translator.name(), policy);
    process_file(
        &cli.input,
        cli.output.as_deref(),
        &cli.language,
        translator.as_mut(),
        &policy,
    )
    .await
    .with_context(|| format!("failed to translate {}", cli.input.display()))?;
    Ok(())
}
